use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::VaultError;

/// Sampling cadence of a history file.
///
/// The cadence is encoded in canonical file names as a single-letter suffix
/// (`d`, `w`, `m`); a missing suffix means daily.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// One row per trading day.
    #[default]
    Daily,
    /// One row per week.
    Weekly,
    /// One row per calendar month.
    Monthly,
}

impl Frequency {
    /// File-name suffix letter for this cadence.
    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Daily => 'd',
            Self::Weekly => 'w',
            Self::Monthly => 'm',
        }
    }

    /// Parse a file-name suffix segment. `None` if the segment is not a
    /// cadence marker (in which case it belongs to the symbol).
    #[must_use]
    pub fn from_suffix(seg: &str) -> Option<Self> {
        match seg {
            "d" => Some(Self::Daily),
            "w" => Some(Self::Weekly),
            "m" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// First date strictly after `date` at this cadence.
    ///
    /// Daily advances one day, weekly seven days, monthly to the first day of
    /// the following calendar month.
    #[must_use]
    pub fn next_after(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date + Days::new(1),
            Self::Weekly => date + Days::new(7),
            Self::Monthly => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .expect("first of a valid month is a valid date")
            }
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// A `[start, end)` sampling window at a given cadence.
///
/// Recognized shapes:
/// - `start` and `end` both present, with `start` strictly before `end`;
/// - `start` present, `end` absent: the effective end is "now", resolved at
///   the point of use via [`Interval::effective_end`];
/// - both absent: "since inception"; the adapter substitutes its own
///   earliest-supported date.
///
/// An `end` without a `start` is not a recognized window and is rejected at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    frequency: Frequency,
}

impl Interval {
    /// Build a validated interval.
    ///
    /// # Errors
    /// Returns `InvalidArg` if both bounds are present and `start >= end`, or
    /// if `end` is present without `start`.
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        frequency: Frequency,
    ) -> Result<Self, VaultError> {
        match (start, end) {
            (Some(s), Some(e)) if s >= e => Err(VaultError::invalid_arg(format!(
                "interval start {s} must be strictly before end {e}"
            ))),
            (None, Some(e)) => Err(VaultError::invalid_arg(format!(
                "interval end {e} without a start is not a recognized window"
            ))),
            _ => Ok(Self {
                start,
                end,
                frequency,
            }),
        }
    }

    /// Window with both bounds present.
    ///
    /// # Errors
    /// Returns `InvalidArg` unless `start` is strictly before `end`.
    pub fn bounded(
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<Self, VaultError> {
        Self::new(Some(start), Some(end), frequency)
    }

    /// Window from `start` to an end resolved as "now" at the point of use.
    #[must_use]
    pub const fn open_ended(start: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start: Some(start),
            end: None,
            frequency,
        }
    }

    /// "Since inception": the adapter substitutes its earliest-supported date.
    #[must_use]
    pub const fn since_inception(frequency: Frequency) -> Self {
        Self {
            start: None,
            end: None,
            frequency,
        }
    }

    /// Start bound, if any.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// End bound, if any.
    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Sampling cadence.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// True when the window has no start bound.
    #[must_use]
    pub const fn is_since_inception(&self) -> bool {
        self.start.is_none()
    }

    /// Effective end of the window, substituting `now` for an absent bound.
    #[must_use]
    pub fn effective_end(&self, now: NaiveDate) -> NaiveDate {
        self.end.unwrap_or(now)
    }
}
