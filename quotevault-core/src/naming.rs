use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::interval::Frequency;
use crate::row::DATE_FORMAT;

/// Extension given to files the archive writes.
pub const DEFAULT_EXTENSION: &str = "csv";

fn is_date_range(seg: &str) -> bool {
    seg.len() == 17
        && seg.as_bytes()[8] == b'-'
        && seg[..8].bytes().all(|b| b.is_ascii_digit())
        && seg[9..].bytes().all(|b| b.is_ascii_digit())
}

/// Name of a per-symbol history file: `<SYMBOL>[_<freq>].<ext>`.
///
/// A missing cadence suffix means daily. The symbol and cadence of a data
/// file are derivable from its name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFileName {
    /// Instrument symbol.
    pub symbol: String,
    /// Sampling cadence encoded in the suffix.
    pub frequency: Frequency,
    /// File extension, without the dot.
    pub extension: String,
}

impl HistoryFileName {
    /// Canonical name for a symbol at a cadence, with the default extension.
    #[must_use]
    pub fn new(symbol: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            symbol: symbol.into(),
            frequency,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Parse a file name. `None` when the name does not follow the
    /// convention; delta-named files (embedded date range) are rejected so
    /// walkers can tell the two kinds apart.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        let (symbol, frequency) = match stem.rsplit_once('_') {
            Some((head, seg)) if !head.is_empty() => match Frequency::from_suffix(seg) {
                Some(f) => (head, f),
                None => (stem, Frequency::Daily),
            },
            _ => (stem, Frequency::Daily),
        };
        let last_segment = symbol.rsplit_once('_').map_or(symbol, |(_, seg)| seg);
        if is_date_range(last_segment) {
            return None;
        }
        Some(Self {
            symbol: symbol.to_string(),
            frequency,
            extension: ext.to_string(),
        })
    }

    /// Render the file name. The daily suffix is omitted, per the convention.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self.frequency {
            Frequency::Daily => format!("{}.{}", self.symbol, self.extension),
            f => format!("{}_{}.{}", self.symbol, f.suffix(), self.extension),
        }
    }
}

/// Name of a delta file: `<SYMBOL>_<YYYYMMDD>-<YYYYMMDD>[_<freq>].<ext>`.
///
/// The embedded range is the `[start, end]` span of dates the delta covers.
/// Delta files are produced by update runs and consumed (deleted or renamed)
/// by merge runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFileName {
    /// Instrument symbol.
    pub symbol: String,
    /// First covered date.
    pub start: NaiveDate,
    /// Last covered date.
    pub end: NaiveDate,
    /// Sampling cadence encoded in the suffix.
    pub frequency: Frequency,
    /// File extension, without the dot.
    pub extension: String,
}

impl DeltaFileName {
    /// Delta name for a symbol covering `[start, end]`, default extension.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
            frequency,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Parse a file name. `None` unless it carries a well-formed date range
    /// with `start <= end`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        let (body, frequency) = match stem.rsplit_once('_') {
            Some((head, seg)) => match Frequency::from_suffix(seg) {
                Some(f) if !head.is_empty() => (head, f),
                _ => (stem, Frequency::Daily),
            },
            None => return None,
        };
        let (symbol, range) = body.rsplit_once('_')?;
        if symbol.is_empty() || !is_date_range(range) {
            return None;
        }
        let start = NaiveDate::parse_from_str(&range[..8], DATE_FORMAT).ok()?;
        let end = NaiveDate::parse_from_str(&range[9..], DATE_FORMAT).ok()?;
        if start > end {
            return None;
        }
        Some(Self {
            symbol: symbol.to_string(),
            start,
            end,
            frequency,
            extension: ext.to_string(),
        })
    }

    /// Render the file name. The daily suffix is omitted, per the convention.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.file_name_using(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Render the file name with a caller-supplied date renderer. Update
    /// runs route this through the planner's per-run format cache.
    pub fn file_name_using(&self, mut render: impl FnMut(NaiveDate) -> String) -> String {
        let range = format!("{}-{}", render(self.start), render(self.end));
        match self.frequency {
            Frequency::Daily => format!("{}_{}.{}", self.symbol, range, self.extension),
            f => format!("{}_{}_{}.{}", self.symbol, range, f.suffix(), self.extension),
        }
    }

    /// The history file this delta folds into: same symbol and cadence, date
    /// range stripped.
    #[must_use]
    pub fn target(&self) -> HistoryFileName {
        HistoryFileName {
            symbol: self.symbol.clone(),
            frequency: self.frequency,
            extension: self.extension.clone(),
        }
    }
}
