use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::VaultError;

/// Date format used everywhere a row or file name carries a date.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// One OHLCV record in the canonical output format.
///
/// Text form: `SYMBOL,YYYYMMDD,OPEN,HIGH,LOW,CLOSE[,VOLUME]`, ASCII
/// comma-delimited, one record per line. The primary key is
/// `(symbol, date)`, though the symbol is implicit within one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRow {
    /// Instrument symbol, uppercase by convention.
    pub symbol: String,
    /// Trading date of the record.
    pub date: NaiveDate,
    /// Opening price.
    pub open: Decimal,
    /// Session high.
    pub high: Decimal,
    /// Session low.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume, when the source reports one.
    pub volume: Option<u64>,
}

impl fmt::Display for CanonicalRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.symbol,
            self.date.format(DATE_FORMAT),
            self.open,
            self.high,
            self.low,
            self.close
        )?;
        if let Some(v) = self.volume {
            write!(f, ",{v}")?;
        }
        Ok(())
    }
}

impl FromStr for CanonicalRow {
    type Err = VaultError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != 6 && fields.len() != 7 {
            return Err(VaultError::data(format!(
                "expected 6 or 7 comma-delimited fields, got {}: '{line}'",
                fields.len()
            )));
        }
        let symbol = fields[0].trim();
        if symbol.is_empty() {
            return Err(VaultError::data(format!("empty symbol field: '{line}'")));
        }
        let date = NaiveDate::parse_from_str(fields[1].trim(), DATE_FORMAT)
            .map_err(|_| VaultError::data(format!("unparseable date '{}'", fields[1])))?;
        let price = |ix: usize| -> Result<Decimal, VaultError> {
            fields[ix]
                .trim()
                .parse()
                .map_err(|_| VaultError::data(format!("unparseable price '{}'", fields[ix])))
        };
        let volume = match fields.get(6) {
            Some(v) => Some(
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| VaultError::data(format!("unparseable volume '{v}'")))?,
            ),
            None => None,
        };
        Ok(Self {
            symbol: symbol.to_string(),
            date,
            open: price(2)?,
            high: price(3)?,
            low: price(4)?,
            close: price(5)?,
            volume,
        })
    }
}

/// Deduplication key of a canonical row: `(date, symbol)`.
///
/// Dates are fixed-width zero-padded `YYYYMMDD` strings, so plain
/// lexicographic comparison orders them chronologically; the derived `Ord`
/// (date first, then symbol) is reversed by the merger to get the
/// newest-first file order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    /// `YYYYMMDD` date field, verbatim.
    pub date: String,
    /// Symbol field, verbatim.
    pub symbol: String,
}

/// Extract the `(symbol, date)` key from a canonical line without a full
/// typed parse. `None` for lines that do not start with a symbol and an
/// eight-digit date.
#[must_use]
pub fn row_key(line: &str) -> Option<RowKey> {
    let mut fields = line.splitn(3, ',');
    let symbol = fields.next()?.trim();
    let date = fields.next()?.trim();
    if symbol.is_empty() || date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(RowKey {
        date: date.to_string(),
        symbol: symbol.to_string(),
    })
}
