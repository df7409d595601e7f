//! Rendering of SAS date, datetime and time values.
//!
//! SAS stores these as plain numbers: days (dates) or seconds (datetimes) since 1960-01-01, and
//! seconds since midnight (times). The variable's display format says which one a column holds.

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::types::Value;

/// Temporal interpretation of a numeric SAS variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date,
    DateTime,
    Time,
}

const DATE_FORMATS: &[&str] = &[
    "B8601DA", "DATE", "DAY", "DDMMYY", "DDMMYYB", "DDMMYYC", "DDMMYYD", "DDMMYYN", "DDMMYYP",
    "DDMMYYS", "DOWNAME", "E8601DA", "JULDAY", "JULIAN", "MINGUO", "MMDDYY", "MMDDYYB", "MMDDYYC",
    "MMDDYYD", "MMDDYYN", "MMDDYYP", "MMDDYYS", "MMYY", "MMYYC", "MMYYD", "MMYYN", "MMYYP",
    "MMYYS", "MONNAME", "MONTH", "MONYY", "NENGO", "QTR", "QTRR", "WEEKDATE", "WEEKDATX",
    "WEEKDAY", "WEEKV", "WORDDATE", "WORDDATX", "YEAR", "YYMM", "YYMMC", "YYMMD", "YYMMDD",
    "YYMMDDB", "YYMMDDC", "YYMMDDD", "YYMMDDN", "YYMMDDP", "YYMMDDS", "YYMMN", "YYMMP", "YYMMS",
    "YYMON", "YYQ", "YYQC", "YYQD", "YYQN", "YYQP", "YYQR", "YYQRC", "YYQRD", "YYQRN", "YYQRP",
    "YYQRS", "YYQS",
];

const DATETIME_FORMATS: &[&str] = &[
    "B8601DN", "B8601DT", "B8601DX", "B8601DZ", "B8601LX", "DATEAMPM", "DATETIME", "DTDATE",
    "DTMONYY", "DTWKDATX", "DTYEAR", "E8601DN", "E8601DT", "E8601DX", "E8601DZ", "E8601LX",
    "MDYAMPM",
];

const TIME_FORMATS: &[&str] = &["E8601TM", "HHMM", "HOUR", "MMSS", "TIME", "TIMEAMPM", "TOD"];

impl Temporal {
    /// Classify a format name such as `DATE9.` or `datetime20`. Width and decimals are ignored.
    pub fn from_format(format: &str) -> Option<Self> {
        let name = format
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_digit() || c == '.')
            .to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }
        if DATE_FORMATS.contains(&name.as_str()) {
            Some(Temporal::Date)
        } else if DATETIME_FORMATS.contains(&name.as_str()) {
            Some(Temporal::DateTime)
        } else if TIME_FORMATS.contains(&name.as_str()) {
            Some(Temporal::Time)
        } else {
            None
        }
    }

    /// Text form of `raw`: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `HH:MM:SS`.
    ///
    /// Values that cannot be represented (non-finite, out of range) stay numeric.
    pub fn render(self, raw: f64) -> Value {
        let text = match self {
            Temporal::Date => date_text(raw),
            Temporal::DateTime => datetime_text(raw),
            Temporal::Time => time_text(raw),
        };
        text.map_or(Value::Float64(raw), Value::Utf8)
    }
}

fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1960, 1, 1)
}

fn whole(raw: f64) -> Option<i64> {
    let v = raw.floor();
    (v.is_finite() && v.abs() < 1e15).then_some(v as i64)
}

fn date_text(days: f64) -> Option<String> {
    let date = epoch()?.checked_add_signed(TimeDelta::try_days(whole(days)?)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn datetime_text(seconds: f64) -> Option<String> {
    let start = epoch()?.and_hms_opt(0, 0, 0)?;
    let at = start.checked_add_signed(TimeDelta::try_seconds(whole(seconds)?)?)?;
    Some(at.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn time_text(seconds: f64) -> Option<String> {
    let secs = u32::try_from(whole(seconds)?).ok()?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)?;
    Some(time.format("%H:%M:%S").to_string())
}
