//! Stock price record model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single row of the source table.
///
/// Immutable once loaded. `asof` keeps full datetime precision internally but
/// is exposed on the wire at calendar-date granularity (`YYYY-MM-DD`), matching
/// the source file's daily cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPriceRecord {
    #[serde(rename = "#")]
    pub sequence_id: i64,
    pub name: String,
    #[serde(
        serialize_with = "serialize_asof",
        deserialize_with = "deserialize_asof"
    )]
    pub asof: NaiveDateTime,
    pub volume: i64,
    pub close_usd: f64,
    pub sector_level1: String,
    pub sector_level2: String,
}

impl StockPriceRecord {
    /// The record's timestamp normalized to a calendar date.
    pub fn asof_date(&self) -> NaiveDate {
        self.asof.date()
    }
}

fn serialize_asof<S>(asof: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&asof.date())
}

fn deserialize_asof<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_asof(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid asof date: {raw}")))
}

/// Parse an `asof` value as a timezone-naive datetime.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, or a bare
/// `YYYY-MM-DD` anchored at midnight.
pub(crate) fn parse_asof(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
