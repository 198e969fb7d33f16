use crate::utils::error::{Result, ScraperError};
use chrono::{DateTime, NaiveDateTime, Utc};

/// The one format the PDRF server emits for date statistics,
/// e.g. `07/24/2024 04:00:00 AM`.
pub const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// 以固定格式解析日期，不做任何修剪；`None` 直接回傳 `None`
pub fn parse_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let naive = NaiveDateTime::parse_from_str(raw, SOURCE_DATE_FORMAT).map_err(|e| {
        ScraperError::ExtentParseError {
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(Some(naive.and_utc()))
}
