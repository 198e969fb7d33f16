use crate::core::arcgis::FeatureServerClient;
use crate::domain::model::DateExtent;
use crate::utils::dateparse::parse_date;
use crate::utils::error::{Result, ScraperError};
use serde::Deserialize;
use serde_json::Value;

/// Date column queried on every PDRF layer.
pub const DEFAULT_DATE_FIELD: &str = "Date_of_Assistance_Deployment";

#[derive(Debug, Deserialize)]
struct StatisticsResponse {
    #[serde(default)]
    features: Vec<StatisticsRow>,
}

#[derive(Debug, Deserialize)]
struct StatisticsRow {
    attributes: Option<serde_json::Map<String, Value>>,
}

/// 透過 outStatistics 取得圖層日期欄位的最小與最大值
#[derive(Debug, Clone)]
pub struct ExtentResolver {
    client: FeatureServerClient,
    date_field: String,
}

impl ExtentResolver {
    pub fn new(client: FeatureServerClient, date_field: impl Into<String>) -> Self {
        Self {
            client,
            date_field: date_field.into(),
        }
    }

    pub fn statistics_definition(&self) -> Value {
        serde_json::json!([
            {
                "statisticType": "min",
                "onStatisticField": self.date_field,
                "outStatisticFieldName": "min_date",
            },
            {
                "statisticType": "max",
                "onStatisticField": self.date_field,
                "outStatisticFieldName": "max_date",
            }
        ])
    }

    pub async fn resolve_extent(&self, layer_url: &str) -> Result<DateExtent> {
        let query_url = format!("{}/query", layer_url);
        let statistics = self.statistics_definition().to_string();

        let response: StatisticsResponse = self
            .client
            .get_json(
                &query_url,
                &[
                    ("outFields", "*"),
                    ("outStatistics", statistics.as_str()),
                    ("returnGeometry", "false"),
                    ("where", "1=1"),
                ],
            )
            .await
            .map_err(|e| ScraperError::ExtentUnavailable {
                layer_url: layer_url.to_string(),
                reason: e.to_string(),
            })?;

        let attributes = response
            .features
            .into_iter()
            .next()
            .and_then(|row| row.attributes)
            .ok_or_else(|| ScraperError::ExtentUnavailable {
                layer_url: layer_url.to_string(),
                reason: "statistics query returned no attributes row".to_string(),
            })?;

        let min_date = parse_date(raw_date(&attributes, "min_date")?)?;
        let max_date = parse_date(raw_date(&attributes, "max_date")?)?;

        match (min_date, max_date) {
            (Some(min), Some(max)) => Ok(DateExtent::new(min, max)),
            (None, None) => Ok(DateExtent::empty()),
            _ => Err(ScraperError::ExtentUnavailable {
                layer_url: layer_url.to_string(),
                reason: "statistics returned only one date bound".to_string(),
            }),
        }
    }
}

/// 取出原始字串；null 或缺少欄位視為沒有資料
fn raw_date<'a>(attributes: &'a serde_json::Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ScraperError::ExtentParseError {
            value: other.to_string(),
            reason: "expected a date string".to_string(),
        }),
    }
}
