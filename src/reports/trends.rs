use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;

use crate::reports::repo::Report;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub unit: String,
    pub data: Vec<TrendPoint>,
}

/// Per-parameter time series across a user's reports.
///
/// Structured entries contribute their numeric `value` directly; legacy
/// string entries like "14.5 g/dL" contribute the first decimal number found,
/// with the remainder kept as the unit. Entries yielding no number are
/// dropped, not zeroed. Series are re-sorted by date even though callers
/// pass reports pre-sorted ascending.
pub fn aggregate_trends(reports: &[Report]) -> BTreeMap<String, TrendSeries> {
    let mut trends: BTreeMap<String, TrendSeries> = BTreeMap::new();

    for report in reports {
        let Ok(date) = report.upload_date.format(&Rfc3339) else {
            continue;
        };
        let Some(entries) = report.extracted_data.as_object() else {
            continue;
        };

        for (param, entry) in entries {
            let Some((value, unit)) = numeric_value(entry) else {
                continue;
            };
            let series = trends.entry(param.trim().to_string()).or_insert_with(|| {
                TrendSeries {
                    unit,
                    data: Vec::new(),
                }
            });
            series.data.push(TrendPoint {
                date: date.clone(),
                value,
            });
        }
    }

    for series in trends.values_mut() {
        series.data.sort_by(|a, b| a.date.cmp(&b.date));
    }
    trends
}

fn numeric_value(entry: &Value) -> Option<(f64, String)> {
    lazy_static! {
        static ref NUM_RE: Regex = Regex::new(r"(\d+\.?\d*)").unwrap();
    }

    match entry {
        Value::Object(fields) => {
            let value = fields.get("value")?.as_f64()?;
            let unit = fields
                .get("unit")
                .and_then(|u| u.as_str())
                .unwrap_or("")
                .to_string();
            Some((value, unit))
        }
        Value::String(s) => {
            let m = NUM_RE.find(s)?;
            let value = m.as_str().parse::<f64>().ok()?;
            let unit = s.replacen(m.as_str(), "", 1).trim().to_string();
            Some((value, unit))
        }
        Value::Number(n) => Some((n.as_f64()?, String::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn report(days_ago: i64, extracted: Value) -> Report {
        Report {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: "General Health".into(),
            upload_date: OffsetDateTime::now_utc() - Duration::days(days_ago),
            extracted_data: extracted,
            analysis: json!({}),
            pdf_key: "k".into(),
        }
    }

    #[test]
    fn mixed_shape_entries_build_one_series() {
        let reports = vec![
            report(10, json!({"hemoglobin": {"value": 13.2, "unit": "g/dL"}})),
            report(1, json!({"hemoglobin": "14.5 g/dL"})),
        ];
        let trends = aggregate_trends(&reports);
        let series = trends.get("hemoglobin").expect("series present");
        assert_eq!(series.unit, "g/dL");
        assert_eq!(series.data.len(), 2);
        assert_eq!(series.data[0].value, 13.2);
        assert_eq!(series.data[1].value, 14.5);
        assert!(series.data[0].date < series.data[1].date);
    }

    #[test]
    fn non_numeric_entries_are_dropped_not_zeroed() {
        let reports = vec![report(
            1,
            json!({"note": "no numbers here", "flags": [1, 2]}),
        )];
        assert!(aggregate_trends(&reports).is_empty());
    }

    #[test]
    fn series_is_resorted_by_date() {
        // Deliberately out of order: newer report first.
        let reports = vec![
            report(1, json!({"glucose": {"value": 98.0, "unit": "mg/dL"}})),
            report(30, json!({"glucose": {"value": 91.0, "unit": "mg/dL"}})),
        ];
        let trends = aggregate_trends(&reports);
        let series = &trends["glucose"];
        assert_eq!(series.data[0].value, 91.0);
        assert_eq!(series.data[1].value, 98.0);
    }

    #[test]
    fn bare_number_entries_contribute_without_unit() {
        let reports = vec![report(1, json!({"tsh": 2.4}))];
        let series = &aggregate_trends(&reports)["tsh"];
        assert_eq!(series.unit, "");
        assert_eq!(series.data[0].value, 2.4);
    }

    #[test]
    fn parameter_names_are_trimmed() {
        let reports = vec![report(1, json!({" vitamin_d ": {"value": 32.0, "unit": "ng/mL"}}))];
        assert!(aggregate_trends(&reports).contains_key("vitamin_d"));
    }
}
