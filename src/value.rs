use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

/// A single cell as seen by the reader and mapper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Infers a typed value from raw cell text. Anything that is not a number,
    /// date or datetime stays text.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        let trimmed = raw.trim();
        if let Some(number) = parse_decimal(trimmed) {
            return CellValue::Number(number);
        }
        if let Some(date) = parse_naive_date(trimmed) {
            return CellValue::Date(date);
        }
        if let Some(datetime) = parse_naive_datetime(trimmed) {
            return CellValue::DateTime(datetime);
        }
        CellValue::Text(raw.to_string())
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
            serde_json::Value::Number(n) => {
                let literal = n.to_string();
                Decimal::from_str(&literal)
                    .or_else(|_| Decimal::from_scientific(&literal))
                    .map(CellValue::Number)
                    .unwrap_or(CellValue::Text(literal))
            }
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(Decimal::from(value))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

// Records leave the process as JSON/YAML: numbers stay numbers, everything
// else is its display string.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) if n.scale() == 0 => match n.to_i64() {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_str(&n.to_string()),
            },
            CellValue::Number(n) => match n.to_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => serializer.serialize_str(&n.to_string()),
            },
            other => serializer.serialize_str(&other.as_display()),
        }
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let first = value.chars().next()?;
    if !(first.is_ascii_digit() || first == '-' || first == '+' || first == '.') {
        return None;
    }
    // ZIP codes and booking numbers such as "02134" keep their leading zero.
    if value.len() > 1 && value.starts_with('0') && !value.starts_with("0.") {
        return None;
    }
    Decimal::from_str(value).ok()
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_recognises_numbers_dates_and_text() {
        assert_eq!(CellValue::infer(""), CellValue::Empty);
        assert_eq!(CellValue::infer("5000"), CellValue::Number(Decimal::from(5000)));
        assert_eq!(
            CellValue::infer("1990-01-01"),
            CellValue::Date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        );
        assert_eq!(CellValue::infer("B-100"), CellValue::text("B-100"));
        assert_eq!(CellValue::infer("02134"), CellValue::text("02134"));
        assert_eq!(CellValue::infer("Jane Doe"), CellValue::text("Jane Doe"));
    }

    #[test]
    fn infer_keeps_us_dates_and_datetimes() {
        assert_eq!(
            CellValue::infer("02/14/2024"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap())
        );
        let parsed = CellValue::infer("2024-02-14 09:30:00");
        assert_eq!(parsed.as_display(), "2024-02-14 09:30:00");
    }

    #[test]
    fn decimal_display_preserves_scale() {
        assert_eq!(CellValue::infer("2500.50").as_display(), "2500.50");
    }

    #[test]
    fn from_json_maps_scalars() {
        assert_eq!(
            CellValue::from_json(&serde_json::json!(5000)),
            CellValue::Number(Decimal::from(5000))
        );
        assert_eq!(CellValue::from_json(&serde_json::Value::Null), CellValue::Empty);
        assert_eq!(
            CellValue::from_json(&serde_json::json!("5000")),
            CellValue::text("5000")
        );
        assert_eq!(
            CellValue::from_json(&serde_json::json!(true)),
            CellValue::text("true")
        );
    }

    #[test]
    fn serializes_numbers_as_json_numbers() {
        let whole = serde_json::to_string(&CellValue::from(5000_i64)).unwrap();
        assert_eq!(whole, "5000");
        let text = serde_json::to_string(&CellValue::text("B-100")).unwrap();
        assert_eq!(text, "\"B-100\"");
        let empty = serde_json::to_string(&CellValue::Empty).unwrap();
        assert_eq!(empty, "\"\"");
    }
}
