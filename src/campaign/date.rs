use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use mongodb::bson;
use serde_json::{json, Map, Value};

// 0001-01-01T00:00:00Z, written by the dashboard in place of a missing date
pub const NULL_DATE_MILLIS: i64 = -62_135_596_800_000;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const DATE_KEY: &str = "$date";
const NUMBER_LONG_KEY: &str = "$numberLong";

const NULL_DATE_PREFIXES: &[&str] = &["0001-01-01", "1970-01-01T00:00:00"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFormat {
    // { "$date": "2025-01-05T00:00:00.000Z" }
    IsoString,
    // { "$date": { "$numberLong": "1736035200000" } }
    NumberLong,
    // { "$date": 1736035200000 }
    Millis,
    // "2025-01-05T00:00:00.000Z"
    Bare,
}

impl Default for DateFormat {
    fn default() -> DateFormat {
        DateFormat::IsoString
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoredDate {
    pub instant: DateTime<Utc>,
    pub format: DateFormat,
}

pub fn parse_date(value: &Value) -> Option<StoredDate> {
    match value {
        Value::String(s) => parse_iso(s).map(|instant| StoredDate {
            instant,
            format: DateFormat::Bare,
        }),
        Value::Object(envelope) => match envelope.get(DATE_KEY)? {
            Value::String(s) => parse_iso(s).map(|instant| StoredDate {
                instant,
                format: DateFormat::IsoString,
            }),
            Value::Object(inner) => {
                let millis = parse_number_long(inner)?;
                Some(StoredDate {
                    instant: from_millis(millis),
                    format: DateFormat::NumberLong,
                })
            }
            Value::Number(n) => Some(StoredDate {
                instant: from_millis(n.as_i64()?),
                format: DateFormat::Millis,
            }),
            _ => None,
        },
        _ => None,
    }
}

pub fn format_date(instant: DateTime<Utc>, format: DateFormat) -> Value {
    match format {
        DateFormat::IsoString => json!({ DATE_KEY: to_iso(instant) }),
        DateFormat::NumberLong => {
            json!({ DATE_KEY: { NUMBER_LONG_KEY: to_millis(instant).to_string() } })
        }
        DateFormat::Millis => json!({ DATE_KEY: to_millis(instant) }),
        DateFormat::Bare => Value::String(to_iso(instant)),
    }
}

pub fn is_null_date(value: Option<&Value>, null_date_millis: i64) -> bool {
    let value = match value {
        None | Some(Value::Null) => return true,
        Some(value) => value,
    };

    match value {
        Value::String(s) => is_null_string(s) || is_sentinel(value, null_date_millis),
        Value::Object(envelope) => match envelope.get(DATE_KEY) {
            Some(Value::Null) => true,
            Some(Value::String(s)) if is_null_string(s) => true,
            Some(Value::Object(inner)) => parse_number_long(inner) == Some(null_date_millis),
            Some(Value::Number(n)) => n.as_i64() == Some(null_date_millis),
            _ => is_sentinel(value, null_date_millis),
        },
        _ => false,
    }
}

fn is_sentinel(value: &Value, null_date_millis: i64) -> bool {
    parse_date(value)
        .map(|date| to_millis(date.instant) == null_date_millis)
        .unwrap_or(false)
}

fn is_null_string(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || NULL_DATE_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
}

fn parse_number_long(inner: &Map<String, Value>) -> Option<i64> {
    match inner.get(NUMBER_LONG_KEY)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(DateTime::from_utc(naive, Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(DateTime::from_utc(day.and_hms(0, 0, 0), Utc))
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    bson::DateTime::from_millis(millis).to_chrono()
}

fn to_millis(instant: DateTime<Utc>) -> i64 {
    bson::DateTime::from_chrono(instant).timestamp_millis()
}

fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jan_5() -> DateTime<Utc> {
        Utc.ymd(2025, 1, 5).and_hms(0, 0, 0)
    }

    #[test]
    fn parses_iso_envelope() {
        let date = parse_date(&json!({ "$date": "2025-01-05T00:00:00.000Z" })).unwrap();

        assert_eq!(date.instant, jan_5());
        assert_eq!(date.format, DateFormat::IsoString);
    }

    #[test]
    fn parses_number_long_envelope() {
        let date = parse_date(&json!({ "$date": { "$numberLong": "1736035200000" } })).unwrap();

        assert_eq!(date.instant, jan_5());
        assert_eq!(date.format, DateFormat::NumberLong);
    }

    #[test]
    fn parses_bare_string_with_offset() {
        let date = parse_date(&json!("2025-01-05T02:00:00+02:00")).unwrap();

        assert_eq!(date.instant, jan_5());
        assert_eq!(date.format, DateFormat::Bare);
    }

    #[test]
    fn parses_integer_envelope() {
        let date = parse_date(&json!({ "$date": 1736035200000i64 })).unwrap();

        assert_eq!(date.instant, jan_5());
        assert_eq!(date.format, DateFormat::Millis);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(&json!({ "$date": "next tuesday" })), None);
        assert_eq!(parse_date(&json!({ "$date": { "$numberLong": "abc" } })), None);
        assert_eq!(parse_date(&json!({ "created": "2025-01-05" })), None);
        assert_eq!(parse_date(&json!(12)), None);
    }

    #[test]
    fn formats_in_the_requested_envelope() {
        let instant = jan_5() + chrono::Duration::milliseconds(1);

        assert_eq!(
            format_date(instant, DateFormat::IsoString),
            json!({ "$date": "2025-01-05T00:00:00.001Z" })
        );
        assert_eq!(
            format_date(instant, DateFormat::NumberLong),
            json!({ "$date": { "$numberLong": "1736035200001" } })
        );
        assert_eq!(
            format_date(instant, DateFormat::Millis),
            json!({ "$date": 1736035200001i64 })
        );
        assert_eq!(
            format_date(instant, DateFormat::Bare),
            json!("2025-01-05T00:00:00.001Z")
        );
    }

    #[test]
    fn formatted_dates_parse_back() {
        for format in [
            DateFormat::IsoString,
            DateFormat::NumberLong,
            DateFormat::Millis,
            DateFormat::Bare,
        ]
        .iter()
        {
            let date = parse_date(&format_date(jan_5(), *format)).unwrap();
            assert_eq!(date.instant, jan_5());
            assert_eq!(date.format, *format);
        }
    }

    #[test]
    fn detects_every_null_representation() {
        let null_dates = vec![
            json!(null),
            json!(""),
            json!({ "$date": "" }),
            json!({ "$date": null }),
            json!({ "$date": { "$numberLong": "-62135596800000" } }),
            json!({ "$date": -62135596800000i64 }),
            json!({ "$date": "0001-01-01T00:00:00Z" }),
            json!({ "$date": "1970-01-01T00:00:00.000Z" }),
            json!("0001-01-01T00:00:00.000Z"),
        ];

        assert!(is_null_date(None, NULL_DATE_MILLIS));
        for value in null_dates {
            assert!(
                is_null_date(Some(&value), NULL_DATE_MILLIS),
                "expected {} to be a null date",
                value
            );
        }
    }

    #[test]
    fn real_dates_are_not_null() {
        let dates = vec![
            json!({ "$date": "2025-01-05T00:00:00.000Z" }),
            json!({ "$date": { "$numberLong": "1736035200000" } }),
            json!({ "$date": "1970-01-02T00:00:00.000Z" }),
            json!("2024-12-31"),
        ];

        for value in dates {
            assert!(
                !is_null_date(Some(&value), NULL_DATE_MILLIS),
                "expected {} to be a real date",
                value
            );
        }
    }

    #[test]
    fn sentinel_is_configurable() {
        let value = json!({ "$date": { "$numberLong": "0" } });

        assert!(is_null_date(Some(&value), 0));
        assert!(!is_null_date(
            Some(&json!({ "$date": { "$numberLong": "-62135596800000" } })),
            0
        ));
    }
}
