use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// A single raw field value as it arrives from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Yes/no coercion used for every boolean field of the bundle.
    ///
    /// Strings are true only when the whole string equals "yes" ignoring case,
    /// so padded values such as " yes" read as false. Numbers are
    /// true when finite and non-zero. Null and NaN carry no token and read as false.
    pub fn as_flag(&self) -> bool {
        match self {
            Self::Text(s) => s.eq_ignore_ascii_case("yes"),
            Self::Bool(b) => *b,
            Self::Number(n) => n.is_finite() && *n != 0.0,
            Self::Null => false,
        }
    }

    /// Numeric coercion. Text is parsed after trimming; anything else yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(_) | Self::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    /// String form handed to categorical encoders.
    pub fn as_category(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Null => "nan".to_string(),
        }
    }

    /// Free-text form; null becomes the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.as_category(),
        }
    }

    /// Exact equality between two raw values, where null never equals anything.
    pub fn same_as(&self, other: &RawValue) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// One traffic-stop record: field name to raw value.
///
/// Owned by the caller; the pipeline only borrows it for the duration of a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<RawValue> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, RawValue>> for RawRecord {
    fn from(fields: HashMap<String, RawValue>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_coercion() {
        assert!(RawValue::from("Yes").as_flag());
        assert!(RawValue::from("YES").as_flag());
        assert!(!RawValue::from(" YES ").as_flag());
        assert!(!RawValue::from(" yes").as_flag());
        assert!(!RawValue::from("No").as_flag());
        assert!(!RawValue::from("y").as_flag());
        assert!(RawValue::from(true).as_flag());
        assert!(RawValue::from(1).as_flag());
        assert!(!RawValue::from(0).as_flag());
        assert!(!RawValue::Number(f64::NAN).as_flag());
        assert!(!RawValue::Null.as_flag());
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(RawValue::from("2015").as_number(), Some(2015.0));
        assert_eq!(RawValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(RawValue::from("abc").as_number(), None);
        assert_eq!(RawValue::Number(f64::INFINITY).as_number(), None);
        assert_eq!(RawValue::Null.as_number(), None);
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(RawValue::from("TOYOTA").as_category(), "TOYOTA");
        assert_eq!(RawValue::from(2015).as_category(), "2015");
        assert_eq!(RawValue::Null.as_category(), "nan");
        assert_eq!(RawValue::Null.as_text(), "");
    }

    #[test]
    fn test_record_from_json() {
        let record = RawRecord::from_json_str(
            r#"{"Make": "HONDA", "Points": 2, "Alcohol": false, "Latitude": null}"#,
        )
        .unwrap();
        assert_eq!(record.get("Make"), Some(&RawValue::from("HONDA")));
        assert_eq!(record.get("Points"), Some(&RawValue::Number(2.0)));
        assert_eq!(record.get("Alcohol"), Some(&RawValue::Bool(false)));
        assert_eq!(record.get("Latitude"), Some(&RawValue::Null));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_same_as_is_exact() {
        assert!(RawValue::from("MD").same_as(&RawValue::from("MD")));
        assert!(!RawValue::from("MD").same_as(&RawValue::from("md")));
        assert!(!RawValue::Null.same_as(&RawValue::Null));
    }
}
