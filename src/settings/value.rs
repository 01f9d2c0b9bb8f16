//! Setting values and the result of resolving a single key.

use serde::{Deserialize, Serialize};

/// A scalar setting value as it appears in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of a number. Fractions are truncated, negatives rejected.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            SettingValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n as u32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Number(_) => "number",
            SettingValue::String(_) => "string",
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<f64> for SettingValue {
    fn from(n: f64) -> Self {
        SettingValue::Number(n)
    }
}

impl From<i32> for SettingValue {
    fn from(n: i32) -> Self {
        SettingValue::Number(n.into())
    }
}

impl From<i64> for SettingValue {
    fn from(n: i64) -> Self {
        SettingValue::Number(n as f64)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

/// Outcome of the three-tier lookup for one key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolved {
    /// Found in the `[<language>]` override section.
    LanguageOverride(SettingValue),
    /// Found in the group's own settings.
    GroupDefault(SettingValue),
    /// Not configured anywhere; callers fall back to a built-in default.
    #[default]
    Absent,
}

impl Resolved {
    pub fn value(&self) -> Option<&SettingValue> {
        match self {
            Resolved::LanguageOverride(v) | Resolved::GroupDefault(v) => Some(v),
            Resolved::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_u32_rejects_negative_and_non_numbers() {
        assert_eq!(SettingValue::Number(4.0).as_u32(), Some(4));
        assert_eq!(SettingValue::Number(2.7).as_u32(), Some(2));
        assert_eq!(SettingValue::Number(-1.0).as_u32(), None);
        assert_eq!(SettingValue::from("4").as_u32(), None);
        assert_eq!(SettingValue::Bool(true).as_u32(), None);
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: SettingValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, SettingValue::Bool(true));
        let v: SettingValue = serde_json::from_str("2").unwrap();
        assert_eq!(v, SettingValue::Number(2.0));
        let v: SettingValue = serde_json::from_str("\"3em\"").unwrap();
        assert_eq!(v, SettingValue::from("3em"));
    }

    #[test]
    fn test_resolved_value_access() {
        assert_eq!(
            Resolved::LanguageOverride(SettingValue::Bool(true)).value(),
            Some(&SettingValue::Bool(true))
        );
        assert!(Resolved::Absent.value().is_none());
        assert!(Resolved::default().is_absent());
    }
}
