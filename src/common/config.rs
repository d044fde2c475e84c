// src/common/config.rs

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::warn;

// --- Well-known keys (matched case-insensitively) ---

pub const KEY_NAME: &str = "name";
pub const KEY_VENDOR_CODE: &str = "vendor code";
pub const KEY_PART_CODE: &str = "part code";
pub const KEY_COM_PORT: &str = "com port";

/// A malformed configuration row. The row is skipped; parsing continues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigParseError {
    /// Row has a key but no value column.
    #[error("config row {row}: missing value column")]
    MissingValue { row: usize },
    /// Row has an empty key column.
    #[error("config row {row}: empty key")]
    EmptyKey { row: usize },
}

/// Ordered key/value configuration.
///
/// Keys keep the spelling they were first stored with; lookups and updates
/// compare keys case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: Vec<(String, String)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from raw rows, skipping malformed ones.
    ///
    /// `row` numbers in the logged errors are 1-based.
    pub fn from_rows<I, R, F>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        let mut map = ConfigMap::new();
        for (idx, fields) in rows.into_iter().enumerate() {
            match parse_row(idx + 1, fields) {
                Ok((key, value)) => map.upsert(&key, &value),
                Err(e) => warn!("Skipping config row: {}", e),
            }
        }
        map
    }

    /// Value for `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Updates the matching key in place or appends it. Other entries are untouched.
    pub fn upsert(&mut self, key: &str, value: &str) {
        let key = key.trim();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses one `key,value` row. Extra columns are ignored; both fields are trimmed.
pub fn parse_row<R, F>(row: usize, fields: R) -> Result<(String, String), ConfigParseError>
where
    R: IntoIterator<Item = F>,
    F: AsRef<str>,
{
    let mut fields = fields.into_iter();
    let key = fields
        .next()
        .map(|k| k.as_ref().trim().to_string())
        .unwrap_or_default();
    let value = fields
        .next()
        .map(|v| v.as_ref().trim().to_string())
        .ok_or(ConfigParseError::MissingValue { row })?;
    if key.is_empty() {
        return Err(ConfigParseError::EmptyKey { row });
    }
    Ok((key, value))
}

/// Typed view of the station identity keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationIdentity {
    /// Operator / line name shown in the title area.
    pub name: String,
    /// Vendor token embedded in every traceability code.
    pub vendor_code: String,
    /// Default part token until the operator selects a model.
    pub part_code: String,
    /// Last channel the operator connected to.
    pub com_port: String,
}

impl StationIdentity {
    pub fn from_config(config: &ConfigMap) -> Self {
        let field = |key: &str| config.get(key).unwrap_or_default().to_string();
        StationIdentity {
            name: field(KEY_NAME),
            vendor_code: field(KEY_VENDOR_CODE),
            part_code: field(KEY_PART_CODE),
            com_port: field(KEY_COM_PORT),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> ConfigMap {
        ConfigMap::from_rows(vec![
            vec!["Name", "Line 3"],
            vec!["Vendor Code", "VN01"],
            vec!["Part Code", "DJ9600267A"],
            vec!["COM Port", "COM3"],
        ])
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let config = sample();
        assert_eq!(config.get("name"), Some("Line 3"));
        assert_eq!(config.get("VENDOR CODE"), Some("VN01"));
        assert_eq!(config.get(" com port "), Some("COM3"));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_upsert_preserves_other_keys() {
        let mut config = sample();
        config.upsert("com port", "COM7");
        assert_eq!(config.len(), 4);
        assert_eq!(config.get("COM Port"), Some("COM7"));
        assert_eq!(config.get("name"), Some("Line 3"));
        assert_eq!(config.get("vendor code"), Some("VN01"));
        assert_eq!(config.get("part code"), Some("DJ9600267A"));
        // Original key spelling is kept
        let keys: Vec<&str> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Name", "Vendor Code", "Part Code", "COM Port"]);
    }

    #[test]
    fn test_upsert_appends_new_key() {
        let mut config = ConfigMap::new();
        config.upsert("COM Port", "COM1");
        assert_eq!(config.iter().collect::<Vec<_>>(), [("COM Port", "COM1")]);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let config = ConfigMap::from_rows(vec![
            vec!["name", "A"],
            vec!["orphan"],
            vec![],
            vec!["  ", "x"],
            vec!["part code", " P1 ", "extra"],
        ]);
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("part code"), Some("P1"));
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(parse_row(3, ["key"]), Err(ConfigParseError::MissingValue { row: 3 }));
        assert_eq!(parse_row(4, ["", "v"]), Err(ConfigParseError::EmptyKey { row: 4 }));
        assert_eq!(
            parse_row(1, ["k ", " v"]),
            Ok((String::from("k"), String::from("v")))
        );
    }

    #[test]
    fn test_identity_from_config() {
        let identity = StationIdentity::from_config(&sample());
        assert_eq!(identity.vendor_code, "VN01");
        assert_eq!(identity.part_code, "DJ9600267A");
        assert_eq!(identity.com_port, "COM3");

        let empty = StationIdentity::from_config(&ConfigMap::new());
        assert_eq!(empty, StationIdentity::default());
    }
}
