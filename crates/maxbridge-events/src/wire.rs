//! Flat key/value transport used across the native call boundary.
//!
//! Native callbacks hand over a single string per event. Two encodings are in
//! circulation: the legacy control-character format (`key 0x1C value 0x1D`)
//! and a JSON object of fields. Decoding is best effort in both cases; bad
//! records are skipped and the caller always receives a (possibly empty)
//! [`Payload`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Separates a key from its value inside a delimited record (ASCII FS).
pub const FIELD_SEPARATOR: char = '\u{1C}';
/// Terminates a delimited record (ASCII GS).
pub const RECORD_SEPARATOR: char = '\u{1D}';

/// Decoded event body: string keys mapped to string values.
///
/// Insertion keeps the first value seen for a key; later duplicates are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    /// Construct an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of fields in the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a single field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the payload contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Value of the first key in `keys` that is present.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Insert a field unless the key is already present.
    ///
    /// Returns `false` when an earlier value was kept.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Serialize with the requested wire format.
    #[must_use]
    pub fn encode(&self, format: WireFormat) -> String {
        encode(self, format)
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (key, value) in iter {
            payload.insert_if_absent(key, value);
        }
        payload
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = Payload;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object of event fields")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Payload, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut payload = Payload::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            if let Some(text) = value_text(value) {
                payload.insert_if_absent(key, text);
            }
        }
        Ok(payload)
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

/// Encodings accepted on the native boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Control-character delimited records.
    Delimited,
    /// JSON object of fields.
    Json,
}

impl WireFormat {
    /// Guess the encoding of a raw payload.
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        if raw.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Delimited
        }
    }

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Json => "json",
        }
    }
}

/// Serialize a payload with the given format.
#[must_use]
pub fn encode(payload: &Payload, format: WireFormat) -> String {
    match format {
        WireFormat::Delimited => encode_delimited(payload),
        WireFormat::Json => encode_json(payload),
    }
}

/// Decode a raw payload with the given format.
#[must_use]
pub fn decode(raw: &str, format: WireFormat) -> Payload {
    match format {
        WireFormat::Delimited => decode_delimited(raw),
        WireFormat::Json => decode_json(raw),
    }
}

/// Decode a raw payload after sniffing its format.
#[must_use]
pub fn decode_auto(raw: &str) -> Payload {
    decode(raw, WireFormat::detect(raw))
}

fn encode_delimited(payload: &Payload) -> String {
    let mut encoded = String::new();
    for (key, value) in payload.iter() {
        encoded.push_str(key);
        encoded.push(FIELD_SEPARATOR);
        encoded.push_str(value);
        encoded.push(RECORD_SEPARATOR);
    }
    encoded
}

fn encode_json(payload: &Payload) -> String {
    Value::Object(
        payload
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect(),
    )
    .to_string()
}

fn decode_delimited(raw: &str) -> Payload {
    let mut payload = Payload::new();
    if raw.is_empty() {
        return payload;
    }

    for record in raw.split(RECORD_SEPARATOR).filter(|record| !record.is_empty()) {
        match record.split_once(FIELD_SEPARATOR) {
            Some((key, value)) => {
                if !payload.insert_if_absent(key, value) {
                    debug!(key, "duplicate wire key ignored");
                }
            }
            None => debug!(
                record_len = record.len(),
                "skipping wire record without field separator"
            ),
        }
    }

    payload
}

fn decode_json(raw: &str) -> Payload {
    if raw.trim().is_empty() {
        return Payload::new();
    }

    match serde_json::from_str::<Payload>(raw) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to decode JSON event payload");
            Payload::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Payload {
        Payload::from_iter([
            ("adUnitId", "abc"),
            ("networkName", "AdMob"),
            ("placement", ""),
            ("revenue", "0.05"),
        ])
    }

    #[test]
    fn delimited_round_trip_preserves_fields() {
        let payload = sample();
        assert_eq!(decode(&payload.encode(WireFormat::Delimited), WireFormat::Delimited), payload);
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let payload = sample();
        assert_eq!(decode(&payload.encode(WireFormat::Json), WireFormat::Json), payload);
    }

    #[test]
    fn empty_input_decodes_to_empty_payload() {
        assert!(decode("", WireFormat::Delimited).is_empty());
        assert!(decode("", WireFormat::Json).is_empty());
        assert!(decode("   ", WireFormat::Json).is_empty());
        assert!(decode_auto("").is_empty());
    }

    #[test]
    fn delimited_duplicate_keys_keep_first_value() {
        let raw = "code\u{1C}1\u{1D}code\u{1C}2\u{1D}";
        let payload = decode(raw, WireFormat::Delimited);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("code"), Some("1"));
    }

    #[test]
    fn json_duplicate_keys_keep_first_value() {
        let payload = decode(r#"{"code":"1","code":"2"}"#, WireFormat::Json);
        assert_eq!(payload.get("code"), Some("1"));
    }

    #[test]
    fn delimited_skips_records_without_separator() {
        let raw = "broken\u{1D}key\u{1C}value\u{1D}\u{1D}";
        let payload = decode(raw, WireFormat::Delimited);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("key"), Some("value"));
    }

    #[test]
    fn delimited_value_keeps_remainder_after_first_separator() {
        let raw = "key\u{1C}a\u{1C}b\u{1D}";
        let payload = decode(raw, WireFormat::Delimited);
        assert_eq!(payload.get("key"), Some("a\u{1C}b"));
    }

    #[test]
    fn delimited_tolerates_missing_trailing_separator() {
        let payload = decode("a\u{1C}1\u{1D}b\u{1C}2", WireFormat::Delimited);
        assert_eq!(payload.get("a"), Some("1"));
        assert_eq!(payload.get("b"), Some("2"));
    }

    #[test]
    fn json_scalars_render_as_text() {
        let payload = decode(
            r#"{"code":204,"revenue":0.5,"isTablet":true,"placement":null,"waterfall":{"name":"w"}}"#,
            WireFormat::Json,
        );
        assert_eq!(payload.get("code"), Some("204"));
        assert_eq!(payload.get("revenue"), Some("0.5"));
        assert_eq!(payload.get("isTablet"), Some("true"));
        assert!(!payload.contains_key("placement"));
        assert_eq!(payload.get("waterfall"), Some(r#"{"name":"w"}"#));
    }

    #[test]
    fn json_garbage_and_non_objects_decode_to_empty() {
        assert!(decode("{not json", WireFormat::Json).is_empty());
        assert!(decode("[1,2,3]", WireFormat::Json).is_empty());
        assert!(decode("\"text\"", WireFormat::Json).is_empty());
    }

    #[test]
    fn detect_sniffs_json_objects() {
        assert_eq!(WireFormat::detect("  {\"a\":\"b\"}"), WireFormat::Json);
        assert_eq!(WireFormat::detect("a\u{1C}b\u{1D}"), WireFormat::Delimited);
        assert_eq!(
            decode_auto("{\"adUnitId\":\"x\"}").get("adUnitId"),
            Some("x")
        );
    }

    #[test]
    fn first_of_prefers_earlier_aliases() {
        let payload = Payload::from_iter([("adUnitIdentifier", "new"), ("adUnitId", "old")]);
        assert_eq!(payload.first_of(&["adUnitId", "adUnitIdentifier"]), Some("old"));
        assert_eq!(payload.first_of(&["missing", "adUnitIdentifier"]), Some("new"));
        assert_eq!(payload.first_of(&["missing"]), None);
    }
}
