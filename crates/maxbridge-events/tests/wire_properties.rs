//! Property tests for the wire codec.
//!
//! Any payload whose text avoids the delimiter characters survives an
//! encode/decode cycle in both formats, and repeated keys keep their first value.

use std::collections::BTreeMap;

use maxbridge_events::wire::decode;
use maxbridge_events::{FIELD_SEPARATOR, Payload, RECORD_SEPARATOR, WireFormat};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[^\x1C\x1D]{0,12}").expect("valid regex")
}

fn fields_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(text_strategy(), text_strategy(), 0..8)
}

fn format_strategy() -> impl Strategy<Value = WireFormat> {
    prop_oneof![Just(WireFormat::Delimited), Just(WireFormat::Json)]
}

fn delimited(records: &[(&str, &str)]) -> String {
    records
        .iter()
        .map(|(key, value)| format!("{key}{FIELD_SEPARATOR}{value}{RECORD_SEPARATOR}"))
        .collect()
}

fn json(records: &[(&str, &str)]) -> String {
    let fields: Vec<String> = records
        .iter()
        .map(|(key, value)| {
            format!(
                "{}:{}",
                serde_json::Value::from(*key),
                serde_json::Value::from(*value)
            )
        })
        .collect();
    format!("{{{}}}", fields.join(","))
}

proptest! {
    #[test]
    fn encoded_payloads_decode_unchanged(
        fields in fields_strategy(),
        format in format_strategy(),
    ) {
        let payload: Payload = fields.into_iter().collect();
        let decoded = decode(&payload.encode(format), format);
        prop_assert_eq!(decoded, payload);
    }

    #[test]
    fn repeated_keys_keep_the_first_value(
        key in text_strategy(),
        first in text_strategy(),
        second in text_strategy(),
        others in fields_strategy(),
    ) {
        let mut records = vec![(key.as_str(), first.as_str())];
        records.extend(
            others
                .iter()
                .filter(|(other, _)| **other != key)
                .map(|(other, value)| (other.as_str(), value.as_str())),
        );
        records.push((key.as_str(), second.as_str()));

        let expected: Payload = records.iter().copied().collect();
        prop_assert_eq!(expected.get(&key), Some(first.as_str()));

        let from_delimited = decode(&delimited(&records), WireFormat::Delimited);
        prop_assert_eq!(&from_delimited, &expected);

        let from_json = decode(&json(&records), WireFormat::Json);
        prop_assert_eq!(&from_json, &expected);
    }
}
