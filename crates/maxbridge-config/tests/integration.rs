use maxbridge_config::defaults::{ENV_QUEUE_CAPACITY, ENV_WIRE_FORMAT};
use maxbridge_config::{BridgeSettings, ConfigError, WireFormatSetting};
use maxbridge_events::WireFormat;

#[test]
fn settings_drive_dispatcher_format() -> Result<(), ConfigError> {
    let settings = BridgeSettings::from_vars([
        (ENV_WIRE_FORMAT.to_string(), "json".to_string()),
        (ENV_QUEUE_CAPACITY.to_string(), "4".to_string()),
    ])?;
    assert_eq!(settings.wire_format, WireFormatSetting::Json);
    assert_eq!(settings.wire_format.to_wire_format(), Some(WireFormat::Json));
    assert_eq!(settings.queue_capacity, 4);
    Ok(())
}

#[test]
fn later_pairs_override_earlier_ones() -> Result<(), ConfigError> {
    let settings = BridgeSettings::from_vars([
        ("MAXBRIDGE_WIRE_FORMAT", "json"),
        ("MAXBRIDGE_WIRE_FORMAT", "delimited"),
    ])?;
    assert_eq!(settings.wire_format, WireFormatSetting::Delimited);
    Ok(())
}

#[test]
fn malformed_values_report_the_variable() {
    let err = BridgeSettings::from_vars([("MAXBRIDGE_LOG_FORMAT", "xml")]);
    match err {
        Err(ConfigError::InvalidField { field, value, .. }) => {
            assert_eq!(field, "MAXBRIDGE_LOG_FORMAT");
            assert_eq!(value.as_deref(), Some("xml"));
        }
        other => panic!("expected invalid field, got {other:?}"),
    }
}
