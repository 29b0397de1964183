//! Command handlers; each returns the text to print.

use std::fmt::Write as _;
use std::io::{self, Read};

use maxbridge_events::wire::{decode, decode_auto};
use maxbridge_events::{Event, Payload, WireFormat, route_raw};
use serde_json::json;

use crate::bootstrap::DemoReport;
use crate::cli::{DecodeArgs, EncodeArgs, OutputFormat, RouteArgs};
use crate::error::{AppError, AppResult};

const STDIN_MARKER: &str = "-";

pub(crate) fn decode_command(args: &DecodeArgs, output: OutputFormat) -> AppResult<String> {
    let raw = read_raw(&args.raw)?;
    let payload = match args.format.wire_format() {
        Some(format) => decode(&raw, format),
        None => decode_auto(&raw),
    };
    match output {
        OutputFormat::Json => to_json(&payload),
        OutputFormat::Text => Ok(payload
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub(crate) fn encode_command(args: &EncodeArgs, output: OutputFormat) -> AppResult<String> {
    let payload = parse_pairs(&args.pairs)?;
    let format = args.format.wire_format().unwrap_or(WireFormat::Json);
    let encoded = payload.encode(format);
    match output {
        OutputFormat::Json => to_json(&json!({
            "format": format.as_str(),
            "payload": encoded,
        })),
        OutputFormat::Text => Ok(encoded),
    }
}

pub(crate) fn route_command(args: &RouteArgs, output: OutputFormat) -> AppResult<String> {
    let raw = read_raw(&args.raw)?;
    let event = route_raw(&args.name, &raw, args.format.wire_format()).ok_or_else(|| {
        AppError::UnknownEvent {
            name: args.name.clone(),
        }
    })?;
    match output {
        OutputFormat::Json => to_json(&event),
        OutputFormat::Text => Ok(describe(&event)),
    }
}

pub(crate) fn render_demo(report: &DemoReport, output: OutputFormat) -> AppResult<String> {
    if output == OutputFormat::Json {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|(topic, error)| json!({ "event": topic.event_name(), "error": error }))
            .collect();
        return to_json(&json!({
            "delivered": report.delivered,
            "events": report.envelopes,
            "rewards": report.rewards,
            "revenue": report.revenue,
            "failures": failures,
        }));
    }

    let mut text = format!("delivered {} events", report.delivered);
    for envelope in &report.envelopes {
        let _ = write!(text, "\n#{} {}", envelope.id, describe(&envelope.event));
    }
    for reward in &report.rewards {
        let _ = write!(text, "\n{reward}");
    }
    let _ = write!(text, "\nrevenue: {:.4} USD", report.revenue);
    for (topic, error) in &report.failures {
        let _ = write!(
            text,
            "\nfailure: {} code={} {}",
            topic.event_name(),
            error.code,
            error.message
        );
    }
    Ok(text)
}

fn describe(event: &Event) -> String {
    match event {
        Event::SdkInitialized { configuration } => format!(
            "{} country={} geography={:?}",
            event.kind(),
            configuration.country_code,
            configuration.consent_flow_user_geography
        ),
        Event::CmpCompleted { error: None } => event.kind().to_string(),
        Event::CmpCompleted { error: Some(error) } => {
            format!("{} code={} {}", event.kind(), error.code, error.message)
        }
        Event::Ad { info, .. } => format!(
            "{} ad_unit={} placement={} revenue={}",
            event.kind(),
            info.ad_unit_identifier,
            info.placement,
            info.revenue
        ),
        Event::AdFailed { info, error, .. } => format!(
            "{} ad_unit={} code={} {}",
            event.kind(),
            info.ad_unit_identifier,
            error.code,
            error.message
        ),
        Event::RewardReceived { info, reward } => format!(
            "{} ad_unit={} {reward}",
            event.kind(),
            info.ad_unit_identifier
        ),
    }
}

fn parse_pairs(pairs: &[String]) -> AppResult<Payload> {
    let mut payload = Payload::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| AppError::InvalidArgument {
                field: "pairs",
                reason: "expected key=value",
                value: Some(pair.clone()),
            })?;
        payload.insert_if_absent(key, value);
    }
    Ok(payload)
}

fn read_raw(raw: &str) -> AppResult<String> {
    if raw != STDIN_MARKER {
        return Ok(raw.to_string());
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| AppError::io("stdin.read", err))?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| AppError::Render { source })
}
