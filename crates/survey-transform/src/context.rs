//! Record context decoding: location, launch context and UTC time.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Location status reported when the client had no fix.
pub const LOCATION_UNAVAILABLE: &str = "unavailable";

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub provider: Option<String>,
    /// Fix time as stored by the client, epoch millis or a timestamp string.
    #[serde(default, alias = "time")]
    pub timestamp: Option<Value>,
    /// Zone the fix time was recorded in.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Decode a stored location blob.
///
/// Returns `Ok(None)` when the status says no location was taken or no blob
/// was stored.
pub fn parse_location(
    status: Option<&str>,
    blob: Option<&str>,
) -> Result<Option<Location>, serde_json::Error> {
    if status.is_some_and(|status| status.eq_ignore_ascii_case(LOCATION_UNAVAILABLE)) {
        return Ok(None);
    }
    match blob.map(str::trim).filter(|blob| !blob.is_empty()) {
        Some(blob) => {
            let mut location: Location = serde_json::from_str(blob)?;
            location.latitude = location.latitude.filter(|value| value.is_finite());
            location.longitude = location.longitude.filter(|value| value.is_finite());
            location.accuracy = location.accuracy.filter(|value| value.is_finite());
            Ok(Some(location))
        }
        None => Ok(None),
    }
}

/// Decode a stored launch context blob into its long form.
pub fn parse_launch_context(blob: Option<&str>) -> Result<Option<Value>, serde_json::Error> {
    match blob.map(str::trim).filter(|blob| !blob.is_empty()) {
        Some(blob) => serde_json::from_str(blob).map(Some),
        None => Ok(None),
    }
}

fn copy_string(from: &Map<String, Value>, key: &str, into: &mut Map<String, Value>) {
    if let Some(Value::String(value)) = from.get(key) {
        into.insert(key.to_string(), Value::String(value.clone()));
    }
}

/// Reduce a long launch context to launch time and trigger summaries.
pub fn short_launch_context(long: &Value) -> Value {
    let mut short = Map::new();
    let Some(object) = long.as_object() else {
        return Value::Object(short);
    };
    copy_string(object, "launch_time", &mut short);

    if let Some(Value::Array(triggers)) = object.get("active_triggers") {
        let summaries = triggers
            .iter()
            .map(|trigger| {
                let mut summary = Map::new();
                if let Some(trigger) = trigger.as_object() {
                    copy_string(trigger, "trigger_type", &mut summary);
                    if let Some(Value::Object(runtime)) = trigger.get("runtime_description") {
                        copy_string(runtime, "trigger_timestamp", &mut summary);
                        copy_string(runtime, "trigger_timezone", &mut summary);
                    }
                }
                Value::Object(summary)
            })
            .collect();
        short.insert("active_triggers".to_string(), Value::Array(summaries));
    }
    Value::Object(short)
}

/// Parse a fixed timezone designator into an offset.
///
/// Accepts `UTC`, `GMT`, `Z`, `Etc/UTC` and signed offsets such as `+02:00`,
/// `-0500` or `GMT+01:00`. Region names are handled by [`local_to_utc`].
pub fn parse_fixed_offset(timezone: &str) -> Option<FixedOffset> {
    let trimmed = timezone.trim();
    if !trimmed.is_ascii() {
        return None;
    }
    let upper = trimmed.to_ascii_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z" | "ETC/UTC" | "ETC/GMT") {
        return FixedOffset::east_opt(0);
    }
    let offset = ["GMT", "UTC"]
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .unwrap_or(upper.as_str());

    let (sign, rest) = match offset.as_bytes().first().copied()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if rest.len() > 2 => rest.split_at(rest.len() - 2),
        None => (rest, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a stored local timestamp.
pub fn parse_local_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp.trim(), format).ok())
}

/// Place a local time in its zone.
///
/// Named zones (`America/Los_Angeles`) are resolved through the tz database;
/// anything else must be a fixed designator. A local time repeated by a DST
/// fall-back resolves to the earlier instant. One skipped by a spring-forward
/// has no instant.
pub fn local_to_utc(local: &NaiveDateTime, timezone: &str) -> Option<DateTime<Utc>> {
    let trimmed = timezone.trim();
    if let Ok(zone) = trimmed.parse::<Tz>() {
        return zone
            .from_local_datetime(local)
            .earliest()
            .map(|instant| instant.with_timezone(&Utc));
    }
    parse_fixed_offset(trimmed)?
        .from_local_datetime(local)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
}

/// Instant of a stored local timestamp in its timezone.
pub fn resolve_instant(timestamp: &str, timezone: &str) -> Option<DateTime<Utc>> {
    local_to_utc(&parse_local_timestamp(timestamp)?, timezone)
}

/// Read a stored UTC timestamp.
pub fn parse_utc_timestamp(utc: &str) -> Option<DateTime<Utc>> {
    parse_local_timestamp(utc).map(|naive| naive.and_utc())
}

pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}

/// Calendar date of a stored local timestamp.
pub fn local_date(timestamp: &str) -> Option<String> {
    parse_local_timestamp(timestamp).map(|local| local.format(DATE_FORMAT).to_string())
}

/// Derive a UTC timestamp from a local timestamp and its timezone.
pub fn derive_utc_timestamp(timestamp: &str, timezone: &str) -> Option<String> {
    resolve_instant(timestamp, timezone).map(|instant| format_utc(&instant))
}
