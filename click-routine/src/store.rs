//! Routine persistence.
//!
//! Routines are written as `{"version": 2, "events": [...]}`. Loading also
//! accepts older documents: a bare array of events, or an envelope without
//! per-event delays. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::{Button, ClickRoutineError, Event, Position, Result, Routine};

/// Newest format this crate reads and the one it writes
pub const CURRENT_VERSION: u32 = 2;

/// File name used when the caller has no preference
pub const DEFAULT_FILENAME: &str = "click_routine.json";

/// Drag duration assumed when a document leaves it out
pub const DEFAULT_DRAG_SECS: f64 = 0.3;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    events: &'a [Event],
}

/// One event as found on disk, before defaults and validation
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    button: Option<Button>,
    x: i32,
    y: i32,
    end_x: Option<i32>,
    end_y: Option<i32>,
    duration: Option<f64>,
    delay: Option<f64>,
}

impl RawEvent {
    fn into_event(self, default_delay: f64) -> Result<Event> {
        let button = self.button.unwrap_or(Button::Left);
        let delay = non_negative("delay", self.delay.unwrap_or(default_delay))?;
        let start = Position::new(self.x, self.y);

        match self.kind.as_deref().unwrap_or("click") {
            "click" => Ok(Event::click(button, start, delay)),
            "drag" => {
                let (Some(end_x), Some(end_y)) = (self.end_x, self.end_y) else {
                    return Err(ClickRoutineError::ParseError(
                        "drag is missing end_x/end_y".to_string(),
                    ));
                };
                let duration = non_negative("duration", self.duration.unwrap_or(DEFAULT_DRAG_SECS))?;
                Ok(Event::drag(button, start, Position::new(end_x, end_y), duration, delay))
            }
            other => Err(ClickRoutineError::ParseError(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ClickRoutineError::ParseError(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

/// Serialize a routine in the current format
pub fn save(routine: &Routine) -> Result<Vec<u8>> {
    let envelope = Envelope {
        version: CURRENT_VERSION,
        events: routine.events(),
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Parse a routine; events without a delay wait 0 seconds
pub fn load(bytes: &[u8]) -> Result<Routine> {
    load_with_default_delay(bytes, 0.0)
}

/// Parse a routine, giving events without a delay `default_delay` seconds
pub fn load_with_default_delay(bytes: &[u8], default_delay: f64) -> Result<Routine> {
    let document: Value = serde_json::from_slice(bytes)?;
    let (version, items) = split_document(document)?;
    if version > CURRENT_VERSION {
        return Err(ClickRoutineError::VersionError {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    let events = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawEvent>(item)
                .map_err(ClickRoutineError::from)
                .and_then(|raw| raw.into_event(default_delay))
                .map_err(|e| match e {
                    ClickRoutineError::ParseError(msg) => {
                        ClickRoutineError::ParseError(format!("event {}: {}", index, msg))
                    }
                    other => other,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(version, events = events.len(), "Parsed routine");
    Ok(Routine::from_events(events))
}

fn split_document(document: Value) -> Result<(u32, Vec<Value>)> {
    match document {
        Value::Array(items) => Ok((1, items)),
        Value::Object(mut map) => {
            let version = match map.get("version") {
                None => 1,
                Some(value) => value
                    .as_u64()
                    .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
                    .ok_or_else(|| {
                        ClickRoutineError::ParseError(format!("invalid version tag {}", value))
                    })?,
            };
            match map.remove("events") {
                Some(Value::Array(items)) => Ok((version, items)),
                _ if version > CURRENT_VERSION => Ok((version, Vec::new())),
                _ => Err(ClickRoutineError::ParseError(
                    "routine has no events array".to_string(),
                )),
            }
        }
        _ => Err(ClickRoutineError::ParseError(
            "expected an array of events or a versioned routine object".to_string(),
        )),
    }
}

/// Save a routine to a JSON file
#[instrument(skip_all, fields(path = %path.as_ref().display(), events = routine.len()))]
pub fn save_to_file<P: AsRef<Path>>(routine: &Routine, path: P) -> Result<()> {
    let bytes = save(routine)?;
    std::fs::write(path.as_ref(), bytes)?;
    info!("Saved routine");
    Ok(())
}

/// Load a routine from a JSON file
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Routine> {
    let bytes = std::fs::read(path.as_ref())?;
    let routine = load(&bytes)?;
    info!(events = routine.len(), "Loaded routine");
    Ok(routine)
}
