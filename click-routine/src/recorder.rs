use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

use crate::{Button, Event, HotKey, InputEvent, InputKind, MouseButton, Position, Result, Routine};

/// Pixels a press may travel before its release counts as a drag
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// What ends a recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTrigger {
    /// Releasing this mouse button; the button itself is never recorded
    Button(MouseButton),
    /// Pressing this key
    Key(HotKey),
}

impl StopTrigger {
    /// Parse a stop-record setting: `middle` selects the middle button,
    /// anything else names a key
    pub fn parse(name: &str) -> Result<Self> {
        if name.trim().eq_ignore_ascii_case("middle") {
            Ok(StopTrigger::Button(MouseButton::Middle))
        } else {
            HotKey::parse(name).map(StopTrigger::Key)
        }
    }
}

impl Default for StopTrigger {
    fn default() -> Self {
        StopTrigger::Button(MouseButton::Middle)
    }
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopTrigger::Button(MouseButton::Middle) => f.write_str("middle click"),
            StopTrigger::Button(button) => write!(f, "{:?} click", button),
            StopTrigger::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Configuration for the recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Maximum press-to-release distance (pixels) still recorded as a click
    pub drag_threshold_px: f64,

    /// What ends the recording
    pub stop_trigger: StopTrigger,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DRAG_THRESHOLD_PX,
            stop_trigger: StopTrigger::default(),
        }
    }
}

/// What a single notification did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// Not relevant while recording
    Ignored,
    /// A button went down; nothing is emitted until it comes back up
    Pressed,
    /// A click or drag was appended to the session
    Recorded(Event),
    /// The stop trigger fired
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    position: Position,
    at: Instant,
}

/// One recording in progress.
///
/// Turns press/release pairs into clicks and drags and measures the gap
/// since the previous event's release.
#[derive(Debug)]
pub struct RecorderSession {
    config: RecorderConfig,
    started_at: Instant,
    last_release: Instant,
    pending: HashMap<Button, PendingPress>,
    events: Vec<Event>,
}

impl RecorderSession {
    /// Start a session whose first delay is measured from `at`
    pub fn start(config: RecorderConfig, at: Instant) -> Self {
        info!(stop = %config.stop_trigger, "Recording session started");
        Self {
            config,
            started_at: at,
            last_release: at,
            pending: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Feed one capture notification through the session
    pub fn handle(&mut self, input: &InputEvent) -> SessionStep {
        match &input.kind {
            InputKind::ButtonPress { button, position } => self.on_press(*button, *position, input.at),
            InputKind::ButtonRelease { button, position } => {
                self.on_release(*button, *position, input.at)
            }
            InputKind::KeyPress(key) => match &self.config.stop_trigger {
                StopTrigger::Key(stop) if stop == key => SessionStep::Finished,
                _ => SessionStep::Ignored,
            },
            InputKind::PointerMove { .. } | InputKind::CaptureLost(_) => SessionStep::Ignored,
        }
    }

    fn is_stop_button(&self, button: MouseButton) -> bool {
        self.config.stop_trigger == StopTrigger::Button(button)
    }

    fn on_press(&mut self, button: MouseButton, position: Position, at: Instant) -> SessionStep {
        if self.is_stop_button(button) {
            return SessionStep::Ignored;
        }
        let Some(button) = button.routine_button() else {
            return SessionStep::Ignored;
        };
        self.pending.insert(button, PendingPress { position, at });
        SessionStep::Pressed
    }

    fn on_release(&mut self, button: MouseButton, position: Position, at: Instant) -> SessionStep {
        if self.is_stop_button(button) {
            return SessionStep::Finished;
        }
        let Some(button) = button.routine_button() else {
            return SessionStep::Ignored;
        };
        let Some(press) = self.pending.remove(&button) else {
            debug!(%button, "Release without a recorded press, ignoring");
            return SessionStep::Ignored;
        };

        let delay = seconds_between(self.last_release, press.at);
        let event = if press.position.distance_to(position) <= self.config.drag_threshold_px {
            Event::click(button, press.position, delay)
        } else {
            let duration = seconds_between(press.at, at);
            Event::drag(button, press.position, position, duration, delay)
        };
        self.last_release = at;

        debug!(index = self.events.len(), %event, "Recorded event");
        self.events.push(event.clone());
        SessionStep::Recorded(event)
    }

    /// End the session. Presses still held are dropped.
    pub fn finish(self) -> Routine {
        if !self.pending.is_empty() {
            debug!(
                held = self.pending.len(),
                "Discarding presses without a release"
            );
        }
        info!(
            events = self.events.len(),
            secs = seconds_between(self.started_at, self.last_release),
            "Recording session finished"
        );
        Routine::from_events(self.events)
    }
}

/// Seconds from `earlier` to `later`, rounded to the millisecond
fn seconds_between(earlier: Instant, later: Instant) -> f64 {
    let secs = later.saturating_duration_since(earlier).as_secs_f64();
    (secs * 1000.0).round() / 1000.0
}
