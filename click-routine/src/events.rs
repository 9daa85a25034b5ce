use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ClickRoutineError, Result};

/// Represents a position on the screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position, in pixels
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Size of the screen the routine is replayed on.
///
/// Valid coordinates are `0..width` and `0..height`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest valid x coordinate
    pub fn max_x(&self) -> i32 {
        clamp_extent(self.width)
    }

    /// Largest valid y coordinate
    pub fn max_y(&self) -> i32 {
        clamp_extent(self.height)
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..=self.max_x()).contains(&position.x) && (0..=self.max_y()).contains(&position.y)
    }

    /// Pull a position back inside the screen
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(0, self.max_x()),
            y: position.y.clamp(0, self.max_y()),
        }
    }
}

fn clamp_extent(extent: u32) -> i32 {
    i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX)
}

/// A button that can be part of a routine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
}

impl Button {
    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the physical mouse button reported by the capture source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

impl MouseButton {
    /// The routine button this physical button records as, if any
    pub fn routine_button(&self) -> Option<Button> {
        match self {
            MouseButton::Left => Some(Button::Left),
            MouseButton::Right => Some(Button::Right),
            MouseButton::Middle | MouseButton::Other(_) => None,
        }
    }
}

impl From<Button> for MouseButton {
    fn from(button: Button) -> Self {
        match button {
            Button::Left => MouseButton::Left,
            Button::Right => MouseButton::Right,
        }
    }
}

/// A keyboard key named the way hotkey fields spell it: `f8`, `esc`, `a`.
///
/// Names are trimmed and lowercased so `" F8 "` and `"f8"` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotKey(String);

impl HotKey {
    pub fn parse(name: &str) -> Result<Self> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ClickRoutineError::ParseError(
                "hotkey name must not be empty".to_string(),
            ));
        }
        let normalized = match normalized.as_str() {
            "escape" => "esc".to_string(),
            "return" => "enter".to_string(),
            _ => normalized,
        };
        Ok(Self(normalized))
    }

    /// Wrap a name already in normalized form
    pub(crate) fn normalized(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Parse a user-entered name, keeping `default` when it is unusable
    pub fn parse_or(name: &str, default: HotKey) -> Self {
        Self::parse(name).unwrap_or(default)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HotKey {
    type Error = ClickRoutineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HotKey> for String {
    fn from(key: HotKey) -> Self {
        key.0
    }
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single pointer action of a routine.
///
/// `delay` is the number of seconds to wait before the action, counted
/// from the end of the previous one. A drag holds `button` for `duration`
/// seconds while travelling from `(x, y)` to `(end_x, end_y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Click {
        button: Button,
        x: i32,
        y: i32,
        delay: f64,
    },
    Drag {
        button: Button,
        x: i32,
        y: i32,
        end_x: i32,
        end_y: i32,
        duration: f64,
        delay: f64,
    },
}

impl Event {
    pub fn click(button: Button, position: Position, delay: f64) -> Self {
        Event::Click {
            button,
            x: position.x,
            y: position.y,
            delay,
        }
    }

    pub fn drag(button: Button, start: Position, end: Position, duration: f64, delay: f64) -> Self {
        Event::Drag {
            button,
            x: start.x,
            y: start.y,
            end_x: end.x,
            end_y: end.y,
            duration,
            delay,
        }
    }

    pub fn button(&self) -> Button {
        match self {
            Event::Click { button, .. } | Event::Drag { button, .. } => *button,
        }
    }

    /// Where the action starts (the click point for clicks)
    pub fn position(&self) -> Position {
        match self {
            Event::Click { x, y, .. } | Event::Drag { x, y, .. } => Position::new(*x, *y),
        }
    }

    /// Where a drag ends; `None` for clicks
    pub fn end_position(&self) -> Option<Position> {
        match self {
            Event::Click { .. } => None,
            Event::Drag { end_x, end_y, .. } => Some(Position::new(*end_x, *end_y)),
        }
    }

    pub fn delay(&self) -> f64 {
        match self {
            Event::Click { delay, .. } | Event::Drag { delay, .. } => *delay,
        }
    }

    /// Seconds the button is held while dragging; `None` for clicks
    pub fn duration(&self) -> Option<f64> {
        match self {
            Event::Click { .. } => None,
            Event::Drag { duration, .. } => Some(*duration),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Click { .. } => "click",
            Event::Drag { .. } => "drag",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Click { button, x, y, delay } => {
                write!(f, "click {} at ({}, {}) after {:.3}s", button, x, y, delay)
            }
            Event::Drag {
                button,
                x,
                y,
                end_x,
                end_y,
                duration,
                delay,
            } => write!(
                f,
                "drag {} ({}, {}) -> ({}, {}) over {:.3}s after {:.3}s",
                button, x, y, end_x, end_y, duration, delay
            ),
        }
    }
}

/// An ordered list of events; position in the list is execution order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Routine {
    events: Vec<Event>,
}

impl Routine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Remove the event at `index`, shifting later events up
    pub fn remove(&mut self, index: usize) -> Result<Event> {
        if index >= self.events.len() {
            return Err(ClickRoutineError::IndexError {
                index,
                len: self.events.len(),
            });
        }
        Ok(self.events.remove(index))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Seconds one pass takes with recorded timing and no jitter
    pub fn recorded_duration(&self) -> f64 {
        self.events
            .iter()
            .map(|event| event.delay() + event.duration().unwrap_or(0.0))
            .sum()
    }
}

impl From<Vec<Event>> for Routine {
    fn from(events: Vec<Event>) -> Self {
        Self::from_events(events)
    }
}

impl<'a> IntoIterator for &'a Routine {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
