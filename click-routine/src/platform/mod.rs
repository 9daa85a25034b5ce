//! Boundary between the engine and the operating system's pointer devices.
//!
//! Capture sources push [`InputEvent`]s into an [`InputFeed`] in the order
//! they happened; the engine never assumes how they are delivered.
//! Playback drives a [`PointerSink`].

use std::time::Instant;
use tokio::sync::mpsc;

use crate::{Button, HotKey, MouseButton, Position, Result, ScreenBounds};

#[cfg(feature = "rdev")]
mod native;

#[cfg(feature = "rdev")]
pub use self::native::{RdevInput, RdevSink};

/// A raw notification from the capture source
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    /// When the notification was observed; monotonic across a feed
    pub at: Instant,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn new(at: Instant, kind: InputKind) -> Self {
        Self { at, kind }
    }

    pub fn now(kind: InputKind) -> Self {
        Self::new(Instant::now(), kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    ButtonPress { button: MouseButton, position: Position },
    ButtonRelease { button: MouseButton, position: Position },
    PointerMove { position: Position },
    KeyPress(HotKey),
    /// The source stopped delivering notifications
    CaptureLost(String),
}

/// Where capture sources deliver their notifications
pub type InputFeed = mpsc::UnboundedSender<InputEvent>;

/// Create the feed a capture source writes into and the engine reads from
pub fn input_channel() -> (InputFeed, mpsc::UnboundedReceiver<InputEvent>) {
    mpsc::unbounded_channel()
}

/// A global pointer capture source
pub trait InputSource: Send {
    /// Begin delivering notifications into `feed`
    fn start(&mut self, feed: InputFeed) -> Result<()>;

    /// Stop delivering notifications. Safe to call more than once.
    fn stop(&mut self);
}

/// Synthetic pointer output used by the player
pub trait PointerSink: Send + 'static {
    fn screen_bounds(&self) -> Result<ScreenBounds>;

    fn move_to(&mut self, position: Position) -> Result<()>;

    fn press(&mut self, button: Button) -> Result<()>;

    fn release(&mut self, button: Button) -> Result<()>;
}

impl<S: PointerSink + ?Sized> PointerSink for Box<S> {
    fn screen_bounds(&self) -> Result<ScreenBounds> {
        (**self).screen_bounds()
    }

    fn move_to(&mut self, position: Position) -> Result<()> {
        (**self).move_to(position)
    }

    fn press(&mut self, button: Button) -> Result<()> {
        (**self).press(button)
    }

    fn release(&mut self, button: Button) -> Result<()> {
        (**self).release(button)
    }
}
