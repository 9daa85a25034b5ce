use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::EngineState;

/// Error types for recording and playing routines
#[derive(Debug, Error)]
pub enum ClickRoutineError {
    /// Playback was requested for a routine without events
    #[error("No events to play: record or load a routine first")]
    EmptyRoutineError,

    /// A persisted routine could not be understood
    #[error("Failed to parse routine: {0}")]
    ParseError(String),

    /// A persisted routine was written by a newer format
    #[error("Routine format version {found} is newer than supported version {supported}")]
    VersionError { found: u32, supported: u32 },

    /// A command needs the engine idle but another activity is running
    #[error("Cannot {requested} while {active}")]
    ConcurrentActivityError {
        requested: &'static str,
        active: EngineState,
    },

    /// Pause or resume with no playback in the matching state
    #[error("Nothing to {requested}: engine is {state}")]
    NotPlayingError {
        requested: &'static str,
        state: EngineState,
    },

    /// The pointer capture source failed or is unavailable
    #[error("Input capture failed: {0}")]
    InputCaptureError(String),

    /// The synthetic pointer output failed or is unavailable
    #[error("Output synthesis failed: {0}")]
    OutputSynthesisError(String),

    /// An event index outside the routine
    #[error("No event at index {index}: routine has {len} event(s)")]
    IndexError { index: usize, len: usize },

    /// The engine task is no longer running
    #[error("Engine has shut down")]
    EngineStopped,

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClickRoutineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClickRoutineError::EmptyRoutineError => ErrorKind::EmptyRoutine,
            ClickRoutineError::ParseError(_) => ErrorKind::Parse,
            ClickRoutineError::VersionError { .. } => ErrorKind::Version,
            ClickRoutineError::ConcurrentActivityError { .. } => ErrorKind::ConcurrentActivity,
            ClickRoutineError::NotPlayingError { .. } => ErrorKind::NotPlaying,
            ClickRoutineError::InputCaptureError(_) => ErrorKind::InputCapture,
            ClickRoutineError::OutputSynthesisError(_) => ErrorKind::OutputSynthesis,
            ClickRoutineError::IndexError { .. } => ErrorKind::Index,
            ClickRoutineError::EngineStopped => ErrorKind::EngineStopped,
            ClickRoutineError::IoError(_) => ErrorKind::Io,
        }
    }

    /// Only capture and synthesis failures end the running activity
    pub fn is_activity_fatal(&self) -> bool {
        matches!(
            self,
            ClickRoutineError::InputCaptureError(_) | ClickRoutineError::OutputSynthesisError(_)
        )
    }
}

impl From<serde_json::Error> for ClickRoutineError {
    fn from(e: serde_json::Error) -> Self {
        ClickRoutineError::ParseError(e.to_string())
    }
}

/// Machine-readable error category reported to the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyRoutine,
    Parse,
    Version,
    ConcurrentActivity,
    NotPlaying,
    InputCapture,
    OutputSynthesis,
    Index,
    EngineStopped,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyRoutine => "empty routine",
            ErrorKind::Parse => "parse",
            ErrorKind::Version => "version",
            ErrorKind::ConcurrentActivity => "concurrent activity",
            ErrorKind::NotPlaying => "not playing",
            ErrorKind::InputCapture => "input capture",
            ErrorKind::OutputSynthesis => "output synthesis",
            ErrorKind::Index => "index",
            ErrorKind::EngineStopped => "engine stopped",
            ErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

/// Result type for click routine operations
pub type Result<T> = std::result::Result<T, ClickRoutineError>;
