//! Pointer routine recorder and player
//!
//! This crate records left/right clicks and drags together with the time
//! between them, stores them as a routine, and replays the routine with
//! humanising jitter on positions and timing.
//! Everything runs behind an [`Engine`] task driven by commands from a
//! control surface and by raw input from a capture source.

pub mod engine;
pub mod error;
pub mod events;
pub mod platform;
pub mod player;
pub mod randomizer;
pub mod recorder;
pub mod store;

pub use engine::*;
pub use error::*;
pub use events::*;
pub use platform::*;
pub use player::*;
pub use randomizer::*;
pub use recorder::*;
pub use store::{load_from_file, save_to_file, CURRENT_VERSION, DEFAULT_FILENAME};
