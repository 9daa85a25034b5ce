#![allow(dead_code)]

use click_routine::{
    Button, ClickRoutineError, Event, PointerSink, Position, Result, Routine, ScreenBounds,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Position),
    Press(Button),
    Release(Button),
}

#[derive(Debug, Clone, Copy)]
pub struct Logged {
    pub at: Instant,
    pub action: Action,
}

/// Pointer sink that logs every action with the (tokio) time it happened
#[derive(Clone)]
pub struct MockSink {
    log: Arc<Mutex<Vec<Logged>>>,
    bounds: ScreenBounds,
    broken: Arc<AtomicBool>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::with_bounds(ScreenBounds::new(1920, 1080))
    }

    pub fn with_bounds(bounds: ScreenBounds) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            bounds,
            broken: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following action fail
    pub fn break_output(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn log(&self) -> Vec<Logged> {
        self.log.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.log().into_iter().map(|entry| entry.action).collect()
    }

    pub fn presses(&self) -> Vec<Logged> {
        self.log()
            .into_iter()
            .filter(|entry| matches!(entry.action, Action::Press(_)))
            .collect()
    }

    pub fn releases(&self) -> usize {
        self.actions()
            .iter()
            .filter(|action| matches!(action, Action::Release(_)))
            .count()
    }

    fn push(&self, action: Action) -> Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ClickRoutineError::OutputSynthesisError(
                "mock output unplugged".to_string(),
            ));
        }
        self.log.lock().unwrap().push(Logged {
            at: Instant::now(),
            action,
        });
        Ok(())
    }
}

impl PointerSink for MockSink {
    fn screen_bounds(&self) -> Result<ScreenBounds> {
        Ok(self.bounds)
    }

    fn move_to(&mut self, position: Position) -> Result<()> {
        self.push(Action::Move(position))
    }

    fn press(&mut self, button: Button) -> Result<()> {
        self.push(Action::Press(button))
    }

    fn release(&mut self, button: Button) -> Result<()> {
        self.push(Action::Release(button))
    }
}

pub fn click(x: i32, y: i32, delay: f64) -> Event {
    Event::click(Button::Left, Position::new(x, y), delay)
}

pub fn single_click_routine(delay: f64) -> Routine {
    Routine::from_events(vec![click(100, 100, delay)])
}
