use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::{
    Button, ClickRoutineError, Event, PointerSink, Position, Randomizer, Result, Routine,
    ScreenBounds,
};

/// Base press-to-release hold of a click, in seconds
pub const CLICK_HOLD_SECS: f64 = 0.05;

/// Shortest time a drag may take, in seconds
pub const MIN_DRAG_SECS: f64 = 0.05;

const DRAG_STEPS_PER_SEC: f64 = 60.0;
const MIN_DRAG_STEPS: u32 = 10;

/// Where the wait before each event comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayMode {
    /// The gap captured while recording
    #[default]
    Recorded,
    /// [`PlaybackConfig::fixed_delay`] for every event
    Fixed,
}

/// Configuration for playing a routine back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub delay_mode: DelayMode,

    /// Seconds waited before each event in [`DelayMode::Fixed`]
    pub fixed_delay: f64,

    /// Seconds waited between full passes
    pub loop_interval: f64,

    /// Number of passes; 0 repeats until stopped
    pub max_loops: u32,

    /// Jitter coefficient in `[0, 1]` for positions and timing
    pub randomness: f64,

    /// Pixel radius of position jitter at full randomness
    pub position_radius_px: f64,

    /// Fraction of a delay or duration it may drift at full randomness
    pub timing_spread: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            delay_mode: DelayMode::Recorded,
            fixed_delay: 1.0,
            loop_interval: 5.0,
            max_loops: 0,
            randomness: 0.3,
            position_radius_px: 10.0,
            timing_spread: 0.5,
        }
    }
}

impl PlaybackConfig {
    /// A copy with every field pulled into its valid range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            delay_mode: self.delay_mode,
            fixed_delay: non_negative("fixed_delay", self.fixed_delay, defaults.fixed_delay),
            loop_interval: non_negative("loop_interval", self.loop_interval, defaults.loop_interval),
            max_loops: self.max_loops,
            randomness: unit_interval("randomness", self.randomness, defaults.randomness),
            position_radius_px: non_negative(
                "position_radius_px",
                self.position_radius_px,
                defaults.position_radius_px,
            ),
            timing_spread: non_negative("timing_spread", self.timing_spread, defaults.timing_spread),
        }
    }

    /// Un-jittered wait before `event`
    pub fn base_delay(&self, event: &Event) -> f64 {
        match self.delay_mode {
            DelayMode::Recorded => event.delay(),
            DelayMode::Fixed => self.fixed_delay,
        }
    }
}

fn non_negative(field: &str, value: f64, default: f64) -> f64 {
    if !value.is_finite() {
        warn!(field, value, default, "Setting is not a finite number, using default");
        default
    } else if value < 0.0 {
        warn!(field, value, "Negative setting clamped to 0");
        0.0
    } else {
        value
    }
}

fn unit_interval(field: &str, value: f64, default: f64) -> f64 {
    if !value.is_finite() {
        warn!(field, value, default, "Setting is not a finite number, using default");
        return default;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        warn!(field, value, clamped, "Setting clamped to [0, 1]");
    }
    clamped
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Requested state of a running playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    Run,
    Pause,
    Stop,
}

/// Create the control half kept by the caller and the half handed to the player
pub fn playback_control() -> (PlaybackControl, PlaybackSignals) {
    let (tx, rx) = watch::channel(PlaybackSignal::Run);
    (PlaybackControl { tx }, PlaybackSignals { rx })
}

/// Steers a running playback. Dropping it stops the playback.
#[derive(Debug)]
pub struct PlaybackControl {
    tx: watch::Sender<PlaybackSignal>,
}

impl PlaybackControl {
    pub fn signal(&self) -> PlaybackSignal {
        *self.tx.borrow()
    }

    /// Returns false if playback was not running
    pub fn pause(&self) -> bool {
        self.transition(PlaybackSignal::Run, PlaybackSignal::Pause)
    }

    /// Returns false if playback was not paused
    pub fn resume(&self) -> bool {
        self.transition(PlaybackSignal::Pause, PlaybackSignal::Run)
    }

    /// Pause a running playback or resume a paused one; returns the new signal
    pub fn toggle(&self) -> PlaybackSignal {
        if !self.pause() {
            self.resume();
        }
        self.signal()
    }

    /// Stop for good. Later pause/resume requests are ignored.
    pub fn stop(&self) {
        self.tx.send_replace(PlaybackSignal::Stop);
    }

    fn transition(&self, from: PlaybackSignal, to: PlaybackSignal) -> bool {
        self.tx.send_if_modified(|signal| {
            if *signal == from {
                *signal = to;
                true
            } else {
                false
            }
        })
    }
}

/// The player's view of [`PlaybackControl`]
#[derive(Debug, Clone)]
pub struct PlaybackSignals {
    rx: watch::Receiver<PlaybackSignal>,
}

impl PlaybackSignals {
    pub fn current(&self) -> PlaybackSignal {
        *self.rx.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.current() == PlaybackSignal::Stop || self.rx.has_changed().is_err()
    }

    /// Suspend while paused. Breaks when playback is stopped.
    pub async fn hold_while_paused(&mut self) -> ControlFlow<()> {
        loop {
            let signal = *self.rx.borrow_and_update();
            match signal {
                PlaybackSignal::Run => return ControlFlow::Continue(()),
                PlaybackSignal::Stop => return ControlFlow::Break(()),
                PlaybackSignal::Pause => {
                    if self.rx.changed().await.is_err() {
                        return ControlFlow::Break(());
                    }
                }
            }
        }
    }

    /// Wait `duration` of running time.
    ///
    /// Time spent paused does not count: after a resume only the remainder
    /// is waited. Breaks as soon as playback is stopped.
    pub async fn wait(&mut self, duration: Duration) -> ControlFlow<()> {
        let mut remaining = duration;
        loop {
            if self.hold_while_paused().await.is_break() {
                return ControlFlow::Break(());
            }
            if remaining.is_zero() {
                return ControlFlow::Continue(());
            }

            let started = Instant::now();
            tokio::select! {
                _ = tokio::time::sleep(remaining) => return ControlFlow::Continue(()),
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return ControlFlow::Break(());
                    }
                    remaining = remaining.saturating_sub(started.elapsed());
                }
            }
        }
    }
}

/// Reported after each event a playback executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackProgress {
    /// Pass number, starting at 1
    pub iteration: u32,
    /// Position of the event in the routine
    pub index: usize,
}

/// Outcome of a playback run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    pub loops_completed: u32,
    pub events_played: u64,
    /// Ended by a stop request rather than by reaching the loop limit
    pub stopped: bool,
}

/// Replays routines through a [`PointerSink`]
pub struct Player<S> {
    sink: S,
    randomizer: Randomizer,
}

impl<S: PointerSink> Player<S> {
    pub fn new(sink: S) -> Self {
        Self::with_randomizer(sink, Randomizer::new())
    }

    pub fn with_randomizer(sink: S, randomizer: Randomizer) -> Self {
        Self { sink, randomizer }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Play `routine` until the loop limit is reached or `signals` stops it.
    ///
    /// `on_progress` is called after every executed event.
    #[instrument(skip_all, fields(events = routine.len(), max_loops = config.max_loops))]
    pub async fn play(
        &mut self,
        routine: &Routine,
        config: &PlaybackConfig,
        signals: &mut PlaybackSignals,
        mut on_progress: impl FnMut(PlaybackProgress),
    ) -> Result<PlaybackSummary> {
        if routine.is_empty() {
            return Err(ClickRoutineError::EmptyRoutineError);
        }
        let config = config.sanitized();
        let bounds = self.sink.screen_bounds()?;
        info!(width = bounds.width, height = bounds.height, "Playback started");

        let mut summary = PlaybackSummary::default();
        let mut iteration = 0u32;

        'passes: while config.max_loops == 0 || iteration < config.max_loops {
            if iteration > 0 {
                debug!(secs = config.loop_interval, "Waiting before next pass");
                if signals.wait(seconds(config.loop_interval)).await.is_break() {
                    summary.stopped = true;
                    break;
                }
            }
            iteration += 1;
            info!(iteration, "Starting pass");

            for (index, event) in routine.iter().enumerate() {
                let delay = self.randomizer.duration(
                    config.base_delay(event),
                    config.timing_spread,
                    config.randomness,
                );
                if signals.wait(delay).await.is_break() {
                    summary.stopped = true;
                    break 'passes;
                }

                if self.perform(event, &config, bounds, signals).await?.is_break() {
                    summary.stopped = true;
                    break 'passes;
                }
                summary.events_played += 1;
                on_progress(PlaybackProgress { iteration, index });
            }
            summary.loops_completed = iteration;
        }

        if summary.stopped {
            info!(?summary, "Playback stopped");
        } else {
            info!(?summary, "Reached max loop limit");
        }
        Ok(summary)
    }

    async fn perform(
        &mut self,
        event: &Event,
        config: &PlaybackConfig,
        bounds: ScreenBounds,
        signals: &PlaybackSignals,
    ) -> Result<ControlFlow<()>> {
        let radius = config.position_radius_px;
        let c = config.randomness;
        match event {
            Event::Click { button, x, y, .. } => {
                let at = self.randomizer.position(Position::new(*x, *y), radius, c, bounds);
                let hold = self.randomizer.duration(CLICK_HOLD_SECS, config.timing_spread, c);
                debug!(%button, %at, "Click");
                self.click(*button, at, hold).await?;
                Ok(ControlFlow::Continue(()))
            }
            Event::Drag {
                button,
                x,
                y,
                end_x,
                end_y,
                duration,
                ..
            } => {
                let start = self.randomizer.position(Position::new(*x, *y), radius, c, bounds);
                let end = self
                    .randomizer
                    .position(Position::new(*end_x, *end_y), radius, c, bounds);
                let secs = self
                    .randomizer
                    .seconds(*duration, config.timing_spread, c)
                    .max(MIN_DRAG_SECS);
                debug!(%button, %start, %end, secs, "Drag");
                self.drag(*button, start, end, secs, signals).await
            }
        }
    }

    async fn click(&mut self, button: Button, at: Position, hold: Duration) -> Result<()> {
        self.sink.move_to(at)?;
        self.sink.press(button)?;
        tokio::time::sleep(hold).await;
        self.sink.release(button)
    }

    /// Press at `start`, glide to `end` over `secs`, release.
    ///
    /// The button is released even when the motion is stopped or fails.
    async fn drag(
        &mut self,
        button: Button,
        start: Position,
        end: Position,
        secs: f64,
        signals: &PlaybackSignals,
    ) -> Result<ControlFlow<()>> {
        self.sink.move_to(start)?;
        self.sink.press(button)?;

        let motion = self.glide(start, end, secs, signals).await;
        match self.sink.release(button) {
            Err(e) if motion.is_ok() => Err(e),
            _ => motion,
        }
    }

    async fn glide(
        &mut self,
        start: Position,
        end: Position,
        secs: f64,
        signals: &PlaybackSignals,
    ) -> Result<ControlFlow<()>> {
        let steps = drag_steps(secs);
        let step = seconds(secs / f64::from(steps));
        for n in 1..=steps {
            if signals.is_stopped() {
                debug!(step = n, "Drag interrupted by stop");
                return Ok(ControlFlow::Break(()));
            }
            tokio::time::sleep(step).await;
            self.sink.move_to(lerp(start, end, f64::from(n) / f64::from(steps)))?;
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn drag_steps(secs: f64) -> u32 {
    let steps = (secs * DRAG_STEPS_PER_SEC).floor();
    if steps.is_finite() && steps > f64::from(MIN_DRAG_STEPS) {
        steps.min(f64::from(u32::MAX)) as u32
    } else {
        MIN_DRAG_STEPS
    }
}

fn lerp(start: Position, end: Position, t: f64) -> Position {
    let axis = |a: i32, b: i32| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as i32;
    Position::new(axis(start.x, end.x), axis(start.y, end.y))
}
