//! The command/notification engine.
//!
//! A single task owns the routine, the recorder session and the player.
//! Control surfaces talk to it through an [`EngineHandle`]; capture sources
//! feed it raw input through the channel from [`crate::input_channel`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::Stream;
use tracing::{debug, error, info, warn};

use crate::{
    playback_control, store, ClickRoutineError, DelayMode, ErrorKind, Event, HotKey, InputEvent,
    InputKind, PlaybackConfig, PlaybackControl, PlaybackSummary, Player, PointerSink,
    RecorderConfig, RecorderSession, Result, Routine, SessionStep, StopTrigger,
};

const NOTIFICATION_CAPACITY: usize = 256;

/// What the engine is doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Idle,
    Recording,
    Playing,
    Paused,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Recording => "recording",
            EngineState::Playing => "playing",
            EngineState::Paused => "paused",
        }
    }

    fn is_playback(&self) -> bool {
        matches!(self, EngineState::Playing | EngineState::Paused)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recorder: RecorderConfig,

    pub playback: PlaybackConfig,

    /// Global key that starts, pauses and resumes playback
    pub play_pause_hotkey: HotKey,

    /// Global key that shuts the engine down
    pub exit_hotkey: Option<HotKey>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recorder: RecorderConfig::default(),
            playback: PlaybackConfig::default(),
            play_pause_hotkey: HotKey::normalized("f8"),
            exit_hotkey: Some(HotKey::normalized("esc")),
        }
    }
}

/// A single settings change from the control surface
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    DelayMode(DelayMode),
    FixedDelay(f64),
    LoopInterval(f64),
    MaxLoops(u32),
    Randomness(f64),
    PositionRadius(f64),
    TimingSpread(f64),
    DragThreshold(f64),
    /// Key name for play/pause
    PlayPauseHotkey(String),
    /// `middle` or a key name
    StopRecordTrigger(String),
    /// Key name, or `None` to disable the exit hotkey
    ExitHotkey(Option<String>),
    Playback(PlaybackConfig),
}

impl ConfigUpdate {
    fn apply(self, config: &mut EngineConfig) -> Result<()> {
        let playback = &mut config.playback;
        match self {
            ConfigUpdate::DelayMode(mode) => playback.delay_mode = mode,
            ConfigUpdate::FixedDelay(secs) => playback.fixed_delay = secs,
            ConfigUpdate::LoopInterval(secs) => playback.loop_interval = secs,
            ConfigUpdate::MaxLoops(loops) => playback.max_loops = loops,
            ConfigUpdate::Randomness(c) => playback.randomness = c,
            ConfigUpdate::PositionRadius(px) => playback.position_radius_px = px,
            ConfigUpdate::TimingSpread(spread) => playback.timing_spread = spread,
            ConfigUpdate::Playback(new) => *playback = new,
            ConfigUpdate::DragThreshold(px) => {
                if !px.is_finite() || px < 0.0 {
                    return Err(ClickRoutineError::ParseError(format!(
                        "drag threshold must be a non-negative number, got {}",
                        px
                    )));
                }
                config.recorder.drag_threshold_px = px;
            }
            ConfigUpdate::PlayPauseHotkey(name) => config.play_pause_hotkey = HotKey::parse(&name)?,
            ConfigUpdate::StopRecordTrigger(name) => {
                config.recorder.stop_trigger = StopTrigger::parse(&name)?
            }
            ConfigUpdate::ExitHotkey(name) => {
                config.exit_hotkey = name.as_deref().map(HotKey::parse).transpose()?
            }
        }
        config.playback = config.playback.sanitized();
        Ok(())
    }
}

/// Published by the engine as things happen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A click or drag was captured; `index` is its row in the routine
    EventRecorded { index: usize, event: Event },
    StateChanged { state: EngineState },
    /// The routine was replaced or edited
    RoutineChanged { len: usize },
    /// An event was just played
    PlaybackProgress { iteration: u32, index: usize },
    PlaybackFinished { summary: PlaybackSummary },
    ErrorOccurred { kind: ErrorKind, message: String },
    /// The exit hotkey was pressed; the engine is shutting down
    ExitRequested,
}

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    StartRecord(Reply<()>),
    StopRecord(Reply<Routine>),
    Play(Reply<()>),
    Pause(Reply<()>),
    Resume(Reply<()>),
    TogglePlayback(Reply<EngineState>),
    Stop(Reply<()>),
    DeleteEvent(usize, Reply<Event>),
    Clear(Reply<()>),
    Configure(ConfigUpdate, Reply<()>),
    Load(Vec<u8>, Reply<usize>),
    Save(Reply<Vec<u8>>),
    Routine(oneshot::Sender<Routine>),
    Config(oneshot::Sender<EngineConfig>),
    Shutdown,
}

/// Control surface side of a running engine
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    notifications: broadcast::Sender<Notification>,
    state: watch::Receiver<EngineState>,
}

impl EngineHandle {
    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .map_err(|_| ClickRoutineError::EngineStopped)?;
        rx.await.map_err(|_| ClickRoutineError::EngineStopped)?
    }

    async fn query<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .map_err(|_| ClickRoutineError::EngineStopped)?;
        rx.await.map_err(|_| ClickRoutineError::EngineStopped)
    }

    /// Begin capturing a new routine. The current routine is cleared.
    pub async fn start_record(&self) -> Result<()> {
        self.request(Command::StartRecord).await
    }

    /// End the recording and return what was captured
    pub async fn stop_record(&self) -> Result<Routine> {
        self.request(Command::StopRecord).await
    }

    /// Start playing the current routine in the background
    pub async fn play(&self) -> Result<()> {
        self.request(Command::Play).await
    }

    /// Pause playback at the next wait.
    ///
    /// The state reads Paused right away, but a click or drag already in
    /// progress finishes first.
    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(Command::Resume).await
    }

    /// What the play/pause hotkey does: play when idle, otherwise pause or resume
    pub async fn toggle_playback(&self) -> Result<EngineState> {
        self.request(Command::TogglePlayback).await
    }

    /// Abort playback or end recording; returns once the engine is idle
    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await
    }

    pub async fn delete_event(&self, index: usize) -> Result<Event> {
        self.request(|reply| Command::DeleteEvent(index, reply)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(Command::Clear).await
    }

    pub async fn configure(&self, update: ConfigUpdate) -> Result<()> {
        self.request(|reply| Command::Configure(update, reply)).await
    }

    /// Replace the routine with a persisted one; returns its length.
    ///
    /// On failure the current routine is kept.
    pub async fn load(&self, bytes: Vec<u8>) -> Result<usize> {
        self.request(|reply| Command::Load(bytes, reply)).await
    }

    /// Serialize the current routine
    pub async fn save(&self) -> Result<Vec<u8>> {
        self.request(Command::Save).await
    }

    pub async fn routine(&self) -> Result<Routine> {
        self.query(Command::Routine).await
    }

    pub async fn config(&self) -> Result<EngineConfig> {
        self.query(Command::Config).await
    }

    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Follow state changes without subscribing to every notification
    pub fn state_changes(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Get a stream of notifications
    pub fn event_stream(&self) -> impl Stream<Item = Notification> {
        let mut rx = self.notifications.subscribe();
        Box::pin(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(notification) => yield notification,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Notification stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Ask the engine to stop playback, end recording and exit
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

type PlaybackOutcome<S> = (Player<S>, Result<PlaybackSummary>);

struct ActivePlayback<S> {
    control: PlaybackControl,
    task: JoinHandle<PlaybackOutcome<S>>,
}

/// The engine task
pub struct Engine<S> {
    config: EngineConfig,
    state: EngineState,
    routine: Routine,
    session: Option<RecorderSession>,
    player: Option<Player<S>>,
    playback: Option<ActivePlayback<S>>,
    commands: mpsc::UnboundedReceiver<Command>,
    inputs: mpsc::UnboundedReceiver<InputEvent>,
    inputs_open: bool,
    notifications: broadcast::Sender<Notification>,
    state_tx: watch::Sender<EngineState>,
}

impl<S: PointerSink> Engine<S> {
    /// Start the engine on the current tokio runtime
    pub fn spawn(
        config: EngineConfig,
        sink: S,
        inputs: mpsc::UnboundedReceiver<InputEvent>,
    ) -> (EngineHandle, JoinHandle<()>) {
        Self::spawn_with_player(config, Player::new(sink), inputs)
    }

    /// Start the engine with a prepared player
    pub fn spawn_with_player(
        config: EngineConfig,
        player: Player<S>,
        inputs: mpsc::UnboundedReceiver<InputEvent>,
    ) -> (EngineHandle, JoinHandle<()>) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (state_tx, state_rx) = watch::channel(EngineState::Idle);

        let handle = EngineHandle {
            commands: command_tx,
            notifications: notifications.clone(),
            state: state_rx,
        };
        let engine = Engine {
            config: EngineConfig {
                playback: config.playback.sanitized(),
                ..config
            },
            state: EngineState::Idle,
            routine: Routine::new(),
            session: None,
            player: Some(player),
            playback: None,
            commands,
            inputs,
            inputs_open: true,
            notifications,
            state_tx,
        };
        (handle, tokio::spawn(engine.run()))
    }

    async fn run(mut self) {
        info!("Engine started");
        loop {
            let flow = tokio::select! {
                biased;

                input = self.inputs.recv(), if self.inputs_open => match input {
                    Some(input) => self.handle_input(input),
                    None => {
                        self.inputs_open = false;
                        self.capture_lost("input feed closed".to_string());
                        ControlFlow::Continue(())
                    }
                },
                joined = playback_finished(&mut self.playback) => {
                    self.finish_playback(joined);
                    ControlFlow::Continue(())
                }
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => ControlFlow::Break(()),
                    Some(command) => {
                        self.handle_command(command).await;
                        ControlFlow::Continue(())
                    }
                },
            };
            if flow.is_break() {
                break;
            }
        }
        self.wind_down().await;
        info!("Engine stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartRecord(reply) => {
                let result = self.start_record();
                self.respond(reply, result);
            }
            Command::StopRecord(reply) => {
                let result = self.stop_record();
                self.respond(reply, result);
            }
            Command::Play(reply) => {
                let result = self.play();
                self.respond(reply, result);
            }
            Command::Pause(reply) => {
                let result = self.pause();
                self.respond(reply, result);
            }
            Command::Resume(reply) => {
                let result = self.resume();
                self.respond(reply, result);
            }
            Command::TogglePlayback(reply) => {
                let result = self.toggle_playback();
                self.respond(reply, result);
            }
            Command::Stop(reply) => {
                let result = self.stop().await;
                self.respond(reply, result);
            }
            Command::DeleteEvent(index, reply) => {
                let result = self.delete_event(index);
                self.respond(reply, result);
            }
            Command::Clear(reply) => {
                let result = self.clear();
                self.respond(reply, result);
            }
            Command::Configure(update, reply) => {
                let result = update.apply(&mut self.config);
                if result.is_ok() {
                    debug!(config = ?self.config, "Configuration updated");
                }
                self.respond(reply, result);
            }
            Command::Load(bytes, reply) => {
                let result = self.load(&bytes);
                self.respond(reply, result);
            }
            Command::Save(reply) => {
                let result = store::save(&self.routine);
                self.respond(reply, result);
            }
            Command::Routine(reply) => {
                let _ = reply.send(self.routine.clone());
            }
            Command::Config(reply) => {
                let _ = reply.send(self.config.clone());
            }
            Command::Shutdown => {}
        }
    }

    /// Report a failed command, then hand the result back to the caller
    fn respond<T>(&self, reply: Reply<T>, result: Result<T>) {
        if let Err(e) = &result {
            self.report(e);
        }
        let _ = reply.send(result);
    }

    fn report(&self, error: &ClickRoutineError) {
        if error.is_activity_fatal() {
            error!(kind = %error.kind(), "{}", error);
        } else {
            warn!(kind = %error.kind(), "{}", error);
        }
        self.notify(Notification::ErrorOccurred {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine
        let _ = self.notifications.send(notification);
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state == state {
            return;
        }
        info!(from = %self.state, to = %state, "State changed");
        self.state = state;
        self.state_tx.send_replace(state);
        self.notify(Notification::StateChanged { state });
    }

    fn require_idle(&self, requested: &'static str) -> Result<()> {
        if self.state == EngineState::Idle {
            Ok(())
        } else {
            Err(ClickRoutineError::ConcurrentActivityError {
                requested,
                active: self.state,
            })
        }
    }

    fn start_record(&mut self) -> Result<()> {
        self.require_idle("start recording")?;
        self.session = Some(RecorderSession::start(
            self.config.recorder.clone(),
            Instant::now(),
        ));
        self.routine.clear();
        self.notify(Notification::RoutineChanged { len: 0 });
        self.set_state(EngineState::Recording);
        Ok(())
    }

    fn stop_record(&mut self) -> Result<Routine> {
        if self.state != EngineState::Recording {
            return Err(ClickRoutineError::ConcurrentActivityError {
                requested: "stop recording",
                active: self.state,
            });
        }
        Ok(self.finish_recording())
    }

    fn finish_recording(&mut self) -> Routine {
        if let Some(session) = self.session.take() {
            self.routine = session.finish();
            debug!(
                secs_per_pass = self.routine.recorded_duration(),
                "Recorded routine timing"
            );
        }
        self.notify(Notification::RoutineChanged {
            len: self.routine.len(),
        });
        self.set_state(EngineState::Idle);
        self.routine.clone()
    }

    fn play(&mut self) -> Result<()> {
        match self.state {
            EngineState::Paused => return self.resume(),
            EngineState::Idle => {}
            active => {
                return Err(ClickRoutineError::ConcurrentActivityError {
                    requested: "start playback",
                    active,
                })
            }
        }
        if self.routine.is_empty() {
            return Err(ClickRoutineError::EmptyRoutineError);
        }
        let Some(mut player) = self.player.take() else {
            return Err(ClickRoutineError::OutputSynthesisError(
                "pointer output is unavailable".to_string(),
            ));
        };

        let (control, mut signals) = playback_control();
        let routine = self.routine.clone();
        let config = self.config.playback.clone();
        let notifications = self.notifications.clone();
        let task = tokio::spawn(async move {
            let result = player
                .play(&routine, &config, &mut signals, |progress| {
                    let _ = notifications.send(Notification::PlaybackProgress {
                        iteration: progress.iteration,
                        index: progress.index,
                    });
                })
                .await;
            (player, result)
        });

        self.playback = Some(ActivePlayback { control, task });
        self.set_state(EngineState::Playing);
        Ok(())
    }

    /// Pause or resume refused: recording is a competing activity, any
    /// other state just has nothing to act on
    fn not_playback(requested: &'static str, state: EngineState) -> ClickRoutineError {
        match state {
            EngineState::Recording => ClickRoutineError::ConcurrentActivityError {
                requested,
                active: state,
            },
            _ => ClickRoutineError::NotPlayingError { requested, state },
        }
    }

    /// Paused is published at once; a click or drag already under way
    /// still completes and the player halts at its next wait.
    fn pause(&mut self) -> Result<()> {
        match (&self.playback, self.state) {
            (Some(active), EngineState::Playing) => {
                active.control.pause();
                self.set_state(EngineState::Paused);
                Ok(())
            }
            (_, state) => Err(Self::not_playback("pause", state)),
        }
    }

    fn resume(&mut self) -> Result<()> {
        match (&self.playback, self.state) {
            (Some(active), EngineState::Paused) => {
                active.control.resume();
                self.set_state(EngineState::Playing);
                Ok(())
            }
            (_, state) => Err(Self::not_playback("resume", state)),
        }
    }

    fn toggle_playback(&mut self) -> Result<EngineState> {
        match self.state {
            EngineState::Idle => self.play()?,
            EngineState::Playing => self.pause()?,
            EngineState::Paused => self.resume()?,
            EngineState::Recording => {
                return Err(ClickRoutineError::ConcurrentActivityError {
                    requested: "start playback",
                    active: EngineState::Recording,
                })
            }
        }
        Ok(self.state)
    }

    async fn stop(&mut self) -> Result<()> {
        match self.state {
            EngineState::Recording => {
                self.finish_recording();
            }
            EngineState::Playing | EngineState::Paused => {
                if let Some(active) = self.playback.as_mut() {
                    active.control.stop();
                    let joined = (&mut active.task).await;
                    self.finish_playback(joined);
                }
            }
            EngineState::Idle => {}
        }
        Ok(())
    }

    fn finish_playback(&mut self, joined: std::result::Result<PlaybackOutcome<S>, JoinError>) {
        self.playback = None;
        match joined {
            Ok((player, outcome)) => {
                self.player = Some(player);
                match outcome {
                    Ok(summary) => self.notify(Notification::PlaybackFinished { summary }),
                    Err(e) => self.report(&e),
                }
            }
            Err(e) => {
                self.report(&ClickRoutineError::OutputSynthesisError(format!(
                    "playback task failed: {}",
                    e
                )));
            }
        }
        self.set_state(EngineState::Idle);
    }

    fn delete_event(&mut self, index: usize) -> Result<Event> {
        self.require_idle("edit the routine")?;
        let removed = self.routine.remove(index)?;
        debug!(index, event = %removed, "Deleted event");
        self.notify(Notification::RoutineChanged {
            len: self.routine.len(),
        });
        Ok(removed)
    }

    fn clear(&mut self) -> Result<()> {
        self.require_idle("clear the routine")?;
        self.routine.clear();
        self.notify(Notification::RoutineChanged { len: 0 });
        Ok(())
    }

    fn load(&mut self, bytes: &[u8]) -> Result<usize> {
        self.require_idle("load a routine")?;
        let routine = store::load_with_default_delay(bytes, self.config.playback.fixed_delay)?;
        info!(events = routine.len(), "Routine loaded");
        self.routine = routine;
        self.notify(Notification::RoutineChanged {
            len: self.routine.len(),
        });
        Ok(self.routine.len())
    }

    fn handle_input(&mut self, input: InputEvent) -> ControlFlow<()> {
        if let InputKind::CaptureLost(reason) = input.kind {
            self.capture_lost(reason);
            return ControlFlow::Continue(());
        }

        if let Some(session) = self.session.as_mut() {
            match session.handle(&input) {
                SessionStep::Recorded(event) => {
                    let index = self.routine.len();
                    self.routine.push(event.clone());
                    self.notify(Notification::EventRecorded { index, event });
                }
                SessionStep::Finished => {
                    self.finish_recording();
                    return ControlFlow::Continue(());
                }
                SessionStep::Pressed | SessionStep::Ignored => {}
            }
        }

        match &input.kind {
            InputKind::KeyPress(key) => self.handle_hotkey(key),
            _ => ControlFlow::Continue(()),
        }
    }

    fn handle_hotkey(&mut self, key: &HotKey) -> ControlFlow<()> {
        if self.config.exit_hotkey.as_ref() == Some(key) {
            info!(%key, "Exit hotkey pressed");
            self.notify(Notification::ExitRequested);
            return ControlFlow::Break(());
        }
        if *key == self.config.play_pause_hotkey {
            if self.state == EngineState::Recording {
                debug!(%key, "Play/pause hotkey ignored while recording");
            } else if let Err(e) = self.toggle_playback() {
                self.report(&e);
            }
        }
        ControlFlow::Continue(())
    }

    fn capture_lost(&mut self, reason: String) {
        if self.state == EngineState::Recording {
            let routine = self.finish_recording();
            warn!(kept = routine.len(), "Capture lost while recording");
            self.report(&ClickRoutineError::InputCaptureError(reason));
        } else {
            warn!(%reason, "Input capture lost");
        }
    }

    async fn wind_down(&mut self) {
        if self.state.is_playback() || self.state == EngineState::Recording {
            if let Err(e) = self.stop().await {
                self.report(&e);
            }
        }
    }
}

async fn playback_finished<S>(
    playback: &mut Option<ActivePlayback<S>>,
) -> std::result::Result<PlaybackOutcome<S>, JoinError> {
    match playback {
        Some(active) => (&mut active.task).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(EngineState::Paused.to_string(), "paused");
        assert_eq!(
            serde_json::to_value(EngineState::Recording).unwrap(),
            serde_json::json!("recording")
        );
    }

    #[test]
    fn test_default_config_hotkeys() {
        let config = EngineConfig::default();
        assert_eq!(config.play_pause_hotkey.name(), "f8");
        assert_eq!(config.exit_hotkey.map(String::from), Some("esc".to_string()));
        assert_eq!(config.recorder.drag_threshold_px, 5.0);
    }

    #[test]
    fn test_config_updates() {
        let mut config = EngineConfig::default();
        ConfigUpdate::PlayPauseHotkey(" F6 ".to_string())
            .apply(&mut config)
            .unwrap();
        assert_eq!(config.play_pause_hotkey.name(), "f6");

        ConfigUpdate::StopRecordTrigger("q".to_string())
            .apply(&mut config)
            .unwrap();
        assert!(matches!(config.recorder.stop_trigger, StopTrigger::Key(_)));

        ConfigUpdate::Randomness(4.0).apply(&mut config).unwrap();
        assert_eq!(config.playback.randomness, 1.0);

        ConfigUpdate::ExitHotkey(None).apply(&mut config).unwrap();
        assert!(config.exit_hotkey.is_none());

        // Bad names keep the previous key
        assert!(ConfigUpdate::PlayPauseHotkey("  ".to_string())
            .apply(&mut config)
            .is_err());
        assert_eq!(config.play_pause_hotkey.name(), "f6");
        assert!(ConfigUpdate::DragThreshold(-1.0).apply(&mut config).is_err());
    }

    #[test]
    fn test_notification_wire_format() {
        let value = serde_json::to_value(Notification::ErrorOccurred {
            kind: ErrorKind::EmptyRoutine,
            message: "nothing".to_string(),
        })
        .unwrap();
        assert_eq!(value["type"], "error_occurred");
        assert_eq!(value["kind"], "empty_routine");
    }
}
