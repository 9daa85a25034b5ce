//! Minimal control surface: type commands on stdin, use the global hotkeys
//! (F8 play/pause, Esc exit) while the routine runs.

use click_routine::{
    input_channel, load_from_file, save_to_file, ConfigUpdate, DelayMode, Engine, EngineConfig,
    InputSource, Notification, RdevInput, RdevSink, DEFAULT_FILENAME,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;
use tokio_stream::StreamExt;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

const HELP: &str = "commands: record | stop | play | pause | resume | delete <row> | clear | \
list | save [file] | load [file] | delay <secs> | mode recorded|fixed | loops <n> | \
interval <secs> | random <0..1> | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Click routine recorder");
    info!("{}", HELP);

    let (feed, inputs) = input_channel();
    let mut capture = RdevInput::new();
    capture.start(feed)?;

    let (engine, task) = Engine::spawn(EngineConfig::default(), RdevSink::new(), inputs);

    let mut notifications = engine.event_stream();
    tokio::spawn(async move {
        while let Some(notification) = notifications.next().await {
            match notification {
                Notification::EventRecorded { index, event } => info!("#{} {}", index + 1, event),
                Notification::StateChanged { state } => info!("State: {}", state),
                Notification::PlaybackFinished { summary } => info!("Finished: {:?}", summary),
                Notification::ErrorOccurred { kind, message } => error!("{} error: {}", kind, message),
                Notification::ExitRequested => info!("Exit hotkey pressed"),
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = ctrl_c() => None,
            _ = wait_for_exit(&engine) => None,
        };
        let Some(line) = line else { break };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { continue };
        let argument = words.next();

        // Engine command failures arrive through the notification stream;
        // anything that never reached the engine is logged here
        let outcome = match (command, argument) {
            ("record", _) => engine.start_record().await,
            ("stop", _) => engine.stop().await,
            ("play", _) => engine.play().await,
            ("pause", _) => engine.pause().await,
            ("resume", _) => engine.resume().await,
            ("clear", _) => engine.clear().await,
            ("delete", Some(row)) => match row.parse::<usize>() {
                Ok(row) if row > 0 => engine.delete_event(row - 1).await.map(|_| ()),
                _ => {
                    error!("Rows start at 1");
                    Ok(())
                }
            },
            ("list", _) => engine.routine().await.map(|routine| {
                for (row, event) in routine.iter().enumerate() {
                    info!("#{} {}", row + 1, event);
                }
            }),
            ("save", path) => {
                let path = path.unwrap_or(DEFAULT_FILENAME);
                match engine.routine().await {
                    Ok(routine) => match save_to_file(&routine, path) {
                        Ok(()) => info!("Saved {} events to {}", routine.len(), path),
                        Err(e) => error!("Cannot save {}: {}", path, e),
                    },
                    Err(e) => error!("{}", e),
                }
                Ok(())
            }
            ("load", path) => {
                let path = path.unwrap_or(DEFAULT_FILENAME);
                match std::fs::read(path) {
                    Ok(bytes) => engine.load(bytes).await.map(|len| info!("Loaded {} events", len)),
                    Err(e) => {
                        error!("Cannot read {}: {}", path, e);
                        Ok(())
                    }
                }
            }
            ("delay", Some(secs)) => configure(&engine, secs.parse().map(ConfigUpdate::FixedDelay)).await,
            ("interval", Some(secs)) => {
                configure(&engine, secs.parse().map(ConfigUpdate::LoopInterval)).await
            }
            ("random", Some(c)) => configure(&engine, c.parse().map(ConfigUpdate::Randomness)).await,
            ("loops", Some(n)) => configure(&engine, n.parse().map(ConfigUpdate::MaxLoops)).await,
            ("mode", Some("recorded")) => {
                engine.configure(ConfigUpdate::DelayMode(DelayMode::Recorded)).await
            }
            ("mode", Some("fixed")) => engine.configure(ConfigUpdate::DelayMode(DelayMode::Fixed)).await,
            ("quit", _) | ("exit", _) => break,
            _ => {
                info!("{}", HELP);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            if !engine.is_running() {
                error!("{}", e);
                break;
            }
        }
    }

    // Keep a copy of whatever was recorded last
    if let Ok(routine) = engine.routine().await {
        if !routine.is_empty() {
            save_to_file(&routine, DEFAULT_FILENAME)?;
            info!("Routine saved to {}", DEFAULT_FILENAME);
            // Proves the file reads back
            let reloaded = load_from_file(DEFAULT_FILENAME)?;
            info!("{} events on disk", reloaded.len());
        }
    }

    engine.shutdown();
    capture.stop();
    task.await?;
    Ok(())
}

async fn configure<E: std::fmt::Display>(
    engine: &click_routine::EngineHandle,
    update: Result<ConfigUpdate, E>,
) -> click_routine::Result<()> {
    match update {
        Ok(update) => engine.configure(update).await,
        Err(e) => {
            error!("Invalid value: {}", e);
            Ok(())
        }
    }
}

async fn wait_for_exit(engine: &click_routine::EngineHandle) {
    let mut states = engine.state_changes();
    // The engine drops its state sender when it exits
    while states.changed().await.is_ok() {}
}
