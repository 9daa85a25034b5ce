mod common;

use click_routine::*;
use common::{click, init_tracing, single_click_routine, Action, MockSink};
use std::time::Duration;
use tokio::time::Instant;

fn steady_config() -> PlaybackConfig {
    PlaybackConfig {
        randomness: 0.0,
        ..Default::default()
    }
}

fn player(sink: &MockSink) -> Player<MockSink> {
    Player::with_randomizer(sink.clone(), Randomizer::seeded(42))
}

#[tokio::test(start_paused = true)]
async fn test_max_loops_runs_each_event_once_per_pass() {
    init_tracing();
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();
    let config = PlaybackConfig {
        max_loops: 2,
        loop_interval: 1.0,
        ..steady_config()
    };

    let mut progress = Vec::new();
    let summary = player
        .play(&single_click_routine(0.1), &config, &mut signals, |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(
        summary,
        PlaybackSummary {
            loops_completed: 2,
            events_played: 2,
            stopped: false
        }
    );
    assert_eq!(
        progress,
        vec![
            PlaybackProgress { iteration: 1, index: 0 },
            PlaybackProgress { iteration: 2, index: 0 },
        ]
    );

    let presses = sink.presses();
    assert_eq!(presses.len(), 2);
    assert_eq!(sink.releases(), 2);
    // Hold, loop interval and delay separate the two presses
    let gap = presses[1].at - presses[0].at;
    assert!(gap >= Duration::from_millis(1_150), "{gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_click_moves_presses_and_releases_in_order() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();
    let config = PlaybackConfig {
        max_loops: 1,
        ..steady_config()
    };
    let routine = Routine::from_events(vec![
        click(10, 20, 0.0),
        Event::click(Button::Right, Position::new(30, 40), 0.0),
    ]);

    player.play(&routine, &config, &mut signals, |_| {}).await.unwrap();

    assert_eq!(
        sink.actions(),
        vec![
            Action::Move(Position::new(10, 20)),
            Action::Press(Button::Left),
            Action::Release(Button::Left),
            Action::Move(Position::new(30, 40)),
            Action::Press(Button::Right),
            Action::Release(Button::Right),
        ]
    );
    let log = sink.log();
    let held = log[2].at - log[1].at;
    assert!(held >= Duration::from_millis(50) && held < Duration::from_millis(52), "{held:?}");
}

#[tokio::test(start_paused = true)]
async fn test_pause_mid_wait_resumes_with_remaining_time() {
    init_tracing();
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (control, mut signals) = playback_control();
    let config = PlaybackConfig {
        max_loops: 1,
        ..steady_config()
    };

    let started = Instant::now();
    let run = tokio::spawn(async move {
        player
            .play(&single_click_routine(2.0), &config, &mut signals, |_| {})
            .await
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(control.pause());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(sink.presses().is_empty());
    assert!(control.resume());

    let summary = run.await.unwrap().unwrap();
    assert_eq!(summary.events_played, 1);

    let pressed_after = sink.presses()[0].at - started;
    // 0.5s before the pause plus the 1.5s left afterwards, not a fresh 2s
    assert!(pressed_after >= Duration::from_millis(12_000), "{pressed_after:?}");
    assert!(pressed_after < Duration::from_millis(12_400), "{pressed_after:?}");
}

#[tokio::test(start_paused = true)]
async fn test_empty_routine_is_rejected() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();

    let err = player
        .play(&Routine::new(), &steady_config(), &mut signals, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ClickRoutineError::EmptyRoutineError));
    assert!(sink.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_wait_plays_nothing() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (control, mut signals) = playback_control();
    let config = steady_config();

    let run = tokio::spawn(async move {
        player
            .play(&single_click_routine(30.0), &config, &mut signals, |_| {})
            .await
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    control.stop();

    let summary = run.await.unwrap().unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.events_played, 0);
    assert!(sink.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_paused() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (control, mut signals) = playback_control();
    let config = steady_config();

    let run = tokio::spawn(async move {
        player
            .play(&single_click_routine(1.0), &config, &mut signals, |_| {})
            .await
    });
    control.pause();
    tokio::time::sleep(Duration::from_secs(60)).await;
    control.stop();

    assert!(run.await.unwrap().unwrap().stopped);
    assert!(sink.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drag_glides_to_end() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();
    let config = PlaybackConfig {
        max_loops: 1,
        ..steady_config()
    };
    let routine = Routine::from_events(vec![Event::drag(
        Button::Left,
        Position::new(0, 0),
        Position::new(300, 150),
        0.5,
        0.0,
    )]);

    player.play(&routine, &config, &mut signals, |_| {}).await.unwrap();

    let log = sink.log();
    let actions: Vec<Action> = log.iter().map(|entry| entry.action).collect();
    assert_eq!(actions[0], Action::Move(Position::new(0, 0)));
    assert_eq!(actions[1], Action::Press(Button::Left));
    assert_eq!(actions[actions.len() - 2], Action::Move(Position::new(300, 150)));
    assert_eq!(actions[actions.len() - 1], Action::Release(Button::Left));
    // 60 steps per second
    let moves = actions.iter().filter(|a| matches!(a, Action::Move(_))).count();
    assert_eq!(moves, 1 + 30);

    let held = log[log.len() - 1].at - log[1].at;
    assert!(held >= Duration::from_millis(495), "{held:?}");
    assert!(held <= Duration::from_millis(520), "{held:?}");
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_drag_releases_button() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (control, mut signals) = playback_control();
    let config = steady_config();
    let routine = Routine::from_events(vec![Event::drag(
        Button::Right,
        Position::new(0, 0),
        Position::new(600, 0),
        4.0,
        0.0,
    )]);

    let run = tokio::spawn(async move { player.play(&routine, &config, &mut signals, |_| {}).await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    control.stop();

    let summary = run.await.unwrap().unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.events_played, 0);

    let actions = sink.actions();
    assert_eq!(actions.last(), Some(&Action::Release(Button::Right)));
    // Far from the end when interrupted
    assert!(!actions.contains(&Action::Move(Position::new(600, 0))));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_delay_mode_ignores_recorded_delay() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();
    let config = PlaybackConfig {
        delay_mode: DelayMode::Fixed,
        fixed_delay: 0.25,
        max_loops: 1,
        ..steady_config()
    };

    let started = Instant::now();
    player
        .play(&single_click_routine(30.0), &config, &mut signals, |_| {})
        .await
        .unwrap();

    let pressed_after = sink.presses()[0].at - started;
    assert!(pressed_after >= Duration::from_millis(250), "{pressed_after:?}");
    assert!(pressed_after < Duration::from_millis(252), "{pressed_after:?}");
}

#[tokio::test(start_paused = true)]
async fn test_jitter_stays_within_radius_and_screen() {
    let sink = MockSink::with_bounds(ScreenBounds::new(200, 200));
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();
    let config = PlaybackConfig {
        randomness: 1.0,
        position_radius_px: 10.0,
        loop_interval: 0.0,
        max_loops: 100,
        ..Default::default()
    };
    let routine = Routine::from_events(vec![click(0, 0, 0.0), click(100, 100, 0.2)]);

    player.play(&routine, &config, &mut signals, |_| {}).await.unwrap();

    let moves: Vec<Position> = sink
        .actions()
        .into_iter()
        .filter_map(|action| match action {
            Action::Move(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(moves.len(), 200);
    for pair in moves.chunks(2) {
        let corner = pair[0];
        assert!((0..=10).contains(&corner.x) && (0..=10).contains(&corner.y), "{corner}");
        let centre = pair[1];
        assert!((90..=110).contains(&centre.x) && (90..=110).contains(&centre.y), "{centre}");
    }
    // Some jitter actually happened
    assert!(moves.chunks(2).any(|pair| pair[1] != Position::new(100, 100)));
}

#[tokio::test(start_paused = true)]
async fn test_output_failure_ends_playback() {
    let sink = MockSink::new();
    sink.break_output();
    let mut player = player(&sink);
    let (_control, mut signals) = playback_control();

    let err = player
        .play(&single_click_routine(0.0), &steady_config(), &mut signals, |_| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutputSynthesis);
    assert!(err.is_activity_fatal());
}

#[tokio::test(start_paused = true)]
async fn test_replay_starts_a_fresh_loop_counter() {
    let sink = MockSink::new();
    let mut player = player(&sink);
    let config = PlaybackConfig {
        max_loops: 1,
        ..steady_config()
    };
    let routine = single_click_routine(0.0);

    for _ in 0..2 {
        let (_control, mut signals) = playback_control();
        let summary = player.play(&routine, &config, &mut signals, |_| {}).await.unwrap();
        assert_eq!(summary.loops_completed, 1);
    }
    assert_eq!(sink.presses().len(), 2);
}
