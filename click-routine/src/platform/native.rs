use rdev::{Button as RdevButton, EventType, Key};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::{
    Button, ClickRoutineError, HotKey, InputEvent, InputFeed, InputKind, InputSource, MouseButton,
    PointerSink, Position, Result, ScreenBounds,
};

/// Global pointer and key capture through `rdev::listen`.
///
/// The listener thread is started once and lives until the process exits;
/// `stop` only detaches the feed.
pub struct RdevInput {
    /// Where the listener delivers; `None` while stopped
    feed: Arc<Mutex<Option<InputFeed>>>,

    listening: bool,
}

impl RdevInput {
    pub fn new() -> Self {
        Self {
            feed: Arc::new(Mutex::new(None)),
            listening: false,
        }
    }

    fn spawn_listener(&self) -> Result<()> {
        let feed = Arc::clone(&self.feed);
        std::thread::Builder::new()
            .name("rdev-listener".to_string())
            .spawn(move || {
                let callback_feed = Arc::clone(&feed);
                let mut last_position = None;
                let outcome = rdev::listen(move |event| {
                    let Some(kind) = translate(&event.event_type, &mut last_position) else {
                        return;
                    };
                    if let Ok(slot) = callback_feed.lock() {
                        if let Some(feed) = slot.as_ref() {
                            let _ = feed.send(InputEvent::now(kind));
                        }
                    }
                });
                if let Err(e) = outcome {
                    error!("Failed to listen for events: {:?}", e);
                    if let Ok(slot) = feed.lock() {
                        if let Some(feed) = slot.as_ref() {
                            let _ = feed.send(InputEvent::now(InputKind::CaptureLost(format!(
                                "{:?}",
                                e
                            ))));
                        }
                    }
                }
                info!("rdev listener thread finished");
            })
            .map_err(|e| ClickRoutineError::InputCaptureError(e.to_string()))?;
        Ok(())
    }
}

impl Default for RdevInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for RdevInput {
    fn start(&mut self, feed: InputFeed) -> Result<()> {
        *self
            .feed
            .lock()
            .map_err(|e| ClickRoutineError::InputCaptureError(e.to_string()))? = Some(feed);
        if !self.listening {
            self.spawn_listener()?;
            self.listening = true;
            info!("rdev listener started");
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut slot) = self.feed.lock() {
            if slot.take().is_some() {
                debug!("rdev feed detached");
            }
        }
    }
}

/// Turn a raw rdev event into an input notification.
///
/// rdev reports positions only on moves, so button events take the last
/// position seen and are dropped until the first move arrives.
fn translate(event_type: &EventType, last_position: &mut Option<Position>) -> Option<InputKind> {
    match event_type {
        EventType::MouseMove { x, y } => {
            let position = Position::new(x.round() as i32, y.round() as i32);
            *last_position = Some(position);
            Some(InputKind::PointerMove { position })
        }
        EventType::ButtonPress(button) => Some(InputKind::ButtonPress {
            button: mouse_button(button),
            position: (*last_position)?,
        }),
        EventType::ButtonRelease(button) => Some(InputKind::ButtonRelease {
            button: mouse_button(button),
            position: (*last_position)?,
        }),
        EventType::KeyPress(key) => key_name(key).map(|name| InputKind::KeyPress(HotKey::normalized(name))),
        EventType::KeyRelease(_) | EventType::Wheel { .. } => None,
    }
}

fn mouse_button(button: &RdevButton) -> MouseButton {
    match button {
        RdevButton::Left => MouseButton::Left,
        RdevButton::Right => MouseButton::Right,
        RdevButton::Middle => MouseButton::Middle,
        RdevButton::Unknown(code) => MouseButton::Other(*code),
    }
}

/// Hotkey name of a key, spelled the way users type it
fn key_name(key: &Key) -> Option<&'static str> {
    let name = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 => "0",
        Key::Num1 => "1",
        Key::Num2 => "2",
        Key::Num3 => "3",
        Key::Num4 => "4",
        Key::Num5 => "5",
        Key::Num6 => "6",
        Key::Num7 => "7",
        Key::Num8 => "8",
        Key::Num9 => "9",
        Key::Escape => "esc",
        Key::Backspace => "backspace",
        Key::Tab => "tab",
        Key::Return => "enter",
        Key::Space => "space",
        Key::LeftArrow => "left",
        Key::UpArrow => "up",
        Key::RightArrow => "right",
        Key::DownArrow => "down",
        Key::Delete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "page_up",
        Key::PageDown => "page_down",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::ShiftLeft | Key::ShiftRight => "shift",
        Key::ControlLeft | Key::ControlRight => "ctrl",
        Key::Alt => "alt",
        Key::AltGr => "alt_gr",
        Key::MetaLeft | Key::MetaRight => "cmd",
        Key::Pause => "pause",
        Key::PrintScreen => "print_screen",
        _ => return None,
    };
    Some(name)
}

/// Synthetic pointer output through `rdev::simulate`
#[derive(Debug, Default)]
pub struct RdevSink;

impl RdevSink {
    pub fn new() -> Self {
        Self
    }
}

fn simulate(event_type: &EventType) -> Result<()> {
    rdev::simulate(event_type)
        .map_err(|e| ClickRoutineError::OutputSynthesisError(format!("{:?}: {:?}", event_type, e)))
}

fn rdev_button(button: Button) -> RdevButton {
    match button {
        Button::Left => RdevButton::Left,
        Button::Right => RdevButton::Right,
    }
}

impl PointerSink for RdevSink {
    fn screen_bounds(&self) -> Result<ScreenBounds> {
        let (width, height) = rdev::display_size()
            .map_err(|e| ClickRoutineError::OutputSynthesisError(format!("display size: {:?}", e)))?;
        Ok(ScreenBounds::new(
            u32::try_from(width).unwrap_or(u32::MAX),
            u32::try_from(height).unwrap_or(u32::MAX),
        ))
    }

    fn move_to(&mut self, position: Position) -> Result<()> {
        simulate(&EventType::MouseMove {
            x: f64::from(position.x),
            y: f64::from(position.y),
        })
    }

    fn press(&mut self, button: Button) -> Result<()> {
        simulate(&EventType::ButtonPress(rdev_button(button)))
    }

    fn release(&mut self, button: Button) -> Result<()> {
        simulate(&EventType::ButtonRelease(rdev_button(button)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_waits_for_first_move() {
        let mut last = None;
        assert_eq!(translate(&EventType::ButtonPress(RdevButton::Left), &mut last), None);

        translate(&EventType::MouseMove { x: 10.4, y: 20.6 }, &mut last);
        assert_eq!(
            translate(&EventType::ButtonRelease(RdevButton::Middle), &mut last),
            Some(InputKind::ButtonRelease {
                button: MouseButton::Middle,
                position: Position::new(10, 21),
            })
        );
    }

    #[test]
    fn test_key_names_match_hotkey_parsing() {
        let mut last = None;
        for (key, typed) in [(Key::F8, "F8"), (Key::Escape, "Escape"), (Key::KeyQ, "q")] {
            assert_eq!(
                translate(&EventType::KeyPress(key), &mut last),
                Some(InputKind::KeyPress(HotKey::parse(typed).unwrap()))
            );
        }
        assert_eq!(translate(&EventType::KeyRelease(Key::F8), &mut last), None);
    }
}
