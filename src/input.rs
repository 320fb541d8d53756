//! Turns raw device input into device-independent intents.
//!
//! Keyboard and mouse arrive as terminal events and map one-to-one. The
//! gamepad has no event stream of its own here; it is sampled on a timer and
//! [`GamepadPoller`] derives intents from consecutive snapshots.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use log::info;

use crate::config::PauseTrigger;

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Jump,
    TogglePause,
    Restart,
}

/// What a key press asks of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Intent(Intent),
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter | KeyCode::Char('w') | KeyCode::Char('k') => {
            Action::Intent(Intent::Jump)
        }
        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Action::Intent(Intent::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Intent(Intent::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => return None,
    };
    // Held keys repeat; only a jump may fire again without a fresh press.
    if key.kind == KeyEventKind::Repeat && action != Action::Intent(Intent::Jump) {
        return None;
    }
    Some(action)
}

/// Any button press on the terminal is a jump gesture.
pub fn map_mouse(mouse: MouseEvent) -> Option<Intent> {
    match mouse.kind {
        MouseEventKind::Down(_) => Some(Intent::Jump),
        _ => None,
    }
}

// ── Gamepad ─────────────────────────────────────────────────────────────────

/// Stick deflection past which pushing up counts as a jump.
pub const STICK_JUMP_THRESHOLD: f32 = -0.5;

/// State of the first connected gamepad at one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PadSnapshot {
    /// Button 0 (A on Xbox pads).
    pub south: bool,
    /// Button 1 (B).
    pub east: bool,
    /// Button 9 (Start).
    pub start: bool,
    /// Left stick vertical axis, -1.0 is fully up.
    pub left_stick_y: f32,
}

/// Something that can be sampled for gamepad state.
pub trait GamepadSource {
    /// `None` when no pad is connected.
    fn poll(&mut self) -> Option<PadSnapshot>;
}

pub struct GamepadPoller {
    pause_trigger: PauseTrigger,
    flap_was_pressed: bool,
    pause_was_pressed: bool,
    connected: bool,
}

impl GamepadPoller {
    pub fn new(pause_trigger: PauseTrigger) -> Self {
        Self {
            pause_trigger,
            flap_was_pressed: false,
            pause_was_pressed: false,
            connected: false,
        }
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Derive intents from one poll. A missing pad yields nothing.
    pub fn poll(&mut self, snapshot: Option<PadSnapshot>, game_over: bool, out: &mut Vec<Intent>) {
        let Some(pad) = snapshot else {
            if self.connected {
                info!("Controller disconnected");
            }
            self.connected = false;
            self.flap_was_pressed = false;
            self.pause_was_pressed = false;
            return;
        };
        if !self.connected {
            info!("Controller connected");
            self.connected = true;
        }

        if pad.south && !self.flap_was_pressed {
            out.push(Intent::Jump);
        }
        self.flap_was_pressed = pad.south;

        // The stick repeats at poll rate while held.
        if pad.left_stick_y < STICK_JUMP_THRESHOLD {
            out.push(Intent::Jump);
        }

        let toggle = match self.pause_trigger {
            PauseTrigger::Edge => pad.east && !self.pause_was_pressed,
            PauseTrigger::Level => pad.east,
        };
        if toggle {
            out.push(Intent::TogglePause);
        }
        self.pause_was_pressed = pad.east;

        if pad.start && game_over {
            out.push(Intent::Restart);
        }
    }
}

#[cfg(feature = "gamepad")]
mod backend {
    use gilrs::{Axis, Button, Gilrs};
    use log::warn;

    use super::{GamepadSource, PadSnapshot};

    pub struct GilrsSource {
        gilrs: Gilrs,
    }

    impl GilrsSource {
        pub fn open() -> Option<Self> {
            match Gilrs::new() {
                Ok(gilrs) => Some(Self { gilrs }),
                Err(e) => {
                    warn!("Gamepad support unavailable: {}", e);
                    None
                }
            }
        }
    }

    impl GamepadSource for GilrsSource {
        fn poll(&mut self) -> Option<PadSnapshot> {
            // Pump the event queue so cached button state is current.
            while self.gilrs.next_event().is_some() {}
            let (_, pad) = self.gilrs.gamepads().next()?;
            Some(PadSnapshot {
                south: pad.is_pressed(Button::South),
                east: pad.is_pressed(Button::East),
                start: pad.is_pressed(Button::Start),
                // gilrs reports up as positive
                left_stick_y: -pad.value(Axis::LeftStickY),
            })
        }
    }
}

/// Open the platform gamepad backend, if this build has one.
#[cfg(feature = "gamepad")]
pub fn open_gamepad() -> Option<Box<dyn GamepadSource>> {
    backend::GilrsSource::open().map(|s| Box::new(s) as Box<dyn GamepadSource>)
}

#[cfg(not(feature = "gamepad"))]
pub fn open_gamepad() -> Option<Box<dyn GamepadSource>> {
    None
}
