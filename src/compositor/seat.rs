//! Seats: one pointer, one keyboard and the grab slot.

use serde::Serialize;
use std::collections::BTreeSet;

use super::{SeatId, SurfaceId};
use crate::binding::Modifiers;
use crate::geometry::Point;
use crate::grab::{CursorShape, GrabSlot};

/// Linux input event codes for the buttons and keys the shell binds.
pub mod codes {
    pub const KEY_ESC: u32 = 1;
    pub const BTN_LEFT: u32 = 0x110;
    pub const BTN_RIGHT: u32 = 0x111;
    pub const BTN_MIDDLE: u32 = 0x112;
    pub const BTN_SIDE: u32 = 0x113;
    pub const BTN_EXTRA: u32 = 0x114;
    pub const BTN_FORWARD: u32 = 0x115;
    pub const BTN_BACK: u32 = 0x116;
    pub const BTN_TASK: u32 = 0x117;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Side,
    Extra,
    Forward,
    Back,
    Task,
    Other(u32),
}

impl PointerButton {
    pub fn from_code(code: u32) -> Self {
        match code {
            codes::BTN_LEFT => Self::Left,
            codes::BTN_RIGHT => Self::Right,
            codes::BTN_MIDDLE => Self::Middle,
            codes::BTN_SIDE => Self::Side,
            codes::BTN_EXTRA => Self::Extra,
            codes::BTN_FORWARD => Self::Forward,
            codes::BTN_BACK => Self::Back,
            codes::BTN_TASK => Self::Task,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Left => codes::BTN_LEFT,
            Self::Right => codes::BTN_RIGHT,
            Self::Middle => codes::BTN_MIDDLE,
            Self::Side => codes::BTN_SIDE,
            Self::Extra => codes::BTN_EXTRA,
            Self::Forward => codes::BTN_FORWARD,
            Self::Back => codes::BTN_BACK,
            Self::Task => codes::BTN_TASK,
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Default)]
pub struct Pointer {
    position: Point,

    /// Codes of the buttons currently held
    pressed: BTreeSet<u32>,

    /// Surface under the pointer receiving its events
    focus: Option<SurfaceId>,
}

impl Pointer {
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    pub fn button_count(&self) -> usize {
        self.pressed.len()
    }

    pub(crate) fn update_button(&mut self, button: PointerButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed.insert(button.code());
            }
            ButtonState::Released => {
                self.pressed.remove(&button.code());
            }
        }
    }

    pub fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<SurfaceId>) {
        self.focus = focus;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    modifiers: Modifiers,
    focus: Option<SurfaceId>,
}

impl Keyboard {
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<SurfaceId>) {
        self.focus = focus;
    }
}

/// Input-focus unit
#[derive(Debug)]
pub struct Seat {
    id: SeatId,
    name: String,
    pointer: Pointer,
    keyboard: Keyboard,

    /// Surface the seat last activated
    active: Option<SurfaceId>,

    /// At most one grab owns this seat's input routing
    pub(crate) grab: GrabSlot,

    /// Cursor requested by the running grab, reset when it ends
    pub(crate) grab_cursor: Option<CursorShape>,

    /// Popups dismissed together when the seat leaves popup mode
    pub(crate) popups: Vec<SurfaceId>,
}

impl Seat {
    pub(crate) fn new(id: SeatId, name: String) -> Self {
        Self {
            id,
            name,
            pointer: Pointer::default(),
            keyboard: Keyboard::default(),
            active: None,
            grab: GrabSlot::Idle,
            grab_cursor: None,
            popups: Vec::new(),
        }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut Pointer {
        &mut self.pointer
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn active_surface(&self) -> Option<SurfaceId> {
        self.active
    }

    pub(crate) fn set_active_surface(&mut self, surface: Option<SurfaceId>) {
        self.active = surface;
        self.keyboard.set_focus(surface);
    }

    pub fn is_grab_active(&self) -> bool {
        !matches!(self.grab, GrabSlot::Idle)
    }

    pub fn popups(&self) -> &[SurfaceId] {
        &self.popups
    }

    /// Forget a destroyed surface everywhere on this seat. Returns whether it
    /// was the active surface.
    pub(crate) fn forget_surface(&mut self, surface: SurfaceId) -> bool {
        if self.pointer.focus == Some(surface) {
            self.pointer.focus = None;
        }
        if self.keyboard.focus == Some(surface) {
            self.keyboard.focus = None;
        }
        self.popups.retain(|&p| p != surface);
        if self.active == Some(surface) {
            self.active = None;
            return true;
        }
        false
    }
}
