//! Exclusive input capture
//!
//! A grab temporarily owns one seat's pointer routing. The seat keeps it in a
//! single slot; while it runs, every motion and button event of that seat is
//! handed to the grab instead of the normal focus/binding path.
//!
//! Handlers receive the whole [`Shell`] so they can move views, pick surfaces
//! or end themselves. To make that possible the grab is taken out of its slot
//! for the duration of the call and the slot records that a dispatch is in
//! progress. Ending a grab from inside its own handler is therefore deferred
//! until the handler returns; [`Grab::ended`] runs exactly once either way.

use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::mem;

use crate::compositor::{ButtonState, PointerButton, SeatId};
use crate::error::{Result, ShellError};
use crate::geometry::Point;
use crate::shell::Shell;

pub mod kill_grab;
pub mod move_grab;
pub mod popup_grab;

pub use kill_grab::KillGrab;
pub use move_grab::MoveGrab;
pub use popup_grab::PopupGrab;

/// Cursor shapes a grab may ask the compositor to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CursorShape {
    Arrow,
    Move,
    Kill,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrabKind {
    Move,
    Kill,
    Popup,
}

/// What a handler wants to happen to its grab after the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStatus {
    Continue,
    Finished,
}

pub trait Grab: fmt::Debug {
    fn kind(&self) -> GrabKind;

    fn motion(&mut self, shell: &mut Shell, seat: SeatId, time: u32, position: Point)
        -> GrabStatus;

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) -> GrabStatus;

    /// Called once after the grab has been uninstalled. The seat may already
    /// be gone.
    fn ended(self: Box<Self>, _shell: &mut Shell, _seat: SeatId) {}
}

/// The per-seat grab slot.
#[derive(Debug, Default)]
pub(crate) enum GrabSlot {
    #[default]
    Idle,
    Active(Box<dyn Grab>),
    /// The grab is out of the slot running a handler
    Dispatching { kind: GrabKind, end_requested: bool },
}

impl GrabSlot {
    fn kind(&self) -> Option<GrabKind> {
        match self {
            GrabSlot::Idle => None,
            GrabSlot::Active(grab) => Some(grab.kind()),
            GrabSlot::Dispatching { kind, .. } => Some(*kind),
        }
    }
}

impl Shell {
    /// Install a grab on the seat. A seat that already runs a grab rejects
    /// the new one.
    pub fn start_grab(
        &mut self,
        seat: SeatId,
        grab: Box<dyn Grab>,
        cursor: Option<CursorShape>,
    ) -> Result<()> {
        let slot = self
            .compositor
            .seat_mut(seat)
            .ok_or(ShellError::UnknownSeat(seat))?;
        if slot.is_grab_active() {
            warn!(
                "Refusing {:?} grab on {}: {:?} grab already active",
                grab.kind(),
                seat,
                slot.grab.kind()
            );
            return Err(ShellError::GrabActive(seat));
        }

        debug!("Starting {:?} grab on {}", grab.kind(), seat);
        slot.grab = GrabSlot::Active(grab);
        slot.grab_cursor = cursor;
        if let Some(cursor) = cursor {
            self.backend.set_grab_cursor(seat, cursor);
        }
        Ok(())
    }

    /// Uninstall the seat's grab. Returns false when there was none.
    pub fn end_grab(&mut self, seat: SeatId) -> bool {
        let Some(slot) = self.compositor.seat_mut(seat) else {
            return false;
        };
        match mem::take(&mut slot.grab) {
            GrabSlot::Idle => false,
            GrabSlot::Active(grab) => {
                self.finish_grab(seat, grab);
                true
            }
            GrabSlot::Dispatching { kind, .. } => {
                if let Some(slot) = self.compositor.seat_mut(seat) {
                    slot.grab = GrabSlot::Dispatching {
                        kind,
                        end_requested: true,
                    };
                }
                true
            }
        }
    }

    pub fn is_grab_active(&self, seat: SeatId) -> bool {
        self.compositor
            .seat(seat)
            .map_or(false, |s| s.is_grab_active())
    }

    pub fn active_grab_kind(&self, seat: SeatId) -> Option<GrabKind> {
        self.compositor.seat(seat).and_then(|s| s.grab.kind())
    }

    /// Route a motion event to the seat's grab. Returns false if it has none.
    pub(crate) fn dispatch_grab_motion(
        &mut self,
        seat: SeatId,
        time: u32,
        position: Point,
    ) -> bool {
        let Some(mut grab) = self.take_grab(seat) else {
            return false;
        };
        let status = grab.motion(self, seat, time, position);
        self.settle_grab(seat, grab, status);
        true
    }

    pub(crate) fn dispatch_grab_button(
        &mut self,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) -> bool {
        let Some(mut grab) = self.take_grab(seat) else {
            return false;
        };
        let status = grab.button(self, seat, time, button, state);
        self.settle_grab(seat, grab, status);
        true
    }

    fn take_grab(&mut self, seat: SeatId) -> Option<Box<dyn Grab>> {
        let slot = self.compositor.seat_mut(seat)?;
        match mem::take(&mut slot.grab) {
            GrabSlot::Active(grab) => {
                slot.grab = GrabSlot::Dispatching {
                    kind: grab.kind(),
                    end_requested: false,
                };
                Some(grab)
            }
            other => {
                slot.grab = other;
                None
            }
        }
    }

    fn settle_grab(&mut self, seat: SeatId, grab: Box<dyn Grab>, status: GrabStatus) {
        let end_requested = match self.compositor.seat_mut(seat) {
            Some(slot) => match mem::take(&mut slot.grab) {
                GrabSlot::Dispatching { end_requested, .. } => end_requested,
                other => {
                    slot.grab = other;
                    true
                }
            },
            // Seat destroyed while the handler ran
            None => true,
        };

        if end_requested || status == GrabStatus::Finished {
            self.finish_grab(seat, grab);
        } else if let Some(slot) = self.compositor.seat_mut(seat) {
            slot.grab = GrabSlot::Active(grab);
        }
    }

    fn finish_grab(&mut self, seat: SeatId, grab: Box<dyn Grab>) {
        let cursor = self
            .compositor
            .seat_mut(seat)
            .and_then(|s| s.grab_cursor.take());
        if cursor.is_some() {
            self.backend.set_grab_cursor(seat, CursorShape::Arrow);
        }
        debug!("{:?} grab on {} ended", grab.kind(), seat);
        grab.ended(self, seat);
    }
}

#[cfg(test)]
mod tests;
