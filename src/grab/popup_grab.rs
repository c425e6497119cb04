//! Popup mode

use log::debug;

use crate::compositor::{ButtonState, PointerButton, SeatId};
use crate::geometry::Point;
use crate::shell::Shell;

use super::{Grab, GrabKind, GrabStatus};

/// Keeps a seat in popup mode until it clicks outside every popup's client.
///
/// Pointer motion is routed as usual. A press on a surface whose client owns
/// one of the seat's popups is delivered normally; any other press ends the
/// grab, which dismisses all the seat's popups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupGrab;

impl Grab for PopupGrab {
    fn kind(&self) -> GrabKind {
        GrabKind::Popup
    }

    fn motion(&mut self, shell: &mut Shell, seat: SeatId, time: u32, position: Point) -> GrabStatus {
        shell.route_pointer_motion(seat, time, position);
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) -> GrabStatus {
        if state == ButtonState::Pressed && !shell.pointer_over_popup_client(seat) {
            debug!("Press outside popups on {}, leaving popup mode", seat);
            return GrabStatus::Finished;
        }
        shell.route_pointer_button(seat, time, button, state);
        GrabStatus::Continue
    }

    fn ended(self: Box<Self>, shell: &mut Shell, seat: SeatId) {
        shell.dismiss_popups(seat);
    }
}
