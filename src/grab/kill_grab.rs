//! Click-to-kill

use log::{debug, info, warn};

use crate::binding::BindingId;
use crate::compositor::{ButtonState, PointerButton, SeatId};
use crate::geometry::Point;
use crate::shell::Shell;

use super::{Grab, GrabKind, GrabStatus};

/// Terminates the client owning whatever is clicked next.
///
/// The grab is always over after one button event, whether or not something
/// was under the pointer. The abort binding that can cancel it is removed
/// when it ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KillGrab {
    abort_binding: Option<BindingId>,
}

impl KillGrab {
    pub fn new(abort_binding: Option<BindingId>) -> Self {
        Self { abort_binding }
    }

    pub fn abort_binding(&self) -> Option<BindingId> {
        self.abort_binding
    }
}

impl Grab for KillGrab {
    fn kind(&self) -> GrabKind {
        GrabKind::Kill
    }

    fn motion(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        position: Point,
    ) -> GrabStatus {
        if let Some(seat) = shell.compositor.seat_mut(seat) {
            seat.pointer_mut().move_to(position);
        }
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        _button: PointerButton,
        _state: ButtonState,
    ) -> GrabStatus {
        let Some(position) = shell.compositor.seat(seat).map(|s| s.pointer().position()) else {
            return GrabStatus::Finished;
        };
        let Some(surface) = shell.pick_surface(position) else {
            debug!("Kill grab on {}: nothing under the pointer", seat);
            return GrabStatus::Finished;
        };
        let pid = shell
            .compositor
            .surface(surface)
            .and_then(|s| s.client())
            .and_then(|client| shell.compositor.clients().pid(client));

        match pid {
            Some(pid) if pid == shell.settings.pid => {
                warn!("Not killing {}: it belongs to the shell itself", surface);
            }
            // kill(0) would hit the shell's own process group
            Some(0) => warn!("Not killing {}: its client has no usable pid", surface),
            Some(pid) => {
                info!("💀 Killing pid {} (owner of {})", pid, surface);
                shell.backend.terminate_client(pid);
            }
            None => debug!("Kill grab: {} has no client process", surface),
        }
        GrabStatus::Finished
    }

    fn ended(self: Box<Self>, shell: &mut Shell, _seat: SeatId) {
        if let Some(binding) = self.abort_binding {
            shell.compositor.bindings_mut().remove(binding);
        }
    }
}
