//! Interactive move

use crate::compositor::{ButtonState, PointerButton, SeatId, SurfaceId};
use crate::geometry::Point;
use crate::shell::Shell;

use super::{Grab, GrabKind, GrabStatus};

/// Drags every view of a surface along with the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveGrab {
    surface: SurfaceId,

    /// View position minus pointer position when the grab started
    dx: f64,
    dy: f64,
}

impl MoveGrab {
    pub fn new(surface: SurfaceId, view_position: Point, pointer: Point) -> Self {
        Self {
            surface,
            dx: view_position.x - pointer.x,
            dy: view_position.y - pointer.y,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }
}

impl Grab for MoveGrab {
    fn kind(&self) -> GrabKind {
        GrabKind::Move
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

        let Some(shsurf) = shell.surfaces.get_mut(&self.surface) else {
            return GrabStatus::Finished;
        };
        let target = Point::new(position.x + self.dx, position.y + self.dy);
        for view in shsurf.views_mut() {
            view.set_position(target);
        }
        shell.backend.damage(self.surface);
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        _button: PointerButton,
        state: ButtonState,
    ) -> GrabStatus {
        if !shell.surfaces.contains_key(&self.surface) {
            return GrabStatus::Finished;
        }
        let held = shell
            .compositor
            .seat(seat)
            .map_or(0, |s| s.pointer().button_count());
        if state == ButtonState::Released && held == 0 {
            GrabStatus::Finished
        } else {
            GrabStatus::Continue
        }
    }
}
