use crate::compositor::OutputId;
use crate::geometry::{Point, Rectangle};

/// Offset between cascaded initial placements
const CASCADE_STEP: f64 = 32.0;

/// The toplevel layout a view is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToplevelState {
    pub maximized: bool,
    pub fullscreen: bool,
}

/// Projection of a shell surface onto one output. Positions are global.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellView {
    output: OutputId,
    position: Point,

    /// Position to go back to when leaving maximized/fullscreen
    restore_position: Option<Point>,

    placed: bool,
}

impl ShellView {
    pub fn new(output: OutputId) -> Self {
        Self {
            output,
            position: Point::default(),
            restore_position: None,
            placed: false,
        }
    }

    pub fn output(&self) -> OutputId {
        self.output
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.placed = true;
    }

    pub fn geometry(&self, (width, height): (u32, u32)) -> Rectangle {
        Rectangle::new(
            self.position.x.round() as i32,
            self.position.y.round() as i32,
            width,
            height,
        )
    }

    /// Lay the view out on its output. `cascade` staggers first placements.
    pub fn configure_toplevel(
        &mut self,
        state: ToplevelState,
        geometry: Rectangle,
        available: Rectangle,
        cascade: usize,
    ) {
        if state.fullscreen || state.maximized {
            if self.restore_position.is_none() && self.placed {
                self.restore_position = Some(self.position);
            }
            self.position = if state.fullscreen {
                geometry.origin()
            } else {
                available.origin()
            };
            self.placed = true;
            return;
        }

        if let Some(restore) = self.restore_position.take() {
            self.position = restore;
        } else if !self.placed {
            let step = (cascade % 8) as f64 * CASCADE_STEP;
            let origin = available.origin();
            self.position = Point::new(origin.x + step, origin.y + step);
        }
        self.placed = true;
    }

    pub fn configure_popup(&mut self, parent: Point, x: i32, y: i32) {
        self.set_position(Point::new(parent.x + x as f64, parent.y + y as f64));
    }
}
