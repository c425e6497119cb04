//! Input routing, bindings and activation

use log::{debug, info};

use crate::binding::{BindingAction, BindingId, Modifiers, Trigger};
use crate::compositor::seat::codes;
use crate::compositor::{ButtonState, KeyState, PointerButton, SeatId, SurfaceId};
use crate::error::{Result, ShellError};
use crate::geometry::Point;
use crate::grab::{CursorShape, KillGrab, MoveGrab};
use crate::shell_surface::SurfaceType;

use super::{Shell, ShellEvent};

impl Shell {
    // === Event entry points ===

    pub fn handle_pointer_motion(&mut self, seat: SeatId, time: u32, position: Point) -> Result<()> {
        if self.compositor.seat(seat).is_none() {
            return Err(ShellError::UnknownSeat(seat));
        }
        if !self.dispatch_grab_motion(seat, time, position) {
            self.route_pointer_motion(seat, time, position);
        }
        Ok(())
    }

    /// Button presses first go through the binding table, unless the seat is
    /// grabbed. The event itself then reaches the grab or the pointer focus.
    pub fn handle_pointer_button(
        &mut self,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) -> Result<()> {
        let target = self
            .compositor
            .seat_mut(seat)
            .ok_or(ShellError::UnknownSeat(seat))?;
        target.pointer_mut().update_button(button, state);
        let grabbed = target.is_grab_active();
        let modifiers = target.keyboard().modifiers();

        if state == ButtonState::Pressed && !grabbed {
            self.run_bindings(seat, Trigger::Button(button), modifiers);
        }
        if !self.dispatch_grab_button(seat, time, button, state) {
            self.route_pointer_button(seat, time, button, state);
        }
        Ok(())
    }

    /// A key press matching a binding is consumed; everything else goes to
    /// the keyboard focus.
    pub fn handle_key(&mut self, seat: SeatId, time: u32, key: u32, state: KeyState) -> Result<()> {
        let modifiers = self
            .compositor
            .seat(seat)
            .ok_or(ShellError::UnknownSeat(seat))?
            .keyboard()
            .modifiers();

        if state == KeyState::Pressed && self.run_bindings(seat, Trigger::Key(key), modifiers) {
            return Ok(());
        }
        let focus = self
            .compositor
            .seat(seat)
            .and_then(|s| s.keyboard().focus());
        self.backend.key(seat, focus, time, key, state);
        Ok(())
    }

    pub fn set_modifiers(&mut self, seat: SeatId, modifiers: Modifiers) -> Result<()> {
        self.compositor
            .seat_mut(seat)
            .ok_or(ShellError::UnknownSeat(seat))?
            .keyboard_mut()
            .set_modifiers(modifiers);
        Ok(())
    }

    /// Normal motion: move the pointer, refocus, deliver.
    pub(crate) fn route_pointer_motion(&mut self, seat: SeatId, time: u32, position: Point) {
        let focus = self.pick_surface(position);
        let Some(target) = self.compositor.seat_mut(seat) else {
            return;
        };
        let pointer = target.pointer_mut();
        pointer.move_to(position);
        pointer.set_focus(focus);
        self.backend.pointer_motion(seat, focus, time, position);
    }

    pub(crate) fn route_pointer_button(
        &mut self,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) {
        let focus = self
            .compositor
            .seat(seat)
            .and_then(|s| s.pointer().focus());
        self.backend.pointer_button(seat, focus, time, button, state);
    }

    /// Whether the seat's pointer focus belongs to a client owning one of
    /// the seat's popups.
    pub(crate) fn pointer_over_popup_client(&self, seat: SeatId) -> bool {
        let Some(target) = self.compositor.seat(seat) else {
            return false;
        };
        let client_of = |surface: SurfaceId| {
            self.compositor
                .surface(surface)
                .and_then(|s| s.client())
        };
        let Some(client) = target.pointer().focus().and_then(client_of) else {
            return false;
        };
        target
            .popups()
            .iter()
            .any(|&popup| client_of(popup) == Some(client))
    }

    // === Bindings ===

    fn run_bindings(&mut self, seat: SeatId, trigger: Trigger, modifiers: Modifiers) -> bool {
        let matches = self.compositor.bindings().matching(trigger, modifiers);
        for &(binding, action) in &matches {
            // An earlier action may have removed it
            if self.compositor.bindings().get(binding).is_some() {
                self.run_binding(seat, binding, action);
            }
        }
        !matches.is_empty()
    }

    fn run_binding(&mut self, seat: SeatId, binding: BindingId, action: BindingAction) {
        debug!("{} triggered {} ({:?})", seat, binding, action);
        match action {
            BindingAction::FocusUnderPointer => self.give_focus(seat),
            BindingAction::ToggleRaise => self.toggle_raise(seat),
            BindingAction::MoveFocused => self.move_focused(seat),
            BindingAction::Kill => {
                if let Err(e) = self.kill_surface(seat) {
                    debug!("Kill binding ignored: {}", e);
                }
            }
            BindingAction::AbortGrab(target) => {
                self.end_grab(target);
            }
            BindingAction::Notify => self.emit(ShellEvent::BindingTriggered { binding, seat }),
        }
    }

    fn surface_under_pointer(&self, seat: SeatId) -> Option<SurfaceId> {
        let position = self.compositor.seat(seat)?.pointer().position();
        self.pick_surface(position)
    }

    fn pointer_focus(&self, seat: SeatId) -> Option<SurfaceId> {
        self.compositor.seat(seat)?.pointer().focus()
    }

    fn give_focus(&mut self, seat: SeatId) {
        let Some(surface) = self.surface_under_pointer(seat) else {
            return;
        };
        let Some(fullscreen) = self.shell_surface_for(surface).map(|s| s.is_fullscreen()) else {
            return;
        };
        self.activate_surface(seat, surface);
        if !self.settings.separate_raise && !fullscreen {
            self.raise(surface);
        }
    }

    /// Per output: lower the pointer focus if it is on top, raise it otherwise.
    fn toggle_raise(&mut self, seat: SeatId) {
        let Some(surface) = self.pointer_focus(seat) else {
            return;
        };
        let Some(shsurf) = self.shell_surface_for(surface) else {
            return;
        };
        if shsurf.is_fullscreen() {
            return;
        }
        let outputs = shsurf.view_outputs();
        let Some(ws) = shsurf.workspace().and_then(|id| self.workspace_mut(id)) else {
            return;
        };
        for output in outputs {
            let layer = ws.layer_mut(output);
            if layer.top_view() == Some(surface) {
                layer.lower(surface);
            } else {
                layer.raise_on_top(surface);
            }
        }
        self.backend.damage(surface);
    }

    /// Raise every view of the surface to the top of its layer.
    pub(crate) fn raise(&mut self, surface: SurfaceId) {
        let Some(shsurf) = self.surfaces.get(&surface) else {
            return;
        };
        let outputs = shsurf.view_outputs();
        let Some(ws) = shsurf.workspace().and_then(|id| self.workspace_mut(id)) else {
            return;
        };
        for output in outputs {
            ws.layer_mut(output).raise_on_top(surface);
        }
        self.backend.damage(surface);
    }

    fn move_focused(&mut self, seat: SeatId) {
        let Some(surface) = self.pointer_focus(seat) else {
            return;
        };
        if let Err(e) = self.move_surface(surface, seat) {
            debug!("Move binding ignored: {}", e);
        }
    }

    /// Start an interactive move of the surface, anchored at the view under
    /// the seat's pointer.
    pub fn move_surface(&mut self, surface: SurfaceId, seat: SeatId) -> Result<()> {
        let shsurf = self.managed_surface(surface)?;
        let pointer = self
            .compositor
            .seat(seat)
            .ok_or(ShellError::UnknownSeat(seat))?
            .pointer()
            .position();
        if shsurf.is_fullscreen() {
            debug!("Not moving fullscreen {}", surface);
            return Ok(());
        }

        let view = self
            .compositor
            .output_at(pointer)
            .and_then(|output| shsurf.view_for_output(output))
            .or_else(|| shsurf.views().next());
        let Some(anchor) = view.map(|v| v.position()) else {
            return Ok(());
        };
        self.start_grab(
            seat,
            Box::new(MoveGrab::new(surface, anchor, pointer)),
            Some(CursorShape::Move),
        )
    }

    /// Enter click-to-kill mode. Escape cancels it.
    ///
    /// The abort binding matches Escape without modifiers on any seat, so
    /// while a kill is pending every seat's Escape press is consumed.
    pub fn kill_surface(&mut self, seat: SeatId) -> Result<()> {
        let target = self
            .compositor
            .seat_mut(seat)
            .ok_or(ShellError::UnknownSeat(seat))?;
        if target.is_grab_active() {
            return Err(ShellError::GrabActive(seat));
        }
        target.pointer_mut().set_focus(None);

        let abort = self.compositor.bindings_mut().add(
            Trigger::Key(codes::KEY_ESC),
            Modifiers::empty(),
            BindingAction::AbortGrab(seat),
        );
        if let Err(e) = self.start_grab(
            seat,
            Box::new(KillGrab::new(Some(abort))),
            Some(CursorShape::Kill),
        ) {
            self.compositor.bindings_mut().remove(abort);
            return Err(e);
        }
        info!("Kill mode on {}, click a window or press Escape", seat);
        Ok(())
    }

    // === Activation and picking ===

    pub fn activate(&mut self, seat: SeatId, surface: SurfaceId) -> Result<()> {
        if self.compositor.seat(seat).is_none() {
            return Err(ShellError::UnknownSeat(seat));
        }
        if self.compositor.surface(surface).is_none() {
            return Err(ShellError::UnknownSurface(surface));
        }
        self.activate_surface(seat, surface);
        Ok(())
    }

    pub(crate) fn activate_surface(&mut self, seat: SeatId, surface: SurfaceId) {
        let Some(target) = self.compositor.seat_mut(seat) else {
            return;
        };
        target.set_active_surface(Some(surface));
        self.backend.activate(seat, surface);
        self.emit(ShellEvent::WindowActivated { surface, seat });
    }

    /// Recover from a seat losing its active surface: activate the topmost
    /// view on the workspace shown where that seat's pointer is.
    pub fn activate_top_surface(&mut self, seat: SeatId) {
        let Some(position) = self.compositor.seat(seat).map(|s| s.pointer().position()) else {
            return;
        };
        let Some(output) = self.compositor.output_at(position) else {
            debug!("{} pointer is off every output, nothing to activate", seat);
            return;
        };
        let Some(workspace) = self
            .compositor
            .output(output)
            .and_then(|o| o.current_workspace())
        else {
            return;
        };
        let top = self
            .workspace(workspace)
            .and_then(|ws| ws.layer(output))
            .and_then(|layer| layer.top_down().find(|&s| self.is_visible(s)));
        match top {
            Some(surface) => self.activate_surface(seat, surface),
            None => debug!("Nothing to activate on {} for {}", workspace, seat),
        }
    }

    fn is_visible(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map_or(false, |s| s.surface_type() != SurfaceType::None && !s.is_minimized())
    }

    /// Topmost visible shell surface whose view contains the point, on the
    /// workspace shown by the output under it.
    pub fn pick_surface(&self, position: Point) -> Option<SurfaceId> {
        let output = self.compositor.output_at(position)?;
        let workspace = self.compositor.output(output)?.current_workspace()?;
        let layer = self.workspace(workspace)?.layer(output)?;
        layer.top_down().find(|&surface| {
            if !self.is_visible(surface) {
                return false;
            }
            let Some(size) = self.compositor.surface(surface).map(|s| s.size()) else {
                return false;
            };
            self.surfaces
                .get(&surface)
                .and_then(|s| s.view_for_output(output))
                .map_or(false, |view| view.geometry(size).contains_point(position))
        })
    }
}
