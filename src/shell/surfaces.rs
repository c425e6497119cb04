//! Surface roles, commits and teardown

use log::{debug, info, warn};

use crate::compositor::{ClientId, ConfigureHook, OutputId, SeatId, SurfaceId};
use crate::error::{Result, ShellError};
use crate::geometry::Point;
use crate::grab::PopupGrab;
use crate::shell_surface::{ShellSurface, SurfaceType};
use crate::workspace::WorkspaceId;

use super::{Shell, ShellEvent};

/// Which part of the chosen output a size request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputArea {
    Full,
    Available,
}

impl Shell {
    pub fn create_surface(&mut self, client: Option<ClientId>) -> Result<SurfaceId> {
        if let Some(client) = client {
            if !self.compositor.clients().is_connected(client) {
                return Err(ShellError::UnknownClient(client));
            }
        }
        Ok(self.compositor.create_surface(client))
    }

    /// Give a surface the shell-surface role. It gets one view per output
    /// that exists right now.
    pub fn create_shell_surface(&mut self, surface: SurfaceId) -> Result<()> {
        let outputs = self.compositor.output_ids();
        let target = self
            .compositor
            .surface_mut(surface)
            .ok_or(ShellError::UnknownSurface(surface))?;
        if *target.configure_hook() != ConfigureHook::Unassigned {
            warn!(
                "{} already has a role ({:?})",
                surface,
                target.configure_hook()
            );
            return Err(ShellError::RoleConflict(surface));
        }
        target.set_configure_hook(ConfigureHook::ShellSurface);
        let client = target.client();

        self.surfaces
            .insert(surface, ShellSurface::new(surface, client, &outputs));
        debug!("{} is now a shell surface with {} views", surface, outputs.len());
        Ok(())
    }

    /// The shell surface wrapping `surface`, if the shell handles its
    /// commits. Surfaces owned by other components yield `None`.
    pub fn shell_surface_for(&self, surface: SurfaceId) -> Option<&ShellSurface> {
        match self.compositor.surface(surface)?.configure_hook() {
            ConfigureHook::ShellSurface => self.surfaces.get(&surface),
            _ => None,
        }
    }

    pub fn shell_surface_mut(&mut self, surface: SurfaceId) -> Option<&mut ShellSurface> {
        match self.compositor.surface(surface)?.configure_hook() {
            ConfigureHook::ShellSurface => self.surfaces.get_mut(&surface),
            _ => None,
        }
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &ShellSurface> {
        self.surfaces.values()
    }

    pub(crate) fn managed_surface(&self, surface: SurfaceId) -> Result<&ShellSurface> {
        if self.compositor.surface(surface).is_none() {
            return Err(ShellError::UnknownSurface(surface));
        }
        self.shell_surface_for(surface)
            .ok_or(ShellError::NotShellSurface(surface))
    }

    fn managed_surface_mut(&mut self, surface: SurfaceId) -> Result<&mut ShellSurface> {
        if self.compositor.surface(surface).is_none() {
            return Err(ShellError::UnknownSurface(surface));
        }
        self.shell_surface_mut(surface)
            .ok_or(ShellError::NotShellSurface(surface))
    }

    pub fn set_title(&mut self, surface: SurfaceId, title: &str) -> Result<()> {
        self.managed_surface_mut(surface)?.set_title(title);
        Ok(())
    }

    pub fn set_configure_sender<F>(&mut self, surface: SurfaceId, sender: F) -> Result<()>
    where
        F: FnMut(SurfaceId, u32, u32) + 'static,
    {
        self.managed_surface_mut(surface)?
            .set_configure_sender(sender);
        Ok(())
    }

    pub fn set_toplevel(&mut self, surface: SurfaceId) -> Result<()> {
        self.managed_surface_mut(surface)?.set_toplevel();
        Ok(())
    }

    pub fn set_popup(
        &mut self,
        surface: SurfaceId,
        parent: SurfaceId,
        seat: SeatId,
        x: i32,
        y: i32,
    ) -> Result<()> {
        if self.compositor.seat(seat).is_none() {
            return Err(ShellError::UnknownSeat(seat));
        }
        self.managed_surface_mut(surface)?
            .set_popup(parent, seat, x, y);
        Ok(())
    }

    /// Maximize on the output picked for the surface's workspace and ask the
    /// client for that output's available size.
    pub fn set_maximized(&mut self, surface: SurfaceId) -> Result<()> {
        let shsurf = self.managed_surface_mut(surface)?;
        shsurf.request_maximized();
        let workspace = shsurf.workspace();
        self.request_output_size(surface, workspace, OutputArea::Available);
        Ok(())
    }

    pub fn set_fullscreen(&mut self, surface: SurfaceId) -> Result<()> {
        let shsurf = self.managed_surface_mut(surface)?;
        shsurf.request_fullscreen();
        let workspace = shsurf.workspace();
        self.request_output_size(surface, workspace, OutputArea::Full);
        Ok(())
    }

    fn request_output_size(
        &mut self,
        surface: SurfaceId,
        workspace: Option<WorkspaceId>,
        area: OutputArea,
    ) {
        if self.compositor.seats().is_empty() {
            debug!("No seats, not configuring {}", surface);
            return;
        }
        let Some(output) = self
            .select_output_for_workspace(workspace)
            .and_then(|id| self.compositor.output(id))
        else {
            debug!("No outputs, not configuring {}", surface);
            return;
        };
        let rect = match area {
            OutputArea::Full => output.geometry(),
            OutputArea::Available => output.available_geometry(),
        };
        if let Some(shsurf) = self.surfaces.get_mut(&surface) {
            shsurf.send_configure(rect.width, rect.height);
        }
    }

    /// A client committed new content. The surface's configure hook decides
    /// what happens.
    pub fn commit_surface(&mut self, surface: SurfaceId, width: u32, height: u32) -> Result<()> {
        let target = self
            .compositor
            .surface_mut(surface)
            .ok_or(ShellError::UnknownSurface(surface))?;
        target.set_size(width, height);
        match target.configure_hook().clone() {
            ConfigureHook::ShellSurface => self.configure_shell_surface(surface),
            ConfigureHook::Unassigned => {}
            ConfigureHook::Foreign(owner) => debug!("{} commit left to {}", surface, owner),
        }
        Ok(())
    }

    fn configure_shell_surface(&mut self, surface: SurfaceId) {
        let Some(shsurf) = self.surfaces.get(&surface) else {
            return;
        };

        if shsurf.pending_type() == SurfaceType::Popup {
            let parent = shsurf.popup().map(|p| p.parent);
            if parent.and_then(|p| self.shell_surface_for(p)).is_none() {
                warn!("Popup {} has no shell surface parent, ignoring", surface);
                return;
            }
        }

        let Some(shsurf) = self.surfaces.get_mut(&surface) else {
            return;
        };
        let kind = shsurf.commit();
        if kind == SurfaceType::None {
            return;
        }
        self.configure(surface, kind);
    }

    fn configure(&mut self, surface: SurfaceId, kind: SurfaceType) {
        let first_map = !self
            .compositor
            .surface(surface)
            .map_or(false, |s| s.is_mapped());
        if first_map {
            self.map_surface(surface, kind);
        }

        match kind {
            SurfaceType::Toplevel => {
                self.layout_toplevel(surface);
                if first_map {
                    self.cascade += 1;
                }
            }
            SurfaceType::Popup => {
                self.layout_popup(surface);
                self.register_popup(surface);
            }
            SurfaceType::None => return,
        }

        if let Some(target) = self.compositor.surface_mut(surface) {
            target.set_mapped(true);
        }
        self.backend.damage(surface);
    }

    /// Put a surface being shown for the first time on the primary output's
    /// workspace and, for toplevels, activate it everywhere.
    fn map_surface(&mut self, surface: SurfaceId, kind: SurfaceType) {
        let workspace = self
            .select_primary_output(None)
            .and_then(|o| self.compositor.output(o))
            .and_then(|o| o.current_workspace())
            .or_else(|| self.workspaces.first().map(|ws| ws.id()));
        let Some(workspace) = workspace else {
            return;
        };

        let Some(shsurf) = self.surfaces.get_mut(&surface) else {
            return;
        };
        shsurf.set_workspace(workspace);
        let outputs = shsurf.view_outputs();
        let title = shsurf.title().to_string();
        if let Some(ws) = self.workspace_mut(workspace) {
            ws.add_surface(surface);
            for output in outputs {
                ws.layer_mut(output).add_on_top(surface);
            }
        }
        debug!("{} mapped on {}", surface, workspace);

        if kind == SurfaceType::Toplevel {
            self.emit(ShellEvent::WindowAdded { surface, title });
            for seat in self.compositor.seat_ids() {
                self.activate_surface(seat, surface);
            }
        }
    }

    fn layout_toplevel(&mut self, surface: SurfaceId) {
        let Some(shsurf) = self.surfaces.get_mut(&surface) else {
            return;
        };
        let state = shsurf.toplevel_state();
        for view in shsurf.views_mut() {
            let Some(output) = self.compositor.output(view.output()) else {
                continue;
            };
            view.configure_toplevel(
                state,
                output.geometry(),
                output.available_geometry(),
                self.cascade,
            );
        }
    }

    fn layout_popup(&mut self, surface: SurfaceId) {
        let Some(popup) = self.surfaces.get(&surface).and_then(|s| s.popup().copied()) else {
            return;
        };
        let anchors: Vec<(OutputId, Point)> = match self.surfaces.get(&popup.parent) {
            Some(parent) => parent
                .views()
                .map(|view| (view.output(), view.position()))
                .collect(),
            None => return,
        };
        let Some(shsurf) = self.surfaces.get_mut(&surface) else {
            return;
        };
        for (output, anchor) in anchors {
            if let Some(view) = shsurf.view_for_output_mut(output) {
                view.configure_popup(anchor, popup.x, popup.y);
            }
        }
    }

    /// Put the popup's seat in popup mode. The popup grab only starts when
    /// the seat is not already grabbed.
    fn register_popup(&mut self, surface: SurfaceId) {
        let Some(seat) = self
            .surfaces
            .get(&surface)
            .and_then(|s| s.popup())
            .map(|p| p.seat)
        else {
            return;
        };
        let Some(target) = self.compositor.seat_mut(seat) else {
            warn!("Popup {} refers to missing {}", surface, seat);
            return;
        };
        if target.popups.contains(&surface) {
            return;
        }
        target.popups.push(surface);
        if target.is_grab_active() {
            debug!("{} busy, popup {} recorded without a grab", seat, surface);
            return;
        }
        if let Err(e) = self.start_grab(seat, Box::new(PopupGrab), None) {
            warn!("Could not enter popup mode on {}: {}", seat, e);
        }
    }

    /// Close every popup registered on the seat.
    pub(crate) fn dismiss_popups(&mut self, seat: SeatId) {
        let popups = self
            .compositor
            .seat_mut(seat)
            .map(|s| std::mem::take(&mut s.popups))
            .unwrap_or_default();
        for popup in popups {
            if let Some(shsurf) = self.surfaces.get_mut(&popup) {
                shsurf.popup_done();
                self.backend.popup_done(popup);
                debug!("Dismissed popup {}", popup);
            }
        }
    }

    /// Destroy a surface and every trace of it.
    pub fn destroy_surface(&mut self, surface: SurfaceId) -> Result<()> {
        let Some(target) = self.compositor.destroy_surface(surface) else {
            return Err(ShellError::UnknownSurface(surface));
        };

        let mut announced = false;
        if let Some(shsurf) = self.surfaces.remove(&surface) {
            announced = target.is_mapped() && shsurf.surface_type() == SurfaceType::Toplevel;
            if let Some(ws) = shsurf.workspace().and_then(|id| self.workspace_mut(id)) {
                ws.remove_surface(surface);
            }
        }

        let lost: Vec<SeatId> = self
            .compositor
            .seats_mut()
            .filter_map(|s| s.forget_surface(surface).then(|| s.id()))
            .collect();

        if announced {
            info!("Window {} closed", surface);
            self.emit(ShellEvent::WindowRemoved { surface });
        }
        for seat in lost {
            self.activate_top_surface(seat);
        }
        Ok(())
    }
}
