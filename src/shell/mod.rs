//! The shell orchestrator
//!
//! [`Shell`] is the explicit context object tying everything together. It
//! owns the compositor model, the workspaces, the shell surfaces and the
//! trusted-client registry, and it is the only place where the pieces talk
//! to each other:
//!
//! - protocol requests land in the role methods (`set_toplevel`,
//!   `set_popup`, `set_maximized`, ...) and in [`Shell::commit_surface`],
//! - input events land in the `handle_*` methods, which consult the binding
//!   table and the seat's grab,
//! - the desktop UI drives the commands (`select_workspace`,
//!   `minimize_windows`, `log_out`, ...) and drains [`ShellEvent`]s.
//!
//! Everything runs on one thread, to completion, inside the event loop.

use anyhow::Result as AnyResult;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use crate::backend::Backend;
use crate::binding::{BindingAction, BindingId, Modifiers, Trigger};
use crate::compositor::seat::codes;
use crate::compositor::{ClientId, Compositor, OutputId, PointerButton, SeatId, SurfaceId};
use crate::config::OrbitConfig;
use crate::error::{Result, ShellError};
use crate::geometry::Rectangle;
use crate::output_selection::{select_output, Candidate, ATTACHED_WORKSPACE_BIAS};
use crate::session::{SessionAction, SessionManager};
use crate::shell_surface::{ShellSurface, SurfaceType};
use crate::trusted::TrustedClients;
use crate::workspace::{Workspace, WorkspaceId};

mod events;
mod input;
mod surfaces;

pub use events::ShellEvent;

/// Runtime switches of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    /// Clicking a window focuses it without raising it
    pub separate_raise: bool,

    /// Workspaces created at start
    pub workspaces: u32,

    /// Our own process id; the kill grab never signals it
    pub pid: u32,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            separate_raise: false,
            workspaces: 4,
            pid: std::process::id(),
        }
    }
}

impl ShellSettings {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            separate_raise: config.shell.separate_raise,
            workspaces: config.shell.workspaces,
            ..Self::default()
        }
    }
}

pub struct Shell {
    pub(crate) settings: ShellSettings,
    pub(crate) compositor: Compositor,
    pub(crate) backend: Box<dyn Backend>,
    session: Box<dyn SessionManager>,

    workspaces: Vec<Workspace>,
    next_workspace_id: u32,

    /// Shell surfaces keyed by the surface they wrap
    pub(crate) surfaces: BTreeMap<SurfaceId, ShellSurface>,

    trusted: TrustedClients,
    events: Vec<ShellEvent>,

    /// Toplevels placed so far, staggers first placements
    cascade: usize,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("settings", &self.settings)
            .field("compositor", &self.compositor)
            .field("workspaces", &self.workspaces)
            .field("surfaces", &self.surfaces)
            .field("trusted", &self.trusted)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Shell {
    pub fn new(
        settings: ShellSettings,
        backend: Box<dyn Backend>,
        session: Box<dyn SessionManager>,
    ) -> Self {
        let workspaces = settings.workspaces.max(1);
        let mut shell = Self {
            settings,
            compositor: Compositor::new(),
            backend,
            session,
            workspaces: Vec::new(),
            next_workspace_id: 0,
            surfaces: BTreeMap::new(),
            trusted: TrustedClients::new(),
            events: Vec::new(),
            cascade: 0,
        };

        shell.register_static_bindings();
        for _ in 0..workspaces {
            shell.add_workspace();
        }
        info!(
            "🪐 Shell ready: {} workspaces, {} bindings",
            shell.workspaces.len(),
            shell.compositor.bindings().len()
        );
        shell
    }

    /// Build a shell with the outputs and seats listed in the configuration.
    pub fn from_config(
        config: &OrbitConfig,
        backend: Box<dyn Backend>,
        session: Box<dyn SessionManager>,
    ) -> AnyResult<Self> {
        config.validate()?;
        let mut shell = Self::new(ShellSettings::from_config(config), backend, session);
        for output in &config.outputs {
            shell.add_output(
                output.name.clone(),
                output.geometry(),
                output.available_geometry(),
            );
        }
        for seat in &config.seats {
            shell.add_seat(seat.name.clone());
        }
        Ok(shell)
    }

    fn register_static_bindings(&mut self) {
        let bindings = self.compositor.bindings_mut();
        bindings.add(
            Trigger::Button(PointerButton::Left),
            Modifiers::empty(),
            BindingAction::FocusUnderPointer,
        );
        bindings.add(
            Trigger::Button(PointerButton::Task),
            Modifiers::empty(),
            BindingAction::ToggleRaise,
        );
        bindings.add(
            Trigger::Button(PointerButton::Left),
            Modifiers::SUPER,
            BindingAction::MoveFocused,
        );
        bindings.add(
            Trigger::Key(codes::KEY_ESC),
            Modifiers::SUPER | Modifiers::CTRL,
            BindingAction::Kill,
        );
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn set_separate_raise(&mut self, separate_raise: bool) {
        self.settings.separate_raise = separate_raise;
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub(crate) fn emit(&mut self, event: ShellEvent) {
        debug!("Shell event: {:?}", event);
        self.events.push(event);
    }

    /// Notifications produced since the last call
    pub fn take_events(&mut self) -> Vec<ShellEvent> {
        mem::take(&mut self.events)
    }

    // === Outputs and seats ===

    /// Add an output and show a free workspace on it, creating one if every
    /// workspace is already shown somewhere.
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        geometry: Rectangle,
        available_geometry: Rectangle,
    ) -> OutputId {
        let name = name.into();
        let output = self
            .compositor
            .add_output(name.clone(), geometry, available_geometry);

        let free = self
            .workspaces
            .iter()
            .find(|ws| ws.attached_outputs().is_empty())
            .map(Workspace::id);
        let workspace = match free {
            Some(workspace) => workspace,
            None => self.add_workspace(),
        };
        self.show_workspace(workspace, output);

        info!(
            "🖥️ Output {} ({}) at {}x{}+{}+{}",
            output, name, geometry.width, geometry.height, geometry.x, geometry.y
        );
        output
    }

    pub fn add_seat(&mut self, name: impl Into<String>) -> SeatId {
        let name = name.into();
        let seat = self.compositor.add_seat(name.clone());
        info!("Seat {} ({}) added", seat, name);
        seat
    }

    /// Destroy a seat. Its grab is ended and its popups dismissed first.
    pub fn remove_seat(&mut self, seat: SeatId) -> Result<()> {
        if self.compositor.seat(seat).is_none() {
            return Err(ShellError::UnknownSeat(seat));
        }
        self.end_grab(seat);
        self.dismiss_popups(seat);
        self.compositor.remove_seat(seat);
        info!("Seat {} removed", seat);
        Ok(())
    }

    // === Clients ===

    pub fn connect_client(&mut self, pid: u32) -> ClientId {
        self.compositor.clients_mut().connect(pid)
    }

    /// Tear a client down: its destroy listeners run, then its surfaces go.
    pub fn disconnect_client(&mut self, client: ClientId) -> Result<()> {
        if !self.compositor.clients_mut().disconnect(client) {
            return Err(ShellError::UnknownClient(client));
        }
        for surface in self.compositor.surfaces_of(client) {
            self.destroy_surface(surface)?;
        }
        Ok(())
    }

    pub fn add_trusted_client(&mut self, interface: &str, client: ClientId) -> Result<()> {
        self.trusted
            .add(interface, client, self.compositor.clients_mut())
    }

    pub fn is_client_trusted(&self, interface: &str, client: ClientId) -> bool {
        self.trusted.is_trusted(interface, client)
    }

    // === Workspaces ===

    pub fn add_workspace(&mut self) -> WorkspaceId {
        let id = WorkspaceId(self.next_workspace_id);
        self.next_workspace_id += 1;
        self.workspaces.push(Workspace::new(id));
        debug!("Created {}", id);
        self.emit(ShellEvent::WorkspaceAdded { workspace: id });
        id
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.id() == id)
    }

    pub(crate) fn workspace_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|ws| ws.id() == id)
    }

    /// Show a workspace on the primary output.
    pub fn select_workspace(&mut self, workspace: WorkspaceId) -> Result<()> {
        if self.workspace(workspace).is_none() {
            return Err(ShellError::UnknownWorkspace(workspace));
        }
        let Some(output) = self.select_primary_output(None) else {
            debug!("No output to show {} on", workspace);
            return Ok(());
        };
        self.show_workspace(workspace, output);
        Ok(())
    }

    /// Attach `workspace` to `output`. If it is shown on another output, that
    /// output gets the workspace `output` was showing.
    fn show_workspace(&mut self, workspace: WorkspaceId, output: OutputId) {
        let previous = self
            .compositor
            .output(output)
            .and_then(|o| o.current_workspace());
        if previous == Some(workspace) {
            return;
        }

        let elsewhere: Vec<OutputId> = self
            .workspace(workspace)
            .map(|ws| ws.attached_outputs())
            .unwrap_or_default();
        if let Some(previous) = previous {
            if let Some(ws) = self.workspace_mut(previous) {
                ws.detach(output);
            }
        }
        for other in elsewhere {
            if let Some(ws) = self.workspace_mut(workspace) {
                ws.detach(other);
            }
            if let Some(previous) = previous {
                if let Some(ws) = self.workspace_mut(previous) {
                    ws.attach(other);
                }
                self.emit(ShellEvent::WorkspaceActivated {
                    workspace: previous,
                    output: other,
                });
            }
            if let Some(o) = self.compositor.output_mut(other) {
                o.set_current_workspace(previous);
            }
        }

        if let Some(ws) = self.workspace_mut(workspace) {
            ws.attach(output);
        }
        if let Some(o) = self.compositor.output_mut(output) {
            o.set_current_workspace(Some(workspace));
        }
        self.emit(ShellEvent::WorkspaceActivated { workspace, output });
    }

    // === Output selection ===

    /// The output most pointers are on, counting every seat or only `seat`.
    pub fn select_primary_output(&self, seat: Option<SeatId>) -> Option<OutputId> {
        let candidates: Vec<Candidate> = self
            .compositor
            .outputs()
            .iter()
            .map(|o| Candidate::new(o.id(), o.geometry()))
            .collect();
        select_output(&candidates, &self.compositor.pointer_positions(seat))
    }

    /// Primary output selection favouring outputs that already show the
    /// workspace.
    pub fn select_output_for_workspace(&self, workspace: Option<WorkspaceId>) -> Option<OutputId> {
        let attached = workspace
            .and_then(|id| self.workspace(id))
            .map(Workspace::attached_outputs)
            .unwrap_or_default();
        let candidates: Vec<Candidate> = self
            .compositor
            .outputs()
            .iter()
            .map(|o| {
                let bias = if attached.contains(&o.id()) {
                    ATTACHED_WORKSPACE_BIAS
                } else {
                    0
                };
                Candidate::new(o.id(), o.geometry()).with_bias(bias)
            })
            .collect();
        select_output(&candidates, &self.compositor.pointer_positions(None))
    }

    // === Desktop UI commands ===

    /// Activate a surface on every seat and bring it to the top.
    pub fn request_focus(&mut self, surface: SurfaceId) -> Result<()> {
        let minimized = self.managed_surface(surface)?.is_minimized();
        if minimized {
            self.restore_surface(surface);
        }
        for seat in self.compositor.seat_ids() {
            self.activate_surface(seat, surface);
        }
        self.raise(surface);
        Ok(())
    }

    /// Hide every toplevel.
    pub fn minimize_windows(&mut self) {
        let toplevels: Vec<(SurfaceId, Option<WorkspaceId>, Vec<OutputId>)> = self
            .surfaces
            .values()
            .filter(|s| s.surface_type() == SurfaceType::Toplevel && !s.is_minimized())
            .map(|s| (s.surface(), s.workspace(), s.view_outputs()))
            .collect();
        debug!("Minimizing {} windows", toplevels.len());

        for (surface, workspace, outputs) in toplevels {
            if let Some(ws) = workspace.and_then(|id| self.workspace_mut(id)) {
                for output in outputs {
                    ws.layer_mut(output).remove(surface);
                }
            }
            if let Some(shsurf) = self.surfaces.get_mut(&surface) {
                shsurf.set_minimized(true);
            }
            self.backend.damage(surface);
        }
    }

    /// Bring every minimized toplevel back, on top.
    pub fn restore_windows(&mut self) {
        let minimized: Vec<SurfaceId> = self
            .surfaces
            .values()
            .filter(|s| s.is_minimized())
            .map(ShellSurface::surface)
            .collect();
        debug!("Restoring {} windows", minimized.len());
        for surface in minimized {
            self.restore_surface(surface);
        }
    }

    fn restore_surface(&mut self, surface: SurfaceId) {
        let Some(shsurf) = self.surfaces.get_mut(&surface) else {
            return;
        };
        shsurf.set_minimized(false);
        let workspace = shsurf.workspace();
        let outputs = shsurf.view_outputs();
        if let Some(ws) = workspace.and_then(|id| self.workspace_mut(id)) {
            for output in outputs {
                ws.layer_mut(output).add_on_top(surface);
            }
        }
        self.backend.damage(surface);
    }

    pub fn log_out(&mut self) {
        self.session_action(SessionAction::LogOut);
    }

    pub fn power_off(&mut self) {
        self.session_action(SessionAction::PowerOff);
    }

    pub fn reboot(&mut self) {
        self.session_action(SessionAction::Reboot);
    }

    fn session_action(&mut self, action: SessionAction) {
        info!("👋 {} requested, quitting", action);
        self.emit(ShellEvent::SessionRequested { action });
        self.emit(ShellEvent::Quit);
        if let Err(e) = self.session.request(action) {
            warn!("Session manager failed to {}: {:#}", action, e);
        }
    }

    /// Register a key binding reported back as [`ShellEvent::BindingTriggered`].
    pub fn add_key_binding(&mut self, key: u32, modifiers: Modifiers) -> BindingId {
        self.compositor
            .bindings_mut()
            .add(Trigger::Key(key), modifiers, BindingAction::Notify)
    }

    pub fn add_button_binding(&mut self, button: PointerButton, modifiers: Modifiers) -> BindingId {
        self.compositor
            .bindings_mut()
            .add(Trigger::Button(button), modifiers, BindingAction::Notify)
    }

    pub fn remove_binding(&mut self, binding: BindingId) -> bool {
        self.compositor.bindings_mut().remove(binding)
    }
}
