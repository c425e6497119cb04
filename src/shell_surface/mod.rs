//! Shell surface role state machine
//!
//! A [`ShellSurface`] wraps one client surface and decides what it is on
//! screen. Role requests (`set_toplevel`, `set_popup`, maximize, fullscreen)
//! only write the pending type; the committed type changes in exactly one
//! place, [`RoleState::commit`], which the shell calls from the surface's
//! configure hook.
//!
//! The surface owns one [`ShellView`] per output that existed when it was
//! created. Outputs added later get no view.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::compositor::{ClientId, OutputId, SeatId, SurfaceId};
use crate::workspace::WorkspaceId;

mod view;

pub use view::{ShellView, ToplevelState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SurfaceType {
    /// No role yet, nothing to show
    #[default]
    None,
    Toplevel,
    Popup,
}

/// Committed and pending surface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleState {
    committed: SurfaceType,
    pending: SurfaceType,
}

impl RoleState {
    pub fn request(&mut self, next: SurfaceType) {
        self.pending = next;
    }

    pub fn committed(&self) -> SurfaceType {
        self.committed
    }

    pub fn pending(&self) -> SurfaceType {
        self.pending
    }

    /// Make the pending type current.
    pub fn commit(&mut self) -> SurfaceType {
        self.committed = self.pending;
        self.committed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupState {
    pub parent: SurfaceId,
    pub seat: SeatId,
    pub x: i32,
    pub y: i32,
}

/// Asks the client to resize to the given width and height.
pub type ConfigureSender = Box<dyn FnMut(SurfaceId, u32, u32)>;

pub struct ShellSurface {
    surface: SurfaceId,
    client: Option<ClientId>,
    title: String,
    role: RoleState,
    popup: Option<PopupState>,
    toplevel: ToplevelState,
    workspace: Option<WorkspaceId>,
    views: BTreeMap<OutputId, ShellView>,
    configure_sender: Option<ConfigureSender>,
    minimized: bool,
}

impl fmt::Debug for ShellSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellSurface")
            .field("surface", &self.surface)
            .field("client", &self.client)
            .field("title", &self.title)
            .field("role", &self.role)
            .field("popup", &self.popup)
            .field("toplevel", &self.toplevel)
            .field("workspace", &self.workspace)
            .field("views", &self.views)
            .field("minimized", &self.minimized)
            .finish_non_exhaustive()
    }
}

impl ShellSurface {
    pub fn new(surface: SurfaceId, client: Option<ClientId>, outputs: &[OutputId]) -> Self {
        let views = outputs
            .iter()
            .map(|&output| (output, ShellView::new(output)))
            .collect();
        Self {
            surface,
            client,
            title: String::new(),
            role: RoleState::default(),
            popup: None,
            toplevel: ToplevelState::default(),
            workspace: None,
            views,
            configure_sender: None,
            minimized: false,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn client(&self) -> Option<ClientId> {
        self.client
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Committed type
    pub fn surface_type(&self) -> SurfaceType {
        self.role.committed()
    }

    pub fn pending_type(&self) -> SurfaceType {
        self.role.pending()
    }

    pub fn set_toplevel(&mut self) {
        self.role.request(SurfaceType::Toplevel);
        self.toplevel = ToplevelState::default();
    }

    pub fn set_popup(&mut self, parent: SurfaceId, seat: SeatId, x: i32, y: i32) {
        self.popup = Some(PopupState { parent, seat, x, y });
        self.role.request(SurfaceType::Popup);
    }

    /// Pending-state half of a maximize request. The output choice and the
    /// configure request are made by the shell.
    pub(crate) fn request_maximized(&mut self) {
        self.role.request(SurfaceType::Toplevel);
        self.toplevel = ToplevelState {
            maximized: true,
            fullscreen: false,
        };
    }

    pub(crate) fn request_fullscreen(&mut self) {
        self.role.request(SurfaceType::Toplevel);
        self.toplevel = ToplevelState {
            maximized: false,
            fullscreen: true,
        };
    }

    /// The popup was dismissed; it loses its role on the next commit.
    pub fn popup_done(&mut self) {
        self.role.request(SurfaceType::None);
    }

    pub(crate) fn commit(&mut self) -> SurfaceType {
        self.role.commit()
    }

    pub fn toplevel_state(&self) -> ToplevelState {
        self.toplevel
    }

    pub fn is_maximized(&self) -> bool {
        self.toplevel.maximized
    }

    pub fn is_fullscreen(&self) -> bool {
        self.toplevel.fullscreen
    }

    pub fn popup(&self) -> Option<&PopupState> {
        self.popup.as_ref()
    }

    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    pub(crate) fn set_workspace(&mut self, workspace: WorkspaceId) {
        self.workspace = Some(workspace);
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub(crate) fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    pub fn view_for_output(&self, output: OutputId) -> Option<&ShellView> {
        self.views.get(&output)
    }

    pub fn view_for_output_mut(&mut self, output: OutputId) -> Option<&mut ShellView> {
        self.views.get_mut(&output)
    }

    pub fn views(&self) -> impl Iterator<Item = &ShellView> {
        self.views.values()
    }

    pub fn views_mut(&mut self) -> impl Iterator<Item = &mut ShellView> {
        self.views.values_mut()
    }

    pub fn view_outputs(&self) -> Vec<OutputId> {
        self.views.keys().copied().collect()
    }

    pub fn set_configure_sender<F>(&mut self, sender: F)
    where
        F: FnMut(SurfaceId, u32, u32) + 'static,
    {
        self.configure_sender = Some(Box::new(sender));
    }

    /// Ask the client for a new size. Returns false when nobody listens.
    pub fn send_configure(&mut self, width: u32, height: u32) -> bool {
        match self.configure_sender.as_mut() {
            Some(sender) => {
                sender(self.surface, width, height);
                true
            }
            None => false,
        }
    }
}
