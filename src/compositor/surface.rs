use super::{ClientId, SurfaceId};

/// Who handles a surface's commits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigureHook {
    /// No role assigned yet
    #[default]
    Unassigned,
    /// Commits are dispatched to the shell's surface state machine
    ShellSurface,
    /// Some other component (panel, background, cursor...) owns the surface
    Foreign(String),
}

/// A client content buffer as the compositor tracks it.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    client: Option<ClientId>,
    hook: ConfigureHook,
    mapped: bool,
    size: (u32, u32),
}

impl Surface {
    pub(crate) fn new(id: SurfaceId, client: Option<ClientId>) -> Self {
        Self {
            id,
            client,
            hook: ConfigureHook::Unassigned,
            mapped: false,
            size: (0, 0),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Owning client; `None` for surfaces created by the compositor itself.
    pub fn client(&self) -> Option<ClientId> {
        self.client
    }

    pub fn configure_hook(&self) -> &ConfigureHook {
        &self.hook
    }

    pub fn set_configure_hook(&mut self, hook: ConfigureHook) {
        self.hook = hook;
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub(crate) fn set_mapped(&mut self, mapped: bool) {
        self.mapped = mapped;
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}
