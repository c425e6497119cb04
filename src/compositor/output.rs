use super::OutputId;
use crate::geometry::Rectangle;
use crate::workspace::WorkspaceId;

/// A display region.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    id: OutputId,
    name: String,
    geometry: Rectangle,

    /// Geometry minus panels and docks
    available_geometry: Rectangle,

    /// Workspace currently shown here
    current_workspace: Option<WorkspaceId>,
}

impl Output {
    pub(crate) fn new(
        id: OutputId,
        name: String,
        geometry: Rectangle,
        available_geometry: Rectangle,
    ) -> Self {
        Self {
            id,
            name,
            geometry,
            available_geometry,
            current_workspace: None,
        }
    }

    pub fn id(&self) -> OutputId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Rectangle {
        self.geometry
    }

    pub fn available_geometry(&self) -> Rectangle {
        self.available_geometry
    }

    pub fn current_workspace(&self) -> Option<WorkspaceId> {
        self.current_workspace
    }

    pub(crate) fn set_current_workspace(&mut self, workspace: Option<WorkspaceId>) {
        self.current_workspace = workspace;
    }
}
