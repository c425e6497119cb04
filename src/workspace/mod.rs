//! Workspaces and their per-output stacking layers
//!
//! A workspace is an ordered collection of shell surfaces. For every output
//! it keeps a [`WorkspaceView`]: whether the workspace is the one currently
//! shown there, and the stacking [`Layer`] holding the surfaces' views for
//! that output.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::compositor::{OutputId, SurfaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workspace-{}", self.0)
    }
}

/// Stacking order of views, bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    views: Vec<SurfaceId>,
}

impl Layer {
    pub fn add_on_top(&mut self, surface: SurfaceId) {
        self.remove(surface);
        self.views.push(surface);
    }

    pub fn remove(&mut self, surface: SurfaceId) -> bool {
        let before = self.views.len();
        self.views.retain(|&s| s != surface);
        before != self.views.len()
    }

    /// Move an existing view to the top. Returns false if it is not here.
    pub fn raise_on_top(&mut self, surface: SurfaceId) -> bool {
        if !self.remove(surface) {
            return false;
        }
        self.views.push(surface);
        true
    }

    /// Move an existing view to the bottom.
    pub fn lower(&mut self, surface: SurfaceId) -> bool {
        if !self.remove(surface) {
            return false;
        }
        self.views.insert(0, surface);
        true
    }

    pub fn top_view(&self) -> Option<SurfaceId> {
        self.views.last().copied()
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.views.contains(&surface)
    }

    /// Views from top to bottom, the order used for picking.
    pub fn top_down(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.views.iter().rev().copied()
    }

    pub fn views(&self) -> &[SurfaceId] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// A workspace as seen from one output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceView {
    attached: bool,
    layer: Layer,
}

impl WorkspaceView {
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: WorkspaceId,
    surfaces: Vec<SurfaceId>,
    views: BTreeMap<OutputId, WorkspaceView>,
}

impl Workspace {
    pub fn new(id: WorkspaceId) -> Self {
        Self {
            id,
            surfaces: Vec::new(),
            views: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    pub fn view_for_output(&self, output: OutputId) -> Option<&WorkspaceView> {
        self.views.get(&output)
    }

    fn view_entry(&mut self, output: OutputId) -> &mut WorkspaceView {
        self.views.entry(output).or_default()
    }

    /// Whether this workspace is the one shown on the output.
    pub fn is_attached(&self, output: OutputId) -> bool {
        self.views.get(&output).map_or(false, WorkspaceView::is_attached)
    }

    pub fn attached_outputs(&self) -> Vec<OutputId> {
        self.views
            .iter()
            .filter(|(_, v)| v.attached)
            .map(|(&o, _)| o)
            .collect()
    }

    pub(crate) fn attach(&mut self, output: OutputId) {
        debug!("{} attached to {}", self.id, output);
        self.view_entry(output).attached = true;
    }

    pub(crate) fn detach(&mut self, output: OutputId) {
        if let Some(view) = self.views.get_mut(&output) {
            debug!("{} detached from {}", self.id, output);
            view.attached = false;
        }
    }

    pub fn layer(&self, output: OutputId) -> Option<&Layer> {
        self.views.get(&output).map(WorkspaceView::layer)
    }

    pub(crate) fn layer_mut(&mut self, output: OutputId) -> &mut Layer {
        &mut self.view_entry(output).layer
    }

    /// Topmost view on the output, if any.
    pub fn top_view(&self, output: OutputId) -> Option<SurfaceId> {
        self.layer(output).and_then(Layer::top_view)
    }

    pub(crate) fn add_surface(&mut self, surface: SurfaceId) {
        if !self.surfaces.contains(&surface) {
            self.surfaces.push(surface);
        }
    }

    /// Drop a surface from the collection and from every output's layer.
    pub(crate) fn remove_surface(&mut self, surface: SurfaceId) -> bool {
        for view in self.views.values_mut() {
            view.layer.remove(surface);
        }
        let before = self.surfaces.len();
        self.surfaces.retain(|&s| s != surface);
        before != self.surfaces.len()
    }
}
