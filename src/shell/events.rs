//! Notifications for the desktop UI client

use serde::Serialize;

use crate::binding::BindingId;
use crate::compositor::{OutputId, SeatId, SurfaceId};
use crate::session::SessionAction;
use crate::workspace::WorkspaceId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ShellEvent {
    WindowAdded {
        surface: SurfaceId,
        title: String,
    },
    WindowRemoved {
        surface: SurfaceId,
    },
    WindowActivated {
        surface: SurfaceId,
        seat: SeatId,
    },
    WorkspaceAdded {
        workspace: WorkspaceId,
    },
    WorkspaceActivated {
        workspace: WorkspaceId,
        output: OutputId,
    },
    BindingTriggered {
        binding: BindingId,
        seat: SeatId,
    },
    SessionRequested {
        action: SessionAction,
    },
    Quit,
}

impl ShellEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
