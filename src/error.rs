//! Typed errors returned by the shell's public operations.
//!
//! Absence conditions (no outputs, no seats, nothing focused) are not errors
//! and never surface here; these variants cover callers handing the shell ids
//! it does not know, or requests the current state cannot honour.

use thiserror::Error;

use crate::compositor::{ClientId, OutputId, SeatId, SurfaceId};
use crate::workspace::WorkspaceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("surface {0} does not exist")]
    UnknownSurface(SurfaceId),

    #[error("surface {0} is not managed by the shell")]
    NotShellSurface(SurfaceId),

    #[error("seat {0} does not exist")]
    UnknownSeat(SeatId),

    #[error("output {0} does not exist")]
    UnknownOutput(OutputId),

    #[error("workspace {0} does not exist")]
    UnknownWorkspace(WorkspaceId),

    #[error("client {0} is not connected")]
    UnknownClient(ClientId),

    #[error("seat {0} already has an active grab")]
    GrabActive(SeatId),

    #[error("surface {0} already has a role")]
    RoleConflict(SurfaceId),
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
