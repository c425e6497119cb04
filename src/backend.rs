//! Outbound requests from the shell to the compositor
//!
//! The shell never touches buffers or protocol objects. Everything it needs
//! the compositor to do (damage, cursor changes, input delivery, popup
//! dismissal, killing a client) goes through the [`Backend`] trait.
//! [`HeadlessBackend`] records every request so the binary and the tests can
//! observe them.

use log::{debug, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::compositor::{ButtonState, KeyState, PointerButton, SeatId, SurfaceId};
use crate::geometry::Point;
use crate::grab::CursorShape;

pub trait Backend {
    /// Schedule a repaint of the surface's views
    fn damage(&mut self, surface: SurfaceId);

    fn set_grab_cursor(&mut self, seat: SeatId, cursor: CursorShape);

    /// Give keyboard focus to the surface and tell its client it is active
    fn activate(&mut self, seat: SeatId, surface: SurfaceId);

    fn pointer_motion(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        position: Point,
    );

    fn pointer_button(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    );

    fn key(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        key: u32,
        state: KeyState,
    );

    /// Tell a popup's client the popup was dismissed
    fn popup_done(&mut self, surface: SurfaceId);

    fn terminate_client(&mut self, pid: u32);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request")]
pub enum BackendRequest {
    Damage {
        surface: SurfaceId,
    },
    SetGrabCursor {
        seat: SeatId,
        cursor: CursorShape,
    },
    Activate {
        seat: SeatId,
        surface: SurfaceId,
    },
    PointerMotion {
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        position: Point,
    },
    PointerButton {
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    },
    Key {
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        key: u32,
        state: KeyState,
    },
    PopupDone {
        surface: SurfaceId,
    },
    TerminateClient {
        pid: u32,
    },
}

/// Shared handle on the requests a [`HeadlessBackend`] has recorded.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Rc<RefCell<Vec<BackendRequest>>>);

impl RequestLog {
    fn push(&self, request: BackendRequest) {
        self.0.borrow_mut().push(request);
    }

    pub fn snapshot(&self) -> Vec<BackendRequest> {
        self.0.borrow().clone()
    }

    pub fn drain(&self) -> Vec<BackendRequest> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Number of recorded requests matching the predicate
    pub fn count(&self, predicate: impl Fn(&BackendRequest) -> bool) -> usize {
        self.0.borrow().iter().filter(|r| predicate(r)).count()
    }
}

/// Backend without a display: records requests, optionally signals clients.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    log: RequestLog,
    signal_clients: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`HeadlessBackend::new`] but `terminate_client` really sends
    /// SIGKILL to the process.
    pub fn signalling() -> Self {
        Self {
            log: RequestLog::default(),
            signal_clients: true,
        }
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Backend for HeadlessBackend {
    fn damage(&mut self, surface: SurfaceId) {
        self.log.push(BackendRequest::Damage { surface });
    }

    fn set_grab_cursor(&mut self, seat: SeatId, cursor: CursorShape) {
        debug!("{} cursor -> {:?}", seat, cursor);
        self.log.push(BackendRequest::SetGrabCursor { seat, cursor });
    }

    fn activate(&mut self, seat: SeatId, surface: SurfaceId) {
        self.log.push(BackendRequest::Activate { seat, surface });
    }

    fn pointer_motion(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        position: Point,
    ) {
        self.log.push(BackendRequest::PointerMotion {
            seat,
            focus,
            time,
            position,
        });
    }

    fn pointer_button(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) {
        self.log.push(BackendRequest::PointerButton {
            seat,
            focus,
            time,
            button,
            state,
        });
    }

    fn key(
        &mut self,
        seat: SeatId,
        focus: Option<SurfaceId>,
        time: u32,
        key: u32,
        state: KeyState,
    ) {
        self.log.push(BackendRequest::Key {
            seat,
            focus,
            time,
            key,
            state,
        });
    }

    fn popup_done(&mut self, surface: SurfaceId) {
        self.log.push(BackendRequest::PopupDone { surface });
    }

    fn terminate_client(&mut self, pid: u32) {
        self.log.push(BackendRequest::TerminateClient { pid });
        if !self.signal_clients {
            return;
        }

        let Some(target) = signal_target(pid) else {
            warn!("Refusing to signal pid {}: not a single process", pid);
            return;
        };

        // SAFETY: kill(2) has no memory-safety preconditions
        let rc = unsafe { libc::kill(target, libc::SIGKILL) };
        if rc != 0 {
            warn!(
                "Failed to kill pid {}: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }
}

/// The kill(2) target for a client pid. Zero and values that wrap negative
/// address process groups, so they have none.
fn signal_target(pid: u32) -> Option<libc::pid_t> {
    libc::pid_t::try_from(pid).ok().filter(|&target| target > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_target_is_a_single_process() {
        assert_eq!(signal_target(4242), Some(4242));
        assert_eq!(signal_target(0), None);
        assert_eq!(signal_target(u32::MAX), None);
        assert_eq!(signal_target(i32::MAX as u32 + 1), None);
    }

    #[test]
    fn test_log_is_shared_with_handles() {
        let mut backend = HeadlessBackend::new();
        let log = backend.log();
        backend.damage(SurfaceId(4));
        backend.popup_done(SurfaceId(5));

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.count(|r| matches!(r, BackendRequest::Damage { .. })),
            1
        );
        let drained = log.drain();
        assert_eq!(drained[1], BackendRequest::PopupDone { surface: SurfaceId(5) });
        assert!(log.is_empty());
    }

    #[test]
    fn test_recording_backend_does_not_signal() {
        let mut backend = HeadlessBackend::new();
        // pid 0 would signal our whole process group if this were live
        backend.terminate_client(0);
        assert_eq!(
            backend.log().snapshot(),
            vec![BackendRequest::TerminateClient { pid: 0 }]
        );
    }

    #[test]
    fn test_requests_serialize_tagged() {
        let json = serde_json::to_string(&BackendRequest::Damage {
            surface: SurfaceId(1),
        })
        .unwrap();
        assert_eq!(json, r#"{"request":"Damage","surface":1}"#);
    }
}
