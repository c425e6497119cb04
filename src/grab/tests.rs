//! Unit tests for the grab slot and its dispatch

use super::*;
use crate::backend::{BackendRequest, HeadlessBackend, RequestLog};
use crate::geometry::Rectangle;
use crate::session::LoggingSession;
use crate::shell::ShellSettings;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Counters {
    motions: usize,
    buttons: usize,
    ended: usize,
}

#[derive(Debug, Default)]
struct ProbeGrab {
    counters: Rc<RefCell<Counters>>,
    finish_on_button: bool,
    end_self_on_motion: bool,
}

impl Grab for ProbeGrab {
    fn kind(&self) -> GrabKind {
        GrabKind::Move
    }

    fn motion(&mut self, shell: &mut Shell, seat: SeatId, _time: u32, _position: Point) -> GrabStatus {
        self.counters.borrow_mut().motions += 1;
        if self.end_self_on_motion {
            assert!(shell.end_grab(seat));
        }
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        _shell: &mut Shell,
        _seat: SeatId,
        _time: u32,
        _button: PointerButton,
        _state: ButtonState,
    ) -> GrabStatus {
        self.counters.borrow_mut().buttons += 1;
        if self.finish_on_button {
            GrabStatus::Finished
        } else {
            GrabStatus::Continue
        }
    }

    fn ended(self: Box<Self>, _shell: &mut Shell, _seat: SeatId) {
        self.counters.borrow_mut().ended += 1;
    }
}

fn probe() -> (Box<ProbeGrab>, Rc<RefCell<Counters>>) {
    let counters = Rc::new(RefCell::new(Counters::default()));
    let grab = Box::new(ProbeGrab {
        counters: counters.clone(),
        ..ProbeGrab::default()
    });
    (grab, counters)
}

fn shell() -> (Shell, SeatId, RequestLog) {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut shell = Shell::new(
        ShellSettings::default(),
        Box::new(backend),
        Box::new(LoggingSession::new()),
    );
    let full = Rectangle::new(0, 0, 1920, 1080);
    shell.add_output("HEADLESS-1", full, full);
    let seat = shell.add_seat("seat0");
    log.clear();
    (shell, seat, log)
}

fn motions(log: &RequestLog) -> usize {
    log.count(|r| matches!(r, BackendRequest::PointerMotion { .. }))
}

#[test]
fn test_grab_owns_seat_input_until_ended() {
    let (mut shell, seat, log) = shell();
    let (grab, counters) = probe();
    shell.start_grab(seat, grab, None).unwrap();
    assert!(shell.is_grab_active(seat));

    shell
        .handle_pointer_motion(seat, 1, Point::new(10.0, 10.0))
        .unwrap();
    shell
        .handle_pointer_motion(seat, 2, Point::new(20.0, 10.0))
        .unwrap();
    shell
        .handle_pointer_button(seat, 3, PointerButton::Left, ButtonState::Pressed)
        .unwrap();
    assert_eq!(counters.borrow().motions, 2);
    assert_eq!(counters.borrow().buttons, 1);
    assert_eq!(motions(&log), 0);

    assert!(shell.end_grab(seat));
    assert_eq!(counters.borrow().ended, 1);
    assert!(!shell.is_grab_active(seat));

    shell
        .handle_pointer_motion(seat, 4, Point::new(30.0, 10.0))
        .unwrap();
    assert_eq!(counters.borrow().motions, 2);
    assert_eq!(motions(&log), 1);

    assert!(!shell.end_grab(seat));
    assert_eq!(counters.borrow().ended, 1);
}

#[test]
fn test_second_grab_is_rejected() {
    let (mut shell, seat, _log) = shell();
    let (first, first_counters) = probe();
    let (second, second_counters) = probe();

    shell.start_grab(seat, first, None).unwrap();
    assert_eq!(
        shell.start_grab(seat, second, None),
        Err(ShellError::GrabActive(seat))
    );

    shell
        .handle_pointer_motion(seat, 1, Point::new(1.0, 1.0))
        .unwrap();
    assert_eq!(first_counters.borrow().motions, 1);
    assert_eq!(second_counters.borrow().motions, 0);
    assert_eq!(second_counters.borrow().ended, 0);
}

#[test]
fn test_finished_status_ends_grab() {
    let (mut shell, seat, _log) = shell();
    let counters = Rc::new(RefCell::new(Counters::default()));
    let grab = Box::new(ProbeGrab {
        counters: counters.clone(),
        finish_on_button: true,
        ..ProbeGrab::default()
    });
    shell.start_grab(seat, grab, None).unwrap();

    shell
        .handle_pointer_button(seat, 1, PointerButton::Right, ButtonState::Pressed)
        .unwrap();
    assert_eq!(counters.borrow().ended, 1);
    assert_eq!(shell.active_grab_kind(seat), None);
}

#[test]
fn test_end_from_inside_handler_runs_ended_once() {
    let (mut shell, seat, _log) = shell();
    let counters = Rc::new(RefCell::new(Counters::default()));
    let grab = Box::new(ProbeGrab {
        counters: counters.clone(),
        end_self_on_motion: true,
        ..ProbeGrab::default()
    });
    shell.start_grab(seat, grab, None).unwrap();

    shell
        .handle_pointer_motion(seat, 1, Point::new(5.0, 5.0))
        .unwrap();
    assert_eq!(counters.borrow().ended, 1);
    assert!(!shell.is_grab_active(seat));
}

#[test]
fn test_cursor_is_set_and_reset() {
    let (mut shell, seat, log) = shell();
    let (grab, _counters) = probe();
    shell
        .start_grab(seat, grab, Some(CursorShape::Move))
        .unwrap();
    shell.end_grab(seat);

    assert_eq!(
        log.snapshot(),
        vec![
            BackendRequest::SetGrabCursor {
                seat,
                cursor: CursorShape::Move
            },
            BackendRequest::SetGrabCursor {
                seat,
                cursor: CursorShape::Arrow
            },
        ]
    );
}

#[test]
fn test_grab_without_cursor_leaves_cursor_alone() {
    let (mut shell, seat, log) = shell();
    let (grab, _counters) = probe();
    shell.start_grab(seat, grab, None).unwrap();
    shell.end_grab(seat);
    assert!(log.is_empty());
}

#[test]
fn test_removing_seat_force_ends_grab() {
    let (mut shell, seat, _log) = shell();
    let (grab, counters) = probe();
    shell.start_grab(seat, grab, None).unwrap();

    shell.remove_seat(seat).unwrap();
    assert_eq!(counters.borrow().ended, 1);
    assert!(shell.compositor().seat(seat).is_none());
}

#[test]
fn test_unknown_seat() {
    let (mut shell, _seat, _log) = shell();
    let (grab, _counters) = probe();
    assert_eq!(
        shell.start_grab(SeatId(42), grab, None),
        Err(ShellError::UnknownSeat(SeatId(42)))
    );
    assert!(!shell.end_grab(SeatId(42)));
}
