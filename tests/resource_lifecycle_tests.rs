//! Lifecycle tests for grabs and client-bound resources
//!
//! Covers how seat grabs start and end (including the kill and popup modes
//! driven through bindings and clicks) and how trusted-client registrations
//! follow the lifetime of their client.

use anyhow::Result;
use std::cell::Cell;
use std::rc::Rc;

use orbit::backend::{BackendRequest, HeadlessBackend, RequestLog};
use orbit::binding::Modifiers;
use orbit::compositor::seat::codes;
use orbit::compositor::{ButtonState, KeyState, PointerButton, SeatId, SurfaceId};
use orbit::geometry::{Point, Rectangle};
use orbit::grab::{CursorShape, Grab, GrabKind, GrabStatus};
use orbit::session::LoggingSession;
use orbit::shell_surface::SurfaceType;
use orbit::{Shell, ShellError, ShellSettings};

struct Desktop {
    shell: Shell,
    log: RequestLog,
    seat: SeatId,
}

impl Desktop {
    fn new(settings: ShellSettings) -> Self {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut shell = Shell::new(
            settings,
            Box::new(backend),
            Box::new(LoggingSession::new()),
        );
        shell.add_output(
            "HEADLESS-1",
            Rectangle::new(0, 0, 1920, 1080),
            Rectangle::new(0, 32, 1920, 1048),
        );
        let seat = shell.add_seat("seat0");
        Self { shell, log, seat }
    }

    /// Map a toplevel owned by a fresh client with the given pid.
    fn window(&mut self, pid: u32) -> Result<SurfaceId> {
        let client = self.shell.connect_client(pid);
        let surface = self.shell.create_surface(Some(client))?;
        self.shell.create_shell_surface(surface)?;
        self.shell.set_toplevel(surface)?;
        self.shell.commit_surface(surface, 400, 300)?;
        Ok(surface)
    }

    fn point(&mut self, x: f64, y: f64) -> Result<()> {
        self.shell.handle_pointer_motion(self.seat, 0, Point::new(x, y))?;
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        let seat = self.seat;
        self.shell
            .handle_pointer_button(seat, 0, PointerButton::Left, ButtonState::Pressed)?;
        self.shell
            .handle_pointer_button(seat, 0, PointerButton::Left, ButtonState::Released)?;
        Ok(())
    }

    fn press_escape(&mut self, modifiers: Modifiers) -> Result<()> {
        let seat = self.seat;
        self.shell.set_modifiers(seat, modifiers)?;
        self.shell
            .handle_key(seat, 0, codes::KEY_ESC, KeyState::Pressed)?;
        self.shell
            .handle_key(seat, 0, codes::KEY_ESC, KeyState::Released)?;
        Ok(())
    }

    fn terminations(&self) -> Vec<u32> {
        self.log
            .snapshot()
            .into_iter()
            .filter_map(|r| match r {
                BackendRequest::TerminateClient { pid } => Some(pid),
                _ => None,
            })
            .collect()
    }
}

/// Counts calls into a grab implemented outside the crate.
#[derive(Debug)]
struct CountingGrab {
    events: Rc<Cell<usize>>,
    ended: Rc<Cell<usize>>,
}

impl Grab for CountingGrab {
    fn kind(&self) -> GrabKind {
        GrabKind::Move
    }

    fn motion(&mut self, _shell: &mut Shell, _seat: SeatId, _time: u32, _position: Point) -> GrabStatus {
        self.events.set(self.events.get() + 1);
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
        self.events.set(self.events.get() + 1);
        GrabStatus::Continue
    }

    fn ended(self: Box<Self>, _shell: &mut Shell, _seat: SeatId) {
        self.ended.set(self.ended.get() + 1);
    }
}

#[test]
fn test_grab_receives_all_seat_input() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    desktop.window(4242)?;
    let events = Rc::new(Cell::new(0));
    let ended = Rc::new(Cell::new(0));
    let seat = desktop.seat;
    desktop.shell.start_grab(
        seat,
        Box::new(CountingGrab {
            events: events.clone(),
            ended: ended.clone(),
        }),
        Some(CursorShape::Busy),
    )?;
    desktop.log.clear();

    desktop.point(100.0, 100.0)?;
    desktop.click()?;
    assert_eq!(events.get(), 3);
    // Neither the focus nor the click-to-focus binding saw anything
    assert!(desktop.log.is_empty());

    assert!(desktop.shell.end_grab(seat));
    assert!(!desktop.shell.end_grab(seat));
    assert_eq!(ended.get(), 1);

    desktop.point(110.0, 100.0)?;
    assert_eq!(events.get(), 3);
    assert_eq!(
        desktop
            .log
            .count(|r| matches!(r, BackendRequest::PointerMotion { .. })),
        1
    );
    Ok(())
}

#[test]
fn test_kill_signals_clicked_client() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    desktop.window(4242)?;
    let bindings = desktop.shell.compositor().bindings().len();

    desktop.point(50.0, 50.0)?;
    desktop.press_escape(Modifiers::SUPER | Modifiers::CTRL)?;
    assert_eq!(
        desktop.shell.active_grab_kind(desktop.seat),
        Some(GrabKind::Kill)
    );
    assert_eq!(desktop.shell.compositor().bindings().len(), bindings + 1);

    desktop.shell.set_modifiers(desktop.seat, Modifiers::empty())?;
    desktop.click()?;

    assert_eq!(desktop.terminations(), vec![4242]);
    assert!(!desktop.shell.is_grab_active(desktop.seat));
    assert_eq!(desktop.shell.compositor().bindings().len(), bindings);
    Ok(())
}

#[test]
fn test_kill_never_signals_the_shell_itself() -> Result<()> {
    let settings = ShellSettings {
        pid: 777,
        ..ShellSettings::default()
    };
    let mut desktop = Desktop::new(settings);
    let surface = desktop.window(777)?;

    desktop.point(50.0, 50.0)?;
    desktop.shell.kill_surface(desktop.seat)?;
    desktop.click()?;

    assert!(desktop.terminations().is_empty());
    assert!(!desktop.shell.is_grab_active(desktop.seat));
    assert!(desktop.shell.compositor().surface(surface).is_some());
    Ok(())
}

#[test]
fn test_kill_on_empty_space_just_ends() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    desktop.window(4242)?;

    desktop.shell.kill_surface(desktop.seat)?;
    desktop.point(1500.0, 900.0)?;
    desktop.click()?;

    assert!(desktop.terminations().is_empty());
    assert!(!desktop.shell.is_grab_active(desktop.seat));
    Ok(())
}

#[test]
fn test_escape_aborts_kill() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    desktop.window(4242)?;
    let bindings = desktop.shell.compositor().bindings().len();

    desktop.shell.kill_surface(desktop.seat)?;
    assert_eq!(
        desktop.log.count(|r| *r
            == BackendRequest::SetGrabCursor {
                seat: desktop.seat,
                cursor: CursorShape::Kill
            }),
        1
    );

    desktop.press_escape(Modifiers::empty())?;
    assert!(!desktop.shell.is_grab_active(desktop.seat));
    assert_eq!(desktop.shell.compositor().bindings().len(), bindings);
    assert_eq!(
        desktop.log.count(|r| *r
            == BackendRequest::SetGrabCursor {
                seat: desktop.seat,
                cursor: CursorShape::Arrow
            }),
        1
    );

    // A later click is ordinary input again
    desktop.point(50.0, 50.0)?;
    desktop.click()?;
    assert!(desktop.terminations().is_empty());
    Ok(())
}

#[test]
fn test_kill_rejected_while_grabbed() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    let surface = desktop.window(4242)?;
    let bindings = desktop.shell.compositor().bindings().len();

    desktop.shell.move_surface(surface, desktop.seat)?;
    assert_eq!(
        desktop.shell.kill_surface(desktop.seat),
        Err(ShellError::GrabActive(desktop.seat))
    );
    assert_eq!(
        desktop.shell.active_grab_kind(desktop.seat),
        Some(GrabKind::Move)
    );
    assert_eq!(desktop.shell.compositor().bindings().len(), bindings);
    Ok(())
}

#[test]
fn test_removing_seat_cancels_kill() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    let bindings = desktop.shell.compositor().bindings().len();

    desktop.shell.kill_surface(desktop.seat)?;
    desktop.shell.remove_seat(desktop.seat)?;

    assert_eq!(desktop.shell.compositor().bindings().len(), bindings);
    assert!(desktop.terminations().is_empty());
    Ok(())
}

#[test]
fn test_popup_dismissed_by_outside_click() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    let parent = desktop.window(4242)?;
    let client = desktop
        .shell
        .compositor()
        .surface(parent)
        .and_then(|s| s.client())
        .ok_or_else(|| anyhow::anyhow!("parent has no client"))?;

    let popup = desktop.shell.create_surface(Some(client))?;
    desktop.shell.create_shell_surface(popup)?;
    desktop.shell.set_popup(popup, parent, desktop.seat, 10, 10)?;
    desktop.shell.commit_surface(popup, 120, 80)?;
    assert_eq!(
        desktop.shell.active_grab_kind(desktop.seat),
        Some(GrabKind::Popup)
    );

    desktop.point(1500.0, 900.0)?;
    desktop.click()?;

    assert!(!desktop.shell.is_grab_active(desktop.seat));
    assert_eq!(
        desktop
            .log
            .count(|r| *r == BackendRequest::PopupDone { surface: popup }),
        1
    );
    let shsurf = desktop
        .shell
        .shell_surface_for(popup)
        .ok_or_else(|| anyhow::anyhow!("popup lost its shell surface"))?;
    assert_eq!(shsurf.pending_type(), SurfaceType::None);
    Ok(())
}

#[test]
fn test_trusted_client_forgotten_on_disconnect() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    let client = desktop.shell.connect_client(1000);
    let other = desktop.shell.connect_client(1001);

    desktop.shell.add_trusted_client("desktop_shell", client)?;
    desktop.shell.add_trusted_client("desktop_shell", client)?;
    assert!(desktop.shell.is_client_trusted("desktop_shell", client));
    assert!(!desktop.shell.is_client_trusted("screensaver", client));
    assert!(!desktop.shell.is_client_trusted("desktop_shell", other));

    desktop.shell.disconnect_client(client)?;
    assert!(!desktop.shell.is_client_trusted("desktop_shell", client));

    assert_eq!(
        desktop.shell.add_trusted_client("desktop_shell", client),
        Err(ShellError::UnknownClient(client))
    );
    Ok(())
}

#[test]
fn test_disconnect_removes_client_windows() -> Result<()> {
    let mut desktop = Desktop::new(ShellSettings::default());
    let surface = desktop.window(4242)?;
    let client = desktop
        .shell
        .compositor()
        .surface(surface)
        .and_then(|s| s.client())
        .ok_or_else(|| anyhow::anyhow!("window has no client"))?;

    desktop.shell.disconnect_client(client)?;
    assert!(desktop.shell.compositor().surface(surface).is_none());
    assert!(desktop.shell.shell_surface_for(surface).is_none());
    assert_eq!(
        desktop.shell.compositor().seat(desktop.seat).and_then(|s| s.active_surface()),
        None
    );
    Ok(())
}
