//! Session actions delegated to an external session manager
//!
//! The shell itself only announces that it is quitting; logging out,
//! powering off and rebooting are carried out by whatever implements
//! [`SessionManager`]. With the `logind` feature that is systemd-logind over
//! the system D-Bus.

use anyhow::Result;
use log::info;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionAction {
    LogOut,
    PowerOff,
    Reboot,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionAction::LogOut => "log out",
            SessionAction::PowerOff => "power off",
            SessionAction::Reboot => "reboot",
        };
        f.write_str(name)
    }
}

pub trait SessionManager {
    fn request(&mut self, action: SessionAction) -> Result<()>;
}

/// Session manager that only logs what it was asked to do.
#[derive(Debug, Default)]
pub struct LoggingSession {
    requested: Vec<SessionAction>,
}

impl LoggingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> &[SessionAction] {
        &self.requested
    }
}

impl SessionManager for LoggingSession {
    fn request(&mut self, action: SessionAction) -> Result<()> {
        info!("Session {} requested (no session manager attached)", action);
        self.requested.push(action);
        Ok(())
    }
}

#[cfg(feature = "logind")]
pub use logind::LogindSession;

#[cfg(feature = "logind")]
mod logind {
    use anyhow::{Context, Result};
    use dbus::blocking::Connection;
    use log::{debug, info};
    use std::time::Duration;

    use super::{SessionAction, SessionManager};

    const LOGIND_DEST: &str = "org.freedesktop.login1";
    const LOGIND_PATH: &str = "/org/freedesktop/login1";
    const LOGIND_MANAGER: &str = "org.freedesktop.login1.Manager";
    const CALL_TIMEOUT: Duration = Duration::from_millis(5000);

    /// Delegates power actions to systemd-logind.
    pub struct LogindSession {
        connection: Connection,
    }

    impl LogindSession {
        pub fn connect() -> Result<Self> {
            let connection =
                Connection::new_system().context("Failed to connect to the system bus")?;
            info!("🔌 Connected to logind on the system bus");
            Ok(Self { connection })
        }
    }

    impl SessionManager for LogindSession {
        fn request(&mut self, action: SessionAction) -> Result<()> {
            let method = match action {
                // Quitting the shell ends the session
                SessionAction::LogOut => {
                    debug!("Log out needs no logind call");
                    return Ok(());
                }
                SessionAction::PowerOff => "PowerOff",
                SessionAction::Reboot => "Reboot",
            };

            let proxy = self
                .connection
                .with_proxy(LOGIND_DEST, LOGIND_PATH, CALL_TIMEOUT);
            let (): () = proxy
                .method_call(LOGIND_MANAGER, method, (true,))
                .with_context(|| format!("logind {} call failed", method))?;
            info!("logind accepted {}", action);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_session_records_requests() {
        let mut session = LoggingSession::new();
        session.request(SessionAction::Reboot).unwrap();
        session.request(SessionAction::LogOut).unwrap();
        assert_eq!(
            session.requested(),
            &[SessionAction::Reboot, SessionAction::LogOut]
        );
    }

    #[test]
    fn test_action_display() {
        assert_eq!(SessionAction::PowerOff.to_string(), "power off");
    }
}
