//! # Orbit desktop shell core
//!
//! Window and surface management for a desktop shell running on top of a
//! compositor: how client surfaces acquire roles, how seats are temporarily
//! grabbed for interactive operations, which output a surface lands on, and
//! which clients may use privileged interfaces.
//!
//! ## Architecture
//!
//! - `compositor`: outputs, seats, surfaces, clients and bindings the shell
//!   runs on
//! - `backend`: requests the shell sends back to the compositor
//! - `shell_surface`: per-surface role state machine with two-phase commit
//! - `grab`: exclusive input capture (move, kill, popup)
//! - `output_selection`: pointer voting for the primary output
//! - `workspace`: workspaces and their per-output stacking layers
//! - `binding`: key/button bindings and their actions
//! - `trusted`: clients trusted with privileged interfaces
//! - `session`: log out / power off / reboot delegation
//! - `shell`: the orchestrator tying it all together
//! - `config`: configuration parsing and management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orbit::backend::HeadlessBackend;
//! use orbit::session::LoggingSession;
//! use orbit::{OrbitConfig, Shell};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = OrbitConfig::default();
//!     let mut shell = Shell::from_config(
//!         &config,
//!         Box::new(HeadlessBackend::new()),
//!         Box::new(LoggingSession::new()),
//!     )?;
//!     let client = shell.connect_client(4242);
//!     let surface = shell.create_surface(Some(client))?;
//!     shell.create_shell_surface(surface)?;
//!     shell.set_toplevel(surface)?;
//!     shell.commit_surface(surface, 640, 480)?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod binding;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grab;
pub mod output_selection;
pub mod session;
pub mod shell;
pub mod shell_surface;
pub mod trusted;
pub mod workspace;

// Re-export main types for easy access
pub use config::OrbitConfig;
pub use error::{Result, ShellError};
pub use shell::{Shell, ShellEvent, ShellSettings};

/// Version information for Orbit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
