//! # Orbit - desktop shell core
//!
//! Runs the window-management core against a headless compositor model built
//! from the configuration, until Ctrl-C or until the shell asks to quit.

use anyhow::{Context, Result};
use calloop::channel::{self, Channel, Event};
use calloop::{EventLoop, LoopSignal};
use clap::Parser;
use log::{debug, error, info, warn};
use std::time::Duration;

use orbit::backend::{HeadlessBackend, RequestLog};
use orbit::session::SessionManager;
use orbit::shell::ShellEvent;
use orbit::{OrbitConfig, Shell};

#[derive(Parser, Debug)]
#[command(name = "orbit")]
#[command(about = "Window and surface management core for a desktop shell")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/orbit/orbit.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Focus windows on click without raising them
    #[arg(long)]
    separate_raise: bool,

    /// Number of workspaces to create at start
    #[arg(long)]
    workspaces: Option<u32>,
}

/// Messages into the event loop from outside it
#[derive(Debug)]
enum Control {
    Quit,
}

struct Orbit {
    shell: Shell,
    requests: RequestLog,
    signal: LoopSignal,
}

impl Orbit {
    /// Forward shell notifications and stop on `Quit`.
    fn flush(&mut self) {
        for event in self.shell.take_events() {
            match event.to_json() {
                Ok(json) => debug!("→ {}", json),
                Err(e) => warn!("Failed to encode {:?}: {}", event, e),
            }
            if event == ShellEvent::Quit {
                info!("Shell requested quit");
                self.signal.stop();
            }
        }
        for request in self.requests.drain() {
            if let Ok(json) = serde_json::to_string(&request) {
                debug!("⇢ {}", json);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so `general.debug` can raise the level
    let loaded = OrbitConfig::load(&cli.config);
    let debug = cli.debug || loaded.as_ref().map_or(false, |c| c.general.debug);

    // Initialize logging
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting Orbit shell core");
    info!("📄 Version: {}", orbit::VERSION);
    if let Some(commit) = option_env!("GIT_COMMIT") {
        debug!("Built {} from {}", env!("BUILD_DATE"), commit);
    }

    let mut config = match loaded {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            OrbitConfig::default()
        }
    };
    apply_cli_overrides(&cli, &mut config);

    let backend = if config.shell.kill_clients {
        HeadlessBackend::signalling()
    } else {
        HeadlessBackend::new()
    };
    let requests = backend.log();
    let shell = Shell::from_config(&config, Box::new(backend), session_manager())
        .context("Failed to start the shell")?;

    let mut event_loop: EventLoop<Orbit> =
        EventLoop::try_new().context("Failed to create event loop")?;
    let (quit_tx, quit_rx): (channel::Sender<Control>, Channel<Control>) = channel::channel();
    event_loop
        .handle()
        .insert_source(quit_rx, |event, _, state: &mut Orbit| {
            if let Event::Msg(Control::Quit) = event {
                info!("🛑 Interrupted");
                state.signal.stop();
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to register quit channel: {}", e.error))?;

    ctrlc::set_handler(move || {
        let _ = quit_tx.send(Control::Quit);
    })
    .context("Failed to install Ctrl-C handler")?;

    let mut state = Orbit {
        shell,
        requests,
        signal: event_loop.get_signal(),
    };
    state.flush();
    info!(
        "🪐 Running with {} output(s), {} seat(s)",
        state.shell.compositor().outputs().len(),
        state.shell.compositor().seats().len()
    );

    event_loop
        .run(Duration::from_millis(250), &mut state, Orbit::flush)
        .context("Event loop failed")?;

    info!("👋 Orbit stopped");
    Ok(())
}

fn apply_cli_overrides(cli: &Cli, config: &mut OrbitConfig) {
    if cli.separate_raise {
        config.shell.separate_raise = true;
        info!("Raise-on-click disabled via CLI flag");
    }
    if let Some(workspaces) = cli.workspaces {
        config.shell.workspaces = workspaces;
    }
}

#[cfg(feature = "logind")]
fn session_manager() -> Box<dyn SessionManager> {
    match orbit::session::LogindSession::connect() {
        Ok(session) => Box::new(session),
        Err(e) => {
            warn!("logind unavailable ({:#}), session actions will only be logged", e);
            Box::new(orbit::session::LoggingSession::new())
        }
    }
}

#[cfg(not(feature = "logind"))]
fn session_manager() -> Box<dyn SessionManager> {
    Box::new(orbit::session::LoggingSession::new())
}
