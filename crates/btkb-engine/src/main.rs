//! `btkb` – headless driver for the Bluetooth keyboard engine.
//!
//! Wires the engine to a [`LoggingTransport`] (reports go to the log, connect
//! requests succeed immediately) and replays an input script that stands in
//! for the touch screen and the physical keyboard.
//!
//! # Usage
//!
//! ```text
//! btkb [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Session config file [default: btkb.toml]
//!   --script <PATH>   Input script; reads stdin when omitted
//!   --init-config     Write the effective config to --config and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()                 -- session, timing, latch, bonded devices
//!  └─ KeyboardEngine::new()
//!       ├─ LoggingTransport         (HidTransport)
//!       ├─ StaticDirectory          (DeviceDirectory)
//!       └─ ReportKeySender          (KeySender, encodes 8-byte reports)
//!  └─ profile event pump            (Tokio task)
//!  └─ ScriptRunner::run()           -- until the script ends or Ctrl-C
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use btkb_core::ControlLayout;
use btkb_engine::application::connection_guard::{BondedDevice, HidTransport};
use btkb_engine::application::dispatch::SilentFeedback;
use btkb_engine::infrastructure::hid_sender::ReportKeySender;
use btkb_engine::infrastructure::input_source::{Script, ScriptRunner};
use btkb_engine::infrastructure::storage::{load_config, save_config};
use btkb_engine::infrastructure::transport::{LoggingTransport, StaticDirectory};
use btkb_engine::{EnginePorts, KeyboardEngine};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless Bluetooth HID keyboard engine.
#[derive(Debug, Parser)]
#[command(name = "btkb", about = "Replays keyboard input through the HID report engine", version)]
struct Cli {
    /// Session configuration file. Defaults apply when it does not exist.
    #[arg(long, default_value = "btkb.toml", env = "BTKB_CONFIG")]
    config: PathBuf,

    /// Input script to replay. Read from stdin when omitted.
    #[arg(long, env = "BTKB_SCRIPT")]
    script: Option<PathBuf>,

    /// Write the effective configuration (defaults filled in) back to
    /// `--config` and exit.
    #[arg(long)]
    init_config: bool,
}

async fn read_script(path: Option<&PathBuf>) -> anyhow::Result<Script> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read script from stdin")?;
            text
        }
    };
    Ok(text.parse::<Script>()?)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.session.log_level)),
        )
        .init();

    info!(
        target_device = %config.session.target_device_name,
        profile = %config.session.screen_profile,
        latch = ?config.latch.policy,
        "btkb starting"
    );

    if cli.init_config {
        save_config(&cli.config, &config)
            .with_context(|| format!("failed to write config {}", cli.config.display()))?;
        info!(path = %cli.config.display(), "config written");
        return Ok(());
    }

    let script = read_script(cli.script.as_ref()).await?;

    // ── Engine wiring ─────────────────────────────────────────────────────────
    let transport = Arc::new(LoggingTransport::new());
    let ports = EnginePorts {
        transport: Arc::clone(&transport) as Arc<dyn HidTransport>,
        directory: Arc::new(StaticDirectory::new(config.bonded_devices.clone())),
        sender: Arc::new(ReportKeySender::new(Arc::clone(&transport) as Arc<dyn HidTransport>)),
        feedback: Arc::new(SilentFeedback),
    };
    let layout = ControlLayout::for_profile(config.session.screen_profile);
    let engine = Arc::new(KeyboardEngine::new(config.engine_config(), layout, ports));

    if let Err(e) = engine.register() {
        warn!("initial registration failed: {e}");
    }

    // ── Profile event pump ────────────────────────────────────────────────────
    let pump_engine = Arc::clone(&engine);
    let pump = tokio::spawn(async move {
        if let Err(e) = pump_engine.run_profile_pump().await {
            warn!("profile pump stopped: {e}");
        }
    });

    // The host a `connect` line pretends connected: the configured target,
    // with its bonded address when known.
    let host = config
        .bonded_devices
        .iter()
        .find(|d| d.name == config.session.target_device_name)
        .cloned()
        .unwrap_or_else(|| BondedDevice {
            name: config.session.target_device_name.clone(),
            address: String::new(),
        });

    // ── Run until the script ends or Ctrl-C ───────────────────────────────────
    let runner = ScriptRunner::new(&engine, &transport, host);
    tokio::select! {
        result = runner.run(&script) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutdown signal received"),
    }

    // Let queued profile events reach the log before exiting.
    tokio::task::yield_now().await;
    pump.abort();
    info!(
        reports = transport.reports_sent(),
        registered = transport.is_registered(),
        "btkb stopped"
    );
    Ok(())
}
