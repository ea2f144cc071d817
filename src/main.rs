//! xwinbridge - X11 events in, legacy window messages out
//!
//! Opens a window on an X display and prints the window-message stream the
//! bridge produces for it: keyboard and pointer input, focus, geometry
//! notifications and close requests. Useful for checking key translation
//! and coordinate handling against a real server.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use xwinbridge_core::config::Config;
use xwinbridge_core::{Core, Geometry, Hwnd, WindowRecord};
use xwinbridge_x11::X11Connection;

mod host;

use host::TraceHost;

const DESKTOP: Hwnd = Hwnd(1);
const MAIN_WINDOW: Hwnd = Hwnd(2);

/// xwinbridge - translate X11 events into window messages
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Run in debug mode with verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Print default configuration to stdout
    #[arg(long)]
    print_default_config: bool,

    /// X display to connect to (overrides the configuration)
    #[arg(long)]
    display: Option<String>,

    /// Print messages as JSON lines
    #[arg(long)]
    json: bool,

    /// Heartbeat timer period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Window size as WIDTHxHEIGHT
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    size: (u32, u32),
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid dimension '{part}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("xwinbridge v{} starting...", env!("CARGO_PKG_VERSION"));

    if args.print_default_config {
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        },
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        },
    };
    if args.display.is_some() {
        config.general.display = args.display.clone();
    }

    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let connection = X11Connection::connect(&config)?;
    let screen = connection.screen();
    let root = connection.root();
    let (width, height) = args.size;
    let geometry = Geometry::new(0, 0, width, height);
    let managed = config.general.managed;
    let window = connection.create_window(geometry, managed)?;

    let host = TraceHost::new(args.json, args.tick_ms.map(Duration::from_millis));
    let mut core = Core::new(connection, host, config);
    core.register_desktop(WindowRecord::new(DESKTOP, root, screen), true);
    core.register_window(WindowRecord::new(MAIN_WINDOW, window, geometry).managed(managed));
    core.synchronize();

    info!("Watching window {} ({}x{}), close it to exit", window, width, height);
    while !core.host().close_requested() {
        core.wait_event(true);
    }

    info!("xwinbridge shutdown complete");
    Ok(())
}
