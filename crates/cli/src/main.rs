use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hwrelay_core::{init, Config, HardwareMessage, MessageRelay, PresentationSink, RecordingSink};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hwrelay")]
#[command(about = "Relay hardware status messages from BLE callbacks to a single UI sink")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run simulated BLE producers against a terminal UI
    Simulate {
        /// Number of producer threads
        #[arg(short, long, default_value_t = 4)]
        producers: usize,
        /// Messages per producer
        #[arg(short, long, default_value_t = 5)]
        messages: usize,
        /// Dump everything the UI presented as JSON when done
        #[arg(long)]
        record: bool,
    },
    /// Deliver a single message from a background thread
    Send {
        /// The message to show
        message: String,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

/// Presents messages as terminal lines, the CLI's stand-in for a toast
struct TerminalToasts {
    started: Instant,
    record: Option<RecordingSink>,
}

impl TerminalToasts {
    fn new(record: Option<RecordingSink>) -> Self {
        Self {
            started: Instant::now(),
            record,
        }
    }
}

impl PresentationSink for TerminalToasts {
    fn present(&mut self, message: HardwareMessage) {
        let elapsed = self.started.elapsed();
        if message.is_blank() {
            println!("🔔 [{:>6.3}s] (empty message)", elapsed.as_secs_f64());
        } else {
            println!("🔔 [{:>6.3}s] {}", elapsed.as_secs_f64(), message);
        }

        if let Some(record) = &mut self.record {
            record.present(message);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match cli.command {
        Commands::Simulate {
            producers,
            messages,
            record,
        } => simulate(config, producers, messages, record).await,
        Commands::Send { message } => send_message(config, message).await,
        Commands::Config { init: write_default } => {
            show_config(config, &config_path, write_default)
        }
    }
}

/// Status line a simulated peripheral reports at step `step`
fn simulated_status(device: &str, step: usize) -> String {
    match step % 5 {
        0 => format!("Discovered {} [RSSI -{}dBm]", device, 40 + step % 30),
        1 => format!("Connected to {}", device),
        2 => format!("Services ready on {}", device),
        3 => format!("{} battery level {}%", device, 100 - (step * 7) % 100),
        _ => format!("{} disconnected", device),
    }
}

async fn simulate(config: Config, producers: usize, messages: usize, record: bool) -> Result<()> {
    let relay = init(&config)?;
    let recorder = record.then(RecordingSink::new);

    println!("📡 Simulating {} BLE producer(s), {} message(s) each", producers, messages);
    let ui = tokio::spawn(relay.attach(TerminalToasts::new(recorder.clone())).run());

    // Producers reach the relay through the shared instance, like native callbacks would.
    let handles = (0..producers)
        .map(|i| {
            thread::Builder::new()
                .name(format!("ble-{}", i))
                .spawn(move || {
                    let device = format!("Sensor-{:02}", i);
                    for step in 0..messages {
                        MessageRelay::shared().deliver(simulated_status(&device, step));
                    }
                })
                .context("Failed to spawn producer thread")
        })
        .collect::<Result<Vec<_>>>()?;

    tokio::task::spawn_blocking(move || join_producers(handles)).await?;

    relay.detach();
    ui.await?;

    let stats = relay.stats();
    println!();
    println!("{}", relay.debug_info());
    info!(
        "Simulation finished: {} enqueued, {} dropped",
        stats.enqueued,
        stats.dropped()
    );

    if let Some(recorder) = recorder {
        let presented: Vec<String> = recorder.texts();
        println!("{}", serde_json::to_string_pretty(&presented)?);
    }

    Ok(())
}

/// Wait for producer threads, reporting any that panicked. Returns how many did.
fn join_producers(handles: Vec<thread::JoinHandle<()>>) -> usize {
    let mut panicked = 0;
    for handle in handles {
        let name = handle.thread().name().unwrap_or("producer").to_string();
        if handle.join().is_err() {
            warn!("Producer thread {} panicked", name);
            panicked += 1;
        }
    }
    panicked
}

async fn send_message(config: Config, message: String) -> Result<()> {
    let relay = init(&config)?;
    let ui = tokio::spawn(relay.attach(TerminalToasts::new(None)).run());

    tokio::task::spawn_blocking(move || MessageRelay::shared().deliver(message)).await?;

    relay.detach();
    ui.await?;
    Ok(())
}

fn show_config(config: Config, path: &Path, write_default: bool) -> Result<()> {
    if write_default {
        let config = Config::default();
        config.save_to_file(path)?;
        println!("✅ Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
