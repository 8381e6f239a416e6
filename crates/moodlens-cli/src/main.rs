use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod poller;
mod render;
mod state;
mod theme;

use config::Config;
use moodlens_hw::Camera;
use state::StateHandle;

#[derive(Parser)]
#[command(name = "moodlens", about = "Webcam mood mirror — re-skins its output to match your face")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live detection loop and renderer
    Run,
    /// One-shot camera diagnostics
    Probe {
        /// Write the captured frame to this PNG path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List capture-capable video devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run().await,
        Commands::Probe { out } => probe(out),
        Commands::Devices => {
            devices();
            Ok(())
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env();
    let (state, mut rx) = StateHandle::new();

    let handle = match poller::start(&config, state.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            // The terminal status is already published; show it and bow out.
            render::draw(&state.snapshot());
            return Err(e.into());
        }
    };

    render::draw(&state.snapshot());

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                render::draw(&snapshot);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}

fn probe(out: Option<PathBuf>) -> Result<()> {
    let config = Config::from_env();
    let camera = Camera::open(&config.camera_device)?;
    camera.warm_up(config.warmup_frames);
    let frame = camera.capture_frame()?;

    let report = serde_json::json!({
        "device": config.camera_device,
        "width": frame.width,
        "height": frame.height,
        "fourcc": format!("{:?}", camera.fourcc),
        "avg_brightness": frame.avg_brightness(),
        "dark": frame.is_dark(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = out {
        let image = image::GrayImage::from_raw(frame.width, frame.height, frame.data)
            .ok_or_else(|| anyhow::anyhow!("frame buffer does not match dimensions"))?;
        image.save(&path)?;
        println!("frame written to {}", path.display());
    }

    Ok(())
}

fn devices() {
    let devices = Camera::list_devices();
    if devices.is_empty() {
        println!("no capture devices found");
        return;
    }
    for device in devices {
        println!("{}  {} ({})", device.path, device.name, device.driver);
    }
}
