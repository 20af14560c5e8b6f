//! Pixcube CLI - Paint raster images into a voxel world
//!
//! Command-line interface for building a block palette from sample
//! images and streaming a picture into a remote world server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::IVec3;
use indicatif::{ProgressBar, ProgressStyle};
use pixcube::{
    render::DEFAULT_ROW_DELAY, Axis, FrameRenderer, Orientation, PaletteIndex, Quantized,
    SampleSet, WorldClient, DEFAULT_SERVER_URL,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Parse an axis name (x, z or y)
fn parse_axis(s: &str) -> Result<Axis, String> {
    s.parse()
}

/// Parse an anchor position string (e.g., "10,64,-5")
fn parse_anchor(s: &str) -> Result<IVec3, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("anchor must be in format 'X,Y,Z' (e.g., '10,64,-5')".to_string());
    }

    let x: i32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| format!("invalid x value: {}", parts[0]))?;
    let y: i32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("invalid y value: {}", parts[1]))?;
    let z: i32 = parts[2]
        .trim()
        .parse()
        .map_err(|_| format!("invalid z value: {}", parts[2]))?;

    Ok(IVec3::new(x, y, z))
}

#[derive(Parser)]
#[command(name = "pixcube")]
#[command(
    author,
    version,
    about = "Paint raster images into a voxel world as blocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an image into the world, block by block
    Paint {
        /// Image file to render (any decodable raster format with alpha)
        image: PathBuf,

        /// Folder of sample images named <id>-<variant>.png
        #[arg(short, long)]
        samples: PathBuf,

        /// Render axis: x or z lay the image flat, y builds a wall
        #[arg(long, default_value = "x", value_parser = parse_axis)]
        axis: Axis,

        /// Mirror the image left-to-right
        #[arg(long)]
        mirror: bool,

        /// Flip the image top-to-bottom before rendering
        #[arg(long)]
        flip_vertical: bool,

        /// Flip the image left-to-right before rendering
        #[arg(long)]
        flip_horizontal: bool,

        /// World server URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// Anchor position "X,Y,Z"; defaults to the player's position
        #[arg(long, value_parser = parse_anchor)]
        anchor: Option<IVec3>,

        /// Pause after each row, in milliseconds
        #[arg(long, default_value_t = DEFAULT_ROW_DELAY.as_millis() as u64)]
        row_delay_ms: u64,
    },

    /// Check world server health
    Health {
        /// World server URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },

    /// Load a sample folder and print the resulting palette
    Palette {
        /// Folder of sample images named <id>-<variant>.png
        samples: PathBuf,
    },
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    progress
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Paint {
            image,
            samples,
            axis,
            mirror,
            flip_vertical,
            flip_horizontal,
            server,
            anchor,
            row_delay_ms,
        } => {
            paint(
                image,
                samples,
                axis,
                Orientation {
                    mirror,
                    flip_vertical,
                    flip_horizontal,
                },
                server,
                anchor,
                Duration::from_millis(row_delay_ms),
            )
            .await?;
        }

        Commands::Health { server } => {
            let client = WorldClient::new(&server);

            println!("Checking server at {}...", server);
            println!();

            match client.health_check().await {
                Ok(status) => {
                    println!("Status:      {}", status.status);
                    if let Some(world) = &status.world {
                        println!("World:       {}", world);
                    }
                    if let Some(players) = status.players {
                        println!("Players:     {}", players);
                    }
                    if let Some(error) = &status.error {
                        println!("Error:       {}", error);
                    }

                    if !status.is_ready() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Failed to connect: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Palette { samples } => {
            let set = SampleSet::load_dir(&samples)
                .with_context(|| format!("failed to read sample folder {}", samples.display()))?;

            println!("Loaded {} samples from {}", set.len(), samples.display());
            println!();
            println!("Bucket (r,g,b)  Block");
            for (color, block) in set.entries() {
                println!(
                    "  ({}, {}, {})      {}-{}",
                    color.r, color.g, color.b, block.id, block.variant
                );
            }

            // Building the index surfaces the empty-palette error here
            // instead of at paint time
            let index = PaletteIndex::build(&set).with_context(|| {
                format!("cannot build palette from {}", samples.display())
            })?;
            println!();
            println!("Palette index covers {} buckets", index.len());
        }
    }

    Ok(())
}

async fn paint(
    image_path: PathBuf,
    samples: PathBuf,
    axis: Axis,
    orientation: Orientation,
    server: String,
    anchor: Option<IVec3>,
    row_delay: Duration,
) -> Result<()> {
    // Build the palette before touching the network; an empty sample
    // folder must fail here, not mid-render
    let set = SampleSet::load_dir(&samples)
        .with_context(|| format!("failed to read sample folder {}", samples.display()))?;
    let palette = PaletteIndex::build(&set)
        .with_context(|| format!("no usable samples in {}", samples.display()))?;

    let frame = image::open(&image_path)
        .with_context(|| format!("failed to decode image {}", image_path.display()))?
        .to_rgba8();

    let client = WorldClient::new(&server);

    let progress = spinner();
    progress.set_message("Checking server status...");
    progress.enable_steady_tick(Duration::from_millis(100));

    match client.health_check().await {
        Ok(status) => {
            if !status.is_ready() {
                progress.finish_with_message(format!(
                    "Server not ready: {}",
                    status.error.unwrap_or_else(|| status.status.clone())
                ));
                std::process::exit(1);
            }
        }
        Err(e) => {
            progress.finish_with_message(format!("Failed to connect to server: {}", e));
            std::process::exit(1);
        }
    }

    // Anchor at the explicit position, or wherever the player stands
    let anchor = match anchor {
        Some(anchor) => anchor,
        None => {
            progress.set_message("Reading player position...");
            client
                .player_position()
                .await
                .context("failed to read player position")?
        }
    };

    let renderer = FrameRenderer::new(frame, &palette, axis, anchor, orientation);
    let (width, height) = (renderer.width(), renderer.height());

    // Ctrl-C stops the render at the next row boundary
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    progress.set_message(format!(
        "Painting {}x{} pixels ({} rows) at {}...",
        width, height, height, anchor
    ));

    let placed = match renderer.paint(&client, row_delay, &cancel).await {
        Ok(placed) => placed,
        Err(e) => {
            progress.finish_with_message(format!("Render failed: {}", e));
            std::process::exit(1);
        }
    };

    progress.finish_with_message(format!("Placed {} blocks", placed));

    // Quantized black is a common reference point, print what it maps to
    let black = palette.lookup(Quantized::new(0, 0, 0));

    println!();
    println!("Statistics:");
    println!("  Image:       {}x{} pixels", width, height);
    println!("  Samples:     {} buckets", set.len());
    println!("  Axis:        {:?}", axis);
    println!("  Anchor:      {}", anchor);
    println!("  Placed:      {} blocks", placed);
    println!("  Black maps:  {}-{}", black.id, black.variant);

    Ok(())
}
