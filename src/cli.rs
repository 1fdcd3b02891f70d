// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the photo booth
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Running one capture cycle and exporting the composite
//! - Building a gallery grid collage from image files

use anyhow::{Context, bail};
use clap::Args;
use photobooth::app::{self, BoothEvent, Message, PhotoBooth};
use photobooth::backends::camera::types::{CameraBackendType, DeviceStatus};
use photobooth::backends::camera::{CameraBackend, get_backend_for_type};
use photobooth::backends::virtual_camera::{VirtualCameraBackend, load_image_source};
use photobooth::config::{Config, Facing, ResolutionTier};
use photobooth::gallery::{self, Gallery, GridTemplate};
use photobooth::pipelines::photo::{
    CollageLayout, FilterKind, MessageOverlay, StickerOverlay,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Options of the `shoot` command; unset flags fall back to saved settings
#[derive(Debug, Clone, Default, Args)]
pub struct ShootArgs {
    /// Use the virtual camera instead of the configured backend
    #[arg(long = "virtual")]
    pub use_virtual: bool,

    /// Feed the virtual camera from an image file instead of the test pattern
    #[arg(long, value_name = "IMAGE")]
    pub source: Option<PathBuf>,

    /// Collage layout: single, vertical-2, vertical-3
    #[arg(short, long)]
    pub layout: Option<CollageLayout>,

    /// Filter: none, grayscale, sepia, invert, vintage
    #[arg(short, long)]
    pub filter: Option<FilterKind>,

    /// Photo timer in seconds (0 captures immediately)
    #[arg(short, long)]
    pub timer: Option<u32>,

    /// Resolution tier: standard or hd
    #[arg(short, long)]
    pub resolution: Option<ResolutionTier>,

    /// Camera facing: user or environment
    #[arg(long)]
    pub facing: Option<Facing>,

    /// Show the flash before each shot
    #[arg(long)]
    pub flash: bool,

    /// Sticker image placed at X,Y percent of the composite
    #[arg(long = "sticker", value_name = "PATH@X,Y", value_parser = parse_sticker)]
    pub stickers: Vec<StickerOverlay>,

    /// Caption placed at X,Y percent, optionally with color and font size
    #[arg(long = "message", value_name = "TEXT@X,Y[,COLOR[,SIZE]]", value_parser = parse_message)]
    pub messages: Vec<MessageOverlay>,

    /// TrueType/OpenType font file for captions
    #[arg(long, value_name = "FONT")]
    pub font: Option<PathBuf>,

    /// Directory the composite is exported to
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ShootArgs {
    /// Apply command-line overrides on top of saved settings
    fn apply_to(&self, config: &mut Config) {
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some(timer) = self.timer {
            config.camera.timer_seconds = timer;
        }
        if let Some(resolution) = self.resolution {
            config.camera.resolution = resolution;
        }
        if let Some(facing) = self.facing {
            config.camera.facing = facing;
        }
        if self.flash {
            config.camera.flash_enabled = true;
        }
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(font) = &self.font {
            config.caption_font = Some(font.clone());
        }
        if self.use_virtual || self.source.is_some() {
            config.backend = CameraBackendType::Virtual;
        }
    }
}

/// Parse `PATH@X,Y`
pub fn parse_sticker(value: &str) -> Result<StickerOverlay, String> {
    let (path, position) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected PATH@X,Y, got \"{value}\""))?;
    if path.is_empty() {
        return Err("sticker path is empty".to_string());
    }
    let (x, y) = parse_position(position)?;
    Ok(StickerOverlay::new(PathBuf::from(path), x, y))
}

/// Parse `TEXT@X,Y[,COLOR[,SIZE]]`
pub fn parse_message(value: &str) -> Result<MessageOverlay, String> {
    let (text, rest) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected TEXT@X,Y[,COLOR[,SIZE]], got \"{value}\""))?;

    let mut fields = rest.splitn(4, ',');
    let x = fields.next().unwrap_or_default();
    let y = fields
        .next()
        .ok_or_else(|| format!("missing Y coordinate in \"{value}\""))?;
    let (x, y) = (parse_percent(x)?, parse_percent(y)?);

    let mut message = MessageOverlay::new(text, x, y);
    if let Some(color) = fields.next().filter(|c| !c.is_empty()) {
        message = message.with_color(color);
    }
    if let Some(size) = fields.next() {
        let size = size
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid font size \"{size}\""))?;
        message = message.with_font_size(size);
    }
    Ok(message)
}

fn parse_position(position: &str) -> Result<(f32, f32), String> {
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got \"{position}\""))?;
    Ok((parse_percent(x)?, parse_percent(y)?))
}

fn parse_percent(value: &str) -> Result<f32, String> {
    let value = value.trim().trim_end_matches('%');
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid percentage \"{value}\""))
}

fn select_backend(
    config: &Config,
    source: Option<&Path>,
) -> anyhow::Result<Arc<dyn CameraBackend>> {
    if let Some(path) = source {
        let raster = load_image_source(path)
            .with_context(|| format!("Failed to load camera source {}", path.display()))?;
        return Ok(Arc::new(VirtualCameraBackend::from_image(raster)));
    }
    Ok(get_backend_for_type(config.backend)?)
}

/// List all available cameras
pub fn list_cameras(use_virtual: bool) -> anyhow::Result<()> {
    let mut config = Config::load();
    if use_virtual {
        config.backend = CameraBackendType::Virtual;
    }

    let backend = get_backend_for_type(config.backend)?;
    if !backend.is_available() {
        println!("The {} backend is not available on this system.", config.backend);
        return Ok(());
    }

    let cameras = backend.enumerate_cameras();
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", config.backend);
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{index}] {camera}");
    }

    Ok(())
}

/// Run one full capture cycle and export the composite
pub fn shoot(args: ShootArgs) -> anyhow::Result<()> {
    let mut config = Config::load();
    args.apply_to(&mut config);

    let backend = select_backend(&config, args.source.as_deref())?;
    let output_dir = config.output_dir();

    let rt = tokio::runtime::Runtime::new()?;
    let path = rt.block_on(run_shoot(backend, config, args.stickers, args.messages, &output_dir))?;

    println!("Photo saved: {}", path.display());
    Ok(())
}

async fn run_shoot(
    backend: Arc<dyn CameraBackend>,
    config: Config,
    stickers: Vec<StickerOverlay>,
    messages: Vec<MessageOverlay>,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let (image_tx, mut image_rx) = mpsc::unbounded_channel();
    let (event_tx, mut events) = mpsc::unbounded_channel();

    let booth = PhotoBooth::new(backend, &config, move |image| {
        let _ = image_tx.send(image);
    })
    .with_events(event_tx);
    let handle = app::spawn(booth);

    handle.send(Message::SetStickers(stickers))?;
    handle.send(Message::SetMessages(messages))?;
    handle.send(Message::Start)?;

    let result: anyhow::Result<PathBuf> = async {
        wait_until_ready(&mut events).await?;

        let required = config.layout.required_count();
        println!("Layout {} needs {required} shot(s)", config.layout);
        for _ in 0..required {
            handle.send(Message::Capture)?;
            wait_for_shot(&mut events).await?;
        }

        let image = image_rx
            .recv()
            .await
            .context("Photo booth stopped before the composite was ready")?;

        // Report sticker failures that arrived with the composite
        while let Ok(event) = events.try_recv() {
            report(&event);
        }

        let mut gallery = Gallery::new();
        let id = image.id;
        gallery.on_capture(image);
        gallery
            .export(id, output_dir)
            .await?
            .context("Composite missing from gallery")
    }
    .await;

    if let Err(err) = handle.shutdown().await {
        tracing::warn!(error = %err, "Photo booth task did not end cleanly");
    }
    result
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<BoothEvent>) -> anyhow::Result<BoothEvent> {
    let event = events
        .recv()
        .await
        .context("Photo booth stopped unexpectedly")?;
    report(&event);
    Ok(event)
}

async fn wait_until_ready(events: &mut mpsc::UnboundedReceiver<BoothEvent>) -> anyhow::Result<()> {
    loop {
        match next_event(events).await? {
            BoothEvent::DeviceStatus(DeviceStatus::Ready) => return Ok(()),
            BoothEvent::DeviceStatus(DeviceStatus::Failed(err)) => {
                bail!("Camera unavailable: {err}")
            }
            _ => {}
        }
    }
}

async fn wait_for_shot(events: &mut mpsc::UnboundedReceiver<BoothEvent>) -> anyhow::Result<()> {
    loop {
        match next_event(events).await? {
            BoothEvent::ShotCaptured { .. } => return Ok(()),
            BoothEvent::CaptureFailed(err) => bail!("Capture failed: {err}"),
            BoothEvent::DeviceStatus(status) if !status.is_ready() => {
                bail!("Camera stopped: {status}")
            }
            _ => {}
        }
    }
}

fn report(event: &BoothEvent) {
    match event {
        BoothEvent::DeviceStatus(status) => println!("Camera {status}"),
        BoothEvent::CountdownTick(0) => println!("Smile!"),
        BoothEvent::CountdownTick(seconds) => println!("{seconds}..."),
        BoothEvent::Flash => println!("*flash*"),
        BoothEvent::ShotCaptured { index, required } => {
            println!("Shot {index} of {required}")
        }
        BoothEvent::CompositeEmitted(image) => {
            println!("Composite {}x{} ({} bytes)", image.width, image.height, image.len())
        }
        BoothEvent::OverlayLoadFailed { overlay_id, error } => {
            eprintln!("Skipped overlay {overlay_id}: {error}")
        }
        BoothEvent::CaptureFailed(err) => eprintln!("Capture failed: {err}"),
    }
}

/// Build a grid collage from image files
pub fn collage(template: GridTemplate, output: &Path, images: &[PathBuf]) -> anyhow::Result<()> {
    if images.is_empty() {
        bail!("No images given");
    }
    if images.len() > template.capacity() {
        println!(
            "{} holds {} image(s); ignoring the remaining {}",
            template.display_name(),
            template.capacity(),
            images.len() - template.capacity()
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut gallery = Gallery::new();
        for path in images.iter().take(template.capacity()) {
            let image = gallery::import_image(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            gallery.on_capture(image);
        }

        let collage = gallery.collage(template).await?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, &collage.data[..]).await?;
        println!(
            "Collage saved: {} ({}x{})",
            output.display(),
            collage.width,
            collage.height
        );
        anyhow::Ok(())
    })
}
