// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the async booth runtime

use photobooth::app::{self, BoothEvent, Message, PhotoBooth};
use photobooth::backends::camera::types::DeviceStatus;
use photobooth::backends::virtual_camera::{FrameSource, VirtualCameraBackend};
use photobooth::config::{Config, ResolutionTier};
use photobooth::pipelines::photo::{CollageLayout, CountdownState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

fn config(timer_seconds: u32) -> Config {
    let mut config = Config::default();
    config.camera.timer_seconds = timer_seconds;
    config.camera.resolution = ResolutionTier::Standard;
    config
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_on_scheduled_ticks() {
    let (image_tx, mut images) = unbounded_channel();
    let (event_tx, mut events) = unbounded_channel();
    let booth = PhotoBooth::new(
        Arc::new(VirtualCameraBackend::new(FrameSource::Solid([1, 2, 3, 255]))),
        &config(3),
        move |image| {
            let _ = image_tx.send(image);
        },
    )
    .with_events(event_tx);

    let handle = app::spawn(booth);
    handle.send(Message::Start).unwrap();
    loop {
        if let BoothEvent::DeviceStatus(DeviceStatus::Ready) = events.recv().await.unwrap() {
            break;
        }
    }

    let started = tokio::time::Instant::now();
    handle.send(Message::Capture).unwrap();
    let image = images.recv().await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!((image.width, image.height), (640, 480));

    let booth = handle.shutdown().await.unwrap();
    assert!(booth.is_shut_down());
}

#[tokio::test]
async fn shutdown_aborts_pending_countdown() {
    let backend = VirtualCameraBackend::default();
    let stats = backend.stats();
    let (image_tx, mut images) = unbounded_channel();
    let booth = PhotoBooth::new(Arc::new(backend), &config(10), move |image| {
        let _ = image_tx.send(image);
    });

    let handle = app::spawn(booth);
    handle.send(Message::Start).unwrap();
    handle.send(Message::Capture).unwrap();
    let booth = handle.shutdown().await.unwrap();

    assert!(booth.is_shut_down());
    assert_eq!(booth.countdown_state(), CountdownState::Idle);
    assert_eq!(stats.open_streams(), 0);
    assert_eq!(stats.total_opened(), 1);

    // The callback goes away with the booth and never fired
    drop(booth);
    assert!(images.recv().await.is_none());
}

#[tokio::test]
async fn stopped_booth_rejects_messages() {
    let backend = VirtualCameraBackend::default();
    let stats = backend.stats();
    let booth = PhotoBooth::new(Arc::new(backend), &config(0), |_| {});

    let handle = app::spawn(booth);
    let sender = handle.sender();
    sender.send(Message::Start).unwrap();
    let booth = handle.shutdown().await.unwrap();
    assert_eq!(stats.open_streams(), 0);
    assert!(booth.is_shut_down());

    assert!(sender.send(Message::Capture).is_err());
}

#[tokio::test]
async fn messages_are_processed_in_order() {
    let (image_tx, mut images) = unbounded_channel();
    let backend = VirtualCameraBackend::default();
    let booth = PhotoBooth::new(Arc::new(backend), &config(0), move |image| {
        let _ = image_tx.send(image);
    });

    let handle = app::spawn(booth);
    handle.send(Message::SetLayout(CollageLayout::Vertical3)).unwrap();
    handle.send(Message::Start).unwrap();
    for _ in 0..3 {
        handle.send(Message::Capture).unwrap();
    }

    let image = images.recv().await.unwrap();
    assert_eq!((image.width, image.height), (640, 480 * 3));

    let booth = handle.shutdown().await.unwrap();
    assert_eq!(booth.collage_progress(), (0, 3));
}
