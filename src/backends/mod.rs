// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! # Modules
//!
//! - [`camera`]: Backend trait, device acquisition and the V4L2 backend
//! - [`virtual_camera`]: Synthetic camera for hardware-free runs and tests

pub mod camera;
pub mod virtual_camera;
