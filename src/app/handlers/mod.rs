// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules, grouped by functional domain

mod camera;
mod capture;
mod overlays;
