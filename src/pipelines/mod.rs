// SPDX-License-Identifier: GPL-3.0-only

//! Media processing pipelines
//!
//! - [`photo`]: Still capture, filters, collages, overlays and encoding

pub mod photo;
