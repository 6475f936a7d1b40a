// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend (PipeWire via GStreamer)
//!
//! The scanner talks to cameras exclusively through PipeWire, the modern
//! Linux camera stack. The backend has two responsibilities:
//!
//! - enumerate available camera nodes ([`enumeration`])
//! - bind a capture pipeline that delivers RGBA frames ([`pipeline`])
//!
//! Binding is a `Result`-typed operation: a failed bind is returned to the
//! caller as a [`types::BindError`] and surfaced as observable application
//! state rather than being swallowed into a log line.

pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use enumeration::enumerate_cameras;
pub use pipeline::PipelineHandle;
pub use types::{BindError, BindResult, CameraDevice, CameraFormat, CameraFrame};
