// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor: the camera-frame-to-decode-result pipeline
//!
//! Captured frames are handed to a decode worker through a bounded
//! single-slot channel (capacity one, overwrite-on-full): while a decode is
//! in progress, newer frames replace the pending one rather than queueing.
//! The worker attempts one synchronous decode per frame and emits at most
//! one result batch.

pub mod analyzer;
pub mod slot;
pub mod tasks;
pub mod types;

pub use analyzer::{DecodeTask, FrameAnalyzer};
pub use slot::FrameSlot;
pub use types::{QrAction, QrDetection};
