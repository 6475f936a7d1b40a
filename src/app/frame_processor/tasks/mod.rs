// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! Concrete [`DecodeTask`](super::DecodeTask) implementations.

pub mod qr_detector;

pub use qr_detector::QrDetector;
