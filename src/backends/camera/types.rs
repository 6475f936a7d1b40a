// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use std::sync::Arc;
use std::time::Instant;

/// Represents a camera device discovered through PipeWire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human-readable device name
    pub name: String,
    /// Path used to target the device (e.g. "pipewire-serial-43").
    /// Empty path means PipeWire auto-selects the default camera.
    pub path: String,
}

impl CameraDevice {
    /// Fallback device that lets PipeWire pick the default camera
    pub fn auto_select() -> Self {
        Self {
            name: "Default Camera (PipeWire)".to_string(),
            path: String::new(),
        }
    }
}

/// Requested capture format
///
/// The pipeline asks PipeWire for something close to this; the camera may
/// negotiate a different size, which the delivered frames report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
}

impl Default for CameraFormat {
    fn default() -> Self {
        Self {
            width: crate::constants::pipeline::DEFAULT_WIDTH,
            height: crate::constants::pipeline::DEFAULT_HEIGHT,
        }
    }
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single RGBA frame from the camera
///
/// The pixel data is reference-counted; releasing a frame is dropping the
/// last clone. Rows may carry stride padding - `stride` is the byte length
/// of one row including padding, `width * 4` without.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// RGBA pixel data, `height * stride` bytes
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Copy the pixel data into a tightly packed RGBA buffer (no stride
    /// padding). Used where a consumer needs `width * height * 4` bytes.
    pub fn packed_rgba(&self) -> Vec<u8> {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;
        let row_bytes = width * 4;

        if stride == row_bytes {
            return self.data.to_vec();
        }

        let mut packed = Vec::with_capacity(row_bytes * height);
        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + row_bytes;
            if row_end <= self.data.len() {
                packed.extend_from_slice(&self.data[row_start..row_end]);
            }
        }
        packed
    }
}

/// Frame sender for the capture pipeline
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Frame receiver for the capture pipeline
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Result type for bind operations
pub type BindResult<T> = Result<T, BindError>;

/// Errors from binding the capture pipeline
///
/// A bind failure is explicit application state: the UI shows it and offers
/// a retry, instead of silently presenting an empty preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// PipeWire (or GStreamer's pipewiresrc) is not available on this system
    Unavailable(String),
    /// Building the pipeline failed
    PipelineCreation(String),
    /// The pipeline refused to start
    StartFailed(String),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::Unavailable(msg) => write!(f, "PipeWire not available: {}", msg),
            BindError::PipelineCreation(msg) => write!(f, "Failed to create pipeline: {}", msg),
            BindError::StartFailed(msg) => write!(f, "Failed to start pipeline: {}", msg),
        }
    }
}

impl std::error::Error for BindError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_stride(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            stride,
            data: Arc::from(data.as_slice()),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn packed_rgba_removes_stride_padding() {
        // 2x2 RGBA frame with 2 bytes of stride padding per row
        let data: Vec<u8> = vec![
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, // padding
            0, 0, 255, 255, // blue
            255, 255, 255, 255, // white
            0, 0, // padding
        ];
        let frame = frame_with_stride(2, 2, 10, data);

        let packed = frame.packed_rgba();
        assert_eq!(packed.len(), 16);
        assert_eq!(&packed[0..4], &[255, 0, 0, 255]);
        assert_eq!(&packed[4..8], &[0, 255, 0, 255]);
        assert_eq!(&packed[8..12], &[0, 0, 255, 255]);
        assert_eq!(&packed[12..16], &[255, 255, 255, 255]);
    }

    #[test]
    fn packed_rgba_passes_through_tight_frames() {
        let data: Vec<u8> = (0..16).collect();
        let frame = frame_with_stride(2, 2, 8, data.clone());
        assert_eq!(frame.packed_rgba(), data);
    }

    #[test]
    fn bind_error_display() {
        let err = BindError::PipelineCreation("no such element".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to create pipeline: no such element"
        );
    }
}
