// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Decoding is delegated to the rqrr crate: frames are converted to
//! grayscale, downscaled for real-time throughput, and handed to rqrr's
//! grid search. The detector itself never touches finder patterns or
//! error correction.

use crate::app::frame_processor::analyzer::DecodeTask;
use crate::app::frame_processor::types::QrDetection;
use crate::backends::camera::types::CameraFrame;
use crate::constants::analyzer;
use tracing::{debug, trace};

/// QR code detector
///
/// Analyzes camera frames to detect and decode QR codes. Frames above
/// `max_dimension` are downscaled before the grid search.
pub struct QrDetector {
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            max_dimension: analyzer::MAX_PROCESS_DIMENSION,
        }
    }

    /// Create a QR detector with a custom processing dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl DecodeTask for QrDetector {
    fn decode(&self, frame: &CameraFrame) -> Vec<QrDetection> {
        detect_sync(frame, self.max_dimension)
    }
}

/// Synchronous detection (runs on a blocking task)
fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> Vec<QrDetection> {
    let start = std::time::Instant::now();

    let (luma, width, height) = grayscale_for_processing(frame, max_dimension);

    let conversion_time = start.elapsed();
    trace!(
        width,
        height,
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image"
    );

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| luma[y * width as usize + x],
    );

    let grids = prepared.detect_grids();
    let mut detections = Vec::with_capacity(grids.len());

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(len = content.len(), "Decoded QR code");
                detections.push(QrDetection::new(content));
            }
            Err(e) => {
                // Located a candidate but decoding failed: next frame retries
                debug!(error = %e, "Failed to decode located QR candidate");
            }
        }
    }

    if !detections.is_empty() {
        debug!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found code(s)"
        );
    }

    detections
}

/// Convert the RGBA frame to grayscale, downscaling above `max_dimension`.
///
/// Uses fixed-point BT.601 luma weights and nearest-neighbour sampling;
/// QR detection cares about module contrast, not interpolation quality.
fn grayscale_for_processing(frame: &CameraFrame, max_dimension: u32) -> (Vec<u8>, u32, u32) {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;
    let stride = frame.stride as usize;

    let (dst_width, dst_height) = if frame.width > max_dimension || frame.height > max_dimension {
        let scale =
            (frame.width as f32 / max_dimension as f32).max(frame.height as f32 / max_dimension as f32);
        (
            ((frame.width as f32 / scale) as u32).max(1),
            ((frame.height as f32 / scale) as u32).max(1),
        )
    } else {
        (frame.width, frame.height)
    };

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let mut luma = Vec::with_capacity((dst_width * dst_height) as usize);

    for y in 0..dst_height {
        let src_y = ((y as f32 * y_ratio) as usize).min(src_height - 1);
        let row_start = src_y * stride;
        for x in 0..dst_width {
            let src_x = ((x as f32 * x_ratio) as usize).min(src_width - 1);
            let offset = row_start + src_x * 4;

            let r = frame.data.get(offset).copied().unwrap_or(0) as u32;
            let g = frame.data.get(offset + 1).copied().unwrap_or(0) as u32;
            let b = frame.data.get(offset + 2).copied().unwrap_or(0) as u32;

            // y = 0.299 r + 0.587 g + 0.114 b, in 8.8 fixed point
            luma.push(((77 * r + 150 * g + 29 * b) >> 8) as u8);
        }
    }

    (luma, dst_width, dst_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> CameraFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&rgba);
        }
        CameraFrame {
            width,
            height,
            stride: width * 4,
            data: Arc::from(data.as_slice()),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn flat_frame_produces_no_detections() {
        let frame = solid_frame(64, 64, [128, 128, 128, 255]);
        let detections = QrDetector::new().decode(&frame);
        assert!(detections.is_empty());
    }

    #[test]
    fn grayscale_applies_luma_weights() {
        // Pure green is brighter in luma than pure blue
        let green = solid_frame(4, 4, [0, 255, 0, 255]);
        let blue = solid_frame(4, 4, [0, 0, 255, 255]);

        let (g_luma, _, _) = grayscale_for_processing(&green, 640);
        let (b_luma, _, _) = grayscale_for_processing(&blue, 640);

        assert!(g_luma[0] > b_luma[0]);
        assert_eq!(g_luma.len(), 16);
    }

    #[test]
    fn large_frames_are_downscaled() {
        let frame = solid_frame(1280, 720, [255, 255, 255, 255]);
        let (luma, width, height) = grayscale_for_processing(&frame, 640);

        assert_eq!(width, 640);
        assert_eq!(height, 360);
        assert_eq!(luma.len(), (width * height) as usize);
    }

    #[test]
    fn small_frames_keep_their_size() {
        let frame = solid_frame(320, 240, [0, 0, 0, 255]);
        let (luma, width, height) = grayscale_for_processing(&frame, 640);

        assert_eq!((width, height), (320, 240));
        assert_eq!(luma.len(), 320 * 240);
    }

    #[test]
    fn stride_padding_is_skipped() {
        // 2x2 white frame with 4 bytes of padding per row; padding is zeroes
        // and must not leak into the sampled pixels.
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&[255, 255, 255, 255, 255, 255, 255, 255]);
            data.extend_from_slice(&[0, 0, 0, 0]);
        }
        let frame = CameraFrame {
            width: 2,
            height: 2,
            stride: 12,
            data: Arc::from(data.as_slice()),
            captured_at: Instant::now(),
        };

        let (luma, _, _) = grayscale_for_processing(&frame, 640);
        assert!(luma.iter().all(|&v| v > 250));
    }
}
