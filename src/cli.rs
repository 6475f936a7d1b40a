// SPDX-License-Identifier: GPL-3.0-only

//! Headless CLI commands
//!
//! `list` enumerates cameras, `scan` runs the decode task over an image
//! file - the same detector the live pipeline uses, minus the camera.

use qr_scanner::app::frame_processor::tasks::QrDetector;
use qr_scanner::app::frame_processor::DecodeTask;
use qr_scanner::backends::camera::enumerate_cameras;
use qr_scanner::backends::camera::types::CameraFrame;
use qr_scanner::errors::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Print the available cameras, one per line.
pub fn list_cameras() -> AppResult<()> {
    let cameras = enumerate_cameras();
    if cameras.is_empty() {
        return Err(AppError::NoCameraFound);
    }

    for (index, camera) in cameras.iter().enumerate() {
        let path = if camera.path.is_empty() {
            "(auto-select)"
        } else {
            camera.path.as_str()
        };
        println!("{}: {} [{}]", index, camera.name, path);
    }

    Ok(())
}

/// Decode QR codes from an image file and print the payloads.
pub fn scan_image(path: &Path, json: bool) -> AppResult<()> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();

    let frame = CameraFrame {
        width,
        height,
        stride: width * 4,
        data: Arc::from(image.into_raw().as_slice()),
        captured_at: Instant::now(),
    };

    // Full-resolution pass: file scans favor accuracy over frame rate
    let detector = QrDetector::with_max_dimension(width.max(height));
    let detections = detector.decode(&frame);

    if detections.is_empty() {
        return Err(AppError::NoCodeFound);
    }

    if json {
        let payloads: Vec<serde_json::Value> = detections
            .iter()
            .map(|d| {
                serde_json::json!({
                    "content": d.content,
                    "kind": match d.action {
                        qr_scanner::QrAction::Url(_) => "url",
                        qr_scanner::QrAction::Text(_) => "text",
                    },
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payloads).map_err(|e| AppError::Other(e.to_string()))?
        );
    } else {
        for detection in detections {
            println!("{}", detection.content);
        }
    }

    Ok(())
}
