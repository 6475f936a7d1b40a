// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the camera-frame-to-decode-result pipeline
//!
//! These exercise the pieces together the way the app wires them: frames
//! published into the slot, the analyzer draining it, results folded into
//! the sink.

use futures::StreamExt;
use qr_scanner::app::ScanState;
use qr_scanner::app::frame_processor::tasks::QrDetector;
use qr_scanner::app::frame_processor::{DecodeTask, FrameAnalyzer, FrameSlot, QrDetection};
use qr_scanner::backends::camera::types::CameraFrame;
use std::sync::Arc;
use std::time::Instant;

fn gray_frame(width: u32, height: u32) -> Arc<CameraFrame> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.extend_from_slice(&[127, 127, 127, 255]);
    }
    Arc::new(CameraFrame {
        width,
        height,
        stride: width * 4,
        data: Arc::from(data.as_slice()),
        captured_at: Instant::now(),
    })
}

/// Stub decoder that reads a payload "encoded" in the first pixel: frames
/// whose first byte is 255 carry the payload, all others are misses.
struct MarkerDecoder {
    payload: &'static str,
}

impl DecodeTask for MarkerDecoder {
    fn decode(&self, frame: &CameraFrame) -> Vec<QrDetection> {
        if frame.data.first() == Some(&255) {
            vec![QrDetection::new(self.payload.to_string())]
        } else {
            Vec::new()
        }
    }
}

fn marker_frame() -> Arc<CameraFrame> {
    let mut data = vec![127u8; 16];
    data[0] = 255;
    Arc::new(CameraFrame {
        width: 2,
        height: 2,
        stride: 8,
        data: Arc::from(data.as_slice()),
        captured_at: Instant::now(),
    })
}

#[tokio::test]
async fn frames_without_codes_produce_no_results() {
    let slot = FrameSlot::new();
    let analyzer = FrameAnalyzer::new(QrDetector::new(), Arc::clone(&slot));
    let (tx, mut rx) = futures::channel::mpsc::channel(4);
    let worker = tokio::spawn(analyzer.run(tx));

    // Real detector over featureless frames: nothing to find
    slot.publish(gray_frame(64, 64));
    slot.publish(gray_frame(128, 128));
    slot.close();
    worker.await.unwrap();

    assert!(rx.next().await.is_none());
}

#[tokio::test]
async fn decoded_payload_arrives_byte_for_byte() {
    let slot = FrameSlot::new();
    let analyzer = FrameAnalyzer::new(
        MarkerDecoder {
            payload: "https://example.com/тест",
        },
        Arc::clone(&slot),
    );
    let (tx, mut rx) = futures::channel::mpsc::channel(4);
    let worker = tokio::spawn(analyzer.run(tx));

    slot.publish(marker_frame());
    let batch = rx.next().await.expect("expected one result batch");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].content, "https://example.com/тест");

    slot.close();
    worker.await.unwrap();
    assert!(rx.next().await.is_none(), "exactly one emission expected");
}

#[tokio::test]
async fn slot_overwrite_releases_the_older_frame() {
    let slot = FrameSlot::new();

    let first = gray_frame(8, 8);
    let second = gray_frame(8, 8);

    slot.publish(Arc::clone(&first));
    slot.publish(Arc::clone(&second));

    // The overwritten frame was dropped by the slot, not queued
    assert_eq!(Arc::strong_count(&first), 1);
    assert_eq!(slot.overwritten(), 1);

    let delivered = slot.recv().await.unwrap();
    assert!(Arc::ptr_eq(&delivered, &second));
}

#[tokio::test]
async fn repeated_scans_are_idempotent() {
    let slot = FrameSlot::new();
    let analyzer = FrameAnalyzer::new(MarkerDecoder { payload: "ticket-42" }, Arc::clone(&slot));
    let (tx, mut rx) = futures::channel::mpsc::channel(4);
    let worker = tokio::spawn(analyzer.run(tx));

    let mut sink = ScanState::default();

    // First scan opens the dialog
    slot.publish(marker_frame());
    let batch = rx.next().await.unwrap();
    assert!(sink.record(batch.into_iter().next().unwrap()));
    assert_eq!(sink.latest.as_ref().unwrap().content, "ticket-42");

    // Same code scanned again: same text, no re-opened dialog after dismiss
    sink.dismiss();
    slot.publish(marker_frame());
    let batch = rx.next().await.unwrap();
    assert!(!sink.record(batch.into_iter().next().unwrap()));
    assert_eq!(sink.latest.as_ref().unwrap().content, "ticket-42");
    assert!(!sink.dialog_open);

    slot.close();
    worker.await.unwrap();
}

#[test]
fn denied_permission_keeps_the_sink_empty() {
    use qr_scanner::PermissionState;

    // The pipeline is gated on is_granted(); with a denied state no frame
    // ever reaches the slot, so the sink can only be empty.
    let permission = PermissionState::Denied;
    let sink = ScanState::default();

    assert!(!permission.is_granted());
    assert!(sink.is_empty());
}
