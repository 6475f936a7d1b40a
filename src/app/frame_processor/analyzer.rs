// SPDX-License-Identifier: GPL-3.0-only

//! Decode worker: one decode attempt per frame, latest frame only

use crate::app::frame_processor::slot::FrameSlot;
use crate::app::frame_processor::types::QrDetection;
use crate::backends::camera::types::CameraFrame;
use futures::SinkExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// One decode attempt over a camera frame.
///
/// Implementations must not retain the frame buffer past the call: decode
/// what is there, or report nothing.
pub trait DecodeTask: Send + Sync + 'static {
    fn decode(&self, frame: &CameraFrame) -> Vec<QrDetection>;
}

/// Worker that drains the frame slot and runs a decoder.
///
/// Contract per frame: decode synchronously on a blocking task; on success
/// emit the detections exactly once; on failure (no code, decode error,
/// panicked decoder) emit nothing. The frame reference is dropped on every
/// path before the next one is taken, so the capture side is never starved.
pub struct FrameAnalyzer<D> {
    decoder: Arc<D>,
    slot: Arc<FrameSlot<Arc<CameraFrame>>>,
}

impl<D: DecodeTask> FrameAnalyzer<D> {
    pub fn new(decoder: D, slot: Arc<FrameSlot<Arc<CameraFrame>>>) -> Self {
        Self {
            decoder: Arc::new(decoder),
            slot,
        }
    }

    /// Run until the slot closes or the result channel disconnects.
    pub async fn run(self, mut results: futures::channel::mpsc::Sender<Vec<QrDetection>>) {
        while let Some(frame) = self.slot.recv().await {
            let decoder = Arc::clone(&self.decoder);

            // The frame moves into the blocking task and is dropped there on
            // every exit path, including an unwinding decoder.
            let detections = tokio::task::spawn_blocking(move || decoder.decode(&frame))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Decode task panicked");
                    Vec::new()
                });

            if detections.is_empty() {
                // Miss: nothing to report, retry on the next frame
                continue;
            }

            debug!(count = detections.len(), "Decoded QR payload(s)");

            if results.send(detections).await.is_err() {
                debug!("Result channel closed, stopping analyzer");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn test_frame() -> Arc<CameraFrame> {
        Arc::new(CameraFrame {
            width: 2,
            height: 2,
            stride: 8,
            data: Arc::from(vec![0u8; 16].as_slice()),
            captured_at: Instant::now(),
        })
    }

    /// Decoder stub returning a fixed payload and counting invocations
    struct FixedDecoder {
        payload: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl DecodeTask for FixedDecoder {
        fn decode(&self, _frame: &CameraFrame) -> Vec<QrDetection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.payload {
                Some(text) => vec![QrDetection::new(text.to_string())],
                None => Vec::new(),
            }
        }
    }

    #[tokio::test]
    async fn successful_decode_emits_exactly_once() {
        let slot = FrameSlot::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let analyzer = FrameAnalyzer::new(
            FixedDecoder {
                payload: Some("https://example.com"),
                calls: Arc::clone(&calls),
            },
            Arc::clone(&slot),
        );

        let (tx, mut rx) = futures::channel::mpsc::channel(4);
        let worker = tokio::spawn(analyzer.run(tx));

        slot.publish(test_frame());
        let batch = rx.next().await.expect("one emission expected");
        assert_eq!(batch.len(), 1);
        // Decoded text is preserved byte-for-byte
        assert_eq!(batch[0].content, "https://example.com");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        slot.close();
        worker.await.unwrap();
        // Exactly once: no further emission for the single frame
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn decode_miss_emits_nothing() {
        let slot = FrameSlot::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let analyzer = FrameAnalyzer::new(
            FixedDecoder {
                payload: None,
                calls: Arc::clone(&calls),
            },
            Arc::clone(&slot),
        );

        let (tx, mut rx) = futures::channel::mpsc::channel(4);
        let worker = tokio::spawn(analyzer.run(tx));

        slot.publish(test_frame());
        slot.publish(test_frame());
        slot.close();
        worker.await.unwrap();

        assert!(rx.next().await.is_none());
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn frame_is_released_after_the_attempt() {
        let slot = FrameSlot::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let analyzer = FrameAnalyzer::new(
            FixedDecoder {
                payload: None,
                calls,
            },
            Arc::clone(&slot),
        );

        let (tx, _rx) = futures::channel::mpsc::channel(4);
        let worker = tokio::spawn(analyzer.run(tx));

        let frame = test_frame();
        slot.publish(Arc::clone(&frame));
        slot.close();
        worker.await.unwrap();

        // Only our local clone remains; the analyzer kept nothing
        assert_eq!(Arc::strong_count(&frame), 1);
    }

    /// Decoder that panics - the analyzer must survive and keep going
    struct PanickingDecoder;

    impl DecodeTask for PanickingDecoder {
        fn decode(&self, _frame: &CameraFrame) -> Vec<QrDetection> {
            panic!("decoder blew up");
        }
    }

    #[tokio::test]
    async fn panicking_decoder_is_contained() {
        let slot = FrameSlot::new();
        let analyzer = FrameAnalyzer::new(PanickingDecoder, Arc::clone(&slot));

        let (tx, mut rx) = futures::channel::mpsc::channel(4);
        let worker = tokio::spawn(analyzer.run(tx));

        let frame = test_frame();
        slot.publish(Arc::clone(&frame));
        slot.close();
        worker.await.unwrap();

        assert!(rx.next().await.is_none());
        // Released even on the panic path
        assert_eq!(Arc::strong_count(&frame), 1);
    }
}
