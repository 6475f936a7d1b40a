// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire GStreamer pipeline for camera capture
//!
//! The pipeline decodes whatever the camera produces (MJPEG, raw YUV, ...)
//! and converts to RGBA before handing frames to the application, so the
//! rest of the crate only ever sees one pixel format.

use super::types::{BindError, BindResult, CameraDevice, CameraFormat, CameraFrame, FrameSender};
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Handle to a bound camera pipeline
///
/// Frames flow into the `FrameSender` passed to [`PipelineHandle::bind`]
/// until the handle is dropped. Dropping stops the pipeline and releases
/// the device.
pub struct PipelineHandle {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PipelineHandle {
    /// Bind a capture pipeline to the given device.
    ///
    /// Returns a typed error when PipeWire is unavailable, the pipeline
    /// cannot be constructed, or it refuses to start - the caller surfaces
    /// this as visible application state.
    pub fn bind(
        device: &CameraDevice,
        format: &CameraFormat,
        frame_sender: FrameSender,
    ) -> BindResult<Self> {
        info!(device = %device.name, format = %format, "Binding camera pipeline");

        gstreamer::init().map_err(|e| BindError::Unavailable(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc")
            .ok_or_else(|| BindError::Unavailable("pipewiresrc factory not found".to_string()))?;

        let pipeline_str = build_pipeline_string(&device.path, format);
        debug!(pipeline = %pipeline_str, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&pipeline_str)
            .map_err(|e| BindError::PipelineCreation(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BindError::PipelineCreation("parsed element is not a pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BindError::PipelineCreation("failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| BindError::PipelineCreation("failed to cast appsink".to_string()))?;

        // Latest-only delivery: cap buffering and drop stale frames instead
        // of queueing them behind a slow consumer.
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| on_new_sample(appsink, &frame_sender))
                .build(),
        );

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| BindError::StartFailed(e.to_string()))?;

        // Wait for the state change to complete before reporting success
        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state after start");

        if let Err(e) = result {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BindError::StartFailed(e.to_string()));
        }
        if state != gstreamer::State::Playing {
            warn!(state = ?state, "Pipeline did not reach PLAYING within timeout");
        }

        info!("Camera pipeline bound");

        Ok(Self { pipeline, appsink })
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        info!("Dropping camera pipeline");
        // Clear callbacks first so no frame lands after teardown begins
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        let (result, state, _) = self
            .pipeline
            .state(gstreamer::ClockTime::from_seconds(timing::STOP_TIMEOUT_SECS));
        match result {
            Ok(_) => info!(state = ?state, "Camera pipeline stopped"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline teardown had issues"),
        }
    }
}

/// Appsink callback: pull one sample, wrap it as a frame, try to deliver it.
///
/// Delivery uses `try_send` - when the channel is full the frame is dropped,
/// never queued. Scanning retries continuously, so a dropped frame costs
/// nothing but a decode attempt.
fn on_new_sample(
    appsink: &AppSink,
    frame_sender: &FrameSender,
) -> Result<gstreamer::FlowSuccess, gstreamer::FlowError> {
    let frame_start = Instant::now();
    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

    let sample = appsink.pull_sample().map_err(|e| {
        if frame_num % 30 == 0 {
            error!(frame = frame_num, error = ?e, "Failed to pull sample");
        }
        gstreamer::FlowError::Eos
    })?;

    let buffer = sample.buffer().ok_or_else(|| {
        if frame_num % 30 == 0 {
            error!(frame = frame_num, "No buffer in sample");
        }
        gstreamer::FlowError::Error
    })?;

    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
        if frame_num % 30 == 0 {
            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
        }
        return Ok(gstreamer::FlowSuccess::Ok);
    }

    let caps = sample.caps().ok_or_else(|| {
        if frame_num % 30 == 0 {
            error!(frame = frame_num, "No caps in sample");
        }
        gstreamer::FlowError::Error
    })?;

    let video_info = VideoInfo::from_caps(caps).map_err(|e| {
        if frame_num % 30 == 0 {
            error!(frame = frame_num, error = ?e, "Failed to get video info");
        }
        gstreamer::FlowError::Error
    })?;

    let map = buffer.map_readable().map_err(|e| {
        if frame_num % 30 == 0 {
            error!(frame = frame_num, error = ?e, "Failed to map buffer");
        }
        gstreamer::FlowError::Error
    })?;

    let frame = CameraFrame {
        width: video_info.width(),
        height: video_info.height(),
        stride: video_info.stride()[0] as u32,
        data: Arc::from(map.as_slice()),
        captured_at: frame_start,
    };

    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
        debug!(
            frame = frame_num,
            width = frame.width,
            height = frame.height,
            stride = frame.stride,
            size_kb = frame.data.len() / 1024,
            "Frame captured"
        );
    }

    let mut sender = frame_sender.clone();
    if let Err(e) = sender.try_send(frame) {
        if e.is_disconnected() {
            debug!(frame = frame_num, "Frame channel disconnected, stopping delivery");
            return Err(gstreamer::FlowError::Eos);
        }
        // Channel full: the consumer still holds an older frame, drop this one
        if frame_num % 30 == 0 {
            debug!(frame = frame_num, "Frame dropped (channel full)");
        }
    }

    Ok(gstreamer::FlowSuccess::Ok)
}

/// Build the GStreamer launch string for a device path.
///
/// `decodebin` handles whatever the camera produces; `videoconvert` +
/// `videoscale` normalize to RGBA at (roughly) the requested size.
fn build_pipeline_string(device_path: &str, format: &CameraFormat) -> String {
    format!(
        "pipewiresrc {}do-timestamp=true ! \
         queue max-size-buffers={} leaky=downstream ! \
         decodebin ! \
         videoconvert ! \
         videoscale ! \
         video/x-raw,format=RGBA,width={},height={} ! \
         appsink name=sink",
        pipewire_path_property(device_path),
        pipeline::MAX_BUFFERS,
        format.width,
        format.height,
    )
}

/// Determine the pipewiresrc property that targets a device path.
fn pipewire_path_property(device_path: &str) -> String {
    if device_path.is_empty() {
        // Empty path = PipeWire auto-selects the default camera
        info!("Using default PipeWire camera (auto-select)");
        String::new()
    } else if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        info!(serial, "Using PipeWire object.serial");
        format!("target-object={} ", serial)
    } else if let Some(node_id) = device_path.strip_prefix("pipewire-") {
        info!(node_id, "Using PipeWire node ID");
        format!("target-object={} ", node_id)
    } else if device_path.starts_with("/dev/video") {
        // V4L2 device exposed through PipeWire
        info!(device_path, "Using V4L2 device via PipeWire");
        format!("path=v4l2:{} ", device_path)
    } else {
        warn!(device_path, "Unknown device path format, using path property");
        format!("path={} ", device_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_property_for_serial() {
        assert_eq!(
            pipewire_path_property("pipewire-serial-43"),
            "target-object=43 "
        );
    }

    #[test]
    fn path_property_for_node_id() {
        assert_eq!(pipewire_path_property("pipewire-76"), "target-object=76 ");
    }

    #[test]
    fn path_property_for_auto_select() {
        assert_eq!(pipewire_path_property(""), "");
    }

    #[test]
    fn path_property_for_v4l2() {
        assert_eq!(
            pipewire_path_property("/dev/video0"),
            "path=v4l2:/dev/video0 "
        );
    }

    #[test]
    fn pipeline_string_requests_rgba() {
        let format = CameraFormat {
            width: 1280,
            height: 720,
        };
        let s = build_pipeline_string("", &format);
        assert!(s.contains("format=RGBA"));
        assert!(s.contains("width=1280,height=720"));
        assert!(s.contains("appsink name=sink"));
    }
}
