// SPDX-License-Identifier: GPL-3.0-only

//! Camera handlers
//!
//! Handles camera enumeration, frame delivery, and bind failures.

use crate::app::state::{AppModel, CameraPhase, Message};
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use tracing::{error, info, warn};

impl AppModel {
    pub(crate) fn handle_cameras_enumerated(
        &mut self,
        cameras: Vec<CameraDevice>,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        info!(count = cameras.len(), index, "Cameras enumerated");

        self.camera_dropdown_options = cameras.iter().map(|cam| cam.name.clone()).collect();
        self.available_cameras = cameras;
        self.current_camera_index = index.min(self.available_cameras.len().saturating_sub(1));

        if self.permission.is_granted() && !self.available_cameras.is_empty() {
            self.camera = CameraPhase::Starting;
        }

        Task::none()
    }

    pub(crate) fn handle_select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if index >= self.available_cameras.len() || index == self.current_camera_index {
            return Task::none();
        }

        let camera = &self.available_cameras[index];
        info!(index, name = %camera.name, "Selecting camera");

        self.current_camera_index = index;
        self.current_frame = None;
        self.preview_handle = None;
        if self.permission.is_granted() {
            // Subscription id includes the index, so this restarts the stream
            self.camera = CameraPhase::Starting;
        }

        self.config.last_camera_path = Some(camera.path.clone());
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save camera selection");
        }

        Task::none()
    }

    pub(crate) fn handle_camera_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        static FRAME_MSG_COUNT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let count = FRAME_MSG_COUNT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if count % crate::constants::timing::FRAME_LOG_INTERVAL == 0 {
            info!(
                message = count,
                width = frame.width,
                height = frame.height,
                latency_ms = frame.captured_at.elapsed().as_millis() as u64,
                "Camera frame received"
            );
        }

        if self.camera == CameraPhase::Starting {
            info!("First frame received, camera is streaming");
            self.camera = CameraPhase::Streaming;
        }

        // Offer the frame to the decode worker; an undelivered predecessor
        // is overwritten (latest-only policy).
        self.frame_slot.publish(Arc::clone(&frame));

        self.preview_handle = Some(cosmic::widget::image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.packed_rgba(),
        ));
        self.current_frame = Some(frame);

        Task::none()
    }

    pub(crate) fn handle_camera_bind_failed(
        &mut self,
        error: String,
    ) -> Task<cosmic::Action<Message>> {
        error!(error = %error, "Camera bind failed");
        self.camera = CameraPhase::Failed(error);
        Task::none()
    }

    pub(crate) fn handle_camera_stream_ended(&mut self) -> Task<cosmic::Action<Message>> {
        if self.camera.wants_stream() {
            warn!("Camera frame stream ended unexpectedly");
            self.camera = CameraPhase::Failed("Camera stream ended".to_string());
        }
        Task::none()
    }

    pub(crate) fn handle_retry_camera(&mut self) -> Task<cosmic::Action<Message>> {
        info!(epoch = self.camera_epoch + 1, "Retrying camera bind");
        self.camera_epoch += 1;
        self.camera = CameraPhase::Starting;
        Task::none()
    }
}
