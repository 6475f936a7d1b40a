// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function is a dispatcher; the handling code lives in
//! the `handlers` submodules organized by functional domain:
//!
//! - `handlers::ui`: navigation, settings, permission flow
//! - `handlers::camera`: enumeration, frames, bind failures
//! - `handlers::scan`: decode results, clipboard, browser

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to the handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::ToggleCopyOnScan => self.handle_toggle_copy_on_scan(),

            // ===== Permission =====
            Message::PermissionResolved(state) => self.handle_permission_resolved(state),
            Message::RequestPermission => self.handle_request_permission(),
            Message::OpenSystemSettings => self.handle_open_system_settings(),

            // ===== Camera =====
            Message::CamerasEnumerated(cameras, index) => {
                self.handle_cameras_enumerated(cameras, index)
            }
            Message::SelectCamera(index) => self.handle_select_camera(index),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::CameraBindFailed(error) => self.handle_camera_bind_failed(error),
            Message::CameraStreamEnded => self.handle_camera_stream_ended(),
            Message::RetryCamera => self.handle_retry_camera(),

            // ===== Scan results =====
            Message::ScanResults(detections) => self.handle_scan_results(detections),
            Message::DismissScanDialog => self.handle_dismiss_scan_dialog(),
            Message::CopyScanText(text) => self.handle_copy_scan_text(text),
            Message::OpenScanUrl(url) => self.handle_open_scan_url(url),

            Message::Noop => Task::none(),
        }
    }
}
