// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::frame_processor::{FrameSlot, QrDetection};
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use crate::config::Config;
use crate::permission::PermissionState;
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::sync::Arc;
use std::time::Instant;

/// Camera pipeline phase
///
/// A failed bind is a phase of its own: the UI shows the error and offers a
/// retry instead of presenting an empty preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CameraPhase {
    /// Pipeline not running (no permission yet, or cameras unknown)
    #[default]
    Inactive,
    /// Bind requested, waiting for the first frame
    Starting,
    /// Frames are flowing
    Streaming,
    /// Bind failed; the message is shown to the user
    Failed(String),
}

impl CameraPhase {
    /// Whether the subscription should keep (or start) running
    pub fn wants_stream(&self) -> bool {
        matches!(self, CameraPhase::Starting | CameraPhase::Streaming)
    }
}

/// Decode result sink
///
/// Holds the most recent decoded payload and drives the result dialog.
/// Repeat-scan policy: a successful scan always overwrites the sink, but
/// the dialog only (re)opens when the payload differs from the one
/// currently shown or last dismissed.
#[derive(Debug, Default)]
pub struct ScanState {
    /// Most recent decoded payload
    pub latest: Option<QrDetection>,
    /// Whether the result dialog is open
    pub dialog_open: bool,
    /// Payload of the last dismissed dialog
    last_dismissed: Option<String>,
    /// When the latest payload was recorded
    pub scanned_at: Option<Instant>,
}

impl ScanState {
    /// Fold a new detection into the sink.
    ///
    /// Returns `true` when the dialog should open for this payload.
    pub fn record(&mut self, detection: QrDetection) -> bool {
        let repeat_of_dismissed = self.last_dismissed.as_deref() == Some(detection.content.as_str());
        let already_showing = self.dialog_open
            && self
                .latest
                .as_ref()
                .is_some_and(|d| d.content == detection.content);

        self.latest = Some(detection);
        self.scanned_at = Some(Instant::now());

        if already_showing || repeat_of_dismissed {
            return false;
        }

        self.dialog_open = true;
        true
    }

    /// Dismiss the dialog; the same payload will not re-open it.
    pub fn dismiss(&mut self) {
        self.dialog_open = false;
        self.last_dismissed = self.latest.as_ref().map(|d| d.content.clone());
    }

    /// Whether any payload has ever been decoded
    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }
}

/// The application model stores app-specific state used to describe its
/// interface and drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,

    /// Camera permission state; the pipeline is inert until granted
    pub permission: PermissionState,
    /// Camera pipeline phase
    pub camera: CameraPhase,
    /// Bumped on retry to force the camera subscription to restart
    pub camera_epoch: u64,
    /// Available camera devices
    pub available_cameras: Vec<CameraDevice>,
    /// Current camera index
    pub current_camera_index: usize,
    /// Dropdown options (cached for UI)
    pub camera_dropdown_options: Vec<String>,
    pub theme_dropdown_options: Vec<String>,

    /// Current camera frame (kept for dimensions and diagnostics)
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Preview image handle rebuilt on each frame
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// Hand-off slot between the capture side and the decode worker
    pub frame_slot: Arc<FrameSlot<Arc<CameraFrame>>>,

    /// Decode result sink
    pub scan: ScanState,
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page (About, Settings)
    ToggleContextPage(ContextPage),

    // ===== Settings =====
    /// Configuration updated externally
    UpdateConfig(Config),
    /// Select application theme by dropdown index
    SetAppTheme(usize),
    /// Toggle automatic clipboard copy on scan
    ToggleCopyOnScan,

    // ===== Permission =====
    /// Portal answered (or was absent)
    PermissionResolved(PermissionState),
    /// User asked to request access again
    RequestPermission,
    /// Open system settings for manual permission changes
    OpenSystemSettings,

    // ===== Camera =====
    /// Cameras enumerated asynchronously during startup
    CamerasEnumerated(Vec<CameraDevice>, usize),
    /// Select specific camera by index
    SelectCamera(usize),
    /// New camera frame received from the pipeline
    CameraFrame(Arc<CameraFrame>),
    /// Binding the camera pipeline failed
    CameraBindFailed(String),
    /// The frame stream ended unexpectedly
    CameraStreamEnded,
    /// Retry after a bind failure
    RetryCamera,

    // ===== Scan results =====
    /// Decode worker produced results
    ScanResults(Vec<QrDetection>),
    /// Close the result dialog
    DismissScanDialog,
    /// Copy decoded text to the clipboard
    CopyScanText(String),
    /// Open decoded URL in the browser
    OpenScanUrl(String),

    /// No-op message for async tasks that don't need a response
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_sink_starts_empty() {
        let scan = ScanState::default();
        assert!(scan.is_empty());
        assert!(!scan.dialog_open);
    }

    #[test]
    fn first_scan_opens_dialog() {
        let mut scan = ScanState::default();
        assert!(scan.record(QrDetection::new("hello".to_string())));
        assert!(scan.dialog_open);
        assert_eq!(scan.latest.as_ref().unwrap().content, "hello");
    }

    #[test]
    fn repeat_scan_is_idempotent_while_showing() {
        let mut scan = ScanState::default();
        assert!(scan.record(QrDetection::new("hello".to_string())));
        // Same payload again: sink refreshes silently
        assert!(!scan.record(QrDetection::new("hello".to_string())));
        assert_eq!(scan.latest.as_ref().unwrap().content, "hello");
        assert!(scan.dialog_open);
    }

    #[test]
    fn dismissed_payload_does_not_reopen() {
        let mut scan = ScanState::default();
        scan.record(QrDetection::new("hello".to_string()));
        scan.dismiss();
        assert!(!scan.dialog_open);

        assert!(!scan.record(QrDetection::new("hello".to_string())));
        assert!(!scan.dialog_open);
    }

    #[test]
    fn different_payload_reopens_after_dismiss() {
        let mut scan = ScanState::default();
        scan.record(QrDetection::new("first".to_string()));
        scan.dismiss();

        assert!(scan.record(QrDetection::new("second".to_string())));
        assert!(scan.dialog_open);
        assert_eq!(scan.latest.as_ref().unwrap().content, "second");
    }

    #[test]
    fn new_payload_replaces_open_dialog_content() {
        let mut scan = ScanState::default();
        scan.record(QrDetection::new("first".to_string()));
        assert!(scan.record(QrDetection::new("second".to_string())));
        assert_eq!(scan.latest.as_ref().unwrap().content, "second");
    }

    #[test]
    fn camera_phase_stream_gating() {
        assert!(!CameraPhase::Inactive.wants_stream());
        assert!(CameraPhase::Starting.wants_stream());
        assert!(CameraPhase::Streaming.wants_stream());
        assert!(!CameraPhase::Failed("x".to_string()).wants_stream());
    }
}
