// SPDX-License-Identifier: GPL-3.0-only

//! Scan result handlers
//!
//! Handles decode results from the analyzer, clipboard copy, and opening
//! URLs in the browser.

use crate::app::frame_processor::QrDetection;
use crate::app::state::{AppModel, Message};
use cosmic::Task;
use tracing::{error, info, warn};

impl AppModel {
    pub(crate) fn handle_scan_results(
        &mut self,
        detections: Vec<QrDetection>,
    ) -> Task<cosmic::Action<Message>> {
        if detections.len() > 1 {
            // Viewfinder scanning targets one code at a time; extra codes in
            // the same frame are ignored.
            warn!(count = detections.len(), "Multiple QR codes in frame, using the first");
        }

        let Some(detection) = detections.into_iter().next() else {
            return Task::none();
        };

        info!(len = detection.content.len(), "Scan result received");

        let content = detection.content.clone();
        let opened = self.scan.record(detection);

        if opened && self.config.copy_on_scan {
            return self.handle_copy_scan_text(content);
        }

        Task::none()
    }

    pub(crate) fn handle_dismiss_scan_dialog(&mut self) -> Task<cosmic::Action<Message>> {
        self.scan.dismiss();
        Task::none()
    }

    pub(crate) fn handle_copy_scan_text(&self, text: String) -> Task<cosmic::Action<Message>> {
        info!(text_length = text.len(), "Copying scan result to clipboard");
        cosmic::iced::clipboard::write(text).map(|_: ()| cosmic::Action::App(Message::Noop))
    }

    pub(crate) fn handle_open_scan_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        info!(url = %url, "Opening URL from QR code");
        match open::that_detached(&url) {
            Ok(()) => info!("URL opened successfully"),
            Err(err) => error!(url = %url, error = %err, "Failed to open URL"),
        }
        Task::none()
    }
}
