// SPDX-License-Identifier: GPL-3.0-only

//! UI and settings handlers
//!
//! Handles navigation, configuration changes, and the permission flow.

use crate::app::state::{AppModel, CameraPhase, ContextPage, Message};
use crate::config::AppTheme;
use crate::permission::{self, PermissionState};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use tracing::{error, info, warn};

impl AppModel {
    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    pub(crate) fn handle_update_config(
        &mut self,
        config: crate::config::Config,
    ) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");
        self.config = config;
        Task::none()
    }

    pub(crate) fn handle_set_app_theme(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let app_theme = match index {
            0 => AppTheme::System,
            1 => AppTheme::Dark,
            2 => AppTheme::Light,
            _ => return Task::none(),
        };

        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;

        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save app theme setting");
        }

        cosmic::command::set_theme(app_theme.theme())
    }

    pub(crate) fn handle_toggle_copy_on_scan(&mut self) -> Task<cosmic::Action<Message>> {
        self.config.copy_on_scan = !self.config.copy_on_scan;
        info!(enabled = self.config.copy_on_scan, "Copy-on-scan toggled");

        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save copy-on-scan setting");
        }

        Task::none()
    }

    // =========================================================================
    // Permission Handlers
    // =========================================================================

    pub(crate) fn handle_permission_resolved(
        &mut self,
        state: PermissionState,
    ) -> Task<cosmic::Action<Message>> {
        info!(?state, "Camera permission resolved");
        self.permission = state;

        if self.permission.is_granted() {
            if !self.available_cameras.is_empty() {
                self.camera = CameraPhase::Starting;
            }
        } else {
            // Denied: the pipeline stays inert and the sink stays empty
            self.camera = CameraPhase::Inactive;
        }

        Task::none()
    }

    pub(crate) fn handle_request_permission(&mut self) -> Task<cosmic::Action<Message>> {
        info!("Requesting camera permission");
        Task::perform(permission::resolve_camera_access(), |state| {
            cosmic::Action::App(Message::PermissionResolved(state))
        })
    }

    pub(crate) fn handle_open_system_settings(&self) -> Task<cosmic::Action<Message>> {
        info!("Opening system settings");
        match std::process::Command::new("cosmic-settings").spawn() {
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Failed to launch system settings"),
        }
        Task::none()
    }
}
