// SPDX-License-Identifier: GPL-3.0-only

//! Main application module for COSMIC QR Scanner
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, CameraPhase, ScanState)
//! - `frame_processor`: Decode pipeline (slot, analyzer, detector)
//! - `camera_preview`: Camera preview widget
//! - `settings`: Settings drawer UI
//! - `view`: Main view rendering
//! - `update`: Message handling
//! - `handlers`: Per-domain message handlers

mod camera_preview;
mod handlers;
mod settings;
mod state;
mod update;
mod view;

pub mod frame_processor;

use crate::backends::camera::types::{CameraDevice, CameraFormat};
use crate::backends::camera::{PipelineHandle, enumerate_cameras};
use crate::config::Config;
use crate::constants::pipeline;
use crate::fl;
use crate::permission;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::Subscription;
use cosmic::iced::futures::{SinkExt, StreamExt};
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
use frame_processor::tasks::QrDetector;
use frame_processor::{FrameAnalyzer, FrameSlot, QrAction};
pub use state::{AppModel, CameraPhase, ContextPage, Message, ScanState};
use std::sync::Arc;
use tracing::{error, info};

const REPOSITORY: &str = "https://github.com/cosmic-utils/qr-scanner";
const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.cosmic-utils.QrScanner.svg"
);

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.cosmic-utils.QrScanner";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Create the about widget
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            permission: crate::permission::PermissionState::NotRequested,
            camera: CameraPhase::Inactive,
            camera_epoch: 0,
            available_cameras: Vec::new(),
            current_camera_index: 0,
            camera_dropdown_options: Vec::new(),
            theme_dropdown_options: vec![
                fl!("theme-system"),
                fl!("theme-dark"),
                fl!("theme-light"),
            ],
            current_frame: None,
            preview_handle: None,
            frame_slot: FrameSlot::new(),
            scan: ScanState::default(),
        };

        // Ask the portal for camera access right away; the pipeline stays
        // inert until this resolves to Granted.
        let permission_task = Task::perform(permission::resolve_camera_access(), |state| {
            cosmic::Action::App(Message::PermissionResolved(state))
        });

        // Enumerate cameras asynchronously (shells out to pw-cli)
        let last_camera_path = app.config.last_camera_path.clone();
        let enumerate_task = Task::perform(
            async move {
                let cameras = tokio::task::spawn_blocking(enumerate_cameras)
                    .await
                    .unwrap_or_default();

                // Restore the last used camera when it is still present
                let index = last_camera_path
                    .and_then(|path| cameras.iter().position(|cam| cam.path == path))
                    .unwrap_or(0);

                (cameras, index)
            },
            |(cameras, index)| cosmic::Action::App(Message::CamerasEnumerated(cameras, index)),
        );

        (app, Task::batch([permission_task, enumerate_task]))
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::Settings))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Result dialog: decoded text with copy / open-in-browser / cancel.
    fn dialog(&self) -> Option<Element<'_, Self::Message>> {
        if !self.scan.dialog_open {
            return None;
        }
        let detection = self.scan.latest.as_ref()?;

        let mut dialog = widget::dialog()
            .title(fl!("code-found"))
            .body(detection.content.clone())
            .primary_action(
                widget::button::suggested(fl!("copy"))
                    .on_press(Message::CopyScanText(detection.content.clone())),
            )
            .secondary_action(
                widget::button::standard(fl!("cancel")).on_press(Message::DismissScanDialog),
            );

        if let QrAction::Url(url) = &detection.action {
            dialog = dialog.tertiary_action(
                widget::button::text(fl!("open-in-browser"))
                    .on_press(Message::OpenScanUrl(url.clone())),
            );
        }

        Some(dialog.into())
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        Subscription::batch([
            config_sub,
            self.camera_subscription(),
            self.analyzer_subscription(),
        ])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}

impl AppModel {
    /// Camera stream subscription.
    ///
    /// Only runs while permission is granted and the camera phase wants a
    /// stream; the id includes the epoch and camera index so retries and
    /// camera switches tear the pipeline down and bind a fresh one.
    fn camera_subscription(&self) -> Subscription<Message> {
        if !self.permission.is_granted()
            || !self.camera.wants_stream()
            || self.available_cameras.is_empty()
        {
            return Subscription::none();
        }

        let device = self
            .available_cameras
            .get(self.current_camera_index)
            .cloned()
            .unwrap_or_else(CameraDevice::auto_select);
        let format = CameraFormat::default();

        Subscription::run_with_id(
            ("camera", self.camera_epoch, self.current_camera_index),
            cosmic::iced::stream::channel(
                pipeline::UI_CHANNEL_CAPACITY,
                move |mut output| async move {
                    info!(device = %device.name, "Camera subscription started");

                    let (sender, mut receiver) =
                        futures::channel::mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);

                    // Bind on a blocking task; GStreamer state changes can stall
                    let bind = tokio::task::spawn_blocking(move || {
                        PipelineHandle::bind(&device, &format, sender)
                    })
                    .await;

                    // The handle must stay alive for the stream's lifetime;
                    // dropping it stops the pipeline and releases the camera.
                    let _handle = match bind {
                        Ok(Ok(handle)) => handle,
                        Ok(Err(e)) => {
                            let _ = output.send(Message::CameraBindFailed(e.to_string())).await;
                            return;
                        }
                        Err(e) => {
                            let _ = output
                                .send(Message::CameraBindFailed(format!("bind task failed: {e}")))
                                .await;
                            return;
                        }
                    };

                    while let Some(frame) = receiver.next().await {
                        match output.try_send(Message::CameraFrame(Arc::new(frame))) {
                            Ok(()) => {}
                            Err(e) if e.is_disconnected() => {
                                info!("Output channel disconnected, camera subscription ending");
                                return;
                            }
                            // UI busy: drop the frame, the next one supersedes it
                            Err(_) => {}
                        }
                    }

                    let _ = output.send(Message::CameraStreamEnded).await;
                },
            ),
        )
    }

    /// Decode worker subscription.
    ///
    /// Started once for the process lifetime; the worker drains the frame
    /// slot and its results are forwarded as messages.
    fn analyzer_subscription(&self) -> Subscription<Message> {
        let slot = Arc::clone(&self.frame_slot);

        Subscription::run_with_id(
            "frame-analyzer",
            cosmic::iced::stream::channel(4, move |mut output| async move {
                info!("Frame analyzer started");

                let (results_tx, mut results_rx) = futures::channel::mpsc::channel(4);
                let analyzer = FrameAnalyzer::new(QrDetector::new(), slot);
                tokio::spawn(analyzer.run(results_tx));

                while let Some(batch) = results_rx.next().await {
                    if output.send(Message::ScanResults(batch)).await.is_err() {
                        break;
                    }
                }
            }),
        )
    }
}
