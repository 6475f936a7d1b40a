// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! The view is a pure projection of the model: permission state selects the
//! top-level stage, the camera phase selects what the camera stage shows.

use crate::app::state::{AppModel, CameraPhase, Message};
use crate::fl;
use crate::permission::PermissionState;
use cosmic::Element;
use cosmic::iced::alignment::{Horizontal, Vertical};
use cosmic::iced::{Alignment, Background, Color, Length};
use cosmic::widget;

/// Top-level view stage selected by the permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStage {
    /// Waiting for the portal to answer
    RequestingPermission,
    /// Access denied: rationale with retry and settings actions
    PermissionDenied,
    /// Access granted: preview / bind failure / starting
    Camera,
}

/// Select the top-level stage for a permission state.
pub fn stage_for(permission: PermissionState) -> ViewStage {
    match permission {
        PermissionState::NotRequested => ViewStage::RequestingPermission,
        PermissionState::Denied => ViewStage::PermissionDenied,
        PermissionState::Granted => ViewStage::Camera,
    }
}

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match stage_for(self.permission) {
            ViewStage::RequestingPermission => self.build_waiting_view(),
            ViewStage::PermissionDenied => self.build_permission_view(),
            ViewStage::Camera => self.build_camera_view(),
        };

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into()
    }

    fn build_waiting_view(&self) -> Element<'_, Message> {
        centered(
            widget::text(fl!("permission-waiting"))
                .size(16)
                .into(),
        )
    }

    /// Rationale shown while camera access is denied.
    fn build_permission_view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let column = widget::column()
            .push(widget::text(fl!("permission-rationale")).size(16))
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::button::suggested(fl!("request-permission"))
                    .on_press(Message::RequestPermission),
            )
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::text(fl!("permission-denied-settings")).size(12))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(
                widget::button::standard(fl!("open-settings"))
                    .on_press(Message::OpenSystemSettings),
            )
            .align_x(Alignment::Center)
            .spacing(0);

        centered(column.into())
    }

    fn build_camera_view(&self) -> Element<'_, Message> {
        match &self.camera {
            CameraPhase::Failed(error) => self.build_bind_failure_view(error),
            CameraPhase::Inactive | CameraPhase::Starting if self.preview_handle.is_none() => {
                let spacing = cosmic::theme::spacing();
                let column = widget::column()
                    .push(widget::text(fl!("camera-starting")).size(16))
                    .push(widget::vertical_space().height(spacing.space_xxs))
                    .push(self.camera_caption())
                    .align_x(Alignment::Center)
                    .spacing(0);
                centered(column.into())
            }
            _ => self.build_preview_with_result(),
        }
    }

    /// Bind failures are shown, not swallowed: error text plus a retry.
    fn build_bind_failure_view<'a>(&'a self, error: &'a str) -> Element<'a, Message> {
        let spacing = cosmic::theme::spacing();

        let column = widget::column()
            .push(widget::text(fl!("camera-failed")).size(16))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(widget::text(error).size(12))
            .push(widget::vertical_space().height(spacing.space_s))
            .push(widget::button::suggested(fl!("retry")).on_press(Message::RetryCamera))
            .align_x(Alignment::Center)
            .spacing(0);

        centered(column.into())
    }

    /// Live preview with the latest decoded payload overlaid at the bottom.
    fn build_preview_with_result(&self) -> Element<'_, Message> {
        let preview = self.build_camera_preview();

        let Some(detection) = self.scan.latest.as_ref().filter(|_| !self.scan.dialog_open) else {
            return preview;
        };

        let spacing = cosmic::theme::spacing();

        let chip = widget::container(
            widget::row()
                .push(widget::text(detection.content.as_str()).size(14))
                .push(widget::horizontal_space().width(spacing.space_xs))
                .push(
                    widget::button::icon(widget::icon::from_name("edit-copy-symbolic"))
                        .on_press(Message::CopyScanText(detection.content.clone())),
                )
                .align_y(Alignment::Center)
                .spacing(0),
        )
        .padding(spacing.space_xs)
        .style(|_theme| widget::container::Style {
            background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
            ..Default::default()
        });

        let chip_layer = widget::container(chip)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Bottom)
            .padding(spacing.space_m);

        cosmic::iced::widget::stack![preview, chip_layer]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Caption under the "starting" message: current camera name, if known.
    fn camera_caption(&self) -> Element<'_, Message> {
        match self.available_cameras.get(self.current_camera_index) {
            Some(camera) => widget::text(camera.name.as_str()).size(12).into(),
            None => widget::text(fl!("no-cameras")).size(12).into(),
        }
    }
}

/// Center an element in the window.
fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    widget::container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Center)
        .align_y(Vertical::Center)
        .padding(16)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_selects_rationale_stage() {
        assert_eq!(
            stage_for(PermissionState::Denied),
            ViewStage::PermissionDenied
        );
    }

    #[test]
    fn granting_after_denial_selects_camera_stage() {
        // Same process, no restart: the stage follows the state transition
        let mut permission = PermissionState::Denied;
        assert_eq!(stage_for(permission), ViewStage::PermissionDenied);

        permission = PermissionState::Granted;
        assert_eq!(stage_for(permission), ViewStage::Camera);
    }

    #[test]
    fn not_requested_waits() {
        assert_eq!(
            stage_for(PermissionState::NotRequested),
            ViewStage::RequestingPermission
        );
    }
}
