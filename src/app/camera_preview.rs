// SPDX-License-Identifier: GPL-3.0-only

//! Camera preview widget
//!
//! The pipeline delivers RGBA frames, so the preview is a plain image
//! widget over a handle rebuilt per frame. The preview reads frames
//! independently of the analyzer: a frame dropped by the decode slot is
//! still shown here.

use crate::app::state::{AppModel, Message};
use cosmic::Element;
use cosmic::iced::{Background, Color, ContentFit, Length};
use cosmic::widget;

impl AppModel {
    /// Build the camera preview element.
    ///
    /// Shows the latest frame letterboxed on black, or plain black while no
    /// frame has arrived yet.
    pub(crate) fn build_camera_preview(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.preview_handle {
            Some(handle) => widget::image::Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => widget::Space::new(Length::Fill, Length::Fill).into(),
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
}
