// SPDX-License-Identifier: GPL-3.0-only

//! Settings drawer view

use crate::app::state::{AppModel, Message};
use crate::config::AppTheme;
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::Length;
use cosmic::widget;

impl AppModel {
    /// Create the settings view for the context drawer
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        // Theme dropdown
        let current_theme_index = match self.config.app_theme {
            AppTheme::System => 0,
            AppTheme::Dark => 1,
            AppTheme::Light => 2,
        };
        let theme_dropdown = widget::dropdown(
            &self.theme_dropdown_options,
            Some(current_theme_index),
            Message::SetAppTheme,
        );

        // Camera selection dropdown
        let camera_dropdown = widget::dropdown(
            &self.camera_dropdown_options,
            Some(self.current_camera_index),
            Message::SelectCamera,
        );

        // Copy-on-scan toggle
        let copy_toggle =
            widget::toggler(self.config.copy_on_scan).on_toggle(|_| Message::ToggleCopyOnScan);

        let version_info = format!("Version {}", env!("GIT_VERSION"));

        // Negotiated capture resolution, once frames are flowing
        let resolution_caption: Element<'_, Message> = match &self.current_frame {
            Some(frame) => widget::text(format!("{}x{}", frame.width, frame.height))
                .size(12)
                .into(),
            None => widget::Space::new(Length::Shrink, Length::Shrink).into(),
        };

        let settings_column: Element<'_, Message> = widget::column()
            .push(widget::text(fl!("camera")).size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(camera_dropdown)
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(resolution_caption)
            .push(widget::vertical_space().height(spacing.space_s))
            .push(widget::text(fl!("theme")).size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(theme_dropdown)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::row()
                    .push(
                        widget::text(fl!("copy-on-scan"))
                            .size(16)
                            .font(cosmic::font::bold()),
                    )
                    .push(widget::horizontal_space().width(Length::Fill))
                    .push(copy_toggle)
                    .align_y(cosmic::iced::Alignment::Center),
            )
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(crate::app::state::ContextPage::Settings),
        )
        .title(fl!("settings"))
    }
}
