// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use qr_scanner::Config;
use qr_scanner::config::AppTheme;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.app_theme, AppTheme::System);
    assert_eq!(config.last_camera_path, None);
    assert!(
        !config.copy_on_scan,
        "Clipboard copy should be user-triggered by default"
    );
}
