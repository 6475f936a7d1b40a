// SPDX-License-Identifier: GPL-3.0-only

//! Camera discovery through PipeWire
//!
//! PipeWire does not ship a stable Rust enumeration API we can use from a
//! GStreamer-based app, so discovery goes through `pw-cli ls Node` output.
//! When that fails (no pw-cli, no nodes) the caller gets a single
//! auto-select device and PipeWire picks the default camera itself.

use super::types::CameraDevice;
use tracing::{debug, info, warn};

/// Enumerate available cameras.
///
/// Always returns at least one entry: the PipeWire auto-select fallback.
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    match list_video_source_nodes() {
        Some(cameras) if !cameras.is_empty() => {
            info!(count = cameras.len(), "Found PipeWire camera node(s)");
            cameras
        }
        _ => {
            info!("Using PipeWire auto-selection (default camera)");
            vec![CameraDevice::auto_select()]
        }
    }
}

/// List `Video/Source` nodes via `pw-cli ls Node`.
fn list_video_source_nodes() -> Option<Vec<CameraDevice>> {
    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(parse_node_listing(&stdout))
}

/// One node entry while scanning `pw-cli ls Node` output
#[derive(Default)]
struct NodeEntry {
    id: Option<String>,
    serial: Option<String>,
    name: Option<String>,
    nick: Option<String>,
    is_video_source: bool,
}

impl NodeEntry {
    fn into_device(self) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }
        let id = self.id?;
        let name = self
            .nick
            .or(self.name)
            .unwrap_or_else(|| format!("Camera (node {})", id));

        // Prefer object.serial for target-object, fall back to the node ID
        let path = match self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", id),
        };

        debug!(name = %name, path = %path, "Found video camera");
        Some(CameraDevice { name, path })
    }
}

/// Parse the textual node listing into camera devices.
fn parse_node_listing(listing: &str) -> Vec<CameraDevice> {
    let mut cameras = Vec::new();
    let mut current: Option<NodeEntry> = None;

    for line in listing.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            if let Some(entry) = current.take()
                && let Some(device) = entry.into_device()
            {
                cameras.push(device);
            }

            let id = trimmed
                .strip_prefix("id ")
                .and_then(|rest| rest.split(',').next())
                .map(|id| id.trim().to_string());

            if id.is_none() {
                warn!(line = %trimmed, "Unparseable node header");
            }

            current = Some(NodeEntry {
                id,
                ..NodeEntry::default()
            });
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(value) = property_value(trimmed, "media.class") {
            entry.is_video_source = value == "Video/Source";
        } else if let Some(value) = property_value(trimmed, "object.serial") {
            entry.serial = Some(value);
        } else if let Some(value) = property_value(trimmed, "node.description") {
            entry.name = Some(value);
        } else if let Some(value) = property_value(trimmed, "node.nick") {
            entry.nick = Some(value);
        }
    }

    if let Some(entry) = current
        && let Some(device) = entry.into_device()
    {
        cameras.push(device);
    }

    cameras
}

/// Extract a quoted property value from a `key = "value"` line.
fn property_value(line: &str, key: &str) -> Option<String> {
    let rest = line.strip_prefix(key)?.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    Some(rest.trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"	id 43, type PipeWire:Interface:Node/3
 		object.serial = "43"
 		node.description = "Integrated Camera"
 		media.class = "Video/Source"
	id 51, type PipeWire:Interface:Node/3
 		object.serial = "51"
 		node.description = "Built-in Audio"
 		media.class = "Audio/Source"
	id 76, type PipeWire:Interface:Node/3
 		node.nick = "USB Webcam"
 		media.class = "Video/Source"
"#;

    #[test]
    fn parses_video_sources_only() {
        let cameras = parse_node_listing(LISTING);
        assert_eq!(cameras.len(), 2);

        assert_eq!(cameras[0].name, "Integrated Camera");
        assert_eq!(cameras[0].path, "pipewire-serial-43");

        // No serial: falls back to the node ID
        assert_eq!(cameras[1].name, "USB Webcam");
        assert_eq!(cameras[1].path, "pipewire-76");
    }

    #[test]
    fn empty_listing_yields_no_cameras() {
        assert!(parse_node_listing("").is_empty());
    }

    #[test]
    fn property_value_strips_quotes() {
        assert_eq!(
            property_value(r#"media.class = "Video/Source""#, "media.class"),
            Some("Video/Source".to_string())
        );
        assert_eq!(property_value("unrelated line", "media.class"), None);
    }
}
