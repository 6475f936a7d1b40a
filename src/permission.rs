// SPDX-License-Identifier: GPL-3.0-only

//! Camera access permission via the XDG desktop portal
//!
//! Camera access is gated by the `org.freedesktop.portal.Camera` portal:
//! the portal pops the system permission dialog and remembers the user's
//! decision. The capture pipeline stays inert until access is granted.
//!
//! Hosts without a camera portal on the session bus (unsandboxed setups
//! on desktops that don't ship one) have no gatekeeper to ask; access is
//! treated as granted there.

use futures::StreamExt;
use std::collections::HashMap;
use tracing::{info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_BUS_NAME: &str = "org.freedesktop.portal.Desktop";
const PORTAL_OBJECT_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Camera permission state
///
/// The pipeline is inert until `Granted`; `Denied` drives the rationale UI
/// with retry and settings-redirect actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Access has not been requested yet this session
    #[default]
    NotRequested,
    /// The user (or portal) denied access
    Denied,
    /// Access is granted; the capture pipeline may bind
    Granted,
}

impl PermissionState {
    /// Whether the capture pipeline may run
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Request camera access, mapping every failure to a state.
///
/// This is the app-facing entry point: portal errors are logged and become
/// `Denied` so the UI always lands in a defined state.
pub async fn resolve_camera_access() -> PermissionState {
    match request_camera_access().await {
        Ok(state) => {
            info!(?state, "Camera access resolved");
            state
        }
        Err(e) => {
            warn!(error = %e, "Camera portal request failed, treating as denied");
            PermissionState::Denied
        }
    }
}

/// Ask the camera portal for access.
///
/// Calls `AccessCamera` and waits for the `Response` signal on the request
/// object. One-shot: there is no cancellation, the caller just awaits.
pub async fn request_camera_access() -> Result<PermissionState, String> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session D-Bus: {}", e))?;

    let camera_proxy = zbus::Proxy::new(
        &connection,
        PORTAL_BUS_NAME,
        PORTAL_OBJECT_PATH,
        CAMERA_INTERFACE,
    )
    .await
    .map_err(|e| format!("Failed to create camera portal proxy: {}", e))?;

    // The portal replies through a Request object whose path is derived
    // from our unique name and the handle token. Subscribe to its Response
    // signal before calling AccessCamera so the reply can't be missed.
    let token = format!("qr_scanner_{}", std::process::id());
    let request_path = expected_request_path(&connection, &token)?;

    let request_proxy = zbus::Proxy::new(
        &connection,
        PORTAL_BUS_NAME,
        request_path.as_str(),
        REQUEST_INTERFACE,
    )
    .await
    .map_err(|e| format!("Failed to create request proxy: {}", e))?;

    let mut responses = request_proxy
        .receive_signal("Response")
        .await
        .map_err(|e| format!("Failed to subscribe to portal response: {}", e))?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));

    let result: Result<OwnedObjectPath, zbus::Error> =
        camera_proxy.call("AccessCamera", &(options,)).await;

    let handle = match result {
        Ok(handle) => handle,
        Err(zbus::Error::MethodError(ref name, _, _)) if is_no_portal_error(name.as_str()) => {
            // No camera portal on this host: native access, nothing to ask
            info!("No camera portal available, assuming native camera access");
            return Ok(PermissionState::Granted);
        }
        Err(e) => return Err(format!("AccessCamera call failed: {}", e)),
    };

    if handle.as_str() != request_path {
        // Older portals may return a different request path; follow it
        warn!(expected = %request_path, got = %handle, "Portal returned unexpected request path");
    }

    let message = responses
        .next()
        .await
        .ok_or_else(|| "Portal response stream ended without a reply".to_string())?;

    let (code, _results): (u32, HashMap<String, OwnedValue>) = message
        .body()
        .deserialize()
        .map_err(|e| format!("Failed to parse portal response: {}", e))?;

    Ok(map_response_code(code))
}

/// Build the request object path the portal will use for our token.
fn expected_request_path(connection: &zbus::Connection, token: &str) -> Result<String, String> {
    let unique_name = connection
        .unique_name()
        .ok_or_else(|| "Connection has no unique name".to_string())?;

    // ":1.42" becomes "1_42" in the request path
    let sender = unique_name.as_str().trim_start_matches(':').replace('.', "_");

    Ok(format!(
        "/org/freedesktop/portal/desktop/request/{}/{}",
        sender, token
    ))
}

/// Whether a D-Bus error name means "there is no portal to ask".
fn is_no_portal_error(name: &str) -> bool {
    matches!(
        name,
        "org.freedesktop.DBus.Error.ServiceUnknown"
            | "org.freedesktop.DBus.Error.NameHasNoOwner"
            | "org.freedesktop.DBus.Error.UnknownInterface"
            | "org.freedesktop.DBus.Error.UnknownMethod"
    )
}

/// Map a portal response code to a permission state.
///
/// 0 = granted, 1 = cancelled by the user, 2 = other failure.
fn map_response_code(code: u32) -> PermissionState {
    match code {
        0 => PermissionState::Granted,
        1 => PermissionState::Denied,
        other => {
            warn!(code = other, "Unexpected portal response code");
            PermissionState::Denied
        }
    }
}
