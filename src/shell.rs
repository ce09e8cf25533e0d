//! Opens the dashboard in the user's browser once the server is up.
//!
//! The browser is not owned by this process: closing the tab leaves the
//! server running until Ctrl-C.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Wait `delay` for the listener to settle, then open `url`.
///
/// A launcher failure is logged; the server keeps running and the URL can be
/// opened by hand.
pub async fn open_after(delay: Duration, url: String) {
    tokio::time::sleep(delay).await;
    match open_window(&url) {
        Ok(_) => info!(%url, "Opened dashboard window"),
        Err(e) => warn!(%url, "Could not open a window ({e}); open the URL manually"),
    }
}

/// Launch the platform URL opener. The returned task reaps the launcher.
pub fn open_window(url: &str) -> Result<JoinHandle<Option<ExitStatus>>, AppError> {
    spawn_reaped(launcher(url))
}

fn spawn_reaped(mut cmd: Command) -> Result<JoinHandle<Option<ExitStatus>>, AppError> {
    let mut child = cmd
        .spawn()
        .map_err(|e| AppError::Internal(format!("failed to launch browser: {e}")))?;

    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                debug!(%status, "Browser launcher exited");
                Some(status)
            }
            Err(e) => {
                warn!("Could not wait for browser launcher: {e}");
                None
            }
        }
    }))
}

#[cfg(target_os = "windows")]
fn launcher(url: &str) -> Command {
    // The URL protocol handler always picks the default browser.
    let mut cmd = Command::new("rundll32.exe");
    cmd.arg("url.dll,FileProtocolHandler").arg(url);
    cmd
}

#[cfg(target_os = "macos")]
fn launcher(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(all(unix, not(target_os = "macos")))]
fn launcher(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
