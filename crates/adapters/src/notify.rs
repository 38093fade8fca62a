// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::sink::{ResultSink, SinkError};
use async_trait::async_trait;
use savehook_core::Report;

/// Desktop notification sink using notify-rust.
///
/// Only failures are shown unless `notify_on_success` is set, so routine
/// saves stay quiet.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to send
/// notifications via the Notification Center. The first notification triggers
/// `ensure_application_set()` which runs an AppleScript to look up a bundle
/// identifier. In a background process without Automation permissions, that
/// AppleScript blocks forever. We pre-set the bundle identifier at construction
/// time to bypass the lookup entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifySink {
    notify_on_success: bool,
}

impl DesktopNotifySink {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self { notify_on_success: false }
    }

    pub fn notify_on_success(mut self, enabled: bool) -> Self {
        self.notify_on_success = enabled;
        self
    }

    /// Whether `report` should produce a notification.
    pub fn wants(&self, report: &Report) -> bool {
        report.is_error() || self.notify_on_success
    }
}

/// Notification title for a report.
pub(crate) fn title(report: &Report) -> String {
    if report.is_error() {
        format!("savehook: {} ({})", report.file.display_name(), report.outcome)
    } else {
        format!("savehook: {}", report.file.display_name())
    }
}

#[async_trait]
impl ResultSink for DesktopNotifySink {
    async fn deliver(&self, report: &Report) -> Result<(), SinkError> {
        if !self.wants(report) {
            return Ok(());
        }
        let title = title(report);
        let message = report.message.clone();
        // notify_rust::Notification::show() is synchronous on macOS.
        // Fire-and-forget on tokio's bounded blocking thread pool to avoid
        // blocking the async runtime while capping OS thread count.
        tokio::task::spawn_blocking(move || {
            tracing::debug!(%title, %message, "sending desktop notification");
            match notify_rust::Notification::new().summary(&title).body(&message).show() {
                Ok(_) => tracing::debug!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
