use log::{debug, warn};
use notify_rust::Notification;

use crate::config::APP_NAME;

/// Fire-and-forget user feedback. Implementations must never fail the
/// caller.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        debug!("Notification: {} - {}", title, message);
        if let Err(e) = Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(message)
            .show()
        {
            warn!("Failed to show notification: {}", e);
        }
    }
}
