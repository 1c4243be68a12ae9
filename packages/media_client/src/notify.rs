/// Blocking user dialogs of the hosting view.
pub trait UserNotifier: Send + Sync {
    fn alert(&self, message: &str);

    /// Asks the user for a line of text, `None` when cancelled.
    fn prompt(&self, _message: &str) -> Option<String> {
        None
    }
}

/// Headless notifier which only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("[LogNotifier] alert: {message}");
    }
}
