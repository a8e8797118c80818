use std::sync::Arc;

/// Receives the plain-text status lines the capture loop reports.
pub type MessageSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink that writes each line to standard output.
pub fn stdout_sink() -> MessageSink {
    Arc::new(|line: &str| println!("{line}"))
}
