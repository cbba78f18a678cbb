//! Structured run logging.
//!
//! Every lifecycle event of a run carries the same `run_id` and `topic`
//! fields so one run can be followed through interleaved output.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Run logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    topic: String,
}

impl RunLogger {
    /// Create a logger for a new run with a fresh id.
    pub fn new(topic: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), topic)
    }

    pub fn with_id(run_id: &str, topic: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            topic: topic.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, topic = %self.topic, "Run started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, topic = %self.topic, "Run progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, topic = %self.topic, "Run warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, topic = %self.topic, "Run error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, topic = %self.topic, "Run completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, topic = %self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("cats");
        assert_eq!(logger.topic(), "cats");
        assert!(Uuid::parse_str(logger.run_id()).is_ok());
        assert_ne!(RunLogger::new("cats").run_id(), logger.run_id());
    }

    #[test]
    fn test_run_logger_with_id() {
        let logger = RunLogger::with_id("run-123", "dogs");
        assert_eq!(logger.run_id(), "run-123");
        assert_eq!(logger.topic(), "dogs");
    }
}
