//! Tracing capture for asserting on log output
//!
//! Installs as a thread-scoped subscriber so concurrently running tests do
//! not see each other's events.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

/// One captured event, reduced to what assertions need.
#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub message: String,
}

/// Layer that records every event's message for later inspection.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this capture as the current thread's subscriber. Events are
    /// recorded for as long as the returned guard lives.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn records(&self) -> Vec<CapturedLog> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.count_matching(pattern) > 0
    }

    /// How many captured messages contain `pattern`.
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| r.message.contains(pattern))
            .count()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
            // Debug formatting wraps string messages in quotes.
            if self.0.starts_with('"') && self.0.ends_with('"') {
                self.0 = self.0[1..self.0.len() - 1].to_string();
            }
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for LogCapture
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);

        self.records.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_only_while_the_guard_lives() {
        let capture = LogCapture::new();
        {
            let _guard = capture.install();
            tracing::info!("pass finished cleanly");
            tracing::debug!(extra = 1, "retrying unit");
        }
        tracing::info!("emitted after the guard dropped");

        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::INFO);
        assert_eq!(records[0].message, "pass finished cleanly");
        assert_eq!(capture.count_matching("retrying"), 1);
        assert!(!capture.contains("after the guard"));
        assert_eq!(capture.messages().len(), 2);
    }
}
