//! Usage tracking for LLM calls
//!
//! A small JSON file tallies call counts and token volume by day and by
//! model. The file is read once at startup (absent or corrupt files
//! zero-initialize) and rewritten in full after each logged call.

use crate::error::AssistantError;
use crate::Result;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailyUsage {
    pub calls: u64,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelUsage {
    pub calls: u64,
    pub tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLog {
    pub total_calls: u64,
    pub total_tokens: u64,
    pub daily_usage: BTreeMap<String, DailyUsage>,
    pub model_usage: BTreeMap<String, ModelUsage>,
    pub last_updated: DateTime<Utc>,
}

impl Default for UsageLog {
    fn default() -> Self {
        Self {
            total_calls: 0,
            total_tokens: 0,
            daily_usage: BTreeMap::new(),
            model_usage: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

/// File-backed usage counter.
pub struct UsageTracker {
    path: PathBuf,
    log: UsageLog,
}

impl UsageTracker {
    /// Load existing usage data, or start from zero when the file is
    /// absent or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let log = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(log) => log,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt usage log, starting fresh");
                    UsageLog::default()
                }
            },
            Err(_) => UsageLog::default(),
        };

        Self { path, log }
    }

    pub fn log(&self) -> &UsageLog {
        &self.log
    }

    /// Record one API call and rewrite the log file.
    pub fn log_call(
        &mut self,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        cost: Option<f64>,
    ) -> Result<()> {
        let today = today_key();
        let total_tokens = input_tokens + output_tokens;

        self.log.total_calls += 1;
        self.log.total_tokens += total_tokens;

        let daily = self.log.daily_usage.entry(today).or_default();
        daily.calls += 1;
        daily.tokens += total_tokens;
        if let Some(cost) = cost {
            daily.cost += cost;
        }

        let per_model = self.log.model_usage.entry(model.to_string()).or_default();
        per_model.calls += 1;
        per_model.tokens += total_tokens;

        debug!(model, total_tokens, "Logged LLM call");

        self.save()
    }

    /// Formatted usage summary: totals, today, per-model breakdown.
    pub fn summary(&self) -> String {
        let today = today_key();

        let mut out = format!(
            "📊 Usage Summary\n\
             ==================\n\
             Total API calls: {}\n\
             Total tokens: {}\n\n\
             📅 Today ({})\n",
            self.log.total_calls, self.log.total_tokens, today
        );

        match self.log.daily_usage.get(&today) {
            Some(daily) => {
                out.push_str(&format!("Calls: {}\nTokens: {}\n", daily.calls, daily.tokens));
                if daily.cost > 0.0 {
                    out.push_str(&format!("Cost: ${:.4}\n", daily.cost));
                }
            }
            None => out.push_str("No usage today\n"),
        }

        out.push_str("\n🤖 Model Usage\n");
        for (model, usage) in &self.log.model_usage {
            out.push_str(&format!(
                "{}: {} calls, {} tokens\n",
                model, usage.calls, usage.tokens
            ));
        }

        out
    }

    fn save(&mut self) -> Result<()> {
        self.log.last_updated = Utc::now();
        let contents = serde_json::to_string_pretty(&self.log)
            .map_err(|e| AssistantError::UsageError(format!("Could not encode usage log: {}", e)))?;
        fs::write(&self.path, contents).map_err(|e| {
            AssistantError::UsageError(format!(
                "Could not write {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

fn today_key() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absent_file_zero_initializes() {
        let dir = tempdir().unwrap();
        let tracker = UsageTracker::load(dir.path().join("usage_log.json"));

        assert_eq!(tracker.log().total_calls, 0);
        assert_eq!(tracker.log().total_tokens, 0);
        assert!(tracker.log().daily_usage.is_empty());
    }

    #[test]
    fn test_corrupt_file_zero_initializes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");
        fs::write(&path, "not json at all {").unwrap();

        let tracker = UsageTracker::load(&path);
        assert_eq!(tracker.log().total_calls, 0);
    }

    #[test]
    fn test_log_call_updates_all_buckets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");

        let mut tracker = UsageTracker::load(&path);
        tracker.log_call("gpt-4o-mini", 100, 50, None).unwrap();
        tracker.log_call("gpt-4o-mini", 20, 10, Some(0.01)).unwrap();

        assert_eq!(tracker.log().total_calls, 2);
        assert_eq!(tracker.log().total_tokens, 180);

        let daily = tracker.log().daily_usage.get(&today_key()).unwrap();
        assert_eq!(daily.calls, 2);
        assert_eq!(daily.tokens, 180);
        assert!((daily.cost - 0.01).abs() < 1e-9);

        let per_model = tracker.log().model_usage.get("gpt-4o-mini").unwrap();
        assert_eq!(per_model.calls, 2);
        assert_eq!(per_model.tokens, 180);
    }

    #[test]
    fn test_log_round_trips_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");

        {
            let mut tracker = UsageTracker::load(&path);
            tracker.log_call("gpt-4o-mini", 30, 12, None).unwrap();
        }

        let reloaded = UsageTracker::load(&path);
        assert_eq!(reloaded.log().total_calls, 1);
        assert_eq!(reloaded.log().total_tokens, 42);
    }

    #[test]
    fn test_unwritable_path_is_a_usage_error() {
        let dir = tempdir().unwrap();

        // The directory itself is not a writable file path.
        let mut tracker = UsageTracker::load(dir.path());
        let err = tracker.log_call("gpt-4o-mini", 1, 1, None).unwrap_err();

        assert!(matches!(err, AssistantError::UsageError(_)));
        assert!(err.to_string().contains("Usage log error"));
    }

    #[test]
    fn test_summary_mentions_models_and_totals() {
        let dir = tempdir().unwrap();
        let mut tracker = UsageTracker::load(dir.path().join("usage_log.json"));
        tracker.log_call("gpt-4o-mini", 100, 50, None).unwrap();

        let summary = tracker.summary();
        assert!(summary.contains("Total API calls: 1"));
        assert!(summary.contains("gpt-4o-mini: 1 calls, 150 tokens"));
    }
}
