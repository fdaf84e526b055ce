use crate::session::{SESSION_INACTIVITY_MS, STORAGE_KEY};

/// Marker class the host page puts on buttons/links it wants tracked.
pub const PRIMARY_ACTION_CLASS: &str = "btn-primary";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub storage_key: String,
    pub inactivity_timeout_ms: i64,
    pub primary_marker: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            inactivity_timeout_ms: SESSION_INACTIVITY_MS,
            primary_marker: PRIMARY_ACTION_CLASS.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn with_inactivity_timeout_secs(mut self, secs: u64) -> Self {
        self.inactivity_timeout_ms = i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_contract() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.storage_key, "activity-tracker-data");
        assert_eq!(cfg.inactivity_timeout_ms, 3_600_000);
        assert_eq!(cfg.primary_marker, "btn-primary");
    }

    #[test]
    fn timeout_override_in_seconds() {
        let cfg = TrackerConfig::default().with_inactivity_timeout_secs(90);
        assert_eq!(cfg.inactivity_timeout_ms, 90_000);
    }
}
