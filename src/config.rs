use std::env;
use std::time::Duration;

pub const DEFAULT_BREAKPOINT: u32 = 768;
pub const DEFAULT_LOADING_MS: u64 = 1000;
pub const DEFAULT_REVEAL_MS: u64 = 100;
pub const DEFAULT_REVEAL_TRANSITION: &str = "width 1.5s ease-in-out";
pub const DEFAULT_EXPORT_FILE: &str = "matches_export.json";
pub const DEFAULT_MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Widths strictly below this are treated as mobile.
    pub breakpoint: u32,
    pub loading_delay: Duration,
    pub reveal_delay: Duration,
    pub reveal_transition: String,
    pub export_file: String,
    pub max_logs: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT,
            loading_delay: Duration::from_millis(DEFAULT_LOADING_MS),
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_MS),
            reveal_transition: DEFAULT_REVEAL_TRANSITION.to_string(),
            export_file: DEFAULT_EXPORT_FILE.to_string(),
            max_logs: DEFAULT_MAX_LOGS,
        }
    }
}

impl BoardConfig {
    /// Overrides timings and the export file name from `MATCH_BOARD_*`
    /// variables. The breakpoint is left to the host, see `with_breakpoint`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let loading_ms = lookup("MATCH_BOARD_LOADING_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_LOADING_MS)
            .min(60_000);
        let reveal_ms = lookup("MATCH_BOARD_REVEAL_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REVEAL_MS)
            .min(10_000);
        let export_file = lookup("MATCH_BOARD_EXPORT_FILE")
            .filter(|val| !val.trim().is_empty())
            .unwrap_or(defaults.export_file.clone());
        Self {
            loading_delay: Duration::from_millis(loading_ms),
            reveal_delay: Duration::from_millis(reveal_ms),
            export_file,
            ..defaults
        }
    }

    pub fn with_breakpoint(mut self, breakpoint: u32) -> Self {
        self.breakpoint = breakpoint.max(1);
        self
    }
}
