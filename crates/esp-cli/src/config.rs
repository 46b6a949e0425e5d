// SPDX-License-Identifier: MIT OR Apache-2.0
//! Global flag resolution: CLI flags win over environment variables, which
//! win over built-in defaults (`abp-cli::config`'s layering, applied to
//! ESP's two global knobs).

use std::path::PathBuf;

/// Environment fallback for `--cache-dir`.
pub const CACHE_DIR_ENV: &str = "ESP_CACHE_DIR";
/// Environment fallback for `--log-level`.
pub const LOG_LEVEL_ENV: &str = "RUST_LOG";
/// Default log filter when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "esp_cli=info,esp_evaluator=info";

/// Resolve the package resolver cache directory: explicit flag, else
/// `ESP_CACHE_DIR`, else no cache (an in-memory resolver).
#[must_use]
pub fn resolve_cache_dir(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from))
}

/// Resolve the tracing filter string: explicit flag, else `RUST_LOG`, else
/// [`DEFAULT_LOG_LEVEL`].
#[must_use]
pub fn resolve_log_level(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_default() {
        assert_eq!(resolve_log_level(Some("debug".into())), "debug");
    }

    #[test]
    fn default_used_when_nothing_set() {
        // SAFETY for tests: no other test in this process sets RUST_LOG.
        unsafe {
            std::env::remove_var(LOG_LEVEL_ENV);
        }
        assert_eq!(resolve_log_level(None), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn cache_dir_flag_wins_over_env() {
        let flag = PathBuf::from("/flag/cache");
        assert_eq!(resolve_cache_dir(Some(flag.clone())), Some(flag));
    }

    #[test]
    fn cache_dir_defaults_to_none() {
        unsafe {
            std::env::remove_var(CACHE_DIR_ENV);
        }
        assert_eq!(resolve_cache_dir(None), None);
    }
}
