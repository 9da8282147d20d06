//! Configuration loading and resolution for the shell.

use a11y_adapt::config::{resolve_api_key, resolve_scratch_dir};
use a11y_adapt::EngineConfig;

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Resolve the listen address.
pub fn resolve_addr(explicit: Option<&str>) -> String {
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Ok(addr) = std::env::var("A11Y_ADDR") {
        if !addr.trim().is_empty() {
            return addr;
        }
    }

    DEFAULT_ADDR.to_string()
}

/// Engine configuration from the environment, with CLI flags on top.
pub fn engine_config(api_key: Option<&str>, scratch_dir: Option<&str>) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if api_key.is_some() {
        config.api_key = resolve_api_key(api_key);
    }
    if scratch_dir.is_some() {
        config.scratch_dir = resolve_scratch_dir(scratch_dir);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_addr_wins() {
        assert_eq!(resolve_addr(Some("0.0.0.0:8080")), "0.0.0.0:8080");
    }

    #[test]
    fn test_flags_override_environment() {
        let config = engine_config(Some("cli-key"), Some("/tmp/a11y-scratch"));
        assert_eq!(config.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.scratch_dir, std::path::PathBuf::from("/tmp/a11y-scratch"));
    }
}
