//! Environment-variable helpers for deployment overrides.
//!
//! Every knob this workspace reads from the environment is optional — the
//! TOML configuration is the source of truth and the environment only
//! overrides deployment-sensitive bits (cache location, headless mode,
//! browser binary path).

/// Reads an optional environment variable.
///
/// Returns `None` when the variable is unset or empty after trimming, so
/// callers can treat `FOO=` the same as an absent `FOO`.
pub fn optional_env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
