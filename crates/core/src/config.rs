//! Helpers for reading typed settings from the environment.
//!
//! Loaders take a lookup function instead of reading `std::env` directly so
//! they can be exercised with a fixed map in tests.

use std::str::FromStr;

use crate::error::CoreError;

/// Look up `key` and parse it, falling back to `default` when unset or empty.
pub fn parse_or<T, L>(lookup: &L, key: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    match parse_opt(lookup, key)? {
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

/// Look up `key` and parse it. Unset or blank yields `None`.
pub fn parse_opt<T, L>(lookup: &L, key: &str) -> Result<Option<T>, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CoreError::Validation(format!("{key} has invalid value '{raw}': {e}"))),
        _ => Ok(None),
    }
}

/// Lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
