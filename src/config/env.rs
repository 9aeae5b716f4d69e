//! # Environment Variable Utilities
//!
//! Provides helpers for reading environment variables with common type conversions.
//! Every reader has a `*_from` variant that takes a provider closure, so
//! configuration loading can be tested without touching the process environment.
//!
//! These functions are used by [`IntakeConfig`](crate::config::app::IntakeConfig)
//! and [`PhotoPolicy::from_provider`](crate::config::photo::PhotoPolicy::from_provider).
//!
//! # Examples
//! ```rust,no_run
//! use photo_intake::config::env::{read_u32, read_u64};
//!
//! let width = read_u32("PHOTO_PASSPORT_WIDTH", 413);
//! let max_kb = read_u64("PHOTO_PASSPORT_MAX_KB", 300);
//! ```

/// Reads an unsigned integer (`u32`) from an environment variable,
/// returning the provided default if parsing fails.
pub fn read_u32(name: &str, default: u32) -> u32 {
    read_u32_from(|k| std::env::var(k).ok(), name, default)
}

/// Reads a `u32` using a custom provider function.
///
/// # Example
/// ```rust
/// use photo_intake::config::env::read_u32_from;
///
/// assert_eq!(read_u32_from(|_| Some(" 531 ".into()), "H", 0), 531);
/// assert_eq!(read_u32_from(|_| None, "H", 7), 7);
/// ```
pub fn read_u32_from<F>(provider: F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

/// Reads an unsigned integer (`u64`) from an environment variable,
/// returning the provided default if parsing fails.
pub fn read_u64(name: &str, default: u64) -> u64 {
    read_u64_from(|k| std::env::var(k).ok(), name, default)
}

/// Reads a `u64` using a custom provider function.
pub fn read_u64_from<F>(provider: F, name: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Reads an optional `u64` using a custom provider function.
///
/// Missing, empty, `"none"` or unparsable values yield `default`.
/// The literal `"none"` (case-insensitive) explicitly unsets the value.
///
/// # Example
/// ```rust
/// use photo_intake::config::env::read_opt_u64_from;
///
/// assert_eq!(read_opt_u64_from(|_| Some("15".into()), "MIN", Some(30)), Some(15));
/// assert_eq!(read_opt_u64_from(|_| Some("none".into()), "MIN", Some(30)), None);
/// assert_eq!(read_opt_u64_from(|_| None, "MIN", Some(30)), Some(30));
/// ```
pub fn read_opt_u64_from<F>(provider: F, name: &str, default: Option<u64>) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match provider(name) {
        Some(v) => {
            let s = v.trim();
            if s.eq_ignore_ascii_case("none") {
                None
            } else {
                s.parse::<u64>().ok().or(default)
            }
        }
        None => default,
    }
}

/// Reads a finite `f32` using a custom provider function.
///
/// Non-finite or unparsable values fall back to `default`.
pub fn read_f32_from<F>(provider: F, name: &str, default: f32) -> f32
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
