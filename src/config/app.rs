//! # Intake Configuration Loader
//!
//! Loads the three photo policies used by the registration flows.
//!
//! Automatically loads `.env` files for non-production environments.
//! It checks for a custom `DOTENV_FILE` path first, then falls back to
//! `.env.{APP_ENV}` or `.env`.
//!
//! # Environment Variables
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_ENV` | Current environment (`development`, `production`, etc.) | `"development"` |
//! | `DOTENV_FILE` | Optional path to a custom dotenv file | *none* |
//! | `PHOTO_PASSPORT_*` | Overrides for the passport policy | see [`PhotoPolicy::passport`] |
//! | `PHOTO_SQUARE_*` | Overrides for the square policy | see [`PhotoPolicy::square`] |
//! | `PHOTO_OPEN_*` | Overrides for the open-ended policy | see [`PhotoPolicy::open_ended`] |
//!
//! Each prefix accepts `MIN_KB`, `MAX_KB`, `POST_MIN_KB`, `POST_MAX_KB`,
//! `WIDTH`, `HEIGHT` and `QUALITY`.
//!
//! # Example
//! ```rust,no_run
//! use photo_intake::config::app::{IntakeConfig, PolicyKind};
//!
//! let cfg = IntakeConfig::from_env();
//! let policy = cfg.policy(PolicyKind::Passport);
//! assert_eq!(policy.target_dimensions(), (413, 531));
//! ```

use std::env;

use tracing::debug;

use crate::config::photo::PhotoPolicy;

/// Selects one of the configured policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyKind {
    /// Self-registration passport photo.
    Passport,
    /// Admin-created member photo.
    Square,
    /// Edit flow without a minimum size.
    OpenEnded,
}

/// Top-level intake configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct IntakeConfig {
    pub passport: PhotoPolicy,
    pub square: PhotoPolicy,
    pub open_ended: PhotoPolicy,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            passport: PhotoPolicy::passport(),
            square: PhotoPolicy::square(),
            open_ended: PhotoPolicy::open_ended(),
        }
    }
}

impl IntakeConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Behavior
    /// - Reads `APP_ENV` (defaults to `"development"`).
    /// - Loads `.env` or `.env.{APP_ENV}` for non-production environments.
    /// - Applies per-policy overrides and falls back to the presets.
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        if app_env != "production" {
            if let Ok(path) = env::var("DOTENV_FILE") {
                let _ = dotenvy::from_filename(path);
            } else {
                let candidate = format!(".env.{}", app_env);
                dotenvy::from_filename(&candidate)
                    .or_else(|_| dotenvy::dotenv())
                    .ok();
            }
        }

        let cfg = Self::from_provider(|k| env::var(k).ok());
        debug!(?cfg, app_env = %app_env, "photo intake configuration loaded");
        cfg
    }

    /// Builds the configuration from an arbitrary key/value provider.
    pub fn from_provider<F>(provider: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            passport: PhotoPolicy::from_provider(&provider, "PHOTO_PASSPORT", PhotoPolicy::passport()),
            square: PhotoPolicy::from_provider(&provider, "PHOTO_SQUARE", PhotoPolicy::square()),
            open_ended: PhotoPolicy::from_provider(
                &provider,
                "PHOTO_OPEN",
                PhotoPolicy::open_ended(),
            ),
        }
    }

    /// Returns the policy for a call site.
    pub fn policy(&self, kind: PolicyKind) -> &PhotoPolicy {
        match kind {
            PolicyKind::Passport => &self.passport,
            PolicyKind::Square => &self.square,
            PolicyKind::OpenEnded => &self.open_ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::photo::SizeBounds;

    #[test]
    fn from_provider_without_values_matches_presets() {
        let cfg = IntakeConfig::from_provider(|_| None);
        assert_eq!(cfg, IntakeConfig::default());
    }

    #[test]
    fn from_env_reads_prefixed_overrides() {
        temp_env::with_vars(
            vec![
                ("APP_ENV", Some("production")),
                ("PHOTO_SQUARE_MIN_KB", Some("20")),
                ("PHOTO_SQUARE_MAX_KB", Some("1024")),
                ("PHOTO_OPEN_WIDTH", Some("500")),
            ],
            || {
                let cfg = IntakeConfig::from_env();
                assert_eq!(
                    cfg.policy(PolicyKind::Square).pre_crop,
                    SizeBounds::kb(Some(20), 1024)
                );
                assert_eq!(cfg.policy(PolicyKind::OpenEnded).target_width, 500);
                assert_eq!(cfg.policy(PolicyKind::Passport), &PhotoPolicy::passport());
            },
        );
    }

    #[test]
    fn from_env_loads_custom_dotenv_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("intake.env");
        std::fs::write(&path, "PHOTO_PASSPORT_HEIGHT=600\n").expect("write dotenv");

        temp_env::with_vars(
            vec![
                ("APP_ENV", Some("test")),
                ("DOTENV_FILE", Some(path.to_str().expect("utf8 path"))),
                ("PHOTO_PASSPORT_HEIGHT", None),
            ],
            || {
                let cfg = IntakeConfig::from_env();
                assert_eq!(cfg.passport.target_height, 600);
            },
        );
    }
}
