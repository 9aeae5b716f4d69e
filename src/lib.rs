//! # photo_intake
//!
//! Photo capture pipeline for member registration forms.
//!
//! A selected file is validated (type, extension, size, decodability), framed
//! in an aspect-locked crop box, rasterized to a fixed-size JPEG, validated
//! again, and stored as the form's single [`CroppedArtifact`] with a revocable
//! preview handle.
//!
//! - Policies per call site (`config::photo`, `config::app`)
//! - Validation errors and messages (`error`)
//! - Decoding and rasterization backends (`image`)
//! - Pipeline state and crop interaction (`intake`)
//!
//! ## Example usage
//!
//! ```rust,no_run
//! use photo_intake::config::app::{IntakeConfig, PolicyKind};
//! use photo_intake::intake::field::PhotoField;
//! use photo_intake::intake::source::LocalFile;
//!
//! # async fn run() {
//! let cfg = IntakeConfig::from_env();
//! let mut field = PhotoField::with_defaults(cfg.policy(PolicyKind::Passport).clone());
//!
//! let outcome = field.select_file(&LocalFile::new("portrait.jpg")).await;
//! if outcome.valid && field.confirm_crop().await.valid {
//!     let pdf_src = field.artifact().map(|a| a.to_data_url());
//! }
//! # }
//! ```
//!
//! [`CroppedArtifact`]: intake::artifact::CroppedArtifact

// ===============================
// Re-exports of external crates
// ===============================

pub use anyhow;
pub use serde;
pub use tokio;

// ===============================
// Public modules
// ===============================
pub mod config;
pub mod error;
pub mod image;
pub mod intake;
