//! # Photo Field
//!
//! Form-owned state of one photo control: the optional remote photo already
//! saved on the server, the optional locally cropped [`CroppedArtifact`], the
//! open crop session and the "delete remote photo" mark.
//!
//! ## Session tokens
//! Decoding and rasterizing run off the field: `begin_*` records the current
//! session generation in a [`SessionToken`], the returned job is awaited
//! without borrowing the field, and `finish_*` drops the result if the
//! generation moved on in the meantime (cancel, remove, reset or a newer
//! selection). Jobs also check the token between their own steps.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use photo_intake::config::photo::PhotoPolicy;
//! use photo_intake::intake::candidate::ImageCandidate;
//! use photo_intake::intake::field::PhotoField;
//!
//! # async fn run(bytes: Vec<u8>) {
//! let mut field = PhotoField::with_defaults(PhotoPolicy::square());
//!
//! let outcome = field.select(Some(ImageCandidate::new("me.jpg", "image/jpeg", bytes))).await;
//! if outcome.valid {
//!     field.resize_crop(600.0);
//!     let outcome = field.confirm_crop().await;
//!     println!("{:?} {:?}", outcome, field.preview_url());
//! }
//! let submission = field.submission();
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use super::artifact::CroppedArtifact;
use super::candidate::ImageCandidate;
use super::crop::{CropAdapter, CropWidgetFactory, FramedCropFactory};
use super::preview::{InMemoryPreviewStore, PreviewStore};
use super::source::{FileSource, load_candidate};
use super::validator::{OUTPUT_CONTENT_TYPE, validate_post_crop, validate_pre_crop};
use crate::config::photo::PhotoPolicy;
use crate::error::pipeline::PipelineError;
use crate::error::validation::ValidationOutcome;
use crate::image::image_rs_processor::ImageRsProcessor;
use crate::image::processor::{CropRegion, ImageProcessor, RenderOpts};

/// Cancellation token tied to one crop-dialog lifetime.
#[derive(Clone, Debug)]
pub struct SessionToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl SessionToken {
    /// `true` while no newer action has superseded this session.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    fn ensure_current(&self) -> Result<(), PipelineError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(PipelineError::Superseded)
        }
    }
}

/// What the form sends to the server for this photo.
///
/// Serializes as form metadata: `file` is `null` when there is nothing to
/// upload, otherwise `{ "content_type": "image/jpeg", "size": <bytes> }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhotoSubmission {
    /// Remove the remote photo.
    pub delete: bool,
    /// New JPEG to upload, if any.
    #[serde(serialize_with = "serialize_file_metadata")]
    pub file: Option<Arc<[u8]>>,
}

#[derive(Serialize)]
struct FileMetadata {
    content_type: &'static str,
    size: usize,
}

fn serialize_file_metadata<S>(file: &Option<Arc<[u8]>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    file.as_ref()
        .map(|bytes| FileMetadata {
            content_type: OUTPUT_CONTENT_TYPE,
            size: bytes.len(),
        })
        .serialize(serializer)
}

/// A photo already stored on the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePhoto {
    pub url: String,
}

struct CropSession {
    candidate: ImageCandidate,
}

/// Pre-crop validation of one selection, detached from the field.
pub struct SelectJob {
    token: SessionToken,
    candidate: Option<ImageCandidate>,
    policy: PhotoPolicy,
    processor: Arc<dyn ImageProcessor>,
}

/// Result of a [`SelectJob`], to be handed to [`PhotoField::finish_select`].
pub struct SelectOutcome {
    token: SessionToken,
    candidate: Option<ImageCandidate>,
    result: Result<(u32, u32), PipelineError>,
}

impl SelectJob {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub async fn run(self) -> SelectOutcome {
        let SelectJob {
            token,
            candidate,
            policy,
            processor,
        } = self;

        let result = match token.ensure_current() {
            Ok(()) => {
                let c = candidate.clone();
                tokio::task::spawn_blocking(move || {
                    validate_pre_crop(c.as_ref(), &policy, processor.as_ref())
                        .map_err(PipelineError::from)
                })
                .await
                .unwrap_or_else(|e| Err(PipelineError::Backend(e.to_string())))
            }
            Err(e) => Err(e),
        };

        SelectOutcome {
            token,
            candidate,
            result,
        }
    }
}

/// Rasterization and post-crop validation of the confirmed region.
pub struct ConfirmJob {
    token: SessionToken,
    source: Arc<[u8]>,
    region: CropRegion,
    policy: PhotoPolicy,
    processor: Arc<dyn ImageProcessor>,
}

/// Result of a [`ConfirmJob`], to be handed to [`PhotoField::finish_confirm`].
pub struct ConfirmOutcome {
    token: SessionToken,
    quality: u8,
    result: Result<(Vec<u8>, (u32, u32)), PipelineError>,
}

impl ConfirmJob {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub async fn run(self) -> ConfirmOutcome {
        let quality = self.policy.quality_percent();
        let token = self.token.clone();
        let result = self.render_and_validate().await;
        ConfirmOutcome {
            token,
            quality,
            result,
        }
    }

    async fn render_and_validate(self) -> Result<(Vec<u8>, (u32, u32)), PipelineError> {
        let ConfirmJob {
            token,
            source,
            region,
            policy,
            processor,
        } = self;
        token.ensure_current()?;

        let opts = RenderOpts::new(
            policy.target_width,
            policy.target_height,
            policy.quality_percent(),
        );
        let renderer = processor.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            renderer.render_crop(&source, region, opts)
        })
        .await
        .map_err(|e| PipelineError::Backend(e.to_string()))?
        .map_err(|e| PipelineError::Backend(format!("{e:#}")))?;

        token.ensure_current()?;

        tokio::task::spawn_blocking(move || {
            validate_post_crop(&encoded, OUTPUT_CONTENT_TYPE, &policy, processor.as_ref())
                .map(|dims| (encoded, dims))
                .map_err(PipelineError::from)
        })
        .await
        .map_err(|e| PipelineError::Backend(e.to_string()))?
    }
}

/// State of one photo control in a form.
pub struct PhotoField {
    policy: PhotoPolicy,
    processor: Arc<dyn ImageProcessor>,
    previews: Arc<dyn PreviewStore>,
    crop: CropAdapter,
    remote: Option<RemotePhoto>,
    artifact: Option<CroppedArtifact>,
    session: Option<CropSession>,
    delete_remote: bool,
    generation: Arc<AtomicU64>,
    message: Option<String>,
}

impl PhotoField {
    pub fn new(
        policy: PhotoPolicy,
        processor: Arc<dyn ImageProcessor>,
        previews: Arc<dyn PreviewStore>,
        widgets: Arc<dyn CropWidgetFactory>,
    ) -> Self {
        Self {
            policy,
            processor,
            previews,
            crop: CropAdapter::new(widgets),
            remote: None,
            artifact: None,
            session: None,
            delete_remote: false,
            generation: Arc::new(AtomicU64::new(0)),
            message: None,
        }
    }

    /// `image-rs` backend, in-memory previews and the geometry-only crop widget.
    pub fn with_defaults(policy: PhotoPolicy) -> Self {
        Self::new(
            policy,
            Arc::new(ImageRsProcessor),
            Arc::new(InMemoryPreviewStore::default()),
            Arc::new(FramedCropFactory),
        )
    }

    /// Starts the field from a photo already saved on the server (edit flows).
    pub fn with_remote(mut self, url: impl Into<String>) -> Self {
        self.remote = Some(RemotePhoto { url: url.into() });
        self
    }

    pub fn policy(&self) -> &PhotoPolicy {
        &self.policy
    }

    pub fn artifact(&self) -> Option<&CroppedArtifact> {
        self.artifact.as_ref()
    }

    pub fn remote(&self) -> Option<&RemotePhoto> {
        self.remote.as_ref()
    }

    /// `true` while the crop dialog is open.
    pub fn is_cropping(&self) -> bool {
        self.session.is_some()
    }

    /// Name of the file currently in the crop dialog.
    pub fn selected_file_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.candidate.file_name())
    }

    /// Region the user currently has selected in the crop dialog.
    pub fn crop_region(&self) -> Option<CropRegion> {
        self.crop.widget().map(|w| w.region())
    }

    /// Last status or error line for the photo control.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.delete_remote
    }

    /// URL to display: the local preview, else the remote photo unless it is
    /// marked for deletion.
    pub fn preview_url(&self) -> Option<&str> {
        match (&self.artifact, &self.remote) {
            (Some(a), _) => Some(a.preview().url()),
            (None, Some(r)) if !self.delete_remote => Some(r.url.as_str()),
            _ => None,
        }
    }

    /// What to send with the form.
    pub fn submission(&self) -> PhotoSubmission {
        PhotoSubmission {
            delete: self.delete_remote,
            file: self.artifact.as_ref().map(|a| a.bytes().clone()),
        }
    }

    fn token(&self) -> SessionToken {
        SessionToken {
            generation: self.generation.load(Ordering::SeqCst),
            current: self.generation.clone(),
        }
    }

    /// Invalidates every outstanding token.
    fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn discard_artifact(&mut self) {
        if let Some(artifact) = self.artifact.take() {
            self.previews.revoke(artifact.preview());
            debug!("cropped photo discarded");
        }
    }

    fn close_session(&mut self) {
        self.session = None;
        self.crop.close();
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        warn!(error = %err, "photo step rejected");
        self.close_session();
        self.discard_artifact();
        self.message = Some(err.user_message());
        err
    }

    /// Starts validating a new selection. Any open crop dialog and any
    /// in-flight job are superseded.
    pub fn begin_select(&mut self, candidate: Option<ImageCandidate>) -> SelectJob {
        self.supersede();
        self.close_session();
        SelectJob {
            token: self.token(),
            candidate,
            policy: self.policy.clone(),
            processor: self.processor.clone(),
        }
    }

    /// Applies a finished selection: opens the crop dialog on success,
    /// clears the selection and the prior artifact on failure.
    pub fn finish_select(&mut self, outcome: SelectOutcome) -> Result<(), PipelineError> {
        if !outcome.token.is_current() {
            debug!("stale selection result ignored");
            return Err(PipelineError::Superseded);
        }

        match (outcome.result, outcome.candidate) {
            (Ok((w, h)), Some(candidate)) => {
                self.crop.open(w, h, self.policy.aspect_ratio);
                debug!(file = candidate.file_name(), w, h, "crop dialog opened");
                self.session = Some(CropSession { candidate });
                self.message = None;
                Ok(())
            }
            (Ok(_), None) => Err(self.fail(PipelineError::NoSession)),
            (Err(e), _) => Err(self.fail(e)),
        }
    }

    /// Validates a selection and opens the crop dialog.
    ///
    /// Every call re-runs the full validation chain, including for the same
    /// file selected again.
    pub async fn select(&mut self, candidate: Option<ImageCandidate>) -> ValidationOutcome {
        let job = self.begin_select(candidate);
        let outcome = job.run().await;
        into_outcome(self.finish_select(outcome))
    }

    /// Reads a picked file and validates it. Read failures surface as the
    /// generic message.
    pub async fn select_file(&mut self, source: &dyn FileSource) -> ValidationOutcome {
        self.supersede();
        match load_candidate(source).await {
            Ok(candidate) => self.select(Some(candidate)).await,
            Err(e) => {
                let err = self.fail(PipelineError::Read(format!("{e:#}")));
                into_outcome(Err(err))
            }
        }
    }

    /// Moves the crop selection.
    pub fn drag_crop(&mut self, dx: f64, dy: f64) {
        if let Some(widget) = self.crop.widget_mut() {
            widget.drag(dx, dy);
        }
    }

    /// Resizes the crop selection around its center.
    pub fn resize_crop(&mut self, width: f64) {
        if let Some(widget) = self.crop.widget_mut() {
            widget.resize(width);
        }
    }

    /// Captures the selected region for rasterization.
    pub fn begin_confirm(&mut self) -> Result<ConfirmJob, PipelineError> {
        let session = self.session.as_ref().ok_or(PipelineError::NoSession)?;
        let region = self
            .crop
            .widget()
            .map(|w| w.region())
            .ok_or(PipelineError::NoSession)?;

        Ok(ConfirmJob {
            token: self.token(),
            source: session.candidate.bytes().clone(),
            region,
            policy: self.policy.clone(),
            processor: self.processor.clone(),
        })
    }

    /// Stores the validated crop, replacing and revoking the previous preview.
    pub fn finish_confirm(
        &mut self,
        outcome: ConfirmOutcome,
    ) -> Result<&CroppedArtifact, PipelineError> {
        if !outcome.token.is_current() {
            debug!("stale crop result ignored");
            return Err(PipelineError::Superseded);
        }

        let (encoded, dims) = match outcome.result {
            Ok(v) => v,
            Err(e) => return Err(self.fail(e)),
        };

        self.supersede();
        self.close_session();
        self.discard_artifact();

        let bytes: Arc<[u8]> = Arc::from(encoded);
        let preview = self.previews.create(bytes.clone(), OUTPUT_CONTENT_TYPE);
        let artifact = CroppedArtifact::new(bytes, dims, outcome.quality, preview);
        info!(
            width = dims.0,
            height = dims.1,
            size_kb = artifact.size_kb(),
            "cropped photo accepted"
        );

        self.message = Some(artifact.success_message());
        self.delete_remote = false;
        Ok(self.artifact.insert(artifact))
    }

    /// Rasterizes the selected region and stores the result.
    pub async fn confirm_crop(&mut self) -> ValidationOutcome {
        let job = match self.begin_confirm() {
            Ok(job) => job,
            Err(e) => {
                self.message = Some(e.user_message());
                return into_outcome(Err(e));
            }
        };
        let outcome = job.run().await;
        into_outcome(self.finish_confirm(outcome).map(|_| ()))
    }

    /// Closes the crop dialog. The previous photo state is left untouched.
    pub fn cancel_crop(&mut self) {
        self.supersede();
        self.close_session();
        debug!("crop cancelled");
    }

    /// Clears the photo. A remote photo is marked for deletion.
    pub fn remove_photo(&mut self) {
        self.supersede();
        self.close_session();
        self.discard_artifact();
        if self.remote.is_some() {
            self.delete_remote = true;
        }
        self.message = None;
    }

    /// Returns to the initial state, keeping the remote reference.
    pub fn reset(&mut self) {
        self.supersede();
        self.close_session();
        self.discard_artifact();
        self.delete_remote = false;
        self.message = None;
    }
}

impl Drop for PhotoField {
    fn drop(&mut self) {
        self.supersede();
        self.discard_artifact();
    }
}

fn into_outcome(result: Result<(), PipelineError>) -> ValidationOutcome {
    match result {
        Ok(()) => ValidationOutcome::ok(),
        Err(e) => ValidationOutcome::rejected(e.user_message()),
    }
}
