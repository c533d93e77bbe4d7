//! Upload-and-generate state machine
//!
//! [`Workflow`] owns every piece of workflow state: the staged image, the
//! prompt, the tagged [`WorkflowStatus`] and the error banner. The result of a
//! generation only exists inside [`WorkflowStatus::Succeeded`], so a result and
//! an in-flight request can never coexist.
//!
//! Generation is split in two so callers can run the request off the UI loop:
//! [`Workflow::begin_generation`] moves to `Submitting` and hands out the
//! request, [`Workflow::complete_generation`] applies its outcome.
//! [`Workflow::generate`] chains both for callers that can simply await.

use crate::blob::{BlobStore, ObjectUrl};
use crate::client::{GenerateClient, GenerateRequest, GeneratedImage};
use crate::error::{GenerateError, ValidationError, WorkflowError};
use crate::intake::Candidate;
use crate::media;

/// A validated image ready to be submitted
#[derive(Debug)]
pub struct StagedImage {
    pub file: Candidate,
    pub dimensions: Option<(u32, u32)>,
    preview: ObjectUrl,
}

impl StagedImage {
    pub fn preview(&self) -> &ObjectUrl {
        &self.preview
    }

    pub fn size(&self) -> usize {
        self.preview.len()
    }
}

/// Image returned by the backend
#[derive(Debug)]
pub struct GenerationResult {
    pub prompt: String,
    pub dimensions: Option<(u32, u32)>,
    image: ObjectUrl,
}

impl GenerationResult {
    pub fn image(&self) -> &ObjectUrl {
        &self.image
    }

    pub fn uri(&self) -> &str {
        self.image.uri()
    }

    pub fn size(&self) -> usize {
        self.image.len()
    }
}

/// Identifies one submitted request so late completions can be discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

#[derive(Debug)]
pub enum WorkflowStatus {
    Idle,
    /// `prompt` is the text that was sent, not the live prompt
    Submitting { id: RequestId, prompt: String },
    Succeeded(GenerationResult),
    Failed,
}

/// Payload-free view of [`WorkflowStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl WorkflowStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            WorkflowStatus::Idle => StatusKind::Idle,
            WorkflowStatus::Submitting { .. } => StatusKind::Submitting,
            WorkflowStatus::Succeeded(_) => StatusKind::Succeeded,
            WorkflowStatus::Failed => StatusKind::Failed,
        }
    }
}

#[derive(Debug)]
pub struct Workflow {
    store: BlobStore,
    staged: Option<StagedImage>,
    prompt: String,
    status: WorkflowStatus,
    error: Option<String>,
    next_request: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self::with_store(BlobStore::new())
    }

    pub fn with_store(store: BlobStore) -> Self {
        Self {
            store,
            staged: None,
            prompt: String::new(),
            status: WorkflowStatus::Idle,
            error: None,
            next_request: 0,
        }
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    pub fn staged(&self) -> Option<&StagedImage> {
        self.staged.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    pub fn status_kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.status {
            WorkflowStatus::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status, WorkflowStatus::Submitting { .. })
    }

    /// Whether the generate trigger should be enabled
    pub fn can_generate(&self) -> bool {
        self.staged.is_some() && !self.is_submitting()
    }

    /// Validate a candidate file and stage it
    ///
    /// Acceptance replaces any staged image and clears the previous result and
    /// error. An in-flight request is superseded; its outcome will be
    /// discarded. Rejection clears the staged image and raises the banner.
    pub fn offer(&mut self, candidate: Candidate) -> Result<&StagedImage, ValidationError> {
        if !candidate.is_image() {
            let err = ValidationError::NotAnImage {
                name: candidate.name.clone(),
                media_type: candidate.media_type.clone(),
            };
            return Err(self.reject(err));
        }

        let bytes = match std::fs::read(&candidate.path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = ValidationError::Unreadable {
                    path: candidate.path.clone(),
                    source,
                };
                return Err(self.reject(err));
            }
        };

        let dimensions = media::probe_dimensions(&bytes);
        let preview = self.store.create(bytes, &candidate.media_type);
        tracing::info!(
            file = %candidate.name,
            media_type = %candidate.media_type,
            size = preview.len(),
            source = ?candidate.source,
            "image staged"
        );

        if let WorkflowStatus::Submitting { id, .. } = &self.status {
            tracing::info!(?id, "new image supersedes in-flight request");
        }
        self.error = None;
        self.status = WorkflowStatus::Idle;
        let staged = self.staged.insert(StagedImage {
            file: candidate,
            dimensions,
            preview,
        });
        Ok(&*staged)
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        tracing::warn!(error = %err, "candidate rejected");
        self.staged = None;
        self.raise(err.user_message());
        err
    }

    /// Move to `Submitting` and hand out the request to send
    pub fn begin_generation(&mut self) -> Result<(RequestId, GenerateRequest), WorkflowError> {
        if let WorkflowStatus::Submitting { id, .. } = &self.status {
            tracing::warn!(?id, "generation already in flight, ignoring trigger");
            return Err(WorkflowError::InFlight);
        }

        let Some(staged) = &self.staged else {
            let err = ValidationError::NoImageStaged;
            tracing::warn!(error = %err, "generation refused");
            self.raise(err.user_message());
            return Err(err.into());
        };

        let request = GenerateRequest {
            image: staged.preview.bytes(),
            file_name: staged.file.name.clone(),
            media_type: staged.file.media_type.clone(),
            prompt: self.prompt.clone(),
        };

        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.error = None;
        self.status = WorkflowStatus::Submitting {
            id,
            prompt: request.prompt.clone(),
        };
        Ok((id, request))
    }

    /// Apply the outcome of request `id`
    ///
    /// Returns false when `id` is not the request in flight; the outcome is
    /// then discarded.
    pub fn complete_generation(
        &mut self,
        id: RequestId,
        outcome: Result<GeneratedImage, GenerateError>,
    ) -> bool {
        let prompt = match &mut self.status {
            WorkflowStatus::Submitting { id: current, prompt } if *current == id => {
                std::mem::take(prompt)
            }
            _ => {
                tracing::warn!(?id, "discarding outcome of a superseded request");
                return false;
            }
        };

        match outcome {
            Ok(generated) => {
                let dimensions = media::probe_dimensions(&generated.bytes);
                let image = self.store.create(generated.bytes, &generated.media_type);
                self.error = None;
                self.status = WorkflowStatus::Succeeded(GenerationResult {
                    prompt,
                    dimensions,
                    image,
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "generation failed");
                self.error = Some(err.user_message().to_string());
                self.status = WorkflowStatus::Failed;
            }
        }
        true
    }

    /// Submit the staged image and prompt, waiting for the backend
    pub async fn generate(&mut self, client: &GenerateClient) -> Result<StatusKind, WorkflowError> {
        let (id, request) = self.begin_generation()?;
        let outcome = client.generate(&request).await;
        self.complete_generation(id, outcome);
        Ok(self.status_kind())
    }

    /// Clear the banner; nothing else changes
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn raise(&mut self, message: &str) {
        self.error = Some(message.to_string());
        // A banner and a result are never shown together.
        if matches!(self.status, WorkflowStatus::Succeeded(_)) {
            self.status = WorkflowStatus::Idle;
        }
    }
}
