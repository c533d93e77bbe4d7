pub mod blob;
pub mod client;
pub mod config;
pub mod error;
pub mod intake;
pub mod media;
pub mod present;
pub mod workflow;

// Re-export main types for convenience
pub use blob::{BlobStore, ObjectUrl};
pub use client::{GenerateClient, GenerateRequest, GeneratedImage};
pub use config::Config;
pub use error::{GenerateError, ValidationError, WorkflowError};
pub use intake::{Candidate, IntakeSource};
pub use present::{present, Presentation, View};
pub use workflow::{GenerationResult, RequestId, StagedImage, StatusKind, Workflow, WorkflowStatus};
