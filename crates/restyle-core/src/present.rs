//! What to show for a given workflow state
//!
//! Rendering front ends call [`present`] and draw the returned
//! [`Presentation`]; they never inspect the workflow's flags themselves.

use crate::workflow::{GenerationResult, StagedImage, Workflow, WorkflowStatus};

pub const PLACEHOLDER_MESSAGE: &str =
    "Upload an image and describe the style you want, then press Generate.";

/// Main result area
#[derive(Debug)]
pub enum View<'a> {
    Loading,
    Result(&'a GenerationResult),
    Placeholder,
}

#[derive(Debug)]
pub struct Presentation<'a> {
    pub main: View<'a>,
    pub staged: Option<&'a StagedImage>,
    /// Dismissible banner drawn over everything else
    pub banner: Option<&'a str>,
    pub trigger_enabled: bool,
}

pub fn present(workflow: &Workflow) -> Presentation<'_> {
    let main = match workflow.status() {
        WorkflowStatus::Submitting { .. } => View::Loading,
        WorkflowStatus::Succeeded(result) => View::Result(result),
        WorkflowStatus::Idle | WorkflowStatus::Failed => View::Placeholder,
    };

    Presentation {
        main,
        staged: workflow.staged(),
        banner: workflow.error(),
        trigger_enabled: workflow.can_generate(),
    }
}
