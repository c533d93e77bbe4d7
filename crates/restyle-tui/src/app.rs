use anyhow::Result;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use restyle_core::intake;
use restyle_core::media;
use restyle_core::{
    Candidate, Config, GenerateClient, GenerateError, GeneratedImage, IntakeSource, RequestId,
    Workflow, WorkflowError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

type GenerationTask = JoinHandle<Result<GeneratedImage, GenerateError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Workflow state (staged image, prompt, status, error banner)
    pub workflow: Workflow,
    pub prompt_cursor: usize, // cursor position in the prompt, in chars

    // Browse dialog state
    pub show_file_dialog: bool,
    pub path_input: String,
    pub path_cursor: usize,

    // In-flight generation
    pub generation_task: Option<(RequestId, GenerationTask)>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Transient status line (e.g. where a result was saved)
    pub notice: Option<String>,

    pub client: GenerateClient,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = GenerateClient::from_config(&config)?;

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Normal,

            workflow: Workflow::new(),
            prompt_cursor: 0,

            show_file_dialog: false,
            path_input: String::new(),
            path_cursor: 0,

            generation_task: None,

            animation_frame: 0,

            notice: None,

            client,
            config,
        })
    }

    /// Run a candidate file through intake
    pub fn open_file(&mut self, path: impl Into<PathBuf>, source: IntakeSource) {
        self.notice = None;
        let path = expand_home(path.into());
        match self.workflow.offer(Candidate::from_path(path, source)) {
            Ok(_) => {
                // The workflow has dropped the superseded request.
                if let Some((id, handle)) = self.generation_task.take() {
                    tracing::debug!(?id, "aborting superseded generation task");
                    handle.abort();
                }
            }
            Err(err) => tracing::debug!(error = %err, "intake rejected candidate"),
        }
    }

    /// Treat pasted text as a dropped file; false if it names no file
    pub fn handle_drop(&mut self, text: &str) -> bool {
        match intake::dropped_file(text) {
            Some(path) => {
                self.open_file(path, IntakeSource::Drop);
                true
            }
            None => false,
        }
    }

    // Browse dialog
    pub fn open_file_dialog(&mut self) {
        self.show_file_dialog = true;
        self.path_input.clear();
        self.path_cursor = 0;
    }

    pub fn close_file_dialog(&mut self) {
        self.show_file_dialog = false;
    }

    pub fn submit_file_dialog(&mut self) {
        let input = self.path_input.trim().to_string();
        self.show_file_dialog = false;
        if !input.is_empty() {
            self.open_file(input, IntakeSource::Browse);
        }
    }

    /// Submit the staged image and prompt in the background
    pub fn start_generation(&mut self) {
        let (id, request) = match self.workflow.begin_generation() {
            Ok(started) => started,
            Err(WorkflowError::InFlight) => return,
            Err(WorkflowError::Validation(_)) => return,
        };

        self.notice = None;
        self.animation_frame = 0;
        let client = self.client.clone();
        let handle = tokio::spawn(async move { client.generate(&request).await });
        self.generation_task = Some((id, handle));
    }

    /// Feed a finished generation task back into the workflow
    pub async fn poll_generation(&mut self) {
        let finished = matches!(&self.generation_task, Some((_, handle)) if handle.is_finished());
        if !finished {
            return;
        }

        if let Some((id, handle)) = self.generation_task.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(GenerateError::Aborted(join_err.to_string())),
            };
            self.workflow.complete_generation(id, outcome);
        }
    }

    /// Write the current result into the output directory
    pub fn save_result(&mut self) -> Result<Option<PathBuf>> {
        let Some(result) = self.workflow.result() else {
            return Ok(None);
        };

        let dir = self.config.output_dir();
        std::fs::create_dir_all(&dir)?;
        let file_name = format!(
            "restyle-{}.{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            media::extension_for(result.image().media_type())
        );
        let path = dir.join(file_name);
        std::fs::write(&path, &*result.image().bytes())?;

        tracing::info!(path = %path.display(), "result saved");
        self.notice = Some(format!("Saved to {}", path.display()));
        Ok(Some(path))
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.workflow.is_submitting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Abort any in-flight request before exit
    pub fn shutdown(&mut self) {
        if let Some((_, handle)) = self.generation_task.take() {
            handle.abort();
        }
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path
}

/// Human-readable byte count
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use restyle_core::StatusKind;
    use restyle_core::error::INVALID_IMAGE_MESSAGE;

    fn test_app(output_dir: &Path) -> App {
        let config = Config {
            // Nothing listens on port 1.
            endpoint: Some("http://127.0.0.1:1".to_string()),
            output_dir: Some(output_dir.to_path_buf()),
            ..Config::new()
        };
        App::new(config).unwrap()
    }

    #[test]
    fn test_drop_stages_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"meow").unwrap();
        let mut app = test_app(dir.path());

        assert!(app.handle_drop(&format!("'{}'", path.display())));
        assert_eq!(app.workflow.staged().unwrap().file.source, IntakeSource::Drop);
    }

    #[test]
    fn test_drop_of_text_file_shows_banner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let mut app = test_app(dir.path());

        assert!(app.handle_drop(&path.display().to_string()));
        assert_eq!(app.workflow.error(), Some(INVALID_IMAGE_MESSAGE));
        assert!(!app.workflow.can_generate());
    }

    #[test]
    fn test_paste_that_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        assert!(!app.handle_drop("ghibli style"));
        assert!(app.workflow.error().is_none());
    }

    #[test]
    fn test_file_dialog_submit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"meow").unwrap();
        let mut app = test_app(dir.path());

        app.open_file_dialog();
        app.path_input = path.display().to_string();
        app.submit_file_dialog();

        assert!(!app.show_file_dialog);
        assert_eq!(app.workflow.staged().unwrap().file.source, IntakeSource::Browse);
    }

    #[test]
    fn test_save_without_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        assert!(app.save_result().unwrap().is_none());
    }

    #[test]
    fn test_save_result_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"meow").unwrap();
        let out = dir.path().join("out");
        let mut app = test_app(&out);
        app.open_file(&path, IntakeSource::Browse);

        let (id, _) = app.workflow.begin_generation().unwrap();
        app.workflow.complete_generation(
            id,
            Ok(GeneratedImage {
                bytes: vec![5; 10],
                media_type: "image/jpeg".to_string(),
            }),
        );

        let saved = app.save_result().unwrap().unwrap();
        assert_eq!(saved.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&saved).unwrap(), vec![5; 10]);
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn test_generation_settles_after_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"meow").unwrap();
        let mut app = test_app(dir.path());
        app.open_file(&path, IntakeSource::Browse);

        app.start_generation();
        assert_eq!(app.workflow.status_kind(), StatusKind::Submitting);

        // A second trigger while in flight is ignored.
        app.start_generation();

        for _ in 0..200 {
            app.poll_generation().await;
            if app.generation_task.is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(app.workflow.status_kind(), StatusKind::Failed);
        assert!(app.workflow.error().is_some());
    }

    #[tokio::test]
    async fn test_new_upload_aborts_in_flight_generation() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("cat.png");
        let dog = dir.path().join("dog.png");
        std::fs::write(&cat, b"meow").unwrap();
        std::fs::write(&dog, b"woof").unwrap();
        let mut app = test_app(dir.path());
        app.open_file(&cat, IntakeSource::Browse);

        app.start_generation();
        assert!(app.generation_task.is_some());

        app.open_file(&dog, IntakeSource::Drop);
        assert!(app.generation_task.is_none());
        assert_eq!(app.workflow.status_kind(), StatusKind::Idle);
        assert_eq!(app.workflow.staged().unwrap().file.name, "dog.png");
        assert!(app.workflow.can_generate());
    }

    #[tokio::test]
    async fn test_rejected_file_keeps_in_flight_generation() {
        let dir = tempfile::tempdir().unwrap();
        let cat = dir.path().join("cat.png");
        std::fs::write(&cat, b"meow").unwrap();
        let mut app = test_app(dir.path());
        app.open_file(&cat, IntakeSource::Browse);
        app.start_generation();

        app.open_file("/nowhere/notes.txt", IntakeSource::Browse);
        assert_eq!(app.workflow.error(), Some(INVALID_IMAGE_MESSAGE));
        assert!(app.generation_task.is_some());
        assert_eq!(app.workflow.status_kind(), StatusKind::Submitting);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(10), "10 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
