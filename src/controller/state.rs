//! The studio state machine. Pure and synchronous; the actor drives it.

use crate::adapter::{EditRequest, GenerationRequest, Outcome, StyleVariant};
use crate::error::{Result, StudioError};
use crate::image::{ImagePayload, SelectedFile, DEFAULT_MIME_TYPE};
use serde::{Deserialize, Serialize};

/// Identifies one submission.
pub type TicketId = u64;

/// The two user-facing workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Edit an uploaded image.
    #[default]
    Edit,
    /// Generate a blueprint from a description.
    Generate,
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Generate => write!(f, "generate"),
        }
    }
}

/// Where a workflow is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input.
    #[default]
    Idle,
    /// A request is in flight.
    Submitting,
    /// The last request produced an image.
    Succeeded,
    /// The last request produced no image or failed.
    Failed,
}

/// The single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Edit submitted without an uploaded image.
    MissingImage,
    /// Edit submitted without an instruction.
    MissingInstruction,
    /// Generation submitted without a description.
    MissingDescription,
    /// The selected file could not be read.
    ReadFailed(String),
    /// The call succeeded but returned no image.
    NoImageReturned,
    /// The call failed.
    GenerationFailed,
}

impl Notice {
    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::MissingImage => "Please upload an image first.".to_string(),
            Self::MissingInstruction => "Please describe the edit you want to make.".to_string(),
            Self::MissingDescription => {
                "Please describe the blueprint you want to generate.".to_string()
            }
            Self::ReadFailed(reason) => format!("Could not read the selected file: {reason}"),
            Self::NoImageReturned => "No image was returned. Try a different prompt.".to_string(),
            Self::GenerationFailed => {
                "Something went wrong while generating the image. Please try again.".to_string()
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// An in-flight submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    /// Ticket of the submission.
    pub id: TicketId,
    /// Media type the resulting image will be shown as.
    pub result_mime_type: String,
}

/// Inputs and output of the edit workflow.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    /// The uploaded image, carrying its original media type.
    pub source: Option<ImagePayload>,
    /// File name of the upload.
    pub source_name: Option<String>,
    /// Edit instruction.
    pub instruction: String,
    /// Last edited image.
    pub result: Option<ImagePayload>,
    /// Submit cycle.
    pub phase: Phase,
    /// Submission currently in flight.
    pub pending: Option<Pending>,
    /// Message left by the last completed request.
    pub outcome: Option<Notice>,
}

/// Inputs and output of the generation workflow.
#[derive(Debug, Clone, Default)]
pub struct GeneratorState {
    /// Blueprint description.
    pub description: String,
    /// Selected style.
    pub style: StyleVariant,
    /// Last generated image.
    pub result: Option<ImagePayload>,
    /// Submit cycle.
    pub phase: Phase,
    /// Submission currently in flight.
    pub pending: Option<Pending>,
    /// Message left by the last completed request.
    pub outcome: Option<Notice>,
}

/// Work handed to the request adapter.
#[derive(Debug, Clone)]
pub enum Job {
    /// Edit an image.
    Edit(EditRequest),
    /// Generate an image.
    Generate(GenerationRequest),
}

impl Job {
    /// Workflow this job belongs to.
    pub fn workflow(&self) -> Workflow {
        match self {
            Self::Edit(_) => Workflow::Edit,
            Self::Generate(_) => Workflow::Generate,
        }
    }
}

/// An accepted submission.
#[derive(Debug, Clone)]
pub struct Ticket {
    /// Matches the workflow's pending marker.
    pub id: TicketId,
    /// What to send.
    pub job: Job,
}

/// Owned snapshot for rendering.
#[derive(Debug, Clone, Default)]
pub struct StudioView {
    /// Active workflow.
    pub mode: Workflow,
    /// The active workflow has a request in flight.
    pub loading: bool,
    /// Message slot.
    pub notice: Option<Notice>,
    /// Edit workflow.
    pub editor: EditorState,
    /// Generation workflow.
    pub generator: GeneratorState,
}

impl StudioView {
    /// Image shown for the active workflow.
    pub fn displayed_result(&self) -> Option<&ImagePayload> {
        self.result_of(self.mode)
    }

    /// Last result of `workflow`.
    pub fn result_of(&self, workflow: Workflow) -> Option<&ImagePayload> {
        match workflow {
            Workflow::Edit => self.editor.result.as_ref(),
            Workflow::Generate => self.generator.result.as_ref(),
        }
    }

    /// Phase of `workflow`.
    pub fn phase_of(&self, workflow: Workflow) -> Phase {
        match workflow {
            Workflow::Edit => self.editor.phase,
            Workflow::Generate => self.generator.phase,
        }
    }

    /// Whether `workflow` has a request in flight.
    pub fn is_pending(&self, workflow: Workflow) -> bool {
        match workflow {
            Workflow::Edit => self.editor.pending.is_some(),
            Workflow::Generate => self.generator.pending.is_some(),
        }
    }
}

/// All user-facing state, owned by exactly one controller.
#[derive(Debug, Default)]
pub struct Studio {
    mode: Workflow,
    notice: Option<Notice>,
    editor: EditorState,
    generator: GeneratorState,
    next_ticket: TicketId,
}

impl Studio {
    /// Creates an idle studio in edit mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active workflow.
    pub fn mode(&self) -> Workflow {
        self.mode
    }

    /// Current message, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the active workflow has a request in flight.
    pub fn loading(&self) -> bool {
        self.pending(self.mode).is_some()
    }

    /// Edit workflow state.
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Generation workflow state.
    pub fn generator(&self) -> &GeneratorState {
        &self.generator
    }

    /// Takes a snapshot for rendering.
    pub fn view(&self) -> StudioView {
        StudioView {
            mode: self.mode,
            loading: self.loading(),
            notice: self.notice.clone(),
            editor: self.editor.clone(),
            generator: self.generator.clone(),
        }
    }

    fn pending(&self, workflow: Workflow) -> Option<&Pending> {
        match workflow {
            Workflow::Edit => self.editor.pending.as_ref(),
            Workflow::Generate => self.generator.pending.as_ref(),
        }
    }

    fn next_ticket(&mut self) -> TicketId {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Stores an uploaded file as the edit source.
    ///
    /// Refused with [`StudioError::Busy`] while an edit is in flight, so a
    /// late response can never land on a different upload.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Result<()> {
        if self.editor.pending.is_some() {
            return Err(StudioError::Busy(Workflow::Edit));
        }
        let Some(file) = file else {
            self.notice = Some(Notice::MissingImage);
            return Err(StudioError::Validation("no file selected".into()));
        };

        let name = file.name.clone();
        match file.into_payload() {
            Ok(payload) => {
                tracing::debug!(
                    file = %name,
                    mime_type = %payload.mime_type,
                    size = payload.size(),
                    "image selected"
                );
                self.editor.source = Some(payload);
                self.editor.source_name = Some(name);
                self.editor.result = None;
                self.editor.phase = Phase::Idle;
                self.editor.outcome = None;
                self.notice = None;
                Ok(())
            }
            Err(e) => Err(self.reject_file(e)),
        }
    }

    /// Records a file that could not be read and hands the error back.
    pub fn reject_file(&mut self, error: StudioError) -> StudioError {
        if self.editor.pending.is_some() {
            return StudioError::Busy(Workflow::Edit);
        }
        let reason = match &error {
            StudioError::Read(reason) => reason.clone(),
            other => other.to_string(),
        };
        self.editor.source = None;
        self.editor.source_name = None;
        self.notice = Some(Notice::ReadFailed(reason));
        error
    }

    /// Updates the edit instruction.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.editor.instruction = instruction.into();
        if self.editor.pending.is_none() {
            self.editor.phase = Phase::Idle;
            self.editor.outcome = None;
        }
    }

    /// Updates the blueprint description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.generator.description = description.into();
        if self.generator.pending.is_none() {
            self.generator.phase = Phase::Idle;
            self.generator.outcome = None;
        }
    }

    /// Selects the blueprint style.
    pub fn set_style(&mut self, style: StyleVariant) {
        self.generator.style = style;
        if self.generator.pending.is_none() {
            self.generator.phase = Phase::Idle;
            self.generator.outcome = None;
        }
    }

    /// Switches the active workflow. Results of both workflows are kept.
    ///
    /// Input errors are cleared; the outcome message of the target
    /// workflow's last request is shown again.
    pub fn switch_mode(&mut self, mode: Workflow) {
        self.mode = mode;
        self.notice = match mode {
            Workflow::Edit => self.editor.outcome.clone(),
            Workflow::Generate => self.generator.outcome.clone(),
        };
    }

    /// Validates and starts an edit.
    pub fn begin_edit(&mut self) -> Result<Ticket> {
        if self.editor.pending.is_some() {
            return Err(StudioError::Busy(Workflow::Edit));
        }
        let Some(source) = self.editor.source.clone() else {
            self.notice = Some(Notice::MissingImage);
            return Err(StudioError::Validation("no image uploaded".into()));
        };
        if self.editor.instruction.trim().is_empty() {
            self.notice = Some(Notice::MissingInstruction);
            return Err(StudioError::Validation("edit instruction is empty".into()));
        }

        let id = self.next_ticket();
        self.notice = None;
        self.editor.result = None;
        self.editor.outcome = None;
        self.editor.phase = Phase::Submitting;
        self.editor.pending = Some(Pending {
            id,
            result_mime_type: source.mime_type.clone(),
        });

        Ok(Ticket {
            id,
            job: Job::Edit(EditRequest {
                source,
                instruction: self.editor.instruction.clone(),
            }),
        })
    }

    /// Validates and starts a generation.
    pub fn begin_generation(&mut self) -> Result<Ticket> {
        if self.generator.pending.is_some() {
            return Err(StudioError::Busy(Workflow::Generate));
        }
        if self.generator.description.trim().is_empty() {
            self.notice = Some(Notice::MissingDescription);
            return Err(StudioError::Validation("description is empty".into()));
        }

        let id = self.next_ticket();
        self.notice = None;
        self.generator.result = None;
        self.generator.outcome = None;
        self.generator.phase = Phase::Submitting;
        self.generator.pending = Some(Pending {
            id,
            result_mime_type: DEFAULT_MIME_TYPE.to_string(),
        });

        Ok(Ticket {
            id,
            job: Job::Generate(GenerationRequest {
                description: self.generator.description.clone(),
                style: self.generator.style,
            }),
        })
    }

    /// Starts a submission for `workflow`.
    pub fn begin(&mut self, workflow: Workflow) -> Result<Ticket> {
        match workflow {
            Workflow::Edit => self.begin_edit(),
            Workflow::Generate => self.begin_generation(),
        }
    }

    /// Applies the result of ticket `id`. Returns false for stale tickets.
    pub fn finish(&mut self, workflow: Workflow, id: TicketId, result: Result<Outcome>) -> bool {
        let active = self.mode == workflow;
        let (pending, slot, phase, outcome) = match workflow {
            Workflow::Edit => (
                &mut self.editor.pending,
                &mut self.editor.result,
                &mut self.editor.phase,
                &mut self.editor.outcome,
            ),
            Workflow::Generate => (
                &mut self.generator.pending,
                &mut self.generator.result,
                &mut self.generator.phase,
                &mut self.generator.outcome,
            ),
        };

        let mime_type = match pending {
            Some(p) if p.id == id => p.result_mime_type.clone(),
            _ => {
                tracing::debug!(%workflow, ticket = id, "ignoring stale completion");
                return false;
            }
        };
        *pending = None;

        let notice = match result {
            Ok(Outcome::Image(image)) => {
                *slot = Some(image.retagged(mime_type));
                *phase = Phase::Succeeded;
                None
            }
            Ok(Outcome::Absent) => {
                *slot = None;
                *phase = Phase::Failed;
                Some(Notice::NoImageReturned)
            }
            Err(e) => {
                tracing::error!(%workflow, ticket = id, error = %e, "image request failed");
                *slot = None;
                *phase = Phase::Failed;
                Some(Notice::GenerationFailed)
            }
        };

        *outcome = notice.clone();
        if active {
            self.notice = notice;
        }
        true
    }
}
