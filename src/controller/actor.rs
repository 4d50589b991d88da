//! Single-owner controller task and the handle used to talk to it.

use crate::adapter::{GenerationBackend, Outcome, RequestAdapter, StyleVariant};
use crate::controller::state::{Job, Studio, StudioView, TicketId, Workflow};
use crate::error::{Result, StudioError};
use crate::image::SelectedFile;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Depth of the command queue.
const COMMAND_BUFFER: usize = 32;

enum Command {
    SelectFile {
        file: Result<Option<SelectedFile>>,
        reply: oneshot::Sender<Result<()>>,
    },
    Update {
        update: Update,
        reply: oneshot::Sender<()>,
    },
    Submit {
        workflow: Workflow,
        reply: oneshot::Sender<Result<TicketId>>,
    },
}

enum Update {
    Instruction(String),
    Description(String),
    Style(StyleVariant),
    Mode(Workflow),
}

struct Completion {
    workflow: Workflow,
    id: TicketId,
    result: Result<Outcome>,
}

/// Owns the [`Studio`] and runs adapter calls on its behalf.
///
/// Every state change happens on the controller task, so two responses can
/// never race on the displayed result. Views are published after every
/// change and before any reply is sent.
pub struct StudioController<B> {
    studio: Studio,
    adapter: Arc<RequestAdapter<B>>,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    views: watch::Sender<StudioView>,
}

impl<B: GenerationBackend + 'static> StudioController<B> {
    /// Starts the controller on the current tokio runtime.
    pub fn spawn(adapter: RequestAdapter<B>) -> StudioHandle {
        let studio = Studio::new();
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (views, views_rx) = watch::channel(studio.view());

        let controller = Self {
            studio,
            adapter: Arc::new(adapter),
            commands,
            completions_tx,
            completions_rx,
            views,
        };
        tokio::spawn(controller.run());

        StudioHandle {
            commands: commands_tx,
            views: views_rx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(done) = self.completions_rx.recv() => {
                    self.studio.finish(done.workflow, done.id, done.result);
                    self.publish();
                }
            }
        }
        tracing::debug!("studio controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SelectFile { file, reply } => {
                let result = match file {
                    Ok(file) => self.studio.select_file(file),
                    Err(e) => Err(self.studio.reject_file(e)),
                };
                self.publish();
                let _ = reply.send(result);
            }
            Command::Update { update, reply } => {
                match update {
                    Update::Instruction(text) => self.studio.set_instruction(text),
                    Update::Description(text) => self.studio.set_description(text),
                    Update::Style(style) => self.studio.set_style(style),
                    Update::Mode(mode) => self.studio.switch_mode(mode),
                }
                self.publish();
                let _ = reply.send(());
            }
            Command::Submit { workflow, reply } => {
                let result = self.studio.begin(workflow).map(|ticket| {
                    let id = ticket.id;
                    self.dispatch(id, ticket.job);
                    id
                });
                if let Err(e) = &result {
                    tracing::debug!(%workflow, error = %e, "submission rejected");
                }
                self.publish();
                let _ = reply.send(result);
            }
        }
    }

    fn dispatch(&self, id: TicketId, job: Job) {
        let adapter = Arc::clone(&self.adapter);
        let completions = self.completions_tx.clone();
        let workflow = job.workflow();

        tracing::debug!(%workflow, ticket = id, "dispatching request");
        tokio::spawn(async move {
            let result = match &job {
                Job::Edit(request) => adapter.run_edit(request).await,
                Job::Generate(request) => adapter.run_generation(request).await,
            };
            let _ = completions.send(Completion {
                workflow,
                id,
                result,
            });
        });
    }

    fn publish(&self) {
        self.views.send_replace(self.studio.view());
    }
}

/// Cloneable handle to a running [`StudioController`].
#[derive(Clone)]
pub struct StudioHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<StudioView>,
}

impl StudioHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| StudioError::ControllerClosed)
    }

    /// Selects the image to edit. `None` means the picker was dismissed.
    pub async fn select_file(&self, file: Option<SelectedFile>) -> Result<()> {
        self.select(Ok(file)).await
    }

    /// Reads `path` and selects it as the image to edit.
    ///
    /// A read failure is reported through the view like any other
    /// unreadable upload.
    pub async fn select_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = SelectedFile::from_path(path).map(Some);
        self.select(file).await
    }

    async fn select(&self, file: Result<Option<SelectedFile>>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SelectFile { file, reply }).await?;
        rx.await.map_err(|_| StudioError::ControllerClosed)?
    }

    async fn update(&self, update: Update) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Update { update, reply }).await?;
        rx.await.map_err(|_| StudioError::ControllerClosed)
    }

    /// Sets the edit instruction.
    pub async fn set_instruction(&self, instruction: impl Into<String>) -> Result<()> {
        self.update(Update::Instruction(instruction.into())).await
    }

    /// Sets the blueprint description.
    pub async fn set_description(&self, description: impl Into<String>) -> Result<()> {
        self.update(Update::Description(description.into())).await
    }

    /// Selects the blueprint style.
    pub async fn set_style(&self, style: StyleVariant) -> Result<()> {
        self.update(Update::Style(style)).await
    }

    /// Switches the active workflow.
    pub async fn switch_mode(&self, mode: Workflow) -> Result<()> {
        self.update(Update::Mode(mode)).await
    }

    /// Submits the edit. Returns once the request is accepted, not finished.
    pub async fn submit_edit(&self) -> Result<TicketId> {
        self.submit(Workflow::Edit).await
    }

    /// Submits the generation. Returns once the request is accepted.
    pub async fn submit_generation(&self) -> Result<TicketId> {
        self.submit(Workflow::Generate).await
    }

    async fn submit(&self, workflow: Workflow) -> Result<TicketId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { workflow, reply }).await?;
        rx.await.map_err(|_| StudioError::ControllerClosed)?
    }

    /// Latest published view.
    pub fn view(&self) -> StudioView {
        self.views.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StudioView> {
        self.views.clone()
    }

    /// Waits until `workflow` has no request in flight.
    pub async fn wait_settled(&self, workflow: Workflow) -> Result<StudioView> {
        let mut views = self.views.clone();
        let view = views
            .wait_for(|view| !view.is_pending(workflow))
            .await
            .map_err(|_| StudioError::ControllerClosed)?;
        Ok(view.clone())
    }
}
