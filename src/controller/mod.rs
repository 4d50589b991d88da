//! Application state controller.
//!
//! [`Studio`] is the state machine for both workflows. [`StudioController`]
//! owns one and is the only thing that mutates it; callers talk to it through
//! a [`StudioHandle`].

mod actor;
mod state;

pub use actor::{StudioController, StudioHandle};
pub use state::{
    EditorState, GeneratorState, Job, Notice, Pending, Phase, Studio, StudioView, Ticket,
    TicketId, Workflow,
};
