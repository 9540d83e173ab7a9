pub mod auth;
pub mod cleanup;
pub mod drafts;
pub mod error;
pub mod notices;
pub mod notifier;
pub mod workflow;

pub use auth::AdminSet;
pub use error::{AppealError, AppealResult, NotificationError};
pub use notifier::Notifier;
pub use workflow::{Decision, Workflow, WorkflowConfig};
