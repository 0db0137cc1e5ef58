pub mod access;
pub mod aggregate;
pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod store;

pub use access::AccessGuard;
pub use completion::{CompletionService, OpenAiCompletionClient};
pub use config::AppConfig;
pub use error::{Error, ErrorBody, Result};
pub use extract::{extract, Extracted};
pub use orchestrator::{AuthProvider, Orchestrator};
pub use session::SessionAction;
pub use store::{DocumentStore, PgStore};
