pub mod conversation;
pub mod error;
pub mod session;
pub mod types;

pub use conversation::Conversation;
pub use error::{ChatError, Result};
pub use session::{ChatSession, StopHandle, SubmitOutcome};
pub use types::{Message, MessageId, MessageKind, QueryRequest, QueryResponse, ResponseMode, Role};
