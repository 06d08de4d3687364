pub mod error;
pub mod http;
pub mod mock;
pub mod query;
pub mod types;

pub use error::TransportError;
pub use query::HttpTransport;
pub use types::BaseUrl;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::core::types::{QueryRequest, QueryResponse};

/// Decoded text chunks of a streamed reply, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Something that can answer a transcript.
///
/// Implementations must be cancel safe: the session drops the returned
/// futures and streams when the user stops a reply.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Sends the transcript and waits for one finished reply.
    async fn complete(&self, request: QueryRequest) -> Result<QueryResponse, TransportError>;

    /// Sends the transcript and returns the reply body as it arrives.
    async fn stream(&self, request: QueryRequest) -> Result<ChunkStream, TransportError>;
}
