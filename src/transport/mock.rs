use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::types::{QueryRequest, QueryResponse, Role, WireMessage};
use crate::transport::error::TransportError;
use crate::transport::{ChunkStream, QueryTransport};

/// One scripted answer. Streaming and single-shot calls both consume from
/// the same queue.
#[derive(Debug, Clone)]
pub enum MockReply {
    Chunks(Vec<String>),
    Status { status: u16, body: String },
    Unavailable,
    BrokenStream { chunks: Vec<String>, error: String },
    /// Yields the chunks, then never finishes.
    Stalled { chunks: Vec<String> },
    /// Never produces a response head.
    NoResponse,
}

impl MockReply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Chunks(vec![text.into()])
    }

    #[must_use]
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            body: String::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    request_history: Arc<Mutex<Vec<QueryRequest>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<QueryRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    fn next_reply(&self, request: QueryRequest) -> Result<MockReply, TransportError> {
        self.request_history.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::Connection("MockTransport: no replies queued".into()))
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued", &self.replies.lock().len())
            .field("requests", &self.request_count())
            .finish()
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: QueryRequest) -> Result<QueryResponse, TransportError> {
        match self.next_reply(request)? {
            MockReply::Chunks(chunks) => Ok(QueryResponse {
                response: WireMessage::new(Role::Assistant, chunks.concat()),
            }),
            MockReply::Status { status, body } => Err(TransportError::from_status(status, &body)),
            MockReply::Unavailable => Err(TransportError::Parse("empty response body".into())),
            MockReply::BrokenStream { error, .. } => Err(TransportError::Stream(error)),
            MockReply::Stalled { .. } | MockReply::NoResponse => futures::future::pending().await,
        }
    }

    async fn stream(&self, request: QueryRequest) -> Result<ChunkStream, TransportError> {
        match self.next_reply(request)? {
            MockReply::Chunks(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            MockReply::Status { status, body } => Err(TransportError::from_status(status, &body)),
            MockReply::Unavailable => Err(TransportError::StreamUnavailable),
            MockReply::BrokenStream { chunks, error } => {
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(TransportError::Stream(error))));
                Ok(Box::pin(stream::iter(items)))
            }
            MockReply::Stalled { chunks } => {
                let items = stream::iter(chunks.into_iter().map(Ok));
                Ok(Box::pin(futures::StreamExt::chain(items, stream::pending())))
            }
            MockReply::NoResponse => futures::future::pending().await,
        }
    }
}
