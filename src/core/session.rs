use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::conversation::Conversation;
use super::error::Result;
use super::types::{QueryRequest, ResponseMode, Role};
use crate::transport::{QueryTransport, TransportError};

/// How a submitted round ended. Rejected submissions never get this far.
#[derive(Debug)]
pub enum SubmitOutcome {
    Completed,
    Stopped,
    Failed(TransportError),
}

impl SubmitOutcome {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Cancels the reply currently in flight, if any.
///
/// Cloneable so the input side can hold one while the session is busy
/// awaiting the transport.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl StopHandle {
    /// Returns `false` when nothing was in flight.
    pub fn stop(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.active.lock() = Some(token.clone());
        token
    }

    fn disarm(&self) {
        self.active.lock().take();
    }
}

enum Interrupted {
    Stopped,
    Failed(TransportError),
}

impl From<TransportError> for Interrupted {
    fn from(err: TransportError) -> Self {
        Self::Failed(err)
    }
}

pub struct ChatSession {
    id: Uuid,
    conversation: Conversation,
    transport: Arc<dyn QueryTransport>,
    mode: ResponseMode,
    stop: StopHandle,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("transport", &self.transport.name())
            .field("mode", &self.mode)
            .field("messages", &self.conversation.len())
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    #[must_use]
    pub fn new(transport: Arc<dyn QueryTransport>, mode: ResponseMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
            transport,
            mode,
            stop: StopHandle::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub const fn mode(&self) -> ResponseMode {
        self.mode
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) -> bool {
        self.stop.stop()
    }

    /// Runs one round: append the user message, send the transcript, and
    /// reconcile the reply into the conversation.
    ///
    /// `on_update` sees the conversation after the user message is added,
    /// after every reconciled fragment, and once more when the round ends.
    /// Transport failures are recorded in the conversation and reported via
    /// [`SubmitOutcome::Failed`]; only rejected input is an `Err`.
    ///
    /// Dropping the returned future before it finishes (for example under
    /// `tokio::time::timeout`) ends the round like a stop: any partial reply
    /// is kept and the session accepts the next submission.
    pub async fn submit<F>(&mut self, text: &str, mut on_update: F) -> Result<SubmitOutcome>
    where
        F: FnMut(&Conversation),
    {
        let request = self.conversation.append_user_message(text)?;
        let span = tracing::info_span!(
            "round",
            session = %self.id,
            mode = %self.mode,
            messages = request.messages.len()
        );
        let transport = Arc::clone(&self.transport);
        let mode = self.mode;

        let mut round = RoundGuard::arm(&mut self.conversation, &self.stop, span.clone());
        on_update(&*round.conversation);

        let result = match mode {
            ResponseMode::Streaming => {
                stream_reply(
                    transport.as_ref(),
                    round.conversation,
                    request,
                    &round.cancel,
                    &mut on_update,
                )
                .instrument(span.clone())
                .await
            }
            ResponseMode::SingleShot => {
                single_shot_reply(transport.as_ref(), round.conversation, request, &round.cancel)
                    .instrument(span.clone())
                    .await
            }
        };

        let _entered = span.enter();
        let outcome = match result {
            Ok(()) => {
                round.conversation.complete();
                tracing::info!("Reply complete");
                SubmitOutcome::Completed
            }
            Err(Interrupted::Stopped) => {
                round.conversation.complete();
                tracing::info!("Reply stopped by user");
                SubmitOutcome::Stopped
            }
            Err(Interrupted::Failed(err)) => {
                tracing::warn!(error = %err, "Reply failed");
                round.conversation.fail(&format!("Could not get a reply: {err}"));
                SubmitOutcome::Failed(err)
            }
        };

        on_update(&*round.conversation);
        Ok(outcome)
    }
}

/// Owns the conversation for the length of one round. Disarms the stop
/// handle on drop and, if the round never settled, clears pending.
struct RoundGuard<'a> {
    conversation: &'a mut Conversation,
    stop: &'a StopHandle,
    cancel: CancellationToken,
    span: tracing::Span,
}

impl<'a> RoundGuard<'a> {
    fn arm(conversation: &'a mut Conversation, stop: &'a StopHandle, span: tracing::Span) -> Self {
        Self {
            conversation,
            cancel: stop.arm(),
            stop,
            span,
        }
    }
}

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        self.stop.disarm();
        if self.conversation.is_pending() {
            let _entered = self.span.enter();
            tracing::info!("Round abandoned before the reply finished");
            self.conversation.complete();
        }
    }
}

async fn single_shot_reply(
    transport: &dyn QueryTransport,
    conversation: &mut Conversation,
    request: QueryRequest,
    cancel: &CancellationToken,
) -> std::result::Result<(), Interrupted> {
    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Interrupted::Stopped),
        response = transport.complete(request) => response?,
    };

    if response.response.role != Role::Assistant {
        tracing::warn!(
            role = %response.response.role,
            "Reply has unexpected role, recording as assistant"
        );
    }
    conversation.reconcile_assistant_fragment(response.response.content);
    Ok(())
}

async fn stream_reply<F>(
    transport: &dyn QueryTransport,
    conversation: &mut Conversation,
    request: QueryRequest,
    cancel: &CancellationToken,
    on_update: &mut F,
) -> std::result::Result<(), Interrupted>
where
    F: FnMut(&Conversation),
{
    let mut chunks = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Interrupted::Stopped),
        stream = transport.stream(request) => stream?,
    };

    let mut accumulated = String::new();
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Interrupted::Stopped),
            next = chunks.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                accumulated.push_str(&chunk);
                tracing::debug!(
                    bytes = chunk.len(),
                    total = accumulated.len(),
                    "Chunk received"
                );
                conversation.reconcile_assistant_fragment(accumulated.as_str());
                on_update(conversation);
            }
            Some(Err(err)) => return Err(err.into()),
            None => break,
        }
    }

    if conversation.in_progress().is_none() {
        conversation.reconcile_assistant_fragment(String::new());
    }
    Ok(())
}
