use super::error::{ChatError, Result};
use super::types::{Message, MessageId, QueryRequest, Role};

/// Ordered transcript of the current session plus the pending flag.
///
/// Pure state: nothing here performs I/O. The session drives it from a
/// single control flow.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: bool,
    in_progress: Option<MessageId>,
    next_id: u64,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and marks the conversation pending.
    ///
    /// Returns the request body to send: every chat message so far, ending
    /// with the new one. Blank input and input while a reply is pending are
    /// rejected without touching the transcript.
    pub fn append_user_message(&mut self, text: &str) -> Result<QueryRequest> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self.pending {
            return Err(ChatError::Busy);
        }

        let id = self.allocate_id();
        self.messages.push(Message::user(id, text));
        self.pending = true;
        self.in_progress = None;

        Ok(self.wire_transcript())
    }

    /// Replaces the in-progress assistant message with `accumulated`, or
    /// starts one if the last entry is not it.
    pub fn reconcile_assistant_fragment(&mut self, accumulated: impl Into<String>) {
        let content = accumulated.into();

        if let Some(id) = self.in_progress
            && let Some(last) = self.messages.last_mut()
            && last.id == id
        {
            *last = Message::assistant(id, content);
            return;
        }

        let id = self.allocate_id();
        self.messages.push(Message::assistant(id, content));
        self.in_progress = Some(id);
    }

    pub fn complete(&mut self) {
        self.pending = false;
        self.in_progress = None;
    }

    /// Ends the pending round with a visible error notice.
    pub fn fail(&mut self, reason: &str) {
        self.in_progress = None;
        let id = self.allocate_id();
        self.messages.push(Message::error_notice(id, reason));
        self.pending = false;
    }

    #[must_use]
    pub fn wire_transcript(&self) -> QueryRequest {
        QueryRequest::new(
            self.messages
                .iter()
                .filter(|m| !m.is_error())
                .map(Message::to_wire)
                .collect(),
        )
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub const fn in_progress(&self) -> Option<MessageId> {
        self.in_progress
    }

    /// Latest assistant reply, skipping notices.
    #[must_use]
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .take_while(|m| m.role != Role::User)
            .find(|m| m.role == Role::Assistant)
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WireMessage;

    #[test]
    fn test_append_user_message_sets_pending() {
        let mut conversation = Conversation::new();
        let request = conversation.append_user_message("Hi").unwrap();

        assert!(conversation.is_pending());
        assert_eq!(conversation.len(), 1);
        assert_eq!(request.messages, vec![WireMessage::new(Role::User, "Hi")]);
    }

    #[test]
    fn test_blank_input_is_rejected_without_mutation() {
        let mut conversation = Conversation::new();

        for input in ["", "   ", "\n\t "] {
            let err = conversation.append_user_message(input).unwrap_err();
            assert!(matches!(err, ChatError::EmptyInput));
        }

        assert!(conversation.is_empty());
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_submission_while_pending_is_rejected() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("first").unwrap();

        let err = conversation.append_user_message("second").unwrap_err();
        assert!(matches!(err, ChatError::Busy));
        assert_eq!(conversation.len(), 1);
        assert!(conversation.is_pending());
    }

    #[test]
    fn test_fragments_replace_in_progress_message() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("greet me").unwrap();

        conversation.reconcile_assistant_fragment("Hel");
        let first_id = conversation.last().unwrap().id;
        conversation.reconcile_assistant_fragment("Hello");
        conversation.complete();

        assert_eq!(conversation.len(), 2);
        let reply = conversation.last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Hello");
        assert_eq!(reply.id, first_id);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_fragment_after_complete_starts_new_message() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("q").unwrap();
        conversation.reconcile_assistant_fragment("a");
        conversation.complete();

        conversation.reconcile_assistant_fragment("b");
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[1].content, "a");
        assert_eq!(conversation.messages()[2].content, "b");
    }

    #[test]
    fn test_transcript_length_tracks_rounds() {
        let mut conversation = Conversation::new();

        for round in 1..=3 {
            conversation
                .append_user_message(&format!("question {round}"))
                .unwrap();
            assert_eq!(conversation.len(), 2 * (round - 1) + 1);

            conversation.reconcile_assistant_fragment(format!("answer {round}"));
            conversation.complete();
            assert_eq!(conversation.len(), 2 * round);
        }
    }

    #[test]
    fn test_request_carries_full_prior_transcript() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("one").unwrap();
        conversation.reconcile_assistant_fragment("reply one");
        conversation.complete();

        let request = conversation.append_user_message("two").unwrap();
        assert_eq!(
            request.messages,
            vec![
                WireMessage::new(Role::User, "one"),
                WireMessage::new(Role::Assistant, "reply one"),
                WireMessage::new(Role::User, "two"),
            ]
        );
    }

    #[test]
    fn test_fail_appends_notice_and_clears_pending() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("q").unwrap();
        conversation.fail("Request failed (500): HTTP 500");

        assert!(!conversation.is_pending());
        let notice = conversation.last().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.role, Role::System);

        let request = conversation.append_user_message("again").unwrap();
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages.iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn test_fail_keeps_partial_reply() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("q").unwrap();
        conversation.reconcile_assistant_fragment("partial");
        conversation.fail("Stream error: reset");

        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[1].content, "partial");
        assert!(conversation.in_progress().is_none());
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("a").unwrap();
        conversation.reconcile_assistant_fragment("b");
        conversation.complete();
        conversation.append_user_message("c").unwrap();

        let ids: Vec<_> = conversation.messages().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_last_reply_stops_at_user_message() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("a").unwrap();
        conversation.reconcile_assistant_fragment("b");
        conversation.complete();
        assert_eq!(conversation.last_reply().map(|m| m.content.as_str()), Some("b"));

        conversation.append_user_message("c").unwrap();
        assert!(conversation.last_reply().is_none());
    }
}
