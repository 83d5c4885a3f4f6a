//! Conversation view model
//!
//! Owns the ordered message list and the loading flag. All mutation goes
//! through the methods here so front-ends only ever render it.

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use crate::client::{self, BackendClient, ChatRequest};
use crate::message::Message;

pub const WELCOME_GREETING: &str = "Hello! I'm your Zomato AI assistant powered by Claude. I can help you search for restaurants, view menus, place orders with Cash on Delivery, and check order status. What would you like to do today?";

pub const RESET_GREETING: &str = "Conversation reset! How can I help you with Zomato today?";

pub const FALLBACK_ERROR: &str =
    "Sorry, I encountered an error. Please make sure the backend server is running and try again.";

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    is_loading: bool,
    revision: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh conversation holding the welcome greeting
    pub fn new() -> Self {
        Self::with_messages(vec![Message::assistant(WELCOME_GREETING)])
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            is_loading: false,
            revision: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Bumped on every change to the message list. Front-ends compare it
    /// against the last value they saw to know when to scroll to the bottom.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.revision += 1;
    }

    /// Synchronous half of a send: appends the user message and turns the
    /// loading flag on. Returns the request to dispatch, or `None` when the
    /// text is blank or a send is already in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() || self.is_loading {
            return None;
        }

        self.push(Message::user(text));
        self.is_loading = true;
        Some(ChatRequest::new(text))
    }

    /// Completion half of a send. Any error becomes the fallback reply.
    /// The loading flag is cleared on every path.
    pub fn complete_send<E: Display>(&mut self, outcome: Result<String, E>) {
        match outcome {
            Ok(reply) => {
                tracing::debug!(chars = reply.chars().count(), "received assistant reply");
                self.push(Message::assistant(reply));
            }
            Err(e) => {
                tracing::error!("chat request failed: {}", e);
                self.push(Message::assistant(FALLBACK_ERROR));
            }
        }
        self.is_loading = false;
    }

    /// Send `text` to the backend and append the outcome.
    ///
    /// The loading flag is released by a guard, so it is cleared even if
    /// this future is dropped before the backend answers.
    pub async fn send_message(&mut self, client: &BackendClient, text: &str) {
        let Some(request) = self.begin_send(text) else {
            return;
        };

        let mut guard = LoadingGuard::new(self);
        let outcome = client.chat(&request).await;
        guard.complete_send(outcome);
    }

    /// Replaces the whole list with the reset greeting on success. A failed
    /// reset is logged and leaves the conversation untouched.
    pub fn complete_reset(&mut self, outcome: client::Result<()>) {
        match outcome {
            Ok(()) => {
                tracing::info!("conversation reset");
                self.replace_all(vec![Message::assistant(RESET_GREETING)]);
            }
            Err(e) => tracing::error!("error resetting conversation: {}", e),
        }
    }

    pub async fn reset_conversation(&mut self, client: &BackendClient) {
        let outcome = client.reset().await;
        self.complete_reset(outcome);
    }
}

/// Clears the loading flag when dropped
struct LoadingGuard<'a> {
    conversation: &'a mut Conversation,
}

impl<'a> LoadingGuard<'a> {
    fn new(conversation: &'a mut Conversation) -> Self {
        Self { conversation }
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = Conversation;

    fn deref(&self) -> &Conversation {
        self.conversation
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut Conversation {
        self.conversation
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.conversation.is_loading = false;
    }
}
