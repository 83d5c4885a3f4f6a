//! Presentation model for a single chat message.
//!
//! A bubble is a pure function of a [`Message`]: it decides the styling and
//! avatar for the sender and breaks the content into paragraphs. Front-ends
//! turn it into widgets however they like.

use crate::message::{Message, Role};

/// Visual style of a bubble, one per sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    User,
    Assistant,
}

impl BubbleStyle {
    /// CSS-like class name, handy for front-ends that style by name
    pub fn class_name(&self) -> &'static str {
        match self {
            BubbleStyle::User => "user-message",
            BubbleStyle::Assistant => "assistant-message",
        }
    }

    pub fn avatar(&self) -> &'static str {
        match self {
            BubbleStyle::User => "👤",
            BubbleStyle::Assistant => "🤖",
        }
    }

    /// User bubbles sit on the right with the avatar after the text.
    pub fn avatar_trails(&self) -> bool {
        matches!(self, BubbleStyle::User)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble<'a> {
    pub style: BubbleStyle,
    pub paragraphs: Vec<&'a str>,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message) -> Self {
        let style = match message.role {
            Role::User => BubbleStyle::User,
            Role::Assistant => BubbleStyle::Assistant,
        };

        Self {
            style,
            paragraphs: split_paragraphs(&message.content),
        }
    }

    pub fn avatar(&self) -> &'static str {
        self.style.avatar()
    }
}

/// Split on every `\n`. Unlike `str::lines`, blank lines and a trailing
/// newline each produce an empty paragraph.
pub fn split_paragraphs(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_lines_make_two_paragraphs() {
        let message = Message::assistant("line1\nline2");
        let bubble = MessageBubble::new(&message);
        assert_eq!(bubble.paragraphs, vec!["line1", "line2"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(split_paragraphs("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_paragraphs("a\n"), vec!["a", ""]);
        assert_eq!(split_paragraphs(""), vec![""]);
    }

    #[test]
    fn style_follows_role() {
        let user = Message::user("hi");
        let assistant = Message::assistant("hello");

        let user_bubble = MessageBubble::new(&user);
        assert_eq!(user_bubble.style, BubbleStyle::User);
        assert_eq!(user_bubble.style.class_name(), "user-message");
        assert_eq!(user_bubble.avatar(), "👤");
        assert!(user_bubble.style.avatar_trails());

        let assistant_bubble = MessageBubble::new(&assistant);
        assert_eq!(assistant_bubble.style, BubbleStyle::Assistant);
        assert_eq!(assistant_bubble.style.class_name(), "assistant-message");
        assert_eq!(assistant_bubble.avatar(), "🤖");
        assert!(!assistant_bubble.style.avatar_trails());
    }
}
