/// Emitted when the user presses Enter or the send button with the current input text.
///
/// The text is untrimmed; validation belongs to the conversation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted by the welcome panel's explicit "Begin" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeginClicked;
