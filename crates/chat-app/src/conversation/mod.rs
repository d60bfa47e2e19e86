/// Conversation controller: transcript ownership and the submit contract.
pub mod controller;
pub mod message;
/// Fixed persona text and welcome quotes.
pub mod persona;

pub use controller::{
    ConversationController, PendingTurn, SessionPhase, SubmitOutcome, SubmitRejected,
};
pub use message::{ChatMessage, Role, Transcript};
pub use persona::{FALLBACK_MESSAGE, SYSTEM_PROMPT, WELCOME_QUOTES, random_welcome_quote};
