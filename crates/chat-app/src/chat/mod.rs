/// Event contracts between the chat views.
pub mod events;
pub mod message_input;
/// Transcript rendering and row presentation.
pub mod message_list;
pub mod scroll_manager;
pub mod view;
/// Onboarding panel shown before the first turn.
pub mod welcome;

pub use events::{BeginClicked, Submit};
pub use message_input::{INPUT_PLACEHOLDER, MessageInput, send_button_label};
pub use message_list::{MessageList, MessageRow, PONDERING_TEXT, RowStyle, row_presentations};
pub use scroll_manager::{ScrollManager, distance_from_bottom, next_pinned};
pub use view::{CONNECTING_TEXT, ChatView, status_message};
pub use welcome::WelcomePanel;
