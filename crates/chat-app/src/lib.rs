#![deny(unsafe_code)]

/// Socrates: a single-window chat with a digital philosopher.
///
/// The conversation rules live in [`conversation`] and are independent of the UI; the
/// views in [`chat`] and [`app`] only render controller state and forward user intents.
pub mod app;
/// Chat views and their event contracts.
pub mod chat;
/// Transcript, persona and the conversation controller.
pub mod conversation;
/// Layered settings loading.
pub mod settings;
