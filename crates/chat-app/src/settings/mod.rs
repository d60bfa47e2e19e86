pub mod state;

pub use state::{ChatSettings, SettingsStore};
