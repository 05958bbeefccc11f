//! UI layer for desktop GUI: app shell and screens.

pub mod app;

pub use app::{PersistedDesktopSettings, RxDeskApp, StartupConfig, SETTINGS_STORAGE_KEY};
