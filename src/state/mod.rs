pub mod app_settings;
pub mod app_state;
pub mod favorites;
pub mod messages;
pub mod network;
pub mod reminders;
pub mod store;
