pub mod async_actions;
pub mod input;
pub mod mouse;
pub mod tasks;
