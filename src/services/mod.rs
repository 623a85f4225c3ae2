pub mod details;
pub mod discovery;
pub mod events;
pub mod genres;
pub mod matcher;
pub mod providers;
pub mod report;
pub mod session;
