pub mod browser;
pub mod create;
pub mod error;
pub mod icon;
pub mod launcher;
pub mod prompt;
pub mod registry;
pub mod structs;
