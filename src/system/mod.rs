//! Core system components for robot operation
pub mod collision;
pub mod display;
pub mod distance;
pub mod drive_command;
pub mod filter;
pub mod navigation;
pub mod resources;
