pub mod bump_monitor;
pub mod display_status;
pub mod drive;
pub mod navigate;
pub mod sample_ir;
