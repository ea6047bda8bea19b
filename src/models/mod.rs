pub mod activity;
pub mod common;
pub mod session;
