pub mod commands;
pub mod config;
pub mod ipc;  // invoke-by-name HTTP 서버
pub mod release;
pub mod store;

pub use showcase_updater as updater;
