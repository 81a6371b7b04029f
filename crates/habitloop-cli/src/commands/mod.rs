pub mod auth;
pub mod config;
pub mod done;
pub mod habit;
pub mod remind;
pub mod stats;
