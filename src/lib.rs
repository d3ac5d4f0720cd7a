pub mod backup;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod flock;
pub mod git;
pub mod lifecycle;
pub mod model;
pub mod sdk;

mod api;

pub use api::{SdkManager, SdkManagerBuilder};
