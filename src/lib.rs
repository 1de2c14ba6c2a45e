pub mod application;
pub mod auth;
pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::*;
pub use storage::{RefDataRepository, Repository};
