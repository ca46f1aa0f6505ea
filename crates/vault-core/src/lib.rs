pub mod auth;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod migrations;
pub mod note;
pub mod paths;
pub mod placeholder;
pub mod placeholder_set;
pub mod render;
pub mod search;
pub mod seed;
pub mod steps;
pub mod substitute;
pub mod tag;
pub mod types;

pub use db::Vault;
pub use error::{Result, VaultError};
