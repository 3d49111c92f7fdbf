pub mod api;
pub mod cache;
pub mod cmd;
pub mod config;
pub mod context;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod usecase;

pub use config::Config;
pub use context::TxId;
pub use db::{init_db, Repository};
pub use error::AppError;
