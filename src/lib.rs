pub mod cloudflare;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use cloudflare::{Credentials, GatewayClient};
pub use config::{cli::LocalStorage, TomlConfig};
pub use core::{pipeline::BlocklistPipeline, sync::SyncEngine};
pub use utils::error::{Result, SyncError};
