pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::brevo::BrevoClient;
pub use config::cli::LocalStorage;
pub use config::provider::ProviderConfig;
pub use core::dispatcher::CampaignDispatcher;
pub use core::handler::{handle_dispatch, handle_dispatch_json, DispatchResponse};
pub use utils::error::{DispatchError, Result};
