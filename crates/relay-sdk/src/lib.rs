//! Public SDK for the relay client.
//!
//! Wires the session and processing backends behind one handle:
//!
//! ```ignore
//! use relay_sdk::prelude::*;
//!
//! let mut config = RelayConfig::default();
//! config.apply_env()?;
//!
//! let client = RelayClient::from_config(&config)?;
//! match client.process_key("report-42").await {
//!     Ok(Resolved::Cache(envelope)) => println!("cached: {:?}", envelope),
//!     Ok(Resolved::Processed(envelope)) => println!("processed: {:?}", envelope),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```

mod client;
mod config;

pub use client::RelayClient;
pub use config::*;

pub use relay_api;
pub use relay_executor;
pub use relay_transport;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{ConfigError, EndpointConfig, RelayClient, RelayConfig};
    pub use relay_api::*;
    pub use relay_executor::*;
    pub use relay_transport::prelude::*;
}
