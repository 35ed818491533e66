//! Generated Rust types and async client for the Chainbase TON HTTP API.
//!
//! Request parameter types and the operation table are generated at build time
//! from the API's OpenAPI document (`openapi.json`), so every endpoint is a fixed
//! path and verb with a strongly-typed parameter struct.
//!
//! # Features
//!
//! - **`types` module**: request parameter types, one `<OperationId>Params` struct
//!   per endpoint that takes parameters. Available with no additional features.
//! - **`operations` module**: the static table of endpoints (id, path, verb,
//!   declared parameters), the declared server and security scheme.
//! - **`client` module** (enabled by default): an async client built on `reqwest`
//!   with one method per endpoint.
//!
//! # Quick start
//!
//! ```no_run
//! use ton_openapi_client::{TonApiClient, types::*};
//!
//! #[tokio::main]
//! async fn main() -> ton_openapi_client::client::Result<()> {
//!     let mut client = TonApiClient::mainnet();
//!     client.auth("my-api-key");
//!
//!     let info = client.get_masterchain_info().await?;
//!     let balance = client
//!         .get_address_balance(GetAddressBalanceParams::new(
//!             "EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N",
//!         ))
//!         .await?;
//!     println!("Masterchain at {}, balance {balance}", info.last.seqno);
//!     Ok(())
//! }
//! ```

mod block_helpers;
pub mod config;
pub mod metadata;
pub mod models;
pub mod operations;
pub mod types;

pub use block_helpers::{BASECHAIN, BlockId, MASTERCHAIN, SHARD_ALL};
pub use config::{ClientOptions, Credentials, SecurityScheme};
pub use operations::Operation;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::TonApiClient;

pub use types::*;
