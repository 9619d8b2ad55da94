//! Catalogue REST API
//!
//! # Module Structure
//!
//! - [`client`] - Base-URL aware client with one method per verb
//! - [`http`] - JSON-over-HTTP transport with lenient body parsing
//! - [`error`] - Transport and rejection errors
//!
//! # Example
//!
//! ```ignore
//! use tkino::api::ApiClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ApiClient::new("https://example.xano.io/api:abc", std::time::Duration::from_secs(30))?;
//!     let actors = client.get("/actor").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;

pub use client::ApiClient;
pub use error::ApiError;
