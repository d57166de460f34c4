//! OAuth 2.0 Authorization Code grant server.
//!
//! Implements the grant state machine: authorization-code lifecycle
//! (issuance, single-use consumption, expiry), signed access/refresh token
//! issuance and verification with independent secrets per kind, and
//! refresh-token rotation. HTTP transport is axum; persistence sits behind
//! the narrow [`store::Storage`] trait.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use authgrant::config::Config;
//! use authgrant::grant::GrantService;
//! use authgrant::http;
//! use authgrant::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let grants = GrantService::new(Arc::new(MemoryStore::new()), &config);
//!     let router = http::create_router(grants, "subject-1".to_string());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod codes;
pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod random;
pub mod registry;
pub mod store;
pub mod token;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use grant::GrantService;
