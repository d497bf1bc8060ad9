//! Talking to the searchica search service.
//!
//! Provides the [`SearchApi`] seam with its reqwest-backed implementation
//! [`SearchClient`], the retry policy for transport failures, the client
//! error taxonomy, and the layered [`Config`].

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod error;
pub mod retry;

pub use client::{SearchApi, SearchClient};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use retry::RetryPolicy;
