//! Core model for searchica.
//!
//! This crate defines the values exchanged with the search service
//! (document results and the scatter-plot payload), the color model used to
//! draw markers, and the [`SearchSession`] state machine that owns results,
//! plot, selection and hover for a client.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod color;
pub mod error;
pub mod model;
pub mod session;

pub use color::Rgb;
pub use error::{Error, Result};
pub use model::{
    ApiStatus, DocumentId, DocumentResult, Layout, Marker, MarkerSize, PlotPayload, SearchRequest,
    SearchResponse, Trace,
};
pub use session::{Completion, MainPanel, SearchSession, SearchTicket, EXAMPLE_QUERY};
