pub mod document;
pub mod plot;
pub mod response;

pub use document::{DocumentId, DocumentResult};
pub use plot::{Axis, Layout, Marker, MarkerSize, PlotPayload, Trace};
pub use response::{ApiStatus, SearchRequest, SearchResponse};
