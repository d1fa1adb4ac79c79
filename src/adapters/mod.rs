// Adapters layer: concrete clients for the external collaborators.

pub mod http;

pub use http::{HttpFrameEstimator, HttpSegmenter};
