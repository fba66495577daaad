//! Typed client for YouTube's web and innertube endpoints.
//!
//! Each endpoint is a response type implementing [`response::YouTubeResponse`];
//! [`client::YouTubeClient::send`] validates parameters, builds the request,
//! sends it and decodes the answer.

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod json;
pub mod logger;
pub mod models;
pub mod request;
pub mod response;
pub mod transport;
pub mod validation;
pub mod youtubei;

pub use client::YouTubeClient;
pub use config::ClientConfig;
pub use errors::YouTubeError;
pub use validation::{ParameterKind, ParameterMap};
