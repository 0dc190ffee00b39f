//! Folio Client - data access for the Folio portfolio CMS
//!
//! This crate provides:
//! - A `DataGateway` over the hosted backend's `site_content` and `projects`
//!   tables and its auth session, with REST and in-memory implementations
//! - The media upload pipeline (signed URL + streamed PUT with progress)
//! - The public read path that aggregates content and projects
//!
//! Network operations are never retried; failures surface to the caller.

pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod http;
pub mod model;
pub mod site;
pub mod upload;

pub use config::ClientConfig;
pub use error::{GatewayError, UploadError};
pub use gateway::{DataGateway, MemoryGateway, RestGateway};
pub use http::RestClient;
pub use model::*;
pub use site::{Fetch, SiteData, SiteDataAggregator};
pub use upload::{MediaFile, MediaUploader, UploadTransport};
