//! Folio Admin - the editing side of the Folio portfolio CMS
//!
//! [`AdminDataController`] loads all content and projects, keeps unsaved
//! field edits, writes changes back through a
//! [`DataGateway`](folio_client::DataGateway) and tracks upload progress
//! per field. Saves are serialized by rejecting overlapping requests.

pub mod controller;
pub mod edits;
pub mod error;
pub mod media;
pub mod section;
pub mod status;
pub mod upload_state;

pub use controller::{AdminDataController, LoadReport};
pub use error::ControllerError;
pub use media::MediaKind;
pub use section::Section;
pub use status::StatusMessage;
pub use upload_state::UploadProgress;
