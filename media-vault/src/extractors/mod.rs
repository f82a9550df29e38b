//! Axum extractors for media-vault
//!
//! Provides extractors for the client address and for multipart upload
//! batches.

mod client;
mod file_upload;

pub use client::ClientAddress;
pub use file_upload::{UploadBatch, UploadBatchRejection};

pub use crate::ingest::IncomingPart;
