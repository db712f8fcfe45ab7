//! Outfit photo storage
//!
//! Names, validates and uploads the photos of a new outfit, and removes them
//! when the outfit is deleted or its publication fails.

pub mod models;
pub mod naming;
pub mod uploader;

pub use models::{ImageFormat, UploadedPhoto};
pub use uploader::MediaUploader;
