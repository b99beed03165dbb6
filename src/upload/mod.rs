//! Transient storage for uploaded files.

pub mod transient;

pub use transient::{audio_extension, audio_mime_type, UploadStore};
