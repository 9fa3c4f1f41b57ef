//! Envelope fingerprint file format library

pub mod json_format;

pub use json_format::{EnvelopeFile, EnvelopeMetadata, ALGORITHM_ID, FORMAT_VERSION};
