//! # Hydrant Core
//!
//! Shared foundation for the Hydrant pipeline crates: atomic artifact
//! persistence, the JSON/binary artifact codec, and tracing initialization.

pub mod logging;
pub mod persistence;

// Re-export commonly used types at the crate root.
pub use persistence::{ArtifactCodec, BinaryCodec, CodecError, JsonCodec};
