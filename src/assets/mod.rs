//! Image acquisition, decoding and font loading.

/// Encoded image decoding.
pub mod decode;
/// Card font discovery and text shaping.
pub mod fonts;
/// URL-addressed image sources.
pub mod source;
