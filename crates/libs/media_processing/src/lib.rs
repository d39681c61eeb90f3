#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

//! # Media Processing
//!
//! Image work for guest uploads and albums:
//!
//! - `read_image_metadata`: pixel dimensions plus a flat map of EXIF tags.
//! - `generate_jpeg_thumbnail`: a bounded JPEG thumbnail, orientation corrected.
//! - `render_qr_png`: a PNG QR code for an album's upload link.
//!
//! Everything here is synchronous and CPU bound. Async callers should run it on
//! `tokio::task::spawn_blocking`.

mod metadata;
mod qr;
mod thumbnail;

pub use metadata::*;
pub use qr::*;
pub use thumbnail::*;
