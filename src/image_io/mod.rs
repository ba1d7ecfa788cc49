/// Image file I/O
///
/// This module handles:
/// - Decoding source images (PNG/JPEG) with the upload size ceiling
/// - Resampling and encoding adjusted results for download

pub mod export;
pub mod loader;
