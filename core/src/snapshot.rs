//! Reversible string compression used to embed a persisted-state snapshot in
//! a URL: gzip, then unpadded URL-safe base64.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

use crate::CodecError;

pub fn compress(text: &str) -> Result<String, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Fails on any malformed input; callers must treat a failure as "no
/// snapshot available", never as an empty snapshot.
pub fn decompress(token: &str) -> Result<String, CodecError> {
    let compressed = URL_SAFE_NO_PAD.decode(token)?;
    let mut bytes = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}
