//! Blueprint string codec: `'0'` followed by base64 of zlib-compressed JSON.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::BlueprintError;
use crate::json::BlueprintDocument;

/// Leading version byte of every blueprint string.
pub const VERSION_PREFIX: char = '0';

pub fn encode_document(document: &BlueprintDocument) -> Result<String, BlueprintError> {
    let json = serde_json::to_vec(document)?;
    encode_json(&json)
}

/// Compress and armor raw blueprint JSON.
pub fn encode_json(json: &[u8]) -> Result<String, BlueprintError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(json).map_err(BlueprintError::Compression)?;
    let compressed = encoder.finish().map_err(BlueprintError::Compression)?;

    let mut out = String::with_capacity(1 + compressed.len().div_ceil(3) * 4);
    out.push(VERSION_PREFIX);
    STANDARD.encode_string(&compressed, &mut out);
    Ok(out)
}

/// Inverse of [`encode_json`].
pub fn decode_json(blueprint: &str) -> Result<Vec<u8>, BlueprintError> {
    let body = blueprint
        .trim()
        .strip_prefix(VERSION_PREFIX)
        .ok_or(BlueprintError::MissingVersionPrefix)?;
    let compressed = STANDARD.decode(body)?;
    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(BlueprintError::Compression)?;
    Ok(json)
}

/// Parse a blueprint string back into its document.
pub fn decode_blueprint(blueprint: &str) -> Result<BlueprintDocument, BlueprintError> {
    let json = decode_json(blueprint)?;
    Ok(serde_json::from_slice(&json)?)
}
