//! Response payload decoding

use crate::ConnectionError;
use flate2::read::GzDecoder;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decodes a response payload into text
///
/// Payloads carrying the gzip magic bytes are decompressed first, even
/// when no `Content-Encoding` header announced them. A payload that looks
/// like gzip but fails to decompress is decoded as-is.
pub fn decode_body(payload: &[u8]) -> Result<String, ConnectionError> {
    let bytes = if payload.starts_with(&GZIP_MAGIC) {
        match gunzip(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Payload is not valid gzip ({}), decoding verbatim", e);
                payload.to_vec()
            }
        }
    } else {
        payload.to_vec()
    };

    String::from_utf8(bytes).map_err(|e| ConnectionError::Decode {
        message: e.to_string(),
    })
}

fn gunzip(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(payload);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}
