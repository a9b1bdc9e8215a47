//! Byte encoding of reference vectors: little-endian IEEE-754 f32,
//! no header or length prefix. A D-dimensional vector is exactly D*4 bytes.

use crate::FaceError;

/// Encodes a vector as raw little-endian f32 bytes.
pub fn encode_vector(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

/// Decodes raw little-endian f32 bytes. The byte length must be exactly `dim * 4`.
pub fn decode_vector(bytes: &[u8], dim: usize) -> Result<Vec<f32>, FaceError> {
    if bytes.len() != dim * 4 {
        return Err(FaceError::MalformedRecord(format!(
            "vector is {} bytes, want {}",
            bytes.len(),
            dim * 4
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
