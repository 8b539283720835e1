//! Fixed byte layout for cached vectors.
//!
//! Little-endian IEEE-754 f32, no header: a vector of dimension `d` is
//! exactly `d * 4` bytes. Decoding is lossless, so a cached vector comes
//! back bit-identical to what the provider returned.

/// Encode a float vector into its storage bytes.
pub fn encode(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode storage bytes into a float vector of the expected dimensionality.
///
/// Returns a human-readable reason on length mismatch; the caller wraps it
/// into its error type with the offending key attached.
pub fn decode(bytes: &[u8], dimension: usize) -> Result<Vec<f32>, String> {
    if bytes.len() != dimension * 4 {
        return Err(format!(
            "expected {} bytes for dimension {}, found {}",
            dimension * 4,
            dimension,
            bytes.len()
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_bit_identical() {
        let values = vec![0.0_f32, -1.5, 3.25, f32::MIN_POSITIVE, 1e30];
        let bytes = encode(&values);
        let decoded = decode(&bytes, values.len()).unwrap();
        for (a, b) in values.iter().zip(decoded.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_encode_is_little_endian() {
        let bytes = encode(&[1.0]);
        assert_eq!(bytes, 1.0_f32.to_le_bytes());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = encode(&[1.0, 2.0]);
        assert!(decode(&bytes, 3).is_err());
        assert!(decode(&bytes[..7], 2).is_err());
    }

    #[test]
    fn test_empty_dimension_zero() {
        // Dimension zero never occurs (settings validation), but the codec
        // itself is total.
        assert_eq!(decode(&[], 0).unwrap().len(), 0);
    }
}
