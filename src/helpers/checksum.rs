use crate::error::{CodecError, Result};

// Additive checksum: sum of every byte, mod 2^32
pub fn additive_checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, byte| acc.wrapping_add(u32::from(*byte)))
}

// Compare a stored checksum against the bytes it claims to cover
pub fn verify_additive_checksum(bytes: &[u8], expected: u32) -> Result<()> {
    let computed = additive_checksum(bytes);
    if computed != expected {
        return Err(CodecError::ChecksumMismatch { expected, computed });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_checksum() {
        assert_eq!(additive_checksum(&[]), 0);
        assert_eq!(additive_checksum(&[1, 2, 3]), 6);
        assert_eq!(additive_checksum(&[0xff; 4]), 0x3fc);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let data = b"storage".to_vec();
        let checksum = additive_checksum(&data);
        assert!(verify_additive_checksum(&data, checksum).is_ok());

        let mut tampered = data.clone();
        tampered[0] ^= 1;
        assert_eq!(
            verify_additive_checksum(&tampered, checksum),
            Err(CodecError::ChecksumMismatch {
                expected: checksum,
                computed: checksum - 1,
            })
        );
    }
}
