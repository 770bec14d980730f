use alloy_primitives::U256;

use crate::{
    constants::U256_BYTE_LENGTH,
    error::{CodecError, Result},
    types::Address,
};

// Convert a u256 to its 32-byte big-endian form
pub fn u256_to_be_bytes(value: U256) -> [u8; U256_BYTE_LENGTH] {
    value.to_be_bytes::<U256_BYTE_LENGTH>()
}

// Convert big-endian bytes to a u256.
// Shorter inputs are treated as if zero padded on the left.
pub fn be_bytes_to_u256(bytes: &[u8]) -> Result<U256> {
    if bytes.len() > U256_BYTE_LENGTH {
        return Err(CodecError::ValueTooLarge {
            field: "u256",
            size: bytes.len(),
            max: U256_BYTE_LENGTH,
        });
    }

    let mut padded = [0u8; U256_BYTE_LENGTH];
    padded[U256_BYTE_LENGTH - bytes.len()..].copy_from_slice(bytes);

    Ok(U256::from_be_bytes(padded))
}

// Strict form used by the writer: anything but exactly 32 bytes is rejected
pub fn u256_from_exact_slice(bytes: &[u8]) -> Result<U256> {
    let exact: [u8; U256_BYTE_LENGTH] =
        bytes.try_into().map_err(|_| CodecError::ValueTooLarge {
            field: "u256",
            size: bytes.len(),
            max: U256_BYTE_LENGTH,
        })?;

    Ok(U256::from_be_bytes(exact))
}

// Checked narrowing of a u256 to u64
pub fn u256_to_u64(value: &U256) -> Result<u64> {
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) {
        let significant = U256_BYTE_LENGTH - (value.leading_zeros() / 8);
        return Err(CodecError::ValueTooLarge {
            field: "u64",
            size: significant,
            max: 8,
        });
    }

    Ok(limbs[0])
}

// Render an address as its fixed-width, zero padded wire form
pub fn address_to_fixed_bytes(address: &Address, width: usize) -> Result<Vec<u8>> {
    let bytes = address.as_bytes();
    if bytes.len() > width {
        return Err(CodecError::ValueTooLarge {
            field: "address",
            size: bytes.len(),
            max: width,
        });
    }

    let mut fixed = vec![0u8; width];
    fixed[..bytes.len()].copy_from_slice(bytes);

    Ok(fixed)
}

// Everything before the first zero byte
pub fn zero_stopped(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|byte| *byte == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
