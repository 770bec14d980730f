use alloy_primitives::U256;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, warn};

use crate::{
    config::CodecConfig,
    constants::{
        MAX_CALLS_PER_CONTRACT, MAX_CONTRACTS_PER_MULTI_CALL, SELECTOR_BYTE_LENGTH,
        U256_BYTE_LENGTH, WireVersion,
    },
    error::{CodecError, Result},
    helpers::checksum::verify_additive_checksum,
    types::{
        AbiRegistryItem, Address, AddressValueMap, BlockchainStorage, ContractAbiMap, MethodMap,
        MultiCallMap, PointerStorage, Selector, SelectorsMap, event::NetEvent,
    },
};

use super::{next_arg::NextValue, serializers::zero_stopped};

const DEFAULT_OFFSET: usize = 0;

/// Bounds-checked cursor over an encoded buffer.
///
/// Every read either consumes exactly the bytes it needs or fails without
/// touching the cursor. A failed read means the whole buffer must be rejected.
#[derive(Debug, Clone)]
pub struct BinaryReader {
    buffer: Vec<u8>,
    offset: usize,
    wire_version: WireVersion,
}

impl BinaryReader {
    pub fn from_bytes(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            offset: DEFAULT_OFFSET,
            wire_version: WireVersion::CURRENT,
        }
    }

    /// Reader for buffers of the configured wire generation.
    pub fn with_config(buffer: Vec<u8>, config: &CodecConfig) -> Self {
        Self {
            wire_version: config.wire_version,
            ..Self::from_bytes(buffer)
        }
    }

    pub fn wire_version(&self) -> WireVersion {
        self.wire_version
    }

    /// Replaces the buffer and rewinds the cursor.
    pub fn set_buffer(&mut self, buffer: Vec<u8>) {
        self.buffer = buffer;
        self.offset = DEFAULT_OFFSET;
    }

    pub fn get_buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Moves the cursor, e.g. to re-read a region whose offset was saved earlier.
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        if offset > self.buffer.len() {
            return Err(CodecError::BufferUnderrun {
                offset,
                requested: 0,
                length: self.buffer.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    fn underrun(&self, requested: usize) -> CodecError {
        warn!(
            offset = self.offset,
            requested,
            length = self.buffer.len(),
            "read past end of buffer"
        );
        CodecError::BufferUnderrun {
            offset: self.offset,
            requested,
            length: self.buffer.len(),
        }
    }

    // Checks the whole read fits before anything is consumed
    fn verify_end(&self, size: usize) -> Result<usize> {
        match self.offset.checked_add(size) {
            Some(end) if end <= self.buffer.len() => Ok(end),
            _ => Err(self.underrun(size)),
        }
    }

    fn read_slice(&mut self, len: usize) -> Result<&[u8]> {
        let start = self.offset;
        let end = self.verify_end(len)?;
        self.offset = end;
        Ok(&self.buffer[start..end])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_slice(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_slice(4)?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_slice(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_slice(8)?))
    }

    /// Reads 32 big-endian bytes.
    pub fn read_u256(&mut self) -> Result<U256> {
        let mut bytes = [0u8; U256_BYTE_LENGTH];
        bytes.copy_from_slice(self.read_slice(U256_BYTE_LENGTH)?);
        Ok(U256::from_be_bytes(bytes))
    }

    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_selector(&mut self) -> Result<Selector> {
        Ok(BigEndian::read_u32(self.read_slice(SELECTOR_BYTE_LENGTH)?))
    }

    /// Reads `length` bytes. With `zero_stop` the result ends at the first zero
    /// byte, but the cursor still moves past all `length` bytes.
    pub fn read_bytes(&mut self, length: usize, zero_stop: bool) -> Result<Vec<u8>> {
        let bytes = self.read_slice(length)?;
        if zero_stop {
            Ok(zero_stopped(bytes).to_vec())
        } else {
            Ok(bytes.to_vec())
        }
    }

    /// Fixed-length, zero-stop UTF-8 string.
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        let start = self.offset;
        let bytes = self.read_bytes(length, true)?;
        let decoded_length = bytes.len();
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 {
            offset: start,
            length: decoded_length,
        })
    }

    /// u16 byte length, then the string. Decoding stops at the first zero
    /// byte like every other string field, but always consumes `length` bytes.
    pub fn read_string_with_length(&mut self) -> Result<String> {
        let length = self.read_u16()?;
        self.read_string(usize::from(length))
    }

    /// u32 length-prefixed bytes. A `max_length` of 0 means unbounded.
    pub fn read_bytes_with_length(&mut self, max_length: usize) -> Result<Vec<u8>> {
        let length = self.read_u32()? as usize;
        if max_length > 0 && length > max_length {
            return Err(cap_exceeded("data bytes", length, max_length));
        }

        self.read_bytes(length, false)
    }

    pub fn read_address(&mut self) -> Result<Address> {
        self.read_string(self.wire_version.address_byte_length())
            .map(Address::from)
    }

    /// u16 count followed by that many `T`.
    pub fn read_array<T>(&mut self) -> Result<Vec<T>>
    where
        BinaryReader: NextValue<T>,
    {
        let length = usize::from(self.read_u16()?);
        let mut result = Vec::with_capacity(length);
        for _ in 0..length {
            result.push(self.next_value()?);
        }
        Ok(result)
    }

    pub fn read_u8_array(&mut self) -> Result<Vec<u8>> {
        self.read_array()
    }

    pub fn read_u16_array(&mut self) -> Result<Vec<u16>> {
        self.read_array()
    }

    pub fn read_u32_array(&mut self) -> Result<Vec<u32>> {
        self.read_array()
    }

    pub fn read_u64_array(&mut self) -> Result<Vec<u64>> {
        self.read_array()
    }

    pub fn read_u256_array(&mut self) -> Result<Vec<U256>> {
        self.read_array()
    }

    pub fn read_address_array(&mut self) -> Result<Vec<Address>> {
        self.read_array()
    }

    pub fn read_string_array(&mut self) -> Result<Vec<String>> {
        self.read_array()
    }

    pub fn read_bytes_array(&mut self) -> Result<Vec<Vec<u8>>> {
        self.read_array()
    }

    /// u32 count of u256 values.
    pub fn read_tuple(&mut self) -> Result<Vec<U256>> {
        let length = self.read_u32()? as usize;
        // Refuse to allocate for a count the buffer cannot possibly hold
        let needed = length.saturating_mul(U256_BYTE_LENGTH);
        if needed > self.remaining() {
            return Err(self.underrun(needed));
        }

        let mut result = Vec::with_capacity(length);
        for _ in 0..length {
            result.push(self.read_u256()?);
        }
        Ok(result)
    }

    pub fn read_abi_selector(&mut self) -> Result<AbiRegistryItem> {
        let name = self.read_string_with_length()?;
        let selector = self.read_selector()?;

        Ok(AbiRegistryItem { name, selector })
    }

    pub fn read_view_selectors_map(&mut self) -> Result<SelectorsMap> {
        let length = self.read_u16()?;
        let mut map = SelectorsMap::new();

        for _ in 0..length {
            let key = self.read_string_with_length()?;
            let value = self.read_selector()?;

            map.insert_unique(key, value)
                .map_err(|(key, _)| duplicate_key("view selectors map", key))?;
        }

        debug!(entries = map.size(), "decoded view selectors map");
        Ok(map)
    }

    pub fn read_method_selectors_map(&mut self) -> Result<MethodMap> {
        self.read_selector_set("method selectors map")
    }

    pub fn read_method_selectors(&mut self) -> Result<ContractAbiMap> {
        self.read_selector_set("contract ABI selectors")
    }

    fn read_selector_set(&mut self, collection: &'static str) -> Result<MethodMap> {
        let length = self.read_u16()?;
        let mut selectors = MethodMap::new();

        for _ in 0..length {
            let selector = self.read_selector()?;
            if !selectors.add(selector) {
                return Err(duplicate_key(collection, format!("{:#010x}", selector)));
            }
        }

        debug!(entries = selectors.size(), collection, "decoded selector set");
        Ok(selectors)
    }

    pub fn read_address_value_map(&mut self) -> Result<AddressValueMap> {
        let length = self.read_u16()?;
        let mut map = AddressValueMap::new();

        for _ in 0..length {
            let address = self.read_address()?;
            let value = self.read_u256()?;

            map.insert_unique(address, value)
                .map_err(|(address, _)| duplicate_key("address value map", address))?;
        }

        debug!(entries = map.size(), "decoded address value map");
        Ok(map)
    }

    /// Call payloads per contract, capped at 8 contracts and 10 calls each.
    pub fn read_multi_bytes_address_map(&mut self) -> Result<MultiCallMap> {
        let size = usize::from(self.read_u8()?);
        if size > MAX_CONTRACTS_PER_MULTI_CALL {
            return Err(cap_exceeded(
                "contracts called",
                size,
                MAX_CONTRACTS_PER_MULTI_CALL,
            ));
        }

        let mut map = MultiCallMap::new();
        for _ in 0..size {
            let address = self.read_address()?;
            let response_size = usize::from(self.read_u8()?);
            if response_size > MAX_CALLS_PER_CONTRACT {
                return Err(cap_exceeded("calls", response_size, MAX_CALLS_PER_CONTRACT));
            }

            let mut calls = Vec::with_capacity(response_size);
            for _ in 0..response_size {
                calls.push(self.read_bytes_with_length(0)?);
            }

            map.insert_unique(address, calls)
                .map_err(|(address, _)| duplicate_key("multi call map", address))?;
        }

        debug!(contracts = map.size(), "decoded multi call map");
        Ok(map)
    }

    pub fn read_storage(&mut self) -> Result<BlockchainStorage> {
        let contracts_size = self.read_u32()?;
        let mut storage = BlockchainStorage::new();

        for _ in 0..contracts_size {
            let address = self.read_address()?;
            let storage_size = self.read_u32()?;
            let mut pointer_storage = PointerStorage::new();

            for _ in 0..storage_size {
                let pointer = self.read_u256()?;
                let value = self.read_u256()?;

                pointer_storage
                    .insert_unique(pointer, value)
                    .map_err(|(pointer, _)| duplicate_key("pointer storage", pointer))?;
            }

            storage
                .insert_unique(address, pointer_storage)
                .map_err(|(address, _)| duplicate_key("blockchain storage", address))?;
        }

        debug!(contracts = storage.size(), "decoded storage");
        Ok(storage)
    }

    pub fn read_event(&mut self) -> Result<NetEvent> {
        let event_type = self.read_string_with_length()?;
        let selector = self.read_u64()?;
        let data = self.read_bytes_with_length(self.wire_version.max_event_data_size())?;

        Ok(NetEvent::new(event_type, selector, data))
    }

    /// u16 count of events, at most `MAX_EVENTS` in V1.
    pub fn read_events(&mut self) -> Result<Vec<NetEvent>> {
        let length = usize::from(self.read_u16()?);
        let max_events = self.wire_version.max_events();
        if length > max_events {
            return Err(cap_exceeded("events", length, max_events));
        }

        let mut events = Vec::with_capacity(length);
        for _ in 0..length {
            events.push(self.read_event()?);
        }

        debug!(events = events.len(), "decoded events");
        Ok(events)
    }

    /// Optional integrity check: reads the u32 checksum at the cursor and
    /// compares it with the additive checksum of every byte before it.
    pub fn verify_checksum(&mut self) -> Result<()> {
        let covered = self.offset;
        let expected = self.read_u32()?;

        verify_additive_checksum(&self.buffer[..covered], expected)
    }
}

fn cap_exceeded(what: &'static str, count: usize, max: usize) -> CodecError {
    warn!(what, count, max, "decode cap exceeded");
    CodecError::CapExceeded { what, count, max }
}

fn duplicate_key(collection: &'static str, key: impl ToString) -> CodecError {
    let key = key.to_string();
    warn!(collection, %key, "duplicate key in decoded collection");
    CodecError::DuplicateKey { collection, key }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ADDRESS_BYTE_LENGTH, MAX_EVENT_DATA_SIZE, MAX_EVENTS};
    use hex_literal::hex;

    #[test]
    fn test_little_endian_integers() -> anyhow::Result<()> {
        let mut reader = BinaryReader::from_bytes(
            hex!("2a 3412 78563412 efcdab9078563412").to_vec(),
        );
        assert_eq!(reader.read_u8()?, 0x2a);
        assert_eq!(reader.read_u16()?, 0x1234);
        assert_eq!(reader.read_u32()?, 0x12345678);
        assert_eq!(reader.read_u64()?, 0x1234567890abcdef);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_selector_is_big_endian() -> anyhow::Result<()> {
        let mut reader = BinaryReader::from_bytes(hex!("12345678").to_vec());
        assert_eq!(reader.read_selector()?, 0x12345678);
        Ok(())
    }

    #[test]
    fn test_u256_is_big_endian() -> anyhow::Result<()> {
        let mut bytes = [0u8; 32];
        bytes[31] = 0x01;
        bytes[0] = 0x80;
        let mut reader = BinaryReader::from_bytes(bytes.to_vec());
        let value = reader.read_u256()?;
        assert_eq!(value, (U256::from(1u64) << 255usize) + U256::from(1u64));
        Ok(())
    }

    #[test]
    fn test_read_past_end_leaves_cursor() {
        let mut reader = BinaryReader::from_bytes(vec![1, 2, 3]);
        assert!(reader.read_u16().is_ok());
        let err = reader.read_u16().unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferUnderrun {
                offset: 2,
                requested: 2,
                length: 3
            }
        );
        assert_eq!(reader.get_offset(), 2);
    }

    #[test]
    fn test_zero_stop_consumes_full_width() -> anyhow::Result<()> {
        let mut reader = BinaryReader::from_bytes(vec![b'h', b'i', 0, b'x', 7]);
        assert_eq!(reader.read_string(4)?, "hi");
        assert_eq!(reader.get_offset(), 4);
        assert_eq!(reader.read_u8()?, 7);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut reader = BinaryReader::from_bytes(vec![2, 0, 0xff, 0xfe]);
        assert_eq!(
            reader.read_string_with_length().unwrap_err(),
            CodecError::InvalidUtf8 {
                offset: 2,
                length: 2
            }
        );
    }

    #[test]
    fn test_bytes_with_length_max() {
        let mut buffer = 300u32.to_le_bytes().to_vec();
        buffer.extend(vec![0u8; 300]);
        let mut reader = BinaryReader::from_bytes(buffer);
        assert!(matches!(
            reader.read_bytes_with_length(MAX_EVENT_DATA_SIZE),
            Err(CodecError::CapExceeded { count: 300, .. })
        ));
        // Only the length prefix was consumed
        assert_eq!(reader.get_offset(), 4);
    }

    #[test]
    fn test_read_events_rejects_count_over_cap() {
        let mut reader = BinaryReader::from_bytes(vec![9, 0, 0xaa, 0xbb, 0xcc]);
        assert_eq!(
            reader.read_events().unwrap_err(),
            CodecError::CapExceeded {
                what: "events",
                count: 9,
                max: MAX_EVENTS
            }
        );
        assert_eq!(reader.get_offset(), 2);
    }

    #[test]
    fn test_tuple_count_larger_than_buffer() {
        let mut reader = BinaryReader::from_bytes(u32::MAX.to_le_bytes().to_vec());
        assert!(matches!(
            reader.read_tuple(),
            Err(CodecError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_duplicate_selector_is_rejected() {
        let mut reader = BinaryReader::from_bytes(hex!("0200 deadbeef deadbeef").to_vec());
        assert!(matches!(
            reader.read_method_selectors(),
            Err(CodecError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_multi_call_caps() {
        let mut reader = BinaryReader::from_bytes(vec![9]);
        assert!(matches!(
            reader.read_multi_bytes_address_map(),
            Err(CodecError::CapExceeded { count: 9, max: 8, .. })
        ));

        let mut buffer = vec![1u8];
        buffer.extend([0u8; ADDRESS_BYTE_LENGTH]);
        buffer.push(11);
        let mut reader = BinaryReader::from_bytes(buffer);
        assert!(matches!(
            reader.read_multi_bytes_address_map(),
            Err(CodecError::CapExceeded { count: 11, max: 10, .. })
        ));
    }

    #[test]
    fn test_set_offset_rereads_region() -> anyhow::Result<()> {
        let mut reader = BinaryReader::from_bytes(vec![5, 6]);
        let saved = reader.get_offset();
        assert_eq!(reader.read_u8()?, 5);
        reader.set_offset(saved)?;
        assert_eq!(reader.read_u8()?, 5);
        assert!(reader.set_offset(3).is_err());
        Ok(())
    }

    #[test]
    fn test_truncated_string_array() {
        // Two strings declared, the second one is cut short
        let mut reader = BinaryReader::from_bytes(hex!("0200 0200 6869 0500 6869").to_vec());
        assert_eq!(
            reader.read_string_array().unwrap_err(),
            CodecError::BufferUnderrun {
                offset: 8,
                requested: 5,
                length: 10
            }
        );
    }

    #[test]
    fn test_truncated_bytes_array() {
        let mut reader =
            BinaryReader::from_bytes(hex!("0100 04000000 aabb").to_vec());
        assert_eq!(
            reader.read_bytes_array().unwrap_err(),
            CodecError::BufferUnderrun {
                offset: 6,
                requested: 4,
                length: 8
            }
        );

        // Count prefix alone
        let mut reader = BinaryReader::from_bytes(hex!("0300").to_vec());
        assert!(matches!(
            reader.read_bytes_array(),
            Err(CodecError::BufferUnderrun { offset: 2, .. })
        ));
    }

    #[test]
    fn test_reader_from_config() -> anyhow::Result<()> {
        let config = CodecConfig::default();
        let mut reader = BinaryReader::with_config(vec![0, 0], &config);
        assert_eq!(reader.wire_version(), WireVersion::V1);
        assert!(reader.read_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_interior_nul_truncates_length_prefixed_string() -> anyhow::Result<()> {
        let mut reader = BinaryReader::from_bytes(hex!("0500 6162006364 ff").to_vec());
        assert_eq!(reader.read_string_with_length()?, "ab");
        assert_eq!(reader.read_u8()?, 0xff);
        Ok(())
    }
}
