use alloy_primitives::U256;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, trace, warn};

use crate::{
    config::CodecConfig,
    constants::{
        MAX_ADDRESS_VALUE_ENTRIES, MAX_ARRAY_LENGTH, MAX_CALLS_PER_CONTRACT,
        MAX_CONTRACTS_PER_MULTI_CALL, WireVersion,
    },
    crypto::{cyrb53::Cyrb53a, traits::layout_hasher::LayoutHasher},
    deterministic::{Comparator, DeterministicSet},
    error::{CodecError, Result},
    helpers::checksum::additive_checksum,
    types::{
        Address, AddressValueMap, BlockchainStorage, BufferDataType, MethodMap, MultiCallMap,
        Selector, SelectorsMap, event::NetEvent,
    },
};

use super::{
    next_arg::AddValue,
    reader::BinaryReader,
    serializers::{address_to_fixed_bytes, u256_from_exact_slice, u256_to_be_bytes},
};

/// Growable encoder mirroring [`BinaryReader`].
///
/// Collections are written by walking their deterministic order, so equal
/// logical values always produce identical bytes. When tracking is on, every
/// primitive write also appends its [`BufferDataType`] to a trace that
/// [`BinaryWriter::get_selector_data_type`] folds into a layout fingerprint.
///
/// Fallible writes are all or nothing: on `Err` the buffer, cursor and trace
/// are exactly as they were before the call.
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
    // Never past buffer.len()
    offset: usize,
    wire_version: WireVersion,
    track_data_types: bool,
    data_types: Vec<BufferDataType>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn with_tracking() -> Self {
        Self {
            track_data_types: true,
            ..Self::default()
        }
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            wire_version: config.wire_version,
            track_data_types: config.track_data_types,
            ..Self::default()
        }
    }

    pub fn wire_version(&self) -> WireVersion {
        self.wire_version
    }

    // Runs `write` and restores buffer, cursor and trace if it fails
    fn write_all_or_nothing<F>(&mut self, write: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let offset = self.offset;
        let tail = self.buffer[offset..].to_vec();
        let data_types = self.data_types.len();

        match write(self) {
            Ok(()) => Ok(self),
            Err(err) => {
                self.buffer.truncate(offset);
                self.buffer.extend_from_slice(&tail);
                self.offset = offset;
                self.data_types.truncate(data_types);
                debug!(offset, %err, "rolled back failed write");
                Err(err)
            }
        }
    }

    fn track(&mut self, data_type: BufferDataType) {
        if self.track_data_types {
            self.data_types.push(data_type);
        }
    }

    // Vec growth is amortized doubling, never exact fit.
    // offset <= len, so this only overflows where Vec itself would.
    fn alloc_safe(&mut self, size: usize) {
        let end = self.offset.saturating_add(size);
        if end > self.buffer.len() {
            let capacity = self.buffer.capacity();
            self.buffer.resize(end, 0);
            if self.buffer.capacity() != capacity {
                trace!(
                    from = capacity,
                    to = self.buffer.capacity(),
                    "writer buffer grown"
                );
            }
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.alloc_safe(bytes.len());
        self.buffer[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.track(BufferDataType::U8);
        self.put(&[value]);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.track(BufferDataType::U16);
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.put(&bytes);
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.track(BufferDataType::U32);
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.put(&bytes);
        self
    }

    pub fn write_u32_be(&mut self, value: u32) -> &mut Self {
        self.track(BufferDataType::U32);
        let mut bytes = [0u8; 4];
        BigEndian::write_u32(&mut bytes, value);
        self.put(&bytes);
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.track(BufferDataType::U64);
        let mut bytes = [0u8; 8];
        LittleEndian::write_u64(&mut bytes, value);
        self.put(&bytes);
        self
    }

    pub fn write_selector(&mut self, value: Selector) -> &mut Self {
        self.write_u32_be(value)
    }

    pub fn write_boolean(&mut self, value: bool) -> &mut Self {
        self.track(BufferDataType::Boolean);
        self.put(&[u8::from(value)]);
        self
    }

    /// Writes 32 big-endian bytes.
    pub fn write_u256(&mut self, value: &U256) -> &mut Self {
        self.track(BufferDataType::U256);
        self.put(&u256_to_be_bytes(*value));
        self
    }

    /// Writes an already-encoded u256, which must be exactly 32 bytes.
    pub fn write_u256_be_slice(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let value = u256_from_exact_slice(bytes).inspect_err(|err| {
            warn!(%err, "rejected u256 write");
        })?;
        Ok(self.write_u256(&value))
    }

    /// Raw bytes, no length prefix.
    pub fn write_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.track(BufferDataType::Bytes);
        self.put(value);
        self
    }

    /// Raw UTF-8 bytes, no length prefix.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.track(BufferDataType::String);
        self.put(value.as_bytes());
        self
    }

    /// u16 byte length, then the UTF-8 bytes. Readers stop a string at its
    /// first zero byte, so a value with an interior NUL decodes as the part
    /// before it.
    pub fn write_string_with_length(&mut self, value: &str) -> Result<&mut Self> {
        let length = u16::try_from(value.len()).map_err(|_| CodecError::ValueTooLarge {
            field: "string length",
            size: value.len(),
            max: u16::MAX as usize,
        })?;

        self.write_u16(length);
        Ok(self.write_string(value))
    }

    pub fn write_bytes_with_length(&mut self, value: &[u8]) -> Result<&mut Self> {
        let length = u32::try_from(value.len()).map_err(|_| CodecError::ValueTooLarge {
            field: "bytes length",
            size: value.len(),
            max: u32::MAX as usize,
        })?;

        self.write_u32(length);
        Ok(self.write_bytes(value))
    }

    /// Zero padded to the address width of the writer's wire generation.
    pub fn write_address(&mut self, value: &Address) -> Result<&mut Self> {
        let width = self.wire_version.address_byte_length();
        let bytes = address_to_fixed_bytes(value, width).inspect_err(|err| {
            warn!(%err, address = %value, "rejected address write");
        })?;

        self.track(BufferDataType::Address);
        self.put(&bytes);
        Ok(self)
    }

    /// u16 count followed by each element.
    pub fn write_array<T>(&mut self, values: &[T]) -> Result<&mut Self>
    where
        BinaryWriter: AddValue<T>,
    {
        let length = checked_count("array elements", values.len(), MAX_ARRAY_LENGTH)?;

        self.write_all_or_nothing(|writer| {
            writer.write_u16(length as u16);
            for value in values {
                writer.add_value(value)?;
            }
            Ok(())
        })
    }

    pub fn write_u8_array(&mut self, values: &[u8]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_u16_array(&mut self, values: &[u16]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_u32_array(&mut self, values: &[u32]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_u64_array(&mut self, values: &[u64]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_u256_array(&mut self, values: &[U256]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_address_array(&mut self, values: &[Address]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_string_array(&mut self, values: &[String]) -> Result<&mut Self> {
        self.write_array(values)
    }

    pub fn write_bytes_array(&mut self, values: &[Vec<u8>]) -> Result<&mut Self> {
        self.write_array(values)
    }

    /// u32 count of u256 values.
    pub fn write_tuple(&mut self, values: &[U256]) -> Result<&mut Self> {
        let length = checked_count("tuple values", values.len(), u32::MAX as usize)?;

        self.write_u32(length as u32);
        for value in values {
            self.write_u256(value);
        }
        Ok(self)
    }

    pub fn write_abi_selector(&mut self, name: &str, selector: Selector) -> Result<&mut Self> {
        self.write_string_with_length(name)?;
        Ok(self.write_selector(selector))
    }

    pub fn write_view_selectors_map(&mut self, map: &SelectorsMap) -> Result<&mut Self> {
        let length = checked_count("view selectors", map.size(), MAX_ARRAY_LENGTH)?;

        self.write_all_or_nothing(|writer| {
            writer.write_u16(length as u16);
            for (name, selector) in map {
                writer.write_abi_selector(name, *selector)?;
            }
            Ok(())
        })?;

        debug!(entries = length, "encoded view selectors map");
        Ok(self)
    }

    pub fn write_method_selectors_map(&mut self, selectors: &MethodMap) -> Result<&mut Self> {
        let length = checked_count("method selectors", selectors.size(), MAX_ARRAY_LENGTH)?;

        self.write_u16(length as u16);
        for selector in selectors {
            self.write_selector(*selector);
        }

        debug!(entries = length, "encoded method selectors map");
        Ok(self)
    }

    pub fn write_address_value_map(&mut self, map: &AddressValueMap) -> Result<&mut Self> {
        let length = checked_count("address values", map.size(), MAX_ADDRESS_VALUE_ENTRIES)?;

        self.write_all_or_nothing(|writer| {
            writer.write_u16(length as u16);
            for (address, value) in map {
                writer.write_address(address)?;
                writer.write_u256(value);
            }
            Ok(())
        })?;

        debug!(entries = length, "encoded address value map");
        Ok(self)
    }

    /// Writes the entries of `values` for exactly the declared `keys`, in key
    /// order. Every declared key must have a value.
    pub fn write_address_value_map_for_keys<C: Comparator<Address>>(
        &mut self,
        keys: &DeterministicSet<Address, C>,
        values: &AddressValueMap,
    ) -> Result<&mut Self> {
        let length = checked_count("address values", keys.size(), MAX_ADDRESS_VALUE_ENTRIES)?;

        let mut entries = Vec::with_capacity(length);
        for address in keys {
            let value = values.get(address).ok_or_else(|| {
                warn!(%address, "address value map is missing a declared key");
                CodecError::MissingValue {
                    collection: "address value map",
                    key: address.to_string(),
                }
            })?;
            entries.push((address, value));
        }

        self.write_all_or_nothing(|writer| {
            writer.write_u16(length as u16);
            for (address, value) in entries {
                writer.write_address(address)?;
                writer.write_u256(value);
            }
            Ok(())
        })?;

        debug!(entries = length, "encoded address value map for declared keys");
        Ok(self)
    }

    /// Call payloads per contract, capped at 8 contracts and 10 calls each.
    pub fn write_limited_address_bytes_map(&mut self, map: &MultiCallMap) -> Result<&mut Self> {
        let contracts = checked_count(
            "contracts called",
            map.size(),
            MAX_CONTRACTS_PER_MULTI_CALL,
        )?;
        for calls in map.values() {
            checked_count("calls", calls.len(), MAX_CALLS_PER_CONTRACT)?;
        }

        self.write_all_or_nothing(|writer| {
            writer.write_u8(contracts as u8);
            for (address, calls) in map {
                writer.write_address(address)?;
                writer.write_u8(calls.len() as u8);

                for call in calls {
                    writer.write_bytes_with_length(call)?;
                }
            }
            Ok(())
        })?;

        debug!(contracts, "encoded multi call map");
        Ok(self)
    }

    /// Encodes the full storage tree as a standalone buffer. Anything written
    /// before is discarded, even when encoding fails.
    pub fn write_storage(&mut self, storage: &BlockchainStorage) -> Result<&mut Self> {
        self.reset();

        let contracts = checked_count("contracts", storage.size(), u32::MAX as usize)?;
        self.write_all_or_nothing(|writer| {
            writer.write_u32(contracts as u32);

            for (address, slots) in storage {
                let slot_count =
                    checked_count("storage slots", slots.size(), u32::MAX as usize)?;

                writer.write_address(address)?;
                writer.write_u32(slot_count as u32);

                for (pointer, value) in slots {
                    writer.write_u256(pointer);
                    writer.write_u256(value);
                }
            }
            Ok(())
        })?;

        debug!(contracts, bytes = self.offset, "encoded storage");
        Ok(self)
    }

    pub fn write_event(&mut self, event: &NetEvent) -> Result<&mut Self> {
        self.check_event(event)?;

        self.write_string_with_length(&event.event_type)?;
        self.write_u64(event.selector);
        self.write_bytes_with_length(&event.data)
    }

    fn check_event(&self, event: &NetEvent) -> Result<()> {
        checked_count(
            "event data bytes",
            event.data_len(),
            self.wire_version.max_event_data_size(),
        )?;
        if event.event_type.len() > u16::MAX as usize {
            warn!(size = event.event_type.len(), "event type too long");
            return Err(CodecError::ValueTooLarge {
                field: "string length",
                size: event.event_type.len(),
                max: u16::MAX as usize,
            });
        }
        Ok(())
    }

    /// u16 count of events, at most `MAX_EVENTS` in V1.
    pub fn write_events(&mut self, events: &[NetEvent]) -> Result<&mut Self> {
        let length = checked_count("events", events.len(), self.wire_version.max_events())?;
        for event in events {
            self.check_event(event)?;
        }

        self.write_all_or_nothing(|writer| {
            writer.write_u16(length as u16);
            for event in events {
                writer.write_event(event)?;
            }
            Ok(())
        })?;

        debug!(events = length, "encoded events");
        Ok(self)
    }

    /// Appends the additive checksum of everything written so far. Only
    /// meaningful when the consumer calls [`BinaryReader::verify_checksum`].
    pub fn write_checksum(&mut self) -> &mut Self {
        let covered = self.offset.min(self.buffer.len());
        let checksum = additive_checksum(&self.buffer[..covered]);
        self.write_u32(checksum)
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Moves the write cursor back over bytes already written, e.g. to patch a
    /// length prefix. The cursor can not move past the written end.
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        if offset > self.buffer.len() {
            warn!(offset, length = self.buffer.len(), "writer offset past end");
            return Err(CodecError::BufferUnderrun {
                offset,
                requested: 0,
                length: self.buffer.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn data_types(&self) -> &[BufferDataType] {
        &self.data_types
    }

    /// Takes the written bytes and clears the writer.
    pub fn get_buffer(&mut self) -> Vec<u8> {
        let buffer = std::mem::take(&mut self.buffer);
        self.clear();
        buffer
    }

    /// Copies the written bytes, leaving the writer as is.
    pub fn get_buffer_retained(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    pub fn to_reader(&mut self) -> BinaryReader {
        BinaryReader::from_bytes(self.get_buffer())
    }

    /// Empties buffer and trace, keeping the allocation.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.buffer.clear();
        self.data_types.clear();
    }

    /// Empties buffer and trace, releasing the allocation.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.buffer = Vec::new();
        self.data_types = Vec::new();
    }

    /// Layout fingerprint of the recorded trace. Zero when nothing was tracked.
    pub fn get_selector_data_type(&self) -> u64 {
        self.get_selector_data_type_with(&Cyrb53a::default())
    }

    pub fn get_selector_data_type_with<H: LayoutHasher>(&self, hasher: &H) -> u64 {
        if self.data_types.is_empty() {
            return 0;
        }

        let tags: Vec<u8> = self.data_types.iter().map(|tag| tag.as_u8()).collect();
        hasher.hash_tags(&tags)
    }
}

fn checked_count(what: &'static str, count: usize, max: usize) -> Result<usize> {
    if count > max {
        warn!(what, count, max, "encode cap exceeded");
        return Err(CodecError::CapExceeded { what, count, max });
    }

    Ok(count)
}
