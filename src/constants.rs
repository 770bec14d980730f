// Fixed width of an encoded address, zero padded on write
pub const ADDRESS_BYTE_LENGTH: usize = 64;

pub const MAX_EVENTS: usize = 8; // 8 events max per transaction
pub const MAX_EVENT_DATA_SIZE: usize = 256; // 256 bytes max

pub const MAX_CONTRACTS_PER_MULTI_CALL: usize = 8;
pub const MAX_CALLS_PER_CONTRACT: usize = 10;
pub const MAX_ADDRESS_VALUE_ENTRIES: usize = u16::MAX as usize;
pub const MAX_ARRAY_LENGTH: usize = u16::MAX as usize;

pub const SELECTOR_BYTE_LENGTH: usize = 4;
pub const U256_BYTE_LENGTH: usize = 32;

/// Wire generation a reader or writer speaks. Widths and caps that changed
/// between generations are looked up here rather than read from the consts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireVersion {
    #[default]
    V1,
}

impl WireVersion {
    pub const CURRENT: WireVersion = WireVersion::V1;

    pub fn address_byte_length(&self) -> usize {
        match self {
            WireVersion::V1 => ADDRESS_BYTE_LENGTH,
        }
    }

    pub fn max_events(&self) -> usize {
        match self {
            WireVersion::V1 => MAX_EVENTS,
        }
    }

    pub fn max_event_data_size(&self) -> usize {
        match self {
            WireVersion::V1 => MAX_EVENT_DATA_SIZE,
        }
    }
}
