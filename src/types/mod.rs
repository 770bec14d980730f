pub mod event;

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::deterministic::{DeterministicMap, DeterministicSet};

/// Contract address as carried on the wire.
///
/// Ordering is byte-wise lexicographic over the UTF-8 form, which is the
/// total order every address-keyed collection is serialized in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// 4-byte method/event identifier, big-endian on the wire
pub type Selector = u32;

pub type MemorySlotPointer = U256;
pub type MemorySlotData = U256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiRegistryItem {
    pub name: String,
    pub selector: Selector,
}

/// One contract's storage: slot pointer -> value, ordered by pointer.
pub type PointerStorage = DeterministicMap<MemorySlotPointer, MemorySlotData>;
/// Every contract's storage, ordered by address.
pub type BlockchainStorage = DeterministicMap<Address, PointerStorage>;

pub type SelectorsMap = DeterministicMap<String, Selector>;
pub type MethodMap = DeterministicSet<Selector>;
pub type ContractAbiMap = DeterministicSet<Selector>;

pub type AddressValueMap = DeterministicMap<Address, U256>;
/// Raw call payloads grouped by the contract they target.
pub type MultiCallMap = DeterministicMap<Address, Vec<Vec<u8>>>;

/// Tag recorded by a tracking writer for every primitive it emits.
/// The discriminants are part of the layout fingerprint and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BufferDataType {
    U8 = 0,
    U16 = 1,
    U32 = 2,
    U64 = 3,
    U256 = 4,
    Address = 5,
    String = 6,
    Boolean = 7,
    Bytes = 8,
}

impl BufferDataType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_order_is_bytewise() {
        let mut addresses = vec![
            Address::from("bc1q"),
            Address::from("Zed"),
            Address::from("bc1"),
            Address::from("a"),
        ];
        addresses.sort();
        let ordered: Vec<&str> = addresses.iter().map(Address::as_str).collect();
        // Uppercase sorts before lowercase, prefixes before extensions
        assert_eq!(ordered, vec!["Zed", "a", "bc1", "bc1q"]);
    }

    #[test]
    fn test_buffer_data_type_tags() {
        assert_eq!(BufferDataType::U8.as_u8(), 0);
        assert_eq!(BufferDataType::Address.as_u8(), 5);
        assert_eq!(BufferDataType::Boolean.as_u8(), 7);
        assert_eq!(BufferDataType::Bytes.as_u8(), 8);
    }
}
