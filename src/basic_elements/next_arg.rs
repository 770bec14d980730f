use alloy_primitives::U256;

use crate::{error::Result, types::Address};

use super::{reader::BinaryReader, writer::BinaryWriter};

// Lets the generic array helpers call the right primitive reader for `T`.
pub trait NextValue<T> {
    fn next_value(&mut self) -> Result<T>;
}

// Writer-side counterpart of `NextValue`.
pub trait AddValue<T> {
    fn add_value(&mut self, value: &T) -> Result<()>;
}

impl NextValue<u8> for BinaryReader {
    fn next_value(&mut self) -> Result<u8> {
        self.read_u8()
    }
}

impl NextValue<u16> for BinaryReader {
    fn next_value(&mut self) -> Result<u16> {
        self.read_u16()
    }
}

impl NextValue<u32> for BinaryReader {
    fn next_value(&mut self) -> Result<u32> {
        self.read_u32()
    }
}

impl NextValue<u64> for BinaryReader {
    fn next_value(&mut self) -> Result<u64> {
        self.read_u64()
    }
}

impl NextValue<U256> for BinaryReader {
    fn next_value(&mut self) -> Result<U256> {
        self.read_u256()
    }
}

impl NextValue<bool> for BinaryReader {
    fn next_value(&mut self) -> Result<bool> {
        self.read_boolean()
    }
}

impl NextValue<String> for BinaryReader {
    fn next_value(&mut self) -> Result<String> {
        self.read_string_with_length()
    }
}

impl NextValue<Address> for BinaryReader {
    fn next_value(&mut self) -> Result<Address> {
        self.read_address()
    }
}

// Byte arrays are u32 length prefixed, unbounded
impl NextValue<Vec<u8>> for BinaryReader {
    fn next_value(&mut self) -> Result<Vec<u8>> {
        self.read_bytes_with_length(0)
    }
}

impl AddValue<u8> for BinaryWriter {
    fn add_value(&mut self, value: &u8) -> Result<()> {
        self.write_u8(*value);
        Ok(())
    }
}

impl AddValue<u16> for BinaryWriter {
    fn add_value(&mut self, value: &u16) -> Result<()> {
        self.write_u16(*value);
        Ok(())
    }
}

impl AddValue<u32> for BinaryWriter {
    fn add_value(&mut self, value: &u32) -> Result<()> {
        self.write_u32(*value);
        Ok(())
    }
}

impl AddValue<u64> for BinaryWriter {
    fn add_value(&mut self, value: &u64) -> Result<()> {
        self.write_u64(*value);
        Ok(())
    }
}

impl AddValue<U256> for BinaryWriter {
    fn add_value(&mut self, value: &U256) -> Result<()> {
        self.write_u256(value);
        Ok(())
    }
}

impl AddValue<bool> for BinaryWriter {
    fn add_value(&mut self, value: &bool) -> Result<()> {
        self.write_boolean(*value);
        Ok(())
    }
}

impl AddValue<String> for BinaryWriter {
    fn add_value(&mut self, value: &String) -> Result<()> {
        self.write_string_with_length(value).map(|_| ())
    }
}

impl AddValue<Address> for BinaryWriter {
    fn add_value(&mut self, value: &Address) -> Result<()> {
        self.write_address(value).map(|_| ())
    }
}

impl AddValue<Vec<u8>> for BinaryWriter {
    fn add_value(&mut self, value: &Vec<u8>) -> Result<()> {
        self.write_bytes_with_length(value).map(|_| ())
    }
}
