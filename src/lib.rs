pub mod basic_elements;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod deterministic;
pub mod error;
pub mod helpers;
pub mod types;

pub use basic_elements::{reader::BinaryReader, writer::BinaryWriter};
pub use error::{CodecError, Result};
