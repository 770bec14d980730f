pub mod cyrb53;
pub mod traits;
