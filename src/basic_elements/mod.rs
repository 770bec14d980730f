pub mod next_arg;
pub mod reader;
pub mod serializers;
pub mod writer;
