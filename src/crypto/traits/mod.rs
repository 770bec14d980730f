pub mod layout_hasher;
