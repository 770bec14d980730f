use std::cmp::Ordering;

use alloy_primitives::U256;

use crate::types::Address;

/// Total order over `T` used to position entries in a deterministic container.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The type's own `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

// Byte-wise, so the result never depends on the host locale
pub fn string_compare(a: &String, b: &String) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

pub fn address_compare(a: &Address, b: &Address) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

pub fn number_compare(a: &u32, b: &u32) -> Ordering {
    a.cmp(b)
}

pub fn bigint_compare(a: &U256, b: &U256) -> Ordering {
    a.cmp(b)
}
