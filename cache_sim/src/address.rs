use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::common::{exceeds, mask_lower};

pub const ADDRESS_BITS: u32 = 22;
pub const ADDRESS_MASK: u32 = (1 << ADDRESS_BITS) - 1;
/// number of distinct addresses
pub const ADDRESS_SPACE: usize = 1 << ADDRESS_BITS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("address {value:#x} does not fit in {} bits", ADDRESS_BITS)]
    OutOfRange { value: u32 },
}

/// 22-bit address presented on the `address` pins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Address(u32);

impl Address {
    pub fn new(value: u32) -> Result<Self, AddressError> {
        if exceeds(value, ADDRESS_BITS - 1) {
            Err(AddressError::OutOfRange { value })
        } else {
            Ok(Self(value))
        }
    }
    /// keeps the low 22 bits of `value`. dropped bits are logged since they
    /// alias another address.
    pub fn masked(value: u32) -> Self {
        let masked = mask_lower(value, ADDRESS_BITS - 1);
        if masked != value {
            log::warn!("address {value:#x} masked to {masked:#08x}");
        }
        Self(masked)
    }
    pub fn inner(self) -> u32 {
        self.0
    }
    pub fn into_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u32> for Address {
    type Error = AddressError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wide_value() {
        assert_eq!(0x3F_FFFF, Address::new(ADDRESS_MASK).unwrap().inner());
        assert_eq!(
            Err(AddressError::OutOfRange { value: 0x40_0000 }),
            Address::new(0x40_0000)
        );
    }
    #[test]
    fn test_masked() {
        assert_eq!(0x12_3456, Address::masked(0x0C12_3456).inner());
        assert_eq!(0x00_0001, Address::masked(0x40_0001).inner());
    }
    #[test]
    fn test_display() {
        assert_eq!("0x123456", Address::masked(0x12_3456).to_string());
        assert_eq!("0x000010", Address::masked(0x10).to_string());
    }
}
