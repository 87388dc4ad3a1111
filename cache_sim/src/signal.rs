//! Pin-level inputs and outputs of the cache, sampled on rising clock edges.

use std::fmt;

use bitmask_enum::bitmask;
use serde::Serialize;

use crate::address::Address;

/// control pins asserted during a step
#[bitmask(u8)]
pub enum Control {
    Reset,
    Write,
    Read,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::with_capacity(3);
        if self.contains(Self::Reset) {
            names.push("reset");
        }
        if self.contains(Self::Write) {
            names.push("write");
        }
        if self.contains(Self::Read) {
            names.push("read");
        }
        if names.is_empty() {
            write!(f, "idle")
        } else {
            write!(f, "{}", names.join("/"))
        }
    }
}

/// what a non-reset step does once enables are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Idle,
    Write,
    Read,
}

#[derive(Clone, Copy)]
pub struct Inputs {
    pub control: Control,
    pub address: Address,
    pub write_data: u32,
}

impl Inputs {
    pub fn idle() -> Self {
        Self {
            control: Control::none(),
            address: Address::default(),
            write_data: 0,
        }
    }
    pub fn reset() -> Self {
        Self {
            control: Control::Reset,
            ..Self::idle()
        }
    }
    pub fn write(address: Address, write_data: u32) -> Self {
        Self {
            control: Control::Write,
            address,
            write_data,
        }
    }
    pub fn read(address: Address) -> Self {
        Self {
            control: Control::Read,
            address,
            write_data: 0,
        }
    }
    /// builds inputs from pin levels. `resetn` is active low.
    pub fn from_pins(
        resetn: bool,
        write_enable: bool,
        read_enable: bool,
        address: Address,
        write_data: u32,
    ) -> Self {
        let mut control = Control::none();
        if !resetn {
            control |= Control::Reset;
        }
        if write_enable {
            control |= Control::Write;
        }
        if read_enable {
            control |= Control::Read;
        }
        Self {
            control,
            address,
            write_data,
        }
    }
    pub fn is_reset(&self) -> bool {
        self.control.contains(Control::Reset)
    }
}

impl fmt::Display for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} addr: {}, data: {:#010x}",
            self.control, self.address, self.write_data
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outputs {
    pub hit: bool,
    /// zero whenever `hit` is low
    pub read_data: u32,
}

impl Outputs {
    pub fn hit(read_data: u32) -> Self {
        Self {
            hit: true,
            read_data,
        }
    }
}

impl fmt::Display for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hit: {}, read_data: {:#010x}",
            u8::from(self.hit),
            self.read_data
        )
    }
}
