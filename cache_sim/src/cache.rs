use std::num::NonZeroUsize;

use crate::address::Address;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u32,
    pub data: u32,
}

/// location of an address in the array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    index: usize,
    tag: u32,
}

impl Slot {
    pub fn index(self) -> usize {
        self.index
    }
    pub fn tag(self) -> u32 {
        self.tag
    }
}

/// what a fill did to the previous occupant of the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Fresh,
    Refresh,
    Evict { tag: u32 },
}

pub struct CacheArray {
    inner: Vec<CacheLine>,
}

impl CacheArray {
    /// all lines start invalid.
    pub fn new(lines: NonZeroUsize) -> Self {
        Self {
            inner: vec![CacheLine::default(); lines.get()],
        }
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn decode(&self, addr: Address) -> Slot {
        let addr = addr.into_usize();
        let lines = self.inner.len();
        Slot {
            index: addr % lines,
            tag: (addr / lines) as u32,
        }
    }
    /// reassembles the address held by a valid line.
    pub fn address_of(&self, index: usize) -> Option<Address> {
        let line = self.inner.get(index).filter(|l| l.valid)?;
        let addr = line.tag as usize * self.inner.len() + index;
        Address::new(addr as u32).ok()
    }
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.inner.get(index)
    }
    pub fn valid_lines(&self) -> usize {
        self.inner.iter().filter(|l| l.valid).count()
    }
    pub fn invalidate_all(&mut self) {
        for line in self.inner.iter_mut() {
            line.valid = false;
        }
    }
    /// data of the line at `slot` if it is valid and holds the same tag.
    pub fn lookup(&self, slot: Slot) -> Option<u32> {
        let line = self.inner.get(slot.index)?;
        (line.valid && line.tag == slot.tag).then_some(line.data)
    }
    /// `None` if `slot` was decoded by a larger array.
    pub fn fill(&mut self, slot: Slot, data: u32) -> Option<Fill> {
        let line = self.inner.get_mut(slot.index)?;
        let fill = if !line.valid {
            Fill::Fresh
        } else if line.tag == slot.tag {
            Fill::Refresh
        } else {
            Fill::Evict { tag: line.tag }
        };
        *line = CacheLine {
            valid: true,
            tag: slot.tag,
            data,
        };
        Some(fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(v: u32) -> Address {
        Address::new(v).unwrap()
    }

    fn array(lines: usize) -> CacheArray {
        CacheArray::new(NonZeroUsize::new(lines).unwrap())
    }

    #[test]
    fn test_decode_power_of_two() {
        let c = array(1024);
        let s = c.decode(addr(0x12_3456));
        assert_eq!(0x056, s.index);
        assert_eq!(0x48D, s.tag);
    }
    #[test]
    fn test_decode_arbitrary_count() {
        let c = array(10);
        assert_eq!(Slot { index: 3, tag: 12 }, c.decode(addr(123)));
    }
    #[test]
    fn test_fill_and_lookup() {
        let mut c = array(16);
        let a = c.decode(addr(0x21));
        let b = c.decode(addr(0x31));
        assert_eq!(a.index, b.index);
        assert_eq!(None, c.lookup(a));
        assert_eq!(Fill::Fresh, c.fill(a, 1).unwrap());
        assert_eq!(Some(1), c.lookup(a));
        assert_eq!(None, c.lookup(b));
        assert_eq!(Fill::Refresh, c.fill(a, 2).unwrap());
        assert_eq!(Some(2), c.lookup(a));
        assert_eq!(Fill::Evict { tag: a.tag }, c.fill(b, 3).unwrap());
        assert_eq!(None, c.lookup(a));
        assert_eq!(Some(3), c.lookup(b));
        assert_eq!(Some(addr(0x31)), c.address_of(1));
    }
    #[test]
    fn test_foreign_slot() {
        let mut small = array(4);
        let slot = array(1024).decode(addr(0x3FF));
        assert_eq!(0x3FF, slot.index());
        assert_eq!(None, small.lookup(slot));
        assert_eq!(None, small.fill(slot, 1));
        assert_eq!(0, small.valid_lines());
    }
    #[test]
    fn test_invalidate_all() {
        let mut c = array(4);
        for i in 0..4 {
            let s = c.decode(addr(i));
            c.fill(s, i);
        }
        assert_eq!(4, c.valid_lines());
        c.invalidate_all();
        assert_eq!(0, c.valid_lines());
        assert_eq!(None, c.lookup(c.decode(addr(2))));
        assert_eq!(None, c.address_of(2));
    }
}
