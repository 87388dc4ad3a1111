use std::num::NonZeroUsize;

use crate::{
    address::Address,
    cache::{CacheArray, Fill},
    config::{CacheConfig, ConfigError, Precedence},
    signal::{Control, Inputs, Operation, Outputs},
};

#[cfg(feature = "stat")]
use crate::stat::{AddStats, Stats};

/// Direct-mapped cache controller advanced once per rising clock edge.
///
/// Every step is a function of the stored lines and the inputs of that step
/// alone; nothing is latched from earlier steps except the array itself.
pub struct CacheController {
    lines: CacheArray,
    precedence: Precedence,
    reset_active: bool,
    #[cfg(feature = "stat")]
    pub c_stat: stat::CacheStat,
}

impl CacheController {
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "direct-mapped cache: {} lines, {}",
            config.lines,
            config.precedence
        );
        let lines = NonZeroUsize::new(config.lines).ok_or(ConfigError::NoLines)?;
        Ok(Self {
            lines: CacheArray::new(lines),
            precedence: config.precedence,
            reset_active: false,
            #[cfg(feature = "stat")]
            c_stat: Default::default(),
        })
    }

    /// Evaluates one clock step and returns this step's outputs.
    ///
    /// Reset takes priority over both enables and invalidates every line.
    /// A write never reports a hit. `read_data` is zero unless `hit` is set.
    pub fn step(&mut self, inputs: &Inputs) -> Outputs {
        log::trace!("step: {inputs}");
        if inputs.is_reset() {
            if !self.reset_active {
                log::debug!("reset asserted");
                self.reset_active = true;
            }
            self.lines.invalidate_all();
            #[cfg(feature = "stat")]
            self.c_stat.on_reset();
            return Outputs::default();
        }
        if self.reset_active {
            log::debug!("reset released");
            self.reset_active = false;
        }
        if inputs.control.contains(Control::Write | Control::Read) {
            log::debug!(
                "write and read enabled together at {}, {}",
                inputs.address,
                self.precedence
            );
            #[cfg(feature = "stat")]
            self.c_stat.on_conflict();
        }
        match self.precedence.resolve(inputs.control) {
            Operation::Idle => Outputs::default(),
            Operation::Write => {
                self.write(inputs.address, inputs.write_data);
                Outputs::default()
            }
            Operation::Read => self.read(inputs.address),
        }
    }

    fn write(&mut self, addr: Address, data: u32) {
        let slot = self.lines.decode(addr);
        let Some(fill) = self.lines.fill(slot, data) else {
            return;
        };
        if let Fill::Evict { tag } = fill {
            log::debug!(
                "line {} evicted: tag {tag:#x} -> {:#x}",
                slot.index(),
                slot.tag()
            );
        }
        #[cfg(feature = "stat")]
        self.c_stat.on_write(fill);
    }

    fn read(&mut self, addr: Address) -> Outputs {
        let hit = self.lines.lookup(self.lines.decode(addr));
        #[cfg(feature = "stat")]
        self.c_stat.on_read(hit.is_some());
        hit.map(Outputs::hit).unwrap_or_default()
    }

    /// looks `addr` up without touching any state or statistics.
    pub fn probe(&self, addr: Address) -> Option<u32> {
        self.lines.lookup(self.lines.decode(addr))
    }

    pub fn array(&self) -> &CacheArray {
        &self.lines
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn is_reset_active(&self) -> bool {
        self.reset_active
    }
}

#[cfg(feature = "stat")]
impl AddStats for CacheController {
    fn add_stats(&self, buf: &mut Stats) {
        buf.push(Box::new(self.c_stat));
    }
}

#[cfg(feature = "stat")]
pub mod stat {
    use std::fmt;

    use crate::{cache::Fill, stat::*};

    #[derive(Default, Clone, Copy)]
    pub struct CacheStat {
        hit_count: usize,
        miss_count: usize,
        write_count: usize,
        evict_count: usize,
        reset_count: usize,
        conflict_count: usize,
    }

    impl CacheStat {
        pub fn on_read(&mut self, hit: bool) {
            if hit {
                self.hit_count += 1;
            } else {
                self.miss_count += 1;
            }
        }
        pub fn on_write(&mut self, fill: Fill) {
            self.write_count += 1;
            if let Fill::Evict { .. } = fill {
                self.evict_count += 1;
            }
        }
        pub fn on_reset(&mut self) {
            self.reset_count += 1;
        }
        pub fn on_conflict(&mut self) {
            self.conflict_count += 1;
        }
        pub fn hit_count(&self) -> usize {
            self.hit_count
        }
        pub fn miss_count(&self) -> usize {
            self.miss_count
        }
        pub fn write_count(&self) -> usize {
            self.write_count
        }
        pub fn evict_count(&self) -> usize {
            self.evict_count
        }
        pub fn reset_count(&self) -> usize {
            self.reset_count
        }
        pub fn conflict_count(&self) -> usize {
            self.conflict_count
        }
    }

    impl Stat for CacheStat {
        fn view(&self, _: usize) -> Box<dyn StatView + '_> {
            Box::new(CacheStatView::new(self))
        }
    }

    pub struct CacheStatView<'a> {
        stat: &'a CacheStat,
    }

    impl<'a> CacheStatView<'a> {
        pub fn new(stat: &'a CacheStat) -> Self {
            Self { stat }
        }
    }

    impl StatView for CacheStatView<'_> {
        fn header(&self) -> &'static str {
            "cache stat"
        }
        fn width(&self) -> usize {
            33
        }
    }

    impl fmt::Display for CacheStatView<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let hit = self.stat.hit_count;
            let miss = self.stat.miss_count;
            let total = (hit + miss).max(1);
            let hit_pct = format!("{:.6}", 100. * hit as f64 / total as f64);
            let miss_pct = format!("{:.6}", 100. * miss as f64 / total as f64);
            writeln!(f, "      hit: {hit:>10} ({hit_pct:>8}%)")?;
            writeln!(f, "     miss: {miss:>10} ({miss_pct:>8}%)")?;
            writeln!(f, "    write: {:>10}", self.stat.write_count)?;
            writeln!(f, "    evict: {:>10}", self.stat.evict_count)?;
            writeln!(f, "    reset: {:>10}", self.stat.reset_count)?;
            writeln!(f, " conflict: {:>10}", self.stat.conflict_count)
        }
    }
}
