use anyhow::Result;

use crate::{
    address::Address,
    config::CacheConfig,
    controller::CacheController,
    signal::{Control, Inputs, Outputs},
    trace::{Trace, TraceRecord},
};

#[cfg(feature = "stat")]
use crate::stat::{AddStats, Stats};

/// Clocked driver around a [`CacheController`].
///
/// Outputs are registered: the value sampled after edge `N` is what the
/// controller produced on edge `N - 1`.
pub struct Simulator<T> {
    controller: CacheController,
    pending: Outputs,
    visible: Outputs,
    cycle: usize,
    trace: T,
    #[cfg(feature = "stat")]
    stat_builder: stat::SimStatBuilder,
}

impl<T: Trace> Simulator<T> {
    pub fn new(config: &CacheConfig, trace: T) -> Result<Self> {
        Ok(Self {
            controller: CacheController::new(config)?,
            pending: Outputs::default(),
            visible: Outputs::default(),
            cycle: 0,
            trace,
            #[cfg(feature = "stat")]
            stat_builder: stat::SimStatBuilder::new(),
        })
    }

    /// Drives `inputs` onto the pins for one rising edge and returns the
    /// outputs visible after it.
    pub fn tick(&mut self, inputs: &Inputs) -> Result<Outputs> {
        let produced = self.controller.step(inputs);
        self.visible = std::mem::replace(&mut self.pending, produced);
        self.trace
            .record(&TraceRecord::new(self.cycle, inputs, self.visible))?;
        self.cycle += 1;
        Ok(self.visible)
    }

    /// asserts `inputs` for one edge, deasserts every control pin for the
    /// next one while holding address and data, then samples.
    fn pulse(&mut self, inputs: Inputs) -> Result<Outputs> {
        self.tick(&inputs)?;
        self.tick(&Inputs {
            control: Control::none(),
            ..inputs
        })
    }

    pub fn pulse_reset(&mut self) -> Result<Outputs> {
        self.pulse(Inputs::reset())
    }

    pub fn pulse_write(&mut self, address: Address, write_data: u32) -> Result<Outputs> {
        self.pulse(Inputs::write(address, write_data))
    }

    pub fn pulse_read(&mut self, address: Address) -> Result<Outputs> {
        self.pulse(Inputs::read(address))
    }

    pub fn idle(&mut self, n: usize) -> Result<Outputs> {
        for _ in 0..n {
            self.tick(&Inputs::idle())?;
        }
        Ok(self.visible)
    }

    pub fn outputs(&self) -> Outputs {
        self.visible
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn controller(&self) -> &CacheController {
        &self.controller
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    pub fn flush_trace(&mut self) -> Result<()> {
        self.trace.flush()
    }

    pub fn into_trace(self) -> T {
        self.trace
    }
}

impl<T> Simulator<T> {
    #[cfg(feature = "stat")]
    pub fn exit_sim(&mut self) {
        self.stat_builder.cycle(self.cycle);
        self.stat_builder.stop_timer();
    }

    #[cfg(feature = "stat")]
    pub fn collect_stat(&self) -> Stats {
        let mut ss = Stats::default();
        self.add_stats(&mut ss);
        ss
    }
}

#[cfg(feature = "stat")]
impl<T> AddStats for Simulator<T> {
    fn add_stats(&self, buf: &mut Stats) {
        buf.push(Box::new(self.stat_builder.finish(self.cycle)));
        self.controller.add_stats(buf);
    }
}

#[cfg(feature = "stat")]
mod stat {
    use std::{fmt, time};

    use crate::stat::*;

    pub struct SimStatBuilder {
        begin: time::Instant,
        cycle: Option<usize>,
        elapsed: Option<time::Duration>,
    }

    impl SimStatBuilder {
        pub fn new() -> Self {
            Self {
                begin: time::Instant::now(),
                cycle: None,
                elapsed: None,
            }
        }
        pub fn cycle(&mut self, cycle: usize) {
            self.cycle = Some(cycle)
        }
        pub fn stop_timer(&mut self) {
            self.elapsed = Some(time::Instant::now() - self.begin)
        }
        /// falls back to the live values when the simulation has not exited yet.
        pub fn finish(&self, cycle: usize) -> SimStat {
            SimStat {
                cycle: self.cycle.unwrap_or(cycle),
                elapsed: self.elapsed.unwrap_or_else(|| self.begin.elapsed()),
            }
        }
    }

    impl Default for SimStatBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    pub struct SimStat {
        cycle: usize,
        elapsed: time::Duration,
    }

    impl Stat for SimStat {
        fn view(&self, _: usize) -> Box<dyn StatView + '_> {
            Box::new(self)
        }
    }

    impl StatView for &'_ SimStat {
        fn header(&self) -> &'static str {
            "simulator stat"
        }
        fn width(&self) -> usize {
            33
        }
    }

    impl fmt::Display for &'_ SimStat {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let ms = format!("{} ms", self.elapsed.as_millis());
            writeln!(f, "  elapsed total: {ms:>9}")?;
            let cycle = format!("#{}", self.cycle);
            writeln!(f, "  cycles total: {cycle:>10}")
        }
    }
}
