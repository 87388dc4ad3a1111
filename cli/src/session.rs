use std::io::Write;

use anyhow::Result;
use cache_sim::{
    address::Address,
    signal::{Inputs, Outputs},
    sim::Simulator,
    trace::Trace,
};

use crate::command::{Command, ShowKind};

pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Applies parsed commands to a simulator and reports sampled outputs.
pub(crate) struct Session<T> {
    sim: Simulator<T>,
    mask_address: bool,
    #[cfg_attr(not(feature = "stat"), allow(dead_code))]
    stat_width: usize,
}

impl<T: Trace> Session<T> {
    pub fn new(sim: Simulator<T>, mask_address: bool, stat_width: usize) -> Self {
        Self {
            sim,
            mask_address,
            stat_width,
        }
    }

    fn address(&self, raw: u32) -> Result<Address> {
        if self.mask_address {
            Ok(Address::masked(raw))
        } else {
            Ok(Address::try_from(raw)?)
        }
    }

    fn report(&self, out: &mut impl Write, what: &str, o: Outputs) -> Result<()> {
        writeln!(out, "#{:06} {what:<30} {o}", self.sim.cycle())?;
        Ok(())
    }

    pub fn apply(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Reset => {
                let o = self.sim.pulse_reset()?;
                self.report(out, "reset", o)?;
            }
            Command::Write { address, data } => {
                let address = self.address(address)?;
                let o = self.sim.pulse_write(address, data)?;
                self.report(out, &format!("write {address} <- {data:#010x}"), o)?;
            }
            Command::Read { address } => {
                let address = self.address(address)?;
                let o = self.sim.pulse_read(address)?;
                self.report(out, &format!("read {address}"), o)?;
            }
            Command::Idle(n) => {
                let o = self.sim.idle(n)?;
                self.report(out, &format!("idle x{n}"), o)?;
            }
            Command::Drive {
                control,
                address,
                data,
            } => {
                let inputs = Inputs {
                    control,
                    address: self.address(address)?,
                    write_data: data,
                };
                let o = self.sim.tick(&inputs)?;
                self.report(out, &format!("drive {control}"), o)?;
            }
            Command::Show(kind) => self.show(kind, out)?,
            Command::Exit => return Ok(Flow::Exit),
            Command::Nop => (),
        }
        Ok(Flow::Continue)
    }

    fn show(&self, kind: ShowKind, out: &mut impl Write) -> Result<()> {
        let array = self.sim.controller().array();
        match kind {
            ShowKind::Line(index) => match array.line(index) {
                Some(line) if line.valid => {
                    // address_of is always Some for a valid line
                    let held = array
                        .address_of(index)
                        .map(|a| a.to_string())
                        .unwrap_or_default();
                    writeln!(
                        out,
                        "line {index}: tag {:#x}, data {:#010x} ({held})",
                        line.tag, line.data
                    )?;
                }
                Some(_) => writeln!(out, "line {index}: invalid")?,
                None => writeln!(out, "line {index} out of range (0..{})", array.len())?,
            },
            ShowKind::Address(raw) => {
                let address = self.address(raw)?;
                let slot = array.decode(address);
                match self.sim.controller().probe(address) {
                    Some(data) => writeln!(
                        out,
                        "{address}: line {}, tag {:#x}, resident {data:#010x}",
                        slot.index(),
                        slot.tag()
                    )?,
                    None => writeln!(
                        out,
                        "{address}: line {}, tag {:#x}, not resident",
                        slot.index(),
                        slot.tag()
                    )?,
                }
            }
            ShowKind::Cycle => writeln!(out, "cycle #{}", self.sim.cycle())?,
            ShowKind::Config => writeln!(
                out,
                "{} lines, {}",
                array.len(),
                self.sim.controller().precedence()
            )?,
            ShowKind::Outputs => writeln!(out, "{}", self.sim.outputs())?,
            #[cfg(feature = "stat")]
            ShowKind::Stat => writeln!(out, "{}", self.sim.collect_stat().view(self.stat_width))?,
            #[cfg(not(feature = "stat"))]
            ShowKind::Stat => writeln!(out, "try compile with `--features stat`")?,
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Simulator<T>> {
        #[cfg(feature = "stat")]
        self.sim.exit_sim();
        self.sim.flush_trace()?;
        Ok(self.sim)
    }
}
