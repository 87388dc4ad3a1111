use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::{
    address::Address,
    signal::{Control, Inputs, Outputs},
};

/// one rising edge: the inputs sampled on it and the outputs visible after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub cycle: usize,
    pub reset: bool,
    pub write_enable: bool,
    pub read_enable: bool,
    pub address: Address,
    pub write_data: u32,
    pub hit: bool,
    pub read_data: u32,
}

impl TraceRecord {
    pub fn new(cycle: usize, inputs: &Inputs, outputs: Outputs) -> Self {
        Self {
            cycle,
            reset: inputs.control.contains(Control::Reset),
            write_enable: inputs.control.contains(Control::Write),
            read_enable: inputs.control.contains(Control::Read),
            address: inputs.address,
            write_data: inputs.write_data,
            hit: outputs.hit,
            read_data: outputs.read_data,
        }
    }
}

pub trait Trace {
    fn record(&mut self, record: &TraceRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct EmptyTrace {}

impl EmptyTrace {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for EmptyTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl Trace for EmptyTrace {
    fn record(&mut self, _: &TraceRecord) -> Result<()> {
        Ok(())
    }
}

/// writes one JSON object per line
pub struct JsonTrace<W> {
    writer: W,
}

impl<W: Write> JsonTrace<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Trace for JsonTrace<W> {
    fn record(&mut self, record: &TraceRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTrace {
    records: Vec<TraceRecord>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }
}

impl Trace for MemoryTrace {
    fn record(&mut self, record: &TraceRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

impl<T: Trace + ?Sized> Trace for Box<T> {
    fn record(&mut self, record: &TraceRecord) -> Result<()> {
        (**self).record(record)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_trace() {
        let mut t = JsonTrace::new(Vec::new());
        let inputs = Inputs::write(Address::new(0x12_3456).unwrap(), 0xDEADBEEF);
        t.record(&TraceRecord::new(3, &inputs, Outputs::default()))
            .unwrap();
        t.record(&TraceRecord::new(4, &Inputs::idle(), Outputs::hit(1)))
            .unwrap();
        let out = String::from_utf8(t.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!(
            r#"{"cycle":3,"reset":false,"write_enable":true,"read_enable":false,"address":1193046,"write_data":3735928559,"hit":false,"read_data":0}"#,
            lines[0]
        );
        let v: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(Some(true), v["hit"].as_bool());
        assert_eq!(Some(4), v["cycle"].as_u64());
    }
}
