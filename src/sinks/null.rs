//! Backend that accepts and discards everything

use crate::core::{LogRecord, Result, SerializedSink, SinkBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl SinkBackend for NullBackend {
    fn write(&mut self, _record: &LogRecord, _formatted: &[u8]) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

pub type NullSink = SerializedSink<NullBackend>;
