//! MRT record framing.
use crate::error::GeneratorError;
use crate::models::*;
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use std::io::Write;

impl CommonHeader {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(MRT_HEADER_LEN);
        bytes.put_u32(self.timestamp);
        bytes.put_u16(self.entry_type.into());
        bytes.put_u16(self.entry_subtype);
        bytes.put_u32(self.length);
        bytes.freeze()
    }
}

/// A message that can be written as the body of one MRT record.
pub trait MrtEncode {
    fn entry_type(&self) -> EntryType;

    fn entry_subtype(&self) -> u16;

    fn encode(&self) -> Result<Bytes, GeneratorError>;
}

/// Source of the timestamps stamped on MRT records and RIB entries.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u32;
}

/// Wall clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        // MRT timestamps are 32 bits wide
        chrono::Utc::now().timestamp() as u32
    }
}

/// Always returns the same time. Makes generated files reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn now(&self) -> u32 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u32 {
        (**self).now()
    }
}

/// Writes MRT records to an output stream.
///
/// Every record is built in memory and handed to the writer in one piece, so the output does not
/// need to be seekable.
pub struct MrtWriter<W: Write, C: Clock = SystemClock> {
    writer: W,
    clock: C,
    records: u64,
    bytes: u64,
}

impl<W: Write> MrtWriter<W, SystemClock> {
    pub fn new(writer: W) -> Self {
        MrtWriter::with_clock(writer, SystemClock)
    }
}

impl<W: Write, C: Clock> MrtWriter<W, C> {
    pub fn with_clock(writer: W, clock: C) -> Self {
        MrtWriter {
            writer,
            clock,
            records: 0,
            bytes: 0,
        }
    }

    /// Current time according to the writer's clock.
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    /// Wraps `payload` with a common header stamped with the current time and writes the record.
    pub fn write_record(
        &mut self,
        entry_type: EntryType,
        entry_subtype: u16,
        payload: &[u8],
    ) -> Result<(), GeneratorError> {
        let length = u32::try_from(payload.len()).map_err(|_| GeneratorError::FieldOverflow {
            field: "MRT record",
            len: payload.len(),
        })?;
        let header = CommonHeader {
            timestamp: self.clock.now(),
            entry_type,
            entry_subtype,
            length,
        };
        self.writer.write_all(&header.encode())?;
        self.writer.write_all(payload)?;
        self.records += 1;
        self.bytes += (MRT_HEADER_LEN + payload.len()) as u64;
        Ok(())
    }

    /// Encodes `message` and writes it as one record.
    pub fn write<M: MrtEncode + ?Sized>(&mut self, message: &M) -> Result<(), GeneratorError> {
        let payload = message.encode()?;
        self.write_record(message.entry_type(), message.entry_subtype(), &payload)
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> Result<(), GeneratorError> {
        self.writer.flush()?;
        debug!(
            "flushed {} MRT records ({} bytes)",
            self.records, self.bytes
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
