use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Bounds-checked big-endian reader over a fully buffered class file.
pub struct ClassfileStream<'a> {
    r: Cursor<&'a [u8]>,
}

impl<'a> ClassfileStream<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(bytes),
        }
    }

    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.r.get_ref().len().saturating_sub(self.position())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let position = self.position();
        self.r.read_u8().map_err(|_| truncated(position, 1))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let position = self.position();
        self.r.read_u16::<Endian>().map_err(|_| truncated(position, 2))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let position = self.position();
        self.r.read_u32::<Endian>().map_err(|_| truncated(position, 4))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let position = self.position();
        self.r.read_i32::<Endian>().map_err(|_| truncated(position, 4))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let position = self.position();
        self.r.read_i64::<Endian>().map_err(|_| truncated(position, 8))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let position = self.position();
        self.r.read_f32::<Endian>().map_err(|_| truncated(position, 4))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let position = self.position();
        self.r.read_f64::<Endian>().map_err(|_| truncated(position, 8))
    }

    /// Borrows the next `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let position = self.position();
        if self.remaining() < len {
            return Err(truncated(position, len));
        }

        let buf: &'a [u8] = *self.r.get_ref();
        self.r.set_position((position + len) as u64);
        Ok(&buf[position..position + len])
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// The bytes consumed between `start` and the current position.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        let buf: &'a [u8] = *self.r.get_ref();
        &buf[start.min(self.position())..self.position()]
    }

    pub fn check_end_of_file(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ClassFileError::TrailingBytes(n)),
        }
    }
}

fn truncated(position: usize, requested: usize) -> ClassFileError {
    ClassFileError::Truncated {
        position,
        requested,
    }
}
