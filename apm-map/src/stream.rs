use super::Result;

use std::io::{Read, Seek, SeekFrom, Write};

use apm_codec::Codec;

/// Every on-disk record occupies this many bytes at the start of its block.
pub const RECORD: usize = 512;

pub trait ReadExt: Read + Seek {
    fn record<T: Codec>(&mut self, offset: u64) -> Result<T> {
        debug_assert_eq!(T::SIZE, RECORD);

        let mut block = [0u8; RECORD];
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(&mut block)?;
        Ok(T::decode(&block[..])?)
    }
}

impl<T: Read + Seek + ?Sized> ReadExt for T {}

pub trait WriteExt: Write + Seek {
    fn put<T: Codec>(&mut self, offset: u64, record: &T) -> Result<()> {
        debug_assert_eq!(T::SIZE, RECORD);

        let mut block = [0u8; RECORD];
        record.encode(&mut block[..])?;
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(&block)?;
        Ok(())
    }
}

impl<T: Write + Seek + ?Sized> WriteExt for T {}
