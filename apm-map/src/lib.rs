mod config;
mod entry;
mod error;
mod flags;
mod label;
mod range;
mod stream;

pub use config::Config;
pub use entry::Entry;
pub use error::{Error, Result};
pub use flags::Flags;
pub use label::{DriverDescriptor, Label};

use entry::{field, EntriesExt};
use range::Range;
use stream::{ReadExt, WriteExt};

use std::convert::TryFrom;
use std::io::{Read, Seek, Write};

use log::{debug, trace, warn};

/// An Apple Partition Map.
///
/// Record zero describes the map itself and is hidden: partition `i` as seen
/// by callers is record `i + 1`.
pub struct Map {
    offset: u64,
    label: Label,
    entries: Vec<Entry>,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("offset", &self.offset)
            .field("block_size", &self.block_size())
            .field("blocks", &self.device_block_count())
            .field("partitions", &self.partition_count())
            .finish()
    }
}

impl Map {
    fn fresh(block_size: u16) -> Self {
        // One block for the label, one for the map record.
        Self {
            offset: 0,
            label: Label::new(block_size, 2),
            entries: vec![Entry::map()],
        }
    }

    pub fn new(config: Config) -> Result<Self> {
        if !Config::valid_block_size(config.block_size) {
            return Err(Error::InvalidArgument);
        }

        Ok(Self::fresh(config.block_size))
    }

    pub fn create_default() -> Self {
        Self::fresh(Config::default().block_size)
    }

    /// Reads a map starting at the stream's current position.
    ///
    /// That position becomes the map's base; every record is located
    /// relative to it, so a map nested inside a larger image loads the same
    /// way as one at the start of a device.
    pub fn load(mut stream: impl Read + Seek) -> Result<Self> {
        let offset = stream.stream_position()?;

        let label: Label = stream.record(offset)?;
        if label.signature != Label::SIGNATURE {
            debug!("no label signature at {:#x}", offset);
            return Err(Error::Invalid);
        }

        if !Config::valid_block_size(label.block_size) {
            debug!("bad block size {} at {:#x}", label.block_size, offset);
            return Err(Error::Invalid);
        }

        let size = u64::from(label.block_size);
        let first: Entry = stream.record(offset + size)?;
        if first.signature != Entry::SIGNATURE || !first.is_map() || first.map_entries < 1 {
            debug!("no map record at {:#x}", offset + size);
            return Err(Error::Invalid);
        }

        let count = first.map_entries;
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count as usize)
            .map_err(|_| Error::OutOfMemory)?;
        entries.push(first);

        for i in 1..u64::from(count) {
            let mut entry: Entry = stream.record(offset + (i + 1) * size)?;
            if entry.signature != Entry::SIGNATURE {
                debug!("record {} has no signature", i);
                return Err(Error::Invalid);
            }

            if entry.map_entries != count {
                warn!(
                    "record {} claims {} entries, map has {}",
                    i, entry.map_entries, count
                );
                entry.map_entries = count;
            }

            trace!("record {}: {:?}", i, entry.range());
            entries.push(entry);
        }

        debug!(
            "loaded map at {:#x}: block size {}, {} records",
            offset, label.block_size, count
        );

        Ok(Self {
            offset,
            label,
            entries,
        })
    }

    /// Writes the label at the stream's current position and each record in
    /// the block that follows it.
    pub fn save(&self, mut stream: impl Write + Seek) -> Result<()> {
        let offset = stream.stream_position()?;
        let size = u64::from(self.label.block_size);

        stream.put(offset, &self.label)?;
        for (i, entry) in self.entries.iter().enumerate() {
            stream.put(offset + (i as u64 + 1) * size, entry)?;
        }

        stream.flush()?;
        debug!(
            "saved map at {:#x}: block size {}, {} records",
            offset,
            size,
            self.entries.len()
        );

        Ok(())
    }

    /// The stream position the map was loaded from.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[inline]
    pub fn partition_count(&self) -> usize {
        self.entries.len() - 1
    }

    #[inline]
    pub fn block_size(&self) -> u16 {
        self.label.block_size
    }

    pub fn set_block_size(&mut self, size: u16) -> Result<()> {
        if !Config::valid_block_size(size) {
            debug!("rejecting block size {}", size);
            return Err(Error::InvalidArgument);
        }

        self.label.block_size = size;
        Ok(())
    }

    #[inline]
    pub fn device_block_count(&self) -> u32 {
        self.label.block_count
    }

    #[inline]
    pub fn set_device_block_count(&mut self, blocks: u32) {
        self.label.block_count = blocks;
    }

    /// Flags of the hidden record describing the map itself.
    #[inline]
    pub fn map_flags(&self) -> Flags {
        self.entries[0].flags()
    }

    fn index(&self, partition: usize) -> Result<usize> {
        match partition.checked_add(1) {
            Some(index) if index < self.entries.len() => Ok(index),
            _ => Err(Error::OutOfRange),
        }
    }

    pub fn partition(&self, partition: usize) -> Result<&Entry> {
        Ok(&self.entries[self.index(partition)?])
    }

    /// Reports whether `block` is claimed by a partition other than
    /// `partition`, or lies past the end of the device.
    pub fn is_block_in_use(&self, partition: usize, block: u64) -> bool {
        let skip = partition.saturating_add(1);
        self.entries.in_use(skip, block, self.label.block_count)
    }

    /// Checks a proposed placement by probing the block just past its end.
    pub fn fits(&self, partition: usize, start: u32, count: u32) -> bool {
        let skip = partition.saturating_add(1);
        self.entries.fits(skip, start, count, self.label.block_count)
    }

    pub fn partition_start(&self, partition: usize) -> Result<u32> {
        Ok(self.partition(partition)?.pblock_start)
    }

    pub fn set_partition_start(&mut self, partition: usize, block: u32) -> Result<()> {
        let index = self.index(partition)?;
        let device = self.label.block_count;

        if self.entries.in_use(index, block.into(), device) {
            debug!("partition {}: block {} is in use", partition, block);
            return Err(Error::Conflict);
        }

        let count = self.entries[index].pblocks;
        if !self.entries.fits(index, block, count, device) {
            debug!(
                "partition {}: {} blocks at {} collide",
                partition, count, block
            );
            return Err(Error::Conflict);
        }

        let entry = &mut self.entries[index];
        entry.pblock_start = block;
        entry.lblock_start = block;
        Ok(())
    }

    pub fn partition_blocks(&self, partition: usize) -> Result<u32> {
        Ok(self.partition(partition)?.pblocks)
    }

    pub fn set_partition_blocks(&mut self, partition: usize, count: u32) -> Result<()> {
        let index = self.index(partition)?;
        let start = self.entries[index].pblock_start;

        if !self.entries.fits(index, start, count, self.label.block_count) {
            debug!(
                "partition {}: {} blocks at {} collide",
                partition, count, start
            );
            return Err(Error::Conflict);
        }

        let entry = &mut self.entries[index];
        entry.pblocks = count;
        entry.lblocks = count;
        Ok(())
    }

    pub fn partition_flags(&self, partition: usize) -> Result<Flags> {
        Ok(self.partition(partition)?.flags())
    }

    pub fn set_partition_flags(&mut self, partition: usize, flags: Flags) -> Result<()> {
        let index = self.index(partition)?;
        self.entries[index].flags = flags.bits();
        Ok(())
    }

    /// The partition name with its zero padding removed.
    pub fn partition_name(&self, partition: usize) -> Result<&[u8]> {
        Ok(self.partition(partition)?.name())
    }

    /// Stores at most 32 bytes, zero padded.
    pub fn set_partition_name(&mut self, partition: usize, name: impl AsRef<[u8]>) -> Result<()> {
        let index = self.index(partition)?;
        self.entries[index].name = field(name.as_ref()).ok_or(Error::InvalidArgument)?;
        Ok(())
    }

    /// The partition type string with its zero padding removed.
    pub fn partition_type(&self, partition: usize) -> Result<&[u8]> {
        Ok(self.partition(partition)?.kind())
    }

    /// Stores at most 32 bytes, zero padded.
    pub fn set_partition_type(&mut self, partition: usize, kind: impl AsRef<[u8]>) -> Result<()> {
        let index = self.index(partition)?;
        self.entries[index].kind = field(kind.as_ref()).ok_or(Error::InvalidArgument)?;
        Ok(())
    }

    /// Appends an empty partition and returns its index.
    ///
    /// Every record is renumbered and the map record grows to span all of
    /// the records, one block each.
    pub fn add_partition(&mut self) -> Result<usize> {
        let count = u32::try_from(self.entries.len() + 1).map_err(|_| Error::OutOfMemory)?;
        self.entries.try_reserve(1).map_err(|_| Error::OutOfMemory)?;

        self.entries.push(Entry::new(count));
        for entry in &mut self.entries {
            entry.map_entries = count;
        }

        let map = &mut self.entries[0];
        map.pblocks = count;
        map.lblocks = count;

        Ok(self.partition_count() - 1)
    }
}
