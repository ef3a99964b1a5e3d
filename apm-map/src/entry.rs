use super::{Flags, Range};

use apm_codec::codec;

codec! {
    /// A single partition map record.
    ///
    /// The boot fields and processor id are preserved verbatim; nothing here
    /// validates them.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Entry {
        pub signature: u16,
        pub reserved0: u16,
        pub map_entries: u32,
        pub pblock_start: u32,
        pub pblocks: u32,
        pub name: [u8; 32],
        pub kind: [u8; 32],
        pub lblock_start: u32,
        pub lblocks: u32,
        pub flags: u32,
        pub lboot_block: u32,
        pub boot_bytes: u32,
        pub boot_load: u32,
        pub boot_load2: u32,
        pub boot_goto: u32,
        pub boot_goto2: u32,
        pub checksum: u32,
        pub processor: [u8; 16],
        pub reserved1: [u32; 32],
        pub reserved2: [u32; 62],
    }
}

impl Entry {
    pub const SIGNATURE: u16 = 0x504d;
    pub const SIZE: usize = 512;

    pub const MAP_NAME: &'static [u8] = b"Apple";
    pub const MAP_TYPE: &'static [u8] = b"Apple_partition_map";

    pub(crate) fn new(map_entries: u32) -> Self {
        Self {
            signature: Self::SIGNATURE,
            reserved0: 0,
            map_entries,
            pblock_start: 0,
            pblocks: 0,
            name: [0; 32],
            kind: [0; 32],
            lblock_start: 0,
            lblocks: 0,
            flags: 0,
            lboot_block: 0,
            boot_bytes: 0,
            boot_load: 0,
            boot_load2: 0,
            boot_goto: 0,
            boot_goto2: 0,
            checksum: 0,
            processor: [0; 16],
            reserved1: [0; 32],
            reserved2: [0; 62],
        }
    }

    /// The record describing the partition map itself.
    pub(crate) fn map() -> Self {
        let mut entry = Self::new(1);
        entry.pblock_start = 1;
        entry.pblocks = 1;
        entry.lblock_start = 1;
        entry.lblocks = 1;
        entry.name = field(Self::MAP_NAME).unwrap_or_default();
        entry.kind = field(Self::MAP_TYPE).unwrap_or_default();
        entry.flags = (Flags::VALID | Flags::ALLOCATED).bits();
        entry
    }

    #[inline]
    pub(crate) fn range(&self) -> Range {
        Range::new(self.pblock_start, self.pblocks)
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.flags)
    }

    #[inline]
    pub fn name(&self) -> &[u8] {
        text(&self.name)
    }

    #[inline]
    pub fn kind(&self) -> &[u8] {
        text(&self.kind)
    }

    /// Matches the full zero padded fields, not just the text before the
    /// first zero byte.
    pub(crate) fn is_map(&self) -> bool {
        Some(self.name) == field(Self::MAP_NAME) && Some(self.kind) == field(Self::MAP_TYPE)
    }
}

/// Zero pads `value` into a fixed text field, refusing anything that won't fit.
pub(crate) fn field(value: &[u8]) -> Option<[u8; 32]> {
    let mut buff = [0u8; 32];
    if value.len() > buff.len() {
        return None;
    }

    buff[..value.len()].copy_from_slice(value);
    Some(buff)
}

fn text(field: &[u8; 32]) -> &[u8] {
    let len = field.iter().position(|&x| x == 0).unwrap_or(field.len());
    &field[..len]
}

pub trait EntriesExt {
    fn in_use(&self, skip: usize, block: u64, device: u32) -> bool;
    fn fits(&self, skip: usize, start: u32, count: u32, device: u32) -> bool;
}

impl EntriesExt for [Entry] {
    /// Reports whether `block` is claimed by any entry other than `skip`.
    ///
    /// Blocks at or past the end of the device count as claimed. The map
    /// record is not an obstacle: its span tracks the records themselves.
    /// Nothing keeps a partition off the label and map blocks either, so a
    /// partition placed there is overwritten by the records on save.
    fn in_use(&self, skip: usize, block: u64, device: u32) -> bool {
        for (i, entry) in self.iter().enumerate().skip(1) {
            if i == skip {
                continue;
            }

            if entry.range().includes(block) {
                return true;
            }
        }

        block >= u64::from(device)
    }

    /// Probes only the first block past the proposed end of the range.
    ///
    /// This is weaker than a full overlap check but it decides which
    /// placements existing maps accept, so it is kept as is.
    fn fits(&self, skip: usize, start: u32, count: u32, device: u32) -> bool {
        !self.in_use(skip, Range::new(start, count).end(), device)
    }
}
