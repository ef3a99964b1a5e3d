/// Defaults applied to a freshly created map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Logical block size in bytes; must be a positive multiple of 512.
    pub block_size: u16,
}

impl Config {
    pub const SECTOR: u16 = 512;

    #[inline]
    pub fn valid_block_size(size: u16) -> bool {
        size != 0 && size % Self::SECTOR == 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: Self::SECTOR,
        }
    }
}
