use apm_codec::codec;

codec! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct DriverDescriptor {
        /// First block of the driver, in label block size units.
        pub block: u32,
        /// Driver length in 512-byte sectors.
        pub size: u16,
        pub system: u16,
    }

    /// The driver descriptor record found at the base of the map.
    ///
    /// Only the signature, block size and block count are interpreted. The
    /// device and driver fields are carried through a load/save unchanged.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Label {
        pub signature: u16,
        pub block_size: u16,
        pub block_count: u32,
        pub device_type: u16,
        pub device_id: u16,
        pub driver_data: u32,
        pub driver_count: u16,
        pub drivers: [DriverDescriptor; 8],
        pub reserved: [u8; 430],
    }
}

impl Label {
    pub const SIGNATURE: u16 = 0x4552;
    pub const SIZE: usize = 512;

    pub(crate) fn new(block_size: u16, block_count: u32) -> Self {
        Self {
            signature: Self::SIGNATURE,
            block_size,
            block_count,
            device_type: 0,
            device_id: 0,
            driver_data: 0,
            driver_count: 0,
            drivers: [DriverDescriptor::default(); 8],
            reserved: [0; 430],
        }
    }
}
