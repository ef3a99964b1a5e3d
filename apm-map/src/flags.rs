use bitflags::bitflags;

bitflags! {
    /// Status bits stored in a partition entry.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        const VALID = 0x0000_0001;
        const ALLOCATED = 0x0000_0002;
        const IN_USE = 0x0000_0004;
        const BOOTABLE = 0x0000_0008;
        const READABLE = 0x0000_0010;
        const WRITABLE = 0x0000_0020;
        const OS_PIC_CODE = 0x0000_0040;
        const OS_SPECIFIC_2 = 0x0000_0080;
        const OS_SPECIFIC_1 = 0x0000_0100;
        const OS_SPECIFIC_0 = 0x0000_0200;
        const DUMMY = 0x4000_0000;

        // Reserved and vendor bits survive a load/save cycle.
        const _ = !0;
    }
}
