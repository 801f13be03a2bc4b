//! μDMA controller registers.

use super::{RORegister, RWRegister, WORegister};

/// μDMA registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Status
    pub STAT: RORegister<u32>,
    /// Configuration
    pub CFG: WORegister<u32>,
    /// Channel Control Base Pointer
    pub CTLBASE: RWRegister<u32>,
    /// Alternate Channel Control Base Pointer
    pub ALTBASE: RORegister<u32>,
    /// Channel Wait-on-Request Status
    pub WAITSTAT: RORegister<u32>,
    /// Channel Software Request
    pub SWREQ: WORegister<u32>,
    /// Channel Useburst Set
    pub USEBURSTSET: RWRegister<u32>,
    /// Channel Useburst Clear
    pub USEBURSTCLR: WORegister<u32>,
    /// Channel Request Mask Set
    pub REQMASKSET: RWRegister<u32>,
    /// Channel Request Mask Clear
    pub REQMASKCLR: WORegister<u32>,
    /// Channel Enable Set
    pub ENASET: RWRegister<u32>,
    /// Channel Enable Clear
    pub ENACLR: WORegister<u32>,
    /// Channel Primary Alternate Set
    pub ALTSET: RWRegister<u32>,
    /// Channel Primary Alternate Clear
    pub ALTCLR: WORegister<u32>,
    /// Channel Priority Set
    pub PRIOSET: RWRegister<u32>,
    /// Channel Priority Clear
    pub PRIOCLR: WORegister<u32>,
    _reserved0: [u32; 3],
    /// Bus Error Clear
    pub ERRCLR: RWRegister<u32>,
    _reserved1: [u32; 300],
    /// Channel Assignment (legacy select, superseded by CHMAP)
    pub CHASGN: RWRegister<u32>,
    /// Channel Interrupt Status
    pub CHIS: RWRegister<u32>,
    _reserved2: [u32; 2],
    /// Channel Map Select, eight 4-bit fields per register
    pub CHMAP: [RWRegister<u32>; 4],
}

// Did I calculate my reservations correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, PRIOCLR) == 0x03C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, ERRCLR) == 0x04C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CHASGN) == 0x500);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CHMAP) == 0x510);

/// The μDMA controller, at the same address on every TM4C129x part.
pub const UDMA: *const RegisterBlock = 0x400F_F000 as *const RegisterBlock;

pub mod STAT {
    /// Master Enable Status
    pub mod MASTEN {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Control State Machine Status
    pub mod STATE {
        pub const offset: u32 = 4;
        pub const mask: u32 = 0xF << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Available μDMA Channels Minus 1
    pub mod DMACHANS {
        pub const offset: u32 = 16;
        pub const mask: u32 = 0x1F << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod CFG {
    /// Controller Master Enable
    pub mod MASTEN {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}
