//! System control registers.
//!
//! Only the run-mode clock gates and peripheral-ready registers this driver
//! polls; the rest of the system-control space is reserved padding here.

use super::{RORegister, RWRegister};

/// System control registers (partial).
#[repr(C)]
pub struct RegisterBlock {
    _reserved0: [u32; 386],
    /// GPIO Run Mode Clock Gating Control
    pub RCGCGPIO: RWRegister<u32>,
    /// μDMA Run Mode Clock Gating Control
    pub RCGCDMA: RWRegister<u32>,
    _reserved1: [u32; 2],
    /// UART Run Mode Clock Gating Control
    pub RCGCUART: RWRegister<u32>,
    _reserved2: [u32; 251],
    /// GPIO Peripheral Ready
    pub PRGPIO: RORegister<u32>,
    /// μDMA Peripheral Ready
    pub PRDMA: RORegister<u32>,
    _reserved3: [u32; 2],
    /// UART Peripheral Ready
    pub PRUART: RORegister<u32>,
}

// Did I calculate my reservations correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, RCGCGPIO) == 0x608);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, RCGCDMA) == 0x60C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, RCGCUART) == 0x618);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, PRGPIO) == 0xA08);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, PRDMA) == 0xA0C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, PRUART) == 0xA18);

/// The system control block.
pub const SYSCTL: *const RegisterBlock = 0x400F_E000 as *const RegisterBlock;
