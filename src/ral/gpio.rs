//! GPIO port registers.
//!
//! TM4C129x ports sit on the AHB aperture only. One block describes every
//! port; the constants below give the per-port base addresses.

use super::{RORegister, RWRegister, WORegister};

/// GPIO port registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Data, address-masked: offset selects which bits a read/write touches
    pub DATA: [RWRegister<u32>; 256],
    /// Direction
    pub DIR: RWRegister<u32>,
    /// Interrupt Sense
    pub IS: RWRegister<u32>,
    /// Interrupt Both Edges
    pub IBE: RWRegister<u32>,
    /// Interrupt Event
    pub IEV: RWRegister<u32>,
    /// Interrupt Mask
    pub IM: RWRegister<u32>,
    /// Raw Interrupt Status
    pub RIS: RORegister<u32>,
    /// Masked Interrupt Status
    pub MIS: RORegister<u32>,
    /// Interrupt Clear
    pub ICR: WORegister<u32>,
    /// Alternate Function Select
    pub AFSEL: RWRegister<u32>,
    _reserved0: [u32; 55],
    /// 2-mA Drive Select
    pub DR2R: RWRegister<u32>,
    /// 4-mA Drive Select
    pub DR4R: RWRegister<u32>,
    /// 8-mA Drive Select
    pub DR8R: RWRegister<u32>,
    /// Open Drain Select
    pub ODR: RWRegister<u32>,
    /// Pull-Up Select
    pub PUR: RWRegister<u32>,
    /// Pull-Down Select
    pub PDR: RWRegister<u32>,
    /// Slew Rate Control Select
    pub SLR: RWRegister<u32>,
    /// Digital Enable
    pub DEN: RWRegister<u32>,
    /// Lock
    pub LOCK: RWRegister<u32>,
    /// Commit
    pub CR: RWRegister<u32>,
    /// Analog Mode Select
    pub AMSEL: RWRegister<u32>,
    /// Port Control, one 4-bit function field per pin
    pub PCTL: RWRegister<u32>,
}

// Did I calculate my reservations correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, DIR) == 0x400);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, AFSEL) == 0x420);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, DEN) == 0x51C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, PCTL) == 0x52C);

pub const GPIOA: *const RegisterBlock = 0x4005_8000 as *const RegisterBlock;
pub const GPIOB: *const RegisterBlock = 0x4005_9000 as *const RegisterBlock;
pub const GPIOC: *const RegisterBlock = 0x4005_A000 as *const RegisterBlock;
pub const GPIOD: *const RegisterBlock = 0x4005_B000 as *const RegisterBlock;
pub const GPIOE: *const RegisterBlock = 0x4005_C000 as *const RegisterBlock;
pub const GPIOF: *const RegisterBlock = 0x4005_D000 as *const RegisterBlock;
pub const GPIOG: *const RegisterBlock = 0x4005_E000 as *const RegisterBlock;
pub const GPIOH: *const RegisterBlock = 0x4005_F000 as *const RegisterBlock;
pub const GPIOJ: *const RegisterBlock = 0x4006_0000 as *const RegisterBlock;
pub const GPIOK: *const RegisterBlock = 0x4006_1000 as *const RegisterBlock;
pub const GPIOL: *const RegisterBlock = 0x4006_2000 as *const RegisterBlock;
pub const GPIOM: *const RegisterBlock = 0x4006_3000 as *const RegisterBlock;
pub const GPION: *const RegisterBlock = 0x4006_4000 as *const RegisterBlock;
pub const GPIOP: *const RegisterBlock = 0x4006_5000 as *const RegisterBlock;
pub const GPIOQ: *const RegisterBlock = 0x4006_6000 as *const RegisterBlock;
