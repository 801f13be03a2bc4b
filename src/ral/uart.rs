//! UART registers.
//!
//! One block describes all eight instances; the constants below give the
//! per-instance base addresses.

use super::{RORegister, RWRegister, WORegister};

/// UART registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Data
    pub DR: RWRegister<u32>,
    /// Receive Status (read) / Error Clear (write)
    pub RSR: RWRegister<u32>,
    _reserved0: [u32; 4],
    /// Flag
    pub FR: RORegister<u32>,
    _reserved1: [u32; 1],
    /// IrDA Low-Power Register
    pub ILPR: RWRegister<u32>,
    /// Integer Baud-Rate Divisor
    pub IBRD: RWRegister<u32>,
    /// Fractional Baud-Rate Divisor
    pub FBRD: RWRegister<u32>,
    /// Line Control
    pub LCRH: RWRegister<u32>,
    /// Control
    pub CTL: RWRegister<u32>,
    /// Interrupt FIFO Level Select
    pub IFLS: RWRegister<u32>,
    /// Interrupt Mask
    pub IM: RWRegister<u32>,
    /// Raw Interrupt Status
    pub RIS: RORegister<u32>,
    /// Masked Interrupt Status
    pub MIS: RORegister<u32>,
    /// Interrupt Clear
    pub ICR: WORegister<u32>,
    /// DMA Control
    pub DMACTL: RWRegister<u32>,
}

// Did I calculate my reservations correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, FR) == 0x018);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, IBRD) == 0x024);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, MIS) == 0x040);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, DMACTL) == 0x048);

pub const UART0: *const RegisterBlock = 0x4000_C000 as *const RegisterBlock;
pub const UART1: *const RegisterBlock = 0x4000_D000 as *const RegisterBlock;
pub const UART2: *const RegisterBlock = 0x4000_E000 as *const RegisterBlock;
pub const UART3: *const RegisterBlock = 0x4000_F000 as *const RegisterBlock;
pub const UART4: *const RegisterBlock = 0x4001_0000 as *const RegisterBlock;
pub const UART5: *const RegisterBlock = 0x4001_1000 as *const RegisterBlock;
pub const UART6: *const RegisterBlock = 0x4001_2000 as *const RegisterBlock;
pub const UART7: *const RegisterBlock = 0x4001_3000 as *const RegisterBlock;

pub mod DR {
    /// Data Transmitted or Received
    pub mod DATA {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0xFF << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod RSR {
    /// Framing Error
    pub mod FE {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Parity Error
    pub mod PE {
        pub const offset: u32 = 1;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Break Error
    pub mod BE {
        pub const offset: u32 = 2;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Overrun Error
    pub mod OE {
        pub const offset: u32 = 3;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod FR {
    /// Clear To Send
    pub mod CTS {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// UART Busy
    pub mod BUSY {
        pub const offset: u32 = 3;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Receive FIFO Empty
    pub mod RXFE {
        pub const offset: u32 = 4;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit FIFO Full
    pub mod TXFF {
        pub const offset: u32 = 5;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit FIFO Empty
    pub mod TXFE {
        pub const offset: u32 = 7;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod LCRH {
    /// Send Break
    pub mod BRK {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Parity Enable
    pub mod PEN {
        pub const offset: u32 = 1;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Even Parity Select
    pub mod EPS {
        pub const offset: u32 = 2;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Two Stop Bits Select
    pub mod STP2 {
        pub const offset: u32 = 3;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Enable FIFOs
    pub mod FEN {
        pub const offset: u32 = 4;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Word Length
    pub mod WLEN {
        pub const offset: u32 = 5;
        pub const mask: u32 = 0x3 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod CTL {
    /// UART Enable
    pub mod UARTEN {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// End of Transmission
    pub mod EOT {
        pub const offset: u32 = 4;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit Enable
    pub mod TXE {
        pub const offset: u32 = 8;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Receive Enable
    pub mod RXE {
        pub const offset: u32 = 9;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Enable Request to Send
    pub mod RTSEN {
        pub const offset: u32 = 14;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Enable Clear To Send
    pub mod CTSEN {
        pub const offset: u32 = 15;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod IM {
    /// Receive DMA Interrupt Mask
    pub mod DMARXIM {
        pub const offset: u32 = 16;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit DMA Interrupt Mask
    pub mod DMATXIM {
        pub const offset: u32 = 17;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod MIS {
    /// Receive DMA Masked Interrupt Status
    pub mod DMARXMIS {
        pub const offset: u32 = 16;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit DMA Masked Interrupt Status
    pub mod DMATXMIS {
        pub const offset: u32 = 17;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod ICR {
    /// Receive DMA Interrupt Clear
    pub mod DMARXIC {
        pub const offset: u32 = 16;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit DMA Interrupt Clear
    pub mod DMATXIC {
        pub const offset: u32 = 17;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

pub mod DMACTL {
    /// Receive DMA Enable
    pub mod RXDMAE {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Transmit DMA Enable
    pub mod TXDMAE {
        pub const offset: u32 = 1;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// DMA on Error
    pub mod DMAERR {
        pub const offset: u32 = 2;
        pub const mask: u32 = 0x1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}
