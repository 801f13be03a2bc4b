//! μDMA driver for TM4C129x microcontrollers
//!
//! `tm4c-udma` provides
//!
//! - an unsafe API for describing and scheduling transfers with μDMA
//!   [`Channel`]s and [`Transfer`]s
//! - safe DMA futures for memcpy, peripheral-to-memory, and
//!   memory-to-peripheral transfers
//! - a UART driver wired for DMA in both directions, including the
//!   shared-line completion dispatcher
//!
//! The engine reads transfer descriptors out of a RAM-resident
//! [`ControlTable`]. Statically allocate one, hand it to [`Udma`], and
//! never move it: the engine holds its address for the life of the
//! program.
//!
//! ```no_run
//! use tm4c_udma::{table::ControlTable, Udma};
//!
//! static CONTROL_TABLE: ControlTable = ControlTable::new();
//! // Safety: the address is the μDMA controller on every TM4C129x part.
//! static UDMA: Udma = unsafe { Udma::new(tm4c_udma::UDMA, &CONTROL_TABLE) };
//!
//! # fn demo() {
//! UDMA.enable();
//! // Safety: we only allocate one channel 0 object.
//! let mut channel = unsafe { UDMA.channel(0) };
//! # }
//! ```
//!
//! Once you have a channel, you can use the higher-level DMA APIs, like
//!
//! - [`memcpy`](crate::memcpy::memcpy) for memory copies.
//! - [`write`](crate::peripheral::write) to transmit data from memory to
//!   a peripheral.
//! - [`read`](crate::peripheral::read) to receive data from a peripheral.
//!
//! Peripheral transfers depend on a peripheral's DMA support, signaled
//! through the [`peripheral`] traits; the [`uart`] module implements them.
//!
//! ### License
//!
//! Licensed under either of
//!
//! - [Apache License, Version 2.0](http://www.apache.org/licenses/LICENSE-2.0)
//! - [MIT License](http://opensource.org/licenses/MIT)
//!
//! at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.

#![cfg_attr(not(test), no_std)]

mod channel;
mod element;
mod error;
mod interrupt;
pub mod gpio;
pub mod memcpy;
pub mod peripheral;
mod ral;
pub mod sysctl;
pub mod table;
pub mod uart;

pub use channel::Channel;
pub use element::Element;
pub use error::Error;
pub use interrupt::Transfer;
pub use table::ControlTable;

/// A DMA result
pub type Result<T> = core::result::Result<T, Error>;

/// The number of μDMA channels on TM4C129x devices
pub const CHANNELS: usize = 32;

/// The μDMA controller's register base, for [`Udma::new`]
pub const UDMA: *const () = ral::udma::UDMA as *const ();

/// The μDMA driver
///
/// `Udma` pairs the engine's registers with the [`ControlTable`] the
/// engine reads descriptors from, and allocates [`Channel`]s.
pub struct Udma {
    registers: ral::Static<ral::udma::RegisterBlock>,
    table: &'static ControlTable,
}

// Safety: OK to allocate the DMA driver in a static context. Interior
// access goes through volatile register and table cells.
unsafe impl Sync for Udma {}

impl Udma {
    /// Create the DMA driver
    ///
    /// This evaluates at compile time, so the driver can live in a
    /// `static`.
    ///
    /// # Safety
    ///
    /// Caller must make sure that `registers` points to the start of the
    /// μDMA register block ([`UDMA`] on TM4C129x parts).
    pub const unsafe fn new(registers: *const (), table: &'static ControlTable) -> Self {
        Udma {
            registers: ral::Static(registers as *const ral::udma::RegisterBlock),
            table,
        }
    }

    /// Enable the engine and publish the control table's base address
    ///
    /// Safe to call while the table's entries are still zeroed: a
    /// stop-mode entry is inert, and a channel only consumes its entry
    /// once armed. Descriptors are written before arming; see
    /// [`Channel::set_transfer`].
    pub fn enable(&self) {
        ral::write_reg!(crate::ral::udma, self.registers, CFG, MASTEN: 1);
        self.registers.CTLBASE.write(self.table.base_address());
    }

    /// Returns `true` if the engine's master enable is on
    pub fn is_enabled(&self) -> bool {
        ral::read_reg!(crate::ral::udma, self.registers, STAT, MASTEN == 1)
    }

    /// Creates the DMA channel described by `index`
    ///
    /// # Safety
    ///
    /// This will create a handle that may alias global, mutable state.
    /// You should only create one channel per index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`CHANNELS`].
    pub unsafe fn channel(&self, index: usize) -> Channel {
        assert!(
            index < CHANNELS,
            "uDMA channel index {} exceeds CHANNELS",
            index
        );
        Channel::new(index, self.registers, self.table.primary(index))
    }
}

use core::{future::Future, pin::Pin, task::Poll};

/// Poll a future with a dummy waker.
///
/// Use `poll_no_wake` when you want to drive a future to completion, but you
/// don't care about the future waking an executor. It may be used to initiate
/// a DMA transfer that will later be awaited with [`block`].
///
/// Do not use `poll_no_wake` if you want an executor to be woken when the DMA
/// transfer completes.
pub fn poll_no_wake<F>(future: Pin<&mut F>) -> Poll<F::Output>
where
    F: Future,
{
    use core::task::{Context, RawWaker, RawWakerVTable, Waker};
    const VTABLE: RawWakerVTable = RawWakerVTable::new(|_| RAW_WAKER, |_| {}, |_| {}, |_| {});

    const RAW_WAKER: RawWaker = RawWaker::new(core::ptr::null(), &VTABLE);
    // Safety: raw waker meets documented requirements.
    let waker = unsafe { Waker::from_raw(RAW_WAKER) };
    let mut context = Context::from_waker(&waker);
    future.poll(&mut context)
}

/// Block until the future returns a result.
///
/// `block` invokes [`poll_no_wake`] in a loop until the future
/// returns a result. Consider using `block` after starting a transfer
/// with `poll_no_wake`, and after doing other work.
pub fn block<F>(mut future: Pin<&mut F>) -> F::Output
where
    F: Future,
{
    loop {
        match poll_no_wake(future.as_mut()) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
