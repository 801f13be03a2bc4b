//! A RAL-like module for the peripherals this driver touches
//!
//! There is no generated register access layer for the TM4C parts that
//! represents register clusters the way this driver wants them: the μDMA
//! channel map as an array, one UART block reused for every instance, the
//! handful of system-control registers we actually read. This module
//! hand-writes those blocks, and exposes an interface that lets us use the
//! RAL macros where field access is worth it.

#![allow(non_snake_case)] // Compatibility with RAL register naming

pub mod gpio;
pub mod sysctl;
pub mod uart;
pub mod udma;

pub use ral_registers::{modify_reg, read_reg, write_reg};
use ral_registers::{RORegister, RWRegister, WORegister};

//
// Helper type for static memory
//
// Similar to a RAL `Instance`, but more copy.
//

pub(crate) struct Static<T>(pub(crate) *const T);
impl<T> core::ops::Deref for Static<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // Safety: pointer points to static memory (peripheral memory)
        unsafe { &*self.0 }
    }
}
impl<T> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Static<T> {}
