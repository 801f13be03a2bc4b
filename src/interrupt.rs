//! Transfer completion support
//!
//! The μDMA engine has no completion interrupt of its own for
//! peripheral-paced transfers; each peripheral raises the completion on its
//! own interrupt line. Dispatchers (see
//! [`on_interrupt`](crate::uart::on_interrupt)) translate those causes into
//! [`wake`] calls on the channel that finished, and the [`Transfer`] future
//! picks it up from there.

use crate::{Channel, Error};
use core::{
    cell::RefCell,
    future::Future,
    marker::PhantomPinned,
    pin::Pin,
    sync::atomic,
    task::{Context, Poll, Waker},
};

use critical_section::Mutex;

type SharedWaker = Mutex<RefCell<Option<Waker>>>;
const NO_WAKER: SharedWaker = Mutex::new(RefCell::new(None));
static WAKERS: [SharedWaker; crate::CHANNELS] = [NO_WAKER; crate::CHANNELS];

/// Store `waker` as the waiter on `channel`'s transfer.
pub(crate) fn register(channel: usize, waker: Waker) {
    critical_section::with(|cs| {
        *WAKERS[channel].borrow(cs).borrow_mut() = Some(waker);
    });
}

/// Wake whoever is waiting on `channel`'s transfer, if anyone is.
pub(crate) fn wake(channel: usize) {
    critical_section::with(|cs| {
        if let Some(waker) = WAKERS[channel].borrow(cs).borrow_mut().take() {
            waker.wake();
        }
    });
}

fn clear(channel: usize) {
    critical_section::with(|cs| {
        *WAKERS[channel].borrow(cs).borrow_mut() = None;
    });
}

/// The root DMA transfer future
///
/// `Transfer` arms the channel on its first poll, and resolves once the
/// engine writes the channel's control entry back to stop mode. A
/// completion dispatcher wakes the executor; polling without an
/// interrupt-driven dispatcher also works.
pub struct Transfer<'a> {
    channel: &'a Channel,
    _pinned: PhantomPinned,
}

impl<'a> Transfer<'a> {
    /// # Safety
    ///
    /// Assumes that the transfer is correctly described in the channel's
    /// control entry. The channel arms after the first call to `poll()`.
    pub unsafe fn new(channel: &'a Channel) -> Self {
        Transfer {
            channel,
            _pinned: PhantomPinned,
        }
    }
}

impl Future for Transfer<'_> {
    type Output = Result<(), Error>;
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        register(self.channel.channel(), cx.waker().clone());

        loop {
            if self.channel.is_bus_error() {
                let status = self.channel.error_status();
                self.channel.clear_bus_error();
                return Poll::Ready(Err(status));
            } else if self.channel.is_complete() {
                return Poll::Ready(Ok(()));
            } else if self.channel.is_enabled() {
                return Poll::Pending;
            } else {
                // The control entry must be visible to the engine before
                // the enable bit is.
                atomic::fence(atomic::Ordering::SeqCst);
                // Safety: constructor's contract says the entry is valid.
                unsafe { self.channel.enable() };
            }
        }
    }
}

impl Drop for Transfer<'_> {
    fn drop(&mut self) {
        self.channel.disable();
        clear(self.channel.channel());
    }
}
