//! DMA-powered memcpy

use crate::{
    interrupt::Transfer,
    table::{Arbitration, TransferMode},
    Channel, Element, Error,
};

use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// A memcpy operation
///
/// The future yields when the copy is complete.
pub struct Memcpy<'a> {
    transfer: Transfer<'a>,
    channel: &'a Channel,
}

/// Perform a DMA-powered `memcpy` between the `source` and `destination`
/// buffers
///
/// Copies the minimum number of elements between the two buffers. The
/// transfer runs in auto mode off a software request, so it needs no
/// peripheral pacing and no interrupt: polling the future drives it.
/// `memcpy` modifies the channel's state; you will need to reconfigure the
/// channel for the next transfer.
///
/// # Panics
///
/// Panics if either buffer is empty, or if the copy spans more than 1024
/// elements.
pub fn memcpy<'a, E: Element>(
    source: &'a [E],
    destination: &'a mut [E],
    channel: &'a mut Channel,
) -> Memcpy<'a> {
    let items = source.len().min(destination.len());

    channel.disable();
    channel.select_primary();
    // Hardware triggers stay masked; only the software request below may
    // start this channel.
    channel.mask_request();

    channel.set_source_buffer(&source[..items]);
    channel.set_destination_buffer(&mut destination[..items]);
    channel.set_arbitration(Arbitration::covering(items));
    channel.set_transfer(TransferMode::Auto, items);

    Memcpy {
        // Safety: transfer is correctly described
        transfer: unsafe { Transfer::new(channel) },
        channel,
    }
}

impl Future for Memcpy<'_> {
    type Output = Result<(), Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Safety: data not moved
        let transfer = unsafe { self.as_mut().map_unchecked_mut(|this| &mut this.transfer) };
        let poll = transfer.poll(cx);
        if poll.is_pending() && self.channel.is_enabled() {
            // Auto mode runs the whole transfer off one request.
            // Re-requesting a running channel has no effect.
            // Safety: memory properly described
            unsafe { self.channel.request() };
        }
        poll
    }
}

// Drop handled by Transfer impl

#[cfg(test)]
mod tests {
    use crate::table::{Control, ControlTable, TransferMode};
    use crate::testing::{counting_waker, leak, poke};
    use crate::{Element, Udma};
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll};

    #[test]
    fn memcpy_arms_requests_and_resolves() {
        let registers: &'static crate::ral::udma::RegisterBlock =
            leak(unsafe { core::mem::zeroed() });
        let table = leak(ControlTable::new());
        let udma = unsafe { Udma::new(registers as *const _ as *const (), table) };
        udma.enable();
        let mut channel = unsafe { udma.channel(10) };

        let source = [1u32, 2, 3, 4];
        let mut destination = [0u32; 4];

        let (waker, _) = counting_waker();
        let mut cx = Context::from_waker(&waker);
        let mut copy = pin!(super::memcpy(&source, &mut destination, &mut channel));

        let entry = table.primary(10);
        assert_eq!(entry.control().transfer_mode(), TransferMode::Auto);
        assert_eq!(entry.control().transfer_items(), 4);
        // Both sides increment in a memory-to-memory transfer.
        assert_eq!(entry.control().source_increment_raw(), u32::DATA_TRANSFER_ID);
        assert_eq!(entry.control().destination_increment_raw(), u32::DATA_TRANSFER_ID);
        assert_eq!(entry.control().arbitration_raw(), 2);
        // Hardware triggers are masked on this channel.
        assert_eq!(registers.REQMASKSET.read(), 1 << 10);

        assert!(copy.as_mut().poll(&mut cx).is_pending());
        assert_eq!(registers.ENASET.read(), 1 << 10);
        assert_eq!(crate::testing::peek(&registers.SWREQ), 1 << 10);

        // The engine copies and stops the entry.
        entry.set_control(Control::stop());
        poke(&registers.ENASET, 0);
        assert!(matches!(copy.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
    }
}
