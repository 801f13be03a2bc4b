//! DMA support for hardware peripherals.
//!
//! A DMA-capable peripheral implements some or all of the traits in this
//! module; [`uart::Rx`](crate::uart::Rx) and [`uart::Tx`](crate::uart::Tx)
//! implement them in this crate.
//!
//! Each future documents when it resolves. To wake the executor, route the
//! peripheral's interrupt handler to its completion dispatcher (for the
//! UART, [`on_interrupt`](crate::uart::on_interrupt)). Otherwise, you can
//! poll the future in a loop.

use crate::{
    channel::Channel,
    element::Element,
    interrupt::Transfer,
    table::{Arbitration, TransferMode},
    Error,
};

use core::{
    future::Future,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

/// A peripheral that can be the source of DMA data
///
/// By 'source,' we mean that it provides data for a DMA transfer.
/// A source would be a hardware device writing data into memory,
/// like a UART receiver.
///
/// # Safety
///
/// `Source` should only be implemented on peripherals that are
/// DMA capable. This trait should be implemented by driver authors
/// who are exposing DMA capable peripherals.
pub unsafe trait Source<E: Element> {
    /// The channel-map select that routes this peripheral's receive
    /// request
    ///
    /// See the device's μDMA channel assignment table. The select is only
    /// meaningful on a channel the table pairs with this peripheral; a
    /// mismatch routes no requests and the transfer never completes.
    fn request_select(&self) -> u32;
    /// Returns a pointer to the register from which the DMA channel
    /// reads data
    ///
    /// This is the register that software reads to acquire data from
    /// a device. The type of the pointer describes the type of reads
    /// the DMA channel performs when transferring data.
    ///
    /// This memory is assumed to be static. Repeated `source_address`
    /// calls should always return the same address.
    fn source_address(&self) -> *const E;
    /// Perform any actions necessary to enable DMA transfers
    ///
    /// Callers use this method to put the peripheral in a state where
    /// it can supply the DMA channel with data.
    fn enable_source(&mut self);
    /// Perform any actions necessary to disable or cancel DMA transfers
    ///
    /// This may include undoing the actions in `enable_source`.
    fn disable_source(&mut self);
}

/// A peripheral that can be the destination for DMA data
///
/// By 'destination,' we mean that it receives data from a DMA transfer.
/// A destination would be a peripheral that could send data out of
/// processor memory, like a UART transmitter.
///
/// # Safety
///
/// `Destination` should only be implemented on peripherals that are
/// DMA capable. This trait should be implemented by driver authors
/// who are exposing DMA capable peripherals.
pub unsafe trait Destination<E: Element> {
    /// The channel-map select that routes this peripheral's transmit
    /// request
    fn request_select(&self) -> u32;
    /// Returns a pointer to the register into which the DMA channel
    /// writes data
    ///
    /// This is the register that software writes to when sending data to a
    /// device. The type of the pointer describes the type of writes the
    /// DMA channel performs when transferring data.
    fn destination_address(&self) -> *const E;
    /// Perform any actions necessary to enable DMA transfers
    ///
    /// Callers use this method to put the peripheral into a state where
    /// it can accept transfers from a DMA channel.
    fn enable_destination(&mut self);
    /// Perform any actions necessary to disable or cancel DMA transfers
    ///
    /// This may include undoing the actions in `enable_destination`.
    fn disable_destination(&mut self);
}

/// A DMA transfer that receives data from hardware
///
/// The future resolves when the peripheral has provided all
/// expected data. Use [`read()`](crate::peripheral::read) to construct
/// this future.
pub struct Read<'a, S, E>
where
    S: Source<E>,
    E: Element,
{
    channel: &'a Channel,
    source: &'a mut S,
    transfer: Transfer<'a>,
    _elem: PhantomData<&'a mut E>,
}

impl<S, E> Future for Read<'_, S, E>
where
    S: Source<E>,
    E: Element,
{
    type Output = Result<(), Error>;
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Safety: no movement from transfer future...
        unsafe { self.map_unchecked_mut(|this| &mut this.transfer) }.poll(cx)
    }
}

impl<S, E> Drop for Read<'_, S, E>
where
    S: Source<E>,
    E: Element,
{
    fn drop(&mut self) {
        self.source.disable_source();
        while self.channel.is_waiting_on_request() {}
        // Drop `transfer` to finish cancellation...
    }
}

fn prepare_read<S, E>(channel: &mut Channel, source: &mut S, buffer: &mut [E])
where
    S: Source<E>,
    E: Element,
{
    channel.disable();

    channel.select_primary();
    channel.set_use_burst(false);
    channel.unmask_request();
    channel.map_request(source.request_select());

    // The entry goes live on the mode write in set_transfer, strictly
    // before the Transfer future arms the channel.
    channel.set_source_hardware(source.source_address());
    channel.set_destination_buffer(buffer);
    channel.set_arbitration(Arbitration::Four);
    channel.set_transfer(TransferMode::Basic, buffer.len());

    source.enable_source();
}

/// Use a DMA channel to receive a `buffer` of elements from the source
/// peripheral.
///
/// The channel arms on the future's first poll and pairs with the
/// peripheral's hardware request; one transfer moves `buffer.len()`
/// elements, then the engine stops the channel. Receiving again means
/// calling `read` again: nothing re-arms on its own.
///
/// Consider a peripheral interrupt handler that calls the completion
/// dispatcher to wake the executor when the transfer completes. Otherwise,
/// poll the future.
///
/// # Example
///
/// Receive 32 bytes from UART2 on μDMA channel 0.
///
/// ```no_run
/// use tm4c_udma::{peripheral, table::ControlTable, uart, Udma};
///
/// static CONTROL_TABLE: ControlTable = ControlTable::new();
/// // Safety: the address is the μDMA controller on every TM4C129x part.
/// static UDMA: Udma = unsafe { Udma::new(tm4c_udma::UDMA, &CONTROL_TABLE) };
///
/// # fn demo() -> tm4c_udma::Result<()> {
/// // Safety: sole owner of UART2.
/// let uart2 = unsafe { uart::Uart::new(uart::UART2, &uart::Config::default(), 16_000_000) };
/// let (_tx, mut rx) = uart2.split();
///
/// UDMA.enable();
/// // Safety: channel 0 is allocated exactly once.
/// let mut channel = unsafe { UDMA.channel(0) };
///
/// let mut buffer = [0u8; 32];
/// let mut read = core::pin::pin!(peripheral::read(&mut channel, &mut rx, &mut buffer));
/// tm4c_udma::block(read.as_mut())?;
/// # Ok(()) }
/// ```
///
/// # Panics
///
/// Panics if `buffer` is empty, or holds more than 1024 elements.
pub fn read<'a, S, E>(
    channel: &'a mut Channel,
    source: &'a mut S,
    buffer: &'a mut [E],
) -> Read<'a, S, E>
where
    S: Source<E>,
    E: Element,
{
    prepare_read(channel, source, buffer);
    Read {
        channel,
        // Safety: transfer is correctly described
        transfer: unsafe { Transfer::new(channel) },
        source,
        _elem: PhantomData,
    }
}

/// A DMA transfer that sends data to hardware
///
/// The future resolves when the device has accepted all provided data.
/// Use [`write()`](crate::peripheral::write) to construct this future.
pub struct Write<'a, D, E>
where
    D: Destination<E>,
    E: Element,
{
    channel: &'a Channel,
    destination: &'a mut D,
    transfer: Transfer<'a>,
    _elem: PhantomData<&'a E>,
}

impl<D, E> Future for Write<'_, D, E>
where
    D: Destination<E>,
    E: Element,
{
    type Output = Result<(), Error>;
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Safety: no movement from transfer future...
        unsafe { self.map_unchecked_mut(|this| &mut this.transfer) }.poll(cx)
    }
}

impl<D, E> Drop for Write<'_, D, E>
where
    D: Destination<E>,
    E: Element,
{
    fn drop(&mut self) {
        self.destination.disable_destination();
        while self.channel.is_waiting_on_request() {}
        // Drop `transfer` to finish cancellation...
    }
}

fn prepare_write<D, E>(channel: &mut Channel, buffer: &[E], destination: &mut D)
where
    D: Destination<E>,
    E: Element,
{
    channel.disable();

    channel.select_primary();
    channel.set_use_burst(false);
    channel.unmask_request();
    channel.map_request(destination.request_select());

    channel.set_source_buffer(buffer);
    channel.set_destination_hardware(destination.destination_address());
    channel.set_arbitration(Arbitration::Four);
    channel.set_transfer(TransferMode::Basic, buffer.len());

    destination.enable_destination();
}

/// Use a DMA channel to send a `buffer` of data to the destination
/// peripheral.
///
/// The channel arms on the future's first poll; the transfer is one-shot,
/// and sending again requires another `write` call. The buffer must not be
/// mutated between the first poll and the future's resolution — the engine
/// is reading it.
///
/// Consider a peripheral interrupt handler that calls the completion
/// dispatcher to wake the executor when the transfer completes. Otherwise,
/// poll the future.
///
/// # Panics
///
/// Panics if `buffer` is empty, or holds more than 1024 elements.
pub fn write<'a, D, E>(
    channel: &'a mut Channel,
    buffer: &'a [E],
    destination: &'a mut D,
) -> Write<'a, D, E>
where
    D: Destination<E>,
    E: Element,
{
    prepare_write(channel, buffer, destination);
    Write {
        channel,
        destination,
        // Safety: transfer is correctly described
        transfer: unsafe { Transfer::new(channel) },
        _elem: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use crate::table::{Control, ControlTable, TransferMode};
    use crate::testing::{counting_waker, leak, peek, poke};
    use crate::uart::{self, Config, Uart};
    use crate::Udma;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll};

    const DMARX: u32 = 1 << 16;
    const DMATX: u32 = 1 << 17;

    struct Fixture {
        udma_regs: &'static crate::ral::udma::RegisterBlock,
        uart_regs: &'static crate::ral::uart::RegisterBlock,
        table: &'static ControlTable,
        udma: Udma,
        uart: Option<Uart>,
    }

    fn fixture() -> Fixture {
        let udma_regs: &'static crate::ral::udma::RegisterBlock =
            leak(unsafe { core::mem::zeroed() });
        let uart_regs: &'static crate::ral::uart::RegisterBlock =
            leak(unsafe { core::mem::zeroed() });
        let table = leak(ControlTable::new());
        let udma = unsafe { Udma::new(udma_regs as *const _ as *const (), table) };
        // Safety: points at host memory standing in for the peripheral.
        let uart = Some(unsafe { Uart::new(uart_regs, &Config::default(), 16_000_000) });
        Fixture {
            udma_regs,
            uart_regs,
            table,
            udma,
            uart,
        }
    }

    #[test]
    fn receive_populates_before_arming_then_completes_once() {
        let mut f = fixture();
        f.udma.enable();
        // The engine holds the table's base address from here on.
        assert_eq!(f.udma_regs.CTLBASE.read(), f.table.base_address());

        let mut channel = unsafe { f.udma.channel(6) };
        let (_tx, mut rx) = f.uart.take().unwrap().split();

        let mut buffer = [0u8; 33];
        let buffer_ptr = buffer.as_mut_ptr();
        let expected_end = unsafe { buffer_ptr.add(31) } as usize & 0xFFFF_FFFF;

        let (waker, wakes) = counting_waker();
        let mut cx = Context::from_waker(&waker);
        let payload = *b"interrupt driven transfers work.";

        {
            let mut read = pin!(super::read(&mut channel, &mut rx, &mut buffer[..32]));

            // Fully described before the channel is armed.
            let entry = f.table.primary(6);
            assert_eq!(entry.destination_end() as usize, expected_end);
            assert_eq!(
                entry.source_end() as usize,
                &f.uart_regs.DR as *const _ as usize & 0xFFFF_FFFF
            );
            assert_eq!(entry.control().transfer_mode(), TransferMode::Basic);
            assert_eq!(entry.control().transfer_items(), 32);
            assert_eq!(entry.control().source_increment_raw(), 3);
            assert_eq!(entry.control().destination_increment_raw(), 0);
            assert_eq!(f.udma_regs.ENASET.read(), 0);
            // The peripheral's request line came up during preparation.
            assert_eq!(f.uart_regs.DMACTL.read() & 0x1, 0x1);

            assert!(read.as_mut().poll(&mut cx).is_pending());
            assert_eq!(f.udma_regs.ENASET.read(), 1 << 6);

            // The engine moves 32 bytes into the buffer, stops the entry,
            // drops the enable bit, and the UART raises receive-done.
            unsafe { core::ptr::copy_nonoverlapping(payload.as_ptr(), buffer_ptr, 32) };
            entry.set_control(Control::stop());
            poke(&f.udma_regs.ENASET, 0);
            poke(&f.uart_regs.MIS, DMARX);
            unsafe { uart::on_interrupt(f.uart_regs, 6, 31) };

            // Exactly one completion, clearing exactly the receive cause.
            assert_eq!(wakes.count(), 1);
            assert_eq!(peek(&f.uart_regs.ICR), DMARX);

            assert!(matches!(read.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
        }

        // The application-side completion action: sentinel-terminate at
        // the payload length, then consume.
        buffer[32] = 0;
        assert_eq!(&buffer[..32], &payload);
        assert_eq!(buffer[32], 0);
    }

    #[test]
    fn transmit_scenario_is_one_shot() {
        let mut f = fixture();
        f.udma.enable();
        let mut channel = unsafe { f.udma.channel(7) };
        let (mut tx, _rx) = f.uart.take().unwrap().split();

        // The kickoff byte goes straight out the data register,
        // independent of any descriptor.
        tx.write_byte(b'>');
        assert_eq!(f.uart_regs.DR.read(), u32::from(b'>'));

        static MESSAGE: [u8; 33] = *b"Send more message if you can....\0";

        let (waker, wakes) = counting_waker();
        let mut cx = Context::from_waker(&waker);
        let mut write = pin!(super::write(&mut channel, &MESSAGE[..32], &mut tx));

        let entry = f.table.primary(7);
        assert_eq!(
            entry.source_end() as usize,
            &MESSAGE[31] as *const u8 as usize & 0xFFFF_FFFF
        );
        assert_eq!(entry.control().transfer_items(), 32);
        assert_eq!(entry.control().source_increment_raw(), 0);
        assert_eq!(entry.control().destination_increment_raw(), 3);

        assert!(write.as_mut().poll(&mut cx).is_pending());
        assert_eq!(f.udma_regs.ENASET.read(), 1 << 7);

        // 32 bytes drain to the data register; the engine stops the
        // channel and the UART raises transmit-done.
        entry.set_control(Control::stop());
        poke(&f.udma_regs.ENASET, 0);
        poke(&f.uart_regs.MIS, DMATX);
        unsafe { uart::on_interrupt(f.uart_regs, 31, 7) };

        assert_eq!(wakes.count(), 1);
        assert_eq!(peek(&f.uart_regs.ICR), DMATX);

        assert!(matches!(write.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));

        // No re-arm without another write(): the channel stays disabled
        // even as polling continues.
        assert!(matches!(write.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
        assert_eq!(f.udma_regs.ENASET.read(), 0);
    }

    struct TestSource {
        register: &'static u8,
        enabled: bool,
    }

    // Safety: reads host memory standing in for a peripheral register.
    unsafe impl super::Source<u8> for TestSource {
        fn request_select(&self) -> u32 {
            5
        }
        fn source_address(&self) -> *const u8 {
            self.register
        }
        fn enable_source(&mut self) {
            self.enabled = true;
        }
        fn disable_source(&mut self) {
            self.enabled = false;
        }
    }

    #[test]
    fn preparing_a_read_binds_the_channel_map() {
        let mut f = fixture();
        f.udma.enable();
        let mut channel = unsafe { f.udma.channel(15) };
        let mut source = TestSource {
            register: leak(0u8),
            enabled: false,
        };

        let mut buffer = [0u8; 4];
        let read = super::read(&mut channel, &mut source, &mut buffer);

        // Channel 15 lives in the second map register, top nibble.
        assert_eq!(f.udma_regs.CHMAP[1].read(), 5 << 28);
        drop(read);
    }

    #[test]
    fn dropping_a_read_quiesces_the_peripheral() {
        let mut f = fixture();
        f.udma.enable();
        let mut channel = unsafe { f.udma.channel(11) };
        let (_tx, mut rx) = f.uart.take().unwrap().split();

        let mut buffer = [0u8; 8];
        {
            let _read = super::read(&mut channel, &mut rx, &mut buffer);
            assert_eq!(f.uart_regs.DMACTL.read() & 0x1, 0x1);
        }
        // Receive request line off, channel disabled.
        assert_eq!(f.uart_regs.DMACTL.read() & 0x1, 0);
        assert_eq!(peek(&f.udma_regs.ENACLR), 1 << 11);
    }
}
