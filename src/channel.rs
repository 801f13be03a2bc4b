//! μDMA channel

use crate::{
    element::Element,
    error::Error,
    ral::{udma, Static},
    table::{Arbitration, ChannelControl, TransferMode, MAX_TRANSFER_ITEMS},
};

/// A μDMA channel
///
/// Allocate channels through [`Udma::channel`](crate::Udma::channel). A
/// channel pairs the engine's per-channel register bits with the channel's
/// primary control-table entry.
///
/// You must always describe the transfer — both addresses, the arbitration
/// size, and the mode and count — before enabling the channel.
pub struct Channel {
    /// Our channel number, expected to be between 0 to (CHANNELS - 1)
    index: usize,
    /// Reference to the μDMA registers
    registers: Static<udma::RegisterBlock>,
    /// This channel's primary control-table entry
    control: &'static ChannelControl,
}

impl Channel {
    pub(crate) unsafe fn new(
        index: usize,
        registers: Static<udma::RegisterBlock>,
        control: &'static ChannelControl,
    ) -> Self {
        Channel {
            index,
            registers,
            control,
        }
    }

    /// Returns the μDMA channel number
    ///
    /// Channels are unique and numbered within the half-open range
    /// `[0, CHANNELS)`.
    pub fn channel(&self) -> usize {
        self.index
    }

    fn bit(&self) -> u32 {
        1 << self.index
    }

    /// Use the channel's primary control-table entry
    ///
    /// This driver schedules primary entries only; call this during channel
    /// setup so a previous ping-pong configuration cannot leave the
    /// alternate entry selected.
    pub fn select_primary(&self) {
        // Immutable write OK. Write-1 clears the selection bit; zeros have
        // no effect on other channels.
        self.registers.ALTCLR.write(self.bit());
    }

    /// Restrict the channel to burst requests (`true`), or respond to both
    /// single and burst requests (`false`)
    pub fn set_use_burst(&mut self, burst: bool) {
        if burst {
            self.registers.USEBURSTSET.write(self.bit());
        } else {
            self.registers.USEBURSTCLR.write(self.bit());
        }
    }

    /// Permit hardware-triggered requests on this channel
    pub fn unmask_request(&self) {
        // Immutable write OK. No other methods modify REQMASKSET/CLR.
        self.registers.REQMASKCLR.write(self.bit());
    }

    /// Ignore hardware-triggered requests on this channel
    ///
    /// Software requests still work; mask the channel for
    /// memory-to-memory transfers.
    pub fn mask_request(&self) {
        self.registers.REQMASKSET.write(self.bit());
    }

    /// Assign the channel high (`true`) or default (`false`) priority
    pub fn set_high_priority(&mut self, high: bool) {
        if high {
            self.registers.PRIOSET.write(self.bit());
        } else {
            self.registers.PRIOCLR.write(self.bit());
        }
    }

    /// Bind the channel to a peripheral request signal
    ///
    /// `select` is the 4-bit encoding from the device's channel assignment
    /// table. A select that names no peripheral, or the wrong one, routes
    /// no requests: the channel arms and then nothing ever completes. The
    /// hardware offers software no way to detect that.
    ///
    /// # Panics
    ///
    /// Panics if `select` doesn't fit the 4-bit channel map field.
    pub fn map_request(&mut self, select: u32) {
        assert!(
            select < 16,
            "uDMA request select {} exceeds the 4-bit channel map field",
            select
        );
        let register = &self.registers.CHMAP[self.index / 8];
        let shift = (self.index % 8) as u32 * 4;
        register.write((register.read() & !(0xF << shift)) | (select << shift));
    }

    /// Arm the channel: the next request starts the transfer
    ///
    /// # Safety
    ///
    /// This could initiate a DMA transaction that uses an invalid source or
    /// destination. Caller must ensure that the channel's control entry
    /// describes a valid transfer for the lifetime of that transfer.
    pub unsafe fn enable(&self) {
        // Immutable write OK. Write-1 sets this channel's bit only.
        self.registers.ENASET.write(self.bit());
    }

    /// Disable the channel, preventing any DMA transfers
    pub fn disable(&self) {
        // Immutable write OK. No other methods directly modify ENACLR.
        self.registers.ENACLR.write(self.bit());
    }

    /// Returns `true` if this channel is armed
    ///
    /// The engine clears the enable bit itself when a basic or auto
    /// transfer completes.
    pub fn is_enabled(&self) -> bool {
        self.registers.ENASET.read() & self.bit() != 0
    }

    /// Issue a software request for this channel
    ///
    /// Peripheral-paced transfers rely on the hardware request signal
    /// instead; use this for memory-to-memory transfers.
    ///
    /// # Safety
    ///
    /// This could start a transfer through an invalid source or
    /// destination. Caller must ensure the control entry is valid.
    pub unsafe fn request(&self) {
        self.registers.SWREQ.write(self.bit());
    }

    /// Returns `true` if the channel is waiting on a request signal
    pub fn is_waiting_on_request(&self) -> bool {
        self.registers.WAITSTAT.read() & self.bit() != 0
    }

    /// Indicates if the transfer described by the control entry has run to
    /// completion
    ///
    /// The engine writes the entry's mode field back to stop when it
    /// finishes, so this reads the shared table, not a register.
    pub fn is_complete(&self) -> bool {
        self.control.remaining() == 0
    }

    /// Items the engine has not yet moved for the current transfer
    pub fn remaining(&self) -> usize {
        self.control.remaining()
    }

    /// Returns `true` if the engine recorded a bus error
    ///
    /// The flag is global to the engine, not specific to this channel.
    pub fn is_bus_error(&self) -> bool {
        self.registers.ERRCLR.read() & 0x1 != 0
    }

    /// Clears the bus-error flag
    pub fn clear_bus_error(&self) {
        // Immutable write OK. Write-1-to-clear, not written elsewhere.
        self.registers.ERRCLR.write(0x1);
    }

    /// Returns a snapshot of the engine's **global** status register
    ///
    /// It reflects the whole controller, and may not be related to this
    /// channel.
    pub fn error_status(&self) -> Error {
        Error::new(self.registers.STAT.read())
    }

    /// Bind the source to a fixed peripheral register
    ///
    /// The register address is written as-is with the no-increment
    /// encoding; the engine reads the same address for every element.
    pub fn set_source_hardware<E: Element>(&mut self, source: *const E) {
        self.control.set_source_end(source as *const ());
        self.control.update_control(|control| control.set_source::<E>(false));
    }

    /// Bind the source to an incrementing memory buffer
    ///
    /// Writes the address of the buffer's **last** element, per the
    /// engine's end-pointer convention; the transfer still consumes the
    /// buffer from its first element upward.
    ///
    /// # Panics
    ///
    /// Panics if `source` is empty; the hardware cannot express a
    /// zero-item span.
    pub fn set_source_buffer<E: Element>(&mut self, source: &[E]) {
        assert!(!source.is_empty(), "uDMA source buffer is empty");
        let last: *const E = &source[source.len() - 1];
        self.control.set_source_end(last as *const ());
        self.control.update_control(|control| control.set_source::<E>(true));
    }

    /// Bind the destination to a fixed peripheral register
    pub fn set_destination_hardware<E: Element>(&mut self, destination: *const E) {
        self.control.set_destination_end(destination as *const ());
        self.control
            .update_control(|control| control.set_destination::<E>(false));
    }

    /// Bind the destination to an incrementing memory buffer
    ///
    /// Writes the address of the buffer's **last** element, per the
    /// engine's end-pointer convention.
    ///
    /// # Panics
    ///
    /// Panics if `destination` is empty.
    pub fn set_destination_buffer<E: Element>(&mut self, destination: &mut [E]) {
        assert!(!destination.is_empty(), "uDMA destination buffer is empty");
        let last: *const E = &destination[destination.len() - 1];
        self.control.set_destination_end(last as *const ());
        self.control
            .update_control(|control| control.set_destination::<E>(true));
    }

    /// Set how many items the engine moves before re-arbitrating the bus
    pub fn set_arbitration(&mut self, arbitration: Arbitration) {
        self.control
            .update_control(|control| control.set_arbitration(arbitration));
    }

    /// Set the transfer mode and item count
    ///
    /// Writing any mode other than stop makes the entry live; do this
    /// last, after the addresses and arbitration size.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= items <= 1024`, the range one control entry can
    /// describe.
    pub fn set_transfer(&mut self, mode: TransferMode, items: usize) {
        assert!(
            (1..=MAX_TRANSFER_ITEMS).contains(&items),
            "uDMA transfer of {} items exceeds one control entry",
            items
        );
        self.control
            .update_control(|control| control.set_transfer(mode, items));
    }

    #[cfg(test)]
    pub(crate) fn control_entry(&self) -> &'static ChannelControl {
        self.control
    }
}

// It's OK to send a channel across an execution context.
// They can't be cloned or copied, so there's no chance of
// them being (mutably) shared.
unsafe impl Send for Channel {}

#[cfg(test)]
mod tests {
    use crate::table::{Arbitration, ControlTable, TransferMode};
    use crate::testing::{leak, peek};
    use crate::Udma;

    fn fixture() -> (&'static crate::ral::udma::RegisterBlock, Udma) {
        let registers: &'static crate::ral::udma::RegisterBlock =
            leak(unsafe { core::mem::zeroed() });
        let table = leak(ControlTable::new());
        let udma = unsafe { Udma::new(registers as *const _ as *const (), table) };
        (registers, udma)
    }

    #[test]
    fn channel_map_binds_request_select_nibbles() {
        let (registers, udma) = fixture();
        let mut zero = unsafe { udma.channel(0) };
        let mut one = unsafe { udma.channel(1) };
        zero.map_request(1);
        one.map_request(1);
        assert_eq!(registers.CHMAP[0].read(), 0x11);

        let mut eleven = unsafe { udma.channel(11) };
        eleven.map_request(0xA);
        assert_eq!(registers.CHMAP[1].read(), 0xA000);
    }

    #[test]
    fn enable_disable_touch_only_the_channel_bit() {
        let (registers, udma) = fixture();
        let chan = unsafe { udma.channel(5) };
        unsafe { chan.enable() };
        assert_eq!(registers.ENASET.read(), 1 << 5);
        assert!(chan.is_enabled());

        chan.disable();
        assert_eq!(peek(&registers.ENACLR), 1 << 5);
    }

    #[test]
    fn buffer_binding_uses_the_end_pointer() {
        let (_, udma) = fixture();
        let mut chan = unsafe { udma.channel(2) };
        let buffer = [0u8; 32];
        chan.set_source_buffer(&buffer);
        assert_eq!(
            chan.control_entry().source_end() as usize,
            &buffer[31] as *const u8 as usize & 0xFFFF_FFFF
        );
    }

    #[test]
    fn fixed_side_has_the_no_increment_encoding() {
        let (_, udma) = fixture();

        // Receive shape: register -> memory.
        let mut rx = unsafe { udma.channel(3) };
        let register = 0x4000_E000 as *const u8;
        let mut buffer = [0u8; 8];
        rx.set_source_hardware(register);
        rx.set_destination_buffer(&mut buffer);
        rx.set_arbitration(Arbitration::Four);
        rx.set_transfer(TransferMode::Basic, buffer.len());
        let control = rx.control_entry().control();
        assert_eq!(control.source_increment_raw(), 3);
        assert_eq!(control.destination_increment_raw(), 0);
        assert_eq!(rx.control_entry().source_end(), 0x4000_E000);

        // Transmit shape: memory -> register.
        let mut tx = unsafe { udma.channel(12) };
        tx.set_source_buffer(&buffer);
        tx.set_destination_hardware(register);
        tx.set_transfer(TransferMode::Basic, buffer.len());
        let control = tx.control_entry().control();
        assert_eq!(control.source_increment_raw(), 0);
        assert_eq!(control.destination_increment_raw(), 3);
    }

    #[test]
    fn engine_enable_publishes_the_table() {
        let (registers, udma) = fixture();
        udma.enable();
        assert_eq!(peek(&registers.CFG), 0x1);
        assert_ne!(registers.CTLBASE.read(), 0);

        // Hardware reflects the master enable in the status register.
        crate::testing::poke(&registers.STAT, 0x1);
        assert!(udma.is_enabled());
    }

    #[test]
    fn priority_bits_track_the_channel() {
        let (registers, udma) = fixture();
        let mut chan = unsafe { udma.channel(4) };
        chan.set_high_priority(true);
        assert_eq!(registers.PRIOSET.read(), 1 << 4);
        chan.set_high_priority(false);
        assert_eq!(peek(&registers.PRIOCLR), 1 << 4);
    }

    #[test]
    #[should_panic(expected = "request select")]
    fn oversized_request_select_panics() {
        let (_, udma) = fixture();
        let mut chan = unsafe { udma.channel(13) };
        chan.map_request(16);
    }
}
