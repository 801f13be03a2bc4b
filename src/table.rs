//! The μDMA channel control table
//!
//! The μDMA engine keeps per-channel transfer state in normal RAM, not in a
//! register file. Software allocates a [`ControlTable`], publishes its base
//! address to the engine once, and describes each transfer by writing a
//! [`ChannelControl`] entry. The engine reads the entry when the channel is
//! armed, and writes its working state back as the transfer progresses: the
//! count field decrements, and the mode field returns to *stop* when the
//! transfer completes.
//!
//! # End-pointer addressing
//!
//! The entry's address words hold *end* pointers, not start pointers. For an
//! incrementing side spanning `n` elements, software writes the address of
//! the **last** element; the engine computes each element's address as
//! `end - (remaining - 1) * size`, so memory is still consumed from the low
//! end upward. A side bound to a fixed peripheral register uses the
//! no-increment encoding and the register address itself. Supplying the
//! start address of a buffer here silently corrupts the transfer.

use crate::element::Element;
use vcell::VolatileCell;

mod fields {
    pub const XFERMODE_SHIFT: u32 = 0;
    pub const XFERMODE_MASK: u32 = 0x7;
    pub const XFERSIZE_SHIFT: u32 = 4;
    pub const XFERSIZE_MASK: u32 = 0x3FF << XFERSIZE_SHIFT;
    pub const ARBSIZE_SHIFT: u32 = 14;
    pub const ARBSIZE_MASK: u32 = 0xF << ARBSIZE_SHIFT;
    pub const SRCSIZE_SHIFT: u32 = 24;
    pub const SRCSIZE_MASK: u32 = 0x3 << SRCSIZE_SHIFT;
    pub const SRCINC_SHIFT: u32 = 26;
    pub const SRCINC_MASK: u32 = 0x3 << SRCINC_SHIFT;
    pub const DSTSIZE_SHIFT: u32 = 28;
    pub const DSTSIZE_MASK: u32 = 0x3 << DSTSIZE_SHIFT;
    pub const DSTINC_SHIFT: u32 = 30;
    pub const DSTINC_MASK: u32 = 0x3 << DSTINC_SHIFT;
    /// Increment encoding for a fixed address.
    pub const NO_INCREMENT: u32 = 3;
}

/// The most items one control word can describe.
///
/// The count field holds the item count minus one in ten bits.
pub const MAX_TRANSFER_ITEMS: usize = 1024;

/// A channel's transfer mode
///
/// Decides how the channel behaves once armed. The engine writes the field
/// back to [`Stop`](TransferMode::Stop) when a transfer completes; neither
/// basic nor auto mode re-arms on its own. The scatter-gather modes are not
/// supported by this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TransferMode {
    /// The entry is invalid; an armed channel reading it halts immediately.
    Stop = 0,
    /// One transfer per request, paced by the requesting peripheral.
    Basic = 1,
    /// A single request runs the whole transfer to completion. Use for
    /// software-requested, memory-to-memory work only: auto mode ignores
    /// further peripheral pacing after the first request.
    Auto = 2,
    /// Alternate between the primary and alternate entries.
    PingPong = 3,
}

impl TransferMode {
    fn from_raw(raw: u32) -> Self {
        match raw & fields::XFERMODE_MASK {
            1 => TransferMode::Basic,
            2 => TransferMode::Auto,
            3 => TransferMode::PingPong,
            // Scatter-gather encodings decode as stop; the driver never
            // writes them, and a completed transfer reads back as 0.
            _ => TransferMode::Stop,
        }
    }
}

/// Arbitration size: items moved before the engine re-arbitrates
///
/// The raw encoding is the base-two exponent of the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Arbitration {
    One = 0,
    Two = 1,
    Four = 2,
    Eight = 3,
    Sixteen = 4,
    ThirtyTwo = 5,
    SixtyFour = 6,
    OneHundredTwentyEight = 7,
    TwoHundredFiftySix = 8,
    FiveHundredTwelve = 9,
    OneThousandTwentyFour = 10,
}

impl Arbitration {
    /// The largest arbitration size not exceeding `items`.
    ///
    /// Suited to memory-to-memory transfers, where nothing paces the
    /// engine and the burst may cover the whole span.
    pub(crate) fn covering(items: usize) -> Self {
        let exponent = (usize::BITS - 1 - items.leading_zeros()).min(10);
        match exponent {
            0 => Arbitration::One,
            1 => Arbitration::Two,
            2 => Arbitration::Four,
            3 => Arbitration::Eight,
            4 => Arbitration::Sixteen,
            5 => Arbitration::ThirtyTwo,
            6 => Arbitration::SixtyFour,
            7 => Arbitration::OneHundredTwentyEight,
            8 => Arbitration::TwoHundredFiftySix,
            9 => Arbitration::FiveHundredTwelve,
            _ => Arbitration::OneThousandTwentyFour,
        }
    }
}

/// A channel's packed control word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Control(u32);

impl Control {
    /// A stop-mode word; the entry is inert until rewritten.
    pub(crate) const fn stop() -> Self {
        Control(0)
    }

    pub(crate) const fn raw(self) -> u32 {
        self.0
    }

    fn set_field(&mut self, mask: u32, shift: u32, value: u32) {
        self.0 = (self.0 & !mask) | ((value << shift) & mask);
    }

    pub(crate) fn set_source<E: Element>(&mut self, increment: bool) {
        self.set_field(fields::SRCSIZE_MASK, fields::SRCSIZE_SHIFT, E::DATA_TRANSFER_ID);
        let increment = if increment {
            E::DATA_TRANSFER_ID
        } else {
            fields::NO_INCREMENT
        };
        self.set_field(fields::SRCINC_MASK, fields::SRCINC_SHIFT, increment);
    }

    pub(crate) fn set_destination<E: Element>(&mut self, increment: bool) {
        self.set_field(fields::DSTSIZE_MASK, fields::DSTSIZE_SHIFT, E::DATA_TRANSFER_ID);
        let increment = if increment {
            E::DATA_TRANSFER_ID
        } else {
            fields::NO_INCREMENT
        };
        self.set_field(fields::DSTINC_MASK, fields::DSTINC_SHIFT, increment);
    }

    pub(crate) fn set_arbitration(&mut self, arbitration: Arbitration) {
        self.set_field(fields::ARBSIZE_MASK, fields::ARBSIZE_SHIFT, arbitration as u32);
    }

    /// Write the mode and the N-1 encoded item count.
    pub(crate) fn set_transfer(&mut self, mode: TransferMode, items: usize) {
        self.set_field(fields::XFERSIZE_MASK, fields::XFERSIZE_SHIFT, items as u32 - 1);
        self.set_field(fields::XFERMODE_MASK, fields::XFERMODE_SHIFT, mode as u32);
    }

    pub(crate) fn transfer_mode(self) -> TransferMode {
        TransferMode::from_raw(self.0)
    }

    /// Decoded item count: the N-1 field plus one.
    pub(crate) fn transfer_items(self) -> usize {
        (((self.0 & fields::XFERSIZE_MASK) >> fields::XFERSIZE_SHIFT) + 1) as usize
    }

    pub(crate) fn arbitration_raw(self) -> u32 {
        (self.0 & fields::ARBSIZE_MASK) >> fields::ARBSIZE_SHIFT
    }

    pub(crate) fn source_increment_raw(self) -> u32 {
        (self.0 & fields::SRCINC_MASK) >> fields::SRCINC_SHIFT
    }

    pub(crate) fn destination_increment_raw(self) -> u32 {
        (self.0 & fields::DSTINC_MASK) >> fields::DSTINC_SHIFT
    }
}

/// One channel's control entry: two end pointers, the packed control word,
/// and a word the hardware defines but does not use.
///
/// All access is volatile. The engine reads the entry when its channel is
/// armed and writes working state back while the transfer runs.
#[repr(C, align(16))]
pub struct ChannelControl {
    source_end: VolatileCell<u32>,
    destination_end: VolatileCell<u32>,
    control: VolatileCell<u32>,
    _reserved: VolatileCell<u32>,
}

// Safety: shared with the bus master under the arm/complete protocol; the
// processor side is a single hardware thread.
unsafe impl Sync for ChannelControl {}

impl ChannelControl {
    const fn new() -> Self {
        ChannelControl {
            source_end: VolatileCell::new(0),
            destination_end: VolatileCell::new(0),
            control: VolatileCell::new(0),
            _reserved: VolatileCell::new(0),
        }
    }

    pub(crate) fn set_source_end(&self, address: *const ()) {
        self.source_end.set(address as usize as u32);
    }

    pub(crate) fn source_end(&self) -> u32 {
        self.source_end.get()
    }

    pub(crate) fn set_destination_end(&self, address: *const ()) {
        self.destination_end.set(address as usize as u32);
    }

    pub(crate) fn destination_end(&self) -> u32 {
        self.destination_end.get()
    }

    pub(crate) fn control(&self) -> Control {
        Control(self.control.get())
    }

    pub(crate) fn set_control(&self, control: Control) {
        self.control.set(control.raw());
    }

    pub(crate) fn update_control(&self, update: impl FnOnce(&mut Control)) {
        let mut control = self.control();
        update(&mut control);
        self.set_control(control);
    }

    /// Items the engine has not yet moved.
    ///
    /// The engine decrements the count field as it works and returns the
    /// mode to stop at completion, so a finished entry reports zero.
    pub(crate) fn remaining(&self) -> usize {
        let control = self.control();
        match control.transfer_mode() {
            TransferMode::Stop => 0,
            _ => control.transfer_items(),
        }
    }
}

/// The channel control table
///
/// Statically allocate one table, hand it to [`Udma::new`](crate::Udma::new),
/// and never move it: the engine holds the base address for the life of the
/// process. The table carries a primary and an alternate entry per channel
/// at hardware-dictated offsets; this driver only schedules primary entries,
/// but the alternate half must exist because the engine indexes it at a
/// fixed offset from the base.
#[repr(C, align(1024))]
pub struct ControlTable {
    primary: [ChannelControl; crate::CHANNELS],
    alternate: [ChannelControl; crate::CHANNELS],
}

const _: () = assert!(core::mem::size_of::<ChannelControl>() == 16);
const _: () = assert!(core::mem::size_of::<ControlTable>() == 1024);
const _: () = assert!(core::mem::align_of::<ControlTable>() == 1024);
const _: () = assert!(core::mem::offset_of!(ControlTable, alternate) == 512);

impl ControlTable {
    /// Creates a zeroed table; every entry is in stop mode.
    pub const fn new() -> Self {
        const INIT: ChannelControl = ChannelControl::new();
        ControlTable {
            primary: [INIT; crate::CHANNELS],
            alternate: [INIT; crate::CHANNELS],
        }
    }

    pub(crate) fn primary(&self, channel: usize) -> &ChannelControl {
        &self.primary[channel]
    }

    pub(crate) fn base_address(&self) -> u32 {
        self as *const Self as usize as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_offsets_follow_channel_number() {
        let table = ControlTable::new();
        let base = &table as *const _ as usize;
        assert_eq!(table.primary(0) as *const _ as usize - base, 0);
        assert_eq!(table.primary(1) as *const _ as usize - base, 16);
        assert_eq!(table.primary(31) as *const _ as usize - base, 496);
        assert_eq!(table.base_address() as usize, base & 0xFFFF_FFFF);
    }

    #[test]
    fn receive_shaped_control_word() {
        // Fixed byte register -> incrementing byte buffer, 32 items,
        // arbitrate every 4, auto mode.
        let mut control = Control::stop();
        control.set_source::<u8>(false);
        control.set_destination::<u8>(true);
        control.set_arbitration(Arbitration::Four);
        control.set_transfer(TransferMode::Auto, 32);
        assert_eq!(control.raw(), 0x0C00_81F2);
    }

    #[test]
    fn transmit_shaped_control_word() {
        // Incrementing byte buffer -> fixed byte register.
        let mut control = Control::stop();
        control.set_source::<u8>(true);
        control.set_destination::<u8>(false);
        control.set_arbitration(Arbitration::Four);
        control.set_transfer(TransferMode::Auto, 32);
        assert_eq!(control.raw(), 0xC000_81F2);
    }

    #[test]
    fn control_word_round_trips() {
        let mut control = Control::stop();
        control.set_source::<u16>(true);
        control.set_destination::<u16>(false);
        control.set_arbitration(Arbitration::Eight);
        control.set_transfer(TransferMode::Basic, 1024);

        assert_eq!(control.transfer_mode(), TransferMode::Basic);
        assert_eq!(control.transfer_items(), 1024);
        assert_eq!(control.arbitration_raw(), 3);
        assert_eq!(control.source_increment_raw(), u16::DATA_TRANSFER_ID);
        assert_eq!(control.destination_increment_raw(), 3);
    }

    #[test]
    fn completed_entry_reports_nothing_remaining() {
        let entry = ChannelControl::new();
        entry.update_control(|control| {
            control.set_transfer(TransferMode::Basic, 32);
        });
        assert_eq!(entry.remaining(), 32);

        // The engine writes the mode back to stop when it finishes.
        entry.set_control(Control::stop());
        assert_eq!(entry.remaining(), 0);
    }

    #[test]
    fn arbitration_covering_rounds_down() {
        assert_eq!(Arbitration::covering(1), Arbitration::One);
        assert_eq!(Arbitration::covering(4), Arbitration::Four);
        assert_eq!(Arbitration::covering(31), Arbitration::Sixteen);
        assert_eq!(Arbitration::covering(1024), Arbitration::OneThousandTwentyFour);
        assert_eq!(Arbitration::covering(5000), Arbitration::OneThousandTwentyFour);
    }
}
