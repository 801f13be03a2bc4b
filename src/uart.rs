//! UART with μDMA transfer support
//!
//! [`Uart::new`] performs the one-time peripheral setup: line format, baud
//! divisors, the μDMA request lines, and the two DMA completion interrupt
//! causes. [`Uart::split`] hands out [`Tx`] and [`Rx`] halves that plug
//! into the [`peripheral`](crate::peripheral) transfer futures.
//!
//! Both directions' completion events share the UART's single interrupt
//! line; [`on_interrupt`] is the dispatcher that tells them apart.

use crate::peripheral::{Destination, Source};
use crate::ral::{self, Static};
use core::fmt::{self, Debug, Display};

pub use crate::ral::uart::{
    RegisterBlock, UART0, UART1, UART2, UART3, UART4, UART5, UART6, UART7,
};

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WordLength {
    Five = 0,
    Six = 1,
    Seven = 2,
    Eight = 3,
}

/// Number of stop bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Parity bit generation and checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// UART configuration
///
/// `Default` is 115200 baud, eight data bits, one stop bit, no parity,
/// FIFOs enabled, no hardware handshake.
#[derive(Debug, Clone)]
pub struct Config {
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Enable the transmit and receive FIFOs
    pub fifo: bool,
    /// Gate transmission on the clear-to-send input
    pub cts_handshake: bool,
    /// Drive request-to-send from receive FIFO occupancy
    pub rts_handshake: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            baud_rate: 115_200,
            word_length: WordLength::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            fifo: true,
            cts_handshake: false,
            rts_handshake: false,
        }
    }
}

/// Computes the integer and fractional baud-rate divisors
///
/// The divisor is `clock_hz / (16 * baud)`; the fractional part is rounded
/// into six bits, and a fraction that rounds all the way up carries into
/// the integer divisor.
pub const fn dividers(clock_hz: u32, baud: u32) -> (u32, u32) {
    let denominator = 16 * baud;
    let integer = clock_hz / denominator;
    let remainder = clock_hz % denominator;
    let fractional = (64 * remainder + denominator / 2) / denominator;
    (integer + fractional / 64, fractional % 64)
}

/// The channel-map select for this instance's μDMA requests.
///
/// Verified against the channel assignment table for UART0 (channels 8 and
/// 9, select 0) and UART2 (channels 0 and 1, select 1). Other instances
/// report select 0; check the assignment table before pairing them with a
/// channel, and bind with [`Channel::map_request`](crate::Channel::map_request)
/// directly if the table says otherwise.
fn request_select_for(registers: Static<ral::uart::RegisterBlock>) -> u32 {
    if core::ptr::eq(registers.0, UART2) {
        1
    } else {
        0
    }
}

/// A UART peripheral
///
/// `Uart` owns the instance's one-time setup. Split it to get the transfer
/// halves.
pub struct Uart {
    registers: Static<ral::uart::RegisterBlock>,
}

impl Uart {
    /// Configures the UART described by `registers`
    ///
    /// Disables the instance, waits out any in-flight frame, programs the
    /// baud divisors for `clock_hz` and the line format, enables both μDMA
    /// request lines, unmasks the two DMA completion interrupt causes, and
    /// re-enables the transmitter and receiver. Unmasking at the NVIC is
    /// the caller's job.
    ///
    /// # Safety
    ///
    /// `registers` must point at a clocked UART register block, and this
    /// must be the sole handle to that instance.
    pub unsafe fn new(
        registers: *const ral::uart::RegisterBlock,
        config: &Config,
        clock_hz: u32,
    ) -> Self {
        let uart = Uart {
            registers: Static(registers),
        };

        ral::modify_reg!(crate::ral::uart, uart.registers, CTL, UARTEN: 0, TXE: 0, RXE: 0);
        while ral::read_reg!(crate::ral::uart, uart.registers, FR, BUSY == 1) {}

        let (integer, fractional) = dividers(clock_hz, config.baud_rate);
        ral::write_reg!(crate::ral::uart, uart.registers, IBRD, integer);
        ral::write_reg!(crate::ral::uart, uart.registers, FBRD, fractional);

        // The divisors latch on this line-control write; keep it after
        // IBRD and FBRD.
        ral::write_reg!(
            crate::ral::uart,
            uart.registers,
            LCRH,
            WLEN: config.word_length as u32,
            FEN: config.fifo as u32,
            STP2: matches!(config.stop_bits, StopBits::Two) as u32,
            PEN: !matches!(config.parity, Parity::None) as u32,
            EPS: matches!(config.parity, Parity::Even) as u32
        );

        ral::write_reg!(crate::ral::uart, uart.registers, DMACTL, RXDMAE: 1, TXDMAE: 1);
        ral::modify_reg!(crate::ral::uart, uart.registers, IM, DMARXIM: 1, DMATXIM: 1);

        ral::modify_reg!(
            crate::ral::uart,
            uart.registers,
            CTL,
            UARTEN: 1,
            TXE: 1,
            RXE: 1,
            CTSEN: config.cts_handshake as u32,
            RTSEN: config.rts_handshake as u32
        );
        uart
    }

    /// Splits the peripheral into its transmit and receive halves
    pub fn split(self) -> (Tx, Rx) {
        (
            Tx {
                registers: self.registers,
            },
            Rx {
                registers: self.registers,
            },
        )
    }
}

/// The transmit half of a [`Uart`]
pub struct Tx {
    registers: Static<ral::uart::RegisterBlock>,
}

impl Tx {
    /// Write one byte directly to the data register, bypassing DMA
    ///
    /// Spins while the transmit FIFO is full. Use this to prime the line
    /// before autonomous transfers begin; steady-state output belongs to
    /// [`write`](crate::peripheral::write).
    pub fn write_byte(&mut self, byte: u8) {
        while ral::read_reg!(crate::ral::uart, self.registers, FR, TXFF == 1) {}
        ral::write_reg!(crate::ral::uart, self.registers, DR, u32::from(byte));
    }
}

// Safety: this UART peripheral can receive data from a DMA transfer
unsafe impl Destination<u8> for Tx {
    fn request_select(&self) -> u32 {
        request_select_for(self.registers)
    }
    /// Point the DMA engine at the data register
    fn destination_address(&self) -> *const u8 {
        &self.registers.DR as *const _ as *const u8
    }
    /// Enable transmit DMA requests
    fn enable_destination(&mut self) {
        ral::modify_reg!(crate::ral::uart, self.registers, DMACTL, TXDMAE: 1);
    }
    /// Disable transmit DMA requests
    fn disable_destination(&mut self) {
        while ral::read_reg!(crate::ral::uart, self.registers, DMACTL, TXDMAE == 1) {
            ral::modify_reg!(crate::ral::uart, self.registers, DMACTL, TXDMAE: 0);
        }
    }
}

/// The receive half of a [`Uart`]
pub struct Rx {
    registers: Static<ral::uart::RegisterBlock>,
}

impl Rx {
    /// Take one byte from the receive FIFO, if any is waiting
    pub fn read_byte(&mut self) -> Option<u8> {
        if ral::read_reg!(crate::ral::uart, self.registers, FR, RXFE == 1) {
            None
        } else {
            Some(ral::read_reg!(crate::ral::uart, self.registers, DR) as u8)
        }
    }

    /// Check the receive status accumulated since the last call
    ///
    /// Reports overrun, break, parity, and framing conditions, then clears
    /// them. Receive errors do not stop a DMA transfer; check after a
    /// completed read if the payload looks suspect.
    pub fn line_errors(&mut self) -> Result<(), LineErrors> {
        let status = ral::read_reg!(crate::ral::uart, self.registers, RSR) & 0xF;
        if status == 0 {
            Ok(())
        } else {
            // Any write to the error-clear alias resets all four flags.
            ral::write_reg!(crate::ral::uart, self.registers, RSR, 0);
            Err(LineErrors::new(status))
        }
    }
}

// Safety: this UART peripheral can provide data for a DMA transfer
unsafe impl Source<u8> for Rx {
    fn request_select(&self) -> u32 {
        request_select_for(self.registers)
    }
    /// Point the DMA engine at the data register
    fn source_address(&self) -> *const u8 {
        &self.registers.DR as *const _ as *const u8
    }
    /// Enable receive DMA requests
    fn enable_source(&mut self) {
        ral::modify_reg!(crate::ral::uart, self.registers, DMACTL, RXDMAE: 1);
    }
    /// Disable receive DMA requests
    fn disable_source(&mut self) {
        while ral::read_reg!(crate::ral::uart, self.registers, DMACTL, RXDMAE == 1) {
            ral::modify_reg!(crate::ral::uart, self.registers, DMACTL, RXDMAE: 0);
        }
    }
}

/// Receive line status
///
/// A snapshot of the receive-status flags taken by
/// [`Rx::line_errors`]. The flags are already cleared in hardware when
/// this value reaches you.
#[derive(Clone, Copy)]
pub struct LineErrors {
    status: u32,
}

impl LineErrors {
    const fn new(status: u32) -> Self {
        LineErrors { status }
    }
    /// The raw receive-status snapshot
    pub const fn raw(self) -> u32 {
        self.status
    }
    /// New data arrived with the FIFO already full
    pub const fn is_overrun(self) -> bool {
        self.status & ral::uart::RSR::OE::mask != 0
    }
    /// The line was held low for longer than a frame
    pub const fn is_break(self) -> bool {
        self.status & ral::uart::RSR::BE::mask != 0
    }
    /// A frame's parity bit didn't match
    pub const fn is_parity(self) -> bool {
        self.status & ral::uart::RSR::PE::mask != 0
    }
    /// A frame had no valid stop bit
    pub const fn is_framing(self) -> bool {
        self.status & ral::uart::RSR::FE::mask != 0
    }
}

impl Debug for LineErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UARTRSR({:#X})", self.status)
    }
}

impl Display for LineErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UARTRSR: OE {oe} BE {be} PE {pe} FE {fe}",
            oe = self.is_overrun() as u32,
            be = self.is_break() as u32,
            pe = self.is_parity() as u32,
            fe = self.is_framing() as u32,
        )
    }
}

/// Handle the UART's shared completion interrupt
///
/// Both directions' DMA-done events arrive on the one UART interrupt
/// line. `on_interrupt` reads the masked interrupt status exactly once,
/// clears precisely the completion causes present in that snapshot, and
/// wakes the matching channel's transfer. Both causes may be pending at
/// once, and each is handled independently; a spurious invocation with
/// neither cause pending does nothing. Causes outside the two completion
/// bits are left for other handlers.
///
/// Call it from the UART's interrupt handler:
///
/// ```no_run
/// use tm4c_udma::uart;
///
/// // The vector-table entry for UART2:
/// fn uart2_handler() {
///     // Safety: channels 0 and 1 carry UART2's receive and transmit.
///     unsafe { uart::on_interrupt(uart::UART2, 0, 1) };
/// }
/// ```
///
/// # Safety
///
/// Caller must ensure that `on_interrupt` is called from the interrupt
/// handler of the UART instance `registers` describes, and that
/// `rx_channel` and `tx_channel` are the μDMA channels actually bound to
/// that instance's receive and transmit requests.
pub unsafe fn on_interrupt(
    registers: *const ral::uart::RegisterBlock,
    rx_channel: usize,
    tx_channel: usize,
) {
    let uart = Static(registers);
    let status = ral::read_reg!(crate::ral::uart, uart, MIS);
    let handled =
        status & (ral::uart::MIS::DMARXMIS::mask | ral::uart::MIS::DMATXMIS::mask);
    if handled != 0 {
        // One write-1-to-clear covering exactly the causes acted on
        // below, ahead of their completion actions. An unhandled cause
        // left set would re-assert the line forever.
        ral::write_reg!(crate::ral::uart, uart, ICR, handled);
    }
    if handled & ral::uart::MIS::DMARXMIS::mask != 0 {
        crate::interrupt::wake(rx_channel);
    }
    if handled & ral::uart::MIS::DMATXMIS::mask != 0 {
        crate::interrupt::wake(tx_channel);
    }
}

#[cfg(test)]
mod tests {
    use super::{dividers, on_interrupt, Config, Parity, StopBits, Uart};
    use crate::testing::{counting_waker, leak, peek, poke};

    const DMARX: u32 = 1 << 16;
    const DMATX: u32 = 1 << 17;

    fn fake() -> &'static crate::ral::uart::RegisterBlock {
        leak(unsafe { core::mem::zeroed() })
    }

    #[test]
    fn divisors_match_the_reference_point() {
        // 16 MHz clock at 115200 baud: divisor 8.6805..., fraction
        // 0.6805 * 64 + 0.5 = 44.05.
        assert_eq!(dividers(16_000_000, 115_200), (8, 44));
    }

    #[test]
    fn divisor_fraction_carries_into_the_integer() {
        let denominator = 16 * 115_200;
        assert_eq!(dividers(2 * denominator - 1, 115_200), (2, 0));
    }

    #[test]
    fn setup_programs_the_reference_registers() {
        let registers = fake();
        let _uart = unsafe { Uart::new(registers, &Config::default(), 16_000_000) };

        assert_eq!(registers.IBRD.read(), 8);
        assert_eq!(registers.FBRD.read(), 44);
        // 8N1 with FIFOs: word length 0b11 at bit 5, FEN at bit 4.
        assert_eq!(registers.LCRH.read(), 0x70);
        // Both request lines, both completion causes.
        assert_eq!(registers.DMACTL.read(), 0x3);
        assert_eq!(registers.IM.read(), DMARX | DMATX);
        // Enabled with transmit and receive, no handshake by default.
        assert_eq!(registers.CTL.read(), 0x301);
    }

    #[test]
    fn setup_honors_line_options() {
        let registers = fake();
        let config = Config {
            stop_bits: StopBits::Two,
            parity: Parity::Even,
            cts_handshake: true,
            ..Config::default()
        };
        let _uart = unsafe { Uart::new(registers, &config, 16_000_000) };
        // 8E2 + FIFO: WLEN | FEN | STP2 | EPS | PEN.
        assert_eq!(registers.LCRH.read(), 0x7E);
        assert_eq!(registers.CTL.read(), 0x8301);
    }

    #[test]
    fn dispatcher_clears_exactly_what_it_handles() {
        // All four combinations of the two completion causes.
        for (rx_pending, tx_pending) in [(false, false), (true, false), (false, true), (true, true)]
        {
            let registers = fake();
            let (rx_waker, rx_wakes) = counting_waker();
            let (tx_waker, tx_wakes) = counting_waker();
            crate::interrupt::register(16, rx_waker);
            crate::interrupt::register(17, tx_waker);

            let mut status = 0;
            if rx_pending {
                status |= DMARX;
            }
            if tx_pending {
                status |= DMATX;
            }
            poke(&registers.MIS, status);
            unsafe { on_interrupt(registers, 16, 17) };

            assert_eq!(peek(&registers.ICR), status);
            assert_eq!(rx_wakes.count(), rx_pending as usize);
            assert_eq!(tx_wakes.count(), tx_pending as usize);
        }
    }

    #[test]
    fn dispatcher_is_idempotent_between_events() {
        let registers = fake();
        let (rx_waker, rx_wakes) = counting_waker();
        crate::interrupt::register(18, rx_waker);

        poke(&registers.MIS, DMARX);
        unsafe { on_interrupt(registers, 18, 19) };
        assert_eq!(peek(&registers.ICR), DMARX);
        assert_eq!(rx_wakes.count(), 1);

        // Hardware drops the status bit on the clear write. A second
        // invocation with no new event does nothing.
        poke(&registers.MIS, 0);
        poke(&registers.ICR, 0);
        unsafe { on_interrupt(registers, 18, 19) };
        assert_eq!(peek(&registers.ICR), 0);
        assert_eq!(rx_wakes.count(), 1);
    }

    #[test]
    fn read_byte_respects_the_empty_flag() {
        let registers = fake();
        let (_tx, mut rx) = unsafe { Uart::new(registers, &Config::default(), 16_000_000) }.split();

        // Receive FIFO empty.
        poke(&registers.FR, 1 << 4);
        assert_eq!(rx.read_byte(), None);

        poke(&registers.FR, 0);
        poke(&registers.DR, 0x41);
        assert_eq!(rx.read_byte(), Some(0x41));
    }

    #[test]
    fn line_errors_report_then_clear() {
        let registers = fake();
        let (_tx, mut rx) = unsafe { Uart::new(registers, &Config::default(), 16_000_000) }.split();

        // Overrun and framing flags pending.
        poke(&registers.RSR, 0x9);
        let errors = rx.line_errors().unwrap_err();
        assert!(errors.is_overrun());
        assert!(errors.is_framing());
        assert!(!errors.is_break());

        // The check wrote the error-clear alias.
        assert_eq!(peek(&registers.RSR), 0);
        assert!(rx.line_errors().is_ok());
    }

    #[test]
    fn dispatcher_ignores_unrecognized_causes() {
        let registers = fake();
        // Receive-timeout (bit 6) is someone else's problem.
        poke(&registers.MIS, 1 << 6);
        unsafe { on_interrupt(registers, 20, 21) };
        assert_eq!(peek(&registers.ICR), 0);
    }
}
