//! UART2 terminal demo for the EK-TM4C1294XL
//!
//! Setup
//! =====
//!
//! - Baud rate: 115_200, 8N1, FIFOs on, CTS assist
//! - RX: PD4, TX: PD5 (alternate function 1)
//! - μDMA channel 0 carries UART2 receive, channel 1 carries transmit
//!
//! Demo
//! ====
//!
//! After setup, a `'>'` prompt byte goes straight out the data register,
//! and a one-shot DMA transmit streams the 32-byte greeting. From then on
//! the loop re-arms a 32-byte DMA receive forever; each completed payload
//! is sentinel-terminated and echoed over RTT. The processor idles in the
//! polling loop between completion interrupts.

#![no_std]
#![no_main]

use core::pin::pin;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use cortex_m_rt::{entry, exception};
use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};
use tm4c_udma::{
    block, gpio, peripheral, poll_no_wake, sysctl,
    table::ControlTable,
    uart::{self, Config, Uart},
    Udma,
};

/// The 16 MHz precision internal oscillator, the reset-default UART clock.
const CLOCK_HZ: u32 = 16_000_000;
/// Payload bytes per DMA transfer; the sentinel slot follows.
const PAYLOAD: usize = 32;

/// Channels 0 and 1 carry UART2's receive and transmit requests on
/// select 1; the transfer futures bind the channel map accordingly.
const RX_CHANNEL: usize = 0;
const TX_CHANNEL: usize = 1;
/// UART2's interrupt number.
const UART2_IRQ: u16 = 33;

static CONTROL_TABLE: ControlTable = ControlTable::new();
// Safety: the address is the μDMA controller on every TM4C129x part.
static UDMA: Udma = unsafe { Udma::new(tm4c_udma::UDMA, &CONTROL_TABLE) };

static MESSAGE: [u8; 33] = *b"Send more message if you can....\0";

#[derive(Clone, Copy)]
struct Uart2;
// Safety: 33 is UART2's interrupt number on TM4C129x devices.
unsafe impl InterruptNumber for Uart2 {
    fn number(self) -> u16 {
        UART2_IRQ
    }
}

#[entry]
fn main() -> ! {
    rtt_init_print!();

    // Safety: sole handles to system control, port D, and UART2.
    let sysctl = unsafe { &*sysctl::SYSCTL };
    sysctl::enable_uart(sysctl, 2);
    sysctl::enable_gpio(sysctl, sysctl::GpioPort::D);
    sysctl::enable_udma(sysctl);

    let port_d = unsafe { &*gpio::GPIOD };
    gpio::select_alternate_function(port_d, 0x30, 1);

    let config = Config {
        cts_handshake: true,
        ..Config::default()
    };
    let uart2 = unsafe { Uart::new(uart::UART2, &config, CLOCK_HZ) };
    let (mut tx, mut rx) = uart2.split();

    UDMA.enable();
    // Safety: each channel is allocated exactly once.
    let mut rx_channel = unsafe { UDMA.channel(RX_CHANNEL) };
    let mut tx_channel = unsafe { UDMA.channel(TX_CHANNEL) };

    // Safety: the handler below services this interrupt.
    unsafe { NVIC::unmask(Uart2) };

    // Prime the line before autonomous transfers begin.
    tx.write_byte(b'>');

    let mut greet = pin!(peripheral::write(
        &mut tx_channel,
        &MESSAGE[..PAYLOAD],
        &mut tx
    ));
    // Arm the one-shot transmit; it completes while the loop below waits
    // on receive traffic. No re-arm follows.
    let _ = poll_no_wake(greet.as_mut());

    rprintln!("listening at {} baud", config.baud_rate);

    let mut payload = [0u8; PAYLOAD + 1];
    loop {
        {
            let mut receive = pin!(peripheral::read(
                &mut rx_channel,
                &mut rx,
                &mut payload[..PAYLOAD]
            ));
            if let Err(status) = block(receive.as_mut()) {
                rprintln!("receive failed: {}", status);
                continue;
            }
        }
        payload[PAYLOAD] = 0;
        if let Err(errors) = rx.line_errors() {
            rprintln!("line errors: {}", errors);
        }
        match core::str::from_utf8(&payload[..PAYLOAD]) {
            Ok(text) => rprintln!("payload: {}", text),
            Err(_) => rprintln!("payload: {:?}", &payload[..PAYLOAD]),
        }
    }
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    if irqn == UART2_IRQ as i16 {
        // Safety: matches the channel routing armed in main.
        unsafe { uart::on_interrupt(uart::UART2, RX_CHANNEL, TX_CHANNEL) };
    }
}
