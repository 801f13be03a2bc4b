//! GPIO pin routing
//!
//! The driver needs exactly one thing from the pin controller: route a
//! pair of pins to their UART alternate function. Everything else about
//! the ports is out of scope.

pub use crate::ral::gpio::{
    RegisterBlock, GPIOA, GPIOB, GPIOC, GPIOD, GPIOE, GPIOF, GPIOG, GPIOH, GPIOJ, GPIOK, GPIOL,
    GPIOM, GPION, GPIOP, GPIOQ,
};

/// Route the pins in `pins` to alternate function `function`
///
/// Digital-enables the pins, hands them to the alternate-function
/// multiplexer, and programs each pin's 4-bit port-control field. Other
/// pins on the port keep their configuration.
///
/// # Panics
///
/// Panics if `function` doesn't fit a 4-bit port-control field.
pub fn select_alternate_function(port: &RegisterBlock, pins: u8, function: u8) {
    assert!(function < 16, "GPIO port-control function {} exceeds 4 bits", function);
    let mask = u32::from(pins);
    port.DEN.write(port.DEN.read() | mask);
    port.AFSEL.write(port.AFSEL.read() | mask);

    let mut pctl = port.PCTL.read();
    for pin in 0..8 {
        if pins & (1 << pin) != 0 {
            let shift = pin * 4;
            pctl = (pctl & !(0xF << shift)) | (u32::from(function) << shift);
        }
    }
    port.PCTL.write(pctl);
}

#[cfg(test)]
mod tests {
    use super::select_alternate_function;
    use crate::testing::leak;

    #[test]
    fn routes_the_uart_pin_pair() {
        let port: &'static super::RegisterBlock = leak(unsafe { core::mem::zeroed() });
        // PD4/PD5 to function 1, the UART2 routing.
        select_alternate_function(port, 0x30, 1);
        assert_eq!(port.DEN.read(), 0x30);
        assert_eq!(port.AFSEL.read(), 0x30);
        assert_eq!(port.PCTL.read(), 0x0011_0000);
    }

    #[test]
    fn leaves_other_pins_alone() {
        let port: &'static super::RegisterBlock = leak(unsafe { core::mem::zeroed() });
        port.PCTL.write(0x0000_0007);
        port.DEN.write(0x01);
        select_alternate_function(port, 0x30, 1);
        assert_eq!(port.PCTL.read(), 0x0011_0007);
        assert_eq!(port.DEN.read(), 0x31);
    }
}
