use core::cell::RefCell;

use nb::block;
use stm_hal::analog::adc::Adc;
use stm_hal::hal::adc::{Channel, OneShot};

use battery_monitor::bsp::adc::AnalogInput;

/// Reference on channel 0, batteries on channels 1..=4, as in the default configuration
pub struct AdcInputs<R, B1, B2, B3, B4>
where
    R: Channel<Adc, ID = u8>,
    B1: Channel<Adc, ID = u8>,
    B2: Channel<Adc, ID = u8>,
    B3: Channel<Adc, ID = u8>,
    B4: Channel<Adc, ID = u8>,
{
    pub adc: RefCell<Adc>,
    pub reference: RefCell<R>,
    pub batteries: (RefCell<B1>, RefCell<B2>, RefCell<B3>, RefCell<B4>),
}

impl<R, B1, B2, B3, B4> AnalogInput for AdcInputs<R, B1, B2, B3, B4>
where
    R: Channel<Adc, ID = u8>,
    B1: Channel<Adc, ID = u8>,
    B2: Channel<Adc, ID = u8>,
    B3: Channel<Adc, ID = u8>,
    B4: Channel<Adc, ID = u8>,
{
    fn read(&self, channel: u8) -> u16 {
        let mut adc = self.adc.borrow_mut();
        let measured: Result<u16, ()> = match channel {
            0 => block!(adc.read(&mut *self.reference.borrow_mut())),
            1 => block!(adc.read(&mut *self.batteries.0.borrow_mut())),
            2 => block!(adc.read(&mut *self.batteries.1.borrow_mut())),
            3 => block!(adc.read(&mut *self.batteries.2.borrow_mut())),
            4 => block!(adc.read(&mut *self.batteries.3.borrow_mut())),
            // not wired, reads as ground
            _ => Ok(0),
        };
        measured.unwrap_or(0)
    }
}
