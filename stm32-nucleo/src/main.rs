// make `std` available when testing
#![cfg_attr(not(test), no_std)]
#![no_main]
#![feature(alloc_error_handler)]

extern crate alloc;
extern crate cortex_m;
extern crate cortex_m_rt as rt;
extern crate jlink_rtt;
extern crate nb;
extern crate panic_halt;
extern crate stm32g0xx_hal as stm_hal;

use core::cell::{Cell, RefCell};

use alloc_cortex_m::CortexMHeap;
use log::LevelFilter;
use nb::block;
use rt::{entry, exception, ExceptionFrame};
use stm_hal::analog::adc::{Adc, Precision, SampleTime};
use stm_hal::prelude::*;
use stm_hal::serial::BasicConfig;
use stm_hal::{hal, stm32};

use battery_monitor::bsp::clock::Clock;
use battery_monitor::config::MonitorConfig;
use battery_monitor::monitor::BatteryMonitor;

use crate::adc::AdcInputs;
use crate::board::{
    BlockingDelay, GpioLed, IndependentWatchdog, PullUpInput, TickClock, UartSerial,
};
use crate::rtt::RttDisplay;

#[global_allocator]
static ALLOCATOR: CortexMHeap = CortexMHeap::empty();
const HEAP_SIZE: usize = 2048; // in bytes

const TICK_US: u32 = 1000;

// VDDA is the 3.3V rail, the reference has to sit below it
const ADC_BITS: u8 = 12;
/// LM4040 2.5V shunt on A0
const REFERENCE_VOLTS: f32 = 2.5;
/// 40k / 10k dividers, 16.5V at the terminals is 3.3V at the pin
const BATTERY_ATTENUATION: f32 = 5.0;

mod adc;
mod board;
mod rtt;

#[entry]
fn main() -> ! {
    unsafe { ALLOCATOR.init(cortex_m_rt::heap_start() as usize, HEAP_SIZE) }
    rtt::init_logger(LevelFilter::Info);

    // https://github.com/stm32-rs/stm32g0xx-hal
    let dp = stm32::Peripherals::take().unwrap();
    let cp = stm32::CorePeripherals::take().unwrap();
    let mut rcc = dp.RCC.constrain();

    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);
    let gpioc = dp.GPIOC.split(&mut rcc);

    // A0 reference, A1..A4 batteries through the 5:1 dividers
    let a0 = gpioa.pa0;
    let a1 = gpioa.pa1;
    let a2 = gpioa.pa4;
    let a3 = gpiob.pb1;
    let a4 = gpioa.pa11;

    let d2 = gpioa.pa10;
    let led_pin = gpioc.pc6;

    let mut watchdog = dp.IWDG.constrain();
    watchdog.start(2000.ms());

    let mut timer = dp.TIM17.timer(&mut rcc);

    let mut adc: Adc = dp.ADC.constrain(&mut rcc);
    adc.set_sample_time(SampleTime::T_80);
    adc.set_precision(Precision::B_12);
    let mut delay = cp.SYST.delay(&mut rcc);
    delay.delay(20.us());
    adc.calibrate();

    let inputs = AdcInputs {
        adc: RefCell::new(adc),
        reference: RefCell::new(a0.into_analog()),
        batteries: (
            RefCell::new(a1.into_analog()),
            RefCell::new(a2.into_analog()),
            RefCell::new(a3.into_analog()),
            RefCell::new(a4.into_analog()),
        ),
    };

    let clock = TickClock::create();
    let delay = BlockingDelay {
        delay: RefCell::new(delay),
        clock: &clock,
    };

    let usart = dp
        .USART2
        .usart(
            gpioa.pa2,
            gpioa.pa3,
            BasicConfig::default().baudrate(9600.bps()),
            &mut rcc,
        )
        .ok();
    let serial = UartSerial {
        port: RefCell::new(usart),
    };

    let display = RttDisplay::create();
    let led = GpioLed {
        pin: RefCell::new(led_pin.into_push_pull_output()),
        state: Cell::new(false),
    };
    let watchdog = IndependentWatchdog {
        iwdg: RefCell::new(watchdog),
    };

    let monitor = BatteryMonitor::new(
        MonitorConfig::with_front_end(ADC_BITS, REFERENCE_VOLTS, BATTERY_ATTENUATION),
        &inputs,
        &delay,
        PullUpInput {
            pin: d2.into_pull_up_input(),
        },
        &display,
        &serial,
        &watchdog,
        &led,
    );

    monitor.start(clock.now_ms());

    loop {
        monitor.poll(clock.now_ms());
        timer.start(TICK_US.us());
        block!(timer.wait()).unwrap();
        clock.advance_us(TICK_US);
    }
}

#[exception]
fn HardFault(_ef: &ExceptionFrame) -> ! {
    panic!("");
}

#[alloc_error_handler]
fn alloc_error(_layout: core::alloc::Layout) -> ! {
    loop {}
}
