// make `std` available when testing
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bsp;
pub mod calibrator;
pub mod config;
pub mod converter;
pub mod display;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod reading;
pub mod sampler;
pub mod scheduler;
pub mod uptime;
