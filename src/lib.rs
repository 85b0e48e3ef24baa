#![cfg_attr(not(test), no_std)]
#[cfg(test)]
extern crate std;

pub mod app;
pub mod board;
pub mod config;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod kernel;
pub mod log;
pub mod utils;

pub use paste;
