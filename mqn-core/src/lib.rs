//! Core drivers and utilities for the Maqueen robot expansion board on no-std
//! embedded platforms.
//!
//! For a runnable host demo, see the `mqn-app/mock-mcu` binary.
#![no_std]

extern crate alloc;

pub mod utils;
