//! VozDoc application wiring: surfaces, export, page controllers and the
//! console runtime the binary drives.

pub mod console;
pub mod controllers;
pub mod export;
pub mod surfaces;
