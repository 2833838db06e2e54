// src/adapter/mod.rs
pub mod console;
pub mod render;

pub use console::Console;
