// src/lib.rs
// Main library module declarations

pub mod domain;
pub mod application;
pub mod adapter;
pub mod config;
