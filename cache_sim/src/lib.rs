pub mod address;
pub mod cache;
pub mod common;
pub mod config;
pub mod controller;
pub mod signal;
pub mod sim;
pub mod trace;

#[cfg(feature = "stat")]
pub mod stat;
