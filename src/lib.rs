//! Firmware for an ESP32 driving a 4.2" black/white e-paper panel.
//!
//! On boot the device joins WiFi, synchronizes its clock over NTP and turns
//! the radio off again. From then on it redraws the current date and a quote
//! from the embedded catalog on a fixed cycle, powering the panel down between
//! refreshes.
//!
//! The hardware sits behind the [`connectivity::Link`], [`clock::TimeSource`],
//! [`render::Panel`] and [`poll::Sleeper`] traits. The ESP-IDF implementations
//! live in [`esp`], which is only built for `target_os = "espidf"`.

pub mod app;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod poll;
pub mod quotes;
pub mod render;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use error::{Error, Result};
