//! specamp: a terminal music player with a live spectrum analyzer.
//!
//! The binary is a thin wrapper around [`runtime::run`]; the audio pipeline,
//! analyzer and playlist engine are usable on their own.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod playlist;
pub mod runtime;
pub mod spectrum;
pub mod ui;
