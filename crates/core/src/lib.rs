//! Domain building blocks shared by every vidsum crate.
//!
//! Nothing in here talks to the database or the network. The one
//! exception is the metadata-probing analyzer, which shells out to
//! `ffprobe`.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod naming;
pub mod retry;
pub mod status;
pub mod storage;
pub mod types;
