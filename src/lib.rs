//! Tagrip reads the metadata formats found on ripped audio files: ID3v1 and
//! ID3v2.2/2.3/2.4 tags.
//!
//! The usual entry points are [`probe`](probe) to find out which tags a file
//! carries, [`id3v2::Tag`](id3v2::Tag) for the frame-based tags at the start
//! of a file, and [`id3v1::Tag`](id3v1::Tag) for the fixed 128-byte trailer.
//! Reading is the whole scope of this crate; nothing in here writes tags.

#![forbid(unsafe_code)]

#[macro_use]
mod core;

mod err;

pub mod id3v1;
pub mod id3v2;
pub mod probe;

pub use crate::core::string::Encoding;
pub use err::{ParseError, ParseResult};
