//! # Overview
//!
//! `midi_decoder` turns a raw MIDI byte stream, as received one byte at a time from a UART, a
//! USB-MIDI endpoint or any other byte source, into complete MIDI messages.
//!
//! Usage is as simple as:
//!
//! ```rust
//! use midi_decoder::{Decoder, Message};
//!
//! let mut decoder = Decoder::new();
//! for &byte in &[0x90, 0x40, 0x7F, 0xF8, 0x41, 0x7F] {
//!     if let Some(msg) = decoder.push(byte) {
//!         println!("received {:?}", msg);
//!     }
//! }
//! ```
//!
//! The [`Decoder`](struct.Decoder.html) struct is the main type in the crate.
//! It keeps track of everything needed to make sense of an undelimited stream:
//!
//! - Running status: senders may omit the status byte of a channel message when it is the same as
//!     the status of the previous message.
//! - System Realtime messages, such as timing clocks, which may show up in between the bytes of
//!     any other message, including SysEx dumps.
//! - System Exclusive dumps, which take any amount of data bytes until an `0xF7` byte arrives.
//!
//! # About lifetimes
//!
//! Decoded messages borrow SysEx payloads straight from the decoder buffer, so a
//! [`Message`](enum.Message.html) must be consumed (or copied) before pushing the next byte:
//!
//! ```rust
//! use midi_decoder::{Decoder, Message, SystemCommon};
//!
//! let mut decoder = Decoder::new();
//! let mut dumps = Vec::new();
//! decoder.feed(&[0xF0, 0x7E, 0x00, 0x06, 0x01, 0xF7], |msg| {
//!     if let Message::Common(SystemCommon::SysEx(data)) = msg {
//!         dumps.push(data.iter().map(|b| b.as_int()).collect::<Vec<u8>>());
//!     }
//! });
//! assert_eq!(dumps, [vec![0x7E, 0x00, 0x06, 0x01]]);
//! ```
//!
//! # Parsing delimited packets
//!
//! When the transport already splits the stream into messages, as most OS APIs do, each packet
//! can be parsed on its own through [`Message::parse`](enum.Message.html#method.parse).
//! Unlike the decoder, this method reports malformed packets through an
//! [`Error`](struct.Error.html).
//!
//! # About features
//!
//! - The `alloc` feature
//!
//!   Makes the default SysEx buffer a heap-allocated `Vec` with no size limit.
//!   Without it, the default buffer is a 16KB stack buffer, and SysEx dumps longer than that are
//!   dropped. Custom buffers can be declared with the [`stack_buffer!`](macro.stack_buffer.html)
//!   macro.
//!
//! - The `std` feature
//!
//!   Implements `std::error::Error` for [`Error`](struct.Error.html).
//!
//! Both are enabled by default. Disabling them with `default-features = false` makes the crate
//! `no_std`.
//!
//! # Logging
//!
//! Dropped bytes and abandoned messages are reported through [`tracing`](https://docs.rs/tracing)
//! events at the `trace` level, and SysEx dumps that overflow their buffer at the `debug` level.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        error::{ErrorKind, Result, StdResult},
        primitive::{u14, u4, u7},
    };
    #[cfg(feature = "alloc")]
    pub(crate) use alloc::vec::Vec;
    pub(crate) use core::{fmt, mem};
}

mod decoder;
mod message;
mod primitive;

pub use crate::{
    decoder::{Buffer, Decoder, DefaultBuffer},
    error::{Error, ErrorKind, Result},
    message::{
        ChannelMessage, Command, Message, MtcQuarterFrameMessage, PitchBend, SystemCommand,
        SystemCommon, SystemRealtime,
    },
};

/// Exotically-sized integers used by the MIDI standard.
pub mod num {
    pub use crate::primitive::{u14, u4, u7};
}
