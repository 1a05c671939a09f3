//! Decoding of raw, undelimited MIDI byte streams, one byte at a time.
//!
//! Handles all of the quirks specific to MIDI streams: running status, System Realtime messages
//! embedded in the middle of another message, and System Exclusive dumps of arbitrary length.

use crate::{
    message::{data_len, Message, SystemCommon, SystemRealtime},
    prelude::*,
};
use tracing::{debug, trace};

/// A message that is still waiting for some of its data bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Pending {
    status: u8,
    data: [u7; 2],
    filled: usize,
    len: usize,
}
impl Pending {
    fn new(status: u8, len: usize) -> Pending {
        Pending {
            status,
            data: [u7::new(0); 2],
            filled: 0,
            len,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Pending(Pending),
    /// Data bytes go into the SysEx buffer until `0xF7` arrives.
    SysEx,
}
impl Default for State {
    #[inline]
    fn default() -> State {
        State::Idle
    }
}

/// A streaming MIDI decoder, taking raw, undelimited MIDI bytes, presumably from a cable.
///
/// Bytes are fed one at a time through [`push`](#method.push), which returns a message as soon as
/// its last byte arrives.
///
/// The decoder never fails. Bytes that make no sense in their context (a data byte before any
/// status byte, an `0xF7` outside of a SysEx dump, an undefined status) are dropped, and a status
/// byte arriving in the middle of a message always wins over the incomplete message, which is
/// discarded. This way the decoder resynchronizes with the stream on the next status byte.
///
/// Each stream needs its own decoder, since it keeps track of the running status of the stream.
///
/// # Example
///
/// ```rust
/// use midi_decoder::{ChannelMessage, Decoder, Message};
///
/// let mut decoder = Decoder::new();
/// let mut notes = Vec::new();
/// // The second note omits its status byte (running status)
/// for &byte in &[0x90, 60, 100, 64, 100] {
///     if let Some(Message::Channel { message: ChannelMessage::NoteOn { key, .. }, .. }) =
///         decoder.push(byte)
///     {
///         notes.push(key.as_int());
///     }
/// }
/// assert_eq!(notes, [60, 64]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Decoder<B = DefaultBuffer> {
    running_status: Option<u8>,
    state: State,
    sysex: B,
}
impl Decoder {
    /// Create a fresh decoder with the default SysEx buffer.
    #[inline]
    pub fn new() -> Decoder {
        Decoder::default()
    }
}
impl<B: Buffer> Decoder<B> {
    /// Create a fresh decoder collecting SysEx data into the given buffer.
    ///
    /// SysEx dumps that do not fit in the buffer are dropped.
    #[inline]
    pub fn with_buffer(mut buf: B) -> Decoder<B> {
        buf.clear();
        Decoder {
            running_status: None,
            state: State::Idle,
            sysex: buf,
        }
    }

    /// Bring the decoder back to its initial state, as if no bytes had ever been pushed.
    ///
    /// Forgets the running status, and drops any incomplete message or SysEx dump.
    pub fn reset(&mut self) {
        self.running_status = None;
        self.state = State::Idle;
        self.sysex.clear();
    }

    /// The status byte that data bytes without a preceding status byte will use.
    ///
    /// Only channel voice statuses (`0x80 ..= 0xEF`) are ever kept as running status.
    #[inline]
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// Whether a SysEx dump is currently being received.
    #[inline]
    pub fn in_sysex(&self) -> bool {
        self.state == State::SysEx
    }

    /// Whether the decoder sits in between messages, with no incomplete message or SysEx dump.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Feed a single byte to the decoder, getting back a message if this byte completes one.
    ///
    /// System Realtime bytes produce a message right away, without disturbing the message that
    /// was in progress.
    pub fn push(&mut self, byte: u8) -> Option<Message<'_>> {
        match byte {
            0x00..=0x7F => self.push_data(u7::new(byte)),
            0xF8..=0xFF => match SystemRealtime::from_status(byte) {
                Some(rt) => Some(Message::Realtime(rt)),
                None => {
                    trace!(status = byte, "ignoring undefined realtime status");
                    None
                }
            },
            _ => self.push_status(byte),
        }
    }

    /// Feeds a slice of bytes to the decoder, calling the `handle_msg` closure whenever a complete
    /// message is read.
    ///
    /// Calling `feed` with many small slices is equivalent to calling `feed` with one large
    /// concatenation of them all.
    pub fn feed(&mut self, bytes: &[u8], mut handle_msg: impl FnMut(Message)) {
        for &byte in bytes {
            if let Some(msg) = self.push(byte) {
                handle_msg(msg);
            }
        }
    }

    /// Channel voice and System Common statuses.
    fn push_status(&mut self, status: u8) -> Option<Message<'_>> {
        let prev = mem::replace(&mut self.state, State::Idle);
        match prev {
            State::Pending(pending) => trace!(
                status = pending.status,
                received = pending.filled,
                "abandoning incomplete message"
            ),
            State::SysEx if status != 0xF7 => trace!(
                len = self.sysex.as_slice().len(),
                "abandoning unterminated sysex"
            ),
            _ => {}
        }
        match status {
            0x80..=0xEF => {
                self.running_status = Some(status);
                self.expect(status)
            }
            0xF0 => {
                self.running_status = None;
                self.sysex.clear();
                self.state = State::SysEx;
                None
            }
            0xF7 => {
                if prev == State::SysEx {
                    let data = u7::slice_from_int(self.sysex.as_slice());
                    Some(Message::Common(SystemCommon::SysEx(data)))
                } else {
                    trace!("discarding end of exclusive outside of sysex");
                    None
                }
            }
            _ => {
                self.running_status = None;
                self.expect(status)
            }
        }
    }

    fn push_data(&mut self, byte: u7) -> Option<Message<'_>> {
        if self.state == State::Idle {
            match self.running_status {
                Some(status) => {
                    // Running status is always a channel voice status, which never completes
                    // without data.
                    self.expect(status);
                }
                None => {
                    trace!(byte = byte.as_int(), "discarding data byte without status");
                    return None;
                }
            }
        }
        match self.state {
            State::Idle => None,
            State::SysEx => {
                if self.sysex.push(&[byte.as_int()]).is_err() {
                    debug!(
                        len = self.sysex.as_slice().len(),
                        "sysex does not fit in its buffer, dropping it"
                    );
                    self.state = State::Idle;
                }
                None
            }
            State::Pending(ref mut pending) => {
                pending.data[pending.filled] = byte;
                pending.filled += 1;
                if pending.filled < pending.len {
                    return None;
                }
                let done = *pending;
                self.state = State::Idle;
                Message::assemble(done.status, done.data)
            }
        }
    }

    /// Start waiting for the data bytes of `status`, or emit it right away if it carries none.
    fn expect(&mut self, status: u8) -> Option<Message<'static>> {
        match data_len(status) {
            Some(0) => Message::assemble(status, [u7::new(0); 2]),
            Some(len) => {
                self.state = State::Pending(Pending::new(status, len));
                None
            }
            None => {
                trace!(status, "ignoring undefined status");
                None
            }
        }
    }
}

/// Describes types that can be used as SysEx buffers for the [`Decoder`](struct.Decoder.html)
/// type.
///
/// This trait is automatically implemented by the [`stack_buffer!`](macro.stack_buffer.html)
/// macro, and very rarely should be implemented manually.
pub trait Buffer {
    /// Append bytes, or fail without modifying the buffer if they do not fit.
    fn push(&mut self, data: &[u8]) -> StdResult<(), ()>;
    fn clear(&mut self);
    fn as_slice(&self) -> &[u8];
}

/// A `Buffer` with virtually unlimited capacity.
#[cfg(feature = "alloc")]
impl Buffer for Vec<u8> {
    #[inline]
    fn push(&mut self, data: &[u8]) -> StdResult<(), ()> {
        self.extend_from_slice(data);
        Ok(())
    }
    #[inline]
    fn clear(&mut self) {
        Vec::clear(self)
    }
    #[inline]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Define a fixed-capacity stack buffer type, suitable for use with
/// [`Decoder`](struct.Decoder.html).
///
/// # Usage
///
/// The `stack_buffer!` macro defines a buffer type, which can later be instantiated for use with
/// a `Decoder`.
/// SysEx dumps longer than the buffer capacity are dropped by the decoder.
///
/// ```rust
/// midi_decoder::stack_buffer! {
///     struct MyBuffer([u8; 512]);
/// }
///
/// use midi_decoder::Decoder;
/// let decoder = Decoder::with_buffer(MyBuffer::new());
/// ```
///
/// Buffers can have attributes, documentation, and be made `pub`lic.
///
/// ```rust
/// midi_decoder::stack_buffer! {
///     /// A very small buffer.
///     #[repr(C)]
///     pub struct MyBuffer([u8; 16]);
/// }
///
/// use midi_decoder::Decoder;
/// let decoder = Decoder::<MyBuffer>::default();
/// ```
#[macro_export]
macro_rules! stack_buffer {
    {
        @impl_def {$($attr:meta)*} {$($pub:ident)?} {$name:ident} {$size:expr}
    } => {
        $(#[$attr])*
        #[derive(Clone)]
        $($pub)? struct $name {
            buf: [u8; $size],
            len: usize,
        }
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "["))?;
                for databyte in self.buf[..self.len].iter() {
                    write!(f, "{:02x}", databyte)?;
                }
                write!(f, "]")?;
                Ok(())
            }
        }
        impl $name {
            pub const MAX_CAP: usize = $size;
            #[inline]
            $($pub)? const fn new() -> $name {
                $name {
                    buf: [0; $size],
                    len: 0,
                }
            }
        }
        impl core::default::Default for $name {
            #[inline]
            fn default() -> $name {
                Self::new()
            }
        }
        impl $crate::Buffer for $name {
            #[inline]
            fn push(&mut self, data: &[u8]) -> core::result::Result<(), ()> {
                let new_len = self.len + data.len();
                if new_len > Self::MAX_CAP {
                    Err(())
                } else {
                    self.buf[self.len..new_len].copy_from_slice(data);
                    self.len = new_len;
                    Ok(())
                }
            }
            #[inline]
            fn clear(&mut self) {
                self.len = 0;
            }
            #[inline]
            fn as_slice(&self) -> &[u8] {
                &self.buf[..self.len]
            }
        }
    };
    {
        $(#[$attr:meta])*
        struct $name:ident([u8; $size:expr]);
    }=> {
        $crate::stack_buffer!(@impl_def {$($attr)*} {} {$name} {$size});
    };
    {
        $(#[$attr:meta])*
        pub struct $name:ident([u8; $size:expr]);
    }=> {
        $crate::stack_buffer!(@impl_def {$($attr)*} {pub} {$name} {$size});
    };
}

macro_rules! default_buffer_def {
    ($($item:item)*) => {
        /// The default SysEx buffer type used for [`Decoder`](struct.Decoder.html).
        ///
        /// With the `alloc` feature it is backed by a `Vec` and has no size limit, so SysEx dumps
        /// of any length are received.
        /// Without `alloc` a 16KB stack buffer is used instead.
        ///
        /// For a different limit, use the [`stack_buffer!`](macro.stack_buffer.html) macro or
        /// implement the `Buffer` trait.
        #[derive(Clone, Default)]
        $($item)*
    };
}
pub use self::default_buf_impl::DefaultBuffer;

#[cfg(feature = "alloc")]
mod default_buf_impl {
    use super::*;

    default_buffer_def! {
        pub struct DefaultBuffer {
            buf: Vec<u8>,
        }
    }

    impl fmt::Debug for DefaultBuffer {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "DefaultBuffer[")?;
            for databyte in self.buf.iter() {
                write!(f, "{:02x}", databyte)?;
            }
            write!(f, "]")?;
            Ok(())
        }
    }
    impl DefaultBuffer {
        /// The maximum amount of bytes this buffer can hold, if limited.
        #[inline]
        pub const fn max_cap(&self) -> Option<usize> {
            None
        }
        #[inline]
        pub const fn new() -> DefaultBuffer {
            DefaultBuffer { buf: Vec::new() }
        }
    }
    impl Buffer for DefaultBuffer {
        #[inline]
        fn push(&mut self, data: &[u8]) -> StdResult<(), ()> {
            self.buf.extend_from_slice(data);
            Ok(())
        }
        #[inline]
        fn clear(&mut self) {
            self.buf.clear()
        }
        #[inline]
        fn as_slice(&self) -> &[u8] {
            &self.buf[..]
        }
    }
}

#[cfg(not(feature = "alloc"))]
mod default_buf_impl {
    use super::*;

    default_buffer_def! {
        pub struct DefaultBuffer {
            buf: InnerBuf,
        }
    }
    stack_buffer! {
        struct InnerBuf([u8; 16*1024]);
    }
    impl fmt::Debug for DefaultBuffer {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            fmt::Debug::fmt(&self.buf, f)
        }
    }
    impl DefaultBuffer {
        /// The maximum amount of bytes this buffer can hold, if limited.
        #[inline]
        pub const fn max_cap(&self) -> Option<usize> {
            Some(InnerBuf::MAX_CAP)
        }
        #[inline]
        pub const fn new() -> DefaultBuffer {
            DefaultBuffer {
                buf: InnerBuf::new(),
            }
        }
    }
    impl Buffer for DefaultBuffer {
        #[inline]
        fn push(&mut self, data: &[u8]) -> StdResult<(), ()> {
            self.buf.push(data)
        }
        #[inline]
        fn clear(&mut self) {
            self.buf.clear()
        }
        #[inline]
        fn as_slice(&self) -> &[u8] {
            self.buf.as_slice()
        }
    }
}
