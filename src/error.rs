use core::fmt;

/// Represents an error while parsing a delimited MIDI packet.
///
/// The streaming [`Decoder`](struct.Decoder.html) never produces errors, it silently drops any
/// bytes it cannot make sense of. Errors only come out of
/// [`Message::parse`](enum.Message.html#method.parse), where the caller hands over a complete
/// packet and expects a single message back.
///
/// This type is a thin pointer to a static `ErrorKind`, so it is as cheap to return as a plain
/// reference.
///
/// If the `std` feature is enabled, this type implements `std::error::Error`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Error {
    inner: &'static ErrorKind,
}
impl Error {
    /// Create a new error with the given `ErrorKind`.
    #[inline]
    pub fn new(kind: &'static ErrorKind) -> Error {
        Error::from(kind)
    }

    /// More information about the error itself.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        *self.inner
    }
}
impl From<&'static ErrorKind> for Error {
    #[inline]
    fn from(inner: &'static ErrorKind) -> Error {
        Error { inner }
    }
}
impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The type of error that occurred while parsing.
///
/// Errors are broadly categorized into 2 classes, and specific error info is provided as a
/// non-normative string literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes do not form a MIDI message: there is no status byte, the status byte is
    /// undefined, or a data byte has its top bit set.
    Invalid(&'static str),

    /// The status byte is valid, but the packet ends before the message is complete.
    Truncated(&'static str),
}
impl ErrorKind {
    /// Get the informative message on what exact part of the MIDI format was not respected.
    #[inline]
    pub fn message(&self) -> &'static str {
        match *self {
            ErrorKind::Invalid(msg) => msg,
            ErrorKind::Truncated(msg) => msg,
        }
    }
}
impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Invalid(msg) => write!(f, "invalid midi: {}", msg),
            ErrorKind::Truncated(msg) => write!(f, "truncated midi: {}", msg),
        }
    }
}

macro_rules! err_invalid {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Invalid($msg);
        ERR_KIND
    }};
}
macro_rules! err_truncated {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Truncated($msg);
        ERR_KIND
    }};
}

/// The result type used by the MIDI packet parser.
pub type Result<T> = StdResult<T, Error>;
pub(crate) use core::result::Result as StdResult;
