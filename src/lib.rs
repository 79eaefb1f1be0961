//! # Adaptive-width LZW encoder
//!
//! This crate provides an [`Encoder`] turning a byte stream into a stream of variable-width LZW
//! code words. The dictionary starts out knowing only the 256 single byte strings and learns one
//! new string for every code it writes.
//!
//! The wire format is as follows:
//!
//!  * Codes `0..256` are literal bytes, `256` is the first code assigned to a learned string and
//!    later codes are assigned in increasing order.
//!  * Code words start out `MIN_CODESIZE` (9) bits wide and grow up to `MAX_CODESIZE` (20).
//!  * Before writing a code that does not fit below the all-ones value of the current width, the
//!    encoder writes that all-ones value as a signal and widens by one bit. This may repeat.
//!  * Each code word is written least significant byte first, followed by the remaining high
//!    bits. Bits are packed into bytes most significant bit first and the stream is zero padded
//!    to a full byte at the end.
//!  * There is no clear code. Once `MAX_CODES` codes exist the dictionary stops growing.
//!
//! Examplary use of the encoder:
//!
//! ```
//! use adlzw::{encode::Encoder, LzwStatus};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let mut compressed = vec![];
//!
//! let mut enc = Encoder::new();
//! let result = enc.into_stream(&mut compressed).encode_all(&data[..]);
//! assert!(matches!(result.status, Ok(LzwStatus::Done)));
//! ```
#![no_std]
#![forbid(unsafe_code)]
#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

/// The width of the first code words.
pub const MIN_CODESIZE: u8 = 9;
/// The widest code word ever written.
pub const MAX_CODESIZE: u8 = 20;
/// The first code assigned to a learned string.
pub const FIRST_CODE: Code = 1 << 8;
/// The number of codes available, literals included.
pub const MAX_CODES: Code = 1 << MAX_CODESIZE;

/// Alias for a LZW code point
pub type Code = u32;

/// The data structure used for the string dictionary.
///
/// Both produce the exact same output, they only differ in their performance characteristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// An unbalanced binary search tree ordered by the packed `(prefix, suffix)` key.
    ///
    /// Lookups degrade to linear time when strings are learned in key order.
    Tree,
    /// A hash map keyed by the packed `(prefix, suffix)` key.
    #[cfg(feature = "std")]
    Hashed,
}

impl Default for Strategy {
    #[cfg(feature = "std")]
    fn default() -> Self {
        Strategy::Hashed
    }

    #[cfg(not(feature = "std"))]
    fn default() -> Self {
        Strategy::Tree
    }
}

/// The result of a coding operation on a pair of buffer.
#[must_use = "Contains a status with potential error information"]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the write call.
    pub status: Result<LzwStatus, LzwError>,
}

/// The result of encoding a whole reader into a writer.
#[cfg(feature = "std")]
#[must_use = "Contains a status with potential error information"]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The final status, either `Done` or `Empty` on success.
    pub status: std::io::Result<LzwStatus>,
}

/// The status after successful coding of an LZW stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// The input was processed normally.
    Ok,
    /// There was no input to process and no output to flush.
    ///
    /// Either the output buffer has no room left or no more input was supplied before calling
    /// [`Encoder::finish`](encode::Encoder::finish).
    NoProgress,
    /// The stream was ended and all code words have been written.
    Done,
    /// The stream was ended before any byte was consumed. Nothing was written.
    Empty,
}

/// The error kind after unsuccessful coding of an LZW stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwError {
    /// Memory for a new dictionary entry could not be reserved.
    ///
    /// The encoder can not continue after this error.
    OutOfMemory,
}

impl fmt::Display for LzwError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LzwError::OutOfMemory => f.write_str("could not allocate a dictionary entry"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LzwError {}

#[cfg(feature = "std")]
impl From<LzwError> for std::io::Error {
    fn from(err: LzwError) -> Self {
        let kind = match err {
            LzwError::OutOfMemory => std::io::ErrorKind::OutOfMemory,
        };
        std::io::Error::new(kind, err)
    }
}

#[cfg(feature = "alloc")]
mod dict;
#[cfg(feature = "alloc")]
mod key;
#[cfg(feature = "alloc")]
pub mod encode;
#[cfg(feature = "async")]
mod encode_into_async;

#[cfg(feature = "alloc")]
pub use crate::encode::Encoder;
#[cfg(feature = "async")]
pub use crate::encode_into_async::IntoAsync;
