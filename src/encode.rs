//! A module for all encoding needs.
use crate::alloc::boxed::Box;
#[cfg(feature = "std")]
use crate::dict::HashTable;
use crate::dict::{Dictionary, Entry, Lookup, Tree};
use crate::{Code, LzwError, LzwStatus, Strategy, StreamResult};
use crate::{FIRST_CODE, MAX_CODES, MAX_CODESIZE, MIN_CODESIZE};

#[cfg(feature = "std")]
use crate::alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use crate::AllResult;
#[cfg(feature = "std")]
use std::io::{self, BufRead, Write};

/// The state for encoding data with an adaptive-width LZW algorithm.
///
/// The same structure can be utilized with streams as well as your own buffers and driver logic.
/// It may even be possible to mix them if you are sufficiently careful not to lose any written
/// data in the process.
pub struct Encoder {
    state: Box<dyn Stateful + Send + 'static>,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
    buffer_size: usize,
}

trait Stateful {
    fn advance(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult;
    fn mark_ended(&mut self) -> bool;
    fn code_size(&self) -> u8;
    fn next_code(&self) -> Code;
    fn dictionary_len(&self) -> usize;
    fn is_dictionary_full(&self) -> bool;
}

struct EncodeState<D: Dictionary> {
    /// The strings learned so far.
    dict: D,
    /// Where we are in the stream.
    phase: Phase,
    /// If the caller signalled the end of input.
    has_ended: bool,
    /// The code corresponding to the currently read characters.
    current_code: Code,
    /// The code the next learned string gets.
    next_code: Code,
    /// A code that must still be written, possibly after widening the code size.
    pending: Option<Code>,
    /// If running out of codes has been logged.
    reported_full: bool,
    /// The bit buffer for encoding.
    buffer: MsbBuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// No byte was read yet.
    Start,
    /// The current code is the longest known match of the bytes read since the last code.
    Matching,
    /// The last code has been queued.
    Flushing,
    /// All codes are buffered and padded, only bytes remain.
    Done,
    /// The input ended before its first byte.
    Empty,
}

/// Packs code words into bytes, most significant bit first.
///
/// Each code is split into its least significant byte followed by the remaining high bits, so
/// that the stream does not depend on the host byte order.
struct MsbBuffer {
    /// The current code length.
    code_size: u8,
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

impl Encoder {
    /// Create a new encoder with the default dictionary.
    pub fn new() -> Self {
        Self::with_strategy(Strategy::default())
    }

    /// Create a new encoder with the chosen dictionary structure.
    ///
    /// The output does not depend on the strategy.
    pub fn with_strategy(strategy: Strategy) -> Self {
        type Boxed = Box<dyn Stateful + Send + 'static>;
        let state = match strategy {
            Strategy::Tree => Box::new(EncodeState::<Tree>::new()) as Boxed,
            #[cfg(feature = "std")]
            Strategy::Hashed => Box::new(EncodeState::<HashTable>::new()) as Boxed,
        };

        Encoder { state }
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// See [`into_stream`] for high-level functions (this interface is only available with the
    /// `std` feature) and [`finish`] for marking the input data as complete.
    ///
    /// When some input byte is consumed, a code may be buffered internally and the output may
    /// only be written once more input arrives. After the end has been marked, the final code is
    /// written together with the padding of the last byte and the status becomes `Done`. If no
    /// byte was ever consumed it becomes `Empty` instead and nothing is written.
    ///
    /// An error is only returned when a new dictionary entry could not be allocated. The encoder
    /// should not be used afterwards.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Construct a encoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
            buffer_size: 1 << 18,
        }
    }

    /// Construct a encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::AsyncWrite + core::marker::Unpin>(
        &mut self,
        writer: W,
    ) -> crate::encode_into_async::IntoAsync<'_, W> {
        crate::encode_into_async::IntoAsync::new(self, writer)
    }

    /// Mark the encoding as in the process of finishing.
    ///
    /// The next following call to `encode_bytes` which is able to consume the complete input will
    /// also try to emit the final code. It's not recommended, but also not unsound, to use
    /// different byte slices in different calls from this point forward.
    pub fn finish(&mut self) {
        self.state.mark_ended();
    }

    /// The width in bits of the next code word.
    pub fn code_size(&self) -> u8 {
        self.state.code_size()
    }

    /// The code that the next learned string will be assigned.
    pub fn next_code(&self) -> Code {
        self.state.next_code()
    }

    /// The number of learned strings of two or more bytes.
    pub fn dictionary_len(&self) -> usize {
        self.state.dictionary_len()
    }

    /// If all `MAX_CODES` codes are taken and no more strings are learned.
    pub fn is_dictionary_full(&self) -> bool {
        self.state.is_dictionary_full()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

#[cfg(feature = "std")]
impl<'d, W: Write> IntoStream<'d, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not write the final code after all data has
    /// been processed, more data may follow in another call.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, false)
    }

    /// Encode data from a reader and end the stream.
    ///
    /// On success the status is `Done`, or `Empty` if the encoder never saw a byte.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, true)
    }

    /// Set the size of the intermediate encode buffer.
    ///
    /// A buffer of this size is allocated by every encoding call to hold one part of the encoded
    /// stream before it is handed to the writer.
    ///
    /// # Panics
    /// This method panics if `size` is `0`.
    pub fn set_buffer_size(&mut self, size: usize) {
        assert_ne!(size, 0, "Attempted to set empty buffer");
        self.buffer_size = size;
    }

    fn encode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream {
            encoder,
            writer,
            buffer_size,
        } = self;

        enum Progress {
            Ok,
            Done(LzwStatus),
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;
        let mut outbuf: Vec<u8> = vec![0; *buffer_size];

        let mut once = || -> io::Result<Progress> {
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    return Ok(Progress::Done(LzwStatus::Ok));
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            bytes_read += result.consumed_in;
            bytes_written += result.consumed_out;
            read.consume(result.consumed_in);

            writer.write_all(&outbuf[..result.consumed_out])?;

            match result.status? {
                status @ LzwStatus::Done | status @ LzwStatus::Empty => {
                    Ok(Progress::Done(status))
                }
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "encoder made no progress",
                )),
                LzwStatus::Ok => Ok(Progress::Ok),
            }
        };

        let status = loop {
            match once() {
                Ok(Progress::Ok) => {}
                Ok(Progress::Done(status)) => break Ok(status),
                Err(err) => break Err(err),
            }
        };

        // The writer is flushed in every case, a failed flush only matters if nothing else did.
        let flushed = writer.flush();
        let status = status.and_then(|status| flushed.map(|()| status));

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl<D: Dictionary + Default> EncodeState<D> {
    fn new() -> Self {
        EncodeState {
            dict: D::default(),
            phase: Phase::Start,
            has_ended: false,
            current_code: 0,
            next_code: FIRST_CODE,
            pending: None,
            reported_full: false,
            buffer: MsbBuffer::new(),
        }
    }
}

impl<D: Dictionary + Default> Stateful for EncodeState<D> {
    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        loop {
            if self.buffer.push_out(&mut out) {
                break;
            }

            if let Some(code) = self.pending {
                self.write_pending(code);
                continue;
            }

            match self.phase {
                Phase::Start => match inp.split_first() {
                    Some((&byte, rest)) => {
                        inp = rest;
                        self.current_code = Code::from(byte);
                        self.phase = Phase::Matching;
                    }
                    None if self.has_ended => {
                        self.release();
                        self.phase = Phase::Empty;
                    }
                    None => break,
                },
                Phase::Matching => match inp.split_first() {
                    Some((&byte, rest)) => {
                        if let Err(err) = self.step(byte) {
                            self.release();
                            status = Err(err);
                            break;
                        }
                        inp = rest;
                    }
                    None if self.has_ended => {
                        // The last code is known, nothing is learned from here on.
                        self.release();
                        self.pending = Some(self.current_code);
                        self.phase = Phase::Flushing;
                    }
                    None => break,
                },
                Phase::Flushing => {
                    self.buffer.buffer_pad();
                    self.phase = Phase::Done;
                }
                Phase::Done | Phase::Empty => break,
            }
        }

        match self.phase {
            Phase::Done => {
                if !self.buffer.flush_out(&mut out) {
                    status = Ok(LzwStatus::Done);
                }
            }
            Phase::Empty => status = Ok(LzwStatus::Empty),
            _ => {}
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        if let Ok(LzwStatus::Ok) = status {
            if consumed_in == 0 && consumed_out == 0 {
                status = Ok(LzwStatus::NoProgress);
            }
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    fn mark_ended(&mut self) -> bool {
        core::mem::replace(&mut self.has_ended, true)
    }

    fn code_size(&self) -> u8 {
        self.buffer.code_size
    }

    fn next_code(&self) -> Code {
        self.next_code
    }

    fn dictionary_len(&self) -> usize {
        (self.next_code - FIRST_CODE) as usize
    }

    fn is_dictionary_full(&self) -> bool {
        self.next_code >= MAX_CODES
    }
}

impl<D: Dictionary + Default> EncodeState<D> {
    /// Drop all learned strings.
    fn release(&mut self) {
        log::debug!("releasing {} learned strings", self.dict.len());
        self.dict = D::default();
    }

    /// Extend the current match by one byte.
    ///
    /// When the extended string is unknown it is learned, the code for the match so far is
    /// queued and the byte starts a new match.
    fn step(&mut self, byte: u8) -> Result<(), LzwError> {
        match self.dict.find(self.current_code, byte) {
            Lookup::Hit(code) => self.current_code = code,
            Lookup::Miss(slot) => {
                self.learn(slot, byte)?;
                self.pending = Some(self.current_code);
                self.current_code = Code::from(byte);
            }
        }

        Ok(())
    }

    fn learn(&mut self, slot: D::Slot, byte: u8) -> Result<(), LzwError> {
        if self.next_code >= MAX_CODES {
            if !self.reported_full {
                log::warn!("dictionary full, no more strings are learned");
                self.reported_full = true;
            }
            return Ok(());
        }

        self.dict.insert(
            slot,
            Entry {
                code: self.next_code,
                prefix: self.current_code,
                suffix: byte,
            },
        )?;
        self.next_code += 1;
        Ok(())
    }

    /// Write one code word for `code`.
    ///
    /// This is the widening signal if `code` collides with or exceeds the all-ones value of the
    /// current size. Then `code` stays pending for the next call.
    fn write_pending(&mut self, code: Code) {
        let signal = self.buffer.max_code();
        if code >= signal && self.buffer.code_size < MAX_CODESIZE {
            self.buffer.buffer_code(signal);
            self.buffer.bump_code_size();
            log::debug!("code size increased to {} bits", self.buffer.code_size);
        } else {
            self.buffer.buffer_code(code);
            self.pending = None;
        }
    }
}

impl MsbBuffer {
    fn new() -> Self {
        MsbBuffer {
            code_size: MIN_CODESIZE,
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Insert a code into the buffer.
    fn buffer_code(&mut self, code: Code) {
        debug_assert!(code <= self.max_code());
        let mut bits = code;
        let mut remaining = self.code_size;
        while remaining >= 8 {
            self.buffer_bits(bits & 0xff, 8);
            bits >>= 8;
            remaining -= 8;
        }

        if remaining > 0 {
            self.buffer_bits(bits & ((1 << remaining) - 1), remaining);
        }
    }

    fn buffer_bits(&mut self, bits: Code, count: u8) {
        let shift = 64 - self.bits_in_buffer - count;
        self.buffer |= u64::from(bits) << shift;
        self.bits_in_buffer += count;
    }

    /// Push bytes if there may not be enough space for another code word.
    ///
    /// Returns `true` if that space could not be made.
    fn push_out(&mut self, out: &mut &mut [u8]) -> bool {
        if self.has_room() {
            return false;
        }

        self.flush_out(out);
        !self.has_room()
    }

    /// Flush all full bytes, returning if at least one more byte remains.
    fn flush_out(&mut self, out: &mut &mut [u8]) -> bool {
        let want = usize::from(self.bits_in_buffer / 8);
        let count = want.min((*out).len());
        let (bytes, tail) = core::mem::replace(out, &mut []).split_at_mut(count);
        *out = tail;

        for b in bytes {
            *b = ((self.buffer & 0xff00_0000_0000_0000) >> 56) as u8;
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }

        count < want
    }

    /// Pad the buffer to a full byte.
    fn buffer_pad(&mut self) {
        let to_byte = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += to_byte;
    }

    fn has_room(&self) -> bool {
        self.bits_in_buffer + MAX_CODESIZE <= 64
    }

    fn bump_code_size(&mut self) {
        self.code_size += 1;
    }

    /// The all-ones code of the current code size.
    fn max_code(&self) -> Code {
        (1 << self.code_size) - 1
    }
}
