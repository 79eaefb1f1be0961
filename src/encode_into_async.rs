use crate::alloc::{vec, vec::Vec};
use crate::encode::Encoder;
use crate::{AllResult, LzwStatus};
use std::io;

/// A encoding sink into an asynchronous writer.
///
/// See [`Encoder::into_async`] on how to create this type.
///
/// [`Encoder::into_async`]: encode/struct.Encoder.html#method.into_async
pub struct IntoAsync<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
    buffer_size: usize,
}

impl<'d, W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'d, W> {
    pub(crate) fn new(encoder: &'d mut Encoder, writer: W) -> Self {
        IntoAsync {
            encoder,
            writer,
            buffer_size: 1 << 18,
        }
    }

    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not write the final code after all data has
    /// been processed.
    pub async fn encode(&mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        self.encode_part(read, false).await
    }

    /// Encode data from a reader and end the stream.
    pub async fn encode_all(mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        self.encode_part(read, true).await
    }

    /// Set the size of the intermediate encode buffer.
    ///
    /// # Panics
    /// This method panics if `size` is `0`.
    pub fn set_buffer_size(&mut self, size: usize) {
        assert_ne!(size, 0, "Attempted to set empty buffer");
        self.buffer_size = size;
    }

    async fn encode_part(
        &mut self,
        read: impl futures::io::AsyncBufRead,
        finish: bool,
    ) -> AllResult {
        use futures::io::{AsyncBufReadExt, AsyncWriteExt};

        let IntoAsync {
            encoder,
            writer,
            buffer_size,
        } = self;

        futures::pin_mut!(read);
        let mut bytes_read = 0;
        let mut bytes_written = 0;
        let mut outbuf: Vec<u8> = vec![0; *buffer_size];

        let status = loop {
            let data = match read.fill_buf().await {
                Ok(data) => data,
                Err(err) => break Err(err),
            };

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    break Ok(LzwStatus::Ok);
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            bytes_read += result.consumed_in;
            bytes_written += result.consumed_out;
            read.as_mut().consume(result.consumed_in);

            if let Err(err) = writer.write_all(&outbuf[..result.consumed_out]).await {
                break Err(err);
            }

            match result.status {
                Ok(status @ LzwStatus::Done) | Ok(status @ LzwStatus::Empty) => break Ok(status),
                Ok(LzwStatus::NoProgress) => {
                    break Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "encoder made no progress",
                    ))
                }
                Ok(LzwStatus::Ok) => {}
                Err(err) => break Err(err.into()),
            }
        };

        let flushed = writer.flush().await;
        let status = status.and_then(|status| flushed.map(|()| status));

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}
