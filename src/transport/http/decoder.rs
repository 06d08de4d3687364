use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::transport::error::TransportError;

const BOM: char = '\u{feff}';

/// Incremental UTF-8 decoder for an unframed text body.
///
/// A multi-byte sequence split across two chunks is held back until the rest
/// arrives. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
    started: bool,
}

impl Utf8ChunkDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            started: false,
        }
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));

                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + len);
                        }
                        // incomplete tail, wait for the next chunk
                        None => {
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }

        self.strip_bom(out)
    }

    /// Flushes whatever is still buffered once the body has ended.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.strip_bom(tail)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn strip_bom(&mut self, text: String) -> String {
        if self.started || text.is_empty() {
            return text;
        }
        self.started = true;
        match text.strip_prefix(BOM) {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }

    /// Turns a byte stream into a stream of decoded text chunks.
    ///
    /// Chunks that decode to nothing (a lone lead byte, say) are skipped. A
    /// read error ends the stream after yielding it.
    pub fn decode_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, TransportError>>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        stream::unfold(Some((byte_stream, Self::new())), |state| async move {
            let (mut inner, mut decoder) = state?;
            loop {
                match inner.next().await {
                    Some(Ok(bytes)) => {
                        let text = decoder.decode(&bytes);
                        if !text.is_empty() {
                            return Some((Ok(text), Some((inner, decoder))));
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(TransportError::Stream(e.to_string())), None));
                    }
                    None => {
                        let tail = decoder.finish();
                        return if tail.is_empty() {
                            None
                        } else {
                            Some((Ok(tail), None))
                        };
                    }
                }
            }
        })
    }
}
