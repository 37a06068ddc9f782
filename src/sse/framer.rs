//! Byte-to-line framing.
//!
//! [`LineFramer`] turns an ordered sequence of byte chunks into complete
//! text lines. Chunk boundaries may fall anywhere, including inside a
//! multi-byte UTF-8 character; the incomplete tail is carried over to the
//! next chunk instead of being corrupted.
//!
//! A trailing line without a `\n` terminator is never yielded. When the
//! stream ends, whatever is still buffered is dropped and its size reported
//! by [`LineFramer::finish`].

/// Incremental line framer over raw bytes.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Decoded text not yet terminated by a newline
    buffer: String,
    /// Incomplete UTF-8 sequence carried from the previous chunk (at most 3 bytes)
    carry: Vec<u8>,
}

impl LineFramer {
    /// Create a new, empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, in order.
    ///
    /// Returned lines do not include the `\n`. A `\r` before the newline is
    /// left in place for the decoder to trim.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        decode_utf8_incremental(&mut self.carry, chunk, &mut self.buffer);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete[..complete.len() - 1]
            .split('\n')
            .map(str::to_string)
            .collect()
    }

    /// Text buffered after the last newline
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// End of stream: discard any unterminated tail.
    ///
    /// Returns the number of bytes dropped (buffered text plus carried
    /// partial character). The framer is empty afterwards and can be reused.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len() + self.carry.len();
        self.buffer.clear();
        self.carry.clear();
        dropped
    }
}

/// Decode `chunk` (prefixed by any carried bytes) into `out`.
///
/// An incomplete sequence at the end is stored back into `carry`. Bytes that
/// can never form a valid character are replaced with U+FFFD.
fn decode_utf8_incremental(carry: &mut Vec<u8>, chunk: &[u8], out: &mut String) {
    let joined;
    let mut input: &[u8] = if carry.is_empty() {
        chunk
    } else {
        let mut bytes = std::mem::take(carry);
        bytes.extend_from_slice(chunk);
        joined = bytes;
        &joined
    };

    loop {
        match std::str::from_utf8(input) {
            Ok(text) => {
                out.push_str(text);
                carry.clear();
                return;
            }
            Err(e) => {
                let (valid, tail) = input.split_at(e.valid_up_to());
                if let Ok(text) = std::str::from_utf8(valid) {
                    out.push_str(text);
                }
                match e.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        input = &tail[bad..];
                    }
                    None => {
                        *carry = tail.to_vec();
                        return;
                    }
                }
            }
        }
    }
}
