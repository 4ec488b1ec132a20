//! Incremental UTF-8 decoding of a chunked byte stream.

/// Decodes byte chunks that may split multi-byte characters.
///
/// Incomplete trailing sequences are held until the next chunk; invalid
/// bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus held bytes) as possible.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush held bytes at end of stream.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::Utf8StreamDecoder;
    use pretty_assertions::assert_eq;

    #[test]
    fn ascii_passes_through() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"Prof"), "Prof");
        assert_eq!(decoder.push(b" X"), " X");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn split_sequence_waits_for_completion() {
        let bytes = "café ★".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();
        // 'é' is bytes 3..5, '★' is 6..9
        assert_eq!(decoder.push(&bytes[..4]), "caf");
        assert_eq!(decoder.push(&bytes[4..7]), "é ");
        assert_eq!(decoder.push(&bytes[7..8]), "");
        assert_eq!(decoder.push(&bytes[8..]), "★");
    }

    #[test]
    fn every_split_point_reassembles() {
        let text = "Größe 🎓 ok";
        let bytes = text.as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = Utf8StreamDecoder::new();
            let mut out = decoder.push(&bytes[..split]);
            out.push_str(&decoder.push(&bytes[split..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, text, "split at {split}");
        }
    }

    #[test]
    fn invalid_bytes_become_replacement() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn dangling_bytes_flush_lossily() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"x\xE2\x98"), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
