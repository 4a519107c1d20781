//! Fixed-capacity text fields.
//!
//! Payload strings occupy a fixed byte width on the wire: content bytes,
//! then zero padding, with the final byte always NUL. In memory they are a
//! capacity-checked `String` wrapper, so callers never handle raw byte
//! arrays or manual padding.

use bytes::{Buf, BufMut};

/// Text with a fixed wire width of `N` bytes.
///
/// Content is truncated to at most `N - 1` bytes (on a UTF-8 character
/// boundary) so the encoded field is always NUL-terminated. Overflow is
/// silently discarded, matching the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundedText<const N: usize>(String);

impl<const N: usize> BoundedText<N> {
    /// Create a field from arbitrary text, truncating to fit.
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(N - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self(text[..end].to_owned())
    }

    /// Wire width of this field in bytes.
    pub const fn capacity() -> usize {
        N
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append exactly `N` bytes: the content followed by zero padding.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(self.0.as_bytes());
        buf.put_bytes(0, N - self.0.len());
    }

    /// Consume `N` bytes from `buf` and take the text up to the first NUL.
    /// Non-UTF-8 content is replaced rather than rejected; the reading side
    /// treats these fields as display text, not as keys.
    ///
    /// Callers must ensure `buf` holds at least `N` remaining bytes.
    pub fn decode_from<B: Buf>(buf: &mut B) -> Self {
        let mut raw = vec![0u8; N];
        buf.copy_to_slice(&mut raw);

        let end = raw.iter().position(|&b| b == 0).unwrap_or(N);
        Self(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

impl<const N: usize> std::fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn short_text_is_zero_padded() {
        let field: BoundedText<8> = BoundedText::new("abc");
        let mut buf = BytesMut::new();
        field.encode_into(&mut buf);
        assert_eq!(&buf[..], b"abc\0\0\0\0\0");
    }

    #[test]
    fn overflow_is_truncated_and_nul_terminated() {
        let field: BoundedText<4> = BoundedText::new("abcdef");
        assert_eq!(field.as_str(), "abc");

        let mut buf = BytesMut::new();
        field.encode_into(&mut buf);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf[3], 0, "last byte must stay NUL");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Four-byte emoji straddling the three usable bytes of the field.
        let field: BoundedText<4> = BoundedText::new("a💐");
        assert_eq!(field.as_str(), "a");
    }

    #[test]
    fn roundtrip_recovers_text() {
        let field: BoundedText<16> = BoundedText::new("admin");
        let mut buf = BytesMut::new();
        field.encode_into(&mut buf);

        let mut cur = buf.freeze();
        let decoded: BoundedText<16> = BoundedText::decode_from(&mut cur);
        assert_eq!(decoded.as_str(), "admin");
    }

    #[test]
    fn decode_stops_at_first_nul() {
        let raw = *b"user\0garbage\0\0\0\0";
        let mut cur = &raw[..];
        let decoded: BoundedText<16> = BoundedText::decode_from(&mut cur);
        assert_eq!(decoded.as_str(), "user");
    }
}
