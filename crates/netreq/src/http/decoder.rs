//! Response payload decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Content-type prefixes whose payloads are exposed as base64 instead of text.
pub const BINARY_CONTENT_PREFIXES: [&str; 4] =
    ["image/", "audio/", "video/", "application/octet-stream"];

/// The two string forms of a response payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedResponse {
    /// Raw form: base64 for binary payloads, UTF-8 text otherwise.
    pub raw: String,
    /// Text form. Identical to `raw`; binary payloads are never exposed as text.
    pub text: String,
}

/// Whether a content type denotes a binary payload.
pub fn is_binary_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim_start().to_ascii_lowercase();
    BINARY_CONTENT_PREFIXES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

/// Decode a response body according to its content type.
///
/// Binary payloads become base64; everything else is decoded as UTF-8 with
/// invalid sequences replaced by U+FFFD. Both output fields always hold the
/// same string.
pub fn decode_response(bytes: &[u8], content_type: &str) -> DecodedResponse {
    let decoded = if is_binary_content_type(content_type) {
        STANDARD.encode(bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    DecodedResponse {
        raw: decoded.clone(),
        text: decoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_payload_is_base64() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let decoded = decode_response(&png, "image/png");

        assert_eq!(decoded.raw, decoded.text);
        assert_eq!(STANDARD.decode(&decoded.raw).unwrap(), png);
    }

    #[test]
    fn test_text_payload_is_utf8() {
        let decoded = decode_response("grüße".as_bytes(), "text/plain");
        assert_eq!(decoded.raw, "grüße");
        assert_eq!(decoded.text, "grüße");
    }

    #[test]
    fn test_empty_content_type_is_text() {
        let decoded = decode_response(b"{\"ok\":true}", "");
        assert_eq!(decoded.text, "{\"ok\":true}");
    }

    #[test]
    fn test_content_type_prefix_is_case_insensitive() {
        assert!(is_binary_content_type("Image/JPEG"));
        assert!(is_binary_content_type("application/octet-stream"));
        assert!(is_binary_content_type("video/mp4; codecs=avc1"));
        assert!(!is_binary_content_type("application/json"));
        assert!(!is_binary_content_type("text/html; charset=utf-8"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let decoded = decode_response(&[b'o', b'k', 0xff], "text/plain");
        assert_eq!(decoded.text, "ok\u{fffd}");
    }

    #[test]
    fn test_empty_binary_payload() {
        let decoded = decode_response(&[], "image/gif");
        assert_eq!(decoded, DecodedResponse::default());
    }
}
