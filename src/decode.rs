//! Conversion of downloaded bytes into text

use encoding_rs::{Encoding, UTF_8};

use crate::error::FetchError;

/// Decode a response body into text.
///
/// The encoding is, in this order of preference:
/// * the one given by a byte order mark at the start of `bytes`
/// * the `charset` parameter of the `Content-Type` header
/// * UTF-8
///
/// Malformed input is an error, it is never silently replaced.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, FetchError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
        None => (content_type.and_then(declared_encoding).unwrap_or(UTF_8), bytes),
    };

    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => Ok(text.into_owned()),
        None => Err(FetchError::Decode(format!("body is not valid {}", encoding.name()))),
    }
}

/// Extract the encoding from a `Content-Type` value such as `text/calendar; charset="ISO-8859-1"`
fn declared_encoding(content_type: &str) -> Option<&'static Encoding> {
    let label = content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"'))?;

    let encoding = Encoding::for_label(label.as_bytes());
    if encoding.is_none() {
        log::debug!("Unknown charset {:?}, falling back to UTF-8", label);
    }
    encoding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_by_default() {
        let text = decode_body("calendar data é".as_bytes(), None).unwrap();
        assert_eq!(text, "calendar data é");

        let text = decode_body(b"calendar data", Some("application/octet-stream")).unwrap();
        assert_eq!(text, "calendar data");
    }

    #[test]
    fn declared_charset() {
        // "é" in Latin-1
        let bytes = b"caf\xe9";
        assert_eq!(decode_body(bytes, Some("text/calendar; charset=ISO-8859-1")).unwrap(), "café");
        assert_eq!(decode_body(bytes, Some("text/calendar;Charset=\"latin1\"")).unwrap(), "café");
        assert!(decode_body(bytes, Some("text/calendar")).is_err());
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let text = decode_body(b"BEGIN:VCALENDAR", Some("text/calendar; charset=klingon")).unwrap();
        assert_eq!(text, "BEGIN:VCALENDAR");
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_body(&bytes, Some("text/calendar; charset=utf-8")).unwrap(), "hi");

        let bytes = b"\xEF\xBB\xBFBEGIN:VCALENDAR";
        assert_eq!(decode_body(bytes, None).unwrap(), "BEGIN:VCALENDAR");
    }

    #[test]
    fn malformed_input_is_an_error() {
        match decode_body(b"calendar \xc3\x28 data", Some("text/calendar; charset=utf-8")) {
            Err(FetchError::Decode(msg)) => assert!(msg.contains("UTF-8")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
