use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use pagecatch_logging::{catch_debug, catch_warn};

/// Charset parameter of a `Content-Type` value: the text after the last
/// `charset=`, without quotes or trailing parameters.
pub fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_ascii_lowercase();
    let start = lower.rfind("charset=")? + "charset=".len();
    let value = content_type[start..]
        .split(';')
        .next()
        .unwrap_or_default()
        .trim_matches([' ', '"', '\''].as_ref());
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Pick the encoding for a payload: declared charset -> chardetng -> UTF-8.
///
/// A declared label that names no known encoding resolves to UTF-8.
pub fn resolve_encoding(bytes: &[u8], declared: Option<&str>) -> &'static Encoding {
    if let Some(label) = declared.map(str::trim).filter(|l| !l.is_empty()) {
        return match Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc,
            None => {
                catch_warn!("Unknown charset {label:?}, decoding as UTF-8");
                UTF_8
            }
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(None, true);
    catch_debug!("Detected encoding {}", guessed.name());
    guessed
}

/// Decode a payload into text. Malformed sequences become U+FFFD; this never fails.
pub fn decode_document(bytes: &[u8], declared: Option<&str>) -> (String, &'static Encoding) {
    let encoding = resolve_encoding(bytes, declared);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        catch_debug!("Replaced malformed {} sequences while decoding", used.name());
    }
    (text.into_owned(), used)
}
