//! Byte-to-text decoding for page markup read from disk or the network.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::Regex;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).unwrap()
});

/// Find the encoding label declared by a `<meta charset>` (or
/// `http-equiv` content-type) tag near the start of the page.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(1024)];
    let caps = META_CHARSET_RE.captures(head)?;
    std::str::from_utf8(caps.get(1)?.as_bytes()).ok()
}

/// Decode bytes to a string, handling various encodings.
///
/// 1. UTF-8 (a BOM is honoured and stripped by `encoding_rs`)
/// 2. the hint encoding, or failing that the page's `<meta charset>`
/// 3. Windows-1252, a superset of ISO-8859-1
///
/// Returns `Cow::Borrowed` when the input is already valid UTF-8 without a BOM.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let label = hint_encoding.or_else(|| sniff_meta_charset(bytes));
    if let Some(name) = label
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}
