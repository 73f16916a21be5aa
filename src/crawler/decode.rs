//! Response body decoding
//!
//! Turns raw response bytes into text before extraction. The encoding is
//! picked from a byte order mark, then the `charset` parameter of the
//! Content-Type header, and falls back to UTF-8.

use crate::{ExtractError, ExtractResult};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

/// Decodes `bytes` using the encoding they declare
///
/// Malformed input is an error rather than being patched with replacement
/// characters: such a body is not parseable markup.
pub fn decode_markup<'a>(
    bytes: &'a [u8],
    content_type: Option<&str>,
) -> ExtractResult<Cow<'a, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
        None => {
            let declared = content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()));
            (declared.unwrap_or(UTF_8), bytes)
        }
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| ExtractError::Encoding {
            charset: encoding.name().to_string(),
        })
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]))
    })
}
