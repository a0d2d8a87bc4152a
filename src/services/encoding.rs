use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    /// WHATWG label of the encoding that was used.
    pub encoding: &'static str,
    pub had_errors: bool,
}

/// Decodes a dataset file of unknown encoding.
///
/// A BOM wins. Otherwise valid UTF-8 is taken as is, and anything else goes
/// through statistical detection (exports from spreadsheet tools are often
/// windows-1252 or Shift_JIS).
pub fn decode(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return finish(text, encoding, had_errors);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded {
            text: text.to_string(),
            encoding: UTF_8.name(),
            had_errors: false,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    finish(text, encoding, had_errors)
}

fn finish(text: Cow<'_, str>, encoding: &'static Encoding, had_errors: bool) -> Decoded {
    Decoded {
        text: text.into_owned(),
        encoding: encoding.name(),
        had_errors,
    }
}
