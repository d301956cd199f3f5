//! Thin wrapper around `base64`'s 0.21 `Engine` API so call sites read like
//! the old free-function form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn encode(input: impl AsRef<[u8]>) -> String {
    STANDARD.encode(input)
}

pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(input)
}
