//! LanMan password encoding on operating systems other than Windows.
//!
//! There is no system ANSI code page to consult here, so the uppercased password is passed on as
//! its UTF-8 bytes. ASCII passwords, the only ones LanMan was ever specified for, come out the
//! same on every platform.


/// Encodes the (already uppercased) password for the 14-byte LanMan buffer.
pub fn encode_ansi(text: &str) -> Option<Vec<u8>> {
    Some(text.as_bytes().to_vec())
}
