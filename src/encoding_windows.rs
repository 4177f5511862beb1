//! LanMan password encoding on Windows.
//!
//! Windows clients encode the uppercased LanMan password using the configured ANSI code page. We
//! ask the operating system for the same conversion so that hashes match the ones a native client
//! would produce. Characters without a representation in the code page make the conversion fail
//! instead of being replaced by a default character, since a substituted password would hash to
//! something the user never typed.


use windows::Win32::Foundation::BOOL;
use windows::Win32::Globalization::{CP_ACP, WC_NO_BEST_FIT_CHARS, WideCharToMultiByte};


/// Encodes the (already uppercased) password for the 14-byte LanMan buffer.
pub fn encode_ansi(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return Some(Vec::new());
    }

    let wide: Vec<u16> = text.encode_utf16().collect();

    // first pass: size of the ANSI representation
    let required = unsafe {
        WideCharToMultiByte(
            CP_ACP,
            WC_NO_BEST_FIT_CHARS,
            &wide,
            None,
            None,
            None,
        )
    };
    let required: usize = required.try_into().ok()?;
    if required == 0 {
        return None;
    }

    // second pass: the conversion proper
    let mut ansi = vec![0u8; required];
    let mut used_default = BOOL(0);
    let written = unsafe {
        WideCharToMultiByte(
            CP_ACP,
            WC_NO_BEST_FIT_CHARS,
            &wide,
            Some(ansi.as_mut_slice()),
            None,
            Some(&mut used_default as *mut BOOL),
        )
    };
    if used_default.as_bool() {
        return None;
    }
    let written: usize = written.try_into().ok()?;
    if written == 0 {
        return None;
    }
    ansi.truncate(written);

    Some(ansi)
}
