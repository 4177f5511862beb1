//! LanMan and NTLMv1 challenge-response password hashing for Rust.
//!
//! Given a plaintext password and the 8-byte challenge issued by the authenticating peer, this
//! crate computes the values exchanged by the legacy LanMan/NTLMv1 family of protocols to prove
//! knowledge of the password without transmitting it. All functions are pure: they allocate their
//! own buffers and cipher states, so they can be called from any number of threads at once.
//!
//! Sample usage:
//! ```
//! use base64::prelude::{BASE64_STANDARD, Engine};
//! use lmhash::Algorithm;
//!
//! // the server picks a fresh challenge for every authentication attempt
//! let challenge = lmhash::generate_challenge();
//!
//! // the client answers it
//! let ntlm_response = lmhash::encrypt_password("SecREt01", &challenge, Algorithm::NtlmV1)
//!     .expect("failed to compute NTLMv1 response");
//! assert_eq!(ntlm_response.len(), 24);
//!
//! // both sides can derive the same session key
//! let session_key = lmhash::derive_session_key("SecREt01", &challenge, Algorithm::NtlmV1)
//!     .expect("failed to derive session key");
//! assert_eq!(&session_key[16..], ntlm_response.as_slice());
//!
//! // text-based transports carry the response as base64
//! let response_b64 = BASE64_STANDARD.encode(&ntlm_response);
//! assert_eq!(response_b64.len(), 32);
//!
//! // NTLMv2 is not implemented and says so
//! assert!(lmhash::encrypt_password("SecREt01", &challenge, Algorithm::NtlmV2).is_err());
//! ```


#[cfg(windows)]
mod encoding_windows;

#[cfg(not(windows))]
mod encoding_utf8;


use std::fmt;

use cipher::{BlockEncrypt, KeyInit};
use cipher::generic_array::GenericArray;
use cipher::generic_array::typenum::U8;
use des::Des;
use digest::Digest;
use log::{debug, warn};
use md4::Md4;
use rand::Rng;
use rand::rngs::OsRng;

#[cfg(windows)]
use crate::encoding_windows::encode_ansi;

#[cfg(not(windows))]
use crate::encoding_utf8::encode_ansi;


/// The fixed plaintext encrypted by [`p16`] to obtain the LanMan hash.
pub const LM_SEED: [u8; 8] = *b"KGS!@#$%";

/// Length of a challenge issued by the authenticating peer.
pub const CHALLENGE_LEN: usize = 8;

/// Length of the uppercased, truncated or padded LanMan password buffer.
pub const LM_PASSWORD_LEN: usize = 14;

/// Length of a LanMan or NTLM hash, and of the output of [`p16`].
pub const HASH_LEN: usize = 16;

/// Minimum length of the secret consumed by [`p24`].
pub const P21_LEN: usize = 21;

/// Length of a LanMan or NTLMv1 challenge response.
pub const RESPONSE_LEN: usize = 24;

/// Length of an NTLMv1 session key.
pub const SESSION_KEY_LEN: usize = 40;

/// Number of source bytes consumed by [`generate_key`].
const DES_KEY_SOURCE_LEN: usize = 7;

/// Name returned by [`algorithm_name`] for codes outside the known range.
const UNKNOWN_ALGORITHM_NAME: &str = "Unknown";


/// A password encryption algorithm.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Algorithm {
    /// The LanMan response: DES over the uppercased password, then over the challenge.
    LanMan,

    /// The NTLMv1 response: DES over the MD4 hash of the UTF-16LE password.
    NtlmV1,

    /// NTLMv2. Recognized so that it can be named and rejected; no values are computed for it.
    NtlmV2,

    /// The plain MD4 hash of the UTF-16LE password. Does not involve the challenge.
    Md4,
}
impl Algorithm {
    /// All algorithms, ordered by their numeric code.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::LanMan,
        Algorithm::NtlmV1,
        Algorithm::NtlmV2,
        Algorithm::Md4,
    ];

    /// Returns the numeric code traditionally used to select this algorithm.
    pub fn code(&self) -> i32 {
        match self {
            Self::LanMan => 0,
            Self::NtlmV1 => 1,
            Self::NtlmV2 => 2,
            Self::Md4 => 3,
        }
    }

    /// Returns the display name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LanMan => "LanMan",
            Self::NtlmV1 => "NTLMv1",
            Self::NtlmV2 => "NTLMv2",
            Self::Md4 => "MD4",
        }
    }

    /// Encrypts the password using this algorithm. See [`encrypt_password`].
    pub fn encrypt_password(&self, password: &str, challenge: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        encrypt_password(password, challenge, *self)
    }

    /// Derives a session key using this algorithm. See [`derive_session_key`].
    pub fn derive_session_key(&self, password: &str, challenge: &[u8]) -> Result<[u8; SESSION_KEY_LEN], EncryptionError> {
        derive_session_key(password, challenge, *self)
    }
}
impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl From<Algorithm> for i32 {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.code()
    }
}
impl TryFrom<i32> for Algorithm {
    type Error = EncryptionError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::LanMan),
            1 => Ok(Self::NtlmV1),
            2 => Ok(Self::NtlmV2),
            3 => Ok(Self::Md4),
            other => Err(EncryptionError::UnknownAlgorithm { code: other }),
        }
    }
}


/// An error that may occur while encrypting a password or deriving a session key.
///
/// No operation returns partially computed output alongside an error.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EncryptionError {
    /// A cryptographic primitive could not be constructed.
    PrimitiveUnavailable { primitive: &'static str, reason: String },

    /// The algorithm does not support the requested operation.
    UnsupportedAlgorithm { algorithm: Algorithm, operation: &'static str },

    /// An input has a different length than the operation requires.
    MalformedInput { item: &'static str, expected_len: usize, obtained_len: usize },

    /// A numeric algorithm code does not correspond to a known algorithm.
    UnknownAlgorithm { code: i32 },

    /// The uppercased password cannot be represented in the ANSI code page.
    PasswordNotAnsiEncodable,
}
impl fmt::Display for EncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimitiveUnavailable { primitive, reason }
                => write!(f, "{} is unavailable: {}", primitive, reason),
            Self::UnsupportedAlgorithm { algorithm, operation }
                => write!(f, "{} is not supported by the {} algorithm", operation, algorithm),
            Self::MalformedInput { item, expected_len, obtained_len }
                => write!(f, "malformed {} (expected {} bytes, obtained {})", item, expected_len, obtained_len),
            Self::UnknownAlgorithm { code }
                => write!(f, "unknown algorithm code {}", code),
            Self::PasswordNotAnsiEncodable
                => write!(f, "the password cannot be encoded using the ANSI code page"),
        }
    }
}
impl std::error::Error for EncryptionError {
}


/// The values one side computes to answer a LanMan/NTLMv1 challenge.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ChallengeResponse {
    /// The LanMan response.
    pub lm_response: [u8; RESPONSE_LEN],

    /// The NTLMv1 response.
    pub ntlm_response: [u8; RESPONSE_LEN],

    /// The NTLMv1 session key; its last 24 bytes repeat the NTLMv1 response.
    pub session_key: [u8; SESSION_KEY_LEN],
}


// building blocks


/// Checks that the challenge has exactly the expected length.
fn challenge_block(challenge: &[u8]) -> Result<&[u8; CHALLENGE_LEN], EncryptionError> {
    <&[u8; CHALLENGE_LEN]>::try_from(challenge)
        .map_err(|_| EncryptionError::MalformedInput {
            item: "challenge",
            expected_len: CHALLENGE_LEN,
            obtained_len: challenge.len(),
        })
}

/// Encodes the string as UTF-16 in little-endian byte order without a Byte Order Mark.
fn utf16_le_bytes(string: &str) -> Vec<u8> {
    string.encode_utf16()
        .flat_map(|p| p.to_le_bytes())
        .collect()
}

fn md4_digest(data: &[u8]) -> [u8; HASH_LEN] {
    let mut md4_state = <Md4 as Digest>::new();
    md4_state.update(data);

    let mut ret = [0u8; HASH_LEN];
    ret.copy_from_slice(md4_state.finalize().as_slice());
    ret
}

/// Encrypts a single 8-byte block with DES in ECB mode.
fn des_encrypt_block(key: &[u8; 8], block: &[u8; 8]) -> Result<[u8; 8], EncryptionError> {
    let des_state = Des::new_from_slice(key)
        .map_err(|e| {
            warn!("failed to set up DES key schedule: {}", e);
            EncryptionError::PrimitiveUnavailable {
                primitive: "DES",
                reason: e.to_string(),
            }
        })?;

    let mut buf: GenericArray<u8, U8> = GenericArray::from(*block);
    des_state.encrypt_block(&mut buf);

    let mut ret = [0u8; 8];
    ret.copy_from_slice(buf.as_slice());
    Ok(ret)
}

/// Zero-pads a 16-byte hash to the 21 bytes consumed by [`p24`].
fn pad_to_p21(hash: &[u8; HASH_LEN]) -> [u8; P21_LEN] {
    let mut p21 = [0u8; P21_LEN];
    p21[..HASH_LEN].copy_from_slice(hash);
    p21
}


/// Expands the 7 bytes at `offset` of `source` into an 8-byte DES key.
///
/// The 56 source bits are spread over the upper seven bits of each key byte; the lowest bit of
/// every key byte, which DES reserves for parity, is always zero:
///
/// ```plain
///  source: aaaaaaaa bbbbbbbb cccccccc dddddddd eeeeeeee ffffffff gggggggg
///     key: aaaaaaa0 abbbbbb0 bbccccc0 cccdddd0 ddddeee0 eeeeeff0 ffffffg0 ggggggg0
/// ```
///
/// Fails if `source` holds fewer than `offset + 7` bytes.
pub fn generate_key(source: &[u8], offset: usize) -> Result<[u8; 8], EncryptionError> {
    let b = offset.checked_add(DES_KEY_SOURCE_LEN)
        .and_then(|end| source.get(offset..end))
        .ok_or(EncryptionError::MalformedInput {
            item: "DES key material",
            expected_len: offset.saturating_add(DES_KEY_SOURCE_LEN),
            obtained_len: source.len(),
        })?;

    let mut key = [
        b[0] >> 1,
        ((b[0] & 0x01) << 6) | (b[1] >> 2),
        ((b[1] & 0x03) << 5) | (b[2] >> 3),
        ((b[2] & 0x07) << 4) | (b[3] >> 4),
        ((b[3] & 0x0F) << 3) | (b[4] >> 5),
        ((b[4] & 0x1F) << 2) | (b[5] >> 6),
        ((b[5] & 0x3F) << 1) | (b[6] >> 7),
        b[6] & 0x7F,
    ];
    for key_byte in key.iter_mut() {
        *key_byte <<= 1;
    }

    Ok(key)
}


/// Converts the password into the 14-byte buffer the LanMan hash is computed from.
///
/// The password is uppercased, encoded using the ANSI code page (UTF-8 outside of Windows),
/// truncated to 14 bytes and padded with NUL bytes if shorter.
pub fn lm_password_bytes(password: &str) -> Result<[u8; LM_PASSWORD_LEN], EncryptionError> {
    let uppercase_password = password.to_uppercase();
    let password_bytes = match encode_ansi(&uppercase_password) {
        Some(bs) => bs,
        None => return Err(EncryptionError::PasswordNotAnsiEncodable),
    };

    let mut ret = [0u8; LM_PASSWORD_LEN];
    let len = password_bytes.len().min(LM_PASSWORD_LEN);
    ret[..len].copy_from_slice(&password_bytes[..len]);
    Ok(ret)
}


/// Encrypts `seed` twice with DES, keyed by the two halves of the LanMan password buffer.
///
/// ```plain
///            ┌──────────────────────┐
/// password ──┤ lm_password_bytes    ├──┐
///            └──────────────────────┘  │
///            ┌─────────────────────────┘
///            │┌───────┐
///            └┤ split │          seed
///             └─┬───┬─┘            │ input
///          0..7 │   │ 7..14     ┌──┴──┐ output
///               │   └─ key ─────┤ DES ├────────────┐
///               │               └─────┘            │ 8..16
///               │                  seed         ┌──┴───┐
///               │                  │ input      │ join ├──── p16
///               │               ┌──┴──┐ output  └──┬───┘
///               └─ key ─────────┤ DES ├────────────┘ 0..8
///                               └─────┘
/// ```
///
/// With [`LM_SEED`] as the seed, the result is the LanMan hash of the password.
pub fn p16(password: &str, seed: &[u8; 8]) -> Result<[u8; HASH_LEN], EncryptionError> {
    let p14 = lm_password_bytes(password)?;

    let mut ret = [0u8; HASH_LEN];
    for (block, offset) in ret.chunks_exact_mut(8).zip([0, 7]) {
        let key = generate_key(&p14, offset)?;
        block.copy_from_slice(&des_encrypt_block(&key, seed)?);
    }
    Ok(ret)
}


/// Encrypts the challenge three times with DES, keyed by bytes 0..7, 7..14 and 14..21 of
/// `secret`.
///
/// `secret` must hold at least 21 bytes; the challenge must hold exactly 8.
pub fn p24(secret: &[u8], challenge: &[u8]) -> Result<[u8; RESPONSE_LEN], EncryptionError> {
    let challenge = challenge_block(challenge)?;
    if secret.len() < P21_LEN {
        return Err(EncryptionError::MalformedInput {
            item: "response secret",
            expected_len: P21_LEN,
            obtained_len: secret.len(),
        });
    }

    let mut ret = [0u8; RESPONSE_LEN];
    for (block, offset) in ret.chunks_exact_mut(8).zip([0, 7, 14]) {
        let key = generate_key(secret, offset)?;
        block.copy_from_slice(&des_encrypt_block(&key, challenge)?);
    }
    Ok(ret)
}


// password hashes


/// Computes the LanMan hash of the password.
pub fn lm_hash(password: &str) -> Result<[u8; HASH_LEN], EncryptionError> {
    p16(password, &LM_SEED)
}

/// Computes the NTLM hash of the password, i.e. the MD4 digest of its UTF-16LE encoding.
pub fn ntlm_hash(password: &str) -> [u8; HASH_LEN] {
    md4_digest(&utf16_le_bytes(password))
}


// responses


/// Computes the LanMan response to the challenge.
pub fn lm_response(password: &str, challenge: &[u8]) -> Result<[u8; RESPONSE_LEN], EncryptionError> {
    let lm_key = lm_hash(password)?;
    p24(&pad_to_p21(&lm_key), challenge)
}

/// Computes the NTLMv1 response to the challenge.
pub fn ntlm_v1_response(password: &str, challenge: &[u8]) -> Result<[u8; RESPONSE_LEN], EncryptionError> {
    let ntlm_key = ntlm_hash(password);
    p24(&pad_to_p21(&ntlm_key), challenge)
}


/// Encrypts the plaintext password with the challenge using the given algorithm.
///
/// | algorithm | output                                   |
/// |-----------|------------------------------------------|
/// | LanMan    | 24-byte LanMan response                  |
/// | NTLMv1    | 24-byte NTLMv1 response                  |
/// | NTLMv2    | always [`EncryptionError::UnsupportedAlgorithm`] |
/// | MD4       | 16-byte NTLM hash; `challenge` is ignored |
///
/// The challenge must be exactly 8 bytes long for LanMan and NTLMv1.
pub fn encrypt_password(password: &str, challenge: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, EncryptionError> {
    let encrypted = match algorithm {
        Algorithm::LanMan => Vec::from(lm_response(password, challenge)?),
        Algorithm::NtlmV1 => Vec::from(ntlm_v1_response(password, challenge)?),
        Algorithm::NtlmV2 => {
            warn!("password encryption requested for unimplemented algorithm {}", algorithm);
            return Err(EncryptionError::UnsupportedAlgorithm {
                algorithm,
                operation: "password encryption",
            });
        },
        Algorithm::Md4 => Vec::from(ntlm_hash(password)),
    };

    debug!("encrypted password using {} ({} bytes)", algorithm, encrypted.len());
    Ok(encrypted)
}


/// Derives the 40-byte session key for the password and challenge.
///
/// Only NTLMv1 defines a session key: its first 16 bytes are the MD4 digest of the NTLM hash and
/// its remaining 24 bytes are the NTLMv1 response. Every other algorithm fails with
/// [`EncryptionError::UnsupportedAlgorithm`].
pub fn derive_session_key(password: &str, challenge: &[u8], algorithm: Algorithm) -> Result<[u8; SESSION_KEY_LEN], EncryptionError> {
    match algorithm {
        Algorithm::NtlmV1 => {},
        Algorithm::LanMan|Algorithm::NtlmV2|Algorithm::Md4 => {
            warn!("session key requested for algorithm {}", algorithm);
            return Err(EncryptionError::UnsupportedAlgorithm {
                algorithm,
                operation: "session key derivation",
            });
        },
    }

    let ntlm_key = ntlm_hash(password);
    let ntlm_response = p24(&pad_to_p21(&ntlm_key), challenge)?;

    let mut session_key = [0u8; SESSION_KEY_LEN];
    let (hash_part, response_part) = session_key.split_at_mut(HASH_LEN);
    hash_part.copy_from_slice(&md4_digest(&ntlm_key));
    response_part.copy_from_slice(&ntlm_response);

    debug!("derived {} session key", algorithm);
    Ok(session_key)
}


/// Calculates the LanMan response, the NTLMv1 response and the NTLMv1 session key for the
/// challenge in one go.
pub fn respond_challenge(password: &str, challenge: &[u8]) -> Result<ChallengeResponse, EncryptionError> {
    let lm_response = lm_response(password, challenge)?;
    let session_key = derive_session_key(password, challenge, Algorithm::NtlmV1)?;

    let mut ntlm_response = [0u8; RESPONSE_LEN];
    ntlm_response.copy_from_slice(&session_key[HASH_LEN..]);

    Ok(ChallengeResponse {
        lm_response,
        ntlm_response,
        session_key,
    })
}


/// Generates a random challenge to send to the party that is to prove knowledge of a password.
pub fn generate_challenge() -> [u8; CHALLENGE_LEN] {
    let mut challenge = [0u8; CHALLENGE_LEN];
    OsRng.fill(&mut challenge);
    challenge
}


/// Returns the display name of the algorithm with the given numeric code, or `"Unknown"`.
pub fn algorithm_name(code: i32) -> &'static str {
    match Algorithm::try_from(code) {
        Ok(algorithm) => algorithm.name(),
        Err(_) => UNKNOWN_ALGORITHM_NAME,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const CHALLENGE: [u8; 8] = hex!("0123456789abcdef");

    #[test]
    fn test_generate_key_layout() {
        assert_eq!(generate_key(&hex!("ffffffffffffff"), 0).unwrap(), hex!("fefefefefefefefe"));
        assert_eq!(generate_key(&hex!("00000000000000"), 0).unwrap(), [0u8; 8]);
        assert_eq!(generate_key(&hex!("0123456789abcd"), 0).unwrap(), hex!("0090d0ac784cae9a"));
        assert_eq!(generate_key(b"PASSWOR", 0).unwrap(), hex!("5020546a34ba3ca4"));
    }

    #[test]
    fn test_generate_key_offset() {
        let source = hex!("ee0123456789abcd");
        assert_eq!(generate_key(&source, 1).unwrap(), hex!("0090d0ac784cae9a"));
    }

    #[test]
    fn test_generate_key_low_bit_clear() {
        let source: Vec<u8> = (0u8..=255).collect();
        for offset in 0..source.len() - 6 {
            let first = generate_key(&source, offset).unwrap();
            let second = generate_key(&source, offset).unwrap();
            assert_eq!(first, second);
            assert!(first.iter().all(|b| b & 0x01 == 0), "offset {}: {:02x?}", offset, first);
        }
    }

    #[test]
    fn test_generate_key_out_of_range() {
        assert_eq!(
            generate_key(&[0u8; 16], 14),
            Err(EncryptionError::MalformedInput { item: "DES key material", expected_len: 21, obtained_len: 16 }),
        );
        assert!(generate_key(&[0u8; 6], 0).is_err());
        assert!(generate_key(&[0u8; 8], usize::MAX).is_err());
    }

    #[test]
    fn test_lm_password_bytes() {
        assert_eq!(&lm_password_bytes("SecREt01").unwrap(), b"SECRET01\0\0\0\0\0\0");
        assert_eq!(lm_password_bytes("").unwrap(), [0u8; 14]);
        assert_eq!(&lm_password_bytes("abcdefghijklmnopqrstu").unwrap(), b"ABCDEFGHIJKLMN");
        assert_eq!(&lm_password_bytes("abcdefghijklmn").unwrap(), b"ABCDEFGHIJKLMN");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_lm_password_bytes_non_ascii() {
        let mut expected = [0u8; 14];
        expected[..3].copy_from_slice(&[b'X', 0xC3, 0x89]);
        assert_eq!(lm_password_bytes("x\u{e9}").unwrap(), expected);
    }

    #[test]
    fn test_lm_hash_of_empty_password() {
        assert_eq!(lm_hash("").unwrap(), hex!("aad3b435b51404eeaad3b435b51404ee"));
    }

    #[test]
    fn test_p16_uses_seed() {
        assert_eq!(p16("password", &LM_SEED).unwrap(), hex!("e52cac67419a9a224a3b108f3fa6cb6d"));
        assert_ne!(p16("password", b"00000000").unwrap(), p16("password", &LM_SEED).unwrap());
    }

    #[test]
    fn test_p24_rejects_short_secret() {
        assert_eq!(
            p24(&[0u8; 16], &CHALLENGE),
            Err(EncryptionError::MalformedInput { item: "response secret", expected_len: 21, obtained_len: 16 }),
        );
    }

    #[test]
    fn test_p24_rejects_wrong_challenge_length() {
        let short = p24(&[0u8; 21], &CHALLENGE[..7]);
        assert_eq!(short, Err(EncryptionError::MalformedInput { item: "challenge", expected_len: 8, obtained_len: 7 }));

        let long = [0u8; 9];
        assert!(p24(&[0u8; 21], &long).is_err());
    }

    #[test]
    fn test_p24_ignores_bytes_beyond_21() {
        let mut secret = [0x5Au8; 32];
        let base = p24(&secret[..21], &CHALLENGE).unwrap();
        secret[21..].fill(0xA5);
        assert_eq!(p24(&secret, &CHALLENGE).unwrap(), base);
    }

    #[test]
    fn test_ntlm_hash() {
        assert_eq!(ntlm_hash(""), hex!("31d6cfe0d16ae931b73c59d7e0c089c0"));
        assert_eq!(ntlm_hash("password"), hex!("8846f7eaee8fb117ad06bdd830b7586c"));
        assert_eq!(ntlm_hash("SecREt01"), hex!("cd06ca7c7e10c99b1d33b7485a2ed808"));
    }

    #[test]
    fn test_lan_man_is_deterministic() {
        for password in ["", "a", "password", "a much longer password than fourteen bytes"] {
            let first = encrypt_password(password, &CHALLENGE, Algorithm::LanMan).unwrap();
            let second = encrypt_password(password, &CHALLENGE, Algorithm::LanMan).unwrap();
            assert_eq!(first.len(), RESPONSE_LEN);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_lan_man_folds_case() {
        assert_eq!(
            encrypt_password("password", &CHALLENGE, Algorithm::LanMan).unwrap(),
            encrypt_password("PassWord", &CHALLENGE, Algorithm::LanMan).unwrap(),
        );
    }

    #[test]
    fn test_md4_ignores_challenge() {
        let with_challenge = encrypt_password("password", &CHALLENGE, Algorithm::Md4).unwrap();
        let other_challenge = encrypt_password("password", &[0xFF; 8], Algorithm::Md4).unwrap();
        let no_challenge = encrypt_password("password", &[], Algorithm::Md4).unwrap();
        assert_eq!(with_challenge.len(), HASH_LEN);
        assert_eq!(with_challenge, other_challenge);
        assert_eq!(with_challenge, no_challenge);
        assert_eq!(with_challenge, ntlm_hash("password"));
    }

    #[test]
    fn test_ntlm_v2_unsupported() {
        for password in ["", "password"] {
            assert_eq!(
                encrypt_password(password, &CHALLENGE, Algorithm::NtlmV2),
                Err(EncryptionError::UnsupportedAlgorithm { algorithm: Algorithm::NtlmV2, operation: "password encryption" }),
            );
        }
    }

    #[test]
    fn test_session_key_only_for_ntlm_v1() {
        for algorithm in [Algorithm::LanMan, Algorithm::NtlmV2, Algorithm::Md4] {
            assert_eq!(
                derive_session_key("password", &CHALLENGE, algorithm),
                Err(EncryptionError::UnsupportedAlgorithm { algorithm, operation: "session key derivation" }),
            );
        }
        assert!(derive_session_key("password", &CHALLENGE, Algorithm::NtlmV1).is_ok());
    }

    #[test]
    fn test_session_key_tail_is_ntlm_response() {
        for password in ["", "password", "SecREt01"] {
            let session_key = derive_session_key(password, &CHALLENGE, Algorithm::NtlmV1).unwrap();
            let response = encrypt_password(password, &CHALLENGE, Algorithm::NtlmV1).unwrap();
            assert_eq!(&session_key[16..], response.as_slice());
        }
    }

    #[test]
    fn test_session_key_rejects_short_challenge() {
        assert!(derive_session_key("password", &CHALLENGE[..4], Algorithm::NtlmV1).is_err());
    }

    #[test]
    fn test_respond_challenge_matches_parts() {
        let response = respond_challenge("SecREt01", &CHALLENGE).unwrap();
        assert_eq!(response.lm_response, lm_response("SecREt01", &CHALLENGE).unwrap());
        assert_eq!(response.ntlm_response, ntlm_v1_response("SecREt01", &CHALLENGE).unwrap());
        assert_eq!(&response.session_key[16..], &response.ntlm_response);
    }

    #[test]
    fn test_algorithm_codes() {
        for (code, algorithm) in Algorithm::ALL.iter().enumerate() {
            let code = code as i32;
            assert_eq!(algorithm.code(), code);
            assert_eq!(i32::from(*algorithm), code);
            assert_eq!(Algorithm::try_from(code), Ok(*algorithm));
        }
        assert_eq!(Algorithm::try_from(4), Err(EncryptionError::UnknownAlgorithm { code: 4 }));
        assert_eq!(Algorithm::try_from(-1), Err(EncryptionError::UnknownAlgorithm { code: -1 }));
    }

    #[test]
    fn test_algorithm_name() {
        assert_eq!(algorithm_name(0), "LanMan");
        assert_eq!(algorithm_name(1), "NTLMv1");
        assert_eq!(algorithm_name(2), "NTLMv2");
        assert_eq!(algorithm_name(3), "MD4");
        assert_eq!(algorithm_name(4), "Unknown");
        assert_eq!(algorithm_name(-1), "Unknown");
        assert_eq!(algorithm_name(i32::MAX), "Unknown");
        assert_eq!(Algorithm::NtlmV1.to_string(), "NTLMv1");
    }

    #[test]
    fn test_algorithm_methods() {
        assert_eq!(
            Algorithm::NtlmV1.encrypt_password("password", &CHALLENGE),
            encrypt_password("password", &CHALLENGE, Algorithm::NtlmV1),
        );
        assert_eq!(
            Algorithm::NtlmV1.derive_session_key("password", &CHALLENGE),
            derive_session_key("password", &CHALLENGE, Algorithm::NtlmV1),
        );
    }

    #[test]
    fn test_error_display() {
        let err = EncryptionError::MalformedInput { item: "challenge", expected_len: 8, obtained_len: 3 };
        assert_eq!(err.to_string(), "malformed challenge (expected 8 bytes, obtained 3)");

        let err = EncryptionError::UnsupportedAlgorithm { algorithm: Algorithm::NtlmV2, operation: "password encryption" };
        assert_eq!(err.to_string(), "password encryption is not supported by the NTLMv2 algorithm");
    }

    #[test]
    fn test_generate_challenge() {
        let c1 = generate_challenge();
        let c2 = generate_challenge();
        assert_eq!(c1.len(), CHALLENGE_LEN);
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_concurrent_calls_agree() {
        let expected = respond_challenge("password", &CHALLENGE).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| respond_challenge("password", &CHALLENGE).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
