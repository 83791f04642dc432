//! Token: a short identifier packed into a `u64`
//!
//! A token holds up to 12 characters from the alphabet `0-9 a-z _`.
//! Each character maps to an index in [`CHARSET`] (index 0 is the
//! terminator) and the string is stored as a base-38 number with the
//! first character in the least significant position.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const CHARSET: &[u8; 38] = b"\x000123456789abcdefghijklmnopqrstuvwxyz_";
const BASE: u64 = CHARSET.len() as u64;

/// Maximum number of characters a token can hold
pub const MAX_LENGTH: usize = 12;

/// A packed identifier string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    /// The empty token
    pub const EMPTY: Token = Token(0);

    /// Wrap a raw value as read from a file.
    ///
    /// Any `u64` is accepted so that values which do not decode cleanly
    /// still survive a load/save cycle.
    pub const fn from_raw(value: u64) -> Self {
        Token(value)
    }

    /// The packed value as it is stored on disk
    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Encode a string.
    pub fn new(s: &str) -> Result<Self> {
        if s.len() > MAX_LENGTH {
            return Err(Error::InvalidToken(format!(
                "\"{}\" is longer than {} characters",
                s, MAX_LENGTH
            )));
        }

        let mut value = 0u64;
        let mut multiplier = 1u64;
        for c in s.bytes() {
            let index = char_index(c.to_ascii_lowercase()).ok_or_else(|| {
                Error::InvalidToken(format!("\"{}\" contains invalid character '{}'", s, c as char))
            })?;
            value += index * multiplier;
            multiplier = multiplier.wrapping_mul(BASE);
        }
        Ok(Token(value))
    }

    /// Decode the token back into a string.
    ///
    /// Digits that fall outside the alphabet are skipped.
    pub fn as_string(self) -> String {
        let mut s = String::with_capacity(MAX_LENGTH);
        let mut value = self.0;
        while value != 0 {
            let index = (value % BASE) as usize;
            if index != 0 {
                s.push(CHARSET[index] as char);
            }
            value /= BASE;
        }
        s
    }
}

fn char_index(c: u8) -> Option<u64> {
    CHARSET[1..]
        .iter()
        .position(|&x| x == c)
        .map(|i| i as u64 + 1)
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Token::new(s)
    }
}

impl TryFrom<&str> for Token {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Token::new(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}
