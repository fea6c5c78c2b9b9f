//! `login_sid.lua` session handshake.
//!
//! The router hands out a challenge inside a `SessionInfo` XML document.
//! Version 2 challenges have the form `2$<iter1>$<salt1>$<iter2>$<salt2>`
//! and are answered with
//! `<salt2>$hex(PBKDF2(PBKDF2(password, salt1, iter1), salt2, iter2))`
//! using HMAC-SHA256.

use std::sync::LazyLock;

use regex::Regex;
use sha2::Sha256;

use crate::error::RouterError;

/// SID the router returns when no session is open.
pub const EMPTY_SID: &str = "0000000000000000";

const PBKDF2_CHALLENGE_PREFIX: &str = "2$";
const HASH_LEN: usize = 32;

static SID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<SID>([^<]*)</SID>").expect("valid regex"));
static CHALLENGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Challenge>([^<]*)</Challenge>").expect("valid regex"));
static BLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<BlockTime>(\d+)</BlockTime>").expect("valid regex"));

/// The parts of `SessionInfo` the login flow needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub sid: String,
    pub challenge: String,
    /// Seconds until the router accepts another login attempt.
    pub block_time: u32,
}

impl SessionInfo {
    pub fn parse(xml: &str) -> Result<Self, RouterError> {
        let sid = capture(&SID_RE, xml)
            .ok_or_else(|| RouterError::MalformedSession("missing <SID>".to_string()))?;
        let challenge = capture(&CHALLENGE_RE, xml).unwrap_or_default();
        let block_time = capture(&BLOCK_TIME_RE, xml)
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            sid,
            challenge,
            block_time,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        !self.sid.is_empty() && self.sid != EMPTY_SID
    }
}

fn capture(re: &Regex, xml: &str) -> Option<String> {
    re.captures(xml).map(|caps| caps[1].to_string())
}

/// Compute the login response for a PBKDF2 challenge.
pub fn solve_challenge(challenge: &str, password: &str) -> Result<String, RouterError> {
    let unsupported = || RouterError::UnsupportedChallenge(challenge.to_string());

    let rest = challenge
        .strip_prefix(PBKDF2_CHALLENGE_PREFIX)
        .ok_or_else(unsupported)?;
    let parts: Vec<&str> = rest.split('$').collect();
    let [iter1, salt1, iter2, salt2] = parts[..] else {
        return Err(unsupported());
    };

    let iter1: u32 = iter1.parse().map_err(|_| unsupported())?;
    let iter2: u32 = iter2.parse().map_err(|_| unsupported())?;
    let salt1_bytes = hex::decode(salt1).map_err(|_| unsupported())?;
    let salt2_bytes = hex::decode(salt2).map_err(|_| unsupported())?;

    let mut hash1 = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt1_bytes, iter1, &mut hash1);

    let mut hash2 = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(&hash1, &salt2_bytes, iter2, &mut hash2);

    Ok(format!("{salt2}${}", hex::encode(hash2)))
}
