use std::fmt;
use std::sync::Arc;

use derive_more::Deref;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An absolute `http` or `https` URL.
///
/// Validation is syntactic only: the scheme must be `http` or `https`, the
/// authority must be non-empty, and every byte must be a character permitted
/// somewhere in a URL.
#[derive(Deref, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[deref(forward)]
pub struct HttpUrl(Arc<str>);

impl HttpUrl {
    pub fn parse(string: &str) -> Result<HttpUrl, String> {
        let string = string.trim();
        let rest = strip_scheme(string)
            .ok_or_else(|| format!("URL must start with http:// or https://: {string}"))?;

        let host = rest.split(['/', '?', '#']).next().unwrap_or("");
        if host.is_empty() {
            return Err(format!("URL is missing a host: {string}"));
        }

        if let Some(c) = string.bytes().find(|c| !is_url_char(c)) {
            return Err(format!("URL contains invalid character {:?}: {string}", c as char));
        }

        Ok(HttpUrl(string.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The authority (host and optional port), lowercased.
    pub fn host(&self) -> String {
        let rest = strip_scheme(&self.0).unwrap_or(&self.0);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        host.to_ascii_lowercase()
    }
}

fn strip_scheme(string: &str) -> Option<&str> {
    let (scheme, rest) = string.split_once("://")?;
    let valid = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
    valid.then_some(rest)
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpUrl({:?})", &*self.0)
    }
}

impl TryFrom<&str> for HttpUrl {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        HttpUrl::parse(value)
    }
}

impl Serialize for HttpUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HttpUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        HttpUrl::parse(&string).map_err(serde::de::Error::custom)
    }
}

/// Takes a set of sets of byte characters, return a 2^8 array with non-zero
/// values at the indices corresponding to the character byte values.
const fn char_table(sets: &[&[u8]]) -> [u8; 256] {
    let mut table = [0u8; 256];

    let mut i = 0;
    while i < sets.len() {
        let set: &[u8] = sets[i];

        let mut j = 0;
        while j < set.len() {
            table[set[j] as usize] = set[j];
            j += 1;
        }

        i += 1;
    }

    table
}

const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const DIGIT: &[u8] = b"0123456789";

const UNRESERVED: &[u8] = b"-._~";

const SUB_DELIMS: &[u8] = b"!$&'()*+,;=";

// `%` for percent-encoding, general delimiters, and the handful of characters
// browsers routinely leave unencoded in paths and queries.
const URL_EXTRAS: &[u8] = b"%:/?#[]@{}\\^`|";

const URL_CHARS: [u8; 256] = char_table(&[ALPHA, DIGIT, UNRESERVED, SUB_DELIMS, URL_EXTRAS]);

#[inline(always)]
pub const fn is_url_char(&c: &u8) -> bool { URL_CHARS[c as usize] != 0 }
