//! In-memory fingerprint collection with a reproducible iteration order
//!
//! Fingerprints are kept sorted by id in natural order: runs of ASCII digits
//! compare by numeric value, so `video2` precedes `video10`. Ids that are
//! naturally equal (`video01` / `video1`) fall back to plain byte order, which
//! makes the ordering total. Matching ties resolve by this order.

use crate::fingerprint::Fingerprint;
use std::cmp::Ordering;

/// Keyed set of fingerprints, unique by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintCollection {
    fingerprints: Vec<Fingerprint>,
}

impl FingerprintCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fingerprint, replacing any existing one with the same id.
    /// Returns the replaced fingerprint.
    pub fn insert(&mut self, fingerprint: Fingerprint) -> Option<Fingerprint> {
        match self.search(&fingerprint.id) {
            Ok(idx) => Some(std::mem::replace(&mut self.fingerprints[idx], fingerprint)),
            Err(idx) => {
                self.fingerprints.insert(idx, fingerprint);
                None
            }
        }
    }

    /// Look up a fingerprint by id
    pub fn get(&self, id: &str) -> Option<&Fingerprint> {
        self.search(id).ok().map(|idx| &self.fingerprints[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.search(id).is_ok()
    }

    /// Iterate in natural id order
    pub fn iter(&self) -> std::slice::Iter<'_, Fingerprint> {
        self.fingerprints.iter()
    }

    /// Ids in iteration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fingerprints.iter().map(|fp| fp.id.as_str())
    }

    pub fn as_slice(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    fn search(&self, id: &str) -> Result<usize, usize> {
        self.fingerprints
            .binary_search_by(|fp| natural_cmp(&fp.id, id))
    }
}

impl FromIterator<Fingerprint> for FingerprintCollection {
    /// Later duplicates of an id replace earlier ones
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        let mut collection = Self::new();
        for fp in iter {
            collection.insert(fp);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a FingerprintCollection {
    type Item = &'a Fingerprint;
    type IntoIter = std::slice::Iter<'a, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Natural ("human") ordering of identifiers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_inner(a.as_bytes(), b.as_bytes()).then_with(|| a.cmp(b))
}

fn natural_cmp_inner(mut a: &[u8], mut b: &[u8]) -> Ordering {
    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (num_a, rest_a) = split_digits(a);
                let (num_b, rest_b) = split_digits(b);
                let ord = cmp_digit_runs(num_a, num_b);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = rest_a;
                b = rest_b;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compare digit runs by value without parsing, so arbitrarily long runs work
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}
