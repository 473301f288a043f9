//! Order-preserving collections keyed by security identifier.
//!
//! [`Portfolio`] and [`Model`] both keep the order in which a security was
//! first inserted. Inserting a security that is already present replaces the
//! stored entry in place, so the last occurrence wins without changing order.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::error::RebalanceError;
use crate::types::{Allocation, Position, is_reserve};

/// An entry that can be stored in [`Holdings`].
pub trait Keyed {
    fn security(&self) -> &str;
}

impl Keyed for Position {
    fn security(&self) -> &str {
        &self.security
    }
}

impl Keyed for Allocation {
    fn security(&self) -> &str {
        &self.security
    }
}

/// Insertion-ordered map from security identifier to entry.
#[derive(Clone, Debug)]
pub struct Holdings<T> {
    entries: Vec<T>,
    index: FxHashMap<String, usize>,
}

/// Current holdings, one [`Position`] per security.
pub type Portfolio = Holdings<Position>;

/// Target model, one [`Allocation`] per security.
pub type Model = Holdings<Allocation>;

impl<T> Default for Holdings<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: Keyed> Holdings<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns the entry it replaced, if any.
    pub fn insert(&mut self, entry: T) -> Option<T> {
        match self.index.get(entry.security()) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                self.index
                    .insert(entry.security().to_string(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    /// Exact (case-sensitive) lookup.
    pub fn get(&self, security: &str) -> Option<&T> {
        self.index.get(security).map(|&i| &self.entries[i])
    }

    /// Lookup of the reserve security, matched case-insensitively.
    ///
    /// An exact match is preferred; otherwise the first entry in insertion
    /// order whose identifier matches ignoring ASCII case.
    pub fn get_reserve(&self, reserve: &str) -> Option<&T> {
        self.get(reserve).or_else(|| {
            self.entries
                .iter()
                .find(|e| is_reserve(e.security(), reserve))
        })
    }

    pub fn contains(&self, security: &str) -> bool {
        self.index.contains_key(security)
    }

    pub fn contains_reserve(&self, reserve: &str) -> bool {
        self.get_reserve(reserve).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Security identifiers in insertion order.
    pub fn securities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Keyed::security)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Keyed> FromIterator<T> for Holdings<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |mut acc, entry| {
            acc.insert(entry);
            acc
        })
    }
}

impl<'a, T> IntoIterator for &'a Holdings<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Portfolio {
    /// Sum of market values over every position, the reserve included.
    pub fn total_value(&self) -> Result<Decimal, RebalanceError> {
        self.entries.iter().try_fold(Decimal::ZERO, |acc, pos| {
            pos.market_value()
                .and_then(|v| acc.checked_add(v))
                .ok_or_else(|| RebalanceError::Overflow {
                    security: pos.security.clone(),
                })
        })
    }
}

impl Model {
    /// Sum of all requested percents, or `None` on overflow.
    pub fn total_percent(&self) -> Option<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(a.percent))
    }
}
