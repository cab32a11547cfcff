//! # Battleground Client Library
//!
//! This library provides the client-side engine for real-time quiz
//! competitions: 1v1 battles negotiated through invitations and a shared
//! lobby, and N-way wars scheduled through a server-owned directory. It
//! handles the pre-battle handshake, answer bookkeeping, peer progress
//! reconciliation over an unreliable broadcast channel, and locally
//! computed rankings that agree across clients.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod constants;

pub mod arena;
pub mod backend;
pub mod battle;
pub mod channel;
pub mod events;
pub mod lobby;
pub mod participant;
pub mod progress;
pub mod ranking;
pub mod reconcile;
pub mod room;
pub mod war;

/// A vector truncated to a maximum length with the total count preserved
///
/// This structure is useful for displaying a limited number of items while
/// still showing the total count. For example, showing "24 warriors" but
/// only displaying the top 10 standings.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The truncated list of items (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Creates a new truncated vector from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to include in the truncated vector
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` containing up to `limit` items from the iterator
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Maps a function over the items in the truncated vector
    ///
    /// # Arguments
    ///
    /// * `f` - Function to apply to each item
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` with the function applied to each item
    pub fn map<F, U>(self, f: F) -> TruncatedVec<U>
    where
        F: Fn(T) -> U,
    {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the truncated items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_vec_new() {
        let data = vec![1, 2, 3, 4, 5];
        let truncated = TruncatedVec::new(data.into_iter(), 3, 5);

        assert_eq!(truncated.exact_count(), 5);
        assert_eq!(truncated.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_truncated_vec_new_limit_larger_than_items() {
        let data = vec![1, 2, 3];
        let truncated = TruncatedVec::new(data.into_iter(), 5, 3);

        assert_eq!(truncated.exact_count(), 3);
        assert_eq!(truncated.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_truncated_vec_map() {
        let data = vec![1, 2, 3];
        let truncated = TruncatedVec::new(data.into_iter(), 3, 5);
        let mapped = truncated.map(|x| x * 2);

        assert_eq!(mapped.exact_count(), 5);
        assert_eq!(mapped.items(), &[2, 4, 6]);
    }
}
