//! Utility profiles
//!
//! A profile scores bids for one party. The only fully supported shape is
//! the linear-additive space: a weighted sum of per-issue utility
//! functions. The [`PartialOrdering`] trait is the minimal contract the
//! generic pareto fallback needs.

mod linear_additive;
mod value_utils;

pub use linear_additive::LinearAdditiveUtilitySpace;
pub use value_utils::ValueSetUtilities;

use crate::issue::{Bid, Domain};

/// A preference relation over complete bids.
///
/// Implementors only need to say whether one bid is at least as good as
/// another; this is enough for the brute-force pareto computation.
pub trait PartialOrdering {
    /// The domain this ordering is defined on
    fn domain(&self) -> &Domain;

    /// True iff `bid1` is preferred over or equivalent to `bid2`
    fn is_preferred_or_equal(&self, bid1: &Bid, bid2: &Bid) -> bool;
}
