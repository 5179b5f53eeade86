//! Issues, values and bids
//!
//! The building blocks of a negotiation domain: a [`Value`] is one possible
//! choice for one issue, a [`ValueSet`] enumerates the allowed choices, a
//! [`Bid`] assigns values to some or all issues and a [`Domain`] ties the
//! issue names to their value sets.

mod bid;
mod domain;
mod value;
mod value_set;

pub use bid::Bid;
pub use domain::Domain;
pub use value::Value;
pub use value_set::ValueSet;
