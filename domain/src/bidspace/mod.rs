//! The bid-space reasoning engine
//!
//! Everything that answers questions about *all* bids of a domain at
//! once: achievable utility ranges, utility-interval queries, extreme
//! bids and pareto frontiers — all without materializing the cartesian
//! product of issue values.

mod bid_list;
mod bids_with_utility;
mod interval;
mod issue_info;
mod pareto;

pub use bid_list::{AllBidsList, BidList};
pub use bids_with_utility::{BidsWithUtility, DEFAULT_PRECISION};
pub use interval::Interval;
pub use issue_info::IssueInfo;
pub use pareto::{GenericPareto, ParetoLinearAdditive, ParetoPoint};
