//! Character model, filtering and analytics for the Halodex catalog.
//!
//! Everything in this crate is pure and synchronous. It defines:
//!
//! - [`Character`] / [`NewCharacter`] - the catalog record, with and without a store id
//! - [`filter_and_sort`] - the search, category and advanced filter pipeline
//! - [`Dashboard`] and the aggregation functions behind it
//! - [`compare`] - attribute-by-attribute comparison of two records
//!
//! # Example
//!
//! ```rust
//! use halodex_core::{filter_and_sort, Character, SortKey, ViewQuery};
//!
//! let records: Vec<Character> = Vec::new();
//! let query = ViewQuery {
//!     search: "chief".to_string(),
//!     sort: SortKey::Threat,
//!     ..ViewQuery::default()
//! };
//! let view = filter_and_sort(&records, &query, &[]);
//! assert!(view.is_empty());
//! ```

pub mod analytics;
pub mod compare;
pub mod filter;
pub mod model;
pub mod validation;

pub use analytics::{
    average_stats, count_by_faction, top_threats, AverageStats, Dashboard, FactionBreakdown,
    FactionShare,
};
pub use compare::{compare, StatComparison};
pub use filter::{filter_and_sort, AdvancedFilter, CategoryFilter, SortKey, ViewQuery};
pub use model::{Character, Faction, NewCharacter, Stat, Stats, STAT_MAX, STAT_MIN};
pub use validation::ValidationError;
