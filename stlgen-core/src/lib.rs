//! # Empire Generator Core
//!
//! Randomized, quota-aware backtracking search over an extracted
//! [`PropertySet`](stldata::PropertySet).
//!
//! ## Search
//!
//! ```text
//! ┌─────────────┐     ┌───────────┐     ┌────────────┐     ┌────────┐
//! │ PropertySet │────▶│  Catalog  │────▶│   Search   │────▶│ Bundle │
//! │  (allowed)  │     │ (indices) │     │ (DFS over  │     │        │
//! └─────────────┘     └───────────┘     │ SearchNode)│     └────────┘
//!                                       └────────────┘
//! ```
//!
//! Each step draws one candidate weighted by `weight`, commits it in a child
//! node together with whatever it strictly requires, and evicts every
//! candidate that became impossible. A dead end evicts the offending pick in
//! its parent, so an attempt always terminates.
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Generator`] | Seeded driver with retry over fresh roots |
//! | [`GeneratorConfig`] | Quotas, attempt and step bounds, seed |
//! | [`Search`] | One depth-first attempt over a stack of nodes |
//! | [`Bundle`] | One generated empire |

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod rules;
pub mod search;
pub mod state;

pub use bundle::Bundle;
pub use catalog::{Catalog, Entry, Group};
pub use config::GeneratorConfig;
pub use error::GenerateError;
pub use generator::Generator;
pub use search::{weighted_pick, Search, Step};
pub use state::{Restriction, SearchNode};
