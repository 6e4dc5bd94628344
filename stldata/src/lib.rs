//! Typed empire properties extracted from Stellaris script trees.
//!
//! A batch of source texts is parsed into one tree ([`parse_sources`]), each
//! top-level definition is classified into a [`PropertyKind`] and read into a
//! [`Property`], and the `potential`/`possible` blocks are compiled into
//! [`Constraints`] referencing other properties by identifier. The resulting
//! [`PropertySet`] is what the generator consumes, and can be cached as JSON.

mod builder;
pub mod cache;
pub mod constraint;
pub mod extract;
pub mod kind;
pub mod load;
pub mod property;
pub mod quotas;
pub mod set;

pub use cache::{CacheError, CachedProperties, fingerprint_sources};
pub use constraint::{ConstraintGroup, Constraints, Gate};
pub use extract::{Extraction, ExtractionError, classify, extract};
pub use kind::PropertyKind;
pub use load::{LoadedProperties, ParsedSources, SourceFailure, load_properties, parse_sources};
pub use property::{Details, EthicDetails, Property, SpeciesDetails, TraitDetails};
pub use quotas::Quotas;
pub use set::{EthicVariants, PropertySet};
