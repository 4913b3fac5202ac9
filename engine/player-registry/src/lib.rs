//! Player Registry - Maps league player ids to stats provider players
//!
//! The two sides share no key. A weighted-ratio name scorer picks the best
//! stats name for each league player and the result is kept in a flat identity
//! map file so later runs only score players they have not matched yet.

pub mod error;
pub mod identity_map;
pub mod matcher;

pub use error::{RegistryError, Result};
pub use identity_map::{IdentityMap, IdentityMapEntry, MatchStatus, UpdateReport};
pub use matcher::{weighted_ratio, MatchCandidate, NameMatcher};
