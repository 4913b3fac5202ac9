//! League Client - fetches fantasy team rosters for a scoring period
//!
//! This crate exposes a single typed `LeagueClient` interface and a Fantrax
//! implementation of it. Session negotiation with the platform is out of scope:
//! the client only forwards an operator-supplied session cookie.

pub mod client;
pub mod config;
pub mod error;
pub mod fantrax;
pub mod types;

pub use client::{fetch_week_roster, LeagueClient};
pub use config::FantraxConfig;
pub use error::{LeagueClientError, Result};
pub use fantrax::FantraxClient;
pub use types::{FantasyTeam, RosterSlot};
