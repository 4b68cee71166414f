//! Subcommand implementations. Each builds the minimum collaborators it
//! needs from [`AppConfig`] and delegates to the `arbitrage-cross` engine.

pub mod discover;
pub mod positions;
pub mod run;
pub mod setup;
