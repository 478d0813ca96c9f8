//! Shared types for the Pokemon TCG card browser
//!
//! Card, set and paging models as returned by the Pokemon TCG API, plus the
//! error type shared by everything that talks to it.

pub mod error;
pub mod models;

pub use error::{Result, TcgError};
pub use models::{ApiPage, Card, CardImages, CardSet, ListQuery, SetImages};
