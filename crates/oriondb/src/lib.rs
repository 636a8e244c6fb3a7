//! OrionDB: an embeddable, read-optimized chess game database.
//!
//! PGN collections are ingested once into a compact binary archive
//! (`.oriondb`) with a sidecar index file (`.oriondb.idx`), then queried
//! through a fluent builder or the small CQL query language:
//!
//! ```no_run
//! use std::path::Path;
//! use oriondb::{IndexOptions, OrionDatabase};
//!
//! # fn main() -> Result<(), oriondb::DbError> {
//! OrionDatabase::create_from_pgn(
//!     Path::new("games.pgn"),
//!     Path::new("games.oriondb"),
//!     IndexOptions::default(),
//! )?;
//!
//! let db = OrionDatabase::open(Path::new("games.oriondb"))?;
//! let wins = db.query("player='carlsen, magnus' AND result='1-0'")?;
//! for game in wins {
//!     println!("{game}");
//! }
//! # Ok(())
//! # }
//! ```

pub use chess_core;
pub use chess_tactics;

pub mod archive;
pub mod database;
pub mod error;
pub mod index;
pub mod model;
pub mod pgn;
pub mod query;

pub use database::{ImportStats, OrionDatabase};
pub use error::{CqlError, DbError};
pub use index::{IndexOptions, IndexStats};
pub use model::{Game, GamePosition, Move};
pub use pgn::PgnParser;
pub use query::SearchBuilder;
