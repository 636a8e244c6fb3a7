//! Chess kernel for the OrionDB game database.
//!
//! Everything downstream (indexing, search, motif detection) is built on the
//! types in this crate: square and piece encodings, the immutable [`Position`]
//! with its FEN codec, SAN parsing, game replay, and Zobrist hashing.

pub mod attacks;
pub mod board;
pub mod error;
pub mod material;
pub mod piece;
pub mod position;
pub mod san;
pub mod square;
pub mod squareset;
pub mod zobrist;

pub use board::Board;
pub use error::{FenError, MoveError, SanError};
pub use material::MaterialSignature;
pub use piece::{Color, Piece, PieceKind};
pub use position::{CastlingRights, Position, STARTING_FEN};
pub use san::{CastleSide, SanMove};
pub use square::Square;
pub use squareset::SquareSet;
