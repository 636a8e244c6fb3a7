//! The on-disk archive format.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! magic[4] = "ORDB"
//! version[4] = 1
//! game_count[4]          back-patched on finish; readers must not rely on it
//! repeated per game:
//!   game_length[4]
//!   tag_count[4]   then tag_count x (len[4] key, len[4] value)
//!   move_count[4]  then move_count x (len[4] san, len[4] comment; empty = 0)
//! ```
//!
//! Strings are UTF-8. A game's offset points at its `game_length` prefix.
//! Game ids are not stored in the record; the metadata index's offset map is
//! the authority for recovering them.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::DbError;
use crate::model::{Game, Move};

pub const MAGIC: [u8; 4] = *b"ORDB";
pub const VERSION: u32 = 1;

const HEADER_LEN: u64 = 12;

/// A decoded game record, before an id is attached.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<Move>,
}

impl GameRecord {
    pub fn into_game(self, id: u32) -> Game {
        Game::new(id, self.tags, self.moves)
    }
}

/// Sequential archive writer. Write-once: games append in ingest order.
pub struct ArchiveWriter {
    out: BufWriter<File>,
    offset: u64,
    games_written: u32,
}

impl ArchiveWriter {
    pub fn create(path: &Path) -> Result<ArchiveWriter, DbError> {
        let file = File::create(path).map_err(|source| DbError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        out.write_all(&MAGIC)?;
        out.write_all(&VERSION.to_be_bytes())?;
        out.write_all(&0u32.to_be_bytes())?;
        Ok(ArchiveWriter {
            out,
            offset: HEADER_LEN,
            games_written: 0,
        })
    }

    /// Serialize one game and return the byte offset it was written at.
    pub fn write_game(&mut self, game: &Game) -> Result<u64, DbError> {
        let mut buf = Vec::new();

        put_u32(&mut buf, game.tags().len() as u32);
        for (key, value) in game.tags() {
            put_str(&mut buf, key);
            put_str(&mut buf, value);
        }

        put_u32(&mut buf, game.moves().len() as u32);
        for mv in game.moves() {
            put_str(&mut buf, &mv.san);
            put_str(&mut buf, mv.comment.as_deref().unwrap_or(""));
        }

        let offset = self.offset;
        self.out.write_all(&(buf.len() as u32).to_be_bytes())?;
        self.out.write_all(&buf)?;
        self.offset += 4 + buf.len() as u64;
        self.games_written += 1;
        Ok(offset)
    }

    pub fn games_written(&self) -> u32 {
        self.games_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    /// Flush and back-patch the game count into the header.
    pub fn finish(mut self) -> Result<(), DbError> {
        self.out.seek(SeekFrom::Start(8))?;
        self.out.write_all(&self.games_written.to_be_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Random-access archive reader. Reads take `&self`: seeks go through a
/// shared `&File`, so a handle must not be used from multiple threads.
pub struct ArchiveReader {
    file: File,
    version: u32,
    game_count: u32,
}

impl ArchiveReader {
    pub fn open(path: &Path) -> Result<ArchiveReader, DbError> {
        let file = File::open(path).map_err(|source| DbError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let mut header = [0u8; 12];
        (&file)
            .read_exact(&mut header)
            .map_err(|_| DbError::Truncated)?;

        if header[0..4] != MAGIC {
            return Err(DbError::BadMagic);
        }
        let version = u32::from_be_bytes(header[4..8].try_into().expect("4 bytes"));
        if version != VERSION {
            return Err(DbError::UnsupportedVersion(version));
        }
        let game_count = u32::from_be_bytes(header[8..12].try_into().expect("4 bytes"));

        Ok(ArchiveReader {
            file,
            version,
            game_count,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Header game count. May be zero on archives whose writer died before
    /// the back-patch; the metadata index carries the real count.
    pub fn game_count(&self) -> u32 {
        self.game_count
    }

    pub fn read_game_at(&self, offset: u64) -> Result<GameRecord, DbError> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).map_err(|_| DbError::Truncated)?;
        let game_length = u32::from_be_bytes(len_buf) as usize;

        let mut data = vec![0u8; game_length];
        file.read_exact(&mut data).map_err(|_| DbError::Truncated)?;

        let mut cursor = Decoder { data: &data, at: 0 };

        let tag_count = cursor.u32()?;
        let mut tags = Vec::with_capacity(tag_count as usize);
        for _ in 0..tag_count {
            let key = cursor.string()?;
            let value = cursor.string()?;
            tags.push((key, value));
        }

        let move_count = cursor.u32()?;
        let mut moves = Vec::with_capacity(move_count as usize);
        for _ in 0..move_count {
            let san = cursor.string()?;
            let comment = cursor.string()?;
            moves.push(Move {
                san,
                comment: if comment.is_empty() { None } else { Some(comment) },
            });
        }

        Ok(GameRecord { tags, moves })
    }
}

struct Decoder<'a> {
    data: &'a [u8],
    at: usize,
}

impl Decoder<'_> {
    fn u32(&mut self) -> Result<u32, DbError> {
        let end = self.at + 4;
        if end > self.data.len() {
            return Err(DbError::Truncated);
        }
        let value = u32::from_be_bytes(self.data[self.at..end].try_into().expect("4 bytes"));
        self.at = end;
        Ok(value)
    }

    fn string(&mut self) -> Result<String, DbError> {
        let len = self.u32()? as usize;
        let end = self.at + len;
        if end > self.data.len() {
            return Err(DbError::Truncated);
        }
        let s = std::str::from_utf8(&self.data[self.at..end])
            .map_err(|_| DbError::Corrupt("invalid UTF-8 in string".to_string()))?
            .to_string();
        self.at = end;
        Ok(s)
    }
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_game(id: u32) -> Game {
        Game::new(
            id,
            vec![
                ("Event".into(), "Archive Test".into()),
                ("White".into(), format!("White {id}")),
                ("Result".into(), "1-0".into()),
            ],
            vec![
                Move::new("e4"),
                Move::with_comment("e5", "solid"),
                Move::new("Nf3"),
            ],
        )
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("games.oriondb");

        let mut writer = ArchiveWriter::create(&path).unwrap();
        let off_a = writer.write_game(&sample_game(0)).unwrap();
        let off_b = writer.write_game(&sample_game(1)).unwrap();
        assert_eq!(off_a, 12);
        assert!(off_b > off_a);
        writer.finish().unwrap();

        let reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.version(), 1);
        assert_eq!(reader.game_count(), 2);

        let record = reader.read_game_at(off_b).unwrap();
        let game = record.into_game(1);
        assert_eq!(game.white(), "White 1");
        assert_eq!(game.moves().len(), 3);
        assert_eq!(game.moves()[1].comment.as_deref(), Some("solid"));
        assert_eq!(game.moves()[2].comment, None);

        // Reads at any offset, in any order
        let first = reader.read_game_at(off_a).unwrap().into_game(0);
        assert_eq!(first.white(), "White 0");
    }

    #[test]
    fn test_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-a-db");
        std::fs::write(&path, b"NOPE\x00\x00\x00\x01\x00\x00\x00\x00").unwrap();
        assert!(matches!(ArchiveReader::open(&path), Err(DbError::BadMagic)));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future-db");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&9u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(
            ArchiveReader::open(&path),
            Err(DbError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_truncated_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cut.oriondb");

        let mut writer = ArchiveWriter::create(&path).unwrap();
        let offset = writer.write_game(&sample_game(0)).unwrap();
        writer.finish().unwrap();

        // Chop the file mid-record
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        let reader = ArchiveReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_game_at(offset),
            Err(DbError::Truncated)
        ));
    }

    #[test]
    fn test_empty_archive_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.oriondb");
        ArchiveWriter::create(&path).unwrap().finish().unwrap();

        let reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.game_count(), 0);
    }
}
