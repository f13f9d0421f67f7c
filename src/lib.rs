//! Reader, writer and editor for ID3v1 / ID3v1.1 tags.
//!
//! An ID3v1 tag is a fixed 128-byte record appended to the end of an audio
//! file, holding title, artist, album, year, comment, track number and genre.
//! The ID3v1.1 extension reuses the last two bytes of the comment field to
//! carry a track number.
//!
//! ```no_run
//! use mp3meta::Id3v1Tag;
//!
//! # fn main() -> mp3meta::Result<()> {
//! let mut tag = Id3v1Tag::read_from("song.mp3")?;
//! tag.set_title("New title");
//! tag.save("song.mp3")?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod id3v1;

pub use common::error::{MetaError, Result};
pub use id3v1::{find_id3v1, Id3v1Tag, Version, TAG_LEN};
