//! The ID3v1 tag codec.
//!
//! The on-disk record is always exactly 128 bytes and occupies the tail of
//! the file:
//!
//! | offset | len | field       |
//! |--------|-----|-------------|
//! | 0      | 3   | `TAG`       |
//! | 3      | 30  | title       |
//! | 33     | 30  | artist      |
//! | 63     | 30  | album       |
//! | 93     | 4   | year (ASCII digits) |
//! | 97     | 30  | comment     |
//! | 127    | 1   | genre index |
//!
//! ID3v1.1 steals the last two comment bytes: when byte 125 is zero, byte
//! 126 holds the track number and only the first 28 comment bytes are text.

pub mod genres;

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::error::{MetaError, Result};
use crate::common::text;
use crate::common::util;

pub use genres::{genre_name, GENRES};

/// Size of an ID3v1 record.
pub const TAG_LEN: usize = 128;

/// Marker bytes at the start of the record.
pub const TAG_MARKER: &[u8; 3] = b"TAG";

const FIELD_LEN: usize = 30;
const YEAR_LEN: usize = 4;
/// Comment text bytes available when the track extension is active.
const COMMENT_V11_LEN: usize = 28;

/// Tag revision, determined by the presence of the track extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    V1_0,
    V1_1,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1_0 => f.write_str("1.0"),
            Version::V1_1 => f.write_str("1.1"),
        }
    }
}

/// An ID3v1 / ID3v1.1 tag.
///
/// The logical comment and the track number are kept as separate fields even
/// though they share on-disk bytes; the v1.1 packing happens in [`render`]
/// and is undone in [`parse`].
///
/// [`render`]: Id3v1Tag::render
/// [`parse`]: Id3v1Tag::parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    version: Version,
    title: String,
    artist: String,
    album: String,
    year: u16,
    comment: String,
    track: Option<u8>,
    genre: u8,
    tag_present: bool,
}

impl Default for Id3v1Tag {
    fn default() -> Self {
        Id3v1Tag {
            version: Version::V1_0,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            year: 0,
            comment: String::new(),
            track: None,
            genre: 255,
            tag_present: false,
        }
    }
}

/// Check whether `data` ends with an ID3v1 record, returning its offset.
pub fn find_id3v1(data: &[u8]) -> Option<usize> {
    if data.len() < TAG_LEN {
        return None;
    }
    let tag_offset = data.len() - TAG_LEN;
    if &data[tag_offset..tag_offset + 3] == TAG_MARKER {
        Some(tag_offset)
    } else {
        None
    }
}

impl Id3v1Tag {
    /// An empty tag, as used when no record is found on disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the tag from the trailing 128 bytes of `path`.
    ///
    /// Fails with [`MetaError::Io`] if the file cannot be opened or is
    /// shorter than 128 bytes, and with [`MetaError::TagNotFound`] if the
    /// trailing bytes carry no `TAG` marker.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = util::open_ro(path.as_ref())?;
        let buf = read_trailer(&mut file)?;
        Self::parse(&buf)
    }

    /// Decode a 128-byte record.
    pub fn parse(buf: &[u8; TAG_LEN]) -> Result<Self> {
        if &buf[..3] != TAG_MARKER {
            return Err(MetaError::TagNotFound);
        }

        let title = text::decode_fixed(&buf[3..33]);
        let artist = text::decode_fixed(&buf[33..63]);
        let album = text::decode_fixed(&buf[63..93]);
        let year = parse_year(&buf[93..97])?;

        // v1.1: a zero at comment byte 28 marks the track extension
        let (version, track, comment) = if buf[125] == 0 {
            let comment = text::decode_fixed(&buf[97..125]);
            (Version::V1_1, Some(buf[126]), comment)
        } else {
            (Version::V1_0, None, text::decode_fixed(&buf[97..127]))
        };

        log::debug!("parsed id3v{} tag, genre index {}", version, buf[127]);

        Ok(Id3v1Tag {
            version,
            title,
            artist,
            album,
            year,
            comment,
            track,
            genre: buf[127],
            tag_present: true,
        })
    }

    /// Encode the tag into a 128-byte record.
    ///
    /// A pure function of the fields; field setters bound every value, so
    /// rendering cannot fail. A track number greater than zero produces the
    /// v1.1 comment layout (28 bytes of text, a zero sentinel, the track).
    pub fn render(&self) -> [u8; TAG_LEN] {
        let mut buf = [0u8; TAG_LEN];
        buf[..3].copy_from_slice(TAG_MARKER);
        buf[3..33].copy_from_slice(&text::encode_fixed(&self.title, FIELD_LEN));
        buf[33..63].copy_from_slice(&text::encode_fixed(&self.artist, FIELD_LEN));
        buf[63..93].copy_from_slice(&text::encode_fixed(&self.album, FIELD_LEN));
        buf[93..97].copy_from_slice(format!("{:04}", self.year).as_bytes());

        match self.track {
            Some(track) if track > 0 => {
                buf[97..125].copy_from_slice(&text::encode_fixed(&self.comment, COMMENT_V11_LEN));
                buf[125] = 0;
                buf[126] = track;
            }
            _ => {
                buf[97..127].copy_from_slice(&text::encode_fixed(&self.comment, FIELD_LEN));
            }
        }

        buf[127] = self.genre;
        buf
    }

    /// Write the tag to `path`.
    ///
    /// If the file already ends in a valid record it is overwritten in place
    /// and the file size does not change; otherwise the record is appended
    /// and the file grows by exactly 128 bytes.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = util::open_rw(path.as_ref())?;

        if has_trailing_tag(&mut file)? {
            log::debug!("existing tag found, overwriting in place");
            file.seek(SeekFrom::End(-(TAG_LEN as i64)))?;
        } else {
            log::debug!("no trailing tag, appending");
            file.seek(SeekFrom::End(0))?;
        }

        file.write_all(&self.render())?;
        file.flush()?;
        Ok(())
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn track(&self) -> Option<u8> {
        self.track
    }

    pub fn genre(&self) -> u8 {
        self.genre
    }

    /// Canonical name for the tag's genre index, "Unknown" when the index
    /// is outside the table.
    pub fn genre_name(&self) -> &'static str {
        genre_name(self.genre)
    }

    /// Whether a valid record was actually found at read time, as opposed
    /// to a freshly constructed empty tag.
    pub fn tag_present(&self) -> bool {
        self.tag_present
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = text::truncate_to_width(title, FIELD_LEN);
    }

    pub fn set_artist(&mut self, artist: &str) {
        self.artist = text::truncate_to_width(artist, FIELD_LEN);
    }

    pub fn set_album(&mut self, album: &str) {
        self.album = text::truncate_to_width(album, FIELD_LEN);
    }

    /// Set the comment. The stored value keeps up to 30 characters; when a
    /// track number is set, rendering uses only the first 28.
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = text::truncate_to_width(comment, FIELD_LEN);
    }

    /// Set the year. The on-disk form is 4 ASCII digits, so values above
    /// 9999 are rejected.
    pub fn set_year(&mut self, year: u16) -> Result<()> {
        if year > 9999 {
            return Err(MetaError::ValueError(format!(
                "year {} does not fit in 4 digits",
                year
            )));
        }
        self.year = year;
        Ok(())
    }

    /// Set the track number. A non-zero track switches the tag to v1.1.
    pub fn set_track(&mut self, track: u8) {
        self.track = Some(track);
        if track > 0 {
            self.version = Version::V1_1;
        }
    }

    pub fn set_genre(&mut self, genre: u8) {
        self.genre = genre;
    }
}

impl fmt::Display for Id3v1Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tag: {}", self.version)?;
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "artist: {}", self.artist)?;
        writeln!(f, "album: {}", self.album)?;
        writeln!(f, "year: {}", self.year)?;
        writeln!(f, "track: {}", self.track.map_or(-1, i16::from))?;
        writeln!(f, "genre: {}({})", self.genre_name(), self.genre)?;
        write!(f, "comment: {}", self.comment)
    }
}

/// Read the trailing 128 bytes of an open file.
///
/// Files shorter than a record fail with [`MetaError::Io`] rather than
/// being zero-filled.
fn read_trailer(file: &mut File) -> Result<[u8; TAG_LEN]> {
    let len = file.metadata()?.len();
    if len < TAG_LEN as u64 {
        return Err(MetaError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("file is shorter than {} bytes", TAG_LEN),
        )));
    }
    file.seek(SeekFrom::End(-(TAG_LEN as i64)))?;
    let mut buf = [0u8; TAG_LEN];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

fn has_trailing_tag(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len < TAG_LEN as u64 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-(TAG_LEN as i64)))?;
    let mut marker = [0u8; 3];
    file.read_exact(&mut marker)?;
    Ok(&marker == TAG_MARKER)
}

/// Parse the 4-byte year field.
///
/// All-padding fields (NUL or space) decode as 0; anything else must be
/// ASCII digits.
fn parse_year(data: &[u8]) -> Result<u16> {
    let trimmed: &[u8] = {
        let end = data
            .iter()
            .rposition(|&b| b != 0 && b != b' ')
            .map_or(0, |p| p + 1);
        &data[..end]
    };

    if trimmed.is_empty() {
        return Ok(0);
    }
    if !trimmed.iter().all(u8::is_ascii_digit) {
        return Err(MetaError::Format("year field is not numeric".into()));
    }

    // At most 4 digits, always fits in a u16
    let year = trimmed
        .iter()
        .fold(0u16, |acc, &d| acc * 10 + u16::from(d - b'0'));
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buf() -> [u8; TAG_LEN] {
        let mut buf = [0u8; TAG_LEN];
        buf[..3].copy_from_slice(b"TAG");
        buf[3..7].copy_from_slice(b"Song");
        buf[33..37].copy_from_slice(b"Band");
        buf[63..68].copy_from_slice(b"Album");
        buf[93..97].copy_from_slice(b"2020");
        buf[97..102].copy_from_slice(b"hello");
        buf[125] = 0x00;
        buf[126] = 0x05;
        buf[127] = 17;
        buf
    }

    #[test]
    fn parse_sample_record() {
        let tag = Id3v1Tag::parse(&sample_buf()).unwrap();
        assert_eq!(tag.version(), Version::V1_1);
        assert_eq!(tag.title(), "Song");
        assert_eq!(tag.artist(), "Band");
        assert_eq!(tag.album(), "Album");
        assert_eq!(tag.year(), 2020);
        assert_eq!(tag.comment(), "hello");
        assert_eq!(tag.track(), Some(5));
        assert_eq!(tag.genre(), 17);
        assert_eq!(tag.genre_name(), "Rock");
        assert!(tag.tag_present());
    }

    #[test]
    fn missing_marker_is_tag_not_found() {
        let mut buf = sample_buf();
        buf[..3].copy_from_slice(b"XXX");
        assert!(matches!(
            Id3v1Tag::parse(&buf),
            Err(MetaError::TagNotFound)
        ));
    }

    #[test]
    fn v1_0_comment_spans_thirty_bytes() {
        let mut buf = sample_buf();
        // Non-zero byte at the sentinel position disables the extension
        buf[97..127].copy_from_slice(&[b'x'; 30]);
        let tag = Id3v1Tag::parse(&buf).unwrap();
        assert_eq!(tag.version(), Version::V1_0);
        assert_eq!(tag.track(), None);
        assert_eq!(tag.comment(), "x".repeat(30));
    }

    #[test]
    fn zero_sentinel_with_zero_track() {
        let mut buf = sample_buf();
        buf[126] = 0;
        let tag = Id3v1Tag::parse(&buf).unwrap();
        assert_eq!(tag.version(), Version::V1_1);
        assert_eq!(tag.track(), Some(0));
    }

    #[test]
    fn non_numeric_year_is_format_error() {
        let mut buf = sample_buf();
        buf[93..97].copy_from_slice(b"20xx");
        assert!(matches!(Id3v1Tag::parse(&buf), Err(MetaError::Format(_))));
    }

    #[test]
    fn padded_year_decodes_as_zero() {
        let mut buf = sample_buf();
        buf[93..97].copy_from_slice(&[0; 4]);
        assert_eq!(Id3v1Tag::parse(&buf).unwrap().year(), 0);

        buf[93..97].copy_from_slice(b"    ");
        assert_eq!(Id3v1Tag::parse(&buf).unwrap().year(), 0);
    }

    #[test]
    fn out_of_table_genre_survives_decode() {
        let mut buf = sample_buf();
        buf[127] = 200;
        let tag = Id3v1Tag::parse(&buf).unwrap();
        assert_eq!(tag.genre(), 200);
        assert_eq!(tag.genre_name(), "Unknown");
    }

    #[test]
    fn render_matches_layout() {
        let mut tag = Id3v1Tag::new();
        tag.set_title("Song");
        tag.set_artist("Band");
        tag.set_album("Album");
        tag.set_year(2020).unwrap();
        tag.set_comment("hello");
        tag.set_track(5);
        tag.set_genre(17);
        assert_eq!(tag.render(), sample_buf());
    }

    #[test]
    fn round_trip_v1_1() {
        let mut tag = Id3v1Tag::new();
        tag.set_title("Title");
        tag.set_artist("Artist");
        tag.set_album("Album");
        tag.set_year(1999).unwrap();
        tag.set_comment("a comment");
        tag.set_track(12);
        tag.set_genre(8);

        let parsed = Id3v1Tag::parse(&tag.render()).unwrap();
        assert_eq!(parsed.title(), tag.title());
        assert_eq!(parsed.artist(), tag.artist());
        assert_eq!(parsed.album(), tag.album());
        assert_eq!(parsed.year(), tag.year());
        assert_eq!(parsed.comment(), tag.comment());
        assert_eq!(parsed.track(), tag.track());
        assert_eq!(parsed.genre(), tag.genre());
        assert_eq!(parsed.version(), Version::V1_1);
    }

    #[test]
    fn round_trip_v1_0_full_comment() {
        let mut tag = Id3v1Tag::new();
        tag.set_title("Title");
        tag.set_comment(&"c".repeat(30));
        tag.set_genre(0);

        let parsed = Id3v1Tag::parse(&tag.render()).unwrap();
        assert_eq!(parsed.version(), Version::V1_0);
        assert_eq!(parsed.track(), None);
        assert_eq!(parsed.comment(), "c".repeat(30));
    }

    #[test]
    fn track_packing_truncates_comment_to_28() {
        let mut tag = Id3v1Tag::new();
        tag.set_comment(&"c".repeat(30));
        tag.set_track(3);

        let buf = tag.render();
        assert_eq!(&buf[97..125], "c".repeat(28).as_bytes());
        assert_eq!(buf[125], 0);
        assert_eq!(buf[126], 3);
        // The in-memory comment keeps its full length
        assert_eq!(tag.comment().len(), 30);
    }

    #[test]
    fn zero_track_renders_plain_comment() {
        let mut tag = Id3v1Tag::new();
        tag.set_comment("note");
        tag.set_track(0);
        let buf = tag.render();
        // No extension layout is forced for track 0
        assert_eq!(&buf[97..101], b"note");
        assert_eq!(tag.version(), Version::V1_0);
    }

    #[test]
    fn setters_truncate_long_fields() {
        let mut tag = Id3v1Tag::new();
        tag.set_title(&"t".repeat(64));
        assert_eq!(tag.title().len(), 30);
    }

    #[test]
    fn year_out_of_range_rejected() {
        let mut tag = Id3v1Tag::new();
        assert!(matches!(
            tag.set_year(10_000),
            Err(MetaError::ValueError(_))
        ));
        assert_eq!(tag.year(), 0);
    }

    #[test]
    fn find_id3v1_locates_trailing_record() {
        let mut data = vec![0xAA; 300];
        data.extend_from_slice(&sample_buf());
        assert_eq!(find_id3v1(&data), Some(300));

        assert_eq!(find_id3v1(&[0u8; 64]), None);
        assert_eq!(find_id3v1(&vec![0u8; 300]), None);
    }

    #[test]
    fn display_formats_all_fields() {
        let tag = Id3v1Tag::parse(&sample_buf()).unwrap();
        let out = tag.to_string();
        assert!(out.contains("tag: 1.1"));
        assert!(out.contains("genre: Rock(17)"));
        assert!(out.contains("track: 5"));
    }

    #[test]
    fn display_uses_sentinel_for_unset_track() {
        let tag = Id3v1Tag::new();
        assert!(tag.to_string().contains("track: -1"));
    }
}
