use std::fs::File;
use std::path::Path;

use id3::frame::Lyrics;
use id3::{Content, TagLike, Version};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::ogg::VorbisFile;
use lofty::prelude::{AudioFile, TagExt};
use tracing::warn;

use common::AudioFormat;

/// Vorbis comment field holding the lyrics. Vorbis field names are
/// matched ASCII-case-insensitively.
pub const VORBIS_LYRICS_KEY: &str = "LYRICS";

#[derive(Debug)]
pub enum TagError {
    Io(std::io::Error),
    Id3(id3::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagError::Io(err) => write!(f, "io error: {}", err),
            TagError::Id3(err) => write!(f, "id3 error: {}", err),
            TagError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for TagError {}

impl From<std::io::Error> for TagError {
    fn from(err: std::io::Error) -> Self {
        TagError::Io(err)
    }
}

impl From<id3::Error> for TagError {
    fn from(err: id3::Error) -> Self {
        TagError::Id3(err)
    }
}

impl From<LoftyError> for TagError {
    fn from(err: LoftyError) -> Self {
        TagError::Lofty(err)
    }
}

/// Lyrics accessor over the two supported tag containers, selected once
/// per file by format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LyricsTag {
    Id3,
    Vorbis,
}

impl LyricsTag {
    pub fn for_format(format: AudioFormat) -> Option<Self> {
        match format {
            AudioFormat::Mp3 => Some(LyricsTag::Id3),
            AudioFormat::Ogg => Some(LyricsTag::Vorbis),
            AudioFormat::Unsupported => None,
        }
    }

    /// Returns the embedded lyrics if present and non-empty. Read failures
    /// are logged and treated as "no lyrics"; they never abort processing.
    pub fn read_lyrics(&self, path: &Path) -> Option<String> {
        let result = match self {
            LyricsTag::Id3 => read_id3_lyrics(path),
            LyricsTag::Vorbis => read_vorbis_lyrics(path),
        };
        match result {
            Ok(lyrics) => lyrics,
            Err(err) => {
                warn!("Failed to read lyrics from {:?}: {}", path, err);
                None
            }
        }
    }

    /// Replaces any existing lyrics with `text` and saves the file. The save
    /// either completes fully or leaves the file as it was.
    pub fn write_lyrics(&self, path: &Path, text: &str) -> Result<(), TagError> {
        match self {
            LyricsTag::Id3 => write_id3_lyrics(path, text),
            LyricsTag::Vorbis => write_vorbis_lyrics(path, text),
        }
    }
}

fn read_id3_lyrics(path: &Path) -> Result<Option<String>, TagError> {
    let tag = match id3::Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    for frame in tag.frames() {
        if frame.id() != "USLT" {
            continue;
        }
        if let Content::Lyrics(lyrics) = frame.content() {
            let text = lyrics.text.trim();
            if !text.is_empty() {
                return Ok(Some(text.to_string()));
            }
        }
    }
    Ok(None)
}

fn write_id3_lyrics(path: &Path, text: &str) -> Result<(), TagError> {
    let mut tag = match id3::Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => id3::Tag::new(),
        Err(err) => return Err(err.into()),
    };
    let _ = tag.remove("USLT");
    let _ = tag.add_frame(Lyrics {
        lang: "eng".to_string(),
        description: "Lyrics".to_string(),
        text: text.to_string(),
    });
    tag.write_to_path(path, Version::Id3v24)?;
    Ok(())
}

fn read_vorbis_lyrics(path: &Path) -> Result<Option<String>, TagError> {
    let mut file = File::open(path)?;
    let vorbis = VorbisFile::read_from(&mut file, ParseOptions::new())?;
    let lyrics = vorbis
        .vorbis_comments()
        .get(VORBIS_LYRICS_KEY)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    Ok(lyrics)
}

fn write_vorbis_lyrics(path: &Path, text: &str) -> Result<(), TagError> {
    let mut file = File::open(path)?;
    let vorbis = VorbisFile::read_from(&mut file, ParseOptions::new())?;
    let mut comments = vorbis.vorbis_comments().clone();
    comments.insert(VORBIS_LYRICS_KEY.to_string(), text.to_string());
    comments.save_to_path(path, WriteOptions::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{LyricsTag, VORBIS_LYRICS_KEY};
    use common::AudioFormat;
    use std::path::PathBuf;

    fn empty_mp3(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, []).unwrap();
        path
    }

    // CRC-32 as used by Ogg pages: polynomial 0x04C11DB7, no reflection,
    // zero init and final xor.
    fn ogg_crc(data: &[u8]) -> u32 {
        let mut crc: u32 = 0;
        for &byte in data {
            crc ^= (byte as u32) << 24;
            for _ in 0..8 {
                crc = if crc & 0x8000_0000 != 0 {
                    (crc << 1) ^ 0x04C1_1DB7
                } else {
                    crc << 1
                };
            }
        }
        crc
    }

    fn ogg_page(header_type: u8, granule: u64, sequence: u32, packets: &[&[u8]]) -> Vec<u8> {
        let mut page = Vec::new();
        page.extend_from_slice(b"OggS");
        page.push(0);
        page.push(header_type);
        page.extend_from_slice(&granule.to_le_bytes());
        page.extend_from_slice(&0x1357_9BDFu32.to_le_bytes());
        page.extend_from_slice(&sequence.to_le_bytes());
        page.extend_from_slice(&[0u8; 4]);
        page.push(packets.len() as u8);
        for packet in packets {
            page.push(packet.len() as u8);
        }
        for packet in packets {
            page.extend_from_slice(packet);
        }
        let crc = ogg_crc(&page);
        page[22..26].copy_from_slice(&crc.to_le_bytes());
        page
    }

    fn vorbis_comment_packet(comments: &[(&str, &str)]) -> Vec<u8> {
        let mut packet = vec![0x03];
        packet.extend_from_slice(b"vorbis");
        let vendor = b"forged";
        packet.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        packet.extend_from_slice(vendor);
        packet.extend_from_slice(&(comments.len() as u32).to_le_bytes());
        for (key, value) in comments {
            let entry = format!("{}={}", key, value);
            packet.extend_from_slice(&(entry.len() as u32).to_le_bytes());
            packet.extend_from_slice(entry.as_bytes());
        }
        packet.push(0x01);
        packet
    }

    /// Forged single-stream Ogg Vorbis file: identification, comment, and
    /// setup header packets plus one silent audio page.
    fn vorbis_ogg(dir: &tempfile::TempDir, name: &str, comments: &[(&str, &str)]) -> PathBuf {
        let mut ident = vec![0x01];
        ident.extend_from_slice(b"vorbis");
        ident.extend_from_slice(&0u32.to_le_bytes());
        ident.push(2);
        ident.extend_from_slice(&44_100u32.to_le_bytes());
        ident.extend_from_slice(&0i32.to_le_bytes());
        ident.extend_from_slice(&128_000i32.to_le_bytes());
        ident.extend_from_slice(&0i32.to_le_bytes());
        ident.push(0xB8);
        ident.push(0x01);

        let comment = vorbis_comment_packet(comments);

        let mut setup = vec![0x05];
        setup.extend_from_slice(b"vorbis");
        setup.extend_from_slice(&[0u8; 16]);
        setup.push(0x01);

        let audio = [0u8; 64];

        let mut data = ogg_page(0x02, 0, 0, &[&ident]);
        data.extend(ogg_page(0x00, 0, 1, &[&comment, &setup]));
        data.extend(ogg_page(0x04, 44_100, 2, &[&audio]));

        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn selects_variant_by_format() {
        assert_eq!(
            LyricsTag::for_format(AudioFormat::Mp3),
            Some(LyricsTag::Id3)
        );
        assert_eq!(
            LyricsTag::for_format(AudioFormat::Ogg),
            Some(LyricsTag::Vorbis)
        );
        assert_eq!(LyricsTag::for_format(AudioFormat::Unsupported), None);
    }

    #[test]
    fn vorbis_key_is_lyrics() {
        assert!(VORBIS_LYRICS_KEY.eq_ignore_ascii_case("lyrics"));
    }

    #[test]
    fn id3_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_mp3(&dir, "song.mp3");

        let text = "[00:00.00] ...\n[00:12.50] first line\nsecond line";
        LyricsTag::Id3.write_lyrics(&path, text).unwrap();
        assert_eq!(LyricsTag::Id3.read_lyrics(&path), Some(text.to_string()));
    }

    #[test]
    fn id3_write_replaces_prior_lyrics_with_one_frame() {
        use id3::TagLike;

        let dir = tempfile::tempdir().unwrap();
        let path = empty_mp3(&dir, "song.mp3");

        LyricsTag::Id3.write_lyrics(&path, "old text").unwrap();
        LyricsTag::Id3.write_lyrics(&path, "new text").unwrap();

        let tag = id3::Tag::read_from_path(&path).unwrap();
        let frames: Vec<_> = tag.frames().filter(|f| f.id() == "USLT").collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(LyricsTag::Id3.read_lyrics(&path), Some("new text".to_string()));
    }

    #[test]
    fn id3_written_frame_carries_language_and_description() {
        use id3::Content;

        let dir = tempfile::tempdir().unwrap();
        let path = empty_mp3(&dir, "song.mp3");

        LyricsTag::Id3.write_lyrics(&path, "text").unwrap();

        let tag = id3::Tag::read_from_path(&path).unwrap();
        let frame = tag.frames().find(|f| f.id() == "USLT").unwrap();
        match frame.content() {
            Content::Lyrics(lyrics) => {
                assert_eq!(lyrics.lang, "eng");
                assert_eq!(lyrics.description, "Lyrics");
            }
            other => panic!("unexpected frame content: {:?}", other),
        }
    }

    #[test]
    fn read_without_tag_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_mp3(&dir, "bare.mp3");
        assert_eq!(LyricsTag::Id3.read_lyrics(&path), None);
    }

    #[test]
    fn read_whitespace_lyrics_is_none() {
        use id3::frame::Lyrics;
        use id3::TagLike;

        let dir = tempfile::tempdir().unwrap();
        let path = empty_mp3(&dir, "blank.mp3");

        let mut tag = id3::Tag::new();
        let _ = tag.add_frame(Lyrics {
            lang: "eng".to_string(),
            description: String::new(),
            text: "   \n  ".to_string(),
        });
        tag.write_to_path(&path, id3::Version::Id3v24).unwrap();

        assert_eq!(LyricsTag::Id3.read_lyrics(&path), None);
    }

    #[test]
    fn vorbis_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = vorbis_ogg(&dir, "track.ogg", &[("TITLE", "Song")]);

        let text = "[00:00.00] ...\n[00:08.00] first line";
        LyricsTag::Vorbis.write_lyrics(&path, text).unwrap();
        assert_eq!(
            LyricsTag::Vorbis.read_lyrics(&path),
            Some(text.to_string())
        );
    }

    #[test]
    fn vorbis_write_replaces_prior_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = vorbis_ogg(&dir, "track.ogg", &[("LYRICS", "old text")]);

        LyricsTag::Vorbis.write_lyrics(&path, "new text").unwrap();
        assert_eq!(
            LyricsTag::Vorbis.read_lyrics(&path),
            Some("new text".to_string())
        );
    }

    #[test]
    fn vorbis_key_lookup_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = vorbis_ogg(&dir, "track.ogg", &[("lyrics", "lowercase key")]);
        assert_eq!(
            LyricsTag::Vorbis.read_lyrics(&path),
            Some("lowercase key".to_string())
        );
    }

    #[test]
    fn vorbis_read_without_lyrics_field_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = vorbis_ogg(&dir, "track.ogg", &[("TITLE", "Song"), ("ARTIST", "A")]);
        assert_eq!(LyricsTag::Vorbis.read_lyrics(&path), None);
    }

    #[test]
    fn vorbis_read_failure_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ogg");
        std::fs::write(&path, b"not an ogg stream").unwrap();
        assert_eq!(LyricsTag::Vorbis.read_lyrics(&path), None);
    }

    #[test]
    fn vorbis_write_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ogg");
        std::fs::write(&path, b"not an ogg stream").unwrap();

        let err = LyricsTag::Vorbis.write_lyrics(&path, "text");
        assert!(err.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"not an ogg stream");
    }
}
