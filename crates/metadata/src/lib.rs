use std::path::Path;

use lofty::error::LoftyError;
use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use lofty::tag::Tag;

use common::{AudioFormat, AudioTrack};

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
    Unsupported(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
            MetadataError::Unsupported(ext) => write!(f, "unsupported format: {}", ext),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

/// Reads title/artist/album and the stream duration from a supported file.
///
/// Fields take the first value found, or an empty string. The duration is
/// truncated to whole seconds and treated as absent when the container
/// reports zero.
pub fn extract(path: &Path) -> Result<AudioTrack, MetadataError> {
    let format = AudioFormat::from_path(path);
    if !format.is_supported() {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        return Err(MetadataError::Unsupported(ext));
    }

    let tagged_file = lofty::read_from_path(path)?;

    let secs = tagged_file.properties().duration().as_secs();
    let duration_secs = if secs > 0 { Some(secs) } else { None };

    let (title, artist, album) = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag())
    {
        Some(tag) => (
            first_string(tag, &ItemKey::TrackTitle),
            first_string(tag, &ItemKey::TrackArtist),
            first_string(tag, &ItemKey::AlbumTitle),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    Ok(AudioTrack {
        path: path.to_path_buf(),
        format,
        title: normalize_text(&title),
        artist: normalize_text(&artist),
        album: normalize_text(&album),
        duration_secs,
    })
}

fn first_string(tag: &Tag, key: &ItemKey) -> String {
    tag.get_string(key).unwrap_or("").to_string()
}

/// The one normalization rule: fullwidth ampersand to ASCII ampersand.
pub fn normalize_text(value: &str) -> String {
    value.replace('\u{FF06}', "&")
}
