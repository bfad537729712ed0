use tracing::{debug, warn};

use common::AudioTrack;

use crate::provider::{LyricsRequest, LyricsSource};

/// First line of every stored lyric. Downstream players key on it to
/// treat the text as synchronized.
pub const LYRICS_MARKER: &str = "[00:00.00] ...";

/// Multi-artist tags in the wild separate names with a slash (ASCII or
/// fullwidth) or a comma.
const ARTIST_SEPARATORS: [char; 3] = ['/', '\u{FF0F}', ','];

pub fn split_artists(artist: &str) -> Vec<String> {
    artist
        .split(ARTIST_SEPARATORS)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// The four lookup tiers, broadest match first:
/// 1. as extracted, album included;
/// 2. album dropped;
/// 3. artist list normalized to `", "` separators;
/// 4. first listed artist only.
pub fn query_tiers(track: &AudioTrack) -> Vec<LyricsRequest> {
    let parts = split_artists(&track.artist);
    vec![
        LyricsRequest {
            track: track.title.clone(),
            artist: track.artist.clone(),
            album: Some(track.album.clone()),
            duration: track.duration_secs,
        },
        LyricsRequest {
            track: track.title.clone(),
            artist: track.artist.clone(),
            album: None,
            duration: track.duration_secs,
        },
        LyricsRequest {
            track: track.title.clone(),
            artist: parts.join(", "),
            album: None,
            duration: track.duration_secs,
        },
        LyricsRequest {
            track: track.title.clone(),
            artist: parts.first().cloned().unwrap_or_default(),
            album: None,
            duration: track.duration_secs,
        },
    ]
}

/// Tries each tier in order and returns the formatted lyrics of the first
/// hit. A tier's provider error is logged and counts as a miss for that
/// tier only.
pub async fn resolve(source: &dyn LyricsSource, track: &AudioTrack) -> Option<String> {
    for (index, request) in query_tiers(track).iter().enumerate() {
        debug!(
            "Lyrics lookup tier {} for {:?}: artist '{}'",
            index + 1,
            track.path,
            request.artist
        );
        match source.lookup(request).await {
            Ok(Some(lyrics)) => {
                if let Some(text) = lyrics.effective() {
                    debug!("Lyrics found at tier {} for {:?}", index + 1, track.path);
                    return Some(format_timestamped(text));
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "Lyrics lookup tier {} failed for {:?}: {}",
                    index + 1,
                    track.path,
                    err
                );
            }
        }
    }
    None
}

/// Prepends the marker line and drops blank lines; every other line is
/// carried through unchanged.
pub fn format_timestamped(text: &str) -> String {
    let mut out = String::from(LYRICS_MARKER);
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(line);
    }
    out
}
