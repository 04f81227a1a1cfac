const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "3gp", "m4v", "ogv",
    "mpeg", "mpg", "f4v", "rmvb", "asf", "vob", "mxf", "divx",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "aac", "flac", "ogg", "alac", "m4a", "opus", "mid", "midi",
];

/// Extension based classification, case-insensitive.
///
/// Only the text after the final `.` is considered, so a bare `.mkv` counts
/// as media while `archive.mp4.zip` does not.
pub fn is_media_file(name: &str) -> bool {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return false;
    };

    VIDEO_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS)
        .any(|known| known.eq_ignore_ascii_case(extension))
}
