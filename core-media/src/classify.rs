//! Media classification
//!
//! A MIME type that resolves to `image/*` or `video/*` decides the kind;
//! otherwise the extension allow-lists below decide; otherwise the file is
//! [`MediaType::Unknown`]. Yandex reports MIME types, Mail.ru does not, so both
//! tiers are needed.

use crate::types::MediaType;

pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic", "gif", "bmp", "tiff"];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mpeg", "mkv", "webm", "flv", "wmv", "3gp",
];

/// Classify a file by optional MIME hint, falling back to its extension.
///
/// ```ignore
/// assert_eq!(classify_media("a.mov", Some("image/png")), MediaType::Photo);
/// assert_eq!(classify_media("a.mov", None), MediaType::Video);
/// ```
pub fn classify_media(file_name: &str, mime_type: Option<&str>) -> MediaType {
    if let Some(media_type) = mime_type.and_then(classify_mime) {
        return media_type;
    }

    match file_extension(file_name) {
        Some(ext) => classify_extension(&ext.to_ascii_lowercase()),
        None => MediaType::Unknown,
    }
}

fn classify_mime(mime_type: &str) -> Option<MediaType> {
    let mime = mime_type.trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
        Some(MediaType::Photo)
    } else if mime.starts_with("video/") {
        Some(MediaType::Video)
    } else {
        None
    }
}

fn classify_extension(ext: &str) -> MediaType {
    if PHOTO_EXTENSIONS.contains(&ext) {
        MediaType::Photo
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        MediaType::Video
    } else {
        MediaType::Unknown
    }
}

/// Text after the last `.`; `None` when there is no dot or it is the last char
pub fn file_extension(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
