//! Filesystem layout under the storage root.
//!
//! ```text
//! {root}/uploads/{video_id}          raw uploaded bytes
//! {root}/keyframes/{slug}-shot-N.jpg  keyframe images (relative path on Shot)
//! ```

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;
use crate::naming;

/// Subdirectory holding uploaded video bytes.
pub const UPLOADS_DIR: &str = "uploads";

/// Subdirectory holding keyframe images.
pub const KEYFRAMES_DIR: &str = "keyframes";

/// URL prefix under which the storage root is served.
pub const STATIC_URL_PREFIX: &str = "/static";

/// Path of the uploaded bytes for a video.
pub fn upload_path(root: &Path, video_id: &str) -> Result<PathBuf, CoreError> {
    if !naming::is_valid_video_id(video_id) {
        return Err(CoreError::Validation(format!(
            "Invalid video id '{video_id}'"
        )));
    }
    Ok(root.join(UPLOADS_DIR).join(video_id))
}

/// Resolve a client-supplied relative path against the storage root.
///
/// Only plain path segments are accepted; `..`, absolute paths and
/// drive prefixes are rejected before the filesystem is touched.
pub fn resolve_static_path(root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    let relative_path = Path::new(relative);
    let mut segments = 0usize;

    for component in relative_path.components() {
        match component {
            Component::Normal(_) => segments += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CoreError::Validation(format!(
                    "Path '{relative}' escapes the storage root"
                )));
            }
        }
    }

    if segments == 0 {
        return Err(CoreError::Validation("Empty static path".into()));
    }

    Ok(root.join(relative_path))
}

/// Public URL for a shot's keyframe.
pub fn keyframe_url(keyframe_path: &str) -> String {
    let name = Path::new(keyframe_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(keyframe_path);
    format!("{STATIC_URL_PREFIX}/{KEYFRAMES_DIR}/{name}")
}

/// Guess a Content-Type from a file extension.
pub fn content_type_for_extension(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
