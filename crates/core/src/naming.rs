//! File-name validation and identifier derivation for registered videos.

use std::path::Path;

use crate::error::CoreError;

/// Longest accepted client-supplied file name, in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Longest slug kept from the file stem when deriving identifiers.
const MAX_SLUG_LEN: usize = 48;

/// Number of hex characters of randomness appended to a video ID.
const ID_SUFFIX_LEN: usize = 12;

/// Slug used when a file stem contains nothing usable.
const FALLBACK_SLUG: &str = "video";

/// Validate a client-supplied file name.
///
/// The name is only ever used as a label and as input to slug
/// derivation, but anything path-like is rejected outright.
pub fn validate_file_name(file_name: &str) -> Result<(), CoreError> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("fileName must not be empty".into()));
    }
    if file_name.len() > MAX_FILE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "fileName must be at most {MAX_FILE_NAME_LEN} bytes"
        )));
    }
    if file_name.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(CoreError::Validation(
            "fileName must not contain path separators".into(),
        ));
    }
    if file_name.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "fileName must not contain control characters".into(),
        ));
    }
    Ok(())
}

/// The file name without its final extension (`"Demo.final.mp4"` -> `"Demo.final"`).
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Derive a fresh video ID from the file name: `{slug}-{random hex}`.
pub fn derive_video_id(file_name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slugify(file_stem(file_name)), &suffix[..ID_SUFFIX_LEN])
}

/// Whether `id` has the shape produced by [`derive_video_id`].
///
/// Used before an ID is turned into a filesystem path.
pub fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SLUG_LEN + 1 + ID_SUFFIX_LEN
        && id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !id.starts_with('-')
}

/// Relative keyframe path for shot `index` (0-based) of a video.
pub fn keyframe_path(file_name: &str, index: usize) -> String {
    format!("keyframes/{}-shot-{}.jpg", slugify(file_stem(file_name)), index + 1)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_file_name("demo.mp4").is_ok());
        assert!(validate_file_name("Team Meeting (final).mov").is_ok());
    }

    #[test]
    fn rejects_empty_and_path_like_names() {
        assert_matches!(validate_file_name(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_file_name("   "), Err(CoreError::Validation(_)));
        assert_matches!(validate_file_name("../etc/passwd"), Err(CoreError::Validation(_)));
        assert_matches!(validate_file_name("a\\b.mp4"), Err(CoreError::Validation(_)));
        assert_matches!(validate_file_name("a\nb.mp4"), Err(CoreError::Validation(_)));
        let long = "x".repeat(MAX_FILE_NAME_LEN + 1);
        assert_matches!(validate_file_name(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn stem_drops_only_last_extension() {
        assert_eq!(file_stem("demo.mp4"), "demo");
        assert_eq!(file_stem("talk.final.mov"), "talk.final");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Team Meeting (final)"), "team-meeting-final");
        assert_eq!(slugify("__demo__"), "demo");
        assert_eq!(slugify("日本語"), "video");
    }

    #[test]
    fn derived_ids_carry_slug_and_are_unique() {
        let a = derive_video_id("Product Demo.mp4");
        let b = derive_video_id("Product Demo.mp4");
        assert!(a.starts_with("product-demo-"));
        assert_ne!(a, b);
        assert!(is_valid_video_id(&a));
    }

    #[test]
    fn rejects_ids_that_could_escape_a_directory() {
        assert!(!is_valid_video_id("../secret"));
        assert!(!is_valid_video_id("a/b"));
        assert!(!is_valid_video_id(""));
        assert!(!is_valid_video_id("-leading"));
    }

    #[test]
    fn keyframe_paths_are_one_based() {
        assert_eq!(keyframe_path("demo.mp4", 0), "keyframes/demo-shot-1.jpg");
        assert_eq!(keyframe_path("demo.mp4", 3), "keyframes/demo-shot-4.jpg");
    }
}
