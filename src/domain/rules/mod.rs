// Domain rules - Business logic and policies

use std::path::Path;

use crate::domain::model::*;

/// Longest title kept in front of the extension, counted in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// Title used when nothing usable is left after sanitizing
pub const FALLBACK_TITLE: &str = "untitled video";

/// Characters that cannot appear in a file name on common filesystems
const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '?', '%', '*', ':', '|', '"', '<', '>', '\r', '\n'];

/// Prompt sent alongside each frame; `{name}` is replaced by the original file name
pub const DEFAULT_PROMPT: &str = "This is a frame from a video called \"{name}\". Come up with a short, funny, and viral-style title for this video. Something that would make you laugh and click. Aim for 2-5 words. After the title, add 5 funny and relevant hashtags that are viral on platforms like YouTube, Facebook, and TikTok. For example: \"Grandma's First VR Game #EpicFail #LOL #VR #Gaming #Funny\". Output only the new title and hashtags.";

/// Turn a free-text title into a legal file name ending in `original_extension`.
///
/// Hashtags (a `#` and the word glued to it) are dropped, illegal
/// characters become `-`, whitespace collapses to single spaces and the
/// title is cut to [`MAX_TITLE_CHARS`]. Whatever extension-like tail the
/// title carried is replaced by the target extension, so the result ends
/// in exactly one copy of it; illegal characters in the extension are
/// replaced too. Applying the function to its own output is a no-op.
pub fn sanitize_filename(name: &str, original_extension: &str) -> String {
    let extension = normalize_extension(original_extension);

    let cleaned = collapse_whitespace(&replace_illegal_chars(&strip_hashtags(name)));
    let stem = strip_extension(&cleaned, &extension);
    let stem = truncate_chars(stem, MAX_TITLE_CHARS).trim();
    let stem = strip_trailing_extension(stem, &extension);

    // "." and ".." name directories, not files
    let mut sanitized = if stem.trim_matches('.').is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        stem.to_string()
    };
    sanitized.push_str(&extension);
    sanitized
}

/// Extension of a file name including the leading dot, or "" when there is none
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[dot..],
        _ => "",
    }
}

/// Give an extension exactly one leading dot and no illegal characters;
/// blank input means no extension
pub fn normalize_extension(extension: &str) -> String {
    let bare = extension.trim().trim_start_matches('.');
    if bare.is_empty() {
        String::new()
    } else {
        format!(".{}", replace_illegal_chars(bare).replace('#', "-"))
    }
}

fn strip_hashtags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        if ch == '#' {
            in_tag = true;
        } else if in_tag && !ch.is_whitespace() {
            continue;
        } else {
            in_tag = false;
            out.push(ch);
        }
    }
    out
}

fn replace_illegal_chars(text: &str) -> String {
    text.chars()
        .map(|ch| if ILLEGAL_FILENAME_CHARS.contains(&ch) { '-' } else { ch })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    if suffix.is_empty() || text.len() < suffix.len() {
        return false;
    }
    let start = text.len() - suffix.len();
    text.is_char_boundary(start) && text[start..].eq_ignore_ascii_case(suffix)
}

/// Remove every trailing copy of `extension`, trimming as we go
fn strip_trailing_extension<'a>(mut text: &'a str, extension: &str) -> &'a str {
    loop {
        text = text.trim_end();
        if ends_with_ignore_case(text, extension) {
            text = &text[..text.len() - extension.len()];
        } else {
            return text;
        }
    }
}

/// Drop the target extension, or failing that a short foreign one like `.mov`
fn strip_extension<'a>(text: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() {
        return text;
    }
    if ends_with_ignore_case(text, extension) {
        return strip_trailing_extension(text, extension);
    }

    let without_suffix = match text.rfind('.') {
        Some(dot) if dot > 0 && text[dot..].chars().count() <= 5 => &text[..dot],
        _ => text,
    };
    strip_trailing_extension(without_suffix, extension)
}

/// Fill the prompt template with the original file name
pub fn build_prompt(template: &str, original_name: &str) -> String {
    template.replace("{name}", original_name)
}

/// Bulk analyze takes selected records that have not already finished or failed
pub fn is_eligible_for_analysis(record: &FileRecord) -> bool {
    record.is_selected && !matches!(record.status, FileStatus::Analyzed | FileStatus::Error | FileStatus::Analyzing)
}

/// Bulk download takes selected, analyzed records that carry a name
pub fn is_eligible_for_download(record: &FileRecord) -> bool {
    record.is_selected && record.status == FileStatus::Analyzed && record.has_suggested_name()
}

/// Whether a single record may be sent back through analysis on request
pub fn is_retryable(record: &FileRecord) -> bool {
    record.status != FileStatus::Analyzing
}

/// MIME type for a file name, derived from its extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mpg" | "mpeg" => "video/mpeg",
        "ts" | "mts" | "m2ts" => "video/mp2t",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests;
