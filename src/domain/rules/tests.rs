// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    const ILLEGAL: &[char] = &['\\', '/', '?', '%', '*', ':', '|', '"', '<', '>', '\r', '\n', '#'];

    fn assert_well_formed(output: &str, extension: &str) {
        assert!(output.ends_with(extension), "{output:?} should end with {extension}");
        let stem = &output[..output.len() - extension.len()];
        assert!(!stem.is_empty());
        assert!(stem.chars().count() <= MAX_TITLE_CHARS, "{stem:?} too long");
        assert!(!stem.to_ascii_lowercase().ends_with(&extension.to_ascii_lowercase()));
        assert!(!output.contains(ILLEGAL), "{output:?} has illegal characters");
    }

    #[test]
    fn test_sanitize_drops_hashtags() {
        let output = sanitize_filename("Grandma's First VR Game #EpicFail #LOL", ".mp4");
        assert_eq!(output, "Grandma's First VR Game.mp4");
    }

    #[test]
    fn test_sanitize_accepts_extension_without_dot() {
        assert_eq!(sanitize_filename("Cat Fails Epic Jump #LOL #Cats", "mov"), "Cat Fails Epic Jump.mov");
    }

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        let output = sanitize_filename("a/b\\c?d%e*f:g|h\"i<j>k", ".mp4");
        assert_eq!(output, "a-b-c-d-e-f-g-h-i-j-k.mp4");
    }

    #[test]
    fn test_sanitize_line_breaks_become_hyphens() {
        assert_eq!(sanitize_filename("Top\nBottom", ".mp4"), "Top-Bottom.mp4");
        assert_eq!(sanitize_filename("Top\r\nBottom", ".mp4"), "Top--Bottom.mp4");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_filename("  Dog   on\ta   skateboard  ", ".mp4"), "Dog on a skateboard.mp4");
    }

    #[test]
    fn test_sanitize_empty_uses_fallback() {
        assert_eq!(sanitize_filename("", ".mp4"), "untitled video.mp4");
        assert_eq!(sanitize_filename("   ", ".mp4"), "untitled video.mp4");
        assert_eq!(sanitize_filename("#only #tags", ".mp4"), "untitled video.mp4");
        assert_eq!(sanitize_filename(".mp4", ".mp4"), "untitled video.mp4");
    }

    #[test]
    fn test_sanitize_cleans_the_extension() {
        let output = sanitize_filename("a", ".mo:v");
        assert_eq!(output, "a.mo-v");
        assert_well_formed(&output, ".mo-v");
        assert_eq!(sanitize_filename(&output, ".mo:v"), output);

        assert_eq!(sanitize_filename("Clip", "m/p#4"), "Clip.m-p-4");
        assert_eq!(normalize_extension("mo:v"), ".mo-v");
    }

    #[test]
    fn test_sanitize_never_returns_dot_names() {
        assert_eq!(sanitize_filename(".", ""), "untitled video");
        assert_eq!(sanitize_filename("..", ""), "untitled video");
        assert_eq!(sanitize_filename(" ... ", ".mp4"), "untitled video.mp4");
        assert_eq!(sanitize_filename("Wait... what", ""), "Wait... what");
    }

    #[test]
    fn test_sanitize_truncates_to_limit() {
        let long = "x".repeat(250);
        let output = sanitize_filename(&long, ".mp4");
        assert_eq!(output, format!("{}.mp4", "x".repeat(MAX_TITLE_CHARS)));
    }

    #[test]
    fn test_sanitize_truncates_by_characters_not_bytes() {
        let long = "é".repeat(150);
        let output = sanitize_filename(&long, ".mp4");
        assert_eq!(output.chars().count(), MAX_TITLE_CHARS + 4);
    }

    #[test]
    fn test_sanitize_keeps_matching_extension_once() {
        assert_eq!(sanitize_filename("Funny Cat.mp4", ".mp4"), "Funny Cat.mp4");
        assert_eq!(sanitize_filename("Funny Cat.MP4", ".mp4"), "Funny Cat.mp4");
        assert_eq!(sanitize_filename("Funny Cat.mp4.mp4", ".mp4"), "Funny Cat.mp4");
    }

    #[test]
    fn test_sanitize_replaces_short_foreign_extension() {
        assert_eq!(sanitize_filename("Funny Cat.mov", ".mp4"), "Funny Cat.mp4");
        assert_eq!(sanitize_filename("Funny Cat.webm", ".mp4"), "Funny Cat.mp4");
    }

    #[test]
    fn test_sanitize_keeps_long_dotted_suffix() {
        assert_eq!(sanitize_filename("Hello.World", ".mp4"), "Hello.World.mp4");
        assert_eq!(sanitize_filename("Mr. Bean Returns", ".mp4"), "Mr. Bean Returns.mp4");
    }

    #[test]
    fn test_sanitize_leading_dot_is_not_an_extension() {
        assert_eq!(sanitize_filename(".mov", ".mp4"), ".mov.mp4");
    }

    #[test]
    fn test_sanitize_without_target_extension() {
        assert_eq!(sanitize_filename("Plain Title #tag", ""), "Plain Title");
        assert_eq!(sanitize_filename("Plain.Title", "."), "Plain.Title");
    }

    #[test]
    fn test_sanitize_preserves_inner_punctuation() {
        assert_eq!(sanitize_filename("Wait... What?! #wow", ".mkv"), "Wait... What-!.mkv");
    }

    #[test]
    fn test_sanitize_output_properties_hold() {
        let repeated = "word ".repeat(60);
        let near_limit = format!("{}.mp4tail", "y".repeat(96));
        let inputs: [&str; 11] = [
            "Grandma's First VR Game #EpicFail #LOL",
            "",
            "###",
            "a:b\n#c\r\n  d",
            "Oh no...",
            "x.mp4.mov",
            "trailing dot.",
            &repeated,
            &near_limit,
            "C# is fun",
            "\"Quoted\" <tag> | pipe",
        ];
        for extension in [".mp4", ".MOV", ".webm"] {
            for input in inputs {
                let once = sanitize_filename(input, extension);
                assert_well_formed(&once, extension);
                assert_eq!(sanitize_filename(&once, extension), once, "not idempotent for {input:?}");
            }
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("clip.mov"), ".mov");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("mp4"), ".mp4");
        assert_eq!(normalize_extension(".mp4"), ".mp4");
        assert_eq!(normalize_extension(" .mkv "), ".mkv");
        assert_eq!(normalize_extension(""), "");
        assert_eq!(normalize_extension("."), "");
    }

    #[test]
    fn test_build_prompt_inserts_name() {
        let prompt = build_prompt(DEFAULT_PROMPT, "clip.mov");
        assert!(prompt.starts_with("This is a frame from a video called \"clip.mov\"."));
        assert!(!prompt.contains("{name}"));
    }

    #[test]
    fn test_analysis_eligibility() {
        let mut record = FileRecord::new(VideoSource::new("a.mp4", "video/mp4", vec![0u8]));
        assert!(is_eligible_for_analysis(&record));

        record.is_selected = false;
        assert!(!is_eligible_for_analysis(&record));

        record.is_selected = true;
        for status in [FileStatus::Analyzed, FileStatus::Error, FileStatus::Analyzing] {
            record.status = status;
            assert!(!is_eligible_for_analysis(&record), "{status:?}");
        }

        record.status = FileStatus::Renamed;
        assert!(is_eligible_for_analysis(&record));
    }

    #[test]
    fn test_download_eligibility() {
        let mut record = FileRecord::new(VideoSource::new("a.mp4", "video/mp4", vec![0u8]));
        record.status = FileStatus::Analyzed;
        assert!(!is_eligible_for_download(&record));

        record.suggested_name = "Title".to_string();
        assert!(is_eligible_for_download(&record));

        record.is_selected = false;
        assert!(!is_eligible_for_download(&record));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("clip.MOV"), "video/quicktime");
        assert_eq!(content_type_for("/tmp/a/b.mp4"), "video/mp4");
        assert_eq!(content_type_for("logo.png"), "image/png");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }
}
