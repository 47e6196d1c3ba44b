use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config, credentials and working directory
fn renamer(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reel-renamer").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("RENAMER_OUTPUT_DIR")
        .env_remove("RENAMER_AUTO_DOWNLOAD");
    cmd
}

#[test]
fn test_sanitize_prints_the_file_name() {
    let home = TempDir::new().unwrap();
    renamer(home.path())
        .args(["sanitize", "--title", "Cat Fails Epic Jump #LOL #Cats", "--ext", ".mov"])
        .assert()
        .success()
        .stdout("Cat Fails Epic Jump.mov\n");
}

#[test]
fn test_sanitize_accepts_bare_extensions_and_falls_back() {
    let home = TempDir::new().unwrap();
    renamer(home.path())
        .args(["sanitize", "--title", "#OnlyTags #Here", "--ext", "mp4"])
        .assert()
        .success()
        .stdout("untitled video.mp4\n");
}

#[test]
fn test_missing_input_fails() {
    let home = TempDir::new().unwrap();
    renamer(home.path())
        .args(["suggest", "--in", "does-not-exist.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input does not exist"));
}

#[test]
fn test_missing_credential_lists_files_and_fails() {
    let home = TempDir::new().unwrap();
    let clips = home.path().join("clips");
    fs::create_dir(&clips).unwrap();
    fs::write(clips.join("clip.mov"), b"not really a movie").unwrap();
    fs::write(clips.join("readme.txt"), b"ignored").unwrap();

    renamer(home.path())
        .args(["rename", "--in", "clips", "--yes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("clip.mov").and(predicate::str::contains("Pending Analysis")))
        .stdout(predicate::str::contains("readme.txt").not())
        .stderr(predicate::str::contains("Skipping non-video file: readme.txt"))
        .stderr(predicate::str::contains("Gemini API Key is missing"));

    assert!(!home.path().join("renamed").exists());
}

#[test]
fn test_json_output_for_disabled_pipeline() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("clip.mp4"), b"data").unwrap();

    renamer(home.path())
        .args(["suggest", "--in", "clip.mp4", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"original_name\": \"clip.mp4\""))
        .stdout(predicate::str::contains("\"status\": \"Pending\""));
}

#[test]
fn test_logo_lifecycle() {
    let home = TempDir::new().unwrap();
    let logo = home.path().join("logo.png");
    image::RgbImage::new(4, 4).save(&logo).unwrap();

    renamer(home.path())
        .args(["logo", "show"])
        .assert()
        .success()
        .stdout("No logo set\n");

    renamer(home.path())
        .args(["logo", "set"])
        .arg(&logo)
        .assert()
        .success()
        .stdout(predicate::str::contains("Logo saved (image/png)"));

    renamer(home.path())
        .args(["logo", "show", "--uri"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("data:image/png;base64,"));

    renamer(home.path())
        .args(["logo", "remove"])
        .assert()
        .success()
        .stdout("Logo removed\n");

    renamer(home.path())
        .args(["logo", "show"])
        .assert()
        .success()
        .stdout("No logo set\n");
}

#[test]
fn test_logo_rejects_non_images_without_failing() {
    let home = TempDir::new().unwrap();
    let notes = home.path().join("notes.txt");
    fs::write(&notes, "just text").unwrap();

    renamer(home.path())
        .args(["logo", "set"])
        .arg(&notes)
        .assert()
        .success()
        .stderr(predicate::str::contains("Please select a valid image file."));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let home = TempDir::new().unwrap();
    renamer(home.path())
        .args(["--log-level", "loud", "sanitize", "--title", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}
