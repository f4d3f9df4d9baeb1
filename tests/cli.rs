use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{Cursor, Write};
use tempfile::tempdir;
use zip::write::FileOptions;
use zip::ZipWriter;

fn write_sample_zip(dir: &std::path::Path) -> std::path::PathBuf {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        writer.start_file("a.py", FileOptions::default()).unwrap();
        writer.write_all(b"print(1)").unwrap();
        writer.finish().unwrap();
    }
    let path = dir.join("sample.zip");
    std::fs::write(&path, cursor.into_inner()).unwrap();
    path
}

#[test]
fn credential_without_archive_warns_and_stops() {
    let mut cmd = Command::cargo_bin("api-alchemist").expect("Binary exists");

    cmd.arg("transform").arg("--api-key").arg("sk-test");

    // Exits before any network call with the upload warning.
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("zip archive"));
}

#[test]
fn archive_without_credential_warns_and_stops() {
    let dir = tempdir().unwrap();
    let archive = write_sample_zip(dir.path());

    let mut cmd = Command::cargo_bin("api-alchemist").expect("Binary exists");
    cmd.arg("transform")
        .arg(&archive)
        .env_remove("OPENAI_API_KEY");

    // Non-attended stdin, so no masked prompt: exits with the key warning
    // before any extraction happens.
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn help_names_the_transform_subcommand() {
    let mut cmd = Command::cargo_bin("api-alchemist").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("transform"));
}
