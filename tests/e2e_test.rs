//! End-to-end tests for the topicpress binary.

mod common;

use anyhow::Result;
use std::process::Command;

/// Tests `--build` generates the site and exits successfully.
#[test]
fn test_build_flag_e2e() -> Result<()> {
    // Arrange
    let dir = common::create_test_project()?;

    // Act
    let output = Command::new(env!("CARGO_BIN_EXE_topicpress"))
        .args(["--build", "--root"])
        .arg(dir.path())
        .env("NO_COLOR", "1")
        .output()?;

    // Assert
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("index.html").exists());
    assert!(
        dir.path()
            .join("static_files/articles/tools/shells.html")
            .exists()
    );

    Ok(())
}

/// Tests a custom output directory is honored.
#[test]
fn test_output_dir_flag_e2e() -> Result<()> {
    // Arrange
    let dir = common::create_test_project()?;

    // Act
    let status = Command::new(env!("CARGO_BIN_EXE_topicpress"))
        .args(["-b", "--output-dir", "site", "--root"])
        .arg(dir.path())
        .status()?;

    // Assert
    assert!(status.success());
    assert!(dir.path().join("site/basics/hello.html").exists());
    assert!(!dir.path().join("static_files").exists());

    Ok(())
}

/// Tests running without a mode flag is a usage error.
#[test]
fn test_mode_required_e2e() -> Result<()> {
    // Act
    let output = Command::new(env!("CARGO_BIN_EXE_topicpress")).output()?;

    // Assert
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--livereload") || stderr.contains("--build"),
        "stderr: {}",
        stderr
    );

    Ok(())
}

/// Tests a missing article is printed and fails the run.
#[test]
fn test_missing_article_e2e() -> Result<()> {
    // Arrange
    let dir = common::create_test_project()?;
    std::fs::remove_file(dir.path().join("articles/basics/hello.md"))?;

    // Act
    let output = Command::new(env!("CARGO_BIN_EXE_topicpress"))
        .args(["--build", "--root"])
        .arg(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("TOPICPRESS_LOG")
        .output()?;

    // Assert
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File doesn't exist"), "stderr: {}", stderr);

    Ok(())
}
