//! End-to-end integration tests for the markdansi CLI.
//!
//! These tests run the real binary: file and stdin input, output files,
//! option flags, theme files and error reporting. Stdout is a pipe here, so
//! output is plain unless `--color` forces styling.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Get a Command for the markdansi binary.
#[allow(deprecated)]
fn markdansi_cmd() -> Command {
    let mut cmd = Command::cargo_bin("markdansi").unwrap();
    cmd.env_remove("MARKDANSI_LOG")
        .env_remove("FORCE_HYPERLINK")
        .env_remove("COLUMNS");
    cmd
}

fn no_escapes() -> impl Predicate<str> {
    predicate::str::contains("\x1b").not()
}

// =============================================================================
// Basic Usage Tests
// =============================================================================

mod basic_usage {
    use super::*;

    #[test]
    fn test_render_basic_markdown_file() {
        markdansi_cmd()
            .arg("tests/fixtures/basic.md")
            .arg("--width")
            .arg("80")
            .assert()
            .success()
            .stdout(
                "\nHello World\nThis is a basic document with a link (https://example.com).\n\n- first\n- second\n",
            );
    }

    #[test]
    fn test_render_with_in_flag() {
        markdansi_cmd()
            .arg("--in")
            .arg("tests/fixtures/basic.md")
            .assert()
            .success()
            .stdout(predicate::str::contains("Hello World"));
    }

    #[test]
    fn test_render_complex_markdown_file() {
        markdansi_cmd()
            .arg("tests/fixtures/complex.md")
            .arg("--width")
            .arg("80")
            .assert()
            .success()
            .stdout(predicate::str::contains("Complex Markdown Document"))
            .stdout(predicate::str::contains("┌ [rust]"))
            .stdout(predicate::str::contains("│ A quoted remark spanning two source lines."))
            .stdout(predicate::str::contains("[x] nested task"))
            .stdout(no_escapes());
    }

    #[test]
    fn test_render_empty_file() {
        markdansi_cmd()
            .arg("tests/fixtures/empty.md")
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn test_width_bounds_every_line() {
        let output = markdansi_cmd()
            .arg("tests/fixtures/complex.md")
            .arg("--width")
            .arg("30")
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        for line in stdout.lines() {
            assert!(line.chars().count() <= 30, "{line:?}");
        }
    }

    #[test]
    fn test_no_wrap_keeps_long_lines() {
        let long_line = "word ".repeat(40);
        markdansi_cmd()
            .arg("--no-wrap")
            .write_stdin(long_line.clone())
            .assert()
            .success()
            .stdout(format!("{}\n", long_line.trim_end()));
    }
}

// =============================================================================
// Stdin Input Tests
// =============================================================================

mod stdin_input {
    use super::*;

    #[test]
    fn test_stdin_with_dash() {
        markdansi_cmd()
            .arg("-")
            .write_stdin("# From Stdin\n\nHello!")
            .assert()
            .success()
            .stdout("\nFrom Stdin\nHello!\n");
    }

    #[test]
    fn test_stdin_without_arguments() {
        markdansi_cmd()
            .write_stdin("plain *text*")
            .assert()
            .success()
            .stdout("plain text\n");
    }

    #[test]
    fn test_stdin_empty() {
        markdansi_cmd().arg("-").write_stdin("").assert().success().stdout("");
    }

    #[test]
    fn test_invalid_utf8_input_fails() {
        markdansi_cmd()
            .write_stdin(vec![b'#', b' ', 0xFF, 0xFE])
            .assert()
            .failure()
            .stderr(predicate::str::contains("markdansi: failed to read <stdin>"));
    }
}

// =============================================================================
// Output Tests
// =============================================================================

mod output_file {
    use super::*;

    #[test]
    fn test_out_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        markdansi_cmd()
            .arg("tests/fixtures/basic.md")
            .arg("--out")
            .arg(&out)
            .assert()
            .success()
            .stdout("");
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("Hello World"));
        assert!(!written.contains('\x1b'));
    }

    #[test]
    fn test_out_with_forced_color() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        markdansi_cmd()
            .args(["tests/fixtures/basic.md", "--color", "-o"])
            .arg(&out)
            .assert()
            .success();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("\x1b[1m"));
    }

    #[test]
    fn test_out_to_missing_directory_fails() {
        markdansi_cmd()
            .arg("tests/fixtures/basic.md")
            .arg("--out")
            .arg("/nonexistent-dir/out.txt")
            .assert()
            .failure()
            .stderr(predicate::str::contains("markdansi: failed to write"));
    }
}

// =============================================================================
// Option Flags
// =============================================================================

mod option_flags {
    use super::*;

    #[test]
    fn test_color_flag_forces_styling() {
        markdansi_cmd()
            .arg("--color")
            .write_stdin("**bold**")
            .assert()
            .success()
            .stdout("\x1b[1mbold\x1b[22m\n");
    }

    #[test]
    fn test_no_color_wins_when_last() {
        markdansi_cmd()
            .args(["--color", "--no-color"])
            .write_stdin("**bold**")
            .assert()
            .success()
            .stdout("bold\n");
    }

    #[test]
    fn test_links_need_color() {
        markdansi_cmd()
            .arg("--links")
            .write_stdin("[x](https://example.com)")
            .assert()
            .success()
            .stdout("x (https://example.com)\n");

        markdansi_cmd()
            .args(["--links", "--color"])
            .write_stdin("[x](https://example.com)")
            .assert()
            .success()
            .stdout("\x1b]8;;https://example.com\x07x\x1b]8;;\x07\n");
    }

    #[test]
    fn test_table_border_ascii() {
        markdansi_cmd()
            .args(["--table-border", "ascii"])
            .write_stdin("| a | b |\n|---|---|\n| 1 | 2 |")
            .assert()
            .success()
            .stdout("+---+---+\n| a | b |\n+---+---+\n| 1 | 2 |\n+---+---+\n");
    }

    #[test]
    fn test_table_border_rejects_unknown() {
        markdansi_cmd()
            .args(["--table-border", "double"])
            .write_stdin("x")
            .assert()
            .failure();
    }

    #[test]
    fn test_code_flags() {
        markdansi_cmd()
            .args(["--code-box=false", "--code-gutter"])
            .write_stdin("```\nfirst\nsecond\n```")
            .assert()
            .success()
            .stdout("1 first\n2 second\n");
    }

    #[test]
    fn test_list_and_quote_flags() {
        markdansi_cmd()
            .args(["--list-indent", "4", "--quote-prefix", "> "])
            .write_stdin("- a\n  - b\n\n> q")
            .assert()
            .success()
            .stdout(predicate::str::contains("    - b"))
            .stdout(predicate::str::contains("> q"));
    }

    #[test]
    fn test_invalid_width_not_number() {
        markdansi_cmd()
            .arg("tests/fixtures/basic.md")
            .arg("--width")
            .arg("abc")
            .assert()
            .failure();
    }
}

// =============================================================================
// Themes
// =============================================================================

mod themes {
    use super::*;

    #[test]
    fn test_named_theme() {
        markdansi_cmd()
            .args(["--color", "--theme", "bright"])
            .write_stdin("`code`")
            .assert()
            .success()
            .stdout(predicate::str::contains("\x1b[32mcode"));
    }

    #[test]
    fn test_unknown_theme_warns_and_renders() {
        markdansi_cmd()
            .args(["--theme", "nope"])
            .write_stdin("hello")
            .assert()
            .success()
            .stdout("hello\n")
            .stderr(predicate::str::contains("unknown theme"));
    }

    #[test]
    fn test_theme_file() {
        markdansi_cmd()
            .args(["--color", "--theme-file", "tests/fixtures/theme.json"])
            .write_stdin("# Title\n\n`x`")
            .assert()
            .success()
            .stdout(predicate::str::contains("\x1b[35m\x1b[1mTitle"))
            .stdout(predicate::str::contains("\x1b[38;2;255;136;0mx"));
    }

    #[test]
    fn test_bad_theme_file() {
        markdansi_cmd()
            .args(["--theme-file", "tests/fixtures/bad_theme.json"])
            .write_stdin("x")
            .assert()
            .failure()
            .stderr(predicate::str::contains("markdansi: invalid theme file"));
    }

    #[test]
    fn test_theme_and_theme_file_conflict() {
        markdansi_cmd()
            .args(["--theme", "dim", "--theme-file", "tests/fixtures/theme.json"])
            .write_stdin("x")
            .assert()
            .failure();
    }
}

// =============================================================================
// Error Handling Tests
// =============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_file_not_found() {
        markdansi_cmd()
            .arg("nonexistent-file.md")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "markdansi: failed to read nonexistent-file.md",
            ));
    }

    #[test]
    fn test_directory_instead_of_file() {
        let dir = TempDir::new().unwrap();
        markdansi_cmd().arg(dir.path()).assert().failure();
    }

    #[test]
    fn test_positional_and_in_conflict() {
        markdansi_cmd()
            .args(["a.md", "--in", "b.md"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Temp File Tests
// =============================================================================

mod temp_file_tests {
    use super::*;

    #[test]
    fn test_render_unicode_content() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(
            temp,
            "# Unicode Test\n\nEmoji: \u{1F600} Symbols: \u{2764} \u{2605}"
        )
        .unwrap();

        markdansi_cmd()
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Emoji: \u{1F600}"));
    }
}

// =============================================================================
// Live Mode
// =============================================================================

mod live_mode {
    use super::*;

    #[test]
    fn test_live_redraws_stdin() {
        markdansi_cmd()
            .arg("--live")
            .write_stdin("# Live\n\nupdating")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("\x1b[?25l"))
            .stdout(predicate::str::contains("\x1b[?2026h"))
            .stdout(predicate::str::contains("\x1b[2Kupdating\n"))
            .stdout(predicate::str::ends_with("\x1b[?25h"));
    }

    #[test]
    fn test_live_rejects_output_file() {
        markdansi_cmd()
            .args(["--live", "--out", "x.txt"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Closed Output
// =============================================================================

mod broken_pipe {
    use assert_cmd::cargo::CommandCargoExt;
    use std::io::Write;
    use std::process::{Command, Stdio};

    #[test]
    #[allow(deprecated)]
    fn test_closed_stdout_exits_quietly() {
        let mut child = Command::cargo_bin("markdansi")
            .unwrap()
            .env_remove("MARKDANSI_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        // Close the read end before anything is rendered.
        drop(child.stdout.take());

        // Far more output than a pipe buffer holds.
        let input = "A paragraph of markdown that renders to one line.\n\n".repeat(20_000);
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
        drop(stdin);

        let output = child.wait_with_output().unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "status {:?}, stderr {stderr}", output.status);
        assert!(!stderr.contains("markdansi:"), "{stderr}");
    }
}

// =============================================================================
// Help and Version Tests
// =============================================================================

mod help_version {
    use super::*;

    #[test]
    fn test_help_flag() {
        markdansi_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Render markdown"))
            .stdout(predicate::str::contains("--table-border"))
            .stdout(predicate::str::contains("--width"))
            .stdout(predicate::str::contains("--live"));
    }

    #[test]
    fn test_help_short_flag() {
        markdansi_cmd()
            .arg("-h")
            .assert()
            .success()
            .stdout(predicate::str::contains("markdansi"));
    }

    #[test]
    fn test_version_flag() {
        markdansi_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("markdansi"));
    }
}
