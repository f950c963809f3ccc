use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper struct to manage test directories
struct TestFixture {
    _temp_dir: TempDir,
    left_dir: PathBuf,
    right_dir: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with left and right directories
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let left_dir = temp_dir.path().join("left");
        let right_dir = temp_dir.path().join("right");

        fs::create_dir(&left_dir).expect("Failed to create left dir");
        fs::create_dir(&right_dir).expect("Failed to create right dir");

        TestFixture {
            _temp_dir: temp_dir,
            left_dir,
            right_dir,
        }
    }

    fn create_left_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> PathBuf {
        self.create_file(&self.left_dir, path, content)
    }

    fn create_right_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> PathBuf {
        self.create_file(&self.right_dir, path, content)
    }

    fn create_file<P: AsRef<Path>>(&self, base: &Path, path: P, content: &[u8]) -> PathBuf {
        let file_path = base.join(path.as_ref());

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    fn left(&self) -> &str {
        self.left_dir.to_str().unwrap()
    }

    fn right(&self) -> &str {
        self.right_dir.to_str().unwrap()
    }
}

/// Helper to run the CLI binary
fn run_cli(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_diffmap");
    Command::new(exe)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Glyph lines only: drops path headers and directory markers
fn glyph_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter(|line| {
            !line.starts_with("<<< ")
                && !line.starts_with(">>> ")
                && !line.starts_with("entering ")
                && !line.starts_with("leaving ")
        })
        .collect()
}

#[test]
fn test_identical_files_exit_zero() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("a.bin", &[7u8; 1500]);
    let right = fixture.create_right_file("a.bin", &[7u8; 1500]);

    let output = run_cli(&[left.to_str().unwrap(), right.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert_eq!(glyph_lines(&stdout), vec!["..."]);
    assert!(stdout.contains(&format!("<<< {}", left.display())));
    assert!(stdout.contains(&format!(">>> {}", right.display())));
}

#[test]
fn test_single_differing_block() {
    let fixture = TestFixture::new();
    let data = vec![0u8; 64];
    let mut changed = data.clone();
    changed[40] = 0xff;
    let left = fixture.create_left_file("a.bin", &data);
    let right = fixture.create_right_file("a.bin", &changed);

    let output = run_cli(&["-b", "16", left.to_str().unwrap(), right.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(glyph_lines(&stdout_of(&output)), vec!["..X."]);
}

#[test]
fn test_length_mismatch_glyphs() {
    let fixture = TestFixture::new();
    let short = fixture.create_left_file("short.bin", &[1u8; 16]);
    let long = fixture.create_right_file("long.bin", &[1u8; 64]);

    let output = run_cli(&["-b", "16", short.to_str().unwrap(), long.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(glyph_lines(&stdout_of(&output)), vec![".///"]);

    let output = run_cli(&["-b", "16", long.to_str().unwrap(), short.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(glyph_lines(&stdout_of(&output)), vec![".\\\\\\"]);
}

#[test]
fn test_width_wraps_lines() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("a.bin", &[0u8; 10]);
    let right = fixture.create_right_file("a.bin", &[0u8; 10]);

    let output = run_cli(&["-b", "1", "-w", "4", left.to_str().unwrap(), right.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.ends_with("....\n....\n..\n"));
}

#[test]
fn test_directory_aggregate_and_markers() {
    let fixture = TestFixture::new();
    fixture.create_left_file("same.txt", b"identical content here");
    fixture.create_right_file("same.txt", b"identical content here");
    fixture.create_left_file("nested/diff.txt", b"aaaaaaaabbbbbbbb");
    fixture.create_right_file("nested/diff.txt", b"aaaaaaaacccccccc");

    let output = run_cli(&["-b", "8", fixture.left(), fixture.right()]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with(&format!("entering {}\n", fixture.left())));
    assert!(stdout.ends_with(&format!("leaving {}\n", fixture.left())));
    assert_eq!(stdout.matches("entering ").count(), 2);
}

#[test]
fn test_missing_right_counterpart_warns() {
    let fixture = TestFixture::new();
    fixture.create_left_file("common.bin", b"same");
    fixture.create_right_file("common.bin", b"same");
    fixture.create_left_file("only_left.bin", &[0u8; 2048]);

    let output = run_cli(&[fixture.left(), fixture.right()]);

    assert_eq!(output.status.code(), Some(4));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("diffmap: "));
    assert!(stderr.contains("only_left.bin"));
}

#[test]
fn test_right_only_entries_do_not_count() {
    let fixture = TestFixture::new();
    fixture.create_left_file("common.bin", b"same");
    fixture.create_right_file("common.bin", b"same");
    fixture.create_right_file("only_right.bin", &[0u8; 4096]);

    let output = run_cli(&[fixture.left(), fixture.right()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout_of(&output).contains("only_right.bin"));
}

#[test]
fn test_same_path_is_skipped() {
    let fixture = TestFixture::new();
    fixture.create_left_file("a.bin", b"content");

    let output = run_cli(&[fixture.left(), fixture.left()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("same file, skipping"));
}

#[test]
fn test_missing_left_is_fatal() {
    let fixture = TestFixture::new();
    let missing = fixture.left_dir.join("does_not_exist");

    let output = run_cli(&[missing.to_str().unwrap(), fixture.right()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("diffmap: "));
    assert!(stderr.contains("does_not_exist"));
}

#[test]
fn test_kind_mismatch_is_fatal() {
    let fixture = TestFixture::new();
    let file = fixture.create_left_file("a.bin", b"content");

    let output = run_cli(&[file.to_str().unwrap(), fixture.right()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("cannot compare"));
}

#[test]
fn test_invalid_block_size_fails_before_comparing() {
    let fixture = TestFixture::new();

    let output = run_cli(&["-b", "abc", fixture.left(), fixture.right()]);

    assert!(!output.status.success());
    assert!(stdout_of(&output).is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("diffmap: "));
    assert!(stderr.contains("\"abc\" is not a valid number"));
}

#[test]
fn test_invalid_width_trailing_garbage() {
    let fixture = TestFixture::new();

    let output = run_cli(&["-w", "80x", fixture.left(), fixture.right()]);

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("diffmap: "));
    assert!(stderr.contains("\"80x\" is not a valid number"));
}

#[test]
fn test_wrong_argument_count_prints_usage() {
    let fixture = TestFixture::new();

    let output = run_cli(&[fixture.left()]);

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("diffmap: "));
    assert!(stderr.contains("Usage"));
}

#[test]
fn test_unknown_flag_prints_prefixed_usage() {
    let fixture = TestFixture::new();

    let output = run_cli(&["-x", fixture.left(), fixture.right()]);

    assert!(!output.status.success());
    assert!(stdout_of(&output).is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("diffmap: "));
    assert!(stderr.contains("Usage"));
}

#[test]
fn test_help_is_not_an_error() {
    let output = run_cli(&["--help"]);

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Usage"));
}

#[test]
fn test_exit_code_saturates() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("a.bin", &[0u8; 300]);
    let right = fixture.create_right_file("a.bin", &[1u8; 300]);

    let output = run_cli(&["-b", "1", "-w", "0", left.to_str().unwrap(), right.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(255));
    assert_eq!(glyph_lines(&stdout_of(&output)), vec!["X".repeat(300).as_str()]);
}

#[test]
fn test_json_summary_follows_map() {
    let fixture = TestFixture::new();
    let left = fixture.create_left_file("a.bin", b"aaaabbbb");
    let right = fixture.create_right_file("a.bin", b"aaaacccc");

    let output = run_cli(&["-b", "4", "--json", left.to_str().unwrap(), right.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    let last = stdout.lines().last().unwrap();
    assert_eq!(
        last,
        r#"{"block_count":2,"identical_block_count":1,"dissimilarity":1}"#
    );
}

#[test]
fn test_sorted_traversal() {
    let fixture = TestFixture::new();
    for name in ["zeta.bin", "alpha.bin", "mid.bin"] {
        fixture.create_left_file(name, b"data");
        fixture.create_right_file(name, b"data");
    }

    let output = run_cli(&["--sort", fixture.left(), fixture.right()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.strip_prefix("<<< "))
        .filter_map(|path| Path::new(path).file_name()?.to_str())
        .collect();
    assert_eq!(names, vec!["alpha.bin", "mid.bin", "zeta.bin"]);
}
