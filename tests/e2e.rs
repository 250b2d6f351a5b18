use std::io::Write;
use std::path::Path;
use std::process::Command;

fn run_path(path: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_paythm-core"))
        .arg(path)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run(fixture: &str) -> (String, String, bool) {
    run_path(Path::new(&format!("tests/fixtures/{fixture}")))
}

#[test]
fn valid_operations() {
    let (stdout, stderr, success) = run("valid.csv");

    assert!(success);
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "user,balance,credits,debits");
    // One row per seeded demo user, sorted by id.
    assert_eq!(lines[1], "1,400.00,1,1");
    assert_eq!(lines[2], "2,250.00,2,1");
    assert_eq!(lines[3], "3,0.00,0,0");
    assert_eq!(lines[4], "4,0.00,0,0");
}

#[test]
fn errors_warn_but_do_not_block() {
    let (stdout, stderr, success) = run("with_errors.csv");

    assert!(success);
    assert!(stderr.contains("unrecognized operation"));
    assert!(stderr.contains("missing target"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "user,balance,credits,debits");
    assert_eq!(lines[1], "1,75.00,1,1");
    assert_eq!(lines[2], "2,25.00,1,0");
}

#[test]
fn insufficient_balance_skips_operation() {
    let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
    write!(
        file,
        "op,user,target,detail,amount\n\
         fund,1,,,50.00\n\
         transfer,1,priya@paythm.com,,80.00\n\
         transfer,1,priya@paythm.com,,30.00\n"
    )
    .unwrap();

    let (stdout, _, success) = run_path(file.path());

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    // The oversized transfer was skipped; the later one went through.
    assert_eq!(lines[1], "1,20.00,1,1");
    assert_eq!(lines[2], "2,30.00,1,0");
}
