// Drives the compiled binary with answers piped over stdin. The session
// loop reads lines, so no pseudo terminal is needed.

use assert_cmd::Command;

fn run(args: &[&str], stdin: &str) -> (bool, String) {
    let output = Command::cargo_bin("matik")
        .unwrap()
        .args(args)
        .write_stdin(stdin.to_string())
        .output()
        .unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

#[test]
fn short_session_runs_to_the_summary() {
    let (ok, stdout) = run(
        &["--rounds", "3", "--operation", "add", "--name", "Test"],
        "1\n2\n3\n",
    );
    assert!(ok);
    assert!(stdout.contains("Welcome, Test!"));
    assert!(stdout.contains("Round 1/3"));
    assert!(stdout.contains("Solve:"));
    assert!(stdout.contains("Session Summary"));
    assert!(stdout.contains("Recommended next level:"));
}

#[test]
fn exhausted_stdin_counts_as_wrong_answers_not_a_crash() {
    let (ok, stdout) = run(&["--rounds", "2"], "");
    assert!(ok);
    assert!(stdout.contains("Round 2/2"));
    assert!(stdout.contains("Accuracy: 0.0%"));
}

#[test]
fn json_report_is_emitted_on_request() {
    let (ok, stdout) = run(&["--rounds", "2", "--json"], "x\nx\n");
    assert!(ok);
    assert!(stdout.contains("\"summary\""));
    assert!(stdout.contains("\"recommended_difficulty\""));
    assert!(stdout.contains("\"accuracy\""));
}

#[test]
fn help_lists_the_session_flags() {
    let (ok, stdout) = run(&["--help"], "");
    assert!(ok);
    assert!(stdout.contains("--rounds"));
    assert!(stdout.contains("--difficulty"));
    assert!(stdout.contains("--operation"));
}

#[test]
fn unknown_operation_is_rejected_at_the_boundary() {
    let status = Command::cargo_bin("matik")
        .unwrap()
        .args(["--operation", "pow"])
        .output()
        .unwrap()
        .status;
    assert!(!status.success());
}
