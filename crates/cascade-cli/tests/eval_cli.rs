use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const RAMP_TABLE: &str = "0 0 0\n1 10 5\n2 20 10\n";
const BATCH_REQUESTS: &str = "# x y z\n0.5 0.5 0.5\n0 0 0\n-1 0.25 1\n";

fn cascade_command(table_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cascade-eval"));
    command.current_dir(table_dir).env("RUST_LOG", "off");
    command
}

fn run_with_args(table_dir: &Path, args: &[&str]) -> Output {
    cascade_command(table_dir)
        .args(args)
        .output()
        .expect("cascade-eval should run")
}

fn run_with_stdin(table_dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = cascade_command(table_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("cascade-eval should spawn");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should be written");
    child.wait_with_output().expect("cascade-eval should finish")
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn stage_tables(root: &Path) {
    write_file(&root.join("dat_X_00_1.dat"), RAMP_TABLE);
    write_file(&root.join("dat_X_1_00.dat"), "0 1 -0.25\n");
    write_file(&root.join("dat_X_1_1.dat"), "0 0 0\n10 100 50\n");
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn eval_with_arguments_uses_the_low_table_for_small_x() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());

    let output = run_with_args(temp.path(), &["eval", "0.5", "0.5", "0.5"]);
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );

    assert_eq!(stdout_of(&output), "fun(0.5, 0.5, 0.5) = 23.3659\n");
}

#[test]
fn eval_prompts_for_coordinates_when_omitted() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());

    let output = run_with_stdin(temp.path(), &["eval"], "0 0 0\n");
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("Enter x, y, z: "), "stdout: {stdout}");
    assert!(stdout.contains("fun(0, 0, 0) = 0"), "stdout: {stdout}");
}

#[test]
fn non_numeric_prompt_input_exits_with_input_category() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());

    let output = run_with_stdin(temp.path(), &["eval"], "0.5 abc 0.5\n");
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("ERROR: [INPUT.COORDINATES] x, y, z must be numeric values."),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("FATAL EXIT CODE: 2"), "stderr: {stderr}");
}

#[test]
fn missing_table_file_exits_with_io_category() {
    let temp = TempDir::new().expect("tempdir should be created");

    let output = run_with_args(temp.path(), &["eval", "2", "0", "0"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[IO.TABLE_OPEN]"), "stderr: {stderr}");
    assert!(stderr.contains("dat_X_1_1.dat"), "stderr: {stderr}");
}

#[test]
fn empty_table_file_exits_with_io_category() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("dat_X_00_1.dat"), "");

    let output = run_with_args(temp.path(), &["eval", "0", "0", "0"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(
        stderr_of(&output).contains("[IO.TABLE_EMPTY]"),
        "stderr: {}",
        stderr_of(&output)
    );
}

#[test]
fn degenerate_table_exits_with_computation_category() {
    let temp = TempDir::new().expect("tempdir should be created");
    let table = temp.path().join("degenerate.dat");
    write_file(&table, "5 1 2\n5 3 4\n");

    let output = run_with_args(
        temp.path(),
        &[
            "eval",
            "5",
            "6",
            "0",
            "--table",
            table.to_str().expect("utf-8 path"),
        ],
    );
    assert_eq!(output.status.code(), Some(4));
    assert!(
        stderr_of(&output).contains("[RUN.DEGENERATE_TABLE]"),
        "stderr: {}",
        stderr_of(&output)
    );
}

#[test]
fn negative_coordinates_and_table_dir_are_accepted() {
    let temp = TempDir::new().expect("tempdir should be created");
    let tables = temp.path().join("tables");
    stage_tables(&tables);

    let output = run_with_args(
        temp.path(),
        &[
            "eval",
            "-0.5",
            "0.25",
            "1",
            "--table-dir",
            tables.to_str().expect("utf-8 path"),
            "--json",
        ],
    );
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );

    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("JSON should parse");
    assert_eq!(parsed["branch"], "kernel1");
    assert!(
        parsed["table"]
            .as_str()
            .expect("table path")
            .ends_with("dat_X_00_1.dat")
    );
}

#[test]
fn unit_table_override_reaches_kernel2() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());
    let unit = temp.path().join("dat_X_1_00.dat");

    let output = run_with_args(
        temp.path(),
        &[
            "eval",
            "-0.5",
            "0.25",
            "1",
            "--table",
            unit.to_str().expect("utf-8 path"),
            "--json",
        ],
    );
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );

    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("JSON should parse");
    assert_eq!(parsed["branch"], "kernel2");
    let value = parsed["value"].as_f64().expect("value");
    assert!(
        (value - (83.1389 * 0.2725 + 4.838 * 0.1525)).abs() <= 1.0e-9,
        "value: {value}"
    );
}

#[test]
fn partial_coordinates_are_a_usage_error() {
    let temp = TempDir::new().expect("tempdir should be created");

    let output = run_with_args(temp.path(), &["eval", "0.5", "0.5"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr_of(&output).contains("[INPUT.CLI_USAGE]"),
        "stderr: {}",
        stderr_of(&output)
    );
}

#[test]
fn batch_evaluates_each_request_line() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());
    let requests = temp.path().join("requests.txt");
    write_file(&requests, BATCH_REQUESTS);

    let input = requests.to_str().expect("utf-8 path");
    let output = run_with_args(temp.path(), &["batch", "--input", input, "--json"]);
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );

    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("JSON should parse");
    let reports = parsed.as_array().expect("JSON array");
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0]["branch"], "fun1");
    assert_eq!(reports[1]["branch"], "fallback");
    assert!(
        reports[2]["table"]
            .as_str()
            .expect("table path")
            .ends_with("dat_X_1_00.dat")
    );
}

#[test]
fn batch_prints_one_text_line_per_request() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());
    let requests = temp.path().join("requests.txt");
    write_file(&requests, BATCH_REQUESTS);

    let input = requests.to_str().expect("utf-8 path");
    let output = run_with_args(temp.path(), &["batch", "--input", input]);
    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr_of(&output)
    );

    let stdout = stdout_of(&output);
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        [
            "fun(0.5, 0.5, 0.5) = 23.3659",
            "fun(0, 0, 0) = 0",
            "fun(-1, 0.25, 1) = 67.102",
        ]
    );
}

#[test]
fn batch_rejects_malformed_lines() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_tables(temp.path());
    let requests = temp.path().join("requests.txt");
    write_file(&requests, "0.5 0.5 0.5\nnot a request\n");

    let input = requests.to_str().expect("utf-8 path");
    let output = run_with_args(temp.path(), &["batch", "--input", input]);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr_of(&output).contains("[INPUT.BATCH_LINE]"),
        "stderr: {}",
        stderr_of(&output)
    );
    assert!(stdout_of(&output).is_empty());
}

#[test]
fn select_prints_the_table_for_x() {
    let temp = TempDir::new().expect("tempdir should be created");

    for (x, expected) in [
        ("2", "high dat_X_1_1.dat"),
        ("1", "unit dat_X_1_00.dat"),
        ("-1", "unit dat_X_1_00.dat"),
        ("-3", "low dat_X_00_1.dat"),
    ] {
        let output = run_with_args(temp.path(), &["select", x]);
        assert!(output.status.success(), "stderr: {}", stderr_of(&output));
        assert_eq!(stdout_of(&output).trim(), expected);
    }
}
