use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn qw_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_qw"))
}

/// A temp dir holding `config/qw.toml` with zero latency plus `extra`.
fn setup_test_env(extra: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[controller]
timeout_secs = 5

[mock]
search_latency_ms = 0
generate_latency_ms = 0
list_latency_ms = 0
upload_latency_ms = 0
{}
"#,
        extra
    );

    let config_path = config_dir.join("qw.toml");
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn run_qw(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = qw_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run qw binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_models_lists_catalog() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (stdout, _, success) = run_qw(&missing, &["models"]);
    assert!(success);
    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("ChatGPT"));
    assert!(stdout.contains("Google Gemini"));
    assert!(stdout.contains("Auto Select"));
}

#[test]
fn test_search_prints_snippets_in_order() {
    let (_tmp, config) = setup_test_env("");
    let (stdout, stderr, success) = run_qw(&config, &["search", "revenue"]);
    assert!(success, "stderr: {}", stderr);

    let first = stdout.find("1. financial_report_2024.pdf  chunk 1").unwrap();
    let third = stdout.find("3. product_roadmap.pdf  chunk 2").unwrap();
    assert!(first < third);
    assert!(stderr.contains("[Search completed] Found 3 relevant chunks"));
}

#[test]
fn test_search_empty_query() {
    let (_tmp, config) = setup_test_env("");
    let (stdout, stderr, success) = run_qw(&config, &["search", "   "]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("[Query required]"));
}

#[test]
fn test_ask_auto_with_web_search() {
    let (_tmp, config) = setup_test_env("");
    let (stdout, stderr, success) =
        run_qw(&config, &["ask", "How did revenue change?", "--model", "Auto", "--web"]);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("model: Auto (Claude selected)"));
    assert!(stdout.contains("Additional web search information"));
    assert!(!stdout.contains("Chain of Thought"));
    assert!(stderr.contains("[Response generated] Using Auto (Claude selected)"));
}

#[test]
fn test_ask_uses_configured_defaults() {
    let (_tmp, config) = setup_test_env("\n[generation]\nuse_detailed_explanation = true\n");
    let (stdout, stderr, success) =
        run_qw(&config, &["ask", "Summarize", "--model", "Claude", "--show-snippets"]);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("financial_report_2024.pdf"));
    assert!(stdout.contains("model: Claude"));
    assert!(stdout.contains("## Chain of Thought Analysis"));
}

#[test]
fn test_ask_generation_failure_exits_nonzero() {
    let (_tmp, config) = setup_test_env("fail_generate = true");
    let (_, stderr, success) = run_qw(&config, &["ask", "q"]);
    assert!(!success);
    assert!(stderr.contains("[Generation failed]"));
}

#[test]
fn test_docs_lists_store() {
    let (_tmp, config) = setup_test_env("");
    let (stdout, stderr, success) = run_qw(&config, &["docs"]);
    assert!(success, "stderr: {}", stderr);
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.contains("competitive_analysis.pdf"));
}

#[test]
fn test_upload_reports_partial_failure() {
    let (tmp, config) = setup_test_env(r#"fail_uploads = ["bad.pdf"]"#);
    let good = tmp.path().join("good.pdf");
    let bad = tmp.path().join("bad.pdf");
    fs::write(&good, b"good").unwrap();
    fs::write(&bad, b"bad").unwrap();

    let (stdout, stderr, success) = run_qw(
        &config,
        &[
            "upload",
            good.to_str().unwrap(),
            bad.to_str().unwrap(),
            "--progress",
            "json",
        ],
    );
    assert!(!success);
    assert!(stdout.contains("uploaded  good.pdf"));
    assert!(stdout.contains("failed    bad.pdf"));
    assert!(stdout.contains("documents: 6"));
    assert!(stderr.contains(r#""phase":"uploading""#));
    assert!(stderr.contains("[Upload failed]"));
}

#[test]
fn test_upload_missing_file() {
    let (_tmp, config) = setup_test_env("");
    let (_, stderr, success) = run_qw(&config, &["upload", "/nonexistent/qw/x.pdf"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read upload file"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("qw.toml");
    fs::write(&config, "[controller]\ntimeout_secs = 0\n").unwrap();
    let (_, stderr, success) = run_qw(&config, &["docs"]);
    assert!(!success);
    assert!(stderr.contains("timeout_secs"));
}

#[test]
fn test_upload_lists_uploaded_names() {
    let (tmp, config) = setup_test_env("");
    let a = tmp.path().join("a.pdf");
    let b = tmp.path().join("b.pdf");
    fs::write(&a, b"a").unwrap();
    fs::write(&b, b"b").unwrap();

    let (stdout, stderr, success) = run_qw(
        &config,
        &["upload", a.to_str().unwrap(), b.to_str().unwrap(), "--progress", "off"],
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("uploaded  a.pdf, b.pdf"));
    assert!(stdout.contains("documents: 7"));
    assert!(stderr.contains("[Upload successful] 2 file(s) uploaded & processed"));
}
