use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use tempfile::TempDir;

const NO_KEY_ENV: &str = "LEDGERBOOK_TEST_UNSET_KEY";
const STUB_KEY_ENV: &str = "LEDGERBOOK_TEST_STUB_KEY";

const ACME_REPORT_JSON: &str = r#"{
  "companyName": "Acme Corp Ltd",
  "statementDate": "31 October 2023",
  "auditorOpinion": "In our opinion the financial statements give a true and fair view.",
  "incomeStatement": {
    "revenueItems": [{ "description": "Consulting Revenue", "amount": 450000 }],
    "totalRevenue": 450000, "totalCostOfSales": 0, "grossProfit": 450000,
    "operatingExpenses": [{ "description": "Rent", "amount": 120000 }],
    "totalOperatingExpenses": 120000, "operatingProfit": 330000,
    "taxation": 99000, "netProfit": 231000
  },
  "balanceSheet": {
    "currentAssets": [{ "description": "Cash and Cash Equivalents", "amount": 330000 }],
    "totalAssets": 330000,
    "currentLiabilities": [{ "description": "Tax Payable", "amount": 99000 }],
    "totalLiabilities": 99000,
    "equityItems": [{ "description": "Retained Earnings", "amount": 231000 }],
    "totalEquity": 231000
  },
  "notesToAccounts": ["Prepared under IFRS for SMEs."]
}"#;

fn ledgerbook_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ledgerbook"))
}

/// Initialize a config dir with instant, reproducible confirmations and
/// an AI key variable that is never set.
fn init_config(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("ledgerbook-config");
    ledgerbook_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    let config_file = config_path.join("config.toml");
    let config = fs::read_to_string(&config_file)
        .unwrap()
        .replace("backend = \"simulated\"", "backend = \"deterministic\"")
        .replace("delay_ms = 2000", "delay_ms = 0")
        .replace("api_key_env = \"GEMINI_API_KEY\"", &format!("api_key_env = \"{NO_KEY_ENV}\""));
    fs::write(&config_file, config).unwrap();
    config_path
}

fn edit_config(config_path: &Path, from: &str, to: &str) {
    let config_file = config_path.join("config.toml");
    let config = fs::read_to_string(&config_file).unwrap();
    assert!(config.contains(from), "config has no '{from}'");
    fs::write(&config_file, config.replace(from, to)).unwrap();
}

/// Serve `replies` generateContent calls with the given model text,
/// returning the endpoint to put in `[ai]`.
fn serve_model_text(replies: usize, text: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let body = serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
    .to_string();

    thread::spawn(move || {
        for stream in listener.incoming().take(replies) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request = vec![0; content_length];
            reader.read_exact(&mut request).unwrap();

            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
    });
    endpoint
}

/// Session command feeding `script` on stdin
fn session_cmd(config_path: &Path, extra: &[&str], script: &str) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("ledgerbook"));
    cmd.args(["-C", config_path.to_str().unwrap(), "session"])
        .args(extra)
        .env_remove(NO_KEY_ENV)
        .write_stdin(script);
    for proxy in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(proxy);
    }
    cmd
}

fn session(config_path: &Path, extra: &[&str], script: &str) -> assert_cmd::assert::Assert {
    session_cmd(config_path, extra, script).assert()
}

#[test]
fn test_help() {
    ledgerbook_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Small-business bookkeeping"));
}

#[test]
fn test_version() {
    ledgerbook_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgerbook"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ledgerbook-config");

    ledgerbook_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ledgerbook config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    ledgerbook_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_session_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    ledgerbook_cmd()
        .args(["-C", config_path.to_str().unwrap(), "session"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'ledgerbook init'"));
}

#[test]
fn test_session_signs_in_and_out() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &["--email", "ada@example.com"], "whoami\nquit\n")
        .success()
        .stdout(predicate::str::contains(
            "Signed in as ada@example.com (ada Business) on the SME plan",
        ))
        .stdout(predicate::str::contains("User:     ada (ada@example.com)"))
        .stdout(predicate::str::contains("Signed out."));
}

#[test]
fn test_demo_ledger_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &["--demo"], "list\n")
        .success()
        .stdout(predicate::str::contains("Consulting Revenue - Client A"))
        .stdout(predicate::str::contains("Office Rent Payment"))
        .stdout(predicate::str::contains("+₦450,000.00"))
        .stdout(predicate::str::contains("-₦120,000.00"))
        .stdout(predicate::str::contains("CONFIRMED"));
}

#[test]
fn test_list_filters_are_combined() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(
        &config_path,
        &["--demo"],
        "list --from 2023-10-24 --to 2023-10-24 --type income\n",
    )
    .success()
    .stdout(predicate::str::contains("Consulting Revenue - Client A"))
    .stdout(predicate::str::contains("Office Rent Payment").not())
    .stdout(predicate::str::contains("1 transaction(s) match."));

    session(&config_path, &["--demo"], "list --search rent --type income\n")
        .success()
        .stdout(predicate::str::contains("No transactions match the 2 active filter(s)."));
}

#[test]
fn test_add_then_wait_confirms() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    // Long enough that the confirmation is still in flight when `wait` runs
    edit_config(&config_path, "delay_ms = 0", "delay_ms = 1500");

    session(
        &config_path,
        &[],
        "add -d \"Office Rent Payment\" -a 120000 -t expense -c Rent\nwait\nlist\n",
    )
    .success()
    .stdout(predicate::str::contains("(PENDING): Office Rent Payment -₦120,000.00 [Rent]"))
    .stdout(predicate::str::contains("All confirmations settled (1 were pending)."))
    .stdout(predicate::str::contains("CONFIRMED"))
    .stdout(predicate::str::contains("#40000000"));
}

#[test]
fn test_add_rejects_bad_amount_and_keeps_going() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &[], "add -d Rent -a abc\nlist\n")
        .success()
        .stderr(predicate::str::contains("Invalid amount 'abc'"))
        .stdout(predicate::str::contains("No transactions recorded yet."));
}

#[test]
fn test_large_amounts_are_listed_in_full() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &[], "add -d \"Asset sale\" -a 1e19 -t income\nwait\nlist\n")
        .success()
        .stdout(predicate::str::contains("+₦10,000,000,000,000,000,000.00"))
        .stdout(predicate::str::contains("₦0.00").not());
}

#[test]
fn test_unknown_command_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &[], "frobnicate\n# a comment\n\nwhoami\n")
        .success()
        .stderr(predicate::str::contains("frobnicate"))
        .stdout(predicate::str::contains("Plan:     SME"));
}

#[test]
fn test_summary_totals() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &["--demo"], "summary\n")
        .success()
        .stdout(predicate::str::contains("Total income:   ₦450,000.00"))
        .stdout(predicate::str::contains("Total expenses: ₦120,000.00"))
        .stdout(predicate::str::contains("Net profit:     ₦330,000.00"));
}

#[test]
fn test_audit_requires_paid_plan() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &[], "audit\n")
        .success()
        .stderr(predicate::str::contains(
            "Audit log is not available on the SME plan (upgrade to Startup)",
        ));

    session(&config_path, &["--plan", "startup"], "audit\n")
        .success()
        .stdout(predicate::str::contains("USER_LOGIN"))
        .stdout(predicate::str::contains("SYSTEM_STARTUP"));
}

#[test]
fn test_report_on_empty_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &["--plan", "startup"], "report generate\naudit\n")
        .success()
        .stderr(predicate::str::contains(
            "Please add transactions before generating a report.",
        ))
        .stdout(predicate::str::contains("GENERATE_REPORT").not());
}

#[test]
fn test_report_without_ai_key_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(
        &config_path,
        &["--plan", "startup", "--demo"],
        "report generate\nreport show\naudit\n",
    )
    .success()
    .stderr(predicate::str::contains("Failed to generate financial report"))
    .stderr(predicate::str::contains("No financial statement"))
    .stdout(predicate::str::contains("REPORT_FAILED"));
}

#[test]
fn test_ai_features_degrade_without_key() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(
        &config_path,
        &["--plan", "startup"],
        "suggest Electricity bill\nask What is the VAT rate?\n",
    )
    .success()
    .stdout(predicate::str::contains("Suggested category: General"))
    .stdout(predicate::str::contains("I am currently experiencing high traffic."));
}

#[test]
fn test_export_csv_writes_ledger_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    session(&config_path, &["--demo"], "export-csv\n")
        .success()
        .stdout(predicate::str::contains("Exported 2 transactions (full ledger)"));

    let exported: Vec<_> = fs::read_dir(config_path.join("output"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("Transaction_Ledger_") && n.ends_with(".csv"))
        })
        .collect();
    assert_eq!(exported.len(), 1);

    let content = fs::read_to_string(&exported[0]).unwrap();
    assert!(content.contains("Consulting Revenue - Client A"));
    assert!(content.contains("Office Rent Payment"));
}

#[test]
fn test_report_show_and_text_export() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let endpoint = serve_model_text(1, ACME_REPORT_JSON);
    edit_config(
        &config_path,
        "endpoint = \"https://generativelanguage.googleapis.com/v1beta\"",
        &format!("endpoint = \"{endpoint}\""),
    );
    edit_config(&config_path, NO_KEY_ENV, STUB_KEY_ENV);

    session_cmd(
        &config_path,
        &["--demo"],
        "report generate\nreport show\nreport export --format text\n",
    )
    .env(STUB_KEY_ENV, "test-key")
    .assert()
    .success()
    .stdout(predicate::str::contains(
        "Financial statements for Acme Corp Ltd generated (period ended 31 October 2023).",
    ))
    .stdout(predicate::str::contains("STATEMENT OF PROFIT OR LOSS"))
    .stdout(predicate::str::contains("PROFIT FOR THE YEAR:"))
    .stdout(predicate::str::contains("Saved TEXT:"));

    let text = fs::read_to_string(
        config_path
            .join("output")
            .join("Financial_Statements_31_October_2023.txt"),
    )
    .unwrap();
    assert!(text.starts_with("ACME CORP LTD\n"));
}

#[test]
fn test_pdf_export_without_typst_points_to_print() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    let endpoint = serve_model_text(1, ACME_REPORT_JSON);
    edit_config(
        &config_path,
        "endpoint = \"https://generativelanguage.googleapis.com/v1beta\"",
        &format!("endpoint = \"{endpoint}\""),
    );
    edit_config(&config_path, NO_KEY_ENV, STUB_KEY_ENV);
    let empty_path = TempDir::new().unwrap();

    session_cmd(
        &config_path,
        &["--demo", "--plan", "startup"],
        "report generate\nreport export --format pdf\naudit\n",
    )
    .env(STUB_KEY_ENV, "test-key")
    .env("PATH", empty_path.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("Typst not found"))
    .stderr(predicate::str::contains("--format print"))
    .stdout(predicate::str::contains("DOWNLOAD_PDF"))
    .stdout(predicate::str::contains("DOWNLOAD_ERROR"))
    .stdout(predicate::str::contains("DOWNLOAD_COMPLETE").not());

    assert!(!config_path
        .join("output")
        .join("Financial_Statements_31_October_2023.pdf")
        .exists());
}
