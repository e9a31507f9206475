use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LAYOUT: &str = r#"{
  "pages": [
    {
      "tables": [[
        ["Date", "Narration", "Debit", "Credit", "Balance"],
        ["01/01/2024", "Salary", null, "500.00", "1,500.00"],
        ["02/01/2024", "Rent", "200.00", "", "1,300.00"]
      ]],
      "text": "Date  Narration  Debit  Credit  Balance\n01/01/2024  Salary  500.00  1,500.00\nPage 1 of 1"
    }
  ]
}"#;

const NEWEST_FIRST_CSV: &str = "\
Txn Date,Details,Amount,Balance
03/01/2024,Coffee,5.00,1295.00
02/01/2024,Card,100.00,1300.00
01/01/2024,Salary,500.00,1450.00
";

fn passbook(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("passbook").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("settings.json"))
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn convert_layout_dump_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.json", LAYOUT);
    passbook(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Sr No,Date,Description,Type,Amount,Balance\n\
             1,2024-01-01,Salary,Receipt,500.00,1500.00\n\
             2,2024-01-02,Rent,Payment,200.00,1300.00\n",
        ))
        .stderr(predicate::str::contains("via table detection"));
}

#[test]
fn convert_reverses_and_corrects_csv() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.csv", NEWEST_FIRST_CSV);
    let out = dir.path().join("out").join("ledger.csv");
    passbook(&dir)
        .arg("convert")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 amounts corrected"));

    let csv = read(&out);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "1,2024-01-01,Salary,Receipt,500.00,1450.00");
    assert_eq!(lines[2], "2,2024-01-02,Card,Payment,150.00,1300.00");
    assert_eq!(lines[3], "3,2024-01-03,Coffee,Payment,5.00,1295.00");
}

#[test]
fn convert_json_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.json", LAYOUT);
    let output = passbook(&dir)
        .args(["convert", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["type"], "Payment");
    assert_eq!(value[1]["balance"], 1300.0);
}

#[test]
fn convert_text_without_dates_fails_with_named_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "notes.txt", "shopping list\nmilk  eggs\nbread  butter\n");
    passbook(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not identify a date column"))
        .stderr(predicate::str::contains("passbook inspect"));
}

#[test]
fn convert_empty_layout_reports_no_rows() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "empty.json", r#"{"pages": []}"#);
    passbook(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rows could be extracted"));
}

#[test]
fn convert_missing_file() {
    let dir = TempDir::new().unwrap();
    passbook(&dir)
        .arg("convert")
        .arg(dir.path().join("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a file"));
}

#[test]
fn preview_shows_totals() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.json", LAYOUT);
    passbook(&dir)
        .arg("preview")
        .arg(&input)
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary"))
        .stdout(predicate::str::contains("Receipts:         500.00"))
        .stdout(predicate::str::contains("Closing balance:  1,300.00"));
}

#[test]
fn inspect_shows_strategy_and_roles() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.json", LAYOUT);
    passbook(&dir)
        .arg("inspect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy:   table detection"))
        .stdout(predicate::str::contains("Rows:       3"))
        .stdout(predicate::str::contains("credit"));
}

#[test]
fn lines_dumps_every_page_line() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "statement.json", LAYOUT);
    passbook(&dir)
        .arg("lines")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Page #,Line #,Content\n1,1,"))
        .stdout(predicate::str::contains("1,3,Page 1 of 1"));
}

#[test]
fn config_set_changes_tolerance() {
    let dir = TempDir::new().unwrap();
    passbook(&dir)
        .args(["config", "set", "tolerance", "0.5"])
        .assert()
        .success();
    passbook(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tolerance:    0.5"));
    passbook(&dir)
        .args(["config", "set", "tolerance", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a number"));
}
