use assert_cmd::Command;
use predicates::prelude::*;

const SNAPSHOT: &str = r#"{
  "journalEntries": [
    {"journalEntryId": 1, "transactionId": 1, "date": "2025-10-03", "description": "Innbetaling faktura 1001",
     "lines": [{"account": "1920:10001", "amount": 150000}, {"account": "1500", "amount": -150000}]},
    {"journalEntryId": 2, "transactionId": 2, "date": "2025-10-06", "description": "Adobe",
     "lines": [{"account": "1920:10001", "amount": -250075}, {"account": "6420", "amount": 250075}]},
    {"journalEntryId": 3, "transactionId": 2, "date": "2025-10-07", "description": "Adobe motlinje",
     "lines": [{"account": "1920:10001", "amount": -250075}, {"account": "6420", "amount": 250075}]},
    {"journalEntryId": 4, "transactionId": 3, "date": "2025-10-08", "description": "Annullert kjøp",
     "lines": [{"account": "1920:10001", "amount": -9900}, {"account": "6420", "amount": 9900}]},
    {"journalEntryId": 5, "transactionId": 404, "date": "2025-10-09", "description": "Ukjent",
     "lines": [{"account": "1920:10001", "amount": -100}, {"account": "7700", "amount": 100}]},
    {"journalEntryId": 6, "transactionId": 5, "date": "2025-10-10", "description": "Avskrivning",
     "lines": [{"account": "6000", "amount": 5000}, {"account": "1200", "amount": -5000}]},
    {"journalEntryId": 7, "transactionId": 4, "date": "2025-11-25", "description": "Lønn november",
     "lines": [{"account": "1920:10001", "amount": -4000000}, {"account": "5001", "amount": 4000000}]}
  ],
  "transactions": [
    {"id": 1, "type": "Salg", "entries": [{"description": "Faktura 1001", "lines": [{"account": "1920:10001", "amount": 150000}, {"account": "1500", "amount": -150000}]}]},
    {"id": 2, "type": "Kjøp", "entries": [{"description": "Lisens", "lines": [{"account": "1920:10001", "amount": -250075}, {"account": "6420", "amount": 250075}]}]},
    {"id": 3, "type": "Annullering", "entries": []},
    {"id": 4, "type": "Lønn", "entries": [{"description": "Lønn", "lines": [{"account": "1920:10001", "amount": -4000000}, {"account": "5001", "amount": 4000000}]}]},
    {"id": 5, "type": "Fri", "entries": []}
  ]
}"#;

fn kassaflyt(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("kassaflyt").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("FIKEN_TOKEN").env_remove("RUST_LOG");
    cmd
}

#[test]
fn analyze_snapshot_writes_both_reports() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    let out = dir.path().join("out");

    kassaflyt(dir.path())
        .args(["analyze", "--from", "2025-10-01", "--to", "2025-11-30"])
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetched 7 journal entries."))
        .stdout(predicate::str::contains("Kept 6 entries hitting account 1920:10001."))
        .stdout(predicate::str::contains("Net report: Wrote 3 rows"))
        .stdout(predicate::str::contains("Monthly analysis: Wrote 10 rows"))
        .stdout(predicate::str::contains("Excluded 1 cancelled transactions."))
        .stderr(predicate::str::contains("1 transactions could not be fetched"));

    let lines = std::fs::read_to_string(out.join("fiken_net_transactions_2025-10-01_to_2025-11-30.csv")).unwrap();
    let rows: Vec<&str> = lines.lines().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1], "2025-10-03,Innbetaling faktura 1001,1,1,Salg,1500.00,Inflow,Income,1500,No");
    assert_eq!(rows[2], "2025-10-06,Adobe,2,2,Kjøp,2500.75,Outflow,Programvare og datasystemer,6420,No");
    assert_eq!(rows[3], "2025-11-25,Lønn november,4,7,Lønn,40000.00,Outflow,Personalkostnader,5001,No");

    let monthly = std::fs::read_to_string(out.join("fiken_monthly_analysis_2025-10-01_to_2025-11-30.csv")).unwrap();
    assert!(monthly.contains("2025-10,Income,1500.00,0.00,1500.00,1"));
    assert!(monthly.contains("2025-10,Programvare og datasystemer,0.00,2500.75,-2500.75,1"));
    assert!(monthly.contains("2025-11,Income,0.00,0.00,0.00,0"));
    assert!(monthly.contains("2025-11,Personalkostnader,0.00,40000.00,-40000.00,1"));
}

#[test]
fn monthly_only_skips_line_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    kassaflyt(dir.path())
        .args(["monthly", "--from", "2025-11-01", "--to", "2025-11-30"])
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly analysis: Wrote 5 rows"))
        .stdout(predicate::str::contains("Net report").not());

    assert!(!dir.path().join("fiken_net_transactions_2025-11-01_to_2025-11-30.csv").exists());
}

#[test]
fn missing_token_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    kassaflyt(dir.path())
        .args(["lines", "--from", "2025-10-01", "--to", "2025-10-31", "--company", "acme-as"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FIKEN_TOKEN"));
}

#[test]
fn reversed_window_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    kassaflyt(dir.path())
        .args(["analyze", "--from", "2025-11-01", "--to", "2025-10-01", "--snapshot", "unused.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}
