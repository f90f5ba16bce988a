// vlayer-core/tests/baseline_history_tests.rs
use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vlayer_core::{
    append_run, load_baseline, save_baseline, Baseline, HistoryEntry, ScanConfig, ScanEngine,
    ScanHistory, ScanResult, SeverityBreakdown, HISTORY_RETENTION,
};
use vlayer_rules::Severity;

fn scan(root: &Path) -> ScanResult {
    ScanEngine::new(ScanConfig::default())
        .unwrap()
        .scan_tree(root)
        .unwrap()
}

fn entry(score: u8) -> HistoryEntry {
    HistoryEntry {
        date: Utc::now(),
        score,
        severity_counts: SeverityBreakdown::default(),
        files_scanned: 12,
    }
}

#[test]
fn baseline_separates_new_debt_from_accepted_debt() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a.js"), "const h1 = md5(a);\n")?;
    fs::write(dir.path().join("b.js"), "const h2 = md5(b);\n")?;
    fs::write(dir.path().join("c.js"), "fetch('http://api.clinic.io');\n")?;

    let initial = scan(dir.path());
    assert_eq!(initial.findings.len(), 3);
    let baseline = Baseline::capture(&initial, Utc::now());
    assert_eq!(baseline.len(), 3);
    save_baseline(dir.path(), &baseline)?;

    // A fourth violation lands after the baseline was taken.
    fs::write(
        dir.path().join("d.js"),
        "const apiKey = 'sk_live_4242extra';\n",
    )?;

    let result = scan(dir.path());
    assert_eq!(result.findings.len(), 4);
    assert_eq!(result.findings.iter().filter(|f| f.is_baseline).count(), 3);

    let new = result.new_findings();
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].rule_id, "ACC-001");
    assert_eq!(new[0].file, "d.js");
    assert_eq!(result.highest_new_severity(), Some(Severity::Critical));

    // Only the new critical finding is penalized.
    assert_eq!(result.compliance_score.score, 80);
    Ok(())
}

#[test]
fn baseline_keys_on_rule_and_file_not_line() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("hash.js");
    fs::write(&file, "const h = md5(x);\n")?;

    let baseline = Baseline::capture(&scan(dir.path()), Utc::now());
    save_baseline(dir.path(), &baseline)?;

    // The offending line drifts down the file; the finding stays baseline.
    fs::write(&file, "import util from './util';\n\n\nconst h = md5(x);\n")?;
    let result = scan(dir.path());
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].line, Some(4));
    assert!(result.findings[0].is_baseline);
    assert!(result.new_findings().is_empty());
    assert_eq!(result.highest_new_severity(), None);
    Ok(())
}

#[test]
fn baseline_round_trips_through_the_store() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a.js"), "const h = md5(a);\n")?;

    assert!(load_baseline(dir.path())?.is_none());
    let baseline = Baseline::capture(&scan(dir.path()), Utc::now());
    save_baseline(dir.path(), &baseline)?;

    let loaded = load_baseline(dir.path())?.expect("baseline persisted");
    assert_eq!(loaded, baseline);
    assert!(loaded.contains("ENC-001", "a.js"));
    assert!(!loaded.contains("ENC-001", "b.js"));
    Ok(())
}

#[test]
fn trend_compares_latest_to_oldest_retained() {
    let mut history = ScanHistory::default();
    for score in [80, 60, 90] {
        history.push_entry(entry(score));
    }

    assert_eq!(history.trend(), Some(10));
    assert_eq!(history.best(), Some(90));
    assert_eq!(history.worst(), Some(60));

    let recent: Vec<u8> = history.recent(2).iter().map(|e| e.score).collect();
    assert_eq!(recent, vec![90, 60]);
}

#[test]
fn history_drops_oldest_past_retention() {
    let mut history = ScanHistory::default();
    for i in 0..(HISTORY_RETENTION + 5) {
        history.push_entry(entry((i % 100) as u8));
    }
    assert_eq!(history.len(), HISTORY_RETENTION);
    // The first five scores were dropped.
    assert_eq!(history.entries[0].score, 5);
}

#[test]
fn runs_append_to_the_persisted_history() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("crypto.js"), "const hash = md5(password);\n")?;

    let first = scan(dir.path());
    assert_eq!(first.compliance_score.score, 90);
    let history = append_run(dir.path(), &first, Utc::now())?;
    assert_eq!(history.len(), 1);

    // Debt paid down; the next run should trend upward.
    fs::write(dir.path().join("crypto.js"), "const hash = sha256(password);\n")?;
    let second = scan(dir.path());
    assert_eq!(second.compliance_score.score, 100);
    let history = append_run(dir.path(), &second, Utc::now())?;

    assert_eq!(history.len(), 2);
    assert_eq!(history.trend(), Some(10));

    let reloaded = ScanHistory::load(dir.path())?;
    assert_eq!(reloaded, history);
    Ok(())
}
