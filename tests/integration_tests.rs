//! Integration tests for the nutriswap CLI
//!
//! These tests exercise the binary end-to-end with assert_cmd, always
//! against the embedded sample dataset so no network access is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a nutriswap command pointed at a scratch database
fn nutriswap(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nutriswap").unwrap();
    cmd.arg("--db").arg(tmp.path().join("test.db"));
    cmd
}

/// Helper to create a database filled with the sample dataset
fn setup_sample_db() -> TempDir {
    let tmp = TempDir::new().unwrap();
    nutriswap(&tmp)
        .args(["init", "--sample", "--quiet"])
        .assert()
        .success();
    tmp
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("nutriswap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("browse"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_status_on_fresh_database() {
    let tmp = TempDir::new().unwrap();
    nutriswap(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database Status"))
        .stdout(predicate::str::contains("categories"));
}

#[test]
fn test_init_sample_reports_counts() {
    let tmp = TempDir::new().unwrap();
    nutriswap(&tmp)
        .args(["init", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 categorie(s)"))
        .stdout(predicate::str::contains("14 product(s)"));
}

#[test]
fn test_init_twice_requires_force() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["init", "--sample"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already contains data"));
    nutriswap(&tmp)
        .args(["init", "--sample", "--force", "--quiet"])
        .assert()
        .success();
}

#[test]
fn test_list_categories() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["list", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Yaourts"))
        .stdout(predicate::str::contains("Biscuits"))
        .stdout(predicate::str::contains("Jus de fruits"));
}

#[test]
fn test_list_products_of_category() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["list", "products", "--category", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Yaourt nature"))
        .stdout(predicate::str::contains("danone"));
}

#[test]
fn test_list_products_csv_is_plain() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["list", "products", "--category", "1", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,name,brands,grade"))
        .stdout(predicate::str::contains("Yaourt nature"));
}

#[test]
fn test_list_unknown_category_fails() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["list", "products", "--category", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No category with id 99"));
}

#[test]
fn test_list_favorites_empty() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["list", "favorites", "--quiet"])
        .assert()
        .success();
}

#[test]
fn test_clear_with_no_favorites() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorites to erase"));
}

#[test]
fn test_update_sample_refreshes() {
    let tmp = setup_sample_db();
    nutriswap(&tmp)
        .args(["update", "--sample", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 categorie(s)"));
    // Ids restart from 1 after the rebuild
    nutriswap(&tmp)
        .args(["list", "categories", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,Yaourts"));
}

#[test]
fn test_browse_requires_data() {
    let tmp = TempDir::new().unwrap();
    nutriswap(&tmp)
        .arg("browse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nutriswap init"));
}

#[test]
fn test_completions_generate() {
    Command::cargo_bin("nutriswap")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nutriswap"));
}
