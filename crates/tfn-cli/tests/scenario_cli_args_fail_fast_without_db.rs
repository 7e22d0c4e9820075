//! CLI argument handling that must not require a database.
//!
//! Cheap local validation (cart JSON, uuids, role and status strings) runs
//! before any connection attempt, so bad invocations fail fast with a
//! usable message even on a machine with no Postgres.

use predicates::prelude::*;
use uuid::Uuid;

fn tfn() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("tfn-cli").expect("binary builds");
    // Isolate from developer environments that point at a real database.
    cmd.env_remove(tfn_db::ENV_DB_URL);
    cmd
}

#[test]
fn help_lists_the_command_tree() {
    tfn()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("db"))
        .stdout(predicate::str::contains("order"));
}

#[test]
fn db_status_without_database_url_names_the_env_var() {
    tfn()
        .args(["db", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(tfn_db::ENV_DB_URL));
}

#[test]
fn order_create_refuses_a_malformed_cart_before_connecting() {
    tfn()
        .args([
            "order",
            "create",
            "--customer",
            &Uuid::new_v4().to_string(),
            "--cart",
            "this is not json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cart must be a valid order request"));
}

#[test]
fn order_create_requires_a_cart_argument() {
    tfn()
        .args([
            "order",
            "create",
            "--customer",
            &Uuid::new_v4().to_string(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must provide --cart or --cart-file"));
}

#[test]
fn order_status_rejects_an_unknown_role_before_connecting() {
    tfn()
        .args([
            "order",
            "status",
            "--order-id",
            &Uuid::new_v4().to_string(),
            "--user",
            &Uuid::new_v4().to_string(),
            "--role",
            "owner",
            "--to",
            "confirmed",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}

#[test]
fn order_status_rejects_an_unknown_target_status_before_connecting() {
    tfn()
        .args([
            "order",
            "status",
            "--order-id",
            &Uuid::new_v4().to_string(),
            "--user",
            &Uuid::new_v4().to_string(),
            "--to",
            "flying",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown status"));
}
