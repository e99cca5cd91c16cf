use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("kernel-drift")
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("kernel-drift")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("export-snapshot"))
        .stdout(contains("check-drift"))
        .stdout(contains("codegen"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    cargo_bin_cmd!("kernel-drift").assert().failure().code(2);
}
