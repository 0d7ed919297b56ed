use crate::TestCli;
use pretty_assertions::assert_eq;

#[test]
fn test_context_lifecycle() {
    let cli = TestCli::new();

    let output = cli.run(["config", "ls"]);
    assert!(output.contains("No contexts"), "{}", output);

    let output = cli.run([
        "config",
        "add",
        "--name",
        "staging",
        "--endpoint",
        "https://staging.example.com/api/web-gateway",
    ]);
    assert!(output.contains("Added context `staging`"), "{}", output);
    assert!(output.contains("Current context is `staging`."), "{}", output);

    cli.add_context("local");

    let output = cli.run(["config", "ls"]);
    assert!(output.contains("staging.example.com"), "{}", output);
    assert!(output.contains("local"), "{}", output);

    let output = cli.run(["config", "current"]);
    assert_eq!(output.trim(), "staging");

    let output = cli.run(["config", "use", "local"]);
    assert!(output.contains("use `tb login` to log in"), "{}", output);
    let output = cli.run(["config", "current"]);
    assert_eq!(output.trim(), "local");

    let output = cli.run(["config", "delete", "staging"]);
    assert!(output.contains("Deleted context `staging`."), "{}", output);

    let output = cli.run(["config", "ls"]);
    assert!(!output.contains("staging.example.com"), "{}", output);
}

#[test]
fn test_list_shows_session_state() {
    let cli = TestCli::new();
    cli.add_context("staging");
    cli.add_context("local");
    cli.save_token(Some("staging"), "abc");

    let output = cli.run(["config", "ls"]);
    let line = |name: &str| {
        output
            .lines()
            .find(|line| line.contains(name))
            .unwrap_or_else(|| panic!("no row for {name}:\n{output}"))
            .to_owned()
    };
    assert!(line("staging").contains("logged in"), "{}", output);
    assert!(line("local").contains("logged out"), "{}", output);
}

#[test]
fn test_delete_logs_context_out() {
    let cli = TestCli::new();
    cli.add_context("staging");
    cli.save_token(Some("staging"), "abc");

    let output = cli.run(["config", "delete", "staging"]);
    assert!(
        output.contains("Deleted context `staging` and logged it out."),
        "{}",
        output
    );
    assert!(!cli.session_path(Some("staging")).exists());
}

#[test]
fn test_moving_context_logs_it_out() {
    let cli = TestCli::new();
    cli.add_context("staging");
    cli.save_token(Some("staging"), "abc");

    let output = cli.run([
        "config",
        "add",
        "--name",
        "staging",
        "--endpoint",
        "https://elsewhere.example.com/api/web-gateway",
    ]);
    assert!(output.contains("its session was logged out"), "{}", output);
    assert!(!cli.session_path(Some("staging")).exists());
}

#[test]
fn test_use_unknown_context() {
    let cli = TestCli::new();

    let output = cli.run_and_error(["config", "use", "nowhere"]);
    assert!(output.contains("Unknown context `nowhere`."), "{}", output);
    assert!(!cli.config_path().exists());
}

#[test]
fn test_unknown_context_flag_fails() {
    let cli = TestCli::new();

    let output = cli.run_and_error(["--context", "nowhere", "get", "tables"]);
    assert!(output.contains("Unknown context `nowhere`."), "{}", output);
}
