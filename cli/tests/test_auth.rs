use crate::TestCli;
use std::fs;

#[test]
fn test_logout_without_session() {
    let cli = TestCli::new();

    let output = cli.run(["logout"]);
    assert!(output.contains("Not logged in."), "{}", output);
}

#[test]
fn test_logout_forgets_token() {
    let cli = TestCli::new();
    fs::write(
        cli.session_path(None),
        r#"{"authToken": "abc", "refreshCookie": "refresh=r1", "theme": "dark"}"#,
    )
    .unwrap();

    let output = cli.run(["logout"]);
    assert!(output.contains("Logged out."), "{}", output);

    let session = fs::read_to_string(cli.session_path(None)).unwrap();
    assert!(!session.contains("authToken"), "{}", session);
    assert!(!session.contains("refreshCookie"), "{}", session);
    assert!(session.contains("theme"), "{}", session);
}

#[test]
fn test_sessions_do_not_cross_contexts() {
    let cli = TestCli::new();
    cli.add_context("staging");
    cli.add_context("local");
    cli.save_token(Some("staging"), "abc");

    let output = cli.run(["--context", "local", "logout"]);
    assert!(output.contains("Not logged in."), "{}", output);

    let output = cli.run_and_error([
        "--context",
        "local",
        "book",
        "3",
        "--from-date",
        "2024-01-01",
    ]);
    assert!(output.contains("Not logged in"), "{}", output);

    // `staging` is the current context, so it is used without `--context`.
    let output = cli.run(["logout"]);
    assert!(output.contains("Logged out."), "{}", output);
    let session = fs::read_to_string(cli.session_path(Some("staging"))).unwrap();
    assert!(!session.contains("authToken"), "{}", session);
}

#[test]
fn test_login_reports_unreachable_gateway() {
    let cli = TestCli::new();

    let output = cli.run_and_error([
        "login",
        "--account",
        "guest@example.com",
        "--password",
        "qwerty123",
    ]);
    assert!(output.contains("Operation to log in has failed."), "{}", output);
    assert!(!cli.session_path(None).exists());
}
