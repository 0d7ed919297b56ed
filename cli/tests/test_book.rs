use crate::TestCli;

#[test]
fn test_book_rejects_malformed_date() {
    let cli = TestCli::new();

    let output = cli.run_and_error(["book", "3", "--from-date", "2024/01/01"]);
    assert!(output.contains("Invalid booking time."), "{}", output);
    assert!(output.contains("Invalid date `2024/01/01`"), "{}", output);
}

#[test]
fn test_book_rejects_malformed_time() {
    let cli = TestCli::new();

    let output = cli.run_and_error([
        "book",
        "3",
        "--from-date",
        "2024-01-01",
        "--from-time",
        "10h",
    ]);
    assert!(output.contains("Invalid time `10h`"), "{}", output);
}

#[test]
fn test_book_rejects_window_ending_before_start() {
    let cli = TestCli::new();
    cli.save_token(None, "abc");

    let output = cli.run_and_error([
        "book",
        "3",
        "--from-date",
        "2024-01-01",
        "--from-time",
        "12:00",
        "--to-time",
        "11:00",
    ]);
    assert!(output.contains("does not end after it starts"), "{}", output);
    assert!(
        output.contains("The request was rejected as invalid."),
        "{}",
        output
    );
}

#[test]
fn test_book_requires_login() {
    let cli = TestCli::new();

    let output = cli.run_and_error(["book", "3", "--from-date", "2024-01-01"]);
    assert!(output.contains("Operation to book table 3 has failed."), "{}", output);
    assert!(output.contains("Not logged in"), "{}", output);
    assert!(
        output.contains("You are not authorised, please log in again."),
        "{}",
        output
    );
}

#[test]
fn test_book_reports_unreachable_gateway() {
    let cli = TestCli::new();
    cli.save_token(None, "abc");

    let output = cli.run_and_error(["book", "3", "--from-date", "2024-01-01"]);
    assert!(output.contains("Operation to book table 3 has failed."), "{}", output);
    assert!(output.contains("An unexpected error occurred."), "{}", output);
}

#[test]
fn test_bad_table_id() {
    let cli = TestCli::new();

    let output = cli.run_and_error(["get", "free-times", "three"]);
    assert!(output.contains("three"), "{}", output);
}
