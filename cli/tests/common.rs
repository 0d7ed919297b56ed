use once_cell::sync::Lazy;
use std::{
    env,
    ffi::OsStr,
    fs,
    path::PathBuf,
    process::{Command, Output},
};
use uuid::Uuid;

/// Nothing listens on the discard port, so any request made by the CLI fails
/// fast instead of reaching a real gateway.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9/api/web-gateway";

static CLI_PATH: Lazy<PathBuf> = Lazy::new(|| {
    env::current_exe()
        .ok()
        .and_then(|p| Some(p.parent()?.parent()?.join("tb")))
        .expect("Could not resolve CLI executable from test executable")
});

/// A CLI invocation environment with its own config directory, so tests can
/// run in parallel without sharing contexts or sessions.
pub struct TestCli {
    config_dir: PathBuf,
}

impl TestCli {
    pub fn new() -> Self {
        let config_dir = env::temp_dir().join(format!("tablebook-cli-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&config_dir).expect("Could not create test config directory");
        Self { config_dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("contexts.json")
    }

    /// Where the session of a context is saved. `None` is the session used
    /// when no context is selected.
    pub fn session_path(&self, context: Option<&str>) -> PathBuf {
        match context {
            Some(name) => self.config_dir.join("sessions").join(format!("{name}.json")),
            None => self.config_dir.join("session.json"),
        }
    }

    /// Save an access token for a context as if `tb login` had run.
    pub fn save_token(&self, context: Option<&str>, token: &str) {
        let path = self.session_path(context);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!(r#"{{"authToken": "{token}"}}"#)).unwrap();
    }

    /// Add a context pointing at the unreachable endpoint.
    pub fn add_context(&self, name: &str) {
        self.run([
            "config",
            "add",
            "--name",
            name,
            "--endpoint",
            UNREACHABLE_ENDPOINT,
        ]);
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&*CLI_PATH);
        command
            .env_remove("RUST_LOG")
            .arg("--config-file")
            .arg(self.config_path())
            .arg("--endpoint")
            .arg(UNREACHABLE_ENDPOINT);
        command
    }

    pub fn run(&self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> String {
        self.output(self.command().args(args))
    }

    pub fn run_and_error(&self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> String {
        self.output_error(self.command().args(args))
    }

    pub fn output(&self, command: &mut Command) -> String {
        let output = command.output().unwrap();

        if !output.status.success() {
            panic!(
                "failed to run command:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        combined(output)
    }

    pub fn output_error(&self, command: &mut Command) -> String {
        let output = command.output().unwrap();

        if output.status.success() {
            panic!(
                "succeeded running command (expected failure):\n{}",
                String::from_utf8_lossy(&output.stdout)
            );
        }

        String::from_utf8(output.stderr).unwrap()
    }
}

impl Drop for TestCli {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.config_dir);
    }
}

/// Log lines go to stderr and results to stdout; tests check both.
fn combined(output: Output) -> String {
    let mut text = String::from_utf8(output.stdout).unwrap();
    text.push_str(&String::from_utf8(output.stderr).unwrap());
    text
}
