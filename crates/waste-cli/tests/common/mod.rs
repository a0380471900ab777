use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tempfile::TempDir;

/// Organisation bindings used by every CLI test.
pub const TEST_BINDINGS: &str = "qwe=qwe,asd=asd,zxc=zxc";

/// An isolated store directory plus encoded credentials.
pub struct TestEnv {
    pub dir: TempDir,
    pub org_api_codes: String,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            org_api_codes: STANDARD.encode(TEST_BINDINGS),
        }
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_waste"));
        cmd.args(args);
        cmd.env("WASTE_STORE", self.store());
        cmd.env("ORG_API_CODES", &self.org_api_codes);
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run the CLI binary with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute CLI")
    }

    /// Run the CLI binary without one of the test environment variables.
    pub fn run_with_env_removed(&self, args: &[&str], key: &str) -> Output {
        self.command(args)
            .env_remove(key)
            .output()
            .expect("Failed to execute CLI")
    }

    /// Run the CLI binary, feeding `input` on stdin.
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn CLI");

        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();

        child.wait_with_output().expect("Failed to wait for CLI")
    }

    /// Run the CLI and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Write a receipt payload for `api_code` and return its path.
    pub fn receipt_file(&self, name: &str, api_code: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let body = serde_json::json!({
            "movement": {
                "receivingSiteId": "string",
                "receiverReference": "string",
                "specialHandlingRequirements": "string",
                "apiCode": api_code
            }
        });
        std::fs::write(&path, body.to_string()).unwrap();
        path
    }
}

/// Parse the error response a failed command prints on stdout.
pub fn error_body(output: &Output) -> Value {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::from_slice(&output.stdout).expect("stdout is not an error response")
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
