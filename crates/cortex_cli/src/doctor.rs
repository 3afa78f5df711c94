//! Doctor command - diagnose the local Cortex project setup.

use std::process::Command;

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
    NotApplicable,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn not_applicable(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::NotApplicable,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn colored_icon(&self) -> String {
        match self.status {
            CheckStatus::Ok => format!("{}✓{}", colors::GREEN, colors::RESET),
            CheckStatus::Warning => format!("{}!{}", colors::YELLOW, colors::RESET),
            CheckStatus::Error => format!("{}✗{}", colors::RED, colors::RESET),
            CheckStatus::NotApplicable => format!("{}-{}", colors::GRAY, colors::RESET),
        }
    }
}

pub struct CheckCategory {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

impl CheckCategory {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn status(&self) -> CheckStatus {
        for check in &self.checks {
            if check.status == CheckStatus::Error {
                return CheckStatus::Error;
            }
        }
        CheckStatus::Ok
    }

    pub fn colored_icon(&self) -> String {
        match self.status() {
            CheckStatus::Ok => format!("{}✓{}", colors::GREEN, colors::RESET),
            CheckStatus::Warning => format!("{}!{}", colors::YELLOW, colors::RESET),
            CheckStatus::Error => format!("{}✗{}", colors::RED, colors::RESET),
            CheckStatus::NotApplicable => format!("{}-{}", colors::GRAY, colors::RESET),
        }
    }
}

pub fn run_doctor() -> Vec<CheckCategory> {
    vec![check_cortex_project(), check_rust_toolchain()]
}

fn check_cortex_project() -> CheckCategory {
    let mut cat = CheckCategory::new("Cortex Project");

    let version = env!("CARGO_PKG_VERSION");
    cat.add(CheckResult::ok("Cortex CLI", &format!("v{version}")));

    if let Ok(dir) = std::env::current_dir() {
        let config_path = dir.join("cortex.toml");
        if config_path.exists() {
            cat.add(CheckResult::ok(
                "Project config",
                &format!("cortex.toml found in {}", dir.display()),
            ));
        } else {
            cat.add(CheckResult::not_applicable(
                "Project config",
                "no cortex.toml in current directory, defaults will be used",
            ));
        }
    }

    cat
}

fn check_rust_toolchain() -> CheckCategory {
    let mut cat = CheckCategory::new("Rust Toolchain");

    match get_command_version("rustc", &["--version"]) {
        Some(version) => cat.add(CheckResult::ok("Rust compiler", &version)),
        None => cat.add(CheckResult::error(
            "Rust compiler",
            "rustc not found",
            "Install Rust from https://rustup.rs",
        )),
    }

    match get_command_version("cargo", &["--version"]) {
        Some(version) => cat.add(CheckResult::ok("Cargo", &version)),
        None => cat.add(CheckResult::error(
            "Cargo",
            "cargo not found",
            "Install Rust from https://rustup.rs",
        )),
    }

    cat
}

fn get_command_version(cmd: &str, args: &[&str]) -> Option<String> {
    Command::new(cmd)
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
