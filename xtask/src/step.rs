//! One cargo invocation with coloured progress output.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// How a failing step affects the task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFail {
    Abort,
    Warn,
}

pub struct Step<'a> {
    pub label: &'a str,
    pub args: &'a [&'a str],
    pub on_fail: OnFail,
}

impl Step<'_> {
    /// Run the step. Returns the captured output when it succeeded.
    pub fn run(&self) -> Result<Option<Output>> {
        println!("{}", format!("  {}...", self.label).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(self.args)
            .output()
            .with_context(|| format!("Failed to spawn cargo for: {}", self.label))?;

        if output.status.success() {
            println!(
                "{}",
                format!("  ✓ {} in {:.2}s", self.label, start.elapsed().as_secs_f64()).green()
            );
            println!();
            return Ok(Some(output));
        }

        match self.on_fail {
            OnFail::Abort => {
                eprintln!("{}", format!("  ✗ {} failed", self.label).red().bold());
                eprintln!();
                eprintln!("{}", String::from_utf8_lossy(&output.stdout));
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                anyhow::bail!("{} failed", self.label);
            }
            OnFail::Warn => {
                eprintln!("{}", format!("  ⚠ {} reported problems", self.label).yellow().bold());
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                println!();
                Ok(None)
            }
        }
    }
}

/// Pull "N passed; M failed; ..." out of libtest output.
pub fn test_summary(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.split("test result:").nth(1))
        .map(str::trim)
        .next_back()
        .map_or_else(|| "(summary not available)".to_string(), str::to_string)
}
