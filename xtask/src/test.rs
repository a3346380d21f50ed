use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{test_summary, OnFail, Step};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let mut steps = Vec::new();
    if !integration_only {
        steps.push(Step {
            label: "unit tests",
            args: &["test", "--lib", "--workspace", "--features", "codec/tracing"],
            on_fail: OnFail::Abort,
        });
    }
    if !unit_only {
        steps.push(Step {
            label: "integration and property tests",
            args: &["test", "--tests", "-p", "platform", "-p", "codec", "--features", "platform/std"],
            on_fail: OnFail::Abort,
        });
        steps.push(Step {
            label: "doc tests",
            args: &["test", "--doc", "-p", "platform", "-p", "codec"],
            on_fail: OnFail::Warn,
        });
    }

    for step in &steps {
        if let Some(output) = step.run()? {
            println!("    {}", test_summary(&output).dimmed());
        }
    }

    println!(
        "{}",
        format!("✓ All tests completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}
