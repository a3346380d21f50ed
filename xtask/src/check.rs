use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{OnFail, Step};

const CORTEX_M: &str = "thumbv7em-none-eabihf";

pub fn run(host_only: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking jack detection crates...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let mut steps = Vec::new();
    if !host_only {
        steps.push(Step {
            label: "platform no_std (Cortex-M)",
            args: &["check", "-p", "platform", "--target", CORTEX_M],
            on_fail: OnFail::Abort,
        });
        steps.push(Step {
            label: "codec no_std + defmt (Cortex-M)",
            args: &["check", "-p", "codec", "--target", CORTEX_M, "--features", "defmt"],
            on_fail: OnFail::Abort,
        });
    }
    steps.extend([
        Step {
            label: "codec + tracing (host)",
            args: &["check", "-p", "codec", "--features", "tracing,std"],
            on_fail: OnFail::Abort,
        },
        Step {
            label: "clippy",
            args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            on_fail: OnFail::Warn,
        },
        Step {
            label: "formatting",
            args: &["fmt", "--all", "--check"],
            on_fail: OnFail::Warn,
        },
    ]);

    for step in &steps {
        step.run()?;
    }

    println!(
        "{}",
        format!("✓ All checks completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}
