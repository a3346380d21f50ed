use anyhow::Result;
use colored::Colorize;

use crate::step::{OnFail, Step};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let args: &[&str] = if open {
        &["doc", "-p", "platform", "-p", "codec", "--no-deps", "--open"]
    } else {
        &["doc", "-p", "platform", "-p", "codec", "--no-deps"]
    };
    Step {
        label: "rustdoc",
        args,
        on_fail: OnFail::Abort,
    }
    .run()?;

    if !open {
        println!("   {}", "Open target/doc/codec/index.html in your browser".dimmed());
        println!("   {}", "Or run 'cargo run -p xtask -- doc --open'".dimmed());
        println!();
    }

    Ok(())
}
