//! Report subcommand: wraps generated figures into a LaTeX document.

use crate::cli::{Cli, ReportArgs};
use anyhow::Context;

use halo_plot::report::Report;

pub fn run(args: &ReportArgs, cli: &Cli) -> anyhow::Result<()> {
    println!("=== Report ===");
    println!("Title: {}", args.title);
    println!("Figures: {}", args.figures.len());
    println!();

    let mut report = Report::new(&args.title);
    for path in &args.figures {
        anyhow::ensure!(path.exists(), "figure not found: {:?}", path);
        let caption = path
            .file_stem()
            .map(|s| s.to_string_lossy().replace('_', " "))
            .unwrap_or_default();
        if cli.verbose {
            eprintln!("embedding {:?}", path);
        }
        report.section(&caption).figure(path, &caption);
    }

    report
        .save(&args.output)
        .with_context(|| format!("writing {:?}", args.output))?;
    println!("Written {:?}", args.output);
    Ok(())
}
