//! Match error subcommand: mass deviation of matched pairs against the
//! primary halo particle count.

use crate::cli::{Cli, MatchErrorsArgs};
use anyhow::Context;
use std::fs::File;
use std::io::BufWriter;

use halo_analysis::matcher::{binned_errors, relative_errors};
use halo_formats::matches::MatchList;
use halo_formats::rockstar::{index_by_id, HaloColumns, LoadOptions, RockstarCatalog, HALO_NOT_SET};
use halo_plot::svg::scatter_logx_svg;

pub fn run(args: &MatchErrorsArgs, cli: &Cli) -> anyhow::Result<()> {
    println!("=== Match Mass Errors ===");
    println!("Matches: {:?}", args.matches);
    println!("Primary catalog: {:?}", args.primary);
    println!();

    let list = MatchList::load(&args.matches)
        .with_context(|| format!("loading match file {:?}", args.matches))?;
    println!("{} matched pairs", list.matches.len());

    let catalog = RockstarCatalog::load(&args.primary, &LoadOptions::default())
        .with_context(|| format!("loading catalog {:?}", args.primary))?;
    let indexed = index_by_id(&catalog.halos(&HaloColumns::with_mass(&args.mass_column))?);

    let deviations = relative_errors(&list.matches, |id| {
        let halo = indexed.get(id as usize)?;
        (halo.id != HALO_NOT_SET && halo.num_p != HALO_NOT_SET).then_some(halo.num_p)
    });
    if cli.verbose {
        eprintln!(
            "{} of {} pairs carry a particle count",
            deviations.len(),
            list.matches.len()
        );
    }
    let bins = binned_errors(&deviations, args.n_bins)?;

    for bin in &bins {
        println!(
            "num_p {:>9.0} .. {:<9.0}  {:4} pairs  mean {:+.4}  rms {:.4}",
            bin.num_p_lo, bin.num_p_hi, bin.count, bin.mean, bin.scatter
        );
    }

    if let Some(json_path) = &args.json {
        let file = File::create(json_path).with_context(|| format!("creating {:?}", json_path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &bins)?;
        println!("Written {:?}", json_path);
    }

    let points: Vec<(f64, f64)> = deviations
        .iter()
        .map(|d| (d.num_p as f64, d.relative_error))
        .collect();
    scatter_logx_svg(
        &points,
        &args.output,
        "Matched halo mass errors",
        "num_p (primary)",
        "(m2 - m1) / m1",
    )
    .map_err(|e| anyhow::anyhow!("rendering {:?}: {}", args.output, e))?;
    println!("Written {:?}", args.output);
    Ok(())
}
