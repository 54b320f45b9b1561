//! Mass function subcommand: one curve per input catalog.

use crate::cli::{Cli, HmfArgs};
use anyhow::Context;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use halo_analysis::hmf::{mass_function, MassFunction};
use halo_formats::rockstar::{LoadOptions, RockstarCatalog};
use halo_plot::svg::lines_loglog_svg;

pub fn run(args: &HmfArgs, cli: &Cli) -> anyhow::Result<()> {
    print_plan(args, cli);

    let mut results: Vec<(String, MassFunction)> = Vec::new();
    for path in &args.catalogs {
        let label = catalog_label(path);
        let mf = catalog_mass_function(path, args)?;
        let total: usize = mf.bins.iter().map(|b| b.count).sum();
        println!("{}: {} halos in {} bins", label, total, mf.bins.len());
        results.push((label, mf));
    }

    if let Some(json_path) = &args.json {
        write_json(json_path, &results)?;
    }
    plot(args, &results)?;
    println!("Written {:?}", args.output);
    Ok(())
}

fn print_plan(args: &HmfArgs, cli: &Cli) {
    println!("=== Halo Mass Function ===");
    println!("Catalogs: {}", args.catalogs.len());
    println!("Mass column: {}", args.mass_column);
    println!("Bins: {}", args.n_bins);
    if cli.verbose {
        for path in &args.catalogs {
            println!("  {:?}", path);
        }
    }
    println!();
}

fn catalog_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn catalog_mass_function(path: &Path, args: &HmfArgs) -> anyhow::Result<MassFunction> {
    let mut options = LoadOptions {
        only: vec![args.mass_column.clone()],
        only_hosts: args.hosts_only,
        ..Default::default()
    };
    if args.hosts_only {
        options.only.push("PID".to_string());
    }

    let catalog = RockstarCatalog::load(path, &options)
        .with_context(|| format!("loading catalog {:?}", path))?;
    let box_size = catalog
        .header
        .box_size()
        .with_context(|| format!("catalog {:?} carries no Box_size", path))?;
    let masses = catalog.column_f64(&args.mass_column)?;

    mass_function(&masses, box_size, args.n_bins)
        .with_context(|| format!("binning catalog {:?}", path))
}

fn write_json(path: &Path, results: &[(String, MassFunction)]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &results)?;
    println!("Written {:?}", path);
    Ok(())
}

fn plot(args: &HmfArgs, results: &[(String, MassFunction)]) -> anyhow::Result<()> {
    let curves: Vec<(String, Vec<(f64, f64)>)> = results
        .iter()
        .map(|(label, mf)| {
            let points = mf
                .bins
                .iter()
                .filter(|b| b.count > 0)
                .map(|b| {
                    let density = if args.per_lnm { b.dn_dlnm_dv } else { b.dn_dm_dv };
                    (b.m_center, density)
                })
                .collect();
            (label.clone(), points)
        })
        .collect();
    let series: Vec<(&str, &[(f64, f64)])> = curves
        .iter()
        .map(|(label, points)| (label.as_str(), points.as_slice()))
        .collect();

    let y_label = if args.per_lnm {
        "dn/dlnM/dV [h^3 Mpc^-3]"
    } else {
        "dn/dM/dV [h^4 Msun^-1 Mpc^-3]"
    };
    lines_loglog_svg(
        &series,
        &args.output,
        "Halo mass function",
        "M [Msun/h]",
        y_label,
    )
    .map_err(|e| anyhow::anyhow!("rendering {:?}: {}", args.output, e))
}
