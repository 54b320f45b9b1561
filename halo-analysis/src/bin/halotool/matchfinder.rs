//! Cross-match subcommand: links halos of two catalogs of the same box.

use crate::cli::{Cli, MatchArgs};
use anyhow::Context;
use std::path::Path;

use halo_analysis::matcher::{match_catalogs, MatcherParams};
use halo_formats::matches::MatchList;
use halo_formats::rockstar::{Halo, HaloColumns, LoadOptions, RockstarCatalog};

pub fn run(args: &MatchArgs, cli: &Cli) -> anyhow::Result<()> {
    print_plan(args, cli);

    let (primary, box_size) = load_halos(&args.primary, args, true)?;
    let (secondary, _) = load_halos(&args.secondary, args, false)?;

    let params = MatcherParams {
        mass_offset: args.mass_offset,
        max_displacement: args.max_displacement,
    };
    let matches = match_catalogs(&primary, &secondary, box_size, &params)?;
    println!(
        "{} of {} primary halos matched ({} secondary candidates)",
        matches.len(),
        primary.len(),
        secondary.len()
    );

    let list = MatchList {
        primary_input: args.primary.display().to_string(),
        secondary_input: args.secondary.display().to_string(),
        mass_offset: args.mass_offset,
        max_displacement: args.max_displacement,
        init_volume_grid: 0,
        num_primary: primary.len() as u64,
        num_secondary: secondary.len() as u64,
        matches,
    };
    list.save(&args.output)
        .with_context(|| format!("writing {:?}", args.output))?;
    println!("Written {:?}", args.output);
    Ok(())
}

fn print_plan(args: &MatchArgs, cli: &Cli) {
    println!("=== Halo Cross-Match ===");
    println!("Primary: {:?}", args.primary);
    println!("Secondary: {:?}", args.secondary);
    println!("Mass offset: {}", args.mass_offset);
    println!("Max displacement: {} Mpc/h", args.max_displacement);
    println!("Verbose: {}", cli.verbose);
    println!();
}

fn load_halos(
    path: &Path,
    args: &MatchArgs,
    want_box: bool,
) -> anyhow::Result<(Vec<Halo>, f64)> {
    let options = LoadOptions {
        only_hosts: args.hosts_only,
        ..Default::default()
    };
    let catalog = RockstarCatalog::load(path, &options)
        .with_context(|| format!("loading catalog {:?}", path))?;

    let box_size = if want_box {
        catalog
            .header
            .box_size()
            .with_context(|| format!("catalog {:?} carries no Box_size", path))?
    } else {
        0.0
    };

    let halos = catalog.halos(&HaloColumns::with_mass(&args.mass_column))?;
    Ok((halos, box_size))
}
