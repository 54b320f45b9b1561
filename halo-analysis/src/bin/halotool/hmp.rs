//! Stacked halo mass profile subcommand.
//!
//! Loads the host halos of one catalog, bins them by mass, stacks the
//! radial density profile of the chosen bin against the snapshot
//! particles, and overlays the analytic NFW expectation for the bin's
//! mean halo.

use crate::cli::{Cli, HmpArgs};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use halo_analysis::nfw::nfw_profile;
use halo_analysis::profile::{density_profile, sorted_distances, stack_profiles, StackedProfile};
use halo_core::interval::log_spaced_edges;
use halo_core::{cosmology, Unit};
use halo_formats::gadget::{sort_by_x, Particle, Snapshot};
use halo_formats::rockstar::{
    bin_by_mass, scale_positions, scale_radii, Halo, HaloColumns, LoadOptions, RockstarCatalog,
};

pub fn run(args: &HmpArgs, cli: &Cli) -> anyhow::Result<()> {
    print_plan(args, cli);

    let (halos, h) = load_host_halos(args)?;
    let bin = select_mass_bin(args, &halos)?;
    let (particles, particle_mass, redshift) = load_particles(args)?;
    let rho_crit = cosmology::critical_density(h, Unit::Megaparsec, Unit::SolarMass, true)?;
    if cli.verbose {
        eprintln!("rho_crit = {:.4e} Msun h^2 / Mpc^3", rho_crit);
    }

    let rbins = log_spaced_edges(args.r_min, args.r_max, args.n_rbins)?;
    let stacked = stack_bin(&bin, &particles, &rbins, particle_mass, rho_crit)?;
    match stacked.r200() {
        Ok(r200) => println!("r200 = {:.4} Mpc/h", r200),
        Err(_) => println!("Profile never crosses 200 rho_crit; no r200"),
    }

    if let Some(json_path) = &args.json {
        let file = File::create(json_path).with_context(|| format!("creating {:?}", json_path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &stacked)?;
        println!("Written {:?}", json_path);
    }

    plot(args, &bin, &stacked, redshift, rho_crit)?;
    println!("Written {:?}", args.output);
    Ok(())
}

fn print_plan(args: &HmpArgs, cli: &Cli) {
    println!("=== Stacked Halo Mass Profile ===");
    println!("Catalog: {:?}", args.catalog);
    println!("Snapshot: {:?}", args.snapshot);
    println!("Radii: {} bins, {:.3} .. {:.3} Mpc/h", args.n_rbins, args.r_min, args.r_max);
    println!("Verbose: {}", cli.verbose);
    println!();
}

fn load_host_halos(args: &HmpArgs) -> anyhow::Result<(Vec<Halo>, f64)> {
    let options = LoadOptions {
        only_hosts: true,
        ..Default::default()
    };
    let catalog = RockstarCatalog::load(&args.catalog, &options)
        .with_context(|| format!("loading catalog {:?}", args.catalog))?;
    let h = catalog
        .header
        .h()
        .context("catalog header carries no Hubble parameter")?;

    let mut halos = catalog.halos(&HaloColumns::with_mass(&args.mass_column))?;
    scale_positions(&mut halos, args.position_scale);
    scale_radii(&mut halos, args.radius_scale);
    println!("{} host halos loaded", halos.len());
    Ok((halos, h))
}

fn select_mass_bin(args: &HmpArgs, halos: &[Halo]) -> anyhow::Result<Vec<Halo>> {
    let edges = log_spaced_edges(args.bin_min, args.bin_max, args.n_mass_bins)?;
    let bins = bin_by_mass(halos, &edges);

    let index = match args.bin {
        Some(index) => index,
        None => prompt_bin(&edges, &bins)?,
    };
    let bin = bins
        .get(index)
        .with_context(|| format!("mass bin {} out of range (0..{})", index, bins.len()))?;
    anyhow::ensure!(!bin.is_empty(), "mass bin {} holds no halos", index);

    println!(
        "Stacking bin {}: {:.3e} .. {:.3e} Msun/h, {} halos",
        index,
        edges[index],
        edges[index + 1],
        bin.len()
    );
    Ok(bin.clone())
}

fn prompt_bin(edges: &[f64], bins: &[Vec<Halo>]) -> anyhow::Result<usize> {
    println!("Available mass bins:");
    for (i, bin) in bins.iter().enumerate() {
        if !bin.is_empty() {
            println!(
                "  [{}] {:.3e} .. {:.3e}  ({} halos)",
                i,
                edges[i],
                edges[i + 1],
                bin.len()
            );
        }
    }
    print!("Select bin: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    line.trim()
        .parse()
        .with_context(|| format!("not a bin index: {:?}", line.trim()))
}

fn load_particles(args: &HmpArgs) -> anyhow::Result<(Vec<Particle>, f64, f64)> {
    let mut snapshot = Snapshot::open(&args.snapshot)
        .with_context(|| format!("opening snapshot {:?}", args.snapshot))?;
    let particle_mass = snapshot
        .header
        .uniform_particle_mass()
        .context("snapshot header carries no particle mass")?
        * args.mass_unit;
    let redshift = snapshot.header.redshift;

    println!("Reading {} particles...", snapshot.header.total_particles());
    let mut particles = snapshot.read_positions()?;
    sort_by_x(&mut particles);
    Ok((particles, particle_mass, redshift))
}

fn stack_bin(
    bin: &[Halo],
    particles: &[Particle],
    rbins: &[f64],
    particle_mass: f64,
    rho_crit: f64,
) -> anyhow::Result<StackedProfile> {
    let pb = create_progress_bar(bin.len() as u64);
    let profiles: Vec<Vec<f64>> = bin
        .par_iter()
        .map(|halo| {
            let distances = sorted_distances(halo, particles);
            let profile = density_profile(&distances, rbins, particle_mass, rho_crit);
            pb.inc(1);
            profile
        })
        .collect();
    pb.finish_and_clear();

    Ok(stack_profiles(rbins, &profiles)?)
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn plot(
    args: &HmpArgs,
    bin: &[Halo],
    stacked: &StackedProfile,
    redshift: f64,
    rho_crit: f64,
) -> anyhow::Result<()> {
    let samples: Vec<(f64, f64, f64)> = stacked
        .radii
        .iter()
        .zip(stacked.mean.iter().zip(&stacked.scatter))
        .map(|(&r, (&mean, &scatter))| (r, mean, scatter))
        .collect();

    let nfw_points = if args.no_nfw {
        Vec::new()
    } else {
        nfw_overlay(bin, stacked, redshift, rho_crit)?
    };
    let overlays: Vec<(&str, &[(f64, f64)])> = if nfw_points.is_empty() {
        Vec::new()
    } else {
        vec![("NFW", nfw_points.as_slice())]
    };

    halo_plot::svg::error_bars_loglog_svg(
        "stacked profile",
        &samples,
        &overlays,
        &args.output,
        &format!("Stacked mass profile ({} halos)", stacked.n_halos),
        "r [Mpc/h]",
        "rho / rho_crit",
    )
    .map_err(|e| anyhow::anyhow!("rendering {:?}: {}", args.output, e))
}

/// NFW expectation for the bin's mean halo, sampled at the profile radii.
///
/// The stacked curve is cumulative mean density over rho_crit, so the
/// model goes through its enclosed mass rather than the local density.
fn nfw_overlay(
    bin: &[Halo],
    stacked: &StackedProfile,
    redshift: f64,
    rho_crit: f64,
) -> anyhow::Result<Vec<(f64, f64)>> {
    let n = bin.len() as f64;
    let mean_mass = bin.iter().map(|h| h.mass).sum::<f64>() / n;
    let mean_rvir = bin.iter().map(|h| h.rvir).sum::<f64>() / n;

    let nfw = nfw_profile(mean_mass, mean_rvir, redshift, Some(&stacked.radii))?;

    Ok(stacked
        .radii
        .iter()
        .map(|&r| {
            let volume = 4.0 / 3.0 * std::f64::consts::PI * r.powi(3);
            (r, nfw.enclosed_mass(r) / volume / rho_crit)
        })
        .collect())
}
