//! CLI argument definitions for halotool

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "halotool")]
#[command(about = "Halo catalog analysis pipeline")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute halo mass functions from Rockstar catalogs
    Hmf(HmfArgs),

    /// Stack halo mass profiles from a catalog and its snapshot
    Hmp(HmpArgs),

    /// Cross-match halos between two catalogs
    Match(MatchArgs),

    /// Mass error statistics over a match file
    MatchErrors(MatchErrorsArgs),

    /// Assemble a LaTeX report around generated figures
    Report(ReportArgs),
}

#[derive(Parser)]
pub struct HmfArgs {
    /// Rockstar ASCII catalogs, one curve each
    #[arg(required = true)]
    pub catalogs: Vec<PathBuf>,

    /// Mass definition column
    #[arg(long, default_value = "mvir")]
    pub mass_column: String,

    /// Keep host halos only (PID == -1)
    #[arg(long)]
    pub hosts_only: bool,

    /// Number of logarithmic mass bins
    #[arg(long, default_value = "12")]
    pub n_bins: usize,

    /// Plot dn/dlnM/dV instead of dn/dM/dV
    #[arg(long)]
    pub per_lnm: bool,

    /// Output SVG file
    #[arg(long)]
    pub output: PathBuf,

    /// Also dump the binned mass functions as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct HmpArgs {
    /// Rockstar ASCII catalog
    #[arg(long)]
    pub catalog: PathBuf,

    /// Gadget snapshot the catalog was built from
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Mass definition column
    #[arg(long, default_value = "mvir")]
    pub mass_column: String,

    /// Mass bin to stack (prompted interactively when omitted)
    #[arg(long)]
    pub bin: Option<usize>,

    /// Lower edge of the mass binning, Msun/h
    #[arg(long, default_value = "1e10")]
    pub bin_min: f64,

    /// Upper edge of the mass binning, Msun/h
    #[arg(long, default_value = "1e15")]
    pub bin_max: f64,

    /// Number of logarithmic mass bins
    #[arg(long, default_value = "10")]
    pub n_mass_bins: usize,

    /// Innermost profile radius, Mpc/h
    #[arg(long, default_value = "0.02")]
    pub r_min: f64,

    /// Outermost profile radius, Mpc/h
    #[arg(long, default_value = "2.0")]
    pub r_max: f64,

    /// Number of radius samples
    #[arg(long, default_value = "20")]
    pub n_rbins: usize,

    /// Factor applied to catalog positions (catalog unit -> Mpc/h)
    #[arg(long, default_value = "1.0")]
    pub position_scale: f64,

    /// Factor applied to virial radii (Rockstar writes kpc/h)
    #[arg(long, default_value = "1e-3")]
    pub radius_scale: f64,

    /// Snapshot mass unit in Msun/h
    #[arg(long, default_value = "1e10")]
    pub mass_unit: f64,

    /// Skip the NFW overlay
    #[arg(long)]
    pub no_nfw: bool,

    /// Output SVG file
    #[arg(long)]
    pub output: PathBuf,

    /// Also dump the stacked profile as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MatchArgs {
    /// Primary (reference) catalog
    #[arg(long)]
    pub primary: PathBuf,

    /// Secondary catalog to match against
    #[arg(long)]
    pub secondary: PathBuf,

    /// Mass definition column
    #[arg(long, default_value = "mvir")]
    pub mass_column: String,

    /// Keep host halos only (PID == -1)
    #[arg(long)]
    pub hosts_only: bool,

    /// Multiplicative half-width of the mass window
    #[arg(long, default_value = "1.2")]
    pub mass_offset: f64,

    /// Largest accepted center displacement, Mpc/h
    #[arg(long, default_value = "0.5")]
    pub max_displacement: f64,

    /// Output match file
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct MatchErrorsArgs {
    /// Match file written by the match subcommand
    #[arg(long)]
    pub matches: PathBuf,

    /// Primary catalog the match file refers to
    #[arg(long)]
    pub primary: PathBuf,

    /// Mass definition column
    #[arg(long, default_value = "mvir")]
    pub mass_column: String,

    /// Number of logarithmic particle-count bins
    #[arg(long, default_value = "8")]
    pub n_bins: usize,

    /// Output SVG file
    #[arg(long)]
    pub output: PathBuf,

    /// Also dump the binned errors as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Report title
    #[arg(long, default_value = "Halo analysis report")]
    pub title: String,

    /// Figures to embed, in order
    #[arg(required = true)]
    pub figures: Vec<PathBuf>,

    /// Output .tex file
    #[arg(long)]
    pub output: PathBuf,
}
