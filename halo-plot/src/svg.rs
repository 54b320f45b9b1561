//! SVG chart rendering.
//!
//! Flat helpers over plotters' `SVGBackend`. The log-log variants drop
//! non-positive samples before ranging, since a log axis cannot carry
//! them; a series that loses every point is skipped rather than
//! rendered empty.

use plotters::prelude::*;
use std::path::Path;

use crate::colors;

type PlotResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// A labelled data series.
pub type Series<'a> = (&'a str, &'a [(f64, f64)]);

/// Draws one or more series as lines on log-log axes.
pub fn lines_loglog_svg(
    series: &[Series<'_>],
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
) -> PlotResult {
    let cleaned: Vec<(&str, Vec<(f64, f64)>)> = series
        .iter()
        .map(|&(label, points)| (label, positive_points(points)))
        .filter(|(_, points)| !points.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Ok(());
    }

    let all: Vec<(f64, f64)> = cleaned.iter().flat_map(|(_, p)| p.iter().copied()).collect();
    let (x_range, y_range) = log_padded_ranges(&all);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_range.0..x_range.1).log_scale(),
            (y_range.0..y_range.1).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    for (i, (label, points)) in cleaned.iter().enumerate() {
        let color = colors::primary(i);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Draws samples with vertical error bars on log-log axes, plus overlay
/// line series (reference models and the like).
///
/// Each sample is `(x, y, err)`; the bar spans `y − err` to `y + err`,
/// floored to the positive range the log axis demands.
pub fn error_bars_loglog_svg(
    label: &str,
    samples: &[(f64, f64, f64)],
    overlays: &[Series<'_>],
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
) -> PlotResult {
    let cleaned: Vec<(f64, f64, f64)> = samples
        .iter()
        .copied()
        .filter(|&(x, y, _)| x > 0.0 && y > 0.0)
        .collect();
    if cleaned.is_empty() {
        return Ok(());
    }

    let mut all: Vec<(f64, f64)> = cleaned.iter().map(|&(x, y, _)| (x, y)).collect();
    for &(_, points) in overlays {
        all.extend(positive_points(points));
    }
    let (x_range, y_range) = log_padded_ranges(&all);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_range.0..x_range.1).log_scale(),
            (y_range.0..y_range.1).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    let color = colors::primary(0);
    chart
        .draw_series(cleaned.iter().map(|&(x, y, err)| {
            let lo = (y - err).max(y_range.0);
            let hi = (y + err).min(y_range.1);
            ErrorBar::new_vertical(x, lo, y, hi, color.filled(), 6)
        }))?
        .label(label)
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));

    for (i, &(overlay_label, points)) in overlays.iter().enumerate() {
        let positive = positive_points(points);
        if positive.is_empty() {
            continue;
        }
        let color = colors::shadow(i + 1);
        chart
            .draw_series(LineSeries::new(positive, color.stroke_width(2)))?
            .label(overlay_label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Scatters points with a logarithmic x axis and a linear y axis, with a
/// horizontal zero line. Suits signed quantities against a count.
pub fn scatter_logx_svg(
    points: &[(f64, f64)],
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
) -> PlotResult {
    let cleaned: Vec<(f64, f64)> = points.iter().copied().filter(|&(x, _)| x > 0.0).collect();
    if cleaned.is_empty() {
        return Ok(());
    }

    let (x_min, x_max) = extent(cleaned.iter().map(|p| p.0));
    let (mut y_min, mut y_max) = extent(cleaned.iter().map(|p| p.1));
    let y_pad = (y_max - y_min).abs() * 0.1 + 1e-6;
    y_min -= y_pad;
    y_max += y_pad;
    let x_range = (x_min / 1.5, x_max * 1.5);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_range.0..x_range.1).log_scale(), y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_range.0, 0.0), (x_range.1, 0.0)],
        BLACK.mix(0.3).stroke_width(1),
    )))?;
    chart.draw_series(
        cleaned
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, colors::primary(0).filled())),
    )?;
    root.present()?;
    Ok(())
}

fn positive_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .copied()
        .filter(|&(x, y)| x > 0.0 && y > 0.0)
        .collect()
}

fn log_padded_ranges(points: &[(f64, f64)]) -> ((f64, f64), (f64, f64)) {
    let (x_min, x_max) = extent(points.iter().map(|p| p.0));
    let (y_min, y_max) = extent(points.iter().map(|p| p.1));
    // Multiplicative padding keeps the margin even on log axes.
    ((x_min / 1.5, x_max * 1.5), (y_min / 1.5, y_max * 1.5))
}

fn extent(iter: impl Iterator<Item = f64>) -> (f64, f64) {
    iter.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_lines_loglog_writes_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hmf.svg");
        let points = [(1.0e10, 1.0e-3), (1.0e11, 1.0e-4), (1.0e12, 1.0e-5)];
        lines_loglog_svg(&[("hmf", &points)], &path, "Mass function", "M", "dn/dM/dV").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("Mass function"));
    }

    #[test]
    fn test_lines_loglog_skips_nonpositive_series() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.svg");
        let points = [(1.0, 0.0), (2.0, -1.0)];
        lines_loglog_svg(&[("dead", &points)], &path, "t", "x", "y").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_error_bars_with_overlay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.svg");
        let samples = [(0.1, 5.0e3, 1.0e3), (0.3, 8.0e2, 2.0e2), (0.9, 6.0e1, 3.0e1)];
        let nfw = [(0.1, 4.5e3), (0.3, 9.0e2), (0.9, 5.0e1)];
        error_bars_loglog_svg(
            "stacked",
            &samples,
            &[("NFW", &nfw)],
            &path,
            "Profile",
            "r",
            "rho/rho_crit",
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_scatter_logx_accepts_negative_y() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.svg");
        let points = [(100.0, -0.1), (1000.0, 0.05), (10000.0, 0.0)];
        scatter_logx_svg(&points, &path, "Mass errors", "num_p", "dm/m").unwrap();
        assert!(path.exists());
    }
}
