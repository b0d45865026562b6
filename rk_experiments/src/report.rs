use std::{
    fmt::Display,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use csv::Writer;
use rk_diffeq::{Real, Trajectory};
use tracing::debug;

use crate::{
    ExperimentErrors,
    convergence::{EndpointRow, ErrorRow},
    problems::Problem,
};

pub fn write_error_table<W: Write>(out: &mut W, title: &str, rows: &[ErrorRow]) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(
        out,
        "{:>12} {:>8} {:>14} {:>14} {:>8}",
        "h", "steps", "max error", "final error", "order"
    )?;
    for row in rows {
        let order = row
            .order
            .map(|p| format!("{p:.3}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>12.6} {:>8} {:>14.6e} {:>14.6e} {:>8}",
            row.step, row.num_steps, row.max_error, row.final_error, order
        )?;
    }
    writeln!(out)
}

pub fn write_endpoint_table<W: Write>(
    out: &mut W,
    title: &str,
    rows: &[EndpointRow],
) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(
        out,
        "{:>6} {:>12} {:>20} {:>12} {:>14} {:>12}",
        "N", "h", "y (f64)", "error", "y (f32)", "error"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:>6} {:>12.6e} {:>20.15} {:>12.4e} {:>14.7} {:>12.4e}",
            row.num_steps, row.step, row.y64, row.error64, row.y32, row.error32
        )?;
    }
    writeln!(out)
}

/// Writes one CSV row per entry: `t` followed by the solution components.
///
/// The time column carried by augmented problems is not repeated.
pub fn write_trajectory_csv<T: Real + Display>(
    path: &Path,
    problem: &Problem,
    trajectory: &Trajectory<T>,
) -> Result<(), ExperimentErrors> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(BufWriter::new(file));

    let mut headers = vec!["t"];
    headers.extend_from_slice(problem.labels());
    writer.write_record(&headers)?;

    let offset = problem.offset();
    for (t, y) in trajectory.iter() {
        let mut record = Vec::with_capacity(y.len() + 1 - offset);
        record.push(t.to_string());
        record.extend(y[offset..].iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = trajectory.len(), "wrote trajectory");
    Ok(())
}
