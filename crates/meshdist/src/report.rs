//! Textual and JSON reports of a comparison.
//!
//! The text layout follows the reference tool: a model-information block,
//! one distance table per direction (values absolute and as a percentage
//! of the model 2 bounding-box diagonal), the symmetric table, and the
//! sampling and grid summaries.

use std::io::{self, Write};

use meshdist_model::Mesh;

use crate::driver::Comparison;

/// Writes the full text report for a finished comparison.
pub fn write_report<W: Write>(
    out: &mut W,
    m1: &Mesh,
    m2: &Mesh,
    cmp: &Comparison,
) -> io::Result<()> {
    let bbox1 = m1.bbox_diagonal();
    let bbox2 = m2.bbox_diagonal();
    let fwd = &cmp.forward;

    writeln!(out)?;
    writeln!(out, "                      Model information\n")?;
    writeln!(
        out,
        "Number of vertices:     \t{:>11}\t{:>11}",
        m1.num_vertices(),
        m2.num_vertices()
    )?;
    writeln!(
        out,
        "Number of triangles:    \t{:>11}\t{:>11}",
        m1.num_faces(),
        m2.num_faces()
    )?;
    writeln!(
        out,
        "BoundingBox diagonal:   \t{:>11}\t{:>11}",
        fmt_g(bbox1),
        fmt_g(bbox2)
    )?;
    writeln!(
        out,
        "Surface area:           \t{:>11}\t{:>11}",
        fmt_g(fwd.m1_area),
        fmt_g(fwd.m2_area)
    )?;

    writeln!(out, "\n       Distance from model 1 to model 2\n")?;
    write_dist_table(
        out,
        bbox2,
        [fwd.min_dist, fwd.max_dist, fwd.mean_dist, fwd.rms_dist],
    )?;

    if let Some(rev) = &cmp.backward {
        writeln!(out, "       Distance from model 2 to model 1\n")?;
        write_dist_table(
            out,
            bbox2,
            [rev.min_dist, rev.max_dist, rev.mean_dist, rev.rms_dist],
        )?;
    }
    if let Some(sym) = &cmp.symmetric {
        writeln!(out, "       Symmetric distance between model 1 and model 2\n")?;
        write_dist_table(
            out,
            bbox2,
            [sym.min_dist, sym.max_dist, sym.mean_dist, sym.rms_dist],
        )?;
    }

    writeln!(out, "               \t       Absolute\t   % BBox diag model 2")?;
    writeln!(
        out,
        "Sampling step: \t{:>15}\t{:>22}",
        fmt_g(cmp.abs_sampling_step),
        fmt_g(cmp.abs_sampling_step / bbox2 * 100.0)
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Samples (1 to 2):\t{:>9}\t{:.2} avg / triangle",
        fwd.m1_samples,
        fwd.m1_samples as f64 / m1.num_faces() as f64
    )?;
    if let Some(rev) = &cmp.backward {
        writeln!(
            out,
            "Samples (2 to 1):\t{:>9}\t{:.2} avg / triangle",
            rev.m1_samples,
            rev.m1_samples as f64 / m2.num_faces() as f64
        )?;
    }
    writeln!(out)?;
    writeln!(out, "                       \t     X\t    Y\t   Z\t   Total")?;
    writeln!(
        out,
        "Partitioning grid size:\t{:>6}\t{:>5}\t{:>4}\t{:>8}",
        fwd.grid_sz.x,
        fwd.grid_sz.y,
        fwd.grid_sz.z,
        fwd.grid_sz.total()
    )?;
    if let Some(rev) = &cmp.backward {
        writeln!(
            out,
            "Grid size (2 to 1):    \t{:>6}\t{:>5}\t{:>4}\t{:>8}",
            rev.grid_sz.x,
            rev.grid_sz.y,
            rev.grid_sz.z,
            rev.grid_sz.total()
        )?;
    }
    writeln!(out)
}

fn write_dist_table<W: Write>(out: &mut W, bbox2: f64, values: [f64; 4]) -> io::Result<()> {
    writeln!(out, "        \t   Absolute\t% BBox diag")?;
    writeln!(out, "        \t           \t  (Model 2)")?;
    let labels = ["Min:    ", "Max:    ", "Mean:   ", "RMS:    "];
    for (label, v) in labels.iter().zip(values) {
        writeln!(
            out,
            "{label}\t{:>11}\t{:>11}",
            fmt_g(v),
            fmt_g(v / bbox2 * 100.0)
        )?;
    }
    writeln!(out)
}

/// Serializes the comparison to pretty-printed JSON.
pub fn to_json(cmp: &Comparison) -> serde_json::Result<String> {
    serde_json::to_string_pretty(cmp)
}

/// Shortest-form float formatting with up to 6 significant digits, in the
/// manner of printf "%g".
fn fmt_g(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return format!("{v}");
    }
    let exp = v.abs().log10().floor() as i32;
    if !(-4..6).contains(&exp) {
        let mantissa = v / 10f64.powi(exp);
        let s = trim_zeros(&format!("{mantissa:.5}"));
        format!("{s}e{exp:+03}")
    } else {
        let prec = (5 - exp).max(0) as usize;
        trim_zeros(&format!("{v:.prec$}"))
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}
