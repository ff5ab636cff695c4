//! Minimal embedding example: load two mesh files, measure the distance
//! between them, and print the report.
//!
//! Usage: compare <model1> <model2> [sampling step, % of bbox diagonal]
//!
//! Set RUST_LOG=info to watch the progress of the distance passes.

use meshdist::{compare, read_model_file, CompareOptions, Mesh};

fn main() -> meshdist::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <model1> <model2> [step%]", args[0]);
        std::process::exit(1);
    }
    let m1 = load(&args[1])?;
    let m2 = load(&args[2])?;
    let step_pct: f64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.5);

    let result = compare(
        &m1,
        &m2,
        &CompareOptions {
            sampling_step: step_pct / 100.0,
            symmetric: true,
            ..CompareOptions::default()
        },
    )?;

    let mut out = std::io::stdout().lock();
    meshdist::report::write_report(&mut out, &m1, &m2, &result).expect("write report");
    Ok(())
}

/// Loads a model, concatenating multi-mesh (VRML) inputs into one.
fn load(path: &str) -> meshdist::Result<Mesh> {
    let mut meshes = read_model_file(path, None, true)?;
    Ok(meshes.remove(0))
}
