use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "atomic-value workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lock-free vs guarded benchmarks and write a report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Run the loom model tests for the reentrant lock
    Loom,
}

const BENCHES: &[&str] = &["atomic_value_benchmark", "cas_benchmark"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Loom => run_loom()?,
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    for bench in BENCHES {
        println!("\n>>> Running {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.arg("bench").arg("--bench").arg(bench);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.arg("--measurement-time").arg("0.5");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn cargo bench for {bench}"))?;
        if !status.success() {
            anyhow::bail!("benchmark {bench} failed with {status}");
        }
        println!("Finished {} in {:.2?}", bench, start.elapsed());
    }
    Ok(())
}

fn run_loom() -> Result<()> {
    let status = Command::new("cargo")
        .env("RUSTFLAGS", "--cfg loom")
        .args(["test", "--release", "--lib", "loom_"])
        .status()
        .context("failed to spawn cargo test under loom")?;
    if !status.success() {
        anyhow::bail!("loom model tests failed with {status}");
    }
    Ok(())
}

/// group -> benchmark -> ops/s
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("failed to create {}", report_path.display()))?;

    writeln!(file, "# atomic-value Benchmark Report")?;
    for (group, benches) in &results {
        writeln!(file, "\n## {group}\n")?;
        writeln!(file, "| Benchmark | Ops/s |")?;
        writeln!(file, "|---|---|")?;
        for (name, ops) in benches {
            writeln!(file, "| {} | {} |", name, format_ops(*ops))?;
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

/// Walks `target/criterion/<group>/<bench>/new/` for `benchmark.json` and
/// `estimates.json`.
fn collect_results(dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("benchmark.json") {
            continue;
        }
        let Some(run_dir) = path.parent() else { continue };
        if run_dir.file_name().and_then(|s| s.to_str()) != Some("new") {
            continue;
        }

        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)
            .with_context(|| format!("malformed {}", path.display()))?;
        let estimates_path = run_dir.join("estimates.json");
        let estimates: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(&estimates_path)
                .with_context(|| format!("missing {}", estimates_path.display()))?,
        )
        .with_context(|| format!("malformed {}", estimates_path.display()))?;

        let group = meta.get("group_id").and_then(|v| v.as_str()).unwrap_or("ungrouped");
        let name = meta.get("function_id").and_then(|v| v.as_str()).unwrap_or("unnamed");
        let elements = meta
            .get("throughput")
            .and_then(|t| t.get("Elements"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0);
        let time_ns = estimates
            .get("mean")
            .and_then(|m| m.get("point_estimate"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);

        if time_ns > 0.0 {
            results
                .entry(group.to_string())
                .or_default()
                .insert(name.to_string(), elements * 1e9 / time_ns);
        }
    }
    Ok(())
}
