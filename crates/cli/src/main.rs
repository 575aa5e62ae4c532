//! yardplan CLI

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use yardplan_core::{
    breakeven_occupancy, project_revenue, Layout, OptimizationResult, PlannerConfig,
    SolverBackend,
};
use yardplan_lot::{
    quick_estimate, ComplianceChecker, ComplianceReport, LotBoundary, LotOptimizer,
    OptimizationRequest,
};

#[derive(Parser)]
#[command(name = "yardplan")]
#[command(about = "Parking lot layout optimizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a layout from a request file
    Optimize {
        /// Path to the JSON request
        request: PathBuf,

        /// Output file for the layout (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Site specification with vehicle types, compliance and pricing
        #[arg(long)]
        specs: Option<PathBuf>,

        /// Candidate grid spacing in meters
        #[arg(long)]
        grid: Option<f64>,

        /// Time limit in seconds (overrides the request)
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Use the greedy heuristic instead of the exact solver
        #[arg(long)]
        greedy: bool,
    },

    /// Check a layout file against the compliance rules
    Check {
        /// Path to the layout (JSON)
        layout: PathBuf,

        /// Site specification with vehicle types and compliance rules
        #[arg(long)]
        specs: Option<PathBuf>,
    },

    /// Estimate capacity from the lot area alone
    Estimate {
        /// Path to the JSON request
        request: PathBuf,
    },

    /// Project revenue of a layout file
    Revenue {
        /// Path to the layout (JSON)
        layout: PathBuf,

        /// Occupancy rate between 0 and 1
        #[arg(long, default_value = "0.75")]
        occupancy: f64,

        /// Site specification with vehicle types and pricing
        #[arg(long)]
        specs: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            request,
            output,
            specs,
            grid,
            time_limit,
            greedy,
        } => {
            let mut config = load_config(specs.as_deref())?;
            if let Some(spacing) = grid {
                config = config.with_grid_spacing(spacing);
            }
            if greedy {
                config = config.with_backend(SolverBackend::Greedy);
            }

            let mut request = load_request(&request)?;
            if let Some(seconds) = time_limit {
                request = request.with_time_limit(seconds);
            }

            println!("Optimizing: {}", request.name);
            let result = LotOptimizer::new(config.clone()).optimize(&request)?;
            print_result(&result);

            if result.is_success() {
                let report =
                    ComplianceChecker::new(&config.catalog, &config.compliance).check(&result.layout);
                print_report(&report);
            }

            if let Some(path) = output {
                fs::write(&path, result.layout.to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Layout saved to: {}", path.display());
            }
        }

        Commands::Check { layout, specs } => {
            let config = load_config(specs.as_deref())?;
            let layout = load_layout(&layout)?;

            println!("Checking: {} ({} spaces)", layout.name, layout.spaces.len());
            let report = ComplianceChecker::new(&config.catalog, &config.compliance).check(&layout);
            print_report(&report);
        }

        Commands::Estimate { request } => {
            let request = load_request(&request)?;
            let boundary = LotBoundary::new(request.boundary.clone())?;
            let estimate = quick_estimate(&boundary, request.lane_type);

            println!("\nQuick estimate ({} lane)", request.lane_type.as_str());
            println!("{:-<50}", "");
            println!("  Total area:          {:>10.1} m2", estimate.total_area);
            println!(
                "  Parking area:        {:>10.1} m2",
                estimate.estimated_parking_area
            );
            println!("  Max truck spaces:    {:>10}", estimate.max_truck_spaces);
            println!("  Max tractor spaces:  {:>10}", estimate.max_tractor_spaces);
            println!(
                "  Annual revenue:      {:>10.2}",
                estimate.estimated_annual_revenue
            );
            println!(
                "  Efficiency factor:   {:>10.0}%",
                estimate.efficiency_factor * 100.0
            );
        }

        Commands::Revenue {
            layout,
            occupancy,
            specs,
        } => {
            anyhow::ensure!(
                (0.0..=1.0).contains(&occupancy),
                "occupancy must be between 0 and 1, got {}",
                occupancy
            );
            let config = load_config(specs.as_deref())?;
            let layout = load_layout(&layout)?;
            let projection = project_revenue(&layout, &config.catalog, &config.pricing, occupancy);

            println!("\nRevenue: {} at {:.0}% occupancy", layout.name, occupancy * 100.0);
            println!("{:-<50}", "");
            println!("  Daily:    {:>12.2}", projection.daily);
            println!("  Weekly:   {:>12.2}", projection.weekly);
            println!("  Monthly:  {:>12.2}", projection.monthly);
            println!("  Annual:   {:>12.2}", projection.annual);
            for (space_type, annual) in &projection.breakdown_by_type {
                println!("    {:<10} {:>12.2}", space_type, annual);
            }
            println!(
                "  Target:   {:>12.2} ({:.1}%, {})",
                projection.target,
                projection.target_percentage,
                projection.status()
            );
            println!(
                "  Breakeven occupancy: {:.1}%",
                breakeven_occupancy(&layout, &config.catalog, &config.pricing) * 100.0
            );
        }
    }

    Ok(())
}

fn load_config(specs: Option<&Path>) -> anyhow::Result<PlannerConfig> {
    match specs {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(PlannerConfig::from_specs_json(&json)?)
        }
        None => Ok(PlannerConfig::default()),
    }
}

fn load_request(path: &Path) -> anyhow::Result<OptimizationRequest> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(OptimizationRequest::from_json(&json)?)
}

fn load_layout(path: &Path) -> anyhow::Result<Layout> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Layout::from_json(&json)?)
}

fn print_result(result: &OptimizationResult) {
    let stats = &result.stats;
    println!("\n{:=<60}", "");
    println!("OPTIMIZATION RESULT");
    println!("{:=<60}", "");
    println!("  Status:       {}", result.status);
    println!("  Solve time:   {:.2}s", result.solve_time);
    println!("  Candidates:   {}", stats.candidate_count);
    println!("  Conflicts:    {}", stats.conflict_count);
    println!("  Spaces:       {}", stats.selected_count);
    for (space_type, count) in &stats.space_counts {
        println!("    {:<10} {}", space_type, count);
    }
    println!("  Revenue:      {:.2}", stats.total_revenue);
    println!(
        "  Areas:        lot {:.0}, lanes {:.0}, parking {:.0}",
        stats.lot_area, stats.lane_area, stats.parking_area
    );
    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
    println!("{:=<60}", "");
}

fn print_report(report: &ComplianceReport) {
    println!("\nCompliance: {}", report.status());
    println!(
        "  {} errors, {} warnings",
        report.error_count, report.warning_count
    );
    for violation in &report.violations {
        println!("  [{:?}] {}", violation.severity, violation.message);
    }
}
