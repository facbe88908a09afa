//! Benchmark Heatmap Analysis Tool
//!
//! Compares treatment and baseline benchmark results for one metric (or all
//! metrics found in the treatment data) and exports heatmap matrices plus
//! metadata for plotting.
//!
//! # Usage
//!
//! ```bash
//! # Compare qps between the default sources
//! cargo run --release --bin analyze_heatmaps -- qps
//!
//! # Explicit sources, free-text logs
//! cargo run --release --bin analyze_heatmaps -- qps \
//!     --treatment log-cata.txt --baseline log-nocata.txt --format log
//!
//! # Everything the treatment data carries
//! cargo run --release --bin analyze_heatmaps -- --all
//!
//! # From a TOML config
//! cargo run --release --bin analyze_heatmaps -- --config analysis.toml
//! ```

use bench_heatmap::{
    load_report, AnalysisConfig, Analyzer, BatchAnalyzer, BatchConfig, ErrorMode, ExportConfig,
    HeatmapExporter, MetricAnalysis, MetricDirection, SourceConfig, SourceFormat,
};
use std::process;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_usage(&args[0]);
        }
        "--generate-config" => {
            if args.len() < 3 {
                eprintln!("Error: --generate-config requires a path argument");
                process::exit(1);
            }
            generate_sample_config(&args[2]);
        }
        "--config" => {
            if args.len() < 3 {
                eprintln!("Error: --config requires a path argument");
                process::exit(1);
            }
            let config = match AnalysisConfig::load_toml(&args[2]) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: failed to load {}: {e}", args[2]);
                    process::exit(1);
                }
            };
            run(config, false);
        }
        _ => {
            let (config, all_metrics) = parse_args(&args);
            run(config, all_metrics);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Benchmark Heatmap Analysis Tool

Usage:
    {program} <metric> [options]         Analyze one metric
    {program} --all [options]            Analyze every metric in the treatment data
    {program} --config <path.toml>       Run from a config file
    {program} --generate-config <path>   Write a sample config file
    {program} --help                     Show this help

Options:
    --treatment <path>    Treatment results (default: execution-logs/treatment.json)
    --baseline <path>     Baseline results (default: execution-logs/baseline.json)
    --no-baseline         Skip the comparison, raw matrix only
    --format <json|log>   Source format for both sides (default: json)
    --output-dir <dir>    Export directory (default: heatmaps)
    --fill-zero           Export undefined cells as 0 instead of NaN

Available metrics include:
    qps, elapsed_secs, avg_dists_computed, avg_nodes_visited,
    catapult_usage_pct, avg_catapults_added
"#
    );
}

fn parse_args(args: &[String]) -> (AnalysisConfig, bool) {
    let mut config = AnalysisConfig::default().with_export(ExportConfig::new("heatmaps"));
    let mut all_metrics = false;
    let mut format = SourceFormat::Json;
    let mut treatment_path: Option<String> = None;
    let mut baseline_path: Option<String> = None;
    let mut no_baseline = false;
    let mut fill_zero = false;

    match args[1].as_str() {
        "--all" => all_metrics = true,
        metric => config.metric = metric.to_string(),
    }

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--treatment" => {
                treatment_path = Some(require_value(args, i, "--treatment"));
                i += 2;
            }
            "--baseline" => {
                baseline_path = Some(require_value(args, i, "--baseline"));
                i += 2;
            }
            "--no-baseline" => {
                no_baseline = true;
                i += 1;
            }
            "--format" => {
                format = match require_value(args, i, "--format").as_str() {
                    "json" => SourceFormat::Json,
                    "log" => SourceFormat::Log,
                    other => {
                        eprintln!("Error: unknown format '{other}' (expected json or log)");
                        process::exit(1);
                    }
                };
                i += 2;
            }
            "--output-dir" => {
                config.export = Some(ExportConfig::new(require_value(args, i, "--output-dir")));
                i += 2;
            }
            "--fill-zero" => {
                fill_zero = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    if let Some(path) = treatment_path {
        config.treatment = SourceConfig {
            path: path.into(),
            format,
            label: "treatment".to_string(),
        };
    } else {
        config.treatment.format = format;
    }

    if no_baseline {
        config.baseline = None;
    } else if let Some(path) = baseline_path {
        config.baseline = Some(SourceConfig {
            path: path.into(),
            format,
            label: "baseline".to_string(),
        });
    } else if let Some(baseline) = &mut config.baseline {
        baseline.format = format;
    }

    if fill_zero {
        if let Some(export) = &mut config.export {
            export.fill_undefined = Some(0.0);
        }
    }

    (config, all_metrics)
}

fn require_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {flag} requires a value");
            process::exit(1);
        }
    }
}

fn generate_sample_config(path: &str) {
    let config = AnalysisConfig::default().with_export(ExportConfig::new("heatmaps"));
    if let Err(e) = config.save_toml(path) {
        eprintln!("Error: failed to write {path}: {e}");
        process::exit(1);
    }
    println!("Sample config written to {path}");
}

fn run(config: AnalysisConfig, all_metrics: bool) {
    let analyses = if all_metrics {
        let treatment = match load_report(&config.treatment) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
        let metrics: Vec<String> = treatment.metric_names().into_iter().collect();
        if metrics.is_empty() {
            eprintln!("Error: no metrics found in treatment data");
            process::exit(1);
        }
        println!("Analyzing {} metrics: {}", metrics.len(), metrics.join(", "));

        let batch = match BatchAnalyzer::new(
            config.clone(),
            BatchConfig::new().with_error_mode(ErrorMode::CollectErrors),
        ) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
        let output = match batch.analyze_metrics(&metrics) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
        for err in &output.errors {
            eprintln!("Warning: metric '{}' failed: {}", err.metric, err.error);
        }
        if output.successful_count() == 0 {
            eprintln!("Error: no metric could be analyzed");
            process::exit(1);
        }
        output.analyses
    } else {
        let analyzer = match Analyzer::from_config(config.clone()) {
            Ok(analyzer) => analyzer,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
        match analyzer.run() {
            Ok(analysis) => vec![analysis],
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    };

    for analysis in &analyses {
        print_summary(analysis);
    }

    if let Some(export_config) = &config.export {
        let mut exporter = HeatmapExporter::new(&export_config.output_dir);
        if let Some(fill) = export_config.fill_undefined {
            exporter = exporter.with_fill_undefined(fill);
        }
        for analysis in &analyses {
            match exporter.export(analysis) {
                Ok(paths) => println!("Saved: {}", paths.metadata.display()),
                Err(e) => {
                    eprintln!("Error: export of '{}' failed: {e}", analysis.metric);
                    process::exit(1);
                }
            }
        }
    }

    println!("Done!");
}

fn print_summary(analysis: &MetricAnalysis) {
    println!("═══════════════════════════════════════════════════════════════");
    println!("Metric: {} ({})", analysis.metric, analysis.direction);
    println!("═══════════════════════════════════════════════════════════════");
    println!(
        "  {} runs: {}",
        analysis.treatment_label, analysis.treatment_runs
    );
    if let Some(label) = &analysis.baseline_label {
        println!("  {label} runs: {}", analysis.baseline_runs);
    }

    let best = match analysis.direction {
        MetricDirection::HigherIsBetter => analysis.raw.max_cell(),
        MetricDirection::LowerIsBetter => analysis.raw.min_cell(),
    };
    if let Some((key, value)) = best {
        println!("  Best {} cell: {key} -> {value:.2}", analysis.treatment_label);
    }

    match &analysis.improvement {
        Some(improvement) => {
            if let Some(mean) = improvement.mean() {
                println!("  Improvement mean: {mean:+.2}%");
            }
            if let Some((key, pct)) = improvement.max_cell() {
                println!("  Improvement best: {pct:+.2}% at {key}");
            }
            if let Some((key, pct)) = improvement.min_cell() {
                println!("  Improvement worst: {pct:+.2}% at {key}");
            }
        }
        None => println!("  No comparison data; raw matrix only"),
    }

    if !analysis.diagnostics.is_clean() {
        println!("  Skips: {}", analysis.diagnostics.len());
    }
}
