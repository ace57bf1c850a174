/// Graph Linter — reports authoring problems in dialogue graphs.
///
/// Usage: graph_linter <graph.ron | graph_dir> [--strict]
///
/// Exits non-zero when any graph fails to load or has lint errors. With
/// `--strict`, warnings fail the run too.

use dialogue_graph::schema::graph::{Graph, GraphIssue};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: graph_linter <graph.ron | graph_dir> [--strict]");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let strict = args[2..].iter().any(|a| a == "--strict");

    let files = if target.is_file() {
        vec![target.to_path_buf()]
    } else if target.is_dir() {
        let mut files = Vec::new();
        collect_ron_files(target, &mut files);
        files.sort();
        files
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    };

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let graph = match Graph::load_from_ron(file) {
            Ok(g) => g,
            Err(e) => {
                // Non-graph RON (e.g. session configs) is reported, not fatal
                println!("SKIP: {}: {}", file.display(), e);
                continue;
            }
        };

        let issues = graph.lint();
        let (errors, warnings): (Vec<&GraphIssue>, Vec<&GraphIssue>) =
            issues.iter().partition(|i| i.is_error());

        println!("\n=== {} ({} nodes) ===", file.display(), graph.len());
        if issues.is_empty() {
            println!("All checks passed!");
        }
        for warning in &warnings {
            println!("WARNING: {}", warning);
        }
        for error in &errors {
            println!("ERROR: {}", error);
        }

        total_errors += errors.len();
        total_warnings += warnings.len();
    }

    println!(
        "\nSummary: {} files, {} errors, {} warnings",
        files.len(),
        total_errors,
        total_warnings
    );

    if total_errors > 0 || (strict && total_warnings > 0) {
        process::exit(1);
    }
}

fn collect_ron_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_ron_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("ron") {
            out.push(path);
        }
    }
}
