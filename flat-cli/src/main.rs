use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flat_diagnostics::DiagnosticEngine;
use flat_engine::report::{
    engine_error_diagnostic, graph_error_diagnostic, plan_diagnostics, violation_diagnostics,
};
use flat_engine::{
    analyze_batch, apply_plan, collect_metrics, Analyzer, EngineConfig, RewritePlan, Rewriter,
};
use flat_graph::{GraphDocument, TypeGraph};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "flat")]
#[command(version = "0.2.0")]
#[command(about = "Embedding-depth analyzer and flattening refactorer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report types whose embedding chains are too deep
    Analyze {
        /// Graph documents (JSON)
        #[arg(value_name = "GRAPH", required = true)]
        graphs: Vec<PathBuf>,

        /// Longest chain allowed (overrides flatten.json)
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Configuration file (default: flatten.json next to the first graph)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a rewrite plan that flattens every violation
    Plan {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,

        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Pick the earliest-declared path for ambiguous members
        #[arg(long)]
        auto_resolve: bool,

        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Write the plan here instead of stdout
        #[arg(short, long, value_name = "PLAN")]
        output: Option<PathBuf>,
    },

    /// Apply a stored plan and write the rewritten graph
    Apply {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,

        #[arg(value_name = "PLAN")]
        plan: PathBuf,

        /// Write the graph here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Print design metrics for a graph
    Metrics {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,

        /// Threshold for the over-limit count
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print an example flatten.json
    Config,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            graphs,
            max_depth,
            config,
            json,
        } => {
            let first = graphs.first().map(PathBuf::as_path);
            let config = load_config(config.as_deref(), first, max_depth, false)?;
            let mut engine = DiagnosticEngine::new();

            let mut loaded = Vec::new();
            for path in &graphs {
                log::info!("Loading: {:?}", path);
                if let Some(graph) = load_graph(path, &mut engine)? {
                    loaded.push(graph);
                }
            }

            let results = analyze_batch(&loaded, &config);
            for (graph, violations) in loaded.iter().zip(&results) {
                engine.emit_all(violation_diagnostics(graph, violations));
            }

            if json {
                println!("{}", engine.to_json()?);
            } else {
                engine.print_all();
                engine.print_summary();
                if !engine.has_diagnostics() {
                    println!("✅ {} graph(s) within depth {}", loaded.len(), config.max_depth);
                }
            }

            if engine.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Plan {
            graph,
            max_depth,
            auto_resolve,
            config,
            output,
        } => {
            let config = load_config(
                config.as_deref(),
                Some(graph.as_path()),
                max_depth,
                auto_resolve,
            )?;
            let mut engine = DiagnosticEngine::new();
            let Some(type_graph) = load_graph(&graph, &mut engine)? else {
                engine.print_all();
                anyhow::bail!("cannot plan {:?}", graph);
            };

            let violations = Analyzer::new(&config).analyze(&type_graph);
            let plan = match Rewriter::new(config).plan(&type_graph, &violations) {
                Ok(plan) => plan,
                Err(e) => {
                    engine.emit(engine_error_diagnostic(&e, &type_graph.type_names()));
                    engine.print_all();
                    anyhow::bail!(e);
                }
            };

            engine.emit_all(plan_diagnostics(&plan));
            engine.print_all();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&plan)?)?;
            Ok(())
        }
        Commands::Apply {
            graph,
            plan,
            output,
        } => {
            let mut engine = DiagnosticEngine::new();
            let Some(type_graph) = load_graph(&graph, &mut engine)? else {
                engine.print_all();
                anyhow::bail!("cannot apply to {:?}", graph);
            };

            let source = std::fs::read_to_string(&plan)
                .with_context(|| format!("reading plan {:?}", plan))?;
            let rewrite: RewritePlan = serde_json::from_str(&source)
                .with_context(|| format!("parsing plan {:?}", plan))?;
            if rewrite.requires_manual_resolution() {
                log::warn!(
                    "{} member(s) still need manual resolution",
                    rewrite.manual.len()
                );
            }

            match apply_plan(&type_graph, &rewrite) {
                Ok(rewritten) => {
                    let document = rewritten.to_document();
                    write_output(output.as_deref(), &document.to_json_pretty()?)?;
                    Ok(())
                }
                Err(e) => {
                    engine.emit(engine_error_diagnostic(&e, &type_graph.type_names()));
                    engine.print_all();
                    anyhow::bail!(e)
                }
            }
        }
        Commands::Metrics {
            graph,
            max_depth,
            json,
        } => {
            let config = load_config(None, Some(graph.as_path()), max_depth, false)?;
            let mut engine = DiagnosticEngine::new();
            let Some(type_graph) = load_graph(&graph, &mut engine)? else {
                engine.print_all();
                anyhow::bail!("cannot measure {:?}", graph);
            };

            let report = collect_metrics(&type_graph, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
            Ok(())
        }
        Commands::Config => {
            println!("{}", EngineConfig::example()?);
            Ok(())
        }
    }
}

/// Read a graph document. Construction errors become diagnostics and yield `None`.
fn load_graph(path: &Path, engine: &mut DiagnosticEngine) -> Result<Option<TypeGraph>> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading graph {:?}", path))?;
    let document =
        GraphDocument::from_json(&source).with_context(|| format!("parsing graph {:?}", path))?;

    match TypeGraph::from_document(&document) {
        Ok(graph) => Ok(Some(graph)),
        Err(e) => {
            let known: Vec<&str> = document.types.iter().map(|t| t.name.as_str()).collect();
            engine.emit(graph_error_diagnostic(&e, &known));
            Ok(None)
        }
    }
}

/// Explicit file, else flatten.json searched upward from the graph; flags win
fn load_config(
    explicit: Option<&Path>,
    graph: Option<&Path>,
    max_depth: Option<usize>,
    auto_resolve: bool,
) -> Result<EngineConfig> {
    let mut config = match (explicit, graph) {
        (Some(path), _) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {:?}", path))?,
        (None, Some(graph)) => {
            EngineConfig::from_dir(graph.parent().unwrap_or(Path::new(".")))?
        }
        (None, None) => EngineConfig::default(),
    };

    if let Some(depth) = max_depth {
        config.max_depth = depth;
    }
    if auto_resolve {
        config.auto_resolve_ambiguity = true;
    }
    log::debug!("config: {:?}", config);
    Ok(config)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {:?}", path))?;
            log::info!("Wrote {:?}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}
