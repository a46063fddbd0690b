// crates/wfcli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wfcore::{ComponentDescriptor, EndpointCharacter, FailureEdgePolicy, WorkflowDescription};
use wfgraph::{validate_nested_loop_configuration, WorkflowGraph};

#[derive(Parser)]
#[command(name = "wfgraph")]
#[command(about = "Workflow graph inspection CLI", long_about = None)]
struct Cli {
    /// Show debug output of the graph engine
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep only the paths of the last edge per output when searching failure paths
    #[arg(long, global = true)]
    last_edge_wins: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the workflow graph in DOT format
    Dot {
        /// Path to workflow description JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the hops a reset signal of a nested loop driver travels
    Reset {
        /// Path to workflow description JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Execution id of the resetting component
        component: String,
    },

    /// Print the hops from a failed component to its loop driver
    Failure {
        /// Path to workflow description JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Execution id of the failed component
        component: String,
    },

    /// Print the loop driver of a component
    Driver {
        /// Path to workflow description JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Execution id of the component
        component: String,
    },

    /// Check nested loop configuration against the graph
    Validate {
        /// Path to workflow description JSON file
        file: PathBuf,
    },

    /// Create an example workflow description with nested loops
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    let policy = if cli.last_edge_wins {
        Some(FailureEdgePolicy::LastEdgeWins)
    } else {
        None
    };

    match cli.command {
        Commands::Dot { file } => {
            let (_, graph) = load_graph(&file, policy)?;
            print!("{}", graph.to_dot());
        }

        Commands::Reset { file, component } => {
            let (_, graph) = load_graph(&file, policy)?;
            let paths = graph.hops_to_traverse_when_resetting(&component)?;
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }

        Commands::Failure { file, component } => {
            let (_, graph) = load_graph(&file, policy)?;
            let paths = graph.hops_to_traverse_on_failure(&component)?;
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }

        Commands::Driver { file, component } => {
            let (_, graph) = load_graph(&file, policy)?;
            match graph.loop_driver(&component)? {
                Some(driver) => println!("{} ({})", driver.execution_id(), driver.name()),
                None => println!("{} is not part of a loop", component),
            }
        }

        Commands::Validate { file } => {
            validate_workflow(&file, policy)?;
        }

        Commands::Init { output } => {
            create_example_workflow(&output)?;
        }
    }

    Ok(())
}

fn load_graph(
    file: &Path,
    policy: Option<FailureEdgePolicy>,
) -> Result<(WorkflowDescription, WorkflowGraph)> {
    let mut description = WorkflowDescription::from_json_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    if let Some(policy) = policy {
        description.settings.failure_edge_policy = policy;
    }

    let graph = WorkflowGraph::from_description(&description)?;
    Ok((description, graph))
}

fn validate_workflow(file: &Path, policy: Option<FailureEdgePolicy>) -> Result<()> {
    println!("Validating workflow: {}", file.display());

    let (description, graph) = load_graph(file, policy)?;
    println!("   Name: {}", description.name);
    println!("   Components: {}", graph.node_count());
    println!("   Connections: {}", graph.edges().len());

    let warnings = validate_nested_loop_configuration(&description, &graph)?;
    if warnings.is_empty() {
        println!("Loop configuration is consistent");
    } else {
        for warning in &warnings {
            println!("   {}", warning);
        }
    }

    Ok(())
}

fn create_example_workflow(output: &Path) -> Result<()> {
    use EndpointCharacter::{OuterLoop, SameLoop};

    let mut workflow = WorkflowDescription::new("Nested optimization");

    let outer = workflow.add_component(
        ComponentDescriptor::new("outer", "Parametric Study")
            .with_input("result", SameLoop)
            .with_output("design", SameLoop)
            .as_driver(),
    );
    let optimizer = workflow.add_component(
        ComponentDescriptor::new("optimizer", "Optimizer")
            .with_input("design", OuterLoop)
            .with_input("f", SameLoop)
            .with_output("x", SameLoop)
            .with_output("optimum", OuterLoop)
            .as_driver()
            .fault_tolerant()
            .nested(),
    );
    let script = workflow.add_component(
        ComponentDescriptor::new("script", "Objective Script")
            .with_input("x", SameLoop)
            .with_output("f", SameLoop),
    );

    workflow.connect(&outer, "design", &optimizer, "design");
    workflow.connect(&optimizer, "x", &script, "x");
    workflow.connect(&script, "f", &optimizer, "f");
    workflow.connect(&optimizer, "optimum", &outer, "result");

    std::fs::write(output, workflow.to_json_pretty()?)?;

    println!("Created example workflow: {}", output.display());
    println!();
    println!("Inspect it with:");
    println!("  wfgraph failure --file {} script", output.display());
    println!("  wfgraph reset --file {} optimizer", output.display());

    Ok(())
}
