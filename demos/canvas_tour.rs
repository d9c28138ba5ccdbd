//! Canvas tour: building, serializing, and reconciling a workflow.
//!
//! This walkthrough exercises the whole engine without a backend: it builds
//! a small canvas, serializes it into the execution document the backend
//! receives, folds a simulated result set back into the graph, and reloads
//! the document the way a saved workflow comes back.
//!
//! What You'll Learn:
//! 1. Graph Building: placing blocks and connecting them
//! 2. Serialization: how edges become per-block input bindings
//! 3. Reconciliation: merging per-node results without losing fields
//! 4. Reload: placeholder positions and id allocation after a load
//!
//! Running This Demo:
//! ```bash
//! cargo run --example canvas_tour
//! ```

use miette::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use flowcanvas::blocks::{BlockData, BlockKind, display_text};
use flowcanvas::document::WorkflowDocument;
use flowcanvas::graph::{Position, WorkflowGraph};
use flowcanvas::reconcile::reconcile;
use flowcanvas::tracking::NodeResults;

fn init_tracing() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,flowcanvas=info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn init_miette() {
    // Pretty panic reports
    miette::set_panic_hook();
}

fn main() -> Result<()> {
    init_tracing();
    init_miette();
    tour()
}

fn tour() -> Result<()> {
    info!("\n╔══════════════════════════════════════════════════════════╗");
    info!("║                       Canvas Tour                        ║");
    info!("║        Build, Serialize, Reconcile, and Reload           ║");
    info!("╚══════════════════════════════════════════════════════════╝\n");

    // Step 1: build the canvas
    info!("🧱 Step 1: Placing blocks and wiring the pipeline");

    let mut graph = WorkflowGraph::new();
    let generate = graph.drop_block(BlockKind::GenerateText, Position::new(100.0, 80.0));
    let display = graph.drop_block(BlockKind::DisplayText, Position::new(380.0, 80.0));

    let mut prompt = BlockData::default();
    prompt.insert("prompt".into(), json!("Write a one-line greeting"));
    graph.update_node_data(&generate.id, &prompt);

    graph.connect(&generate.id, &display.id, None)?;

    info!("   ✓ Blocks: {} -> {}", generate.id, display.id);
    info!(
        "   ✓ Generator prompt: {:?}",
        graph.node(&generate.id).unwrap().data["prompt"]
    );

    // Step 2: serialize into the execution document
    info!("\n📄 Step 2: Serializing into the execution document");

    let document = WorkflowDocument::from_graph(&graph);
    info!(
        "   ✓ Document:\n{}",
        serde_json::to_string_pretty(&document).unwrap()
    );
    info!("   ✓ The edge became an input binding on the display block");

    // Step 3: reconcile a simulated result set
    info!("\n🔁 Step 3: Reconciling per-node results into the graph");

    let mut generated = BlockData::default();
    generated.insert("text".into(), json!("Hello from the canvas!"));
    let mut displayed = BlockData::default();
    displayed.insert("displayedText".into(), json!("Hello from the canvas!"));

    let mut results = NodeResults::default();
    results.insert(generate.id.clone(), generated);
    results.insert(display.id.clone(), displayed);

    let outcome = reconcile(&mut graph, &results);
    info!(
        "   ✓ Applied {} results, dropped {}",
        outcome.applied, outcome.dropped
    );
    info!(
        "   ✓ Display block renders: {:?}",
        display_text(&graph.node(&display.id).unwrap().data)
    );
    info!(
        "   ✓ Generator kept its prompt: {:?}",
        graph.node(&generate.id).unwrap().data["prompt"]
    );

    // Step 4: reload the document the way a saved workflow comes back
    info!("\n💾 Step 4: Rebuilding a graph from the document");

    let mut restored = WorkflowDocument::from_graph(&graph).into_graph()?;
    info!(
        "   ✓ Restored {} blocks and {} edges",
        restored.nodes().len(),
        restored.edges().len()
    );
    info!(
        "   ✓ Layout is not part of the wire format; blocks land at {:?}",
        restored.node(&generate.id).unwrap().position
    );

    let fresh = restored.drop_block(BlockKind::GenerateText, Position::default());
    info!(
        "   ✓ The id allocator stays ahead of loaded blocks: next is {}",
        fresh.id
    );

    info!("\n╔══════════════════════════════════════════════════════════╗");
    info!("║                    Canvas Tour Complete                  ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("\n🎯 Next: run run_workflow against a live backend");

    Ok(())
}
