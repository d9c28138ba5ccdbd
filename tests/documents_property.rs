#[macro_use]
extern crate proptest;

use flowcanvas::blocks::BlockKind;
use flowcanvas::document::WorkflowDocument;
use flowcanvas::graph::{Position, WorkflowGraph};
use proptest::prelude::{Just, Strategy, any, prop};
use proptest::sample::Index;
use rustc_hash::FxHashSet;

// Generators shared by the document round-trip properties

/// Generate block kinds across the built-in palette plus custom names.
///
/// Custom names are filtered so they never spell a built-in wire name,
/// which would make them indistinguishable on the wire.
fn kind_strategy() -> impl Strategy<Value = BlockKind> {
    let custom = prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,10}")
        .unwrap()
        .prop_filter("exclude built-in wire names", |name| {
            BlockKind::from(name.as_str()).is_custom()
        })
        .prop_map(BlockKind::Custom);
    prop_oneof![
        Just(BlockKind::GenerateText),
        Just(BlockKind::DisplayText),
        Just(BlockKind::GenerateImage),
        Just(BlockKind::DisplayImage),
        Just(BlockKind::TextToSpeech),
        custom,
    ]
}

/// Generate edge descriptions as index pairs with an optional port name.
fn edge_strategy() -> impl Strategy<Value = Vec<(Index, Index, Option<String>)>> {
    prop::collection::vec(
        (
            any::<Index>(),
            any::<Index>(),
            prop::option::of(prop::string::string_regex("[a-z]{1,8}").unwrap()),
        ),
        0..16,
    )
}

/// Build a graph by dropping one block per kind and connecting the
/// described edges. Edges that collide on an existing pair are skipped,
/// exactly as an editor would refuse the duplicate connection.
fn build_graph(kinds: &[BlockKind], edges: &[(Index, Index, Option<String>)]) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    for kind in kinds {
        graph.drop_block(kind.clone(), Position::default());
    }
    let ids: Vec<String> = graph.nodes().iter().map(|node| node.id.clone()).collect();
    for (source, target, port) in edges {
        let source = &ids[source.index(ids.len())];
        let target = &ids[target.index(ids.len())];
        let _ = graph.connect(source, target, port.as_deref());
    }
    graph
}

proptest! {
    /// Wire names identify kinds exactly, custom or not.
    #[test]
    fn prop_kinds_round_trip_through_wire_names(kind in kind_strategy()) {
        prop_assert_eq!(BlockKind::from(kind.wire_name()), kind);
    }
}

proptest! {
    /// Serializing, rebuilding, and serializing again yields the same
    /// document: everything that affects execution survives the trip.
    #[test]
    fn prop_serialization_is_stable_across_reload(
        kinds in prop::collection::vec(kind_strategy(), 1..10),
        edges in edge_strategy(),
    ) {
        let graph = build_graph(&kinds, &edges);

        let first = WorkflowDocument::from_graph(&graph);
        let rebuilt = first
            .clone()
            .into_graph()
            .expect("serialized documents always rebuild");
        let second = WorkflowDocument::from_graph(&rebuilt);

        prop_assert_eq!(first, second);
    }
}

proptest! {
    /// Rebuilding keeps every block, its payload, and one edge per input
    /// binding; nothing else is invented.
    #[test]
    fn prop_rebuilt_graphs_mirror_the_document(
        kinds in prop::collection::vec(kind_strategy(), 1..10),
        edges in edge_strategy(),
    ) {
        let document = WorkflowDocument::from_graph(&build_graph(&kinds, &edges));
        let bindings: usize = document.blocks.iter().map(|block| block.inputs.len()).sum();

        let rebuilt = document.clone().into_graph().expect("rebuild");
        prop_assert_eq!(rebuilt.nodes().len(), document.blocks.len());
        prop_assert_eq!(rebuilt.edges().len(), bindings);
        for block in &document.blocks {
            let node = rebuilt.node(&block.id).expect("every block becomes a node");
            prop_assert_eq!(&node.kind, &block.kind);
            prop_assert_eq!(&node.data, &block.data);
        }
    }
}

proptest! {
    /// Ids allocated after a reload never collide with reloaded blocks.
    #[test]
    fn prop_reloaded_allocators_stay_ahead(
        kinds in prop::collection::vec(kind_strategy(), 1..10),
        edges in edge_strategy(),
        extra in kind_strategy(),
    ) {
        let mut rebuilt = WorkflowDocument::from_graph(&build_graph(&kinds, &edges))
            .into_graph()
            .expect("rebuild");
        let existing: FxHashSet<String> =
            rebuilt.nodes().iter().map(|node| node.id.clone()).collect();

        let fresh = rebuilt.drop_block(extra, Position::default());
        prop_assert!(!existing.contains(&fresh.id));
    }
}
