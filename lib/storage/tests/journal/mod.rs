use crate::{entity, example_quad_in_graph, uri};
use insta::assert_snapshot;
use rdf_working_set_storage::{ChangeJournal, DatasetChange, GraphReconstruct, GraphUpdate};

fn add(graph: &str, value: &str) -> DatasetChange {
    let owner = entity("e");
    GraphUpdate::new(
        owner.clone(),
        Some(uri(&format!("http://example.com/{graph}"))),
        [],
        [example_quad_in_graph(&owner, "p", value, graph)],
    )
    .into()
}

fn remove(graph: &str, value: &str) -> DatasetChange {
    let owner = entity("e");
    GraphUpdate::new(
        owner.clone(),
        Some(uri(&format!("http://example.com/{graph}"))),
        [example_quad_in_graph(&owner, "p", value, graph)],
        [],
    )
    .into()
}

#[test]
fn graph_scope_freeze_keeps_order() {
    let mut journal = ChangeJournal::new(false);
    journal.add(add("g1", "a"));
    journal.add(DatasetChange::EntityDelete(entity("x")));
    journal.add(add("g1", "b"));

    assert_snapshot!(journal.to_string(), @r#"
    GraphUpdate(<http://example.com/e>, <http://example.com/g1>, removed: [], added: [<http://example.com/e> <http://example.com/p> "a" <http://example.com/g1> .])
    EntityDelete(<http://example.com/x>)
    GraphUpdate(<http://example.com/e>, <http://example.com/g1>, removed: [], added: [<http://example.com/e> <http://example.com/p> "b" <http://example.com/g1> .])
    "#);
}

#[test]
fn updates_and_reconstructs_in_one_graph() {
    let owner = entity("e");
    let graph = "g";
    let mut journal = ChangeJournal::new(true);
    journal.add(add(graph, "a"));
    journal.add(add(graph, "b"));
    journal.add(
        GraphReconstruct::new(
            owner.clone(),
            Some(uri("http://example.com/g")),
            [example_quad_in_graph(&owner, "p", "c", graph)],
        )
        .into(),
    );
    journal.add(add(graph, "d"));

    assert_snapshot!(journal.to_string(), @r#"
    GraphUpdate(<http://example.com/e>, <http://example.com/g>, removed: [], added: [<http://example.com/e> <http://example.com/p> "a" <http://example.com/g> ., <http://example.com/e> <http://example.com/p> "b" <http://example.com/g> .])
    GraphReconstruct(<http://example.com/e>, <http://example.com/g>, content: [<http://example.com/e> <http://example.com/p> "c" <http://example.com/g> ., <http://example.com/e> <http://example.com/p> "d" <http://example.com/g> .])
    "#);
}

#[test]
fn drain_for_commit() {
    let mut journal = ChangeJournal::default();
    journal.add(add("g1", "a"));
    journal.add(add("g2", "b"));
    journal.add(DatasetChange::RemoveReferences(entity("x")));

    let changes = journal.drain();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[2], DatasetChange::RemoveReferences(entity("x")));
    assert!(journal.is_empty());
    assert!(!journal.has_changes());
}

#[test]
fn emptied_reconstruct_leaves_graph_without_changes() {
    let owner = entity("e");
    let mut journal = ChangeJournal::new(false);
    journal.add(
        GraphReconstruct::new(
            owner.clone(),
            Some(uri("http://example.com/g")),
            [example_quad_in_graph(&owner, "p", "c", "g")],
        )
        .into(),
    );
    journal.add(remove("g", "c"));

    assert!(journal.is_empty());
    assert!(!journal.has_changes());
}
