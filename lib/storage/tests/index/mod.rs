use crate::{blank, entity, example_quad, uri};
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};
use rdf_working_set_model::{Literal, Node, Quad};
use rdf_working_set_storage::{BlankNodeRefCounts, QuadCollection};
use std::sync::Arc;

fn random_quad(rng: &mut StdRng) -> Quad {
    let owner = entity(&format!("e{}", rng.random_range(0..4)));
    let predicate = format!("p{}", rng.random_range(0..3));
    let object = match rng.random_range(0..3) {
        0 => uri(&format!("http://example.com/o{}", rng.random_range(0..3))),
        1 => blank(&format!("b{}", rng.random_range(0..3)), &entity("root")),
        _ => Node::from(Literal::new_simple_literal(format!(
            "v{}",
            rng.random_range(0..3)
        ))),
    };
    example_quad(&owner, &predicate, object)
}

fn random_operations(thread_safe: bool) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut collection = QuadCollection::new(thread_safe);
    let mut expected = Vec::new();

    for _ in 0..500 {
        let quad = random_quad(&mut rng);
        if rng.random_bool(0.6) {
            let inserted = collection.add(quad.clone());
            assert_eq!(inserted, !expected.contains(&quad));
            if inserted {
                expected.push(quad);
            }
        } else {
            let removed = collection.remove(&quad);
            assert_eq!(removed, expected.contains(&quad));
            expected.retain(|q| q != &quad);
        }

        collection.validate().unwrap();
    }

    expected.sort();
    assert_eq!(collection.quads(), expected);
}

#[test]
fn indices_stay_consistent_under_random_operations() {
    random_operations(false);
}

#[test]
fn concurrent_indices_stay_consistent_under_random_operations() {
    random_operations(true);
}

#[test]
fn ref_counts_match_quads_after_rebuild() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut collection = QuadCollection::new(false);
    let mut counts = BlankNodeRefCounts::new();

    for _ in 0..200 {
        let quad = random_quad(&mut rng);
        let object = quad.object().clone();
        if collection.add(quad) && object.is_blank() {
            counts.increment(&object).unwrap();
        }
    }

    let mut rebuilt = BlankNodeRefCounts::new();
    rebuilt.rebuild(&collection);
    for id in ["b0", "b1", "b2"] {
        let node = blank(id, &entity("root"));
        assert_eq!(rebuilt.count(&node).unwrap(), counts.count(&node).unwrap());
    }
}

#[test]
fn thread_safe_collection_can_be_read_from_multiple_threads() {
    let mut collection = QuadCollection::new(true);
    for i in 0..16 {
        collection.add(example_quad(&entity(&format!("e{i}")), "p", uri("http://example.com/o")));
    }
    let collection = Arc::new(collection);

    std::thread::scope(|scope| {
        for i in 0..4 {
            let collection = Arc::clone(&collection);
            scope.spawn(move || {
                let owner = entity(&format!("e{i}"));
                assert_eq!(collection.quads_for_entity(&owner).len(), 1);
                assert_eq!(
                    collection
                        .referencing_entities(&uri("http://example.com/o"))
                        .len(),
                    16
                );
            });
        }
    });
}

#[test]
fn remove_where_object_across_entities() {
    let owner = entity("root");
    let shared = blank("shared", &owner);
    let mut collection = QuadCollection::new(false);
    collection.add(example_quad(&owner, "p", shared.clone()));
    collection.add(example_quad(&entity("other"), "p", shared.clone()));
    collection.add(example_quad(&owner, "q", uri("http://example.com/o")));

    let removed = collection.remove_where_object(&shared);

    assert_eq!(removed.len(), 2);
    assert!(collection.referencing_entities(&shared).is_empty());
    assert_eq!(collection.entities(), vec![owner]);
    collection.validate().unwrap();
}
