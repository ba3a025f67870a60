//! Property-based tests for traversal order and depth policy

use proptest::prelude::*;
use viewquery::query::{collect_matches, NodeResolver, QueryDescriptor, QueryScope};
use viewquery::tree::{document_order, LocalAlias, RenderTree, RenderedTree};
use viewquery::{NodeId, ViewId};

/// Declarative shape of a randomly generated subtree
#[derive(Debug, Clone)]
enum Shape {
    Element { alias: bool, children: Vec<Shape> },
    Group { alias: bool, children: Vec<Shape> },
    Container { views: Vec<Vec<Shape>> },
}

fn shape_strategy() -> impl Strategy<Value = Vec<Shape>> {
    let leaf = any::<bool>().prop_map(|alias| Shape::Element {
        alias,
        children: Vec::new(),
    });
    let shape = leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (any::<bool>(), prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(alias, children)| Shape::Element { alias, children }),
            (any::<bool>(), prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(alias, children)| Shape::Group { alias, children }),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 0..3)
                .prop_map(|views| Shape::Container { views }),
        ]
    });
    prop::collection::vec(shape, 0..5)
}

/// Build `shapes` into `view`; returns how many aliased nodes were created.
fn build(tree: &mut RenderTree, view: ViewId, parent: Option<NodeId>, shapes: &[Shape]) -> usize {
    let mut aliased = 0;
    for shape in shapes {
        match shape {
            Shape::Element { alias, children } | Shape::Group { alias, children } => {
                let node = if matches!(shape, Shape::Element { .. }) {
                    tree.element(view, parent, "div").unwrap()
                } else {
                    tree.grouping(view, parent).unwrap()
                };
                if *alias {
                    tree.add_alias(node, LocalAlias::new("x")).unwrap();
                    aliased += 1;
                }
                aliased += build(tree, view, Some(node), children);
            }
            Shape::Container { views } => {
                let container = tree.container(view, parent, None).unwrap();
                for content in views {
                    let embedded = tree.create_embedded_view(None);
                    aliased += build(tree, embedded, None, content);
                    tree.insert_view(container, embedded, None).unwrap();
                }
            }
        }
    }
    aliased
}

fn matched_nodes(tree: &RenderTree, descriptor: &QueryDescriptor) -> Vec<NodeId> {
    collect_matches(tree, QueryScope::View(tree.root_view()), descriptor, &NodeResolver)
        .unwrap()
        .matches
        .into_iter()
        .map(|m| m.node)
        .collect()
}

/// Test that traversing an unchanged tree twice yields the same sequence
#[test]
fn test_order_invariance_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shapes| {
            let mut tree = RenderTree::new();
            let root = tree.root_view();
            build(&mut tree, root, None, &shapes);

            let deep = QueryDescriptor::alias("x").unwrap().deep();
            prop_assert_eq!(matched_nodes(&tree, &deep), matched_nodes(&tree, &deep));
            Ok(())
        })
        .unwrap();
}

/// Test that shallow matches are an ordered subsequence of deep matches
#[test]
fn test_shallow_subset_of_deep_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shapes| {
            let mut tree = RenderTree::new();
            let root = tree.root_view();
            build(&mut tree, root, None, &shapes);

            let shallow = matched_nodes(&tree, &QueryDescriptor::alias("x").unwrap());
            let deep = matched_nodes(&tree, &QueryDescriptor::alias("x").unwrap().deep());

            let mut remaining = deep.iter();
            for node in &shallow {
                prop_assert!(
                    remaining.any(|candidate| candidate == node),
                    "shallow match {} missing from deep sequence",
                    node
                );
            }
            Ok(())
        })
        .unwrap();
}

/// Test that deep matches cover every aliased node in document order
#[test]
fn test_deep_matches_follow_document_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shapes| {
            let mut tree = RenderTree::new();
            let root = tree.root_view();
            let aliased = build(&mut tree, root, None, &shapes);

            let deep = matched_nodes(&tree, &QueryDescriptor::alias("x").unwrap().deep());
            prop_assert_eq!(deep.len(), aliased);

            let order = document_order(&tree);
            let positions: Vec<usize> = deep.iter().map(|node| order[node]).collect();
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
            Ok(())
        })
        .unwrap();
}
