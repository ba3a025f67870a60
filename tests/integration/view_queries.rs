//! Integration tests for view queries over a component's own view

use crate::integration::test_utils::{nodes, texts, Fixture, TEXT_DIRECTIVE};
use viewquery::{
    BehaviorInstance, ElementHandle, LocalAlias, QueryDescriptor, QueryKind, QueryOwner,
    QueryValue, RenderedTree,
};

/// Test that deep matches follow pre-order over the declared structure
#[test]
fn test_deep_matches_in_pre_order() {
    let mut fx = Fixture::new();
    let root = fx.root();
    // A(B(C), D(E))
    let a = fx.element(root, None, "a", &["x"]);
    let b = fx.element(root, Some(a), "b", &["x"]);
    let c = fx.element(root, Some(b), "c", &["x"]);
    let d = fx.element(root, Some(a), "d", &["x"]);
    let e = fx.element(root, Some(d), "e", &["x"]);

    let list = fx.root_query(QueryDescriptor::alias("x").unwrap().deep());
    fx.pass();
    assert_eq!(nodes(&list), vec![a, b, c, d, e]);
}

/// Test that type queries collect every directive instance in order
#[test]
fn test_type_query_reads_directive_instances() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let outer = fx.text(root, None, "A");
    fx.text(root, Some(outer), "B");
    fx.text(root, None, "C");

    let shallow = fx.root_query(QueryDescriptor::of_type(TEXT_DIRECTIVE).unwrap());
    let deep = fx.root_query(QueryDescriptor::of_type(TEXT_DIRECTIVE).unwrap().deep());
    fx.pass();
    assert_eq!(texts(&shallow), vec!["A", "C"]);
    assert_eq!(texts(&deep), vec!["A", "B", "C"]);
}

/// Test that a grouping marker's children sit one level below the scope
#[test]
fn test_grouping_marker_counts_as_a_level() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let group = fx.tree.grouping(root, None).unwrap();
    fx.tree.add_alias(group, LocalAlias::new("x")).unwrap();
    let inner = fx.element(root, Some(group), "span", &["x"]);

    let shallow = fx.root_query(QueryDescriptor::alias("x").unwrap());
    let deep = fx.root_query(QueryDescriptor::alias("x").unwrap().deep());
    fx.pass();
    assert_eq!(shallow.to_vec(), vec![QueryValue::Element(ElementHandle { node: group })]);
    assert_eq!(nodes(&deep), vec![group, inner]);
}

/// Test that a parent's view query stops at a child component's view
#[test]
fn test_view_query_does_not_enter_child_component_views() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let host = fx.element(root, None, "child-cmp", &[]);
    fx.tree
        .install_behaviors(
            host,
            vec![BehaviorInstance::new("ChildCmp", ()).as_component()],
            vec![],
        )
        .unwrap();
    let child_view = fx.tree.create_component_view(host).unwrap();
    fx.text(child_view, None, "internal");
    fx.text(root, Some(host), "projected");

    let parent_list = fx.root_query(QueryDescriptor::of_type(TEXT_DIRECTIVE).unwrap().deep());
    let child = fx.owner(QueryOwner::Component { host });
    let child_list = fx.query(
        child,
        QueryKind::View,
        QueryDescriptor::of_type(TEXT_DIRECTIVE).unwrap().deep(),
    );
    fx.pass();

    assert_eq!(texts(&parent_list), vec!["projected"]);
    assert_eq!(texts(&child_list), vec!["internal"]);
}

/// Test that the roots of a component view are themselves match targets
#[test]
fn test_view_roots_are_matched() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let host = fx.element(root, None, "cmp", &[]);
    let view = fx.tree.create_component_view(host).unwrap();
    let first = fx.element(view, None, "div", &["x"]);
    let second = fx.element(view, None, "div", &["x"]);

    let owner = fx.owner(QueryOwner::Component { host });
    let list = fx.query(owner, QueryKind::View, QueryDescriptor::alias("x").unwrap());
    fx.pass();
    assert_eq!(nodes(&list), vec![first, second]);
}

/// Test that an alias on a component host reads the component instance
#[test]
fn test_alias_on_component_host_reads_component() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let host = fx.element(root, None, "child-cmp", &["child"]);
    fx.tree
        .install_behaviors(
            host,
            vec![
                BehaviorInstance::new(TEXT_DIRECTIVE, "directive".to_string()),
                BehaviorInstance::new("ChildCmp", "component".to_string()).as_component(),
            ],
            vec![],
        )
        .unwrap();

    let list = fx.root_query(QueryDescriptor::alias("child").unwrap());
    fx.pass();
    assert_eq!(texts(&list), vec!["component"]);
    assert_eq!(
        list.first()
            .and_then(|v| v.as_instance().map(|i| i.type_tag().to_string())),
        Some("ChildCmp".to_string())
    );
}

/// Test that querying a template type matches only template-backed containers
#[test]
fn test_template_handle_query() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let template = fx.tree.declare_template();
    let tpl = fx.tree.container(root, None, Some(template)).unwrap();
    fx.tree.container(root, None, None).unwrap();
    fx.element(root, None, "div", &[]);

    let list = fx.root_query(QueryDescriptor::token(viewquery::Token::TemplateHandle).unwrap());
    fx.pass();
    let handles: Vec<_> = list.iter_snapshot().filter_map(|v| v.as_template()).collect();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].node, tpl);
    assert_eq!(handles[0].template, template);
    assert!(fx.tree.contains_node(tpl));
}
