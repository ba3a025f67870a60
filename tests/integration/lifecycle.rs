//! Integration tests for the refresh protocol and list lifecycle

use crate::integration::test_utils::{nodes, Fixture};
use viewquery::{
    EngineConfig, OwnerId, PassHooks, Poll, QueryDescriptor, QueryEngine, QueryId, QueryKind,
    QueryList, QueryOwner, QueryValue, RefreshConfig, RenderTree, RenderedTree,
};

#[derive(Default)]
struct Assignments {
    assigned: Vec<(OwnerId, QueryId, usize)>,
}

impl PassHooks for Assignments {
    fn query_changed(&mut self, owner: OwnerId, query: QueryId, list: &QueryList<QueryValue>) {
        self.assigned.push((owner, query, list.len()));
    }
}

/// Test that the changed hook fires only on passes that change contents
#[test]
fn test_assignment_only_on_change() {
    let mut fx = Fixture::new();
    let root = fx.root();
    fx.element(root, None, "div", &["x"]);
    let container = fx.tree.container(root, None, None).unwrap();
    let owner = fx.owner(QueryOwner::Root);
    let query = fx
        .engine
        .declare(&fx.tree, owner, QueryKind::View, QueryDescriptor::alias("x").unwrap())
        .unwrap();

    let mut hooks = Assignments::default();
    fx.engine.run_pass(&fx.tree, &mut hooks).unwrap();
    fx.engine.run_pass(&fx.tree, &mut hooks).unwrap();
    assert_eq!(hooks.assigned, vec![(owner, query, 1)]);

    // structural change that leaves the result as it was
    let (view, _) = fx.span_view("other");
    fx.tree.insert_view(container, view, None).unwrap();
    fx.engine.run_pass(&fx.tree, &mut hooks).unwrap();
    assert_eq!(hooks.assigned.len(), 1);

    let (view, _) = fx.span_view("x");
    fx.tree.insert_view(container, view, None).unwrap();
    fx.engine.run_pass(&fx.tree, &mut hooks).unwrap();
    assert_eq!(hooks.assigned, vec![(owner, query, 1), (owner, query, 2)]);
}

/// Test that subscribers see one event per changing pass and none when settled
#[test]
fn test_settle_suppression() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let container = fx.tree.container(root, None, None).unwrap();
    let list = fx.root_query(QueryDescriptor::alias("x").unwrap());
    let subscription = list.subscribe();

    // empty to empty is not a change
    fx.pass();
    assert!(matches!(subscription.poll(), Poll::Idle));

    let (view, span) = fx.span_view("x");
    fx.tree.insert_view(container, view, None).unwrap();
    fx.pass();
    fx.pass();
    let changes = subscription.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].items.len(), 1);
    assert_eq!(changes[0].items[0].node(), Some(span));
}

/// Test that the list handle and earlier snapshots stay stable across refreshes
#[test]
fn test_list_identity_is_stable() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let container = fx.tree.container(root, None, None).unwrap();
    let owner = fx.owner(QueryOwner::Root);
    let query = fx
        .engine
        .declare(&fx.tree, owner, QueryKind::View, QueryDescriptor::alias("x").unwrap())
        .unwrap();
    let before = fx.engine.load(owner, query).unwrap();
    fx.pass();
    let snapshot = before.snapshot();

    let (view, _) = fx.span_view("x");
    fx.tree.insert_view(container, view, None).unwrap();
    fx.pass();

    let after = fx.engine.load(owner, query).unwrap();
    assert!(before.same_list(&after));
    assert!(snapshot.is_empty());
    assert_eq!(after.len(), 1);
}

/// Test that tearing an owner down completes its subscriptions
#[test]
fn test_teardown_completes_subscriptions() {
    let mut fx = Fixture::new();
    let root = fx.root();
    fx.element(root, None, "div", &["x"]);
    let owner = fx.owner(QueryOwner::Root);
    let list = fx.query(owner, QueryKind::View, QueryDescriptor::alias("x").unwrap());
    let subscription = list.subscribe();
    fx.pass();

    fx.engine.teardown_owner(owner).unwrap();
    assert!(matches!(subscription.poll(), Poll::Change(_)));
    assert!(matches!(subscription.poll(), Poll::Closed));

    fx.element(root, None, "div", &["x"]);
    let report = fx.pass();
    assert_eq!(report.refreshed, 0);
    assert_eq!(list.len(), 1);
}

/// Test that a forced dirty flag recomputes without notifying when nothing changed
#[test]
fn test_set_dirty_recomputes() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let div = fx.element(root, None, "div", &["x"]);
    let list = fx.root_query(QueryDescriptor::alias("x").unwrap());
    fx.pass();
    let version = list.version();

    list.set_dirty();
    assert!(list.is_dirty());
    let report = fx.pass();
    assert!(!list.is_dirty());
    assert!(report.changed.is_empty());
    assert_eq!(list.version(), version);
    assert_eq!(nodes(&list), vec![div]);
}

/// Test that refreshes can be forced on every pass through configuration
#[test]
fn test_refresh_always_config() {
    let mut tree = RenderTree::new();
    let root = tree.root_view();
    tree.element(root, None, "div").unwrap();
    let config = EngineConfig {
        refresh: RefreshConfig::always(),
        ..EngineConfig::default()
    };
    let mut engine = QueryEngine::new().with_config(&config);
    let owner = engine.register_owner(&tree, QueryOwner::Root).unwrap();
    let query = engine
        .declare(&tree, owner, QueryKind::View, QueryDescriptor::alias("x").unwrap())
        .unwrap();

    assert!(!engine.refresh_query(&tree, owner, query).unwrap());
    assert!(!engine.refresh_query(&tree, owner, query).unwrap());
    assert!(!engine.load(owner, query).unwrap().is_dirty());
}

/// Test that descriptors compiled to JSON metadata load and run
#[test]
fn test_descriptor_from_json_metadata() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let outer = fx.element(root, None, "div", &["a"]);
    let inner = fx.element(root, Some(outer), "span", &["b"]);

    let descriptor: QueryDescriptor = serde_json::from_str(
        r#"{"predicate": {"aliases": ["b", "a"]}, "descendants": true}"#,
    )
    .unwrap();
    let list = fx.root_query(descriptor);
    fx.pass();
    assert_eq!(nodes(&list), vec![outer, inner]);

    let invalid: Result<QueryDescriptor, _> =
        serde_json::from_str(r#"{"predicate": {"aliases": ["a", "a"]}}"#);
    assert!(invalid.is_err());
}

/// Test that the pass report serializes for diagnostics
#[test]
fn test_pass_report_json() {
    let mut fx = Fixture::new();
    let root = fx.root();
    fx.element(root, None, "div", &["x"]);
    fx.root_query(QueryDescriptor::alias("x").unwrap());
    let report = fx.pass();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["refreshed"], 1);
    assert_eq!(json["changed"].as_array().map(Vec::len), Some(1));
}

#[derive(Default)]
struct ViewChecks {
    checked: Vec<OwnerId>,
}

impl PassHooks for ViewChecks {
    fn after_view_checked(&mut self, owner: OwnerId) {
        self.checked.push(owner);
    }
}

/// Test that destroying a component view empties its view query without
/// stopping the pass, and that a recreated view is picked up
#[test]
fn test_destroyed_component_view_does_not_abort_pass() {
    let mut fx = Fixture::new();
    let root = fx.root();
    let host = fx.element(root, None, "comp", &[]);
    let component_view = fx.tree.create_component_view(host).unwrap();
    fx.element(component_view, None, "span", &["x"]);
    let later = fx.element(root, None, "div", &[]);
    fx.element(root, Some(later), "span", &["x"]);

    let root_owner = fx.owner(QueryOwner::Root);
    let root_list = fx.query(root_owner, QueryKind::View, QueryDescriptor::alias("x").unwrap());
    let component = fx.owner(QueryOwner::Component { host });
    let component_list = fx.query(component, QueryKind::View, QueryDescriptor::alias("x").unwrap());
    let directive = fx.owner(QueryOwner::Directive { host: later });
    let directive_list = fx.query(directive, QueryKind::Content, QueryDescriptor::alias("x").unwrap());
    fx.pass();
    assert_eq!(component_list.len(), 1);
    assert_eq!(directive_list.len(), 1);

    fx.tree.destroy_view(component_view).unwrap();
    fx.element(root, Some(later), "span", &["x"]);
    fx.element(root, None, "span", &["x"]);

    let mut hooks = ViewChecks::default();
    let report = fx.engine.run_pass(&fx.tree, &mut hooks).unwrap();
    assert!(component_list.is_empty());
    assert_eq!(directive_list.len(), 2);
    assert_eq!(root_list.len(), 1);
    assert_eq!(hooks.checked, vec![root_owner, component, directive]);
    assert!(report.skipped_owners.is_empty());

    let recreated = fx.tree.create_component_view(host).unwrap();
    let span = fx.element(recreated, None, "span", &["x"]);
    fx.pass();
    assert_eq!(nodes(&component_list), vec![span]);
}
