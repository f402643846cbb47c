//! Tests for PackageArena weight aggregation and wiring

use generational_arena::Index;
use rstest::{fixture, rstest};

use gof::domain::{DomainError, PackageArena, NAIL_BOX_WEIGHT, NAIL_WEIGHT};
use gof::util::testing::init_test_setup;

/// Big box holding box A (three nails) and box B (one nail).
struct Demo {
    arena: PackageArena,
    root: Index,
    box_a: Index,
    box_b: Index,
}

#[fixture]
fn demo() -> Demo {
    init_test_setup();
    let mut arena = PackageArena::new();

    let box_a = arena.insert_nail_box();
    for _ in 0..3 {
        let nail = arena.insert_nail();
        arena.add(box_a, nail);
    }
    let box_b = arena.insert_nail_box();
    let nail = arena.insert_nail();
    arena.add(box_b, nail);

    let root = arena.insert_nail_box();
    arena.add(root, box_a);
    arena.add(root, box_b);

    Demo {
        arena,
        root,
        box_a,
        box_b,
    }
}

// ============================================================
// Aggregation
// ============================================================

#[rstest]
fn given_demo_package_when_weighing_then_matches_nested_sums(demo: Demo) {
    assert_eq!(demo.arena.weight(demo.box_a), Ok(16));
    assert_eq!(demo.arena.weight(demo.box_b), Ok(6));
    assert_eq!(demo.arena.weight(demo.root), Ok(23));
}

#[rstest]
fn given_any_container_when_weighing_then_equals_overhead_plus_children(demo: Demo) {
    for (idx, node) in demo.arena.iter_from(demo.root) {
        let children: u64 = node
            .children
            .iter()
            .map(|&c| demo.arena.weight(c).unwrap())
            .sum();
        assert_eq!(
            demo.arena.weight(idx).unwrap(),
            node.data.component.own_weight() + children
        );
    }
}

#[rstest]
fn given_unchanged_tree_when_weighing_repeatedly_then_same_value(demo: Demo) {
    let first = demo.arena.weight(demo.root);
    for _ in 0..5 {
        assert_eq!(demo.arena.weight(demo.root), first);
    }
}

#[rstest]
#[case(0, NAIL_BOX_WEIGHT)]
#[case(1, NAIL_BOX_WEIGHT + NAIL_WEIGHT)]
#[case(4, NAIL_BOX_WEIGHT + 4 * NAIL_WEIGHT)]
fn given_box_with_n_nails_when_weighing_then_linear_in_n(
    #[case] nails: u64,
    #[case] expected: u64,
) {
    let mut arena = PackageArena::new();
    let nail_box = arena.insert_nail_box();
    for _ in 0..nails {
        let nail = arena.insert_nail();
        arena.add(nail_box, nail);
    }
    assert_eq!(arena.weight(nail_box), Ok(expected));
}

#[test]
fn given_custom_components_when_weighing_then_uses_their_weights() {
    let mut arena = PackageArena::new();
    let crate_ = arena.insert_container("crate", 20);
    let bolt = arena.insert_leaf("bolt", 3);
    let screw = arena.insert_leaf("screw", 2);
    arena.add(crate_, bolt);
    arena.add(crate_, screw);

    assert_eq!(arena.weight(crate_), Ok(25));
}

#[test]
fn given_weights_past_u64_max_when_weighing_then_weight_overflow() {
    let mut arena = PackageArena::new();
    let nail_box = arena.insert_container("box", 1);
    let heavy = arena.insert_leaf("heavy", u64::MAX);
    arena.add(nail_box, heavy);

    let err = arena.weight(nail_box).unwrap_err();

    assert_eq!(err, DomainError::WeightOverflow("box".to_string()));
    assert_eq!(arena.weight(heavy), Ok(u64::MAX));
}

#[test]
fn given_overflow_deep_in_tree_when_weighing_root_then_reports_inner_container() {
    let mut arena = PackageArena::new();
    let root = arena.insert_nail_box();
    let inner = arena.insert_container("inner", 0);
    for _ in 0..2 {
        let half = arena.insert_leaf("half", u64::MAX / 2 + 1);
        arena.add(inner, half);
    }
    arena.add(root, inner);

    assert_eq!(
        arena.weight(root),
        Err(DomainError::WeightOverflow("inner".to_string()))
    );
    let rendered = arena.to_tree_string(root).to_string();
    assert!(rendered.starts_with("nail box (overflow)"));
}

#[test]
fn given_stale_handle_when_weighing_then_node_not_found() {
    let mut other = PackageArena::new();
    other.insert_nail();
    let stale = other.insert_nail();

    let arena = PackageArena::new();

    assert_eq!(arena.weight(stale), Err(DomainError::NodeNotFound(stale)));
}

// ============================================================
// Wiring
// ============================================================

#[rstest]
fn given_added_child_when_querying_parent_then_points_at_container(demo: Demo) {
    assert_eq!(demo.arena.parent(demo.box_a), Some(demo.root));
    assert_eq!(demo.arena.parent(demo.root), None);
    assert_eq!(demo.arena.children(demo.root), &[demo.box_a, demo.box_b]);
    assert_eq!(demo.arena.roots(), vec![demo.root]);
    assert_eq!(demo.arena.depth(demo.root), 3);
}

#[rstest]
fn given_leaf_when_adding_and_removing_then_weight_unchanged(mut demo: Demo) {
    let nail = demo.arena.children(demo.box_b)[0];
    let loose = demo.arena.insert_nail();

    demo.arena.add(nail, loose);
    assert_eq!(demo.arena.weight(nail), Ok(NAIL_WEIGHT));
    assert_eq!(demo.arena.parent(loose), None);

    demo.arena.remove(nail, loose);
    assert_eq!(demo.arena.weight(nail), Ok(NAIL_WEIGHT));
}

#[rstest]
fn given_removed_child_when_weighing_then_excluded_exactly_once(mut demo: Demo) {
    demo.arena.remove(demo.root, demo.box_a);

    assert_eq!(demo.arena.weight(demo.root), Ok(1 + 6));
    assert_eq!(demo.arena.parent(demo.box_a), None);
    // detached subtree keeps its own weight
    assert_eq!(demo.arena.weight(demo.box_a), Ok(16));
}

#[rstest]
fn given_non_child_when_removing_then_noop(mut demo: Demo) {
    let nail_in_a = demo.arena.children(demo.box_a)[0];

    demo.arena.remove(demo.box_b, nail_in_a);

    assert_eq!(demo.arena.parent(nail_in_a), Some(demo.box_a));
    assert_eq!(demo.arena.weight(demo.root), Ok(23));
}

#[test]
fn given_same_child_added_twice_when_removing_then_drops_first_occurrence_only() {
    let mut arena = PackageArena::new();
    let nail_box = arena.insert_nail_box();
    let nail = arena.insert_nail();
    arena.add(nail_box, nail);
    arena.add(nail_box, nail);
    assert_eq!(arena.weight(nail_box), Ok(11));

    arena.remove(nail_box, nail);

    assert_eq!(arena.children(nail_box), &[nail]);
    assert_eq!(arena.weight(nail_box), Ok(6));
}

// ============================================================
// Checked wiring
// ============================================================

#[rstest]
fn given_attached_child_when_try_add_elsewhere_then_already_attached(mut demo: Demo) {
    let err = demo.arena.try_add(demo.box_b, demo.box_a).unwrap_err();
    assert!(matches!(err, DomainError::AlreadyAttached(_)));
    assert_eq!(demo.arena.weight(demo.box_b), Ok(6));
}

#[rstest]
fn given_ancestor_when_try_add_under_descendant_then_cycle_detected(mut demo: Demo) {
    demo.arena.remove(demo.root, demo.box_a);
    let inner = demo.arena.insert_nail_box();
    demo.arena.add(demo.box_a, inner);

    let err = demo.arena.try_add(inner, demo.box_a).unwrap_err();

    assert!(matches!(err, DomainError::CycleDetected(_)));
    assert!(demo.arena.children(inner).is_empty());
}

#[test]
fn given_self_when_try_add_then_cycle_detected() {
    let mut arena = PackageArena::new();
    let nail_box = arena.insert_nail_box();
    let err = arena.try_add(nail_box, nail_box).unwrap_err();
    assert!(matches!(err, DomainError::CycleDetected(_)));
    assert!(arena.children(nail_box).is_empty());
}

#[test]
fn given_leaf_parent_when_try_add_then_not_a_container() {
    let mut arena = PackageArena::new();
    let nail = arena.insert_nail();
    let other = arena.insert_nail();
    let err = arena.try_add(nail, other).unwrap_err();
    assert_eq!(err, DomainError::NotAContainer("nail".to_string()));
}

#[test]
fn given_detached_nodes_when_try_add_then_attaches() {
    let mut arena = PackageArena::new();
    let nail_box = arena.insert_nail_box();
    let nail = arena.insert_nail();

    arena.try_add(nail_box, nail).unwrap();

    assert_eq!(arena.parent(nail), Some(nail_box));
    assert_eq!(arena.weight(nail_box), Ok(6));
}

// ============================================================
// Rendering
// ============================================================

#[rstest]
fn given_demo_package_when_rendering_then_lists_every_node(demo: Demo) {
    let rendered = demo.arena.to_tree_string(demo.root).to_string();
    assert!(rendered.starts_with("nail box (23)"));
    assert!(rendered.contains("nail box (16)"));
    assert!(rendered.contains("nail box (6)"));
    assert_eq!(rendered.matches("nail (5)").count(), 4);
}
