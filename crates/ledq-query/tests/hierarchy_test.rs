//! Concept forest reconstruction over realistic ancestry rows.
//!
//! Rows are written as `(ancestor, parent, concept)` with the ancestor a
//! root, the way a SKOS store reports them for a single-rooted scheme.

use ledq_core::{Hierarchy, HierarchyEntry};
use ledq_query::resolve_hierarchy;
use serde_json::json;

fn rooted(rows: &[(&str, &str, &str)]) -> Vec<HierarchyEntry> {
    rows.iter()
        .map(|(ancestor, parent, concept)| HierarchyEntry::new(None, ancestor, parent, concept))
        .collect()
}

fn as_json(forest: &Hierarchy) -> serde_json::Value {
    serde_json::to_value(forest).unwrap()
}

const REGIONS: [(&str, &str, &str); 8] = [
    ("brd", "brd", "nrw"),
    ("brd", "brd", "sl"),
    ("brd", "brd", "rp"),
    ("brd", "nrw", "cologne"),
    ("brd", "sl", "saarbruecken"),
    ("brd", "cologne", "portz"),
    ("brd", "by", "munich"),
    ("brd", "brd", "by"),
];

#[test]
fn test_regions_forest() {
    let forest = resolve_hierarchy(&rooted(&REGIONS));
    assert_eq!(
        as_json(&forest),
        json!({
            "brd": {
                "nrw": { "cologne": { "portz": {} } },
                "rp": {},
                "sl": { "saarbruecken": {} },
                "by": { "munich": {} }
            }
        })
    );
}

#[test]
fn test_arbitrary_depth_forest() {
    let rows = [
        ("root", "dos", "lorem"),
        ("root", "bravo", "uno"),
        ("root", "bravo", "dos"),
        ("root", "bar", "alpha"),
        ("root", "bar", "bravo"),
        ("root", "root", "foo"),
        ("root", "root", "bar"),
        ("root", "dos", "ipsum"),
    ];
    let forest = resolve_hierarchy(&rooted(&rows));
    assert_eq!(
        as_json(&forest),
        json!({
            "root": {
                "foo": {},
                "bar": {
                    "alpha": {},
                    "bravo": {
                        "uno": {},
                        "dos": { "lorem": {}, "ipsum": {} }
                    }
                }
            }
        })
    );
    assert_eq!(forest["root"].descendant_count(), 8);
}

#[test]
fn test_regions_forest_is_order_independent() {
    let entries = rooted(&REGIONS);
    let expected = resolve_hierarchy(&entries);

    // All 8! orderings
    let n = entries.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut c = vec![0; n];
    let mut checked = 1;
    let mut i = 0;
    while i < n {
        if c[i] < i {
            let j = if i % 2 == 0 { 0 } else { c[i] };
            order.swap(j, i);
            let permuted = order.iter().map(|&k| &entries[k]);
            assert_eq!(resolve_hierarchy(permuted), expected, "order {:?}", order);
            checked += 1;
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    assert_eq!(checked, 40_320);
}

#[test]
fn test_repeated_rows_do_not_change_forest() {
    let once = resolve_hierarchy(&rooted(&REGIONS));
    let twice: Vec<HierarchyEntry> = rooted(&REGIONS)
        .into_iter()
        .chain(rooted(&REGIONS))
        .collect();
    assert_eq!(resolve_hierarchy(&twice), once);
}

#[test]
fn test_unattached_branch_is_dropped() {
    // "sl" is never attached below "brd", so its branch cannot be placed
    let rows = [
        ("brd", "brd", "nrw"),
        ("brd", "nrw", "cologne"),
        ("brd", "sl", "saarbruecken"),
    ];
    let forest = resolve_hierarchy(&rooted(&rows));
    assert_eq!(as_json(&forest), json!({ "brd": { "nrw": { "cologne": {} } } }));
}

#[test]
fn test_nested_roots_with_grandparents() {
    let entries = vec![
        HierarchyEntry::new(None, "eu", "eu", "brd"),
        HierarchyEntry::new(Some("eu"), "brd", "brd", "by"),
        HierarchyEntry::new(None, "eu", "by", "munich"),
        HierarchyEntry::new(Some("brd"), "by", "by", "munich"),
        HierarchyEntry::new(Some("eu"), "brd", "by", "munich"),
    ];
    let forest = resolve_hierarchy(&entries);
    assert_eq!(as_json(&forest), json!({ "eu": { "brd": { "by": { "munich": {} } } } }));
}
