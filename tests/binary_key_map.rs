use multikey_hashmap::{BinaryKeyMap, MapConfig, MapError, MAX_CAPACITY};
use std::collections::BTreeSet;

/// Invariant: len equals the number of distinct keys put and not removed.
#[test]
fn len_tracks_distinct_keys() {
    let mut m: BinaryKeyMap<u32, String, u32> = BinaryKeyMap::new();
    for i in 0..50u32 {
        m.put(i % 10, format!("k{}", i % 5), i);
    }
    // (i % 10, i % 5) has 10 distinct combinations.
    assert_eq!(m.len(), 10);
    for i in 0..5u32 {
        assert!(m.remove(&i, &format!("k{}", i % 5)).is_some());
    }
    assert_eq!(m.len(), 5);
}

#[test]
fn put_then_get_and_overwrite() {
    let mut m: BinaryKeyMap<&str, i64, f64> = BinaryKeyMap::new();
    assert_eq!(m.put("P69905", 9606, 0.25), None);
    assert_eq!(m.get(&"P69905", &9606), Some(&0.25));
    assert_eq!(m.put("P69905", 9606, 0.75), Some(0.25));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&"P69905", &9606), Some(&0.75));
    assert_eq!(m.get(&"P69905", &10090), None);
    assert!(!m.contains_key(&"P01942", &9606));
}

#[test]
fn removing_an_absent_key_is_a_no_op() {
    let mut m: BinaryKeyMap<u8, u8, u8> = BinaryKeyMap::new();
    m.put(1, 1, 1);
    let before = m.modification_count();
    assert_eq!(m.remove(&1, &2), None);
    assert_eq!(m.len(), 1);
    assert_eq!(m.modification_count(), before);
}

/// Invariant: growth past the threshold keeps every pair retrievable.
#[test]
fn growth_keeps_every_pair() {
    let config = MapConfig::new().with_initial_capacity(1);
    let mut m: BinaryKeyMap<u32, u32, u32> = BinaryKeyMap::with_config(config).unwrap();
    for i in 0..5_000u32 {
        m.put(i, i ^ 0x5555, i * 3);
    }
    assert_eq!(m.len(), 5_000);
    assert!(m.capacity() as f64 * m.load_factor() >= 5_000.0);
    for i in 0..5_000u32 {
        assert_eq!(m.get(&i, &(i ^ 0x5555)), Some(&(i * 3)));
    }
}

#[test]
fn capacity_never_shrinks() {
    let mut m: BinaryKeyMap<u32, u32, ()> = BinaryKeyMap::new();
    for i in 0..200 {
        m.put(i, i, ());
    }
    let grown = m.capacity();
    for i in 0..200 {
        m.remove(&i, &i);
    }
    assert!(m.is_empty());
    assert_eq!(m.capacity(), grown);
}

#[test]
fn iteration_visits_exactly_the_stored_entries() {
    let mut m: BinaryKeyMap<i32, &str, &str> = BinaryKeyMap::new();
    m.put(1, "a", "x");
    m.put(2, "b", "y");

    let mut c = m.cursor();
    let mut visited = Vec::new();
    while c.next(&m).unwrap() {
        visited.push((
            *c.first_key(&m).unwrap(),
            *c.second_key(&m).unwrap(),
            *c.value(&m).unwrap(),
        ));
    }
    assert_eq!(visited.len(), 2);
    let visited: BTreeSet<_> = visited.into_iter().collect();
    assert_eq!(visited, [(1, "a", "x"), (2, "b", "y")].into_iter().collect());
}

/// Invariant: a structural change made outside the cursor is reported by
/// the cursor's next advance.
#[test]
fn put_during_traversal_fails_fast() {
    let mut m: BinaryKeyMap<i32, &str, &str> = BinaryKeyMap::new();
    m.put(1, "a", "x");
    m.put(2, "b", "y");
    let mut c = m.cursor();
    assert!(c.next(&m).unwrap());
    m.put(3, "c", "z");
    match c.next(&m) {
        Err(MapError::ConcurrentModification { expected, found }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 3);
        }
        other => panic!("expected ConcurrentModification, got {other:?}"),
    }
}

#[test]
fn removal_through_the_cursor_does_not_fail() {
    let mut m: BinaryKeyMap<i32, &str, &str> = BinaryKeyMap::new();
    m.put(1, "a", "x");
    m.put(2, "b", "y");
    m.put(3, "c", "z");
    let mut c = m.cursor();
    let mut visited = 0;
    while c.next(&m).unwrap() {
        visited += 1;
        if *c.first_key(&m).unwrap() != 2 {
            c.remove_current(&mut m).unwrap();
        }
    }
    assert_eq!(visited, 3);
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&2, &"b"), Some(&"y"));
}

#[test]
fn value_on_a_fresh_cursor_is_invalid() {
    let mut m: BinaryKeyMap<i32, &str, &str> = BinaryKeyMap::new();
    m.put(1, "a", "x");
    let c = m.cursor();
    assert_eq!(c.value(&m), Err(MapError::InvalidIteratorState));
    assert_eq!(c.second_key(&m), Err(MapError::InvalidIteratorState));
    assert_eq!(
        c.set_value(&mut m, "y"),
        Err(MapError::InvalidIteratorState)
    );
}

#[test]
fn overwrite_scenario_end_to_end() {
    let mut m: BinaryKeyMap<i32, &str, &str> = BinaryKeyMap::new();
    m.put(1, "x", "A");
    m.put(2, "y", "B");
    m.put(1, "x", "C");
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&1, &"x"), Some(&"C"));
    assert_eq!(m.get(&2, &"y"), Some(&"B"));
    let all: BTreeSet<_> = m.iter().map(|(a, b, v)| (*a, *b, *v)).collect();
    assert_eq!(all, [(1, "x", "C"), (2, "y", "B")].into_iter().collect());
}

#[test]
fn absent_components_are_rejected() {
    let mut m: BinaryKeyMap<String, u32, u32> = BinaryKeyMap::new();
    assert_eq!(
        m.try_put(None, Some(1), 5),
        Err(MapError::InvalidKey { position: 0 })
    );
    assert_eq!(
        m.try_get(Some("a"), None::<&u32>),
        Err(MapError::InvalidKey { position: 1 })
    );
    assert!(m.is_empty());
}

/// Invariant: a `String` component is looked up by `&str`, no allocation.
#[test]
fn string_components_are_queried_by_str() {
    let mut m: BinaryKeyMap<String, String, u32> = BinaryKeyMap::new();
    m.put("human".to_string(), "P69905".to_string(), 1);
    m.put("mouse".to_string(), "P01942".to_string(), 2);
    assert_eq!(m.get("human", "P69905"), Some(&1));
    assert_eq!(m.get("human", "P01942"), None);
    assert!(m.contains_key("mouse", "P01942"));
    assert_eq!(m.remove("mouse", "P01942"), Some(2));
    assert_eq!(m.len(), 1);
}

#[test]
fn malformed_constructor_arguments() {
    assert!(matches!(
        BinaryKeyMap::<u8, u8, u8>::with_capacity(MAX_CAPACITY + 1),
        Err(MapError::InvalidArgument(_))
    ));
    assert!(matches!(
        BinaryKeyMap::<u8, u8, u8>::with_config(MapConfig::new().with_load_factor(0.0)),
        Err(MapError::InvalidArgument(_))
    ));
    let m = BinaryKeyMap::<u8, u8, u8>::with_capacity(33).unwrap();
    assert_eq!(m.capacity(), 64);
}

#[test]
fn value_replacement_through_cursor_keeps_traversing() {
    let mut m: BinaryKeyMap<u16, u16, u32> = (0..100u16).map(|i| (i, i + 1, 0)).collect();
    let before = m.modification_count();
    let mut c = m.cursor();
    while c.next(&m).unwrap() {
        let a = u32::from(*c.first_key(&m).unwrap());
        *c.value_mut(&mut m).unwrap() = a * 2;
    }
    assert_eq!(m.modification_count(), before);
    assert!(m.iter().all(|(a, _, v)| *v == u32::from(*a) * 2));
}
