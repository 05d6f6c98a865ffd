use super::*;

use crate::arena::Slot;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Checks every structural invariant of the tree and the arena.
pub(crate) fn validate_tree<S: Schema, P: Policy>(t: &LlrbTree<S, P>) {
    let links = t.arena.links();
    assert!(t.len() <= t.capacity(), "len exceeds capacity");
    assert_eq!(
        t.root.is_nil(),
        t.is_empty(),
        "root must be NIL exactly when the tree is empty"
    );
    if !t.root.is_nil() {
        assert!(!links.is_red(t.root), "root must be black");
    }

    let mut seen = vec![false; t.capacity()];
    black_height(t, t.root, &mut seen);

    let mut reachable = 0usize;
    let mut prev: Option<NodeIndex> = None;
    for (idx, _) in t.iter() {
        if let Some(p) = prev {
            assert_eq!(
                t.schema.compare(t.schema.key(t.get(p)), t.schema.key(t.get(idx))),
                Ordering::Less,
                "in-order walk must be strictly ascending"
            );
        }
        prev = Some(idx);
        reachable += 1;
    }
    assert_eq!(reachable, t.len(), "reachable node count must match len");
    assert_eq!(seen.iter().filter(|s| **s).count(), t.len());

    // Free slots and occupied slots partition the arena.
    let mut free = 0usize;
    let mut cur = links.first_free();
    while !cur.is_nil() {
        match links.slot(cur) {
            Slot::Free { next } => {
                assert!(!seen[cur.get()], "slot {cur} is both linked and free");
                seen[cur.get()] = true;
                free += 1;
                cur = next;
            }
            Slot::Occupied { .. } => panic!("occupied slot {cur} on the free list"),
        }
    }
    assert_eq!(free + t.len(), t.capacity(), "every slot is either linked or free");
}

fn black_height<S: Schema, P: Policy>(
    t: &LlrbTree<S, P>,
    idx: NodeIndex,
    seen: &mut [bool],
) -> usize {
    if idx.is_nil() {
        return 1;
    }

    let links = t.arena.links();
    assert!(links.is_occupied(idx), "linked slot {idx} is free");
    assert!(
        !std::mem::replace(&mut seen[idx.get()], true),
        "slot {idx} reachable twice"
    );

    let (left, right) = (links.left(idx), links.right(idx));
    assert!(!links.is_red(right), "red right link below {idx}");
    if links.is_red(idx) {
        assert!(!links.is_red(left), "two consecutive red links at {idx}");
    }

    let lh = black_height(t, left, seen);
    let rh = black_height(t, right, seen);
    assert_eq!(lh, rh, "black-height mismatch below {idx}");
    lh + usize::from(!links.is_red(idx))
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u16..256")] u16, u32, bool),
    #[proptest(weight = 3)]
    Delete(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(weight = 2)]
    Find(#[proptest(strategy = "0u16..256")] u16),
    DeleteMin,
}

fn small_growth() -> Grow {
    Grow::new(
        GrowthConfig::default()
            .with_initial_capacity(4)
            .with_min_capacity(0),
    )
}

fn distinct_keys(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(any::<u32>(), 0..max_len)
        .prop_map(|s| s.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_btreemap(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        let mut t = LlrbTree::with_policy(Pairs::<u16, u32>::new(), small_growth());
        let mut m: BTreeMap<u16, (u32, NodeIndex)> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value, replace) => {
                    let idx = t.insert((key, value), replace).unwrap();
                    match m.get_mut(&key) {
                        Some(entry) => {
                            prop_assert_eq!(idx, entry.1);
                            if replace {
                                entry.0 = value;
                            }
                        }
                        None => {
                            m.insert(key, (value, idx));
                        }
                    }
                }
                Op::Delete(key) => {
                    prop_assert_eq!(t.delete(&key), m.remove(&key).is_some());
                    prop_assert_eq!(t.find(&key), None);
                }
                Op::Find(key) => {
                    prop_assert_eq!(t.find(&key), m.get(&key).map(|e| e.1));
                }
                Op::DeleteMin => {
                    let expected = m.keys().next().copied();
                    prop_assert_eq!(t.delete_min(None), expected.is_some());
                    if let Some(key) = expected {
                        m.remove(&key);
                    }
                }
            }

            validate_tree(&t);
            prop_assert_eq!(t.len(), m.len());
        }

        let got: Vec<(u16, u32)> = t.iter().map(|(_, r)| *r).collect();
        let expected: Vec<(u16, u32)> = m.iter().map(|(k, (v, _))| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_fresh_inserts_are_sequential(keys in distinct_keys(300)) {
        let mut t = LlrbTree::with_policy(Pairs::<u32, ()>::new(), small_growth());
        for (i, key) in keys.iter().enumerate() {
            let idx = t.insert((*key, ()), false).unwrap();
            prop_assert_eq!(idx.get(), i);
        }
        validate_tree(&t);

        if let Some(min) = t.minimum(None) {
            let smallest = t[min].0;
            prop_assert!(keys.iter().all(|k| smallest <= *k));
        }
    }

    #[test]
    fn prop_lru_stays_bounded(
        keys in prop::collection::vec(0u32..1000, 0..400),
        cap in 1usize..32,
    ) {
        let mut t = LlrbTree::with_policy(Pairs::<u32, ()>::new(), Lru::with_capacity(cap));
        for key in keys {
            let before = t.len();
            let present = t.contains_key(&key);
            t.insert((key, ()), false).unwrap();

            prop_assert!(t.contains_key(&key));
            prop_assert_eq!(t.capacity(), cap);
            let expected = if present { before } else { (before + 1).min(cap) };
            prop_assert_eq!(t.len(), expected);
            prop_assert_eq!(t.policy().len(), t.len());
            validate_tree(&t);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = vec![1, 3, 4, 5, 7, 8, 9];

    for_each_permutation(&keys, |perm| {
        let mut t = LlrbTree::new(Pairs::<u32, usize>::new());
        for (i, k) in perm.into_iter().enumerate() {
            assert_eq!(t.insert((k, i), true).unwrap().get(), i);
            validate_tree(&t);
        }
        let got: Vec<u32> = t.iter().map(|(_, (k, _))| *k).collect();
        assert_eq!(got, keys);
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys: Vec<u32> = vec![10, 20, 30, 40, 50, 60];

    // Insert in a fixed order, then delete in all permutations.
    let mut base = LlrbTree::new(Pairs::<u32, u32>::new());
    for k in &keys {
        base.insert((*k, *k), false).unwrap();
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut m: BTreeMap<u32, u32> = keys.iter().map(|k| (*k, *k)).collect();

        for k in perm {
            assert_eq!(t.delete(&k), m.remove(&k).is_some());
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert!(t.is_empty());
        assert!(t.root.is_nil());
        assert_eq!(t.capacity(), base.capacity());
    });
}

#[test]
fn randomized_insert_delete_find() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2);
    let mut t = LlrbTree::new(Pairs::<u32, u64>::new());
    let mut m: BTreeMap<u32, u64> = BTreeMap::new();

    for step in 0..50_000 {
        let key = rng.gen_range(0..4096);
        match rng.gen_range(0..100) {
            0..=49 => {
                let v: u64 = rng.gen();
                t.insert((key, v), true).unwrap();
                m.insert(key, v);
            }
            50..=74 => {
                assert_eq!(t.delete(&key), m.remove(&key).is_some());
            }
            _ => {
                assert_eq!(t.lookup(&key).map(|r| r.1), m.get(&key).copied());
            }
        }
        if step % 5_000 == 0 {
            validate_tree(&t);
        }
    }

    validate_tree(&t);
    let got: Vec<(u32, u64)> = t.iter().map(|(_, r)| *r).collect();
    let expected: Vec<(u32, u64)> = m.into_iter().collect();
    assert_eq!(got, expected);
}
