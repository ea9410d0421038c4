// EntryStore property tests (consolidated).
//
// Property 1: consing idempotence and density.
//  - Model: HashMap from pattern to the handle of its first insert.
//  - Invariant: the first insert of a pattern gets handle == number of
//    distinct patterns so far; every repeat returns the first handle;
//    len() always equals the distinct-pattern count.
//  - Operations: insert over a pattern sequence with many repeats,
//    across both hash policies and tiny initial capacities (frequent
//    rehashes).
//
// Property 2: shrink/regrow write coverage.
//  - Model: Vec of the entries currently expected live.
//  - Invariant: after any interleaving of pushes and shrinks, every
//    live handle reads back the last write that covered it, and the
//    page count is exactly the page arithmetic for the live count.
//  - Operations: push, shrink-to-random-target.
use hashcons_arena::{EntryStore, Handle, HashStrategy, Word};
use proptest::prelude::*;
use std::collections::HashMap;

// Property 1: consing idempotence and density.
proptest! {
    #[test]
    fn prop_insert_idempotent_and_dense(
        raw in proptest::collection::vec((0u64..6, 0u64..6), 1..200),
        strategy in prop_oneof![Just(HashStrategy::PrimeCycle), Just(HashStrategy::MaskedPair)],
        capacity in 1usize..4,
    ) {
        let mut s = EntryStore::new(2, 2).unwrap();
        s.attach_index_with(capacity, strategy).unwrap();
        let mut first: HashMap<Vec<Word>, Handle> = HashMap::new();

        for (a, b) in raw {
            let pattern = vec![a, b];
            let distinct_before = first.len();
            let h = s.insert(&pattern).unwrap();
            match first.get(&pattern) {
                Some(&known) => prop_assert_eq!(h, known),
                None => {
                    prop_assert_eq!(h.index(), distinct_before);
                    first.insert(pattern.clone(), h);
                }
            }
            prop_assert_eq!(s.len(), first.len());
            prop_assert_eq!(s.read(h).unwrap(), &pattern[..]);
        }

        // Every distinct pattern still resolves to its first handle.
        for (pattern, &h) in &first {
            prop_assert_eq!(s.lookup(pattern), Some(h));
            prop_assert_eq!(s.read(h).unwrap(), &pattern[..]);
        }
    }
}

// Property 2: shrink/regrow write coverage.
proptest! {
    #[test]
    fn prop_shrink_regrow_coverage(
        ops in proptest::collection::vec((any::<bool>(), 0u64..1000, 0usize..50), 1..150),
        page_log2 in 0u32..5,
    ) {
        let mut s = EntryStore::new(1, page_log2).unwrap();
        let mut model: Vec<Word> = Vec::new();

        for (push, value, raw_target) in ops {
            if push {
                let h = s.push(&[value]).unwrap();
                prop_assert_eq!(h.index(), model.len());
                model.push(value);
            } else {
                let target = raw_target % (model.len() + 1);
                s.shrink(target).unwrap();
                model.truncate(target);
            }

            prop_assert_eq!(s.len(), model.len());
            let expected_pages = if model.is_empty() {
                0
            } else {
                ((model.len() - 1) >> page_log2) + 1
            };
            prop_assert_eq!(s.page_count(), expected_pages);
            for (i, &v) in model.iter().enumerate() {
                prop_assert_eq!(s.read(Handle::from_index(i)).unwrap(), &[v]);
            }
        }
    }
}
