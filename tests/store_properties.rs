//! Property tests for the history store invariants
//!
//! For any sequence of operations the store must keep entry texts unique,
//! keep the inverted index consistent in both directions, and keep pages
//! strictly id-descending.

use std::collections::HashSet;

use proptest::prelude::*;

use clipdex::history::HistoryStore;

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Promote(String),
    DeleteText(String),
    DeleteIds(Vec<u64>),
    Clear,
}

fn text_strategy() -> impl Strategy<Value = String> {
    // Small alphabet so inserts, promotes and deletes collide often
    proptest::collection::vec("[a-d]{1,4}", 1..4).prop_map(|words| words.join(" "))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => text_strategy().prop_map(Op::Insert),
        2 => text_strategy().prop_map(Op::Promote),
        2 => text_strategy().prop_map(Op::DeleteText),
        1 => proptest::collection::vec(1u64..50, 0..4).prop_map(Op::DeleteIds),
        1 => Just(Op::Clear),
    ]
}

fn apply(store: &mut HistoryStore, op: Op) {
    match op {
        Op::Insert(text) => {
            // Duplicate inserts are expected to fail; that is the contract
            let _ = store.insert(text);
        }
        Op::Promote(text) => {
            store.delete_by_text(&text);
            store
                .insert(text)
                .expect("insert after delete cannot conflict");
        }
        Op::DeleteText(text) => {
            store.delete_by_text(&text);
        }
        Op::DeleteIds(ids) => {
            store.delete_by_ids(&ids.into_iter().collect());
        }
        Op::Clear => store.clear(),
    }
}

proptest! {
    #[test]
    fn store_invariants_hold_under_any_op_sequence(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let mut store = HistoryStore::new();

        for op in ops {
            apply(&mut store, op);

            // Index and store agree in both directions
            store.check_consistency().unwrap();

            // No two live entries share text
            let entries = store.export_all(true);
            let texts: HashSet<&str> = entries.iter().map(|e| e.text.as_str()).collect();
            prop_assert_eq!(texts.len(), entries.len());
            prop_assert_eq!(store.count() as usize, entries.len());
        }
    }

    #[test]
    fn pages_are_strictly_id_descending(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut store = HistoryStore::new();
        for op in ops {
            apply(&mut store, op);
        }

        let mut seen = Vec::new();
        let mut page = 0;
        loop {
            let items = store.page(page, 9);
            if items.is_empty() {
                break;
            }
            seen.extend(items.iter().map(|e| e.id));
            page += 1;
        }

        prop_assert_eq!(seen.len(), store.count() as usize);
        prop_assert!(seen.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn ids_are_never_reused(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut store = HistoryStore::new();
        let mut issued = HashSet::new();

        for op in ops {
            let before: HashSet<u64> = store.export_all(true).iter().map(|e| e.id).collect();
            apply(&mut store, op);
            let after: HashSet<u64> = store.export_all(true).iter().map(|e| e.id).collect();

            for id in after.difference(&before) {
                prop_assert!(issued.insert(*id), "id {} was issued twice", id);
            }
        }
    }
}
