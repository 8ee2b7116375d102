// =====================================================================
// File: scenarios.rs
//
// Description:
//   Black-box end-to-end scenarios against the public tree API: basic
//   put/get/del, overwrite, growth past a single node, bulk delete, and
//   interleaved writes. No internal module is touched here.
// =====================================================================

use buftree::{Options, Tree};

fn new_tree() -> Tree<String, String, impl buftree::Comparator<String>> {
    Tree::create(Options::new(|a: &String, b: &String| a.cmp(b))).unwrap()
}

#[test]
fn basic_put_get_del() {
    let mut t = new_tree();
    t.put("apple".into(), "1".into());
    t.put("banana".into(), "2".into());
    t.put("cherry".into(), "3".into());

    assert_eq!(t.get(&"banana".to_string()), Some(&"2".to_string()));
    assert_eq!(t.get(&"date".to_string()), None);

    t.del("banana".to_string());
    assert_eq!(t.get(&"banana".to_string()), None);
    assert_eq!(t.get(&"apple".to_string()), Some(&"1".to_string()));
}

#[test]
fn overwrite_last_writer_wins() {
    let mut t = new_tree();
    t.put("k".into(), "a".into());
    t.put("k".into(), "b".into());
    assert_eq!(t.get(&"k".to_string()), Some(&"b".to_string()));
}

#[test]
fn growth_beyond_one_node() {
    let mut t = new_tree();
    for i in 0..10_000u32 {
        let key = format!("key{i:04}");
        let value = format!("val{i:04}");
        t.put(key, value);
    }
    for i in 0..10_000u32 {
        let key = format!("key{i:04}");
        let expected = format!("val{i:04}");
        assert_eq!(t.get(&key), Some(&expected));
    }
    assert!(t.height() >= 2);
}

#[test]
fn bulk_delete_after_growth() {
    let mut t = new_tree();
    for i in 0..10_000u32 {
        t.put(format!("key{i:04}"), format!("val{i:04}"));
    }
    let height_after_insert = t.height();
    for i in 0..10_000u32 {
        t.del(format!("key{i:04}"));
    }
    for i in 0..10_000u32 {
        assert_eq!(t.get(&format!("key{i:04}")), None);
    }
    assert!(t.height() >= height_after_insert, "height must never shrink on delete");
}

#[test]
fn interleaved_put_del() {
    let mut t = new_tree();
    t.put("a".into(), "1".into());
    t.del("a".to_string());
    t.put("a".into(), "2".into());
    assert_eq!(t.get(&"a".to_string()), Some(&"2".to_string()));

    t.put("b".into(), "1".into());
    t.put("c".into(), "1".into());
    t.del("b".to_string());
    assert_eq!(t.get(&"b".to_string()), None);
    assert_eq!(t.get(&"c".to_string()), Some(&"1".to_string()));
}

#[test]
fn destructor_accounting_across_growth_and_deletion() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let key_calls = Rc::new(RefCell::new(0usize));
    let value_calls = Rc::new(RefCell::new(0usize));
    let key_calls_cl = key_calls.clone();
    let value_calls_cl = value_calls.clone();

    let opts = Options::new(|a: &String, b: &String| a.cmp(b))
        .with_key_destructor(move |_k: String| *key_calls_cl.borrow_mut() += 1)
        .with_value_destructor(move |_v: String| *value_calls_cl.borrow_mut() += 1);
    let mut t = Tree::create(opts).unwrap();

    for i in 0..10_000u32 {
        t.put(format!("key{i:04}"), format!("val{i:04}"));
    }
    for i in 0..10_000u32 {
        t.del(format!("key{i:04}"));
    }
    t.destroy();

    assert_eq!(*key_calls.borrow(), 20_000);
    assert_eq!(*value_calls.borrow(), 10_000);
}
