use std::cmp::Ordering;
use std::ops::Bound;
use std::time::{SystemTime, UNIX_EPOCH};

use log::LevelFilter;
use rand::prelude::random;
use rand::{rngs::SmallRng, SeedableRng};
use simplelog::{Config, TestLogger};

use crate::error::Error;
use crate::llrb::Llrb;
use crate::node::{Link, Node};

const SCENARIO: [i64; 7] = [5, 3, 8, 1, 4, 7, 9];

type Tree = Llrb<i64, i64>;

fn scenario_tree() -> Llrb<i64, i64> {
    let mut llrb = Llrb::new("scenario");
    for key in SCENARIO.iter() {
        assert!(llrb.put(*key, key * 10).is_none());
    }
    llrb
}

#[test]
fn test_id() {
    let llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    assert_eq!(llrb.id(), "test-llrb".to_string());
}

#[test]
fn test_len() {
    let llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    assert_eq!(llrb.len(), 0);
    assert!(llrb.is_empty());
    assert_eq!(llrb.height(), 0);

    let llrb = Llrb::with_root("test-llrb", 10_i64, 100_i64);
    assert_eq!(llrb.len(), 1);
    assert_eq!(llrb.get(&10), Some(&100));
    assert!(llrb.validate().is_ok());
}

#[test]
fn test_scenario_traversal() {
    let llrb = scenario_tree();
    assert_eq!(llrb.get(&4), Some(&40));
    assert_eq!(llrb.get(&6), None);
    let keys: Vec<i64> = llrb.keys().cloned().collect();
    assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
    let values: Vec<i64> = llrb.values().cloned().collect();
    assert_eq!(values, vec![10, 30, 40, 50, 70, 80, 90]);
    assert!(llrb.validate().is_ok());
}

#[test]
fn test_scenario_rank_floor() {
    let llrb = scenario_tree();
    assert_eq!(llrb.rank(&8), 5);
    assert_eq!(llrb.rank(&0), 0);
    assert_eq!(llrb.rank(&6), 4);
    assert_eq!(llrb.rank(&100), 7);
    assert_eq!(llrb.floor(&6), Some(&5));
    assert_eq!(llrb.floor(&0), None);
    assert_eq!(llrb.floor(&9), Some(&9));
    assert_eq!(llrb.floor(&100), Some(&9));
    assert_eq!(llrb.ceiling(&6), Some(&7));
    assert_eq!(llrb.ceiling(&10), None);
    assert_eq!(llrb.ceiling(&0), Some(&1));
    for (i, key) in llrb.keys().enumerate() {
        assert_eq!(llrb.rank(key), i);
        assert_eq!(llrb.floor(key), Some(key));
        assert_eq!(llrb.select(i).map(|(k, _)| k), Some(key));
    }
    assert_eq!(llrb.select(7), None);
    assert_eq!(llrb.min(), Some((&1, &10)));
    assert_eq!(llrb.max(), Some((&9, &90)));
}

#[test]
fn test_ascending_height() {
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    for key in 1..=1000 {
        llrb.put(key, key);
    }
    assert_eq!(llrb.len(), 1000);
    // 2 * ceil(log2(1001))
    assert!(llrb.height() <= 20, "height {}", llrb.height());

    let stats = llrb.validate().unwrap();
    assert_eq!(stats.entries(), 1000);
    assert_eq!(stats.height(), Some(llrb.height()));
    assert!(stats.blacks().unwrap() > 0);
    let depths = stats.depths().unwrap();
    assert_eq!(depths.samples(), 1001);
    assert_eq!(depths.max(), llrb.height());
}

#[test]
fn test_overwrite() {
    let mut llrb = scenario_tree();
    for value in 0..100 {
        llrb.put(4, value);
        assert_eq!(llrb.len(), 7);
        assert_eq!(llrb.get(&4), Some(&value));
    }
    assert_eq!(llrb.put(4, 1000), Some(99));
    assert!(llrb.validate().is_ok());
}

#[test]
fn test_create() {
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    let mut refns = RefNodes::new(10);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(llrb.create(*key, 10).is_ok());
        assert!(refns.create(*key, 10));
    }

    assert_eq!(llrb.len(), 10);
    assert!(llrb.validate().is_ok());

    // error case
    assert_eq!(llrb.create(7, 20), Err(Error::OverwriteKey));
    assert_eq!(llrb.get(&7), Some(&10));
    assert_eq!(llrb.len(), 10);

    // test get
    for i in 0..10 {
        assert_eq!(llrb.get(&i).cloned(), refns.get(i));
    }
    // test iter
    let items: Vec<(i64, i64)> = llrb.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(items, refns.iter().collect::<Vec<(i64, i64)>>());
}

#[test]
fn test_load_from() {
    let llrb = Llrb::load_from("test-llrb", (0..100_i64).map(|i| (i, -i))).unwrap();
    assert_eq!(llrb.len(), 100);
    assert!(llrb.validate().is_ok());

    let entries = vec![(1_i64, 1_i64), (2, 2), (1, 3)];
    match Llrb::load_from("test-llrb", entries.into_iter()) {
        Err(Error::OverwriteKey) => (),
        Err(err) => panic!("unexpected {:?}", err),
        Ok(_) => panic!("expected duplicate key error"),
    }
}

#[test]
fn test_random() {
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());

    assert_eq!(llrb.random(&mut rng), None);

    llrb.put(0, 0);
    assert_eq!(llrb.random(&mut rng), Some((&0, &0)));

    for key in 1..10_000 {
        assert!(llrb.put(key, key * 10).is_none());
    }
    for _i in 0..20_000 {
        let (key, value) = llrb.random(&mut rng).unwrap();
        assert!(*key >= 0 && *key < 10_000);
        assert_eq!(*value, key * 10);
    }
}

#[test]
fn test_delete() {
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    let mut refns = RefNodes::new(11);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(llrb.put(*key, 100).is_none());
        refns.set(*key, 100);
    }

    // delete a missing node.
    assert!(llrb.remove(&10).is_none());
    assert!(refns.delete(10).is_none());

    assert_eq!(llrb.len(), 10);
    assert!(llrb.validate().is_ok());

    // delete all entry.
    for i in 0..10 {
        assert_eq!(llrb.remove(&i), refns.delete(i));
        assert!(llrb.validate().is_ok());
        assert_eq!(llrb.len(), refns.len());
    }
    assert_eq!(llrb.len(), 0);
    assert!(llrb.validate().is_ok());
    assert!(llrb.iter().next().is_none());

    // and the tree is reusable.
    llrb.put(3, 30);
    assert_eq!(llrb.get(&3), Some(&30));
}

#[test]
fn test_delete_min_max() {
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    assert_eq!(llrb.remove_min(), Err(Error::Empty));
    assert_eq!(llrb.remove_max(), Err(Error::Empty));

    let mut refns = RefNodes::new(1000);
    for _ in 0..500 {
        let key = (random::<u64>() % 1000) as i64;
        llrb.put(key, key + 1);
        refns.set(key, key + 1);
    }

    while !llrb.is_empty() {
        let (item, ref_item) = if random::<bool>() {
            (llrb.remove_min(), refns.delete_min())
        } else {
            (llrb.remove_max(), refns.delete_max())
        };
        assert_eq!(item.ok(), ref_item);
        assert_eq!(llrb.len(), refns.len());
        assert!(llrb.validate().is_ok());
    }
    assert_eq!(refns.len(), 0);
    assert_eq!(llrb.remove_min(), Err(Error::Empty));
}

#[test]
fn test_get_mut() {
    let mut llrb = scenario_tree();
    if let Some(value) = llrb.get_mut(&7) {
        *value += 1;
    }
    assert_eq!(llrb.get(&7), Some(&71));
    assert!(llrb.get_mut(&6).is_none());
    assert!(llrb.contains_key(&7));
    assert!(!llrb.contains_key(&6));
}

#[test]
fn test_range() {
    let llrb = scenario_tree();

    let keys: Vec<i64> = llrb.range(3..8).map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![3, 4, 5, 7]);
    let keys: Vec<i64> = llrb.range(2..=8).rev().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![8, 7, 5, 4, 3]);
    let keys: Vec<i64> = llrb.range(6..).map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![7, 8, 9]);
    assert_eq!(llrb.range(..5).len(), 3);
    assert_eq!(llrb.range(8..3).count(), 0);
    assert_eq!(llrb.range(10..).count(), 0);

    // consume from both ends.
    let mut iter = llrb.iter();
    assert_eq!(iter.len(), 7);
    assert_eq!(iter.next(), Some((&1, &10)));
    assert_eq!(iter.next_back(), Some((&9, &90)));
    assert_eq!(iter.next_back(), Some((&8, &80)));
    assert_eq!(iter.len(), 4);
    let rest: Vec<i64> = iter.map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![3, 4, 5, 7]);
}

#[test]
fn test_comparator() {
    let mut llrb = Llrb::with_cmp("reverse", |a: &i64, b: &i64| b.cmp(a));
    for key in SCENARIO.iter() {
        llrb.put(*key, *key);
    }
    let keys: Vec<i64> = llrb.keys().cloned().collect();
    assert_eq!(keys, vec![9, 8, 7, 5, 4, 3, 1]);
    // rank and floor follow the comparator, not the natural order.
    assert_eq!(llrb.rank(&8), 1);
    assert_eq!(llrb.floor(&6), Some(&7));
    assert!(llrb.validate().is_ok());

    let mut llrb = Llrb::with_cmp("strings", |a: &String, b: &String| {
        match a.len().cmp(&b.len()) {
            Ordering::Equal => a.cmp(b),
            ord => ord,
        }
    });
    for word in ["pear", "fig", "banana", "kiwi", "apple"].iter() {
        llrb.put(word.to_string(), word.len());
    }
    let keys: Vec<&str> = llrb.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["fig", "kiwi", "pear", "apple", "banana"]);
    assert_eq!(llrb.get(&"kiwi".to_string()), Some(&4));
}

#[test]
fn test_clear_clone() {
    let mut llrb = scenario_tree();
    let other = llrb.clone();
    llrb.clear();
    assert!(llrb.is_empty());
    assert_eq!(other.len(), 7);
    assert_eq!(format!("{:?}", other), "{1: 10, 3: 30, 4: 40, 5: 50, 7: 70, 8: 80, 9: 90}");
    assert!(other.validate().is_ok());
}

#[test]
fn test_crud() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());

    let size = 1000;
    let mut llrb: Llrb<i64, i64> = Llrb::new("test-llrb");
    let mut refns = RefNodes::new(size);

    for _ in 0..20_000 {
        let key: i64 = (random::<i64>() % (size as i64)).abs();
        let value: i64 = random();
        let op: i64 = (random::<i64>() % 6).abs();
        match op {
            0 => {
                let ok1 = refns.create(key, value);
                let ok2 = llrb.create(key, value).is_ok();
                assert_eq!(ok1, ok2);
            }
            1 => {
                let val = llrb.put(key, value);
                let refval = refns.set(key, value);
                assert_eq!(val, refval);
            }
            2 => {
                let val = llrb.remove(&key);
                let refval = refns.delete(key);
                assert_eq!(val, refval);
            }
            3 => {
                assert_eq!(llrb.get(&key).cloned(), refns.get(key));
            }
            4 => {
                assert_eq!(llrb.floor(&key).cloned(), refns.floor(key));
                assert_eq!(llrb.ceiling(&key).cloned(), refns.ceiling(key));
            }
            5 => {
                assert_eq!(llrb.rank(&key), refns.rank(key));
                let item = llrb.select(key as usize).map(|(k, v)| (*k, *v));
                assert_eq!(item, refns.select(key as usize));
            }
            op => panic!("unreachable {}", op),
        };

        assert_eq!(llrb.len(), refns.len());
        if let Err(err) = llrb.validate() {
            panic!("invalid tree after op {}: {}", op, err);
        }
    }

    // test iter
    let items: Vec<(i64, i64)> = llrb.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(items, refns.iter().collect::<Vec<(i64, i64)>>());

    // ranges and reverses
    for _ in 0..1_000 {
        let (low, high) = random_low_high(size);

        let items: Vec<(i64, i64)> = llrb.range((low, high)).map(|(k, v)| (*k, *v)).collect();
        let ref_items: Vec<(i64, i64)> = refns.range(low, high).collect();
        assert_eq!(items, ref_items, "range {:?} {:?}", low, high);

        let items: Vec<(i64, i64)> = llrb
            .range((low, high))
            .rev()
            .map(|(k, v)| (*k, *v))
            .collect();
        let ref_items: Vec<(i64, i64)> = refns.range(low, high).rev().collect();
        assert_eq!(items, ref_items, "reverse {:?} {:?}", low, high);
    }
}


// hand wired node, size computed from the children.
fn wire(key: i64, black: bool, left: Link<i64, i64>, right: Link<i64, i64>) -> Link<i64, i64> {
    let mut node = Node::new(key, key * 10, black);
    node.left = left;
    node.right = right;
    node.update_size();
    Some(node)
}

fn with_root(root: Link<i64, i64>) -> Tree {
    let mut llrb: Tree = Llrb::new("test-llrb");
    llrb.root = root;
    llrb
}

#[test]
fn test_rotate_left() {
    let node = wire(2, true, wire(1, true, None, None), wire(4, false, wire(3, true, None, None), None));
    let node = node.unwrap();
    let x = Tree::rotate_left(node);
    assert_eq!(x.key, 4);
    assert!(x.is_black());
    assert_eq!(x.size, 4);
    let left = x.left_deref().unwrap();
    assert_eq!((left.key, left.is_black(), left.size), (2, false, 3));
    assert_eq!(left.right_deref().map(|n| n.key), Some(3));
}

#[test]
#[should_panic]
fn test_rotate_left_black() {
    let node = wire(2, true, None, wire(4, true, None, None));
    Tree::rotate_left(node.unwrap());
}

#[test]
#[should_panic]
fn test_rotate_left_missing() {
    let node = wire(2, true, wire(1, false, None, None), None);
    Tree::rotate_left(node.unwrap());
}

#[test]
#[should_panic]
fn test_rotate_right_black() {
    let node = wire(2, true, wire(1, true, None, None), None);
    Tree::rotate_right(node.unwrap());
}

#[test]
fn test_flip_colors() {
    let mut node = wire(2, true, wire(1, false, None, None), wire(3, false, None, None)).unwrap();
    Tree::flip_colors(&mut node);
    assert!(!node.is_black());
    assert!(node.left_deref().unwrap().is_black());
    assert!(node.right_deref().unwrap().is_black());
}

#[test]
#[should_panic]
fn test_flip_colors_red_node() {
    let mut node = wire(2, false, wire(1, false, None, None), wire(3, false, None, None)).unwrap();
    Tree::flip_colors(&mut node);
}

#[test]
#[should_panic]
fn test_flip_colors_black_child() {
    let mut node = wire(2, true, wire(1, false, None, None), wire(3, true, None, None)).unwrap();
    Tree::flip_colors(&mut node);
}

#[test]
fn test_validate_red_root() {
    let llrb = with_root(wire(5, false, None, None));
    assert_eq!(llrb.validate().err(), Some(Error::RedRoot));
}

#[test]
fn test_validate_right_red() {
    let llrb = with_root(wire(5, true, None, wire(8, false, None, None)));
    assert_eq!(llrb.validate().err(), Some(Error::RightRed));
}

#[test]
fn test_validate_consecutive_reds() {
    let left = wire(3, false, wire(1, false, None, None), None);
    let llrb = with_root(wire(5, true, left, wire(8, true, None, None)));
    assert_eq!(llrb.validate().err(), Some(Error::ConsecutiveReds));
}

#[test]
fn test_validate_unbalanced_blacks() {
    let llrb = with_root(wire(5, true, wire(3, true, None, None), None));
    match llrb.validate() {
        Err(Error::UnbalancedBlacks(_)) => (),
        res => panic!("expected unbalanced blacks, got {:?}", res.err()),
    }
}

#[test]
fn test_validate_size_mismatch() {
    let mut llrb = with_root(wire(5, true, wire(3, false, None, None), None));
    assert!(llrb.validate().is_ok());
    if let Some(root) = llrb.root.as_mut() {
        root.size = 5;
    }
    assert_eq!(llrb.validate().err(), Some(Error::SizeMismatch(5, 2)));
}

#[test]
fn test_validate_sort_error() {
    // colors and sizes hold, keys are out of order.
    let llrb = with_root(wire(5, true, wire(8, false, None, None), None));
    assert_eq!(llrb.validate().err(), Some(Error::SortError(8, 5)));
}

include!("./ref_test.rs");
