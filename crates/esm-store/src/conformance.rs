// ABOUTME: Shared behavioural checks run against every RecordStore backend in unit tests.
// ABOUTME: Each backend's test module calls these with a freshly opened store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use esm_core::{Counts, VlogRecord};

use crate::store::RecordStore;

pub fn ids_are_unique<S: RecordStore>(store: &S) {
    let ids: Vec<_> = (0..20)
        .map(|i| store.insert_sentiment(i % 5 + 1, 3, 3).unwrap().id)
        .collect();
    let distinct: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), ids.len());

    // Strictly increasing with insertion order.
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

pub fn lists_newest_first<S: RecordStore>(store: &S) {
    for path in ["one.mp4", "two.mp4", "three.mp4"] {
        store.insert_vlog(path).unwrap();
    }
    store.insert_location(1.0, 1.0).unwrap();
    store.insert_location(2.0, 2.0).unwrap();

    let vlogs = store.list_vlogs().unwrap();
    let paths: Vec<_> = vlogs.iter().map(|v| v.file_path.as_str()).collect();
    assert_eq!(paths, vec!["three.mp4", "two.mp4", "one.mp4"]);
    assert!(vlogs.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let newest = store.insert_vlog("four.mp4").unwrap();
    assert_eq!(store.list_vlogs().unwrap()[0], newest);

    let locations = store.list_locations().unwrap();
    assert_eq!(locations[0].latitude, 2.0);
    assert_eq!(locations[1].latitude, 1.0);

    assert!(store.list_sentiments().unwrap().is_empty());
}

pub fn rejects_invalid_input_without_writing<S: RecordStore>(store: &S) {
    store.insert_sentiment(3, 3, 3).unwrap();
    store.insert_location(10.0, 10.0).unwrap();
    let before = store.counts().unwrap();

    assert!(store.insert_sentiment(0, 3, 3).unwrap_err().is_invalid_argument());
    assert!(store.insert_sentiment(6, 3, 3).unwrap_err().is_invalid_argument());
    assert!(store.insert_sentiment(3, 3, 9).unwrap_err().is_invalid_argument());
    assert!(store.insert_location(91.0, 0.0).unwrap_err().is_invalid_argument());
    assert!(store.insert_location(0.0, 181.0).unwrap_err().is_invalid_argument());
    assert!(store.insert_location(f64::NAN, 0.0).unwrap_err().is_invalid_argument());
    assert!(store.insert_vlog("").unwrap_err().is_invalid_argument());

    assert_eq!(store.counts().unwrap(), before);

    // Rejected inserts do not consume ids.
    let next = store.insert_sentiment(2, 2, 2).unwrap();
    assert_eq!(next.id, store.list_sentiments().unwrap()[1].id + 1);
}

pub fn clear_then_insert_does_not_reuse_ids<S: RecordStore>(store: &S) {
    let old_sentiment = store.insert_sentiment(1, 1, 1).unwrap();
    let old_location = store.insert_location(5.0, 5.0).unwrap();
    let old_vlog = store.insert_vlog("old.mp4").unwrap();

    store.clear_all().unwrap();
    assert!(store.list_sentiments().unwrap().is_empty());
    assert!(store.list_locations().unwrap().is_empty());
    assert!(store.list_vlogs().unwrap().is_empty());
    assert_eq!(store.counts().unwrap(), Counts::default());

    let fresh = store.insert_sentiment(5, 5, 5).unwrap();
    assert!(fresh.id > old_sentiment.id);
    assert!(store.insert_location(6.0, 6.0).unwrap().id > old_location.id);
    assert!(store.insert_vlog("new.mp4").unwrap().id > old_vlog.id);
    assert_eq!(store.list_sentiments().unwrap(), vec![fresh]);
}

pub fn insert_returns_what_list_reads<S: RecordStore>(store: &S) {
    let sentiment = store.insert_sentiment(4, 5, 2).unwrap();
    let location = store.insert_location(25.03, 121.56).unwrap();
    let vlog = store.insert_vlog("/data/vlogs/vlog_1.mp4").unwrap();

    assert_eq!(
        (sentiment.mood, sentiment.energy, sentiment.stress),
        (4, 5, 2)
    );
    assert_eq!(store.list_sentiments().unwrap(), vec![sentiment]);
    assert_eq!(store.list_locations().unwrap(), vec![location]);
    assert_eq!(store.list_vlogs().unwrap(), vec![vlog]);
}

pub fn concurrent_inserts_never_collide<S: RecordStore + 'static>(store: S) {
    let store = Arc::new(store);
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        if t % 2 == 0 {
                            store.insert_sentiment((i % 5) + 1, 1, 1).unwrap().id
                        } else {
                            store.insert_vlog(&format!("t{t}_{i}.mp4")).unwrap().id
                        }
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut sentiment_ids = HashSet::new();
    let mut vlog_ids = HashSet::new();
    for (t, handle) in handles.into_iter().enumerate() {
        let target = if t % 2 == 0 {
            &mut sentiment_ids
        } else {
            &mut vlog_ids
        };
        for id in handle.join().unwrap() {
            assert!(target.insert(id), "duplicate id {id}");
        }
    }

    assert_eq!(store.list_sentiments().unwrap().len(), 20);
    assert_eq!(store.list_vlogs().unwrap().len(), 20);
}

/// Lists taken while writers race must hold only committed records, in
/// id order matching timestamp order.
pub fn lists_stay_ordered_under_concurrent_writes<S: RecordStore + 'static>(store: S) {
    fn assert_ordered(vlogs: &[VlogRecord]) {
        for w in vlogs.windows(2) {
            assert!(
                w[0].id > w[1].id,
                "id {} listed before id {}",
                w[0].id,
                w[1].id
            );
            assert!(w[0].created_at >= w[1].created_at);
        }
    }

    let store = Arc::new(store);
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut snapshots = Vec::new();
            while !done.load(Ordering::Acquire) {
                let vlogs = store.list_vlogs().unwrap();
                assert_ordered(&vlogs);
                snapshots.push(vlogs);
            }
            snapshots
        })
    };

    let writers: Vec<_> = (0..6)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|i| store.insert_vlog(&format!("w{t}_{i}.mp4")).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut written = HashMap::new();
    for handle in writers {
        for record in handle.join().unwrap() {
            written.insert(record.id, record);
        }
    }
    done.store(true, Ordering::Release);
    let snapshots = reader.join().unwrap();

    for vlogs in &snapshots {
        for seen in vlogs {
            assert_eq!(written.get(&seen.id), Some(seen), "partial or unknown record");
        }
    }

    let all = store.list_vlogs().unwrap();
    assert_eq!(all.len(), 150);
    assert_ordered(&all);
    for record in &all {
        assert_eq!(written.get(&record.id), Some(record));
    }
}
