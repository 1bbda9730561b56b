//! Storage Module Tests
//!
//! Both stores are run through the same contract checks, then the SQLite
//! store is checked for durability across reopen.

#[cfg(test)]
mod tests {
    use crate::storage::{MemoryStore, SqliteStore, Storage};

    fn stores() -> Vec<(&'static str, Box<dyn Storage>)> {
        vec![
            ("memory", Box::new(MemoryStore::new()) as Box<dyn Storage>),
            (
                "sqlite",
                Box::new(SqliteStore::open_in_memory().unwrap()) as Box<dyn Storage>,
            ),
        ]
    }

    // ============================================================
    // CONTRACT TESTS
    // ============================================================

    #[test]
    fn test_create_assigns_increasing_ids() {
        for (name, store) in stores() {
            let first = store.create("k1", "v1").unwrap();
            let second = store.create("k2", "v2").unwrap();

            assert!(second.id > first.id, "{}: ids should be monotonic", name);
            assert_eq!(first.key, "k1");
            assert_eq!(first.value, "v1");
            assert_eq!(first.created_at, first.updated_at);
            assert!(first.deleted_at.is_none());
        }
    }

    #[test]
    fn test_find_by_key_missing_is_empty() {
        for (name, store) in stores() {
            let found = store.find_by_key("nope").unwrap();
            assert!(found.is_empty(), "{}: expected no records", name);
        }
    }

    #[test]
    fn test_find_by_key_returns_insertion_order() {
        for (name, store) in stores() {
            // Storage itself does not enforce uniqueness
            store.create("dup", "first").unwrap();
            store.create("other", "x").unwrap();
            store.create("dup", "second").unwrap();

            let values: Vec<String> = store
                .find_by_key("dup")
                .unwrap()
                .into_iter()
                .map(|r| r.value)
                .collect();

            assert_eq!(values, vec!["first", "second"], "{}", name);
        }
    }

    #[test]
    fn test_soft_delete_hides_record() {
        for (name, store) in stores() {
            let record = store.create("gone", "v").unwrap();

            let deleted = store.soft_delete(record.id).unwrap().unwrap();
            assert!(deleted.is_deleted(), "{}", name);

            assert!(store.find_by_key("gone").unwrap().is_empty(), "{}", name);
            assert_eq!(store.count().unwrap(), 0, "{}", name);

            // Row is still there for administrative reads
            let raw = store.find_by_id(record.id).unwrap().unwrap();
            assert!(raw.deleted_at.is_some(), "{}", name);

            // Deleting twice is a no-op
            assert!(store.soft_delete(record.id).unwrap().is_none(), "{}", name);
        }
    }

    #[test]
    fn test_update_value_changes_live_record_only() {
        for (name, store) in stores() {
            let record = store.create("edit", "old").unwrap();

            let updated = store.update_value(record.id, "new").unwrap().unwrap();
            assert_eq!(updated.value, "new", "{}", name);
            assert_eq!(updated.id, record.id, "{}", name);
            assert!(updated.updated_at >= record.updated_at, "{}", name);

            assert_eq!(store.find_by_key("edit").unwrap()[0].value, "new", "{}", name);

            store.soft_delete(record.id).unwrap();
            assert!(store.update_value(record.id, "again").unwrap().is_none(), "{}", name);
            assert!(store.update_value(9999, "missing").unwrap().is_none(), "{}", name);
        }
    }

    #[test]
    fn test_count_tracks_live_records() {
        for (name, store) in stores() {
            for i in 0..10 {
                store.create(&format!("key-{}", i), "v").unwrap();
            }
            let victim = store.find_by_key("key-3").unwrap().remove(0);
            store.soft_delete(victim.id).unwrap();

            assert_eq!(store.count().unwrap(), 9, "{}", name);
        }
    }

    // ============================================================
    // KEY-WIDE AND BULK OPERATIONS
    // ============================================================

    #[test]
    fn test_soft_delete_by_key_hides_every_record() {
        for (name, store) in stores() {
            store.create("dup", "first").unwrap();
            store.create("dup", "second").unwrap();
            let kept = store.create("other", "x").unwrap();

            assert_eq!(store.soft_delete_by_key("dup").unwrap(), 2, "{}", name);
            assert!(store.find_by_key("dup").unwrap().is_empty(), "{}", name);
            assert_eq!(store.count().unwrap(), 1, "{}", name);
            assert_eq!(store.find_by_key("other").unwrap(), vec![kept], "{}", name);

            // Already deleted and missing keys change nothing
            assert_eq!(store.soft_delete_by_key("dup").unwrap(), 0, "{}", name);
            assert_eq!(store.soft_delete_by_key("nope").unwrap(), 0, "{}", name);

            // The key can be written again afterwards
            let again = store.create("dup", "third").unwrap();
            assert_eq!(store.find_by_key("dup").unwrap(), vec![again], "{}", name);
        }
    }

    #[test]
    fn test_update_value_by_key_touches_live_records() {
        for (name, store) in stores() {
            let first = store.create("edit", "old").unwrap();
            let second = store.create("edit", "old").unwrap();
            store.create("other", "untouched").unwrap();
            store.soft_delete(first.id).unwrap();

            assert_eq!(store.update_value_by_key("edit", "new").unwrap(), 1, "{}", name);

            let live = store.find_by_key("edit").unwrap();
            assert_eq!(live.len(), 1, "{}", name);
            assert_eq!(live[0].id, second.id, "{}", name);
            assert_eq!(live[0].value, "new", "{}", name);

            let deleted = store.find_by_id(first.id).unwrap().unwrap();
            assert_eq!(deleted.value, "old", "{}", name);
            assert_eq!(store.find_by_key("other").unwrap()[0].value, "untouched");

            assert_eq!(store.update_value_by_key("nope", "v").unwrap(), 0, "{}", name);
        }
    }

    #[test]
    fn test_all_lists_live_records_in_id_order() {
        for (name, store) in stores() {
            assert!(store.all().unwrap().is_empty(), "{}", name);

            let a = store.create("a", "1").unwrap();
            let b = store.create("b", "2").unwrap();
            let c = store.create("c", "3").unwrap();
            store.soft_delete(b.id).unwrap();

            let ids: Vec<u64> = store.all().unwrap().into_iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![a.id, c.id], "{}", name);
        }
    }

    #[test]
    fn test_updated_after_filters_by_timestamp() {
        for (name, store) in stores() {
            let old = store.create("old", "v").unwrap();
            let fresh = store.create("fresh", "v").unwrap();
            let gone = store.create("gone", "v").unwrap();

            std::thread::sleep(std::time::Duration::from_millis(5));
            let touched = store.update_value(fresh.id, "v2").unwrap().unwrap();
            store.soft_delete(gone.id).unwrap();

            let since: Vec<u64> = store
                .updated_after(old.updated_at)
                .unwrap()
                .into_iter()
                .map(|r| r.id)
                .collect();
            assert_eq!(since, vec![fresh.id], "{}", name);

            assert!(store.updated_after(touched.updated_at).unwrap().is_empty(), "{}", name);
            assert_eq!(store.updated_after(0).unwrap().len(), 2, "{}", name);
        }
    }

    // ============================================================
    // SQLITE DURABILITY
    // ============================================================

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("a.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create("persisted", "yes").unwrap();
            let doomed = store.create("removed", "no").unwrap();
            store.soft_delete(doomed.id).unwrap();
            doomed.id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let found = reopened.find_by_key("persisted").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "yes");

        assert!(reopened.find_by_key("removed").unwrap().is_empty());
        assert!(reopened.find_by_id(id).unwrap().unwrap().is_deleted());

        // Ids keep increasing after reopen
        let next = reopened.create("later", "v").unwrap();
        assert!(next.id > id);
    }

    #[test]
    fn test_sqlite_open_fails_on_unusable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = SqliteStore::open(blocker.join("a.db"));
        assert!(result.is_err(), "opening below a regular file must fail");
    }
}
