use moodlog::stats::MS_PER_DAY;
use moodlog::{Activity, BlobStore, Database, Mood, MoodEntry, MoodJournal, MoodStore};

fn open_db(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("data").join("moodlog.db");
    Database::new(path.to_str().expect("utf-8 path")).expect("open database")
}

#[test]
fn submitted_entry_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");

    let submitted = {
        let mut journal = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
        journal
            .submit_entry(Mood::Calm, None, [])
            .expect("first entry");
        journal
            .submit_entry(
                Mood::Excited,
                Some("got the job".into()),
                [Activity::Work, Activity::Friends],
            )
            .expect("second entry")
    };

    let store = BlobStore::new(open_db(&dir), "alice");
    let stored = store.load().expect("load");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], submitted);
    assert_eq!(stored[0].note(), Some("got the job"));
    assert_eq!(stored[0].insight(), submitted.insight());

    let reopened = MoodJournal::open(store);
    assert_eq!(reopened.history()[0].id(), submitted.id());
}

#[test]
fn users_do_not_see_each_others_entries() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut alice = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
    alice.submit_entry(Mood::Happy, None, []).expect("alice");

    let bob = MoodJournal::open(BlobStore::new(open_db(&dir), "bob"));
    assert!(bob.entries().is_empty());
}

#[test]
fn stored_blob_uses_wire_field_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut journal = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
    journal
        .submit_entry(Mood::Stressed, Some("inbox".into()), [Activity::Work])
        .expect("submit");

    let db = open_db(&dir);
    let blob = db
        .get_blob("moodEntries:alice")
        .expect("read")
        .expect("blob present");
    let value: serde_json::Value = serde_json::from_str(&blob).expect("json");
    let first = &value[0];
    for field in ["id", "mood", "note", "date", "timestamp", "activities", "insight"] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(first["mood"], "stressed");
}

#[test]
fn corrupt_blob_opens_as_empty_journal() {
    let dir = tempfile::tempdir().expect("tempdir");
    open_db(&dir)
        .put_blob("moodEntries:alice", "definitely not json")
        .expect("write");

    let mut journal = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
    assert!(journal.entries().is_empty());

    journal.submit_entry(Mood::Neutral, None, []).expect("submit");
    let stored = BlobStore::new(open_db(&dir), "alice").load().expect("load");
    assert_eq!(stored.len(), 1);
}

#[test]
fn stats_over_persisted_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = 1_760_000_000_000_i64;

    let history = vec![
        MoodEntry::new("5".into(), Mood::Happy, None, [], now - MS_PER_DAY / 2),
        MoodEntry::new("4".into(), Mood::Calm, None, [], now - 2 * MS_PER_DAY),
        MoodEntry::new("3".into(), Mood::Sad, None, [], now - 3 * MS_PER_DAY),
        MoodEntry::new("2".into(), Mood::Happy, None, [], now - 8 * MS_PER_DAY),
        MoodEntry::new("1".into(), Mood::Sad, None, [], now - 12 * MS_PER_DAY),
    ];
    BlobStore::new(open_db(&dir), "alice")
        .save(&history)
        .expect("seed");

    let journal = MoodJournal::open(BlobStore::new(open_db(&dir), "alice")).with_clock(move || now);
    let week = journal.stats(7);
    assert_eq!(week.total, 3);
    assert_eq!(week.dominant, Mood::Happy);
    assert_eq!(week.streak, 2);

    let month = journal.stats(30);
    assert_eq!(month.total, 5);
    assert_eq!(month.count(Mood::Sad), 2);
    assert_eq!(month.count(Mood::Happy), 2);
    assert_eq!(month.dominant, Mood::Happy);
}

#[test]
fn unknown_records_survive_a_new_submission() {
    let dir = tempfile::tempdir().expect("tempdir");
    open_db(&dir)
        .put_blob(
            "moodEntries:alice",
            r#"[{"mood":"bored","note":"keep me"},{"id":"1","mood":"calm","note":"","date":"","timestamp":1000}]"#,
        )
        .expect("seed");

    let mut journal = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
    assert_eq!(journal.entries().len(), 1);
    journal.submit_entry(Mood::Happy, None, []).expect("submit");

    let blob = open_db(&dir)
        .get_blob("moodEntries:alice")
        .expect("read")
        .expect("blob present");
    let records: Vec<serde_json::Value> = serde_json::from_str(&blob).expect("json");
    assert_eq!(records.len(), 3);
    assert!(records.iter().any(|r| r["note"] == "keep me"));

    let reopened = MoodJournal::open(BlobStore::new(open_db(&dir), "alice"));
    assert_eq!(reopened.entries().len(), 2);
}
