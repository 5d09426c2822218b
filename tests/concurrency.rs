use salon_store::persist::load;
use salon_store::serializer::JsonSerializer;
use salon_store::RecordStore;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("salon_store_concurrency_{}.json", name))
}

fn obj(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

#[test]
fn two_simultaneous_appointments_both_persist() {
    let path = temp_path("two");
    let _ = std::fs::remove_file(&path);
    let db = Arc::new(RecordStore::open(&path).unwrap());

    let handles: Vec<_> = ["Ana", "Bo"]
        .into_iter()
        .map(|who| {
            let db = Arc::clone(&db);
            thread::spawn(move || db.create_appointment(obj(json!({"who": who}))).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.list_appointments().len(), 2);
    let on_disk = load(&path, &JsonSerializer::pretty()).unwrap();
    assert_eq!(on_disk.appointments.len(), 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn many_writers_lose_nothing_on_disk() {
    let path = temp_path("many");
    let _ = std::fs::remove_file(&path);
    let db = Arc::new(RecordStore::open(&path).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..10 {
                    db.create_appointment(obj(json!({"thread": t, "n": i}))).unwrap();
                    if i % 3 == 0 {
                        db.create_user(obj(json!({"thread": t}))).unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mem = db.snapshot();
    assert_eq!(mem.appointments.len(), 80);
    assert_eq!(mem.users.len(), 32);

    let on_disk = load(&path, &JsonSerializer::pretty()).unwrap();
    assert_eq!(on_disk, mem);

    let ids: HashSet<String> = on_disk
        .appointments
        .iter()
        .map(|a| a.id().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 80);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn concurrent_registration_of_one_email_admits_exactly_one() {
    let path = temp_path("register_race");
    let _ = std::fs::remove_file(&path);
    let db = Arc::new(RecordStore::open(&path).unwrap());

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                db.register_user(&format!("user{i}"), "same@example.com", "pw")
                    .is_ok()
            })
        })
        .collect();
    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(wins, 1);
    assert_eq!(db.list_users().len(), 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn readers_run_alongside_writers() {
    let path = temp_path("readers");
    std::fs::write(&path, r#"{"services": [{"id": 1, "name": "Cut"}]}"#).unwrap();
    let db = Arc::new(RecordStore::open(&path).unwrap());

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for _ in 0..20 {
                db.create_appointment(Map::new()).unwrap();
            }
        })
    };
    let reader = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..200 {
                assert_eq!(db.get_service("1").unwrap().str_field("name"), Some("Cut"));
                let now = db.list_appointments().len();
                assert!(now >= last);
                last = now;
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(db.list_appointments().len(), 20);
    let _ = std::fs::remove_file(&path);
}
