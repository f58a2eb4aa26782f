use sqlbridge::{Connection, ConnectionConfig, Error, Value};
use std::thread;

#[test]
fn test_connect_unopenable_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("test.db");

    let err = Connection::connect(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
    assert!(err.to_string().contains("test.db"));
}

#[test]
fn test_data_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db");
    let path = path.to_str().unwrap();

    let conn = Connection::connect(path).unwrap();
    conn.execute("CREATE TABLE users (id INTEGER, name TEXT)", &[])
        .unwrap();
    conn.execute(
        "INSERT INTO users (id, name) VALUES (?, ?)",
        &[Value::Integer(1), Value::from("a")],
    )
    .unwrap();
    conn.close().unwrap();

    let conn = Connection::open_with(&ConnectionConfig::new(path).read_only(true)).unwrap();
    let result = conn.execute("SELECT name FROM users WHERE id = ?", &[Value::Integer(1)]).unwrap();
    assert_eq!(result.get(0, 0), Some(&Value::Text("a".to_string())));
    conn.close().unwrap();
}

#[test]
fn test_drop_without_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.db");
    let path = path.to_str().unwrap();

    {
        let conn = Connection::connect(path).unwrap();
        conn.execute("CREATE TABLE t (x INTEGER)", &[]).unwrap();
    }

    // The file is released and fully usable by the next connection
    let conn = Connection::connect(path).unwrap();
    conn.execute("INSERT INTO t VALUES (?)", &[Value::Integer(5)])
        .unwrap();
    conn.close().unwrap();
}

#[test]
fn test_independent_connections_on_threads() {
    let dir = tempfile::tempdir().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let path = dir.path().join(format!("thread-{}.db", n));
            thread::spawn(move || {
                let conn = Connection::connect(path.to_str().unwrap()).unwrap();
                conn.execute("CREATE TABLE t (n INTEGER)", &[]).unwrap();
                for i in 0..10 {
                    conn.execute("INSERT INTO t VALUES (?)", &[Value::Integer(n * 100 + i)])
                        .unwrap();
                }
                let result = conn.execute("SELECT sum(n) FROM t", &[]).unwrap();
                conn.close().unwrap();
                result.get(0, 0).cloned()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let n = n as i64;
        let expected = (0..10).map(|i| n * 100 + i).sum::<i64>();
        assert_eq!(handle.join().unwrap(), Some(Value::Integer(expected)));
    }
}

#[test]
fn test_connection_moves_to_another_thread() {
    let conn = Connection::connect(":memory:").unwrap();
    conn.execute("CREATE TABLE t (x TEXT)", &[]).unwrap();

    let conn = thread::spawn(move || {
        conn.execute("INSERT INTO t VALUES (?)", &[Value::from("moved")])
            .unwrap();
        conn
    })
    .join()
    .unwrap();

    let result = conn.execute("SELECT x FROM t", &[]).unwrap();
    assert_eq!(result.get(0, 0), Some(&Value::Text("moved".to_string())));
    conn.close().unwrap();
}
