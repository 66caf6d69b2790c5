#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;

use codemodel::project::{DependencyFile, RetryConfig};
use tempfile::TempDir;

#[test]
fn test_concurrent_writers_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let deps = Arc::new(
        DependencyFile::new(dir.path().join("build.deps")).with_retry(RetryConfig::new(200, 1, 10)),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let deps = Arc::clone(&deps);
            thread::spawn(move || {
                for j in 0..5 {
                    deps.update_at(
                        &format!("src/file{i}_{j}.cpp"),
                        100 + j,
                        &[format!("src/common{i}.h")],
                    )
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = deps.read().unwrap();
    assert_eq!(entries.len(), 40);
    assert!(!deps.lock_path().exists());
    assert_eq!(deps.dependents_of("src/common3.h").unwrap().len(), 5);
}

#[test]
fn test_stale_after_touch() {
    let dir = TempDir::new().unwrap();
    let deps = DependencyFile::new(dir.path().join("build.deps"));
    deps.update(
        "src/widget.cpp",
        &["src/widget.h".to_string()],
    )
    .unwrap();

    let entry = deps.read().unwrap()["src/widget.cpp"].clone();
    assert!(!deps.is_stale("src/widget.cpp", entry.parsed_at).unwrap());
    assert!(deps.is_stale("src/widget.cpp", entry.parsed_at + 1).unwrap());
    assert!(deps.is_stale("src/canvas.cpp", 0).unwrap());
}
