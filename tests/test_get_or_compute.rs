//! Tests for the memoization wrapper on `TtlCache`.

use pitch_cache::{CacheObserver, CacheOutcome, TtlCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct RecordingObserver {
    outcomes: Mutex<Vec<CacheOutcome>>,
}

impl RecordingObserver {
    fn outcomes(&self) -> Vec<CacheOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl CacheObserver for RecordingObserver {
    fn on_access(&self, _cache: &str, _key: &str, outcome: CacheOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

#[tokio::test]
async fn test_cold_cache_computes_once_then_hits() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_compute("k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(1)
        })
        .await;
    let second = cache
        .get_or_compute("k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(2)
        })
        .await;

    assert_eq!(first, Ok(1));
    assert_eq!(second, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recomputes_after_ttl_expiry() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let ttl = Duration::from_millis(20);
    let calls = AtomicUsize::new(0);

    let compute = || async {
        Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst) as u32)
    };

    assert_eq!(cache.get_or_compute_with_ttl("k", ttl, compute).await, Ok(0));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cache.get_or_compute_with_ttl("k", ttl, compute).await, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_propagates_and_writes_nothing() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));

    let result = cache
        .get_or_compute("k", || async { Err::<u32, _>(anyhow::anyhow!("model overloaded")) })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "model overloaded");
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_failure_type_is_preserved() {
    #[derive(Debug, PartialEq)]
    enum UpstreamError {
        RateLimited { retry_after: u64 },
    }

    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let result = cache
        .get_or_compute("k", || async {
            Err(UpstreamError::RateLimited { retry_after: 30 })
        })
        .await;

    assert_eq!(result, Err(UpstreamError::RateLimited { retry_after: 30 }));
}

#[tokio::test]
async fn test_failure_leaves_other_entries_untouched() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    cache.set("other", 7);

    let _ = cache
        .get_or_compute("k", || async { Err::<u32, _>("boom") })
        .await;

    assert_eq!(cache.get("other"), Some(7));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_hit_miss_signal() {
    let observer = Arc::new(RecordingObserver::default());
    let cache: TtlCache<u32> =
        TtlCache::new(Duration::from_secs(60)).with_observer(observer.clone());

    let _ = cache.get_or_compute("a", || async { Ok::<_, String>(1) }).await;
    let _ = cache.get_or_compute("a", || async { Ok::<_, String>(1) }).await;
    let _ = cache.get_or_compute("b", || async { Err::<u32, _>("x".to_string()) }).await;

    assert_eq!(
        observer.outcomes(),
        vec![CacheOutcome::Miss, CacheOutcome::Hit, CacheOutcome::Miss]
    );
}

#[tokio::test]
async fn test_concurrent_misses_on_same_key_both_compute() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let calls = AtomicUsize::new(0);

    let slow = cache.get_or_compute("k", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(1)
    });
    let slower = cache.get_or_compute("k", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        Ok::<_, String>(2)
    });

    let (a, b) = tokio::join!(slow, slower);

    assert_eq!(a, Ok(1));
    assert_eq!(b, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    // Last write wins
    assert_eq!(cache.get("k"), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_compute_does_not_block_other_operations() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let release = Arc::new(Notify::new());

    let pending = {
        let cache = cache.clone();
        let release = release.clone();
        tokio::spawn(async move {
            cache
                .get_or_compute("slow", || async move {
                    release.notified().await;
                    Ok::<_, String>(1)
                })
                .await
        })
    };

    let others = async {
        cache.set("other", 2);
        assert_eq!(cache.get("other"), Some(2));
        cache.invalidate("other");
        let fast = cache
            .get_or_compute("fast", || async { Ok::<_, String>(3) })
            .await;
        assert_eq!(fast, Ok(3));
    };
    tokio::time::timeout(Duration::from_secs(2), others)
        .await
        .expect("operations on other keys were blocked by a pending computation");

    release.notify_one();
    assert_eq!(pending.await.unwrap(), Ok(1));
    assert_eq!(cache.get("slow"), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_compute_does_not_block_same_key_miss() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let release = Arc::new(Notify::new());
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

    let pending = {
        let cache = cache.clone();
        let release = release.clone();
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async move {
                    let _ = started_tx.send(());
                    release.notified().await;
                    Ok::<_, String>(1)
                })
                .await
        })
    };
    started_rx.await.unwrap();

    let second = tokio::time::timeout(
        Duration::from_secs(2),
        cache.get_or_compute("k", || async { Ok::<_, String>(2) }),
    )
    .await
    .expect("same-key miss waited on an in-flight computation");
    assert_eq!(second, Ok(2));

    release.notify_one();
    assert_eq!(pending.await.unwrap(), Ok(1));
    assert_eq!(cache.get("k"), Some(1));
}

#[test]
fn test_blocking_compute_runs_outside_lock() {
    let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
    let (tx, rx) = mpsc::channel::<()>();

    let worker = {
        let cache = cache.clone();
        thread::spawn(move || {
            cache.get_or_compute_blocking("slow", || {
                rx.recv().map_err(|e| e.to_string())?;
                Ok::<_, String>(1)
            })
        })
    };

    cache.set("other", 2);
    assert_eq!(cache.get("other"), Some(2));
    cache.clear();

    tx.send(()).unwrap();
    assert_eq!(worker.join().unwrap(), Ok(1));
    assert_eq!(cache.get("slow"), Some(1));
}
