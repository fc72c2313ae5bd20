use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kbase_core::error::{Error, Result, Service};
use kbase_core::traits::Embedder;
use kbase_model::embed_batch;

/// Returns `[n]` for input "n" after sleeping `delay_ms(n, total)`. The default
/// sleeps longer for earlier inputs so the calls complete out of order.
struct SlowEmbedder {
    total: usize,
    delay_ms: fn(usize, usize) -> u64,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fail_on: Option<usize>,
    dim: usize,
}

impl SlowEmbedder {
    fn new(total: usize) -> Self {
        Self { total, delay_ms: |n, total| ((total - n) * 3) as u64, in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0), fail_on: None, dim: 1 }
    }
}

#[async_trait]
impl Embedder for SlowEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let n: usize = text.parse().map_err(|_| Error::InvalidInput(text.to_string()))?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis((self.delay_ms)(n, self.total))).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_on == Some(n) {
            return Err(Error::external(Service::Embedding, "boom"));
        }
        Ok(vec![n as f32])
    }
}

fn inputs(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

#[tokio::test]
async fn vectors_follow_input_order() {
    let embedder = SlowEmbedder::new(20);
    let out = embed_batch(&embedder, &inputs(20), 8).await.expect("batch");
    let got: Vec<f32> = out.iter().map(|v| v[0]).collect();
    let want: Vec<f32> = (0..20).map(|i| i as f32).collect();
    assert_eq!(got, want);
}

#[tokio::test]
async fn vectors_follow_input_order_under_interleaved_delays() {
    let patterns: [fn(usize, usize) -> u64; 3] = [
        // long, short, long, short...
        |n, _| if n % 2 == 0 { 12 } else { 1 },
        // scattered permutation of 0..7 ms
        |n, _| ((n * 5 + 3) % 7) as u64 * 2,
        // middle of the batch finishes first
        |n, total| (total / 2).abs_diff(n) as u64,
    ];
    for delay_ms in patterns {
        let mut embedder = SlowEmbedder::new(17);
        embedder.delay_ms = delay_ms;
        for concurrency in [2, 5, 17] {
            let out = embed_batch(&embedder, &inputs(17), concurrency).await.expect("batch");
            let got: Vec<f32> = out.iter().map(|v| v[0]).collect();
            let want: Vec<f32> = (0..17).map(|i| i as f32).collect();
            assert_eq!(got, want, "concurrency {concurrency}");
        }
    }
}

#[tokio::test]
async fn concurrency_is_bounded() {
    let embedder = Arc::new(SlowEmbedder::new(12));
    embed_batch(embedder.as_ref(), &inputs(12), 3).await.expect("batch");
    let peak = embedder.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in flight was {peak}");
    assert!(peak >= 2, "calls should overlap, peak was {peak}");
}

#[tokio::test]
async fn zero_concurrency_still_makes_progress() {
    let embedder = SlowEmbedder::new(3);
    let out = embed_batch(&embedder, &inputs(3), 0).await.expect("batch");
    assert_eq!(out.len(), 3);
}

#[tokio::test]
async fn first_failure_fails_the_batch() {
    let mut embedder = SlowEmbedder::new(6);
    embedder.fail_on = Some(4);
    let err = embed_batch(&embedder, &inputs(6), 2).await.unwrap_err();
    assert!(matches!(err, Error::ExternalService { service: Service::Embedding, .. }));
}

#[tokio::test]
async fn wrong_dimension_is_rejected() {
    let mut embedder = SlowEmbedder::new(2);
    embedder.dim = 4;
    let err = embed_batch(&embedder, &inputs(2), 2).await.unwrap_err();
    assert!(err.is_external());
}

#[tokio::test]
async fn empty_batch_calls_nothing() {
    let embedder = SlowEmbedder::new(0);
    assert!(embed_batch(&embedder, &[], 4).await.expect("batch").is_empty());
    assert_eq!(embedder.peak.load(Ordering::SeqCst), 0);
}
