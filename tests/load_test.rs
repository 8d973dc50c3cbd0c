//! Load testing for the balancer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::StatusCode;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_counted_exactly() {
    let backends = [
        common::start_mock_backend("b1").await,
        common::start_mock_backend("b2").await,
        common::start_mock_backend("b3").await,
    ];
    let lb = common::start_balancer(common::config_for(&backends)).await;

    let concurrency = 20;
    let requests_per_task = 15;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = lb.url("/");
        tasks.push(tokio::spawn(async move {
            let mut bodies = Vec::new();
            for _ in 0..requests_per_task {
                let res = client.get(&url).send().await.expect("balancer unreachable");
                assert_eq!(res.status(), StatusCode::OK);
                bodies.push(res.text().await.unwrap());
            }
            bodies
        }));
    }

    let mut per_body: HashMap<String, usize> = HashMap::new();
    for task in tasks {
        for body in task.await.unwrap() {
            *per_body.entry(body).or_default() += 1;
        }
    }
    let elapsed = start.elapsed();
    println!("{} requests in {:?}", total_requests, elapsed);

    // Every selection claims a unique cursor slot, so the split is exact.
    assert_eq!(per_body.len(), 3);
    assert!(per_body.values().all(|&n| n == total_requests / 3));

    let snap = lb.stats.snapshot();
    assert_eq!(snap.total_requests, total_requests as u64);
    assert_eq!(snap.backend_requests.values().sum::<u64>(), total_requests as u64);

    let pool = lb.pool.clone();
    assert!(
        common::eventually(Duration::from_secs(2), || {
            pool.backends().iter().all(|b| b.connections() == 0)
        })
        .await,
        "all connection guards must be released"
    );
}
