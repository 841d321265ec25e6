//! Performance benchmarks for the check engine

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::runtime::Runtime;
use webcheck::{
    config::CheckConfig,
    network::{HostResolver, PortProber},
    output::{OutputConfig, OutputFormat, OutputManager},
    scanner::CheckEngine,
    ResolveError,
};

struct InstantResolver;

#[async_trait]
impl HostResolver for InstantResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if host.ends_with(".invalid") {
            return Err(ResolveError::lookup(host, "no such host"));
        }
        Ok(vec![
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2)),
        ])
    }
}

struct InstantProber;

#[async_trait]
impl PortProber for InstantProber {
    async fn probe(&self, addr: SocketAddr) -> bool {
        addr.port() == 443
    }
}

fn hosts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| if i % 10 == 0 { format!("host{}.invalid", i) } else { format!("host{}.test", i) })
        .collect()
}

/// Benchmark dispatch overhead with network I/O stubbed out
fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("dispatch");

    for &count in &[100usize, 1_000, 10_000] {
        let input = hosts(count);
        let config = CheckConfig::new().with_workers(64);
        let engine =
            CheckEngine::with_components(config, Arc::new(InstantResolver), Arc::new(InstantProber)).unwrap();

        group.bench_with_input(BenchmarkId::new("hosts", count), &input, |b, input| {
            b.to_async(&rt).iter(|| async {
                let results = engine.check_all(input.clone()).collect_all().await;
                black_box(results)
            })
        });
    }

    group.finish();
}

/// Benchmark result formatting
fn bench_output(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = CheckEngine::with_components(
        CheckConfig::new(),
        Arc::new(InstantResolver),
        Arc::new(InstantProber),
    )
    .unwrap();
    let results = rt.block_on(async { engine.check_all(hosts(1_000)).collect_all().await });

    let mut group = c.benchmark_group("output");
    for (name, format) in [
        ("text", OutputFormat::Text),
        ("json", OutputFormat::Json),
        ("greppable", OutputFormat::Greppable),
    ] {
        let out = OutputManager::with_writer(
            OutputConfig {
                format,
                file: None,
                colored: false,
            },
            Box::new(std::io::sink()),
        );
        group.bench_function(name, |b| {
            b.iter(|| {
                for result in &results {
                    black_box(out.format_result(result).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_output);
criterion_main!(benches);
