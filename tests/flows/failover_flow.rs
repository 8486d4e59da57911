#[path = "../common/mod.rs"]
mod common;

use common::stack::udp_server;
use common::{Reply, Stack, TestServer};
use custom_dns_domain::{RecordType, ResolutionError};
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

fn config(on_exhaustion: &str, servers: &[&TestServer]) -> String {
    let mut toml = format!(
        "[resolver]\nattempt_timeout_ms = 250\nresolution_timeout_ms = 3000\non_exhaustion = \"{}\"\n",
        on_exhaustion
    );
    for server in servers {
        toml.push_str(&udp_server(server.port()));
    }
    toml
}

#[tokio::test]
async fn test_silent_primary_falls_back_to_secondary() {
    let primary = TestServer::start(Reply::Silent).await.unwrap();
    let secondary = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 40)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&config("fail", &[&primary, &secondary]));

    let addrs = stack
        .resolve_host
        .execute("example.test", RecordType::A)
        .await
        .unwrap();

    assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(203, 0, 113, 40))]);
    assert_eq!(primary.queries(), 2);
    assert_eq!(secondary.queries(), 1);

    // cached: neither server is asked again
    stack
        .resolve_host
        .execute("example.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(primary.queries(), 2);
    assert_eq!(secondary.queries(), 1);
}

#[tokio::test]
async fn test_servfail_then_nxdomain_is_authoritative() {
    let failing = TestServer::start(Reply::ServFail).await.unwrap();
    let nx = TestServer::start(Reply::NxDomain).await.unwrap();
    let never = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 41)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&config("fail", &[&failing, &nx, &never]));

    let result = stack
        .resolve_host
        .execute("gone.example.test", RecordType::A)
        .await;

    assert_eq!(result, Err(ResolutionError::NameNotFound));
    assert_eq!(failing.queries(), 1);
    assert_eq!(nx.queries(), 1);
    assert_eq!(never.queries(), 0);
}

#[tokio::test]
async fn test_exhaustion_fails_when_configured_to() {
    let a = TestServer::start(Reply::ServFail).await.unwrap();
    let b = TestServer::start(Reply::ServFail).await.unwrap();
    let stack = Stack::from_toml(&config("fail", &[&a, &b]));

    let result = stack
        .resolve_host
        .execute("127.0.0.1", RecordType::A)
        .await;
    assert_eq!(result, Err(ResolutionError::ServerFailure));

    // not cached: the next request tries again
    let _ = stack.resolve_host.execute("127.0.0.1", RecordType::A).await;
    assert_eq!(a.queries(), 2);
    assert_eq!(b.queries(), 2);
}

#[tokio::test]
async fn test_exhaustion_falls_back_to_system_resolver() {
    let a = TestServer::start(Reply::ServFail).await.unwrap();
    let stack = Stack::from_toml(&config("fallback_to_system_resolver", &[&a]));

    let addrs = stack
        .resolve_host
        .execute("127.0.0.1", RecordType::A)
        .await
        .unwrap();

    assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    assert_eq!(a.queries(), 1);
}

#[tokio::test]
async fn test_all_silent_bounded_by_resolution_timeout() {
    let servers = [
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
        TestServer::start(Reply::Silent).await.unwrap(),
    ];
    let refs: Vec<&TestServer> = servers.iter().collect();
    // 8 servers x 2 attempts x 250ms would be 4s; the overall bound is 3s
    let stack = Stack::from_toml(&config("fail", &refs));

    let started = Instant::now();
    let result = stack
        .resolve_host
        .execute("slow.example.test", RecordType::A)
        .await;

    assert_eq!(result, Err(ResolutionError::ServerFailure));
    assert!(started.elapsed() < Duration::from_millis(3800));
    assert!(servers.iter().map(|s| s.queries()).sum::<usize>() < 16);
}
