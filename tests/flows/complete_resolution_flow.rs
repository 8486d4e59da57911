#[path = "../common/mod.rs"]
mod common;

use common::stack::udp_server;
use common::{Reply, Stack, TestServer};
use custom_dns_domain::{EndpointConfig, Protocol, RecordType, ResolutionError};
use futures::future::join_all;
use std::net::{IpAddr, Ipv4Addr};

const TIMING: &str = "[resolver]\nattempt_timeout_ms = 300\nresolution_timeout_ms = 2000\n";

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

#[tokio::test]
async fn test_resolve_then_serve_from_cache() {
    let server = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 10)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(server.port())));

    let first = stack
        .resolve_host
        .execute("www.example.test", RecordType::A)
        .await
        .unwrap();
    let second = stack
        .resolve_host
        .execute("WWW.Example.Test.", RecordType::A)
        .await
        .unwrap();

    assert_eq!(first, vec![v4(203, 0, 113, 10)]);
    assert_eq!(first, second);
    assert_eq!(server.queries(), 1);

    let stats = stack.chain.cache().unwrap().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_concurrent_lookups_send_one_query() {
    let server = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 11)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(server.port())));

    let results = join_all(
        (0..20).map(|_| stack.resolve_host.execute("tabs.example.test", RecordType::A)),
    )
    .await;

    let expected = Ok(vec![v4(203, 0, 113, 11)]);
    assert!(results.iter().all(|r| *r == expected));
    assert_eq!(server.queries(), 1);
}

#[tokio::test]
async fn test_host_override_answers_without_network() {
    let server = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 12)))
        .await
        .unwrap();
    let toml = format!(
        "{}{}[[hosts]]\nhostname = \"intranet.test\"\naddress = \"10.0.0.5\"\n",
        TIMING,
        udp_server(server.port())
    );
    let stack = Stack::from_toml(&toml);

    let addrs = stack
        .resolve_host
        .execute("Intranet.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(addrs, vec![v4(10, 0, 0, 5)]);

    // authoritative for address types: no AAAA entry means no addresses
    let v6 = stack
        .resolve_host
        .execute("intranet.test", RecordType::AAAA)
        .await
        .unwrap();
    assert!(v6.is_empty());
    assert_eq!(server.queries(), 0);

    // removing it sends the name to the server again
    assert!(stack.overrides.remove("intranet.test"));
    let addrs = stack
        .resolve_host
        .execute("intranet.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(addrs, vec![v4(203, 0, 113, 12)]);
}

#[tokio::test]
async fn test_name_not_found_is_reported() {
    let server = TestServer::start(Reply::NxDomain).await.unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(server.port())));

    let result = stack
        .resolve_host
        .execute("missing.example.test", RecordType::A)
        .await;
    assert_eq!(result, Err(ResolutionError::NameNotFound));

    // cached negative answer
    let again = stack
        .resolve_host
        .execute("missing.example.test", RecordType::A)
        .await;
    assert_eq!(again, Err(ResolutionError::NameNotFound));
    assert_eq!(server.queries(), 1);
}

#[tokio::test]
async fn test_invalid_hostname_is_name_not_found() {
    let server = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 13)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(server.port())));

    let label = "x".repeat(64);
    let result = stack
        .resolve_host
        .execute(&format!("{}.test", label), RecordType::A)
        .await;
    assert_eq!(result, Err(ResolutionError::NameNotFound));
    assert_eq!(server.queries(), 0);
}

#[tokio::test]
async fn test_no_servers_uses_system_resolver() {
    let stack = Stack::from_toml(TIMING);

    let addrs = stack
        .resolve_host
        .execute("127.0.0.1", RecordType::A)
        .await
        .unwrap();
    assert_eq!(addrs, vec![v4(127, 0, 0, 1)]);
    assert!(stack.chain.cache().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_change_takes_effect_and_flushes() {
    let old = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 20)))
        .await
        .unwrap();
    let new = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 21)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(old.port())));

    let before = stack
        .resolve_host
        .execute("example.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(before, vec![v4(203, 0, 113, 20)]);

    let applied = stack
        .update_servers
        .execute(&[EndpointConfig::new("127.0.0.1", Protocol::Udp).with_port(new.port())])
        .unwrap();
    assert_eq!(applied, 1);

    let after = stack
        .resolve_host
        .execute("example.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(after, vec![v4(203, 0, 113, 21)]);
    assert_eq!(old.queries(), 1);
    assert_eq!(new.queries(), 1);
}

#[tokio::test]
async fn test_rejected_server_list_keeps_active_configuration() {
    let server = TestServer::start(Reply::Address(Ipv4Addr::new(203, 0, 113, 30)))
        .await
        .unwrap();
    let stack = Stack::from_toml(&format!("{}{}", TIMING, udp_server(server.port())));

    stack
        .resolve_host
        .execute("keep.test", RecordType::A)
        .await
        .unwrap();

    let rejected = stack
        .update_servers
        .execute(&[EndpointConfig::new("not-an-ip", Protocol::Udp)]);
    assert!(rejected.is_err());
    assert_eq!(stack.chain.snapshot().version, 0);

    // cache untouched, still served
    stack
        .resolve_host
        .execute("keep.test", RecordType::A)
        .await
        .unwrap();
    assert_eq!(server.queries(), 1);
}
