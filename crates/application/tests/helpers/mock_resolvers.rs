#![allow(dead_code)]

use async_trait::async_trait;
use custom_dns_application::ports::{DnsResolver, SystemResolver};
use custom_dns_domain::{
    AnswerRecord, DnsResponse, RecordData, RecordType, ResolutionError, ResolutionKey,
    ResponseCode, ServerEndpoint,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock DnsResolver
// ============================================================================

pub struct MockDnsResolver {
    responses: Mutex<HashMap<ResolutionKey, Arc<DnsResponse>>>,
    endpoints: Mutex<Vec<ServerEndpoint>>,
    pub calls: AtomicUsize,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            endpoints: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Active resolver with one placeholder endpoint.
    pub fn active() -> Self {
        let resolver = Self::new();
        resolver.apply_servers(vec![ServerEndpoint::udp("192.0.2.53:53".parse().unwrap())]);
        resolver
    }

    pub fn set_addresses(&self, name: &str, record_type: RecordType, addresses: &[&str]) {
        let answers = addresses
            .iter()
            .map(|a| {
                let data = match a.parse::<IpAddr>().unwrap() {
                    IpAddr::V4(v4) => RecordData::A(v4),
                    IpAddr::V6(v6) => RecordData::Aaaa(v6),
                };
                AnswerRecord::new(name, 300, data)
            })
            .collect();
        self.set_response(
            name,
            record_type,
            DnsResponse::new(1, ResponseCode::Success, answers),
        );
    }

    pub fn set_code(&self, name: &str, record_type: RecordType, code: ResponseCode) {
        self.set_response(name, record_type, DnsResponse::synthetic(code));
    }

    pub fn set_response(&self, name: &str, record_type: RecordType, response: DnsResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(ResolutionKey::new(name, record_type), Arc::new(response));
    }

    pub fn endpoints(&self) -> Vec<ServerEndpoint> {
        self.endpoints.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, key: &ResolutionKey) -> Arc<DnsResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Arc::new(DnsResponse::synthetic(ResponseCode::ServerFailure)))
    }

    fn apply_servers(&self, endpoints: Vec<ServerEndpoint>) {
        *self.endpoints.lock().unwrap() = endpoints;
    }

    fn is_active(&self) -> bool {
        !self.endpoints.lock().unwrap().is_empty()
    }
}

// ============================================================================
// Mock SystemResolver
// ============================================================================

pub struct MockSystemResolver {
    answers: Mutex<HashMap<String, Vec<IpAddr>>>,
    pub calls: AtomicUsize,
}

impl MockSystemResolver {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_answer(self, hostname: &str, address: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .entry(hostname.to_string())
            .or_default()
            .push(address.parse().unwrap());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SystemResolver for MockSystemResolver {
    async fn lookup(
        &self,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answers = self.answers.lock().unwrap();
        let addresses = answers
            .get(hostname)
            .ok_or(ResolutionError::NameNotFound)?;
        Ok(addresses
            .iter()
            .copied()
            .filter(|ip| (record_type == RecordType::A) == ip.is_ipv4())
            .collect())
    }
}
