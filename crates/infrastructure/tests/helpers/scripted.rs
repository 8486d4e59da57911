use async_trait::async_trait;
use custom_dns_domain::{
    AnswerRecord, DnsQuery, DnsResponse, RecordData, ResponseCode, ServerEndpoint, UpstreamError,
};
use custom_dns_infrastructure::dns::UpstreamExchange;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script =
    dyn Fn(&ServerEndpoint, &DnsQuery) -> Result<DnsResponse, UpstreamError> + Send + Sync;

/// Upstream exchange answering from a closure and recording every call.
pub struct ScriptedExchange {
    script: Box<Script>,
    delay: Duration,
    calls: Mutex<Vec<(ServerEndpoint, DnsQuery)>>,
    retained: Mutex<Vec<Vec<ServerEndpoint>>>,
}

impl ScriptedExchange {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&ServerEndpoint, &DnsQuery) -> Result<DnsResponse, UpstreamError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            retained: Mutex::new(Vec::new()),
        }
    }

    /// Every exchange sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, endpoint: &ServerEndpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e == endpoint)
            .count()
    }

    pub fn endpoints_called(&self) -> Vec<ServerEndpoint> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.clone())
            .collect()
    }

    pub fn query_ids(&self) -> Vec<u16> {
        self.calls.lock().unwrap().iter().map(|(_, q)| q.id).collect()
    }

    pub fn retained(&self) -> Vec<Vec<ServerEndpoint>> {
        self.retained.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamExchange for ScriptedExchange {
    async fn exchange(
        &self,
        query: &DnsQuery,
        endpoint: &ServerEndpoint,
        _timeout: Duration,
    ) -> Result<DnsResponse, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), query.clone()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        (self.script)(endpoint, query)
    }

    fn retain(&self, endpoints: &[ServerEndpoint]) {
        self.retained.lock().unwrap().push(endpoints.to_vec());
    }
}

pub fn a_answer(query: &DnsQuery, ip: [u8; 4], ttl: u32) -> DnsResponse {
    DnsResponse::new(
        query.id,
        ResponseCode::Success,
        vec![AnswerRecord::new(
            query.key.name.as_ref(),
            ttl,
            RecordData::A(Ipv4Addr::from(ip)),
        )],
    )
}

pub fn nxdomain(query: &DnsQuery, soa_ttl: Option<u32>) -> DnsResponse {
    let mut response = DnsResponse::new(query.id, ResponseCode::NameNotFound, vec![]);
    response.ttl = soa_ttl;
    response
}

pub fn servfail(query: &DnsQuery) -> DnsResponse {
    DnsResponse::new(query.id, ResponseCode::ServerFailure, vec![])
}
