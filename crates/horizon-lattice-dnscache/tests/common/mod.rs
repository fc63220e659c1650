//! Stub backends shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use horizon_lattice_dnscache::{BoxError, HostResolver};
use parking_lot::Mutex;

/// Backend returning a configurable answer and counting every call.
pub struct StubResolver {
    answer: Mutex<Vec<String>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    host_calls: AtomicUsize,
    addr_calls: AtomicUsize,
    last_host: Mutex<Option<String>>,
}

impl StubResolver {
    pub fn new(answer: &[&str]) -> Self {
        Self {
            answer: Mutex::new(answer.iter().map(|s| s.to_string()).collect()),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            host_calls: AtomicUsize::new(0),
            addr_calls: AtomicUsize::new(0),
            last_host: Mutex::new(None),
        }
    }

    pub fn set_answer(&self, answer: &[&str]) {
        *self.answer.lock() = answer.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    pub fn host_calls(&self) -> usize {
        self.host_calls.load(Ordering::SeqCst)
    }

    pub fn addr_calls(&self) -> usize {
        self.addr_calls.load(Ordering::SeqCst)
    }

    pub fn last_host(&self) -> Option<String> {
        self.last_host.lock().clone()
    }

    async fn answer(&self) -> Result<Vec<String>, BoxError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err("stub backend failure".into());
        }
        Ok(self.answer.lock().clone())
    }
}

impl HostResolver for StubResolver {
    async fn lookup_host(&self, host: &str) -> Result<Vec<String>, BoxError> {
        self.host_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_host.lock() = Some(host.to_string());
        self.answer().await
    }

    async fn lookup_addr(&self, addr: &str) -> Result<Vec<String>, BoxError> {
        self.addr_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_host.lock() = Some(addr.to_string());
        self.answer().await
    }
}

/// Backend without reverse lookup support.
pub struct ForwardOnly;

impl HostResolver for ForwardOnly {
    async fn lookup_host(&self, _host: &str) -> Result<Vec<String>, BoxError> {
        Ok(vec!["192.0.2.10".to_string()])
    }
}
