//! Public IP and coarse location lookup.
//!
//! A short list of free web services is tried in order. Results (including
//! the local fallback) are cached for a fixed duration; the cache lock is
//! held while refilling so concurrent callers share one lookup.

use crate::core::system_info::network::{first_local_ipv4, first_local_ipv6, InterfaceSource};
use crate::core::system_info::types::{IpInfo, IpSource};
use crate::error::Result;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const UNKNOWN: &str = "Unknown";
pub const LOCAL_NETWORK: &str = "Local Network";
pub const LOOPBACK_IP: &str = "127.0.0.1";

const HTTP_OK: u16 = 200;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Status code and parsed JSON body. `body` is `None` when it was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Value>,
}

/// Blocking HTTP GET returning JSON.
pub trait HttpFetcher: Send + Sync {
    /// `Err` means the request never produced a response (DNS, connect,
    /// timeout).
    fn get_json(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// One geolocation web service and its response shape.
pub trait GeoIpService: Send + Sync {
    fn name(&self) -> &'static str;
    fn url(&self) -> &'static str;
    /// `None` when the body carries no usable address.
    fn normalize(&self, body: &Value) -> Option<IpInfo>;
}

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// `reqwest` blocking client. Must be called off the async executor.
pub struct ReqwestFetcher;

impl HttpFetcher for ReqwestFetcher {
    fn get_json(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        let response = client
            .get(url)
            .header("User-Agent", concat!("hostscope/", env!("CARGO_PKG_VERSION")))
            .send()?;

        let status = response.status().as_u16();
        let body = response.json::<Value>().ok();

        Ok(HttpResponse { status, body })
    }
}

fn field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn location(body: &Value, ip: &str, country: &str, region: &str, city: &str) -> Option<IpInfo> {
    let ip = field(body, ip)?;
    Some(IpInfo::remote(
        ip,
        field(body, country).unwrap_or(UNKNOWN),
        field(body, region).unwrap_or(UNKNOWN),
        field(body, city).unwrap_or(UNKNOWN),
    ))
}

pub struct IpInfoIo;

impl GeoIpService for IpInfoIo {
    fn name(&self) -> &'static str {
        "ipinfo.io"
    }

    fn url(&self) -> &'static str {
        "https://ipinfo.io/json"
    }

    fn normalize(&self, body: &Value) -> Option<IpInfo> {
        location(body, "ip", "country", "region", "city")
    }
}

pub struct IpApi;

impl GeoIpService for IpApi {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    fn url(&self) -> &'static str {
        "http://ip-api.com/json/?fields=query,country,regionName,city"
    }

    fn normalize(&self, body: &Value) -> Option<IpInfo> {
        location(body, "query", "country", "regionName", "city")
    }
}

pub struct Ipify;

impl GeoIpService for Ipify {
    fn name(&self) -> &'static str {
        "ipify"
    }

    fn url(&self) -> &'static str {
        "https://api.ipify.org/?format=json"
    }

    fn normalize(&self, body: &Value) -> Option<IpInfo> {
        let ip = field(body, "ip")?;
        Some(IpInfo::remote(ip, UNKNOWN, UNKNOWN, UNKNOWN))
    }
}

pub struct HttpBin;

impl GeoIpService for HttpBin {
    fn name(&self) -> &'static str {
        "httpbin"
    }

    fn url(&self) -> &'static str {
        "https://httpbin.org/ip"
    }

    fn normalize(&self, body: &Value) -> Option<IpInfo> {
        // Proxies append their own address: "client, proxy1, proxy2"
        let ip = field(body, "origin")?
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        Some(IpInfo::remote(ip, UNKNOWN, UNKNOWN, UNKNOWN))
    }
}

pub fn default_services() -> Vec<Box<dyn GeoIpService>> {
    vec![
        Box::new(IpInfoIo),
        Box::new(IpApi),
        Box::new(Ipify),
        Box::new(HttpBin),
    ]
}

/// Delay before attempt `attempt + 1` on the same service.
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSettings {
    pub cache_duration: Duration,
    pub request_timeout: Duration,
    /// Attempts per service
    pub max_retries: u32,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            cache_duration: Duration::from_secs(300),
            request_timeout: Duration::from_secs(5),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: IpInfo,
    fetched_at: Instant,
}

pub struct GeoResolver {
    services: Vec<Box<dyn GeoIpService>>,
    fetcher: Box<dyn HttpFetcher>,
    interfaces: Arc<dyn InterfaceSource>,
    sleeper: Box<dyn Sleeper>,
    clock: Box<dyn Clock>,
    settings: GeoSettings,
    cache: Mutex<Option<CacheEntry>>,
}

impl GeoResolver {
    pub fn new(
        fetcher: Box<dyn HttpFetcher>,
        interfaces: Arc<dyn InterfaceSource>,
        settings: GeoSettings,
    ) -> Self {
        Self {
            services: default_services(),
            fetcher,
            interfaces,
            sleeper: Box::new(ThreadSleeper),
            clock: Box::new(SystemClock),
            settings,
            cache: Mutex::new(None),
        }
    }

    pub fn with_services(mut self, services: Vec<Box<dyn GeoIpService>>) -> Self {
        self.services = services;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached lookup. Never fails; worst case is a loopback placeholder.
    pub fn resolve(&self) -> IpInfo {
        let mut cache = self.cache.lock();

        if let Some(entry) = cache.as_ref() {
            let age = self.clock.now().saturating_duration_since(entry.fetched_at);
            if age < self.settings.cache_duration {
                debug!("Using cached IP info ({}s old)", age.as_secs());
                return entry.data.clone();
            }
        }

        let data = match self.fetch_remote() {
            Some(remote) => remote,
            None => {
                warn!("All IP services failed, using local fallback");
                self.local_fallback()
            }
        };
        let data = self.attach_ipv6(data);

        *cache = Some(CacheEntry {
            data: data.clone(),
            fetched_at: self.clock.now(),
        });

        data
    }

    /// Drop the cached entry so the next call refetches.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn fetch_remote(&self) -> Option<IpInfo> {
        let attempts = self.settings.max_retries.max(1);

        for service in &self.services {
            for attempt in 1..=attempts {
                let retry = match self
                    .fetcher
                    .get_json(service.url(), self.settings.request_timeout)
                {
                    Ok(response) if response.status == HTTP_OK => {
                        match response.body.as_ref().and_then(|b| service.normalize(b)) {
                            Some(info) => {
                                info!("Resolved public IP via {}", service.name());
                                return Some(info);
                            }
                            None => {
                                debug!("{} returned an unusable body", service.name());
                                false
                            }
                        }
                    }
                    Ok(response) if response.status == HTTP_TOO_MANY_REQUESTS => {
                        warn!("{} rate limited (attempt {})", service.name(), attempt);
                        true
                    }
                    Ok(response) => {
                        debug!("{} returned HTTP {}", service.name(), response.status);
                        false
                    }
                    Err(e) => {
                        warn!("{} request failed (attempt {}): {}", service.name(), attempt, e);
                        true
                    }
                };

                if !retry {
                    break;
                }
                if attempt < attempts {
                    self.sleeper.sleep(backoff(attempt));
                }
            }
        }

        None
    }

    fn local_fallback(&self) -> IpInfo {
        let addresses = match self.interfaces.addresses() {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("Could not enumerate interfaces for local IP: {}", e);
                Vec::new()
            }
        };

        let ipv4 = first_local_ipv4(&addresses).map(|ip| ip.to_string());
        let ipv6 = first_local_ipv6(&addresses).map(|ip| ip.to_string());

        let mut info = IpInfo {
            ip: ipv4.clone().unwrap_or_else(|| LOOPBACK_IP.to_string()),
            country: LOCAL_NETWORK.to_string(),
            region: LOCAL_NETWORK.to_string(),
            city: LOCAL_NETWORK.to_string(),
            source: IpSource::Local,
            local_ipv4: ipv4,
            local_ipv6: ipv6,
            ipv6: None,
            error: None,
        };

        if info.local_ipv4.is_none() && info.local_ipv6.is_none() {
            info.local_ipv4 = Some(LOOPBACK_IP.to_string());
            info.error = Some("Could not determine local IP".to_string());
        }

        info
    }

    fn attach_ipv6(&self, mut info: IpInfo) -> IpInfo {
        if info.ipv6.is_some() || (info.ip.contains(':') && info.error.is_none()) {
            return info;
        }

        match self.interfaces.addresses() {
            Ok(addresses) => info.ipv6 = first_local_ipv6(&addresses).map(|ip| ip.to_string()),
            Err(e) => debug!("Skipping IPv6 enrichment: {}", e),
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_info::network::InterfaceAddress;
    use crate::error::HostscopeError;
    use std::collections::VecDeque;
    use std::net::IpAddr;

    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<HttpResponse>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Result<HttpResponse>>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    script: Mutex::new(script.into()),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl HttpFetcher for ScriptedFetcher {
        fn get_json(&self, url: &str, _timeout: Duration) -> Result<HttpResponse> {
            self.calls.lock().push(url.to_string());
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(HostscopeError::other("script exhausted")))
        }
    }

    struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.0.lock().push(duration);
        }
    }

    struct ManualClock {
        base: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }
    }

    struct StaticInterfaces(Vec<InterfaceAddress>);

    impl InterfaceSource for StaticInterfaces {
        fn addresses(&self) -> Result<Vec<InterfaceAddress>> {
            Ok(self.0.clone())
        }
    }

    fn ok(body: Value) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: Some(body),
        })
    }

    fn status(code: u16) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status: code,
            body: None,
        })
    }

    fn lan() -> Arc<dyn InterfaceSource> {
        Arc::new(StaticInterfaces(vec![
            InterfaceAddress::ip("lo", IpAddr::V4("127.0.0.1".parse().unwrap())),
            InterfaceAddress::ip("eth0", IpAddr::V4("192.168.1.20".parse().unwrap())),
            InterfaceAddress::ip("eth0", IpAddr::V6("2001:db8::7".parse().unwrap())),
        ]))
    }

    struct Harness {
        resolver: GeoResolver,
        calls: Arc<Mutex<Vec<String>>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
        clock: Arc<Mutex<Duration>>,
    }

    fn harness(script: Vec<Result<HttpResponse>>, interfaces: Arc<dyn InterfaceSource>) -> Harness {
        let (fetcher, calls) = ScriptedFetcher::new(script);
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let clock = Arc::new(Mutex::new(Duration::ZERO));

        let resolver = GeoResolver::new(Box::new(fetcher), interfaces, GeoSettings::default())
            .with_sleeper(Box::new(RecordingSleeper(Arc::clone(&sleeps))))
            .with_clock(Box::new(ManualClock {
                base: Instant::now(),
                offset: Arc::clone(&clock),
            }));

        Harness {
            resolver,
            calls,
            sleeps,
            clock,
        }
    }

    #[test]
    fn test_service_normalizers() {
        let info = IpInfoIo
            .normalize(&serde_json::json!({"ip": "203.0.113.9", "country": "DE", "city": "Berlin"}))
            .unwrap();
        assert_eq!(info.ip, "203.0.113.9");
        assert_eq!(info.region, UNKNOWN);

        let info = IpApi
            .normalize(&serde_json::json!({"query": "203.0.113.9", "regionName": "Bavaria"}))
            .unwrap();
        assert_eq!(info.region, "Bavaria");

        let info = HttpBin
            .normalize(&serde_json::json!({"origin": "203.0.113.9, 10.0.0.1"}))
            .unwrap();
        assert_eq!(info.ip, "203.0.113.9");

        assert!(Ipify.normalize(&serde_json::json!({"error": "nope"})).is_none());
    }

    #[test]
    fn test_cache_hit_makes_no_request() {
        let h = harness(
            vec![ok(serde_json::json!({"ip": "203.0.113.9", "country": "DE"}))],
            lan(),
        );

        let first = h.resolver.resolve();
        *h.clock.lock() = Duration::from_secs(299);
        let second = h.resolver.resolve();

        assert_eq!(first, second);
        assert_eq!(h.calls.lock().len(), 1);
    }

    #[test]
    fn test_expired_cache_refetches() {
        let h = harness(
            vec![
                ok(serde_json::json!({"ip": "203.0.113.9"})),
                ok(serde_json::json!({"ip": "198.51.100.4"})),
            ],
            lan(),
        );

        assert_eq!(h.resolver.resolve().ip, "203.0.113.9");
        *h.clock.lock() = Duration::from_secs(300);
        assert_eq!(h.resolver.resolve().ip, "198.51.100.4");
        assert_eq!(h.calls.lock().len(), 2);
    }

    #[test]
    fn test_rate_limit_backs_off_then_moves_on() {
        let h = harness(
            vec![
                status(429),
                status(429),
                ok(serde_json::json!({"query": "203.0.113.9", "country": "FR"})),
            ],
            lan(),
        );

        let info = h.resolver.resolve();
        assert_eq!(info.country, "FR");
        assert_eq!(info.source, IpSource::Remote);
        assert_eq!(*h.sleeps.lock(), vec![Duration::from_secs(2)]);

        let calls = h.calls.lock();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("ipinfo.io"));
        assert!(calls[1].contains("ipinfo.io"));
        assert!(calls[2].contains("ip-api.com"));
    }

    #[test]
    fn test_other_status_skips_retry() {
        let h = harness(
            vec![status(503), ok(serde_json::json!({"query": "203.0.113.9"}))],
            lan(),
        );

        h.resolver.resolve();
        assert!(h.sleeps.lock().is_empty());
        assert_eq!(h.calls.lock().len(), 2);
    }

    #[test]
    fn test_all_services_fail_uses_local_fallback() {
        let h = harness(Vec::new(), lan());

        let info = h.resolver.resolve();
        assert_eq!(info.source, IpSource::Local);
        assert_eq!(info.ip, "192.168.1.20");
        assert_eq!(info.country, LOCAL_NETWORK);
        assert_eq!(info.local_ipv6.as_deref(), Some("2001:db8::7"));
        assert_eq!(info.ipv6.as_deref(), Some("2001:db8::7"));
        assert!(info.error.is_none());

        // 4 services x 2 attempts, one backoff per service
        assert_eq!(h.calls.lock().len(), 8);
        assert_eq!(h.sleeps.lock().len(), 4);
    }

    #[test]
    fn test_local_fallback_is_cached() {
        let h = harness(Vec::new(), lan());
        h.resolver.resolve();
        h.resolver.resolve();
        assert_eq!(h.calls.lock().len(), 8);
    }

    #[test]
    fn test_no_addresses_gives_loopback_with_error() {
        let h = harness(Vec::new(), Arc::new(StaticInterfaces(Vec::new())));

        let info = h.resolver.resolve();
        assert_eq!(info.ip, LOOPBACK_IP);
        assert!(info.error.is_some());
        assert_eq!(info.source, IpSource::Local);
    }

    #[test]
    fn test_remote_ipv6_is_not_overwritten() {
        let h = harness(vec![ok(serde_json::json!({"ip": "2001:db8::99"}))], lan());
        let info = h.resolver.resolve();
        assert_eq!(info.ip, "2001:db8::99");
        assert!(info.ipv6.is_none());
    }

    #[test]
    fn test_concurrent_callers_share_one_lookup() {
        let h = harness(vec![ok(serde_json::json!({"ip": "203.0.113.9"}))], lan());
        let resolver = Arc::new(h.resolver);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || resolver.resolve().ip)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "203.0.113.9");
        }
        assert_eq!(h.calls.lock().len(), 1);
    }
}
