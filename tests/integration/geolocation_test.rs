use hostscope::core::system_info::geolocation::{
    Clock, GeoIpService, GeoResolver, GeoSettings, HttpFetcher, HttpResponse, Sleeper,
};
use hostscope::core::system_info::network::{InterfaceAddress, InterfaceSource};
use hostscope::core::system_info::types::{IpInfo, IpSource};
use hostscope::{HostscopeError, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Answers 200 after an artificial delay, counting calls.
struct SlowFetcher {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl HttpFetcher for SlowFetcher {
    fn get_json(&self, _url: &str, _timeout: Duration) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(HttpResponse {
            status: 200,
            body: Some(json!({ "ip": "203.0.113.77", "country": "NL", "region": "North Holland", "city": "Amsterdam" })),
        })
    }
}

struct AlwaysDown {
    calls: Arc<AtomicUsize>,
}

impl HttpFetcher for AlwaysDown {
    fn get_json(&self, url: &str, _timeout: Duration) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HostscopeError::other(format!("connection refused: {}", url)))
    }
}

struct NoInterfaces;

impl InterfaceSource for NoInterfaces {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>> {
        Err(HostscopeError::source_unavailable("no interfaces"))
    }
}

struct NoSleep(Arc<Mutex<Vec<Duration>>>);

impl Sleeper for NoSleep {
    fn sleep(&self, duration: Duration) {
        self.0.lock().push(duration);
    }
}

struct SteppedClock(Arc<Mutex<Instant>>);

impl Clock for SteppedClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

struct Only(&'static str);

impl GeoIpService for Only {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn url(&self) -> &'static str {
        self.0
    }

    fn normalize(&self, body: &Value) -> Option<IpInfo> {
        let ip = body.get("ip")?.as_str()?;
        Some(IpInfo::remote(ip, "Unknown", "Unknown", "Unknown"))
    }
}

#[test]
fn test_single_flight_after_expiry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let now = Arc::new(Mutex::new(Instant::now()));

    let resolver = Arc::new(
        GeoResolver::new(
            Box::new(SlowFetcher {
                calls: calls.clone(),
                delay: Duration::from_millis(50),
            }),
            Arc::new(NoInterfaces),
            GeoSettings::default(),
        )
        .with_clock(Box::new(SteppedClock(now.clone()))),
    );

    assert_eq!(resolver.resolve().city, "Amsterdam");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Expire the entry, then hit it from many threads at once
    *now.lock() += Duration::from_secs(301);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let resolver = resolver.clone();
            thread::spawn(move || resolver.resolve())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().ip, "203.0.113.77");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_retries_are_bounded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sleeps = Arc::new(Mutex::new(Vec::new()));

    let resolver = GeoResolver::new(
        Box::new(AlwaysDown { calls: calls.clone() }),
        Arc::new(NoInterfaces),
        GeoSettings {
            max_retries: 3,
            ..GeoSettings::default()
        },
    )
    .with_sleeper(Box::new(NoSleep(sleeps.clone())));

    let info = resolver.resolve();
    assert_eq!(info.source, IpSource::Local);
    assert_eq!(info.ip, "127.0.0.1");
    assert!(info.error.is_some());

    assert_eq!(calls.load(Ordering::SeqCst), 4 * 3);
    let per_service: Vec<Duration> = sleeps.lock().iter().take(2).copied().collect();
    assert_eq!(per_service, vec![Duration::from_secs(2), Duration::from_secs(4)]);
}

#[test]
fn test_custom_service_list() {
    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = GeoResolver::new(
        Box::new(SlowFetcher {
            calls: calls.clone(),
            delay: Duration::ZERO,
        }),
        Arc::new(NoInterfaces),
        GeoSettings::default(),
    )
    .with_services(vec![Box::new(Only("http://geo.internal/whoami"))]);

    let info = resolver.resolve();
    assert_eq!(info.ip, "203.0.113.77");
    assert_eq!(info.country, "Unknown");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    resolver.invalidate();
    resolver.resolve();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
