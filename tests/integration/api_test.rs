use hostscope::api::{router, AppState};
use hostscope::core::system_info::types::*;
use hostscope::core::system_info::{IoCounterOffsetStore, SystemProbe};
use hostscope::{HostscopeError, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

/// Probe whose sections can be switched off, with settable live counters.
#[derive(Default)]
struct FakeProbe {
    fail_all: bool,
    live: Mutex<IoCounters>,
    offsets: Arc<IoCounterOffsetStore>,
}

fn unavailable<T>() -> Result<T> {
    Err(HostscopeError::source_unavailable("fake outage"))
}

impl SystemProbe for FakeProbe {
    fn processor(&self) -> Result<ProcessorInfo> {
        unavailable()
    }

    fn cpu(&self) -> Result<CpuInfo> {
        unavailable()
    }

    fn memory(&self) -> Result<MemoryInfo> {
        if self.fail_all {
            return unavailable();
        }
        Ok(MemoryInfo {
            total: 8,
            available: 4,
            percent: 50.0,
            used: 4,
            free: 2,
        })
    }

    fn disks(&self) -> Result<Vec<DiskInfo>> {
        unavailable()
    }

    fn network(&self) -> Result<NetworkInfo> {
        if self.fail_all {
            return unavailable();
        }
        Ok(NetworkInfo {
            io_counters: self.offsets.apply(*self.live.lock()),
            interfaces: Default::default(),
            connections: vec![ConnectionInfo {
                local_address: "10.0.0.2:51000".into(),
                remote_address: "203.0.113.9:443".into(),
                status: "ESTABLISHED".into(),
            }],
            ip_info: IpInfo::remote("203.0.113.1", "Unknown", "Unknown", "Unknown"),
        })
    }

    fn platform(&self) -> Result<PlatformInfo> {
        unavailable()
    }

    fn hardware_info(&self) -> HardwareInfo {
        HardwareInfo::default()
    }

    fn live_io_counters(&self) -> Result<IoCounters> {
        if self.fail_all {
            return unavailable();
        }
        Ok(*self.live.lock())
    }
}

async fn serve(probe: Arc<FakeProbe>) -> SocketAddr {
    let state = AppState::new(probe.clone(), probe.offsets.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    addr
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health() {
    let addr = serve(Arc::new(FakeProbe::default())).await;

    let body: Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].as_f64().unwrap() > 1.6e9);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_sections_failing_returns_500() {
    let addr = serve(Arc::new(FakeProbe {
        fail_all: true,
        ..Default::default()
    }))
    .await;

    let response = reqwest::get(format!("http://{}/api/system-info", addr)).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not retrieve system information");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hardware_info_is_always_well_formed() {
    let addr = serve(Arc::new(FakeProbe {
        fail_all: true,
        ..Default::default()
    }))
    .await;

    let response = reqwest::get(format!("http://{}/api/hardware-info", addr)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["processor"], serde_json::json!({}));
    assert_eq!(body["gpu"], serde_json::json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_io_zeroes_reported_counters() {
    let probe = Arc::new(FakeProbe::default());
    *probe.live.lock() = IoCounters {
        bytes_sent: 1_000,
        bytes_recv: 2_000,
        ..Default::default()
    };
    let addr = serve(probe.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/reset-io", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "I/O counters reset");

    probe.live.lock().bytes_sent = 1_250;

    let body: Value = client
        .get(format!("http://{}/api/system-info", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["network"]["io_counters"]["bytes_sent"], 250);
    assert_eq!(body["network"]["io_counters"]["bytes_recv"], 0);
    assert_eq!(body["network"]["connections"][0]["remote_address"], "203.0.113.9:443");
    assert!(body.get("disk").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_io_failure_is_500() {
    let addr = serve(Arc::new(FakeProbe {
        fail_all: true,
        ..Default::default()
    }))
    .await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/reset-io", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cors_allows_any_origin() {
    let addr = serve(Arc::new(FakeProbe::default())).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/health", addr))
        .header("Origin", "http://dashboard.example")
        .send()
        .await
        .unwrap();

    let allow = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok());
    assert_eq!(allow, Some("*"));
}
