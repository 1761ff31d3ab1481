//! Test helper functions for E2E tests

use scenario_lifecycle::device::SimulatedDevicePool;
use scenario_lifecycle::models::{DeviceInfo, Platform};
use scenario_lifecycle::telemetry::MemorySink;
use scenario_lifecycle::{LifecycleConfig, ScenarioLifecycleOrchestrator};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

/// Orchestrator wired to an in-memory farm and sink, writing under a temp dir.
///
/// The TempDir must stay in scope for the lifetime of the test.
pub struct TestRun {
    pub temp: TempDir,
    pub pool: Arc<SimulatedDevicePool>,
    pub sink: Arc<MemorySink>,
    pub orchestrator: ScenarioLifecycleOrchestrator,
}

impl TestRun {
    pub fn android(devices: usize) -> Self {
        Self::with(android_devices(devices), LifecycleConfig::default())
    }

    pub fn with(devices: Vec<DeviceInfo>, config: LifecycleConfig) -> Self {
        let pool = Arc::new(SimulatedDevicePool::new(devices));
        Self::with_pool(pool, config)
    }

    pub fn with_pool(pool: Arc<SimulatedDevicePool>, mut config: LifecycleConfig) -> Self {
        let temp = TempDir::new().unwrap();
        config.report_root = temp.path().join("reports");
        let sink = Arc::new(MemorySink::new());
        let orchestrator = ScenarioLifecycleOrchestrator::new(config, pool.clone(), sink.clone());
        Self {
            temp,
            pool,
            sink,
            orchestrator,
        }
    }
}

pub fn android_devices(count: usize) -> Vec<DeviceInfo> {
    (0..count)
        .map(|i| DeviceInfo::new(format!("emulator-{}", 5554 + 2 * i), Platform::Android))
        .collect()
}

/// Serve exactly one HTTP request with a JSON body.
///
/// Returns the bound base URL and a handle yielding the raw request head.
pub fn serve_json_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        head
    });

    (base, handle)
}
