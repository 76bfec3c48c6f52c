//! Prometheus-compatible metrics endpoint
//!
//! Exposes simulation and broadcast counters in Prometheus text format, plus
//! a JSON view and a health check.
//! Default endpoint: http://localhost:9090/metrics

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Samples kept for tick time percentiles
const TICK_HISTORY_LEN: usize = 1000;

/// Metrics registry for the server
#[derive(Debug)]
pub struct Metrics {
    // Entity counts
    pub players: AtomicU64,
    pub projectiles: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // Intake
    pub joins_total: AtomicU64,
    pub leaves_total: AtomicU64,
    pub actions_accepted: AtomicU64,
    pub actions_dropped: AtomicU64,
    pub abilities_dropped: AtomicU64,

    // Gameplay
    pub kills_total: AtomicU64,

    // Broadcast
    pub deltas_sent: AtomicU64,
    pub deltas_deferred: AtomicU64,
    pub bytes_sent: AtomicU64,
    pub subscribers: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            players: AtomicU64::new(0),
            projectiles: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            joins_total: AtomicU64::new(0),
            leaves_total: AtomicU64::new(0),
            actions_accepted: AtomicU64::new(0),
            actions_dropped: AtomicU64::new(0),
            abilities_dropped: AtomicU64::new(0),
            kills_total: AtomicU64::new(0),
            deltas_sent: AtomicU64::new(0),
            deltas_deferred: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            subscribers: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let last = sorted.len() - 1;
            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(last)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(last)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted[last], Ordering::Relaxed);
        }
    }

    /// Count a broadcast frame
    pub fn record_broadcast(&self, bytes: usize, subscribers: usize) {
        self.deltas_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.subscribers.store(subscribers as u64, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("arena_sync_players", "Connected players", "gauge",
            self.players.load(Ordering::Relaxed));
        metric!("arena_sync_projectiles", "Live projectiles", "gauge",
            self.projectiles.load(Ordering::Relaxed));

        metric!("arena_sync_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("arena_sync_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("arena_sync_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("arena_sync_tick_time_max_microseconds", "Maximum recent tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("arena_sync_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("arena_sync_joins_total", "Players joined", "counter",
            self.joins_total.load(Ordering::Relaxed));
        metric!("arena_sync_leaves_total", "Players left", "counter",
            self.leaves_total.load(Ordering::Relaxed));
        metric!("arena_sync_actions_accepted_total", "Client actions accepted", "counter",
            self.actions_accepted.load(Ordering::Relaxed));
        metric!("arena_sync_actions_dropped_total", "Client actions rejected at intake", "counter",
            self.actions_dropped.load(Ordering::Relaxed));
        metric!("arena_sync_abilities_dropped_total", "Queued ability uses refused at resolution", "counter",
            self.abilities_dropped.load(Ordering::Relaxed));
        metric!("arena_sync_kills_total", "Players killed", "counter",
            self.kills_total.load(Ordering::Relaxed));

        metric!("arena_sync_deltas_sent_total", "Delta frames broadcast", "counter",
            self.deltas_sent.load(Ordering::Relaxed));
        metric!("arena_sync_deltas_deferred_total", "Deltas that failed to encode and were folded into the next tick", "counter",
            self.deltas_deferred.load(Ordering::Relaxed));
        metric!("arena_sync_bytes_sent_total", "Delta bytes broadcast", "counter",
            self.bytes_sent.load(Ordering::Relaxed));
        metric!("arena_sync_subscribers", "Broadcast subscribers", "gauge",
            self.subscribers.load(Ordering::Relaxed));
        metric!("arena_sync_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON view of the same counters
    pub fn to_json(&self) -> String {
        let load = |v: &AtomicU64| v.load(Ordering::Relaxed);
        serde_json::json!({
            "entities": {
                "players": load(&self.players),
                "projectiles": load(&self.projectiles),
            },
            "performance": {
                "tick_time_us": load(&self.tick_time_us),
                "tick_time_p95_us": load(&self.tick_time_p95_us),
                "tick_time_p99_us": load(&self.tick_time_p99_us),
                "tick_time_max_us": load(&self.tick_time_max_us),
                "tick_count": load(&self.tick_count),
            },
            "intake": {
                "joins": load(&self.joins_total),
                "leaves": load(&self.leaves_total),
                "accepted": load(&self.actions_accepted),
                "dropped": load(&self.actions_dropped),
                "abilities_dropped": load(&self.abilities_dropped),
            },
            "game": {
                "kills": load(&self.kills_total),
            },
            "network": {
                "deltas_sent": load(&self.deltas_sent),
                "deltas_deferred": load(&self.deltas_deferred),
                "bytes_sent": load(&self.bytes_sent),
                "subscribers": load(&self.subscribers),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
        .to_string()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}

/// Route a raw HTTP request to a full response
fn respond(metrics: &Metrics, request: &str) -> String {
    if request.starts_with("GET /metrics/json") {
        http_response("200 OK", "application/json", &metrics.to_json())
    } else if request.starts_with("GET /metrics") {
        http_response("200 OK", "text/plain; version=0.0.4", &metrics.to_prometheus())
    } else if request.starts_with("GET /health") {
        http_response("200 OK", "text/plain", "OK")
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
    }
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = respond(&metrics, &request);
                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}
