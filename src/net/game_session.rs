//! Game session - owns the world, runs the tick loop and broadcasts deltas
//!
//! All world mutation goes through the session's write lock: intake calls
//! and the tick never interleave. The tick loop is a single task on a fixed
//! interval, so a slow tick delays the next one instead of doubling up.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ServerConfig, SimulationConfig};
use crate::game::constants::net::MAX_BROADCAST_SIZE;
use crate::game::constants::tick::STATUS_LOG_INTERVAL;
use crate::game::intake::{self, Applied, IntakeError};
use crate::game::simulation::{self, TickReport};
use crate::game::state::{PlayerId, WorldState};
use crate::metrics::Metrics;
use crate::net::delta::{DeltaStats, DeltaTracker};
use crate::net::framing::{self, FramingError};
use crate::net::protocol::{
    decode, encode, ClientMessage, DecodeError, EncodeError, ServerMessage, StateDelta,
    WorldSnapshot,
};

/// Length-prefixed encoded message, shared by every subscriber
pub type Frame = Arc<[u8]>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Rejected action: {0}")]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Framing(#[from] FramingError),
}

/// Reply to a join: the new id and a full snapshot that includes it
#[derive(Debug, Clone)]
pub struct JoinAccepted {
    pub player_id: PlayerId,
    pub snapshot: WorldSnapshot,
}

impl JoinAccepted {
    pub fn into_message(self) -> ServerMessage {
        ServerMessage::Welcome {
            player_id: self.player_id,
            snapshot: self.snapshot,
        }
    }

    /// Encoded and framed welcome message
    pub fn to_frame(&self) -> Result<Frame, SessionError> {
        encode_frame(&self.clone().into_message(), MAX_BROADCAST_SIZE)
    }
}

/// Encode a server message into a frame of at most `limit` payload bytes
pub fn encode_frame(message: &ServerMessage, limit: usize) -> Result<Frame, SessionError> {
    let payload = encode(message)?;
    Ok(framing::frame_with_limit(&payload, limit)?.into())
}

/// Authoritative session state
pub struct GameSession {
    world: WorldState,
    tracker: DeltaTracker,
    config: SimulationConfig,
    dt: f32,
    max_frame_size: usize,
    metrics: Arc<Metrics>,
}

impl GameSession {
    pub fn new(config: &ServerConfig, metrics: Arc<Metrics>) -> Self {
        let world = match config.rng_seed {
            Some(seed) => WorldState::with_seed(seed),
            None => WorldState::new(),
        };
        Self {
            world,
            tracker: DeltaTracker::new(),
            config: config.simulation.clone(),
            dt: config.dt(),
            max_frame_size: config.max_frame_size,
            metrics,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn player_count(&self) -> usize {
        self.world.player_count()
    }

    /// Add a player with default state
    pub fn join(&mut self) -> JoinAccepted {
        let player_id = self.world.add_player(&self.config);
        self.tracker.record_join(player_id);
        self.metrics.joins_total.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .players
            .store(self.world.player_count() as u64, Ordering::Relaxed);
        info!("Player {} joined ({} players)", player_id, self.world.player_count());

        JoinAccepted {
            player_id,
            snapshot: WorldSnapshot::from_world(&self.world),
        }
    }

    /// Validate and apply a client message
    pub fn submit(
        &mut self,
        player_id: PlayerId,
        message: ClientMessage,
    ) -> Result<Applied, SessionError> {
        match intake::submit(&mut self.world, player_id, message) {
            Ok(applied) => {
                self.metrics.actions_accepted.fetch_add(1, Ordering::Relaxed);
                if applied == Applied::Left {
                    self.on_left(player_id);
                }
                Ok(applied)
            }
            Err(e) => {
                self.metrics.actions_dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Dropped action from player {}: {}", player_id, e);
                Err(e.into())
            }
        }
    }

    /// Decode a bincode client message and apply it
    pub fn submit_frame(&mut self, player_id: PlayerId, data: &[u8]) -> Result<Applied, SessionError> {
        let message: ClientMessage = decode(data).map_err(|e| {
            self.metrics.actions_dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Undecodable message from player {}: {}", player_id, e);
            e
        })?;
        self.submit(player_id, message)
    }

    /// Remove a player (disconnect). Returns false if it was already gone.
    pub fn leave(&mut self, player_id: PlayerId) -> bool {
        if self.world.remove_player(player_id).is_none() {
            return false;
        }
        self.on_left(player_id);
        true
    }

    fn on_left(&mut self, player_id: PlayerId) {
        self.tracker.record_leave(player_id);
        self.metrics.leaves_total.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .players
            .store(self.world.player_count() as u64, Ordering::Relaxed);
        info!("Player {} left ({} players)", player_id, self.world.player_count());
    }

    /// Advance one tick and build its delta
    pub fn tick(&mut self) -> (TickReport, StateDelta) {
        let report = simulation::advance(&mut self.world, &self.config, self.dt);
        let delta = self.tracker.build(&self.world, &report.changed);

        self.metrics
            .projectiles
            .store(self.world.projectile_count() as u64, Ordering::Relaxed);
        self.metrics
            .kills_total
            .fetch_add(report.kills.len() as u64, Ordering::Relaxed);
        self.metrics
            .abilities_dropped
            .fetch_add(report.abilities_dropped as u64, Ordering::Relaxed);

        (report, delta)
    }

    /// Advance one tick and encode its delta. A delta that cannot be encoded
    /// goes back to the tracker, so its joins, leaves and updates are sent
    /// with the next frame instead.
    pub fn tick_frame(&mut self) -> (TickReport, DeltaStats, Option<Frame>) {
        let (report, delta) = self.tick();
        let stats = DeltaStats::of(&delta);
        let message = ServerMessage::Delta(delta);

        match encode_frame(&message, self.max_frame_size) {
            Ok(frame) => (report, stats, Some(frame)),
            Err(e) => {
                warn!("Deferring delta for tick {}: {}", report.tick, e);
                if let ServerMessage::Delta(delta) = &message {
                    self.tracker.restore(delta);
                }
                self.metrics.deltas_deferred.fetch_add(1, Ordering::Relaxed);
                (report, stats, None)
            }
        }
    }
}

/// Shared handle used by transports and the tick loop
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<RwLock<GameSession>>,
    frames: broadcast::Sender<Frame>,
    metrics: Arc<Metrics>,
}

impl SessionHandle {
    pub fn new(config: &ServerConfig, metrics: Arc<Metrics>) -> Self {
        let (frames, _) = broadcast::channel(config.broadcast_capacity.max(1));
        let session = GameSession::new(config, metrics.clone());
        Self {
            session: Arc::new(RwLock::new(session)),
            frames,
            metrics,
        }
    }

    pub fn session(&self) -> &Arc<RwLock<GameSession>> {
        &self.session
    }

    /// Receive every delta frame from the next tick on
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub async fn join(&self) -> JoinAccepted {
        self.session.write().await.join()
    }

    pub async fn submit(
        &self,
        player_id: PlayerId,
        message: ClientMessage,
    ) -> Result<Applied, SessionError> {
        self.session.write().await.submit(player_id, message)
    }

    pub async fn submit_frame(&self, player_id: PlayerId, data: &[u8]) -> Result<Applied, SessionError> {
        self.session.write().await.submit_frame(player_id, data)
    }

    pub async fn leave(&self, player_id: PlayerId) -> bool {
        self.session.write().await.leave(player_id)
    }

    /// Run one tick and broadcast its delta. Returns the report and the
    /// encoded frame size.
    pub async fn step(&self) -> (TickReport, usize) {
        let (report, stats, frame) = self.session.write().await.tick_frame();
        let Some(frame) = frame else {
            return (report, 0);
        };
        let size = frame.len();

        // No subscribers is not an error; the frame is simply dropped
        let receivers = self.frames.send(frame).unwrap_or(0);
        self.metrics.record_broadcast(size, receivers);

        if stats.created + stats.removed > 0 {
            debug!(
                "Tick {}: {} created, {} updated, {} removed, {} projectiles",
                report.tick, stats.created, stats.updated, stats.removed, stats.projectiles
            );
        }

        (report, size)
    }
}

/// Start the fixed-rate tick loop
pub fn start_game_loop(handle: SessionHandle, tick_duration: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Game loop started ({:?} per tick)", tick_duration);

        loop {
            ticker.tick().await;

            let started = Instant::now();
            let (report, bytes) = handle.step().await;
            let elapsed = started.elapsed();
            handle.metrics.record_tick_time(elapsed);

            if elapsed > tick_duration {
                warn!("Tick {} took {:?} (budget {:?})", report.tick, elapsed, tick_duration);
            }

            if report.tick % STATUS_LOG_INTERVAL == 0 {
                let session = handle.session.read().await;
                info!(
                    "Tick {}: {} players, {} projectiles, {} bytes last delta",
                    report.tick,
                    session.player_count(),
                    session.world().projectile_count(),
                    bytes
                );
            }
        }
    })
}
