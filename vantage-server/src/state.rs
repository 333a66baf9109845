//! Server state management
//!
//! Shared state for game sessions.

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use vantage_core::{AlphaBetaAI, Color, GameSession, SearchLimits};

use crate::ServerConfig;

/// A session plus the engine settings it was started with
#[derive(Clone, Debug)]
pub struct HostedGame {
    pub session: GameSession,
    /// Side the human plays; the engine answers for the other
    pub player_color: Color,
    pub limits: SearchLimits,
}

impl HostedGame {
    pub fn ai(&self) -> AlphaBetaAI {
        AlphaBetaAI {
            limits: self.limits,
            ..AlphaBetaAI::default()
        }
    }
}

/// A hosted game tagged with its creation order
#[derive(Clone, Debug)]
struct StoredGame {
    seq: u64,
    game: HostedGame,
}

/// Server-wide shared state
pub struct ServerState {
    pub config: ServerConfig,
    games: RwLock<FxHashMap<String, StoredGame>>,
    next_id: AtomicU64,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            games: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Search limits for a request, falling back to the server defaults
    pub fn limits(&self, depth: Option<i32>, time_limit_ms: Option<u64>) -> SearchLimits {
        SearchLimits {
            depth: depth.unwrap_or(self.config.default_depth),
            time_limit: time_limit_ms
                .or(self.config.time_limit_ms)
                .map(Duration::from_millis),
        }
    }

    /// Store a new game and return its id. At capacity the oldest
    /// finished game is dropped, or the oldest game if none has finished.
    pub fn insert_game(&self, game: HostedGame) -> String {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = format!("g{}", seq);

        let mut games = self.games_mut();
        while !games.is_empty() && games.len() >= self.config.max_games.max(1) {
            let Some(evicted) = oldest_evictable(&games) else {
                break;
            };
            games.remove(&evicted);
            tracing::debug!(id = %evicted, "evicted hosted game");
        }
        games.insert(id.clone(), StoredGame { seq, game });
        id
    }

    pub fn game(&self, id: &str) -> Option<HostedGame> {
        self.games().get(id).map(|stored| stored.game.clone())
    }

    /// Replace a stored game if nobody moved in it since it was read at
    /// `base_plies`. None if the id is unknown, Some(false) if stale.
    pub fn update_game(&self, id: &str, base_plies: usize, game: HostedGame) -> Option<bool> {
        let mut games = self.games_mut();
        let slot = games.get_mut(id)?;
        if slot.game.session.history().len() != base_plies {
            return Some(false);
        }
        slot.game = game;
        Some(true)
    }

    pub fn game_count(&self) -> usize {
        self.games().len()
    }

    // Games are only ever replaced whole, so a poisoned map is still consistent
    fn games(&self) -> RwLockReadGuard<'_, FxHashMap<String, StoredGame>> {
        self.games.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn games_mut(&self) -> RwLockWriteGuard<'_, FxHashMap<String, StoredGame>> {
        self.games.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn oldest_evictable(games: &FxHashMap<String, StoredGame>) -> Option<String> {
    let oldest = |finished_only: bool| {
        games
            .iter()
            .filter(|(_, stored)| !finished_only || stored.game.session.status().is_over())
            .min_by_key(|(_, stored)| stored.seq)
            .map(|(id, _)| id.clone())
    };
    oldest(true).or_else(|| oldest(false))
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
