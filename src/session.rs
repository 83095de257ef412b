use crate::{
    error::{
        ChainError,
        Result,
    },
    types::{
        BackendRoomId,
        ChainGameId,
    },
};
use std::collections::{
    HashMap,
    HashSet,
};
use tracing::{
    debug,
    info,
    warn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RoomSelected,
    GameCreating { attempt: u64 },
    GameActive,
    Settling,
}

/// Proof that a create-game attempt was started for a given room selection.
/// Only the ticket of the latest selection can commit its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTicket {
    room: BackendRoomId,
    attempt: u64,
}

impl CreateTicket {
    pub fn room(&self) -> &BackendRoomId {
        &self.room
    }
}

/// Outcome of selecting a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The room has no pool yet; a creation may begin.
    New,
    /// A creation for the room is already in flight.
    Creating,
    /// The room already has a live pool this session.
    Active(ChainGameId),
    /// The room's pool was settled earlier this session.
    Settled(ChainGameId),
}

/// Ids correlating the spectated backend room with its on-chain pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    room: Option<BackendRoomId>,
    chain_game: Option<ChainGameId>,
    attempt: u64,
    in_flight: HashMap<BackendRoomId, u64>,
    issued: HashMap<BackendRoomId, ChainGameId>,
    settled: HashSet<ChainGameId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            room: None,
            chain_game: None,
            attempt: 0,
            in_flight: HashMap::new(),
            issued: HashMap::new(),
            settled: HashSet::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn room(&self) -> Option<&BackendRoomId> {
        self.room.as_ref()
    }

    pub fn chain_game(&self) -> Option<&ChainGameId> {
        self.chain_game.as_ref()
    }

    /// Pools created during this session, one per room at most.
    pub fn issued(&self) -> &HashMap<BackendRoomId, ChainGameId> {
        &self.issued
    }

    pub fn was_settled(&self, game: &ChainGameId) -> bool {
        self.settled.contains(game)
    }

    /// Stores `room` as the spectated room. Reselecting the current room keeps
    /// its pool or creation. Switching rooms releases the previous pool and
    /// makes its in-flight creation stale, unless the room switched back to
    /// already has one of its own.
    pub fn select_room(&mut self, room: BackendRoomId) -> Selection {
        if self.room.as_ref() == Some(&room) {
            match (self.phase, &self.chain_game) {
                (Phase::GameCreating { .. }, _) => {
                    debug!(%room, "room reselected while its pool is being created");
                    return Selection::Creating;
                }
                (Phase::GameActive, Some(game)) => {
                    debug!(%room, %game, "room reselected while its pool is active");
                    return Selection::Active(game.clone());
                }
                _ => {}
            }
        }
        if let Some(previous) = self.chain_game.take() {
            info!(%previous, "room changed, releasing previous chain game");
        }
        self.attempt += 1;
        info!(%room, attempt = self.attempt, "room selected");
        self.room = Some(room.clone());

        if let Some(&attempt) = self.in_flight.get(&room) {
            self.phase = Phase::GameCreating { attempt };
            return Selection::Creating;
        }
        match self.issued.get(&room).cloned() {
            Some(game) if self.settled.contains(&game) => {
                info!(%room, %game, "pool for this room was already settled");
                self.clear();
                Selection::Settled(game)
            }
            Some(game) => {
                info!(%room, %game, "resuming pool created earlier this session");
                self.chain_game = Some(game.clone());
                self.phase = Phase::GameActive;
                Selection::Active(game)
            }
            None => {
                self.phase = Phase::RoomSelected;
                Selection::New
            }
        }
    }

    /// Starts creating a pool for the selected room. Returns `None` unless a
    /// room is selected and no pool or creation exists for it yet.
    pub fn begin_create(&mut self) -> Option<CreateTicket> {
        if self.phase != Phase::RoomSelected {
            debug!(phase = ?self.phase, "create not started");
            return None;
        }
        let room = self.room.clone()?;
        self.phase = Phase::GameCreating {
            attempt: self.attempt,
        };
        self.in_flight.insert(room.clone(), self.attempt);
        Some(CreateTicket {
            room,
            attempt: self.attempt,
        })
    }

    pub fn is_current(&self, ticket: &CreateTicket) -> bool {
        self.phase
            == Phase::GameCreating {
                attempt: ticket.attempt,
            }
            && self.room.as_ref() == Some(&ticket.room)
    }

    /// Records a created pool under its room and makes it active if the ticket
    /// still matches the selection. A stale pool stays recorded so selecting
    /// its room again resumes it.
    pub fn commit_created(&mut self, ticket: &CreateTicket, game: ChainGameId) -> Result<()> {
        self.finish_in_flight(ticket);
        let current = self.is_current(ticket);
        if let Some(existing) = self.issued.get(&ticket.room) {
            warn!(room = %ticket.room, %existing, %game, "room already has a pool, keeping the first");
        } else {
            self.issued.insert(ticket.room.clone(), game.clone());
        }
        if !current {
            info!(room = %ticket.room, %game, "dropping stale create result");
            return Err(ChainError::StaleRoomSelection);
        }
        self.chain_game = Some(game);
        self.phase = Phase::GameActive;
        Ok(())
    }

    /// Clears both ids after a failed creation so the user can pick again.
    pub fn fail_create(&mut self, ticket: &CreateTicket) -> Result<()> {
        self.finish_in_flight(ticket);
        if !self.is_current(ticket) {
            return Err(ChainError::StaleRoomSelection);
        }
        self.clear();
        Ok(())
    }

    fn finish_in_flight(&mut self, ticket: &CreateTicket) {
        if self.in_flight.get(&ticket.room) == Some(&ticket.attempt) {
            self.in_flight.remove(&ticket.room);
        }
    }

    /// Abandons a selection before any creation started.
    pub fn abandon_selection(&mut self) {
        if self.phase == Phase::RoomSelected {
            self.clear();
        }
    }

    /// Takes the pool to settle. Yields it at most once.
    pub fn begin_settle(&mut self) -> Option<ChainGameId> {
        if self.phase != Phase::GameActive {
            return None;
        }
        let game = self.chain_game.take()?;
        if !self.settled.insert(game.clone()) {
            return None;
        }
        self.phase = Phase::Settling;
        Some(game)
    }

    pub fn finish_settle(&mut self) {
        if self.phase == Phase::Settling {
            self.clear();
        }
    }

    /// Drops all ids and returns to idle; pending creations become stale.
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.attempt += 1;
        self.room = None;
        self.chain_game = None;
        self.phase = Phase::Idle;
    }
}
