use std::sync::Arc;

use carrom_core::{PlayerNumber, ShotEvent};
use proto::{
    encode, player_prefix, session_prefix, Field, GameSession, PlayerRecord, SessionStatus,
};
use rand::Rng;

use crate::convert::shot_record;
use crate::env::Environment;
use crate::error::SyncError;
use crate::store::{ClientId, ListenerId, Listener, SharedStore, Snapshot};

/// Length of generated session codes
pub const SESSION_CODE_LEN: usize = 6;

const CODE_ATTEMPTS: usize = 8;

/// Generate a random session code (A-Z, 0-9)
pub fn generate_session_code() -> String {
    let mut rng = rand::thread_rng();
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..SESSION_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARS.len());
            CHARS[idx] as char
        })
        .collect()
}

/// Codes are typed by people; accept any case and stray whitespace
pub fn normalize_session_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// One client's view of a replicated session
///
/// The stored session is the only shared truth. Every publish re-reads the
/// stored turn owner first and is refused unless it is the local player.
/// Leaving, explicitly or on drop, unsubscribes every listener and removes
/// the local player's record.
pub struct SyncChannel {
    store: Arc<dyn SharedStore>,
    env: Arc<dyn Environment>,
    client_id: Option<ClientId>,
    session_id: Option<String>,
    player: Option<PlayerNumber>,
    listeners: Vec<ListenerId>,
}

impl SyncChannel {
    pub fn new(store: Arc<dyn SharedStore>, env: Arc<dyn Environment>) -> Self {
        Self {
            store,
            env,
            client_id: None,
            session_id: None,
            player: None,
            listeners: Vec::new(),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Local player number once created or joined
    pub fn player(&self) -> Option<PlayerNumber> {
        self.player
    }

    pub fn is_my_turn(&self, current_turn: u8) -> bool {
        self.player.map(PlayerNumber::as_u8) == Some(current_turn)
    }

    pub fn now_ms(&self) -> u64 {
        self.env.now_ms()
    }

    fn connect(&mut self) -> Result<ClientId, SyncError> {
        if let Some(client) = &self.client_id {
            return Ok(client.clone());
        }
        let client = self
            .store
            .authenticate()
            .map_err(SyncError::ConnectionFailure)?;
        log::info!("Sync: Authenticated as {client}");
        self.client_id = Some(client.clone());
        Ok(client)
    }

    fn write_field<T: serde::Serialize>(
        &self,
        session_id: &str,
        field: Field,
        value: &T,
    ) -> Result<(), SyncError> {
        self.store.write(&field.key(session_id), encode(value)?)?;
        Ok(())
    }

    /// Draw codes from `next` until one has no stored session
    pub(crate) fn unused_code(
        &self,
        mut next: impl FnMut() -> String,
    ) -> Result<String, SyncError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = next();
            if self.store.read_prefix(&session_prefix(&code))?.is_empty() {
                return Ok(code);
            }
            log::debug!("Sync: Session code {code} taken, drawing another");
        }
        Err(SyncError::NoFreeCode(CODE_ATTEMPTS))
    }

    /// Host a new session as player 1 and return its code
    pub fn create_session(&mut self, name: &str) -> Result<String, SyncError> {
        self.leave_if_joined()?;
        let client = self.connect()?;
        let session_id = self.unused_code(generate_session_code)?;

        let session = GameSession {
            session_id: session_id.clone(),
            host_id: client.clone(),
            status: SessionStatus::Waiting,
            current_turn: PlayerNumber::One.as_u8(),
            players: [
                Some(PlayerRecord {
                    id: client.clone(),
                    name: name.to_string(),
                    score: 0,
                }),
                None,
            ],
            created_at: self.env.now_ms(),
            ..Default::default()
        };
        for (key, value) in session.to_fields()? {
            self.store.write(&key, value)?;
        }
        self.store
            .delete_on_disconnect(&client, &player_prefix(&session_id, 1))?;

        log::info!("Sync: Created session {session_id} for {name}");
        self.session_id = Some(session_id.clone());
        self.player = Some(PlayerNumber::One);
        Ok(session_id)
    }

    /// Join an existing session as player 2
    ///
    /// Nothing is written unless the session exists and has a free seat.
    pub fn join_session(&mut self, code: &str, name: &str) -> Result<(), SyncError> {
        self.leave_if_joined()?;
        let client = self.connect()?;
        let session_id = normalize_session_code(code);

        let session = self
            .read_session(&session_id)?
            .ok_or_else(|| SyncError::SessionNotFound(session_id.clone()))?;
        if session.player(2).is_some() {
            log::info!("Sync: Session {session_id} is full");
            return Err(SyncError::SessionFull(session_id));
        }

        self.write_field(&session_id, Field::PlayerId(2), &client)?;
        self.write_field(&session_id, Field::PlayerName(2), &name.to_string())?;
        self.write_field(&session_id, Field::PlayerScore(2), &0u32)?;
        self.write_field(&session_id, Field::Status, &SessionStatus::Playing)?;
        self.store
            .delete_on_disconnect(&client, &player_prefix(&session_id, 2))?;

        log::info!("Sync: {name} joined session {session_id}");
        self.session_id = Some(session_id);
        self.player = Some(PlayerNumber::Two);
        Ok(())
    }

    fn read_session(&self, session_id: &str) -> Result<Option<GameSession>, SyncError> {
        let snapshot = self.store.read_prefix(&session_prefix(session_id))?;
        Ok(decode_snapshot(session_id, &snapshot)?)
    }

    /// Current stored state of the joined session
    pub fn session(&self) -> Result<GameSession, SyncError> {
        let session_id = self.session_id.as_deref().ok_or(SyncError::NotInSession)?;
        self.read_session(session_id)?
            .ok_or_else(|| SyncError::SessionNotFound(session_id.to_string()))
    }

    /// Deliver every session update, starting with the current state
    ///
    /// The callback may run on whichever thread wrote to the store.
    pub fn subscribe<F>(&mut self, callback: F) -> Result<ListenerId, SyncError>
    where
        F: Fn(GameSession) + Send + Sync + 'static,
    {
        let session_id = self
            .session_id
            .clone()
            .ok_or(SyncError::NotInSession)?;
        let prefix = session_prefix(&session_id);
        let listener: Listener = Arc::new(move |snapshot: &Snapshot| {
            match decode_snapshot(&session_id, snapshot) {
                Ok(Some(session)) => callback(session),
                Ok(None) => {}
                Err(e) => log::warn!("Sync: Dropping malformed update for {session_id}: {e}"),
            }
        });
        let id = self.store.subscribe(&prefix, listener)?;
        self.listeners.push(id);
        Ok(id)
    }

    /// Check the stored turn owner against the local player
    fn require_turn(&self) -> Result<(String, PlayerNumber, GameSession), SyncError> {
        let player = self.player.ok_or(SyncError::NotInSession)?;
        let session = self.session()?;
        if session.current_turn != player.as_u8() {
            log::debug!(
                "Sync: Refusing publish by player {player} during turn {}",
                session.current_turn
            );
            return Err(SyncError::OutOfTurn {
                current: session.current_turn,
                local: player.as_u8(),
            });
        }
        Ok((session.session_id.clone(), player, session))
    }

    /// Hand the turn to the opponent
    pub fn publish_turn(&self, next: PlayerNumber) -> Result<(), SyncError> {
        let (session_id, player, _) = self.require_turn()?;
        if next != player.other() {
            return Err(SyncError::InvalidTurn {
                expected: player.other().as_u8(),
                requested: next.as_u8(),
            });
        }
        self.write_field(&session_id, Field::CurrentTurn, &next.as_u8())?;
        log::debug!("Sync: Turn passed to player {next}");
        Ok(())
    }

    /// Store a player's score; scores never go down
    pub fn publish_score(&self, player: PlayerNumber, value: u32) -> Result<(), SyncError> {
        let (session_id, _, session) = self.require_turn()?;
        let stored = session.score(player.as_u8());
        if value < stored {
            return Err(SyncError::ScoreRegression {
                player: player.as_u8(),
                stored,
                requested: value,
            });
        }
        self.write_field(&session_id, Field::PlayerScore(player.as_u8()), &value)
    }

    /// Mirror a local shot so the opponent can replay it
    pub fn publish_shot(&self, shot: &ShotEvent) -> Result<(), SyncError> {
        let (session_id, player, session) = self.require_turn()?;
        if shot.player != player {
            return Err(SyncError::OutOfTurn {
                current: session.current_turn,
                local: shot.player.as_u8(),
            });
        }
        self.write_field(&session_id, Field::LastShot, &shot_record(shot))
    }

    /// Mark the session finished
    pub fn finish_session(&self, winner: Option<PlayerNumber>) -> Result<(), SyncError> {
        let (session_id, _, _) = self.require_turn()?;
        self.write_field(&session_id, Field::Status, &SessionStatus::Finished)?;
        if let Some(winner) = winner {
            self.write_field(&session_id, Field::Winner, &winner.as_u8())?;
        }
        self.write_field(&session_id, Field::EndedAt, &self.env.now_ms())?;
        log::info!("Sync: Session {session_id} finished");
        Ok(())
    }

    /// Drop every listener and remove the local player's record
    ///
    /// Both steps always run; the first failure is returned afterwards.
    pub fn leave_session(&mut self) -> Result<(), SyncError> {
        let mut first_error: Option<SyncError> = None;

        for id in self.listeners.drain(..) {
            if let Err(e) = self.store.unsubscribe(id) {
                first_error.get_or_insert(e.into());
            }
        }

        if let (Some(session_id), Some(player)) = (self.session_id.take(), self.player.take()) {
            match self
                .store
                .delete_prefix(&player_prefix(&session_id, player.as_u8()))
            {
                Ok(()) => log::info!("Sync: Player {player} left session {session_id}"),
                Err(e) => {
                    log::warn!("Sync: Could not remove player {player} from {session_id}: {e}");
                    first_error.get_or_insert(e.into());
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn leave_if_joined(&mut self) -> Result<(), SyncError> {
        if self.session_id.is_some() {
            self.leave_session()?;
        }
        Ok(())
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        if self.session_id.is_none() && self.listeners.is_empty() {
            return;
        }
        if let Err(e) = self.leave_session() {
            log::warn!("Sync: Cleanup on drop failed: {e}");
        }
    }
}

fn decode_snapshot(
    session_id: &str,
    snapshot: &Snapshot,
) -> Result<Option<GameSession>, postcard::Error> {
    GameSession::from_fields(
        session_id,
        snapshot
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_slice())),
    )
}
