//! Shared session state for carrom
//!
//! A session lives in the shared store as one key per field under
//! `sessions/<id>/`. Every value is postcard-encoded so each field can be
//! overwritten on its own.

use postcard::{from_bytes, to_allocvec};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Root of every session in the store
pub const SESSIONS_ROOT: &str = "sessions";

// ============================================================================
// Schema
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Host is waiting for an opponent
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Playing => "playing",
            SessionStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Last shot taken, replayed by the opponent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub player: u8, // 1 or 2
    pub force: Vec2f,
    pub position: Vec2f,
    pub timestamp: u64, // ms since epoch
}

/// Full view of one session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameSession {
    pub session_id: String,
    pub host_id: String,
    pub status: SessionStatus,
    pub current_turn: u8,
    pub players: [Option<PlayerRecord>; 2],
    pub last_shot: Option<ShotRecord>,
    pub created_at: u64,
    pub winner: Option<u8>,
    pub ended_at: Option<u64>,
}

impl GameSession {
    /// Record of player 1 or 2
    pub fn player(&self, number: u8) -> Option<&PlayerRecord> {
        match number {
            1 | 2 => self.players[usize::from(number - 1)].as_ref(),
            _ => None,
        }
    }

    pub fn score(&self, number: u8) -> u32 {
        self.player(number).map(|p| p.score).unwrap_or(0)
    }

    pub fn is_full(&self) -> bool {
        self.players.iter().all(Option::is_some)
    }

    /// Encode every present field as `(key, value)` pairs
    pub fn to_fields(&self) -> Result<Vec<(String, Vec<u8>)>, postcard::Error> {
        let id = &self.session_id;
        let mut fields = vec![
            (Field::HostId.key(id), encode(&self.host_id)?),
            (Field::Status.key(id), encode(&self.status)?),
            (Field::CurrentTurn.key(id), encode(&self.current_turn)?),
            (Field::CreatedAt.key(id), encode(&self.created_at)?),
        ];
        for (index, player) in self.players.iter().enumerate() {
            let Some(player) = player else { continue };
            let n = index as u8 + 1;
            fields.push((Field::PlayerId(n).key(id), encode(&player.id)?));
            fields.push((Field::PlayerName(n).key(id), encode(&player.name)?));
            fields.push((Field::PlayerScore(n).key(id), encode(&player.score)?));
        }
        if let Some(shot) = &self.last_shot {
            fields.push((Field::LastShot.key(id), encode(shot)?));
        }
        if let Some(winner) = self.winner {
            fields.push((Field::Winner.key(id), encode(&winner)?));
        }
        if let Some(ended_at) = self.ended_at {
            fields.push((Field::EndedAt.key(id), encode(&ended_at)?));
        }
        Ok(fields)
    }

    /// Rebuild a session from its stored fields
    ///
    /// Returns `None` when no field of the session exists. Missing fields
    /// keep their defaults; a player exists once its id has been written.
    /// Keys outside the session are ignored.
    pub fn from_fields<'a, I>(session_id: &str, fields: I) -> Result<Option<Self>, postcard::Error>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let prefix = session_prefix(session_id);
        let mut session = GameSession {
            session_id: session_id.to_string(),
            current_turn: 1,
            ..Default::default()
        };
        let mut names: [Option<String>; 2] = [None, None];
        let mut scores: [Option<u32>; 2] = [None, None];
        let mut found = false;

        for (key, value) in fields {
            let Some(field) = key.strip_prefix(prefix.as_str()).and_then(Field::parse) else {
                continue;
            };
            found = true;
            match field {
                Field::HostId => session.host_id = decode(value)?,
                Field::Status => session.status = decode(value)?,
                Field::CurrentTurn => session.current_turn = decode(value)?,
                Field::CreatedAt => session.created_at = decode(value)?,
                Field::LastShot => session.last_shot = Some(decode(value)?),
                Field::Winner => session.winner = Some(decode(value)?),
                Field::EndedAt => session.ended_at = Some(decode(value)?),
                Field::PlayerId(n) => {
                    let record = PlayerRecord {
                        id: decode(value)?,
                        ..Default::default()
                    };
                    session.players[usize::from(n - 1)] = Some(record);
                }
                Field::PlayerName(n) => names[usize::from(n - 1)] = Some(decode(value)?),
                Field::PlayerScore(n) => scores[usize::from(n - 1)] = Some(decode(value)?),
            }
        }

        if !found {
            return Ok(None);
        }
        for (index, player) in session.players.iter_mut().enumerate() {
            if let Some(player) = player {
                player.name = names[index].take().unwrap_or_default();
                player.score = scores[index].unwrap_or(0);
            }
        }
        Ok(Some(session))
    }
}

// ============================================================================
// Key layout
// ============================================================================

/// One stored field of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    HostId,
    Status,
    CurrentTurn,
    CreatedAt,
    LastShot,
    Winner,
    EndedAt,
    PlayerId(u8),
    PlayerName(u8),
    PlayerScore(u8),
}

impl Field {
    /// Key path relative to the session prefix
    pub fn path(self) -> String {
        match self {
            Field::HostId => "hostId".to_string(),
            Field::Status => "status".to_string(),
            Field::CurrentTurn => "currentTurn".to_string(),
            Field::CreatedAt => "createdAt".to_string(),
            Field::LastShot => "lastShot".to_string(),
            Field::Winner => "winner".to_string(),
            Field::EndedAt => "endedAt".to_string(),
            Field::PlayerId(n) => format!("players/{n}/id"),
            Field::PlayerName(n) => format!("players/{n}/name"),
            Field::PlayerScore(n) => format!("players/{n}/score"),
        }
    }

    /// Full store key of this field in a session
    pub fn key(self, session_id: &str) -> String {
        format!("{}{}", session_prefix(session_id), self.path())
    }

    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "hostId" => return Some(Field::HostId),
            "status" => return Some(Field::Status),
            "currentTurn" => return Some(Field::CurrentTurn),
            "createdAt" => return Some(Field::CreatedAt),
            "lastShot" => return Some(Field::LastShot),
            "winner" => return Some(Field::Winner),
            "endedAt" => return Some(Field::EndedAt),
            _ => {}
        }
        let mut parts = path.strip_prefix("players/")?.split('/');
        let n: u8 = parts.next()?.parse().ok()?;
        if !(1..=2).contains(&n) {
            return None;
        }
        let field = match parts.next()? {
            "id" => Field::PlayerId(n),
            "name" => Field::PlayerName(n),
            "score" => Field::PlayerScore(n),
            _ => return None,
        };
        match parts.next() {
            None => Some(field),
            Some(_) => None,
        }
    }
}

/// Prefix shared by every key of a session, with trailing slash
pub fn session_prefix(session_id: &str) -> String {
    format!("{SESSIONS_ROOT}/{session_id}/")
}

/// Prefix of one player's record, with trailing slash
pub fn player_prefix(session_id: &str, number: u8) -> String {
    format!("{}players/{number}/", session_prefix(session_id))
}

// ============================================================================
// Serialization Helpers
// ============================================================================

/// Encode one field value
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, postcard::Error> {
    to_allocvec(value)
}

/// Decode one field value
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, postcard::Error> {
    from_bytes(bytes)
}
