//! Share codes and the leaderboard contract.
//!
//! A created game is addressed by a 10-character alphanumeric [`GameCode`].
//! Players append results under a code and read them back ranked. Real
//! persistence lives with the host; [`MemoryStore`] is the in-process
//! reference implementation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use drop_engine::RandomSource;

use crate::catalog::ItemKey;

pub const GAME_CODE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameCodeError {
    #[error("game code must be 10 characters, got {0}")]
    WrongLength(usize),
    #[error("game code contains '{0}'; only A-Z, a-z and 0-9 are allowed")]
    InvalidChar(char),
}

/// A validated share code matching `^[A-Za-z0-9]{10}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameCode(String);

impl GameCode {
    /// Fresh unbiased code.
    pub fn generate(rng: &mut RandomSource) -> Self {
        Self(rng.random_alphanumeric(GAME_CODE_LEN))
    }

    pub fn parse(code: &str) -> Result<Self, GameCodeError> {
        let len = code.chars().count();
        if len != GAME_CODE_LEN {
            return Err(GameCodeError::WrongLength(len));
        }
        if let Some(bad) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(GameCodeError::InvalidChar(bad));
        }
        Ok(Self(code.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for GameCode {
    type Err = GameCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GameCode {
    type Error = GameCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the create-game flow submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub creator: String,
    pub liked_keys: Vec<ItemKey>,
    pub disliked_keys: Vec<ItemKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub code: GameCode,
    pub creator: String,
    pub liked_keys: Vec<ItemKey>,
    pub disliked_keys: Vec<ItemKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub player: String,
    pub score: i64,
}

/// Results for one game, best first. Equal scores keep submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub game: GameCode,
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    InvalidCode(#[from] GameCodeError),
    #[error("no game with code {0}")]
    NotFound(GameCode),
}

/// Document-store operations the game needs. Every call taking a raw code
/// validates it first.
pub trait GameStore {
    fn create_game(&mut self, game: NewGame) -> Result<GameRecord, StoreError>;

    fn fetch_game(&self, code: &str) -> Result<GameRecord, StoreError>;

    fn append_result(&mut self, code: &str, result: ResultRecord) -> Result<(), StoreError>;

    fn fetch_leaderboard(&self, code: &str) -> Result<Leaderboard, StoreError>;
}

#[derive(Debug)]
struct StoredGame {
    record: GameRecord,
    results: Vec<ResultRecord>,
}

#[derive(Debug)]
pub struct MemoryStore {
    rng: RandomSource,
    games: HashMap<GameCode, StoredGame>,
}

impl MemoryStore {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            rng,
            games: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    fn stored(&self, code: &str) -> Result<&StoredGame, StoreError> {
        let code = GameCode::parse(code)?;
        self.games.get(&code).ok_or(StoreError::NotFound(code))
    }
}

impl GameStore for MemoryStore {
    fn create_game(&mut self, game: NewGame) -> Result<GameRecord, StoreError> {
        let mut code = GameCode::generate(&mut self.rng);
        while self.games.contains_key(&code) {
            code = GameCode::generate(&mut self.rng);
        }
        let record = GameRecord {
            code: code.clone(),
            creator: game.creator,
            liked_keys: game.liked_keys,
            disliked_keys: game.disliked_keys,
        };
        self.games.insert(
            code.clone(),
            StoredGame {
                record: record.clone(),
                results: Vec::new(),
            },
        );
        log::info!("game {} created", code);
        Ok(record)
    }

    fn fetch_game(&self, code: &str) -> Result<GameRecord, StoreError> {
        Ok(self.stored(code)?.record.clone())
    }

    fn append_result(&mut self, code: &str, result: ResultRecord) -> Result<(), StoreError> {
        let code = GameCode::parse(code)?;
        let Some(game) = self.games.get_mut(&code) else {
            return Err(StoreError::NotFound(code));
        };
        log::debug!("game {}: {} scored {}", code, result.player, result.score);
        game.results.push(result);
        Ok(())
    }

    fn fetch_leaderboard(&self, code: &str) -> Result<Leaderboard, StoreError> {
        let game = self.stored(code)?;
        let mut results = game.results.clone();
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(Leaderboard {
            game: game.record.code.clone(),
            results,
        })
    }
}
