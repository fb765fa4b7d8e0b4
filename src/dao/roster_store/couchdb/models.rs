use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::{
    dao::models::{GameEntity, JoinEntity, PlayerEntity},
    state::status::GameStatus,
};

pub const GAME_PREFIX: &str = "game::";
pub const JOIN_PREFIX: &str = "join::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBody {
    pub sport: String,
    pub scheduled_at: SystemTime,
    pub location: String,
    pub skill_label: String,
    pub capacity: u32,
    pub is_public: bool,
    #[serde(default)]
    pub creator_phone: Option<String>,
    pub status: GameStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<(GameEntity, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameEntity, Option<String>)) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev,
            game: GameBody {
                sport: game.sport,
                scheduled_at: game.scheduled_at,
                location: game.location,
                skill_label: game.skill_label,
                capacity: game.capacity,
                is_public: game.is_public,
                creator_phone: game.creator_phone,
                status: game.status,
                created_at: game.created_at,
                updated_at: game.updated_at,
            },
        }
    }
}

impl TryFrom<CouchGameDocument> for GameEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchGameDocument) -> Result<Self, Self::Error> {
        let body = doc.game;
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            sport: body.sport,
            scheduled_at: body.scheduled_at,
            location: body.location,
            skill_label: body.skill_label,
            capacity: body.capacity,
            is_public: body.is_public,
            creator_phone: body.creator_phone,
            status: body.status,
            created_at: body.created_at,
            updated_at: body.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchJoinDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub join: JoinBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinBody {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skill_level: Option<u8>,
    pub joined_at: SystemTime,
}

impl From<(JoinEntity, Option<String>)> for CouchJoinDocument {
    fn from((join, rev): (JoinEntity, Option<String>)) -> Self {
        Self {
            id: join_doc_id(join.game_id, join.player.id),
            rev,
            join: JoinBody {
                game_id: join.game_id,
                player_id: join.player.id,
                name: join.player.name,
                phone: join.player.phone,
                skill_level: join.skill_level,
                joined_at: join.joined_at,
            },
        }
    }
}

impl From<CouchJoinDocument> for JoinEntity {
    fn from(doc: CouchJoinDocument) -> Self {
        Self {
            game_id: doc.join.game_id,
            player: PlayerEntity {
                id: doc.join.player_id,
                name: doc.join.name,
                phone: doc.join.phone,
            },
            skill_level: doc.join.skill_level,
            joined_at: doc.join.joined_at,
        }
    }
}

pub fn game_doc_id(id: Uuid) -> String {
    format!("{}{}", GAME_PREFIX, id)
}

/// Key prefix shared by every join of one game, so a range scan returns its roster.
pub fn roster_prefix(game_id: Uuid) -> String {
    format!("{}{}:", JOIN_PREFIX, game_id)
}

pub fn join_doc_id(game_id: Uuid, player_id: Uuid) -> String {
    format!("{}{}", roster_prefix(game_id), player_id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_ids_share_the_roster_prefix() {
        let game_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();
        let doc_id = join_doc_id(game_id, player_id);
        assert!(doc_id.starts_with(&roster_prefix(game_id)));
        assert!(doc_id.ends_with(&player_id.to_string()));
    }

    #[test]
    fn extract_uuid_reads_game_ids() {
        let id = Uuid::new_v4();
        assert_eq!(extract_uuid(&game_doc_id(id)).unwrap(), id);
        assert!(extract_uuid("game::not-a-uuid").is_err());
        assert!(extract_uuid("garbage").is_err());
    }
}
