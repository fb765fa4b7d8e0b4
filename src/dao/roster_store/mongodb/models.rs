use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    dao::models::{GameEntity, JoinEntity, PlayerEntity},
    dto::validation::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL},
    state::status::GameStatus,
};

/// Game document stored in the `games` collection. Identifiers are kept as
/// hyphenated strings so they stay readable from the Mongo shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    sport: String,
    scheduled_at: DateTime,
    location: String,
    skill_label: String,
    capacity: u32,
    is_public: bool,
    #[serde(default)]
    creator_phone: Option<String>,
    status: GameStatus,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            sport: value.sport,
            scheduled_at: DateTime::from_system_time(value.scheduled_at),
            location: value.location,
            skill_label: value.skill_label,
            capacity: value.capacity,
            is_public: value.is_public,
            creator_phone: value.creator_phone,
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            sport: value.sport,
            scheduled_at: value.scheduled_at.to_system_time(),
            location: value.location,
            skill_label: value.skill_label,
            capacity: value.capacity,
            is_public: value.is_public,
            creator_phone: value.creator_phone,
            status: value.status,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// Join document stored in the `joins` collection, embedding the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoJoinDocument {
    #[serde(rename = "_id")]
    id: String,
    game_id: String,
    player_id: String,
    player_name: String,
    #[serde(default)]
    player_phone: Option<String>,
    #[serde(default)]
    skill_level: Option<i32>,
    joined_at: DateTime,
}

impl From<JoinEntity> for MongoJoinDocument {
    fn from(value: JoinEntity) -> Self {
        Self {
            id: join_doc_id(value.game_id, value.player.id),
            game_id: value.game_id.to_string(),
            player_id: value.player.id.to_string(),
            player_name: value.player.name,
            player_phone: value.player.phone,
            skill_level: value.skill_level.map(i32::from),
            joined_at: DateTime::from_system_time(value.joined_at),
        }
    }
}

impl TryFrom<MongoJoinDocument> for JoinEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoJoinDocument) -> MongoResult<Self> {
        let skill_level = value
            .skill_level
            .map(|level| {
                (MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL)
                    .contains(&level)
                    .then(|| level as u8)
                    .ok_or_else(|| MongoDaoError::InvalidSkillLevel {
                        id: value.id.clone(),
                        value: level,
                    })
            })
            .transpose()?;

        Ok(Self {
            game_id: parse_id(&value.game_id)?,
            player: PlayerEntity {
                id: parse_id(&value.player_id)?,
                name: value.player_name,
                phone: value.player_phone,
            },
            skill_level,
            joined_at: value.joined_at.to_system_time(),
        })
    }
}

fn join_doc_id(game_id: Uuid, player_id: Uuid) -> String {
    format!("{game_id}:{player_id}")
}

fn parse_id(raw: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| MongoDaoError::InvalidId { id: raw.to_owned() })
}

pub fn game_filter(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn roster_filter(game_id: Uuid) -> Document {
    doc! {"game_id": game_id.to_string()}
}

pub fn join_filter(game_id: Uuid, player_id: Uuid) -> Document {
    doc! {"_id": join_doc_id(game_id, player_id)}
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn stored_join(skill_level: Option<i32>) -> MongoJoinDocument {
        let mut document = MongoJoinDocument::from(JoinEntity {
            game_id: Uuid::new_v4(),
            player: PlayerEntity {
                id: Uuid::new_v4(),
                name: "Ana".into(),
                phone: None,
            },
            skill_level: None,
            joined_at: SystemTime::now(),
        });
        document.skill_level = skill_level;
        document
    }

    #[test]
    fn stored_skill_levels_are_range_checked() {
        let join = JoinEntity::try_from(stored_join(Some(4))).unwrap();
        assert_eq!(join.skill_level, Some(4));

        let join = JoinEntity::try_from(stored_join(None)).unwrap();
        assert_eq!(join.skill_level, None);

        for value in [0, 9, -3, 300] {
            let err = JoinEntity::try_from(stored_join(Some(value))).unwrap_err();
            assert!(matches!(
                err,
                MongoDaoError::InvalidSkillLevel { value: got, .. } if got == value
            ));
            assert!(err.to_string().contains("skill level"));
        }
    }
}
