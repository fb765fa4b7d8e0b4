//! Payloads of the roster routes. Contact phones are accepted but never echoed back.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::JoinEntity,
    dto::{
        format_system_time,
        validation::{validate_phone, validate_skill_level, validate_text},
    },
    state::status::GameStatus,
};

/// Request sent by a player opening the share link.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    pub name: String,
    /// Contact phone; a phone may only join a given game once.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_text(&self.name) {
            errors.add("name", e);
        }
        if let Some(ref phone) = self.phone {
            if let Err(e) = validate_phone(phone) {
                errors.add("phone", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Set (`1..=5`) or clear (`null`) a player's skill level.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SkillUpdateRequest {
    #[serde(default)]
    pub skill_level: Option<i32>,
}

impl Validate for SkillUpdateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(level) = self.skill_level {
            if let Err(e) = validate_skill_level(level) {
                errors.add("skill_level", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One roster line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterEntryView {
    pub player_id: Uuid,
    pub name: String,
    pub skill_level: Option<u8>,
    pub joined_at: String,
}

impl From<&JoinEntity> for RosterEntryView {
    fn from(join: &JoinEntity) -> Self {
        Self {
            player_id: join.player.id,
            name: join.player.name.clone(),
            skill_level: join.skill_level,
            joined_at: format_system_time(join.joined_at),
        }
    }
}

/// Headcount and status of a game after a roster change.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterChangeResponse {
    pub game_id: Uuid,
    pub status: GameStatus,
    pub player_count: usize,
}

/// Result of a successful join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    pub player: RosterEntryView,
    #[serde(flatten)]
    pub game: RosterChangeResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_update_accepts_null_and_range() {
        let cleared: SkillUpdateRequest = serde_json::from_str(r#"{"skill_level": null}"#).unwrap();
        assert!(cleared.validate().is_ok());

        let set: SkillUpdateRequest = serde_json::from_str(r#"{"skill_level": 5}"#).unwrap();
        assert!(set.validate().is_ok());

        let out_of_range: SkillUpdateRequest =
            serde_json::from_str(r#"{"skill_level": 6}"#).unwrap();
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn join_request_checks_name_and_phone() {
        let request = JoinRequest {
            name: " ".into(),
            phone: Some("call me".into()),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("phone"));
    }
}
