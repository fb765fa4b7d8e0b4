use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::GameEntity,
    dto::{
        format_system_time,
        roster::RosterEntryView,
        validation::{validate_phone, validate_text, validate_timestamp},
    },
    state::status::{GameStatus, StatusAction},
};

fn default_public() -> bool {
    true
}

/// Payload used to organize a new game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Sport label, e.g. "Soccer 5v5".
    pub sport: String,
    /// Kick-off time in RFC 3339.
    pub scheduled_at: String,
    pub location: String,
    /// Expected level of play. Defaults to an empty label.
    #[serde(default)]
    pub skill_label: String,
    /// Maximum number of players. Fixed once the game exists.
    pub capacity: i64,
    /// Whether the game shows up in the public listing. Defaults to `true`.
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Organizer phone used for "my games" lookups.
    #[serde(default)]
    pub creator_phone: Option<String>,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_text(&self.sport) {
            errors.add("sport", e);
        }
        if let Err(e) = validate_text(&self.location) {
            errors.add("location", e);
        }
        if let Err(e) = validate_timestamp(&self.scheduled_at) {
            errors.add("scheduled_at", e);
        }
        if !self.skill_label.is_empty() {
            if let Err(e) = validate_text(&self.skill_label) {
                errors.add("skill_label", e);
            }
        }
        if self.capacity < 1 || self.capacity > i64::from(u32::MAX) {
            let mut err = ValidationError::new("capacity_range");
            err.message = Some(format!("Capacity must be positive (got {})", self.capacity).into());
            errors.add("capacity", err);
        }
        if let Some(ref phone) = self.creator_phone {
            if let Err(e) = validate_phone(phone) {
                errors.add("creator_phone", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update of a game's details. Capacity cannot be changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skill_label: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// If not specified, keeps the current phone.
    /// If null is specified, removes it.
    /// If a string is specified, replaces it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub creator_phone: Option<Option<String>>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref sport) = self.sport {
            if let Err(e) = validate_text(sport) {
                errors.add("sport", e);
            }
        }
        if let Some(ref location) = self.location {
            if let Err(e) = validate_text(location) {
                errors.add("location", e);
            }
        }
        if let Some(ref scheduled_at) = self.scheduled_at {
            if let Err(e) = validate_timestamp(scheduled_at) {
                errors.add("scheduled_at", e);
            }
        }
        if let Some(ref label) = self.skill_label {
            if !label.is_empty() {
                if let Err(e) = validate_text(label) {
                    errors.add("skill_label", e);
                }
            }
        }
        if let Some(Some(ref phone)) = self.creator_phone {
            if let Err(e) = validate_phone(phone) {
                errors.add("creator_phone", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request to show or hide a game from the public listing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

/// Organizer status change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub action: StatusAction,
}

/// Query parameters of the game listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListGamesQuery {
    /// When set, list every game created by this phone instead of the public ones.
    #[serde(default)]
    pub creator_phone: Option<String>,
}

/// Game projection used by listings and mutations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub sport: String,
    pub scheduled_at: String,
    pub location: String,
    pub skill_label: String,
    pub capacity: u32,
    pub is_public: bool,
    pub status: GameStatus,
    pub player_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl GameSummary {
    /// Build the projection of `game` with its current headcount.
    pub fn from_entity(game: &GameEntity, player_count: usize) -> Self {
        Self {
            id: game.id,
            sport: game.sport.clone(),
            scheduled_at: format_system_time(game.scheduled_at),
            location: game.location.clone(),
            skill_label: game.skill_label.clone(),
            capacity: game.capacity,
            is_public: game.is_public,
            status: game.status,
            player_count,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// Full view of a game as opened from a share link.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: GameSummary,
    /// Roster in join order.
    pub players: Vec<RosterEntryView>,
    /// Team count the split endpoint uses when none is requested.
    pub suggested_team_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateGameRequest {
        serde_json::from_value(serde_json::json!({
            "sport": "Soccer 5v5",
            "scheduled_at": "2026-05-02T18:30:00Z",
            "location": "Riverside pitch",
            "capacity": 10
        }))
        .unwrap()
    }

    #[test]
    fn create_request_defaults_to_public() {
        let request = create_request();
        assert!(request.is_public);
        assert!(request.skill_label.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_zero_capacity_and_bad_time() {
        let mut request = create_request();
        request.capacity = 0;
        request.scheduled_at = "saturday".into();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("capacity"));
        assert!(fields.contains_key("scheduled_at"));
    }

    #[test]
    fn update_request_distinguishes_missing_and_null_phone() {
        let missing: UpdateGameRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.creator_phone, None);

        let cleared: UpdateGameRequest =
            serde_json::from_str(r#"{"creator_phone": null}"#).unwrap();
        assert_eq!(cleared.creator_phone, Some(None));

        let set: UpdateGameRequest =
            serde_json::from_str(r#"{"creator_phone": "+15550102030"}"#).unwrap();
        assert_eq!(set.creator_phone, Some(Some("+15550102030".into())));
        assert!(set.validate().is_ok());
    }
}
