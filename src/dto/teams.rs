use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::balancer::{MAX_TEAM_COUNT, MIN_TEAM_COUNT};

fn team_count_error(count: i64) -> ValidationError {
    let mut err = ValidationError::new("team_count_range");
    err.message = Some(
        format!("Team count must be between {MIN_TEAM_COUNT} and {MAX_TEAM_COUNT} (got {count})")
            .into(),
    );
    err
}

/// Request a fresh split. Every call reshuffles equally skilled players.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TeamSplitRequest {
    /// Number of teams. Inferred from the sport label and capacity when omitted.
    #[serde(default)]
    pub team_count: Option<i64>,
}

impl Validate for TeamSplitRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(count) = self.team_count {
            let in_range = usize::try_from(count)
                .is_ok_and(|count| (MIN_TEAM_COUNT..=MAX_TEAM_COUNT).contains(&count));
            if !in_range {
                errors.add("team_count", team_count_error(count));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Manual correction applied to a split previously returned by the server.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MovePlayerRequest {
    /// Player ids per team, as returned by the split.
    pub teams: Vec<Vec<Uuid>>,
    pub player_id: Uuid,
    /// Zero-based destination team.
    pub to_team: usize,
}

impl Validate for MovePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !(MIN_TEAM_COUNT..=MAX_TEAM_COUNT).contains(&self.teams.len()) {
            errors.add("teams", team_count_error(self.teams.len() as i64));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One member of a proposed team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamMemberView {
    pub player_id: Uuid,
    pub name: String,
    pub skill_level: Option<u8>,
}

/// One proposed team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamView {
    pub index: usize,
    /// Sum of effective skills, unknown levels counting as 3.
    pub total_skill: u32,
    pub players: Vec<TeamMemberView>,
}

/// Proposed split of a game's roster.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamSplitResponse {
    pub game_id: Uuid,
    pub team_count: usize,
    pub teams: Vec<TeamView>,
}
