//! Team proposals built from a game's roster.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::JoinEntity,
    dto::teams::{MovePlayerRequest, TeamMemberView, TeamSplitRequest, TeamSplitResponse, TeamView},
    error::ServiceError,
    services::{
        balancer::{self, Candidate, MoveError, NEUTRAL_SKILL},
        game_service::load_game,
    },
    state::SharedState,
};

fn member_view(join: &JoinEntity) -> TeamMemberView {
    TeamMemberView {
        player_id: join.player.id,
        name: join.player.name.clone(),
        skill_level: join.skill_level,
    }
}

/// Attach roster details to bare player id lists.
fn build_response(
    game_id: Uuid,
    teams: &[Vec<Uuid>],
    roster: &HashMap<Uuid, &JoinEntity>,
) -> TeamSplitResponse {
    let teams = teams
        .iter()
        .enumerate()
        .map(|(index, members)| {
            let players = members
                .iter()
                .filter_map(|id| roster.get(id))
                .map(|join| member_view(join))
                .collect::<Vec<_>>();
            let total_skill = players
                .iter()
                .map(|player| u32::from(player.skill_level.unwrap_or(NEUTRAL_SKILL)))
                .sum();
            TeamView {
                index,
                total_skill,
                players,
            }
        })
        .collect::<Vec<_>>();

    TeamSplitResponse {
        game_id,
        team_count: teams.len(),
        teams,
    }
}

/// Propose balanced teams for a game. Each call draws a new shuffle.
pub async fn split_teams(
    state: &SharedState,
    game_id: Uuid,
    request: TeamSplitRequest,
) -> Result<TeamSplitResponse, ServiceError> {
    request.validate()?;
    let store = state.require_roster_store().await?;
    let game = load_game(&store, game_id).await?;
    let joins = store.list_joins(game_id).await?;

    let team_count = match request.team_count {
        Some(count) => usize::try_from(count)
            .map_err(|_| ServiceError::InvalidInput(format!("invalid team count {count}")))?,
        None => {
            balancer::infer_team_count(&game.sport, game.capacity, state.config().team_sizes())
        }
    };

    let candidates = joins
        .iter()
        .map(|join| Candidate {
            player_id: join.player.id,
            skill_level: join.skill_level,
        })
        .collect::<Vec<_>>();
    let teams = balancer::split_teams(&candidates, team_count)
        .into_iter()
        .map(|team| team.members)
        .collect::<Vec<_>>();
    debug!(%game_id, team_count, players = joins.len(), "teams proposed");

    let roster = joins
        .iter()
        .map(|join| (join.player.id, join))
        .collect::<HashMap<_, _>>();
    Ok(build_response(game_id, &teams, &roster))
}

/// Move one player of a previously proposed split to another team.
pub async fn move_player(
    state: &SharedState,
    game_id: Uuid,
    request: MovePlayerRequest,
) -> Result<TeamSplitResponse, ServiceError> {
    request.validate()?;
    let store = state.require_roster_store().await?;
    load_game(&store, game_id).await?;
    let joins = store.list_joins(game_id).await?;
    let roster = joins
        .iter()
        .map(|join| (join.player.id, join))
        .collect::<HashMap<_, _>>();

    let mut seen = HashSet::new();
    for id in request.teams.iter().flatten() {
        if !roster.contains_key(id) {
            return Err(ServiceError::InvalidInput(format!(
                "player `{id}` is not on the roster of game `{game_id}`"
            )));
        }
        if !seen.insert(*id) {
            return Err(ServiceError::InvalidInput(format!(
                "player `{id}` appears on more than one team"
            )));
        }
    }

    let mut teams = request.teams;
    let from_team = balancer::move_player(&mut teams, request.player_id, request.to_team)
        .map_err(|err| match err {
            MoveError::UnknownPlayer(_) => ServiceError::NotFound(err.to_string()),
            MoveError::TeamOutOfRange { .. } => ServiceError::InvalidInput(err.to_string()),
        })?;
    debug!(
        %game_id,
        player_id = %request.player_id,
        from_team,
        to_team = request.to_team,
        "player moved between teams"
    );

    Ok(build_response(game_id, &teams, &roster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::roster::{JoinRequest, SkillUpdateRequest},
        services::{
            roster_service::{join_game, update_skill},
            test_support::{create_game, memory_state},
        },
    };

    async fn roster_with_skills(state: &SharedState, game_id: Uuid, skills: &[u8]) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for (index, skill) in skills.iter().enumerate() {
            let joined = join_game(
                state,
                game_id,
                JoinRequest {
                    name: format!("P{index}"),
                    phone: None,
                },
            )
            .await
            .unwrap();
            let player_id = joined.player.player_id;
            update_skill(
                state,
                game_id,
                player_id,
                SkillUpdateRequest {
                    skill_level: Some(i32::from(*skill)),
                },
            )
            .await
            .unwrap();
            ids.push(player_id);
        }
        ids
    }

    #[tokio::test]
    async fn split_covers_every_player_once() {
        let state = memory_state().await;
        let game_id = create_game(&state, 12).await;
        let ids = roster_with_skills(&state, game_id, &[5, 5, 5, 4, 4, 4, 3, 3, 2, 2, 1, 1]).await;

        let split = split_teams(
            &state,
            game_id,
            TeamSplitRequest {
                team_count: Some(2),
            },
        )
        .await
        .unwrap();

        assert_eq!(split.team_count, 2);
        let mut placed = split
            .teams
            .iter()
            .flat_map(|team| team.players.iter().map(|player| player.player_id))
            .collect::<Vec<_>>();
        placed.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(placed, expected);

        let mut totals = split
            .teams
            .iter()
            .map(|team| team.total_skill)
            .collect::<Vec<_>>();
        totals.sort();
        assert_eq!(totals, vec![19, 20]);
    }

    #[tokio::test]
    async fn split_infers_team_count_when_omitted() {
        let state = memory_state().await;
        let game_id = create_game(&state, 12).await;
        roster_with_skills(&state, game_id, &[3, 3]).await;

        let split = split_teams(&state, game_id, TeamSplitRequest::default())
            .await
            .unwrap();
        assert_eq!(split.team_count, 2);
    }

    #[tokio::test]
    async fn split_rejects_out_of_range_counts() {
        let state = memory_state().await;
        let game_id = create_game(&state, 12).await;

        for count in [1, 65] {
            let err = split_teams(
                &state,
                game_id,
                TeamSplitRequest {
                    team_count: Some(count),
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn move_recomputes_totals() {
        let state = memory_state().await;
        let game_id = create_game(&state, 4).await;
        let ids = roster_with_skills(&state, game_id, &[5, 1, 4, 2]).await;

        let moved = move_player(
            &state,
            game_id,
            MovePlayerRequest {
                teams: vec![vec![ids[0], ids[1]], vec![ids[2], ids[3]]],
                player_id: ids[1],
                to_team: 1,
            },
        )
        .await
        .unwrap();

        assert_eq!(moved.teams[0].total_skill, 5);
        assert_eq!(moved.teams[1].total_skill, 7);
        assert_eq!(
            moved.teams[1]
                .players
                .iter()
                .map(|player| player.player_id)
                .collect::<Vec<_>>(),
            vec![ids[2], ids[3], ids[1]]
        );
    }

    #[tokio::test]
    async fn move_rejects_foreign_players() {
        let state = memory_state().await;
        let game_id = create_game(&state, 4).await;
        let ids = roster_with_skills(&state, game_id, &[3, 3]).await;

        let err = move_player(
            &state,
            game_id,
            MovePlayerRequest {
                teams: vec![vec![ids[0], Uuid::new_v4()], vec![ids[1]]],
                player_id: ids[0],
                to_team: 1,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = move_player(
            &state,
            game_id,
            MovePlayerRequest {
                teams: vec![vec![ids[0]], vec![]],
                player_id: ids[1],
                to_team: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
