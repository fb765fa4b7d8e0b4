use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the pickup games API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::create_game,
        crate::routes::games::get_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::games::change_status,
        crate::routes::games::set_visibility,
        crate::routes::roster::list_roster,
        crate::routes::roster::join_game,
        crate::routes::roster::update_skill,
        crate::routes::roster::remove_player,
        crate::routes::teams::split_teams,
        crate::routes::teams::move_player,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::VisibilityRequest,
            crate::dto::game::StatusChangeRequest,
            crate::dto::game::GameSummary,
            crate::dto::game::GameDetail,
            crate::dto::roster::JoinRequest,
            crate::dto::roster::JoinResponse,
            crate::dto::roster::SkillUpdateRequest,
            crate::dto::roster::RosterEntryView,
            crate::dto::roster::RosterChangeResponse,
            crate::dto::teams::TeamSplitRequest,
            crate::dto::teams::MovePlayerRequest,
            crate::dto::teams::TeamSplitResponse,
            crate::dto::teams::TeamView,
            crate::dto::teams::TeamMemberView,
            crate::state::status::GameStatus,
            crate::state::status::StatusAction,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game creation, listing and organizer controls"),
        (name = "roster", description = "Joining, leaving and skill levels"),
        (name = "teams", description = "Balanced team proposals"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths.keys().cloned().collect::<Vec<_>>();
        for expected in [
            "/healthcheck",
            "/games",
            "/games/{id}",
            "/games/{id}/status",
            "/games/{id}/visibility",
            "/games/{id}/players",
            "/games/{id}/players/{player_id}",
            "/games/{id}/players/{player_id}/skill",
            "/games/{id}/teams",
            "/games/{id}/teams/move",
        ] {
            assert!(paths.iter().any(|path| path == expected), "missing {expected}");
        }
    }
}
