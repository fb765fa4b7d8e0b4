//! Skill-balancing team splitter.
//!
//! Players are shuffled, stably sorted by skill (strongest first), then dealt
//! one by one to the team with the lowest running total. Ties go to the team
//! with fewer members, then to the lowest index. The shuffle only changes who
//! lands where among equally skilled players; totals and sizes do not depend
//! on it.

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;
use uuid::Uuid;

/// Skill used for players who never reported one.
pub const NEUTRAL_SKILL: u8 = 3;
/// Smallest number of teams a split can produce.
pub const MIN_TEAM_COUNT: usize = 2;
/// Largest number of teams a split can produce.
pub const MAX_TEAM_COUNT: usize = 64;

/// Player fed to the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Roster entry being placed.
    pub player_id: Uuid,
    /// Reported level, if any.
    pub skill_level: Option<u8>,
}

impl Candidate {
    /// Skill counted by the balancer.
    pub fn effective_skill(&self) -> u8 {
        self.skill_level.unwrap_or(NEUTRAL_SKILL)
    }
}

/// One team produced by a split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancedTeam {
    /// Members in the order they were dealt.
    pub members: Vec<Uuid>,
    /// Sum of the effective skills of the members.
    pub total_skill: u32,
}

/// Manual move rejected by [`move_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The player is on none of the teams.
    #[error("player {0} is not on any team")]
    UnknownPlayer(Uuid),
    /// Destination index past the last team.
    #[error("team {to_team} does not exist (have {team_count})")]
    TeamOutOfRange { to_team: usize, team_count: usize },
}

/// Split `candidates` into exactly `team_count` teams using the given randomness.
///
/// `team_count` must be at least 1; callers validate the public bounds.
pub fn balance_teams<R: Rng + ?Sized>(
    candidates: &[Candidate],
    team_count: usize,
    rng: &mut R,
) -> Vec<BalancedTeam> {
    let mut order = candidates.to_vec();
    order.shuffle(rng);
    order.sort_by_key(|candidate| std::cmp::Reverse(candidate.effective_skill()));

    let mut teams = vec![BalancedTeam::default(); team_count];
    if teams.is_empty() {
        return teams;
    }

    for candidate in order {
        let target = teams
            .iter()
            .enumerate()
            .min_by_key(|(index, team)| (team.total_skill, team.members.len(), *index))
            .map(|(index, _)| index)
            .unwrap_or(0);
        let team = &mut teams[target];
        team.members.push(candidate.player_id);
        team.total_skill += u32::from(candidate.effective_skill());
    }

    teams
}

/// Split `candidates` into `team_count` teams with a fresh thread-local shuffle.
pub fn split_teams(candidates: &[Candidate], team_count: usize) -> Vec<BalancedTeam> {
    balance_teams(candidates, team_count, &mut rand::rng())
}

/// Move `player_id` to the end of `to_team`, leaving every other member in place.
///
/// Returns the index of the team the player came from.
pub fn move_player(
    teams: &mut [Vec<Uuid>],
    player_id: Uuid,
    to_team: usize,
) -> Result<usize, MoveError> {
    if to_team >= teams.len() {
        return Err(MoveError::TeamOutOfRange {
            to_team,
            team_count: teams.len(),
        });
    }

    let (from_team, position) = teams
        .iter()
        .enumerate()
        .find_map(|(index, members)| {
            members
                .iter()
                .position(|member| *member == player_id)
                .map(|position| (index, position))
        })
        .ok_or(MoveError::UnknownPlayer(player_id))?;

    teams[from_team].remove(position);
    teams[to_team].push(player_id);
    Ok(from_team)
}

/// Guess how many teams a game splits into.
///
/// A trailing `<N>v<N>` in the sport label wins. Otherwise the first preferred
/// team size that divides the capacity into at least two teams is used, and
/// two teams is the fallback.
pub fn infer_team_count(sport: &str, capacity: u32, preferred_sizes: &[u32]) -> usize {
    let capacity = capacity as usize;

    let inferred = match side_size(sport) {
        Some(per_side) => capacity / per_side,
        None => preferred_sizes
            .iter()
            .map(|size| *size as usize)
            .filter(|size| *size > 0)
            .find(|size| capacity % size == 0 && capacity / size >= MIN_TEAM_COUNT)
            .map(|size| capacity / size)
            .unwrap_or(MIN_TEAM_COUNT),
    };

    inferred.clamp(MIN_TEAM_COUNT, MAX_TEAM_COUNT)
}

/// Players per side from a trailing `5v5`-style token.
fn side_size(sport: &str) -> Option<usize> {
    let token = sport.split_whitespace().next_back()?;
    let (left, right) = token.split_once(['v', 'V'])?;
    if left.is_empty() || left != right || !left.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    left.parse::<usize>().ok().filter(|size| *size > 0)
}
