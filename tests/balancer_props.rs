//! Property-based tests for the team balancer.

#![allow(missing_docs)]

use std::collections::HashSet;

use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

use pickup_games_back::services::balancer::{Candidate, balance_teams};

fn roster(skills: &[Option<u8>]) -> Vec<Candidate> {
    skills
        .iter()
        .map(|skill_level| Candidate {
            player_id: Uuid::new_v4(),
            skill_level: *skill_level,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Every player lands on exactly one of exactly `k` teams.
    #[test]
    fn prop_split_is_a_partition(
        skills in prop::collection::vec(prop::option::of(1u8..=5), 0..40),
        team_count in 2usize..=8,
        seed in any::<u64>()
    ) {
        let candidates = roster(&skills);
        let teams = balance_teams(&candidates, team_count, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(teams.len(), team_count);

        let placed = teams.iter().flat_map(|team| team.members.iter().copied()).collect::<Vec<_>>();
        prop_assert_eq!(placed.len(), candidates.len());
        let unique = placed.iter().copied().collect::<HashSet<_>>();
        let expected = candidates.iter().map(|candidate| candidate.player_id).collect::<HashSet<_>>();
        prop_assert_eq!(unique, expected);

        for team in &teams {
            let total = team
                .members
                .iter()
                .map(|id| {
                    let candidate = candidates.iter().find(|candidate| candidate.player_id == *id).unwrap();
                    u32::from(candidate.effective_skill())
                })
                .sum::<u32>();
            prop_assert_eq!(total, team.total_skill);
        }
    }

    /// With identical skills, team sizes differ by at most one.
    #[test]
    fn prop_equal_skills_give_even_sizes(
        players in 0usize..50,
        skill in prop::option::of(1u8..=5),
        team_count in 2usize..=10,
        seed in any::<u64>()
    ) {
        let candidates = roster(&vec![skill; players]);
        let teams = balance_teams(&candidates, team_count, &mut StdRng::seed_from_u64(seed));

        let sizes = teams.iter().map(|team| team.members.len()).collect::<Vec<_>>();
        let largest = *sizes.iter().max().unwrap();
        let smallest = *sizes.iter().min().unwrap();
        prop_assert!(largest - smallest <= 1);
    }

    /// Team totals never depend on the shuffle.
    #[test]
    fn prop_totals_ignore_the_seed(
        skills in prop::collection::vec(prop::option::of(1u8..=5), 0..30),
        team_count in 2usize..=6,
        first in any::<u64>(),
        second in any::<u64>()
    ) {
        let candidates = roster(&skills);
        let totals = |seed: u64| {
            let mut totals = balance_teams(&candidates, team_count, &mut StdRng::seed_from_u64(seed))
                .iter()
                .map(|team| (team.total_skill, team.members.len()))
                .collect::<Vec<_>>();
            totals.sort_unstable();
            totals
        };
        prop_assert_eq!(totals(first), totals(second));
    }
}
