use serde::Serialize;

use super::player::Player;

/// A leading player for one tournament statistic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leader {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

/// Tournament-wide totals and leaders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TournamentSummary {
    pub overall_runs: i64,
    pub overall_wickets: i64,
    pub highest_run_scorers: Vec<Leader>,
    pub highest_wicket_takers: Vec<Leader>,
}

impl TournamentSummary {
    /// Aggregates a full player listing; tied leaders are all reported
    pub fn from_players(players: &[Player]) -> Self {
        Self {
            overall_runs: players.iter().map(|p| p.raw().total_runs).sum(),
            overall_wickets: players.iter().map(|p| p.raw().wickets).sum(),
            highest_run_scorers: leaders(players, |p| p.raw().total_runs),
            highest_wicket_takers: leaders(players, |p| p.raw().wickets),
        }
    }
}

fn leaders(players: &[Player], stat: impl Fn(&Player) -> i64) -> Vec<Leader> {
    let best = players.iter().map(&stat).max().unwrap_or(0);
    if best <= 0 {
        return Vec::new();
    }

    players
        .iter()
        .filter(|p| stat(p) == best)
        .map(|p| Leader {
            id: p.id(),
            name: p.name().to_string(),
            count: best,
        })
        .collect()
}
