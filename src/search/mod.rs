//! Simultaneous-move alpha-beta search.
//!
//! Bots plan on forks of the [`GameApi`]: the maximizing layer tries the
//! searching unit's feasible moves, the minimizing layer tries every joint
//! reply of the other live units, and each combination is applied on a
//! fresh fork with [`GameApi::simulate_moves`]. The live state is never
//! touched.
//!
//! Wins are scored depth-adjusted so a win in two rounds beats the same
//! win in six, and equally scored root moves are tie-broken uniformly at
//! random with a seeded [`GameRng`] for reproducible tournaments.

use tracing::trace;

use crate::api::GameApi;
use crate::core::{GameRng, UnitId};
use crate::rules::{GameOutcome, GameRules};

/// Score of a decided game at the root, before depth adjustment.
const WIN_SCORE: f64 = 1_000_000.0;

/// Position evaluation at the search horizon.
pub trait Evaluator<R: GameRules>: Send {
    /// A higher value is better for `unit`.
    fn evaluate(&self, api: &GameApi<R>, unit: UnitId) -> f64;
}

impl<R: GameRules, F> Evaluator<R> for F
where
    F: Fn(&GameApi<R>, UnitId) -> f64 + Send,
{
    fn evaluate(&self, api: &GameApi<R>, unit: UnitId) -> f64 {
        self(api, unit)
    }
}

/// Search tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// Rounds to look ahead. Depth 1 considers one own move plus the
    /// opponents' replies.
    pub max_depth: u32,
    /// Drop opponent moves that kill the opponent outright; assumes
    /// opponents are not actively suicidal.
    pub exclude_suicidal: bool,
    /// Seed of the tie-break generator.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            exclude_suicidal: true,
            seed: 0,
        }
    }
}

/// Alpha-beta search over simultaneous moves.
pub struct SimultaneousAlphaBeta<R: GameRules, E: Evaluator<R>> {
    config: SearchConfig,
    evaluator: E,
    rng: GameRng,
    _rules: std::marker::PhantomData<R>,
}

impl<R: GameRules, E: Evaluator<R>> SimultaneousAlphaBeta<R, E> {
    /// Create a search with the given evaluator.
    #[must_use]
    pub fn new(config: SearchConfig, evaluator: E) -> Self {
        Self {
            config,
            evaluator,
            rng: GameRng::new(config.seed),
            _rules: std::marker::PhantomData,
        }
    }

    /// Pick the best feasible move for `unit`, or `None` when it has none.
    pub fn choose_move(&mut self, api: &GameApi<R>, unit: UnitId) -> Option<R::Descriptor> {
        let moves = api.check_feasible_moves(unit);
        if moves.is_empty() {
            return None;
        }

        let depth = self.config.max_depth.max(1);
        let mut best_score = f64::NEG_INFINITY;
        let mut best: Vec<R::Descriptor> = Vec::new();
        let mut alpha = f64::NEG_INFINITY;

        for descriptor in moves {
            let score = self.reply_layer(api, unit, &descriptor, depth, alpha, f64::INFINITY);
            trace!(unit = %unit, ?descriptor, score, "root move scored");
            if score > best_score {
                best_score = score;
                best.clear();
                best.push(descriptor);
            } else if score == best_score {
                best.push(descriptor);
            }
            alpha = alpha.max(best_score);
        }

        self.rng.choose(&best).cloned()
    }

    /// Maximizing layer: the searching unit picks its best move.
    fn own_layer(
        &self,
        api: &GameApi<R>,
        unit: UnitId,
        depth: u32,
        mut alpha: f64,
        beta: f64,
    ) -> f64 {
        if let Some(outcome) = api.outcome() {
            return self.terminal_score(api, outcome, unit, depth);
        }
        if depth == 0 {
            return self.horizon_score(api, unit);
        }

        let moves = api.check_feasible_moves(unit);
        if moves.is_empty() {
            // Boxed in: the unit dies next round wherever it goes.
            return -WIN_SCORE - f64::from(depth);
        }

        let mut best = f64::NEG_INFINITY;
        for descriptor in moves {
            let score = self.reply_layer(api, unit, &descriptor, depth, alpha, beta);
            best = best.max(score);
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }

    /// Minimizing layer: every joint reply of the other live units to one
    /// candidate move of the searching unit.
    fn reply_layer(
        &self,
        api: &GameApi<R>,
        unit: UnitId,
        own: &R::Descriptor,
        depth: u32,
        alpha: f64,
        mut beta: f64,
    ) -> f64 {
        let opponents: Vec<UnitId> = api
            .core()
            .live_counted_units()
            .into_iter()
            .filter(|&u| u != unit)
            .collect();
        let options: Vec<Vec<R::Descriptor>> = opponents
            .iter()
            .map(|&opponent| self.opponent_moves(api, opponent))
            .collect();

        let mut batch: Vec<(UnitId, R::Descriptor)> = Vec::with_capacity(opponents.len() + 1);
        batch.push((unit, own.clone()));

        let mut worst = f64::INFINITY;
        let mut any = false;
        self.for_each_combination(&opponents, &options, &mut batch, &mut |this, batch| {
            let Some(mut fork) = api.simulate_moves(batch) else {
                return true;
            };
            fork.check_if_finished();
            any = true;

            let score = this.own_layer(&fork, unit, depth - 1, alpha, beta);
            worst = worst.min(score);
            beta = beta.min(worst);
            beta > alpha
        });

        if any {
            worst
        } else {
            // Even the move alone is infeasible.
            f64::NEG_INFINITY
        }
    }

    /// Walk the cross product of opponent move options, reusing one batch
    /// buffer. The visitor returns `false` to prune the remainder.
    fn for_each_combination(
        &self,
        opponents: &[UnitId],
        options: &[Vec<R::Descriptor>],
        batch: &mut Vec<(UnitId, R::Descriptor)>,
        visit: &mut impl FnMut(&Self, &[(UnitId, R::Descriptor)]) -> bool,
    ) -> bool {
        let Some((&opponent, rest)) = opponents.split_first() else {
            return visit(self, batch);
        };
        let (own_options, rest_options) = options
            .split_first()
            .map_or((&[] as &[R::Descriptor], &[] as &[Vec<R::Descriptor>]), |(o, r)| {
                (o.as_slice(), r)
            });

        if own_options.is_empty() {
            // A boxed-in opponent simply makes no move this round.
            return self.for_each_combination(rest, rest_options, batch, visit);
        }
        for option in own_options {
            batch.push((opponent, option.clone()));
            let keep_going = self.for_each_combination(rest, rest_options, batch, visit);
            batch.pop();
            if !keep_going {
                return false;
            }
        }
        true
    }

    /// The replies considered for one opponent.
    fn opponent_moves(&self, api: &GameApi<R>, opponent: UnitId) -> Vec<R::Descriptor> {
        let moves = api.check_feasible_moves(opponent);
        if !self.config.exclude_suicidal {
            return moves;
        }
        let sensible: Vec<R::Descriptor> = moves
            .iter()
            .filter(|d| {
                api.simulate_move(opponent, d)
                    .is_some_and(|fork| fork.core().is_alive(opponent))
            })
            .cloned()
            .collect();
        // A cornered opponent still moves; keep the suicidal options then.
        if sensible.is_empty() {
            moves
        } else {
            sensible
        }
    }

    /// Score of a decided game, preferring quick wins and late losses.
    fn terminal_score(
        &self,
        api: &GameApi<R>,
        outcome: &GameOutcome,
        unit: UnitId,
        depth: u32,
    ) -> f64 {
        match outcome {
            GameOutcome::Tie => 0.0,
            GameOutcome::Win { team, .. } => {
                let own_team = api.core().unit(unit).map(|u| u.team);
                if own_team == Some(*team) {
                    WIN_SCORE + f64::from(depth)
                } else {
                    -WIN_SCORE - f64::from(depth)
                }
            }
        }
    }

    /// Team-aggregated evaluation at the horizon: own team's total minus
    /// the mean of the other teams' totals.
    fn horizon_score(&self, api: &GameApi<R>, unit: UnitId) -> f64 {
        let Some(own_team) = api.core().unit(unit).map(|u| u.team) else {
            return 0.0;
        };

        let mut own = 0.0;
        let mut others = Vec::new();
        for team in api.core().team_ids() {
            let total: f64 = api
                .core()
                .team_members(team)
                .filter(|&id| {
                    api.core()
                        .unit(id)
                        .is_some_and(|u| u.counted && u.alive())
                })
                .map(|id| self.evaluator.evaluate(api, id))
                .sum();
            if team == own_team {
                own = total;
            } else {
                others.push(total);
            }
        }

        if others.is_empty() {
            own
        } else {
            own - others.iter().sum::<f64>() / others.len() as f64
        }
    }
}
