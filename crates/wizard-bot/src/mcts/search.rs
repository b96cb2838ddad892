//! UCB1 tree search over sampled worlds.
//!
//! Each sampled world gets its own tree whose nodes are the searching seat's
//! decisions; the other seats are played by the rollout policy whenever the
//! descent reaches them. Root statistics are summed per card across worlds.

use crate::mcts::config::MctsConfig;
use crate::mcts::node::NodeId;
use crate::mcts::reward::{RewardKind, RewardModel};
use crate::mcts::rollout::{RolloutPolicy, advance_environment, collapse_specials, rollout};
use crate::mcts::tree::Tree;
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use thiserror::Error;
use wizard_core::belief::{Determinizer, InformationSet, SamplingStats};
use wizard_core::error::{ConsistencyError, InvalidStateError};
use wizard_core::model::card::Card;
use wizard_core::model::player::Seat;
use wizard_core::model::round::RoundState;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveStats {
    pub visits: u32,
    pub value_sum: f64,
}

impl MoveStats {
    pub fn average(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visits)
        }
    }
}

/// Root statistics of one or more searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Per candidate card, in sort order.
    pub moves: Vec<(Card, MoveStats)>,
    /// Completed iterations.
    pub iterations: u32,
    pub timed_out: bool,
}

impl SearchStats {
    pub fn get(&self, card: Card) -> Option<&MoveStats> {
        self.moves
            .iter()
            .find(|(candidate, _)| *candidate == card)
            .map(|(_, stats)| stats)
    }

    pub fn total_visits(&self) -> u32 {
        self.moves.iter().map(|(_, stats)| stats.visits).sum()
    }

    /// Sums `other` into `self` card by card.
    pub fn merge(&mut self, other: SearchStats) {
        for (card, stats) in other.moves {
            match self.moves.iter_mut().find(|(candidate, _)| *candidate == card) {
                Some((_, mine)) => {
                    mine.visits += stats.visits;
                    mine.value_sum += stats.value_sum;
                }
                None => self.moves.push((card, stats)),
            }
        }
        self.moves.sort_by_key(|(card, _)| card.sort_key());
        self.iterations += other.iterations;
        self.timed_out |= other.timed_out;
    }

    /// Most visits, then best average, then lowest sort key.
    pub fn best_move(&self) -> Option<Card> {
        self.moves
            .iter()
            .min_by(|(a_card, a), (b_card, b)| {
                b.visits
                    .cmp(&a.visits)
                    .then_with(|| b.average().partial_cmp(&a.average()).unwrap_or(Ordering::Equal))
                    .then_with(|| a_card.sort_key().cmp(&b_card.sort_key()))
            })
            .map(|(card, _)| *card)
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub exploration: f64,
    pub reward: RewardKind,
    /// Stop starting new iterations once this instant has passed.
    pub deadline: Option<Instant>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            exploration: MctsConfig::default().exploration_constant,
            reward: RewardKind::default(),
            deadline: None,
        }
    }
}

/// Result of a determinized search for one decision.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub stats: SearchStats,
    /// Worlds actually searched.
    pub samples: usize,
    pub sampling: SamplingStats,
    pub elapsed: Duration,
}

/// Runs up to `iterations` iterations from `state`, where `seat` must be on
/// turn to play. At least one iteration runs even if the deadline has already
/// passed.
pub fn search<P, R>(
    state: &RoundState,
    seat: Seat,
    iterations: u32,
    policy: &P,
    options: &SearchOptions,
    rng: &mut R,
) -> Result<SearchStats, InvalidStateError>
where
    P: RolloutPolicy + ?Sized,
    R: RngCore,
{
    let root_moves = collapse_specials(&state.legal_moves(seat)?);
    let mut tree = Tree::new();
    let mut completed = 0u32;
    let mut timed_out = false;

    while completed < iterations {
        if completed > 0 && options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            timed_out = true;
            break;
        }
        iterate(&mut tree, state, seat, policy, options, rng)?;
        completed += 1;
    }

    let root = tree.root();
    let moves = root_moves
        .iter()
        .filter_map(|card| {
            root.child(*card).map(|id| {
                let node = tree.get(id);
                (
                    *card,
                    MoveStats {
                        visits: node.stats.visits,
                        value_sum: node.stats.value_sum,
                    },
                )
            })
        })
        .collect();

    Ok(SearchStats {
        moves,
        iterations: completed,
        timed_out,
    })
}

fn iterate<P, R>(
    tree: &mut Tree,
    root_state: &RoundState,
    seat: Seat,
    policy: &P,
    options: &SearchOptions,
    rng: &mut R,
) -> Result<(), InvalidStateError>
where
    P: RolloutPolicy + ?Sized,
    R: RngCore,
{
    let mut world = root_state.clone();
    let mut path = vec![NodeId::ROOT];
    let mut current = NodeId::ROOT;

    loop {
        advance_environment(&mut world, seat, policy, rng)?;
        if world.is_terminal() {
            break;
        }
        let legal = collapse_specials(&world.legal_moves(seat)?);

        let untried: Vec<Card> = legal
            .iter()
            .copied()
            .filter(|card| tree.get(current).child(*card).is_none())
            .collect();
        if !untried.is_empty() {
            let card = untried[rng.gen_range(0..untried.len())];
            world.play_card(seat, card)?;
            let child = tree.add_child(current, card);
            path.push(child);
            break;
        }

        let (card, child) = select_ucb(tree, current, &legal, options.exploration);
        world.play_card(seat, card)?;
        path.push(child);
        current = child;
    }

    rollout(&mut world, policy, rng)?;
    let value = options.reward.reward(&world, seat);
    for id in path {
        tree.get_mut(id).stats.record(value);
    }
    Ok(())
}

/// UCB1 over the children whose card is legal in this world. Every legal card
/// already has a child when this is called.
fn select_ucb(tree: &Tree, parent: NodeId, legal: &[Card], exploration: f64) -> (Card, NodeId) {
    let node = tree.get(parent);
    let log_parent = f64::from(node.stats.visits.max(1)).ln();
    let mut best: Option<(Card, NodeId, f64)> = None;

    for &card in legal {
        let Some(child) = node.child(card) else {
            continue;
        };
        let stats = &tree.get(child).stats;
        let score = if stats.visits == 0 {
            f64::INFINITY
        } else {
            stats.mean() + exploration * (log_parent / f64::from(stats.visits)).sqrt()
        };
        if best.is_none_or(|(_, _, top)| score > top) {
            best = Some((card, child, score));
        }
    }

    match best {
        Some((card, child, _)) => (card, child),
        // unreachable while `legal` is non-empty and fully expanded
        None => (legal[0], parent),
    }
}

/// Samples `config.num_determinizations` worlds from `info` and sums the root
/// statistics of one search per world. A configured time limit covers the
/// whole decision.
pub fn determinized_search<R: RngCore>(
    info: &InformationSet,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<SearchReport, SearchError> {
    let started = Instant::now();
    let deadline = config.time_limit().map(|limit| started + limit);
    let options = SearchOptions {
        exploration: config.exploration_constant,
        reward: config.reward,
        deadline,
    };
    let sampler = Determinizer::new(config.sampler_attempts);

    let mut report = SearchReport::default();
    for _ in 0..config.num_determinizations {
        if report.samples > 0 && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            report.stats.timed_out = true;
            break;
        }
        let (world, sampling) = sampler.sample_with_stats(info, rng)?;
        report.sampling.merge(sampling);
        let stats = search(&world, info.seat(), config.iterations, &config.rollout, &options, rng)?;
        report.stats.merge(stats);
        report.samples += 1;
    }
    report.elapsed = started.elapsed();
    Ok(report)
}
