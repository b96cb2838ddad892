use super::heuristic::estimate_bid;
use super::{Agent, AgentError};
use crate::mcts::{InvalidMctsConfig, MctsConfig, SearchReport, determinized_search};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};
use wizard_core::belief::InformationSet;
use wizard_core::model::card::Card;

/// Bids like [`HeuristicAgent`](super::HeuristicAgent) and plays by determinized tree search.
#[derive(Debug, Clone)]
pub struct MctsAgent {
    name: String,
    config: MctsConfig,
    rng: StdRng,
    last_report: Option<SearchReport>,
}

impl MctsAgent {
    /// Fails if `config` does not pass [`MctsConfig::validate`].
    pub fn new(name: impl Into<String>, config: MctsConfig) -> Result<Self, InvalidMctsConfig> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            name: name.into(),
            config,
            rng,
            last_report: None,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Statistics of the most recent search, if the last play needed one.
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, info: &InformationSet) -> Result<u8, AgentError> {
        let range = info.legal_bids()?;
        Ok(estimate_bid(info.hand(), info.trump(), info.hand_size()).min(*range.end()))
    }

    fn choose_play(&mut self, info: &InformationSet) -> Result<Card, AgentError> {
        let legal = info.legal_moves()?;
        self.last_report = None;
        match legal.as_slice() {
            [] => return Err(AgentError::NoLegalMoves(info.seat())),
            [only] => return Ok(*only),
            _ => {}
        }

        let report = determinized_search(info, &self.config, &mut self.rng)?;
        let chosen = report
            .stats
            .best_move()
            .filter(|card| legal.contains(card))
            .ok_or(AgentError::NoLegalMoves(info.seat()))?;

        event!(
            target: "wizard_bot::mcts",
            Level::DEBUG,
            agent = %self.name,
            seat = %info.seat(),
            chosen = %chosen,
            legal_count = legal.len(),
            samples = report.samples,
            iterations = report.stats.iterations,
            rejections = report.sampling.rejections,
            repairs = report.sampling.repairs,
            timed_out = report.stats.timed_out,
            elapsed_ms = report.elapsed.as_millis() as u64,
        );
        self.last_report = Some(report);
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::MctsAgent;
    use crate::agent::Agent;
    use crate::mcts::MctsConfig;
    use wizard_core::game::match_state::MatchState;
    use wizard_core::model::deck::TrumpRule;

    fn bid_out(state: &mut MatchState, agent: &mut MctsAgent) {
        while let Some(seat) = state.round().expected_seat() {
            let info = state.information_set(seat).unwrap();
            let Ok(bid) = agent.choose_bid(&info) else { break };
            state.round_mut().place_bid(seat, bid).unwrap();
        }
    }

    #[test]
    fn searches_only_when_there_is_a_choice() {
        let config = MctsConfig {
            iterations: 50,
            num_determinizations: 2,
            ..MctsConfig::default()
        }
        .with_seed(4);
        let mut agent = MctsAgent::new("mcts", config).unwrap();

        let mut state = MatchState::with_seed_round(3, 17, 1, TrumpRule::default()).unwrap();
        bid_out(&mut state, &mut agent);
        let seat = state.round().expected_seat().unwrap();
        let info = state.information_set(seat).unwrap();
        let card = agent.choose_play(&info).unwrap();
        assert_eq!(info.legal_moves().unwrap(), vec![card]);
        assert!(agent.last_report().is_none());

        let mut state = MatchState::with_seed_round(3, 17, 6, TrumpRule::default()).unwrap();
        bid_out(&mut state, &mut agent);
        let mut seat = state.round().expected_seat().unwrap();
        // find a seat with more than one legal card
        while state.information_set(seat).unwrap().legal_moves().unwrap().len() < 2 {
            let card = state.round().legal_moves(seat).unwrap()[0];
            state.round_mut().play_card(seat, card).unwrap();
            seat = state.round().expected_seat().unwrap();
        }
        let info = state.information_set(seat).unwrap();
        let card = agent.choose_play(&info).unwrap();
        assert!(info.legal_moves().unwrap().contains(&card));
        let report = agent.last_report().unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.stats.iterations, 100);
        assert_eq!(report.stats.total_visits(), 100);
    }

    #[test]
    fn rejects_configs_that_cannot_search() {
        let config = MctsConfig {
            iterations: 0,
            ..MctsConfig::default()
        };
        let err = MctsAgent::new("mcts", config).unwrap_err();
        assert_eq!(err.field, "iterations");

        let config = MctsConfig {
            num_determinizations: 0,
            ..MctsConfig::default()
        };
        assert!(MctsAgent::new("mcts", config).is_err());
    }
}
