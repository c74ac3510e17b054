use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Player;

/// One hypothetical add/drop layered on top of the real roster snapshot.
/// Storage order is insertion order; display order is by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedMove {
    pub date: NaiveDate,
    pub added: Player,
    pub dropped: Player,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Drop a player from the original roster snapshot.
    Roster(String),
    /// Drop a player that was itself added by a prior simulated move.
    Simulated(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate {
    pub player: Player,
    /// Present when the candidate entered via a simulated add.
    pub added_on: Option<NaiveDate>,
}

#[derive(Debug, Error, PartialEq)]
pub enum MoveError {
    #[error("check a player to add first")]
    NoAddSelected,
    #[error("pick a player to drop first")]
    NoDropSelected,
    #[error("pick a date for the move first")]
    NoDateSelected,
    #[error("the checked player is no longer available to add")]
    UnknownAddTarget,
    #[error("{0} was already added by a simulated move")]
    AlreadyAdded(String),
    #[error("the drop target is no longer available")]
    UnknownDropTarget,
    #[error("cannot drop {name} on {drop_date}: not added until {added_on}")]
    DropBeforeAdd {
        name: String,
        drop_date: NaiveDate,
        added_on: NaiveDate,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Simulator {
    moves: Vec<SimulatedMove>,
}

impl Simulator {
    pub fn from_moves(moves: Vec<SimulatedMove>) -> Self {
        Self { moves }
    }

    pub fn moves(&self) -> &[SimulatedMove] {
        &self.moves
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Moves ordered ascending by date; ties keep insertion order.
    pub fn moves_by_date(&self) -> Vec<&SimulatedMove> {
        let mut sorted: Vec<&SimulatedMove> = self.moves.iter().collect();
        sorted.sort_by_key(|mv| mv.date);
        sorted
    }

    pub fn is_added(&self, id: &str) -> bool {
        self.moves.iter().any(|mv| mv.added.id == id)
    }

    /// Validates and appends one hypothetical move. The added player is
    /// resolved against the waiver pool first, then the free agents; the
    /// dropped player against the roster snapshot or a prior simulated add.
    /// No state changes on any failure.
    pub fn simulate_move(
        &mut self,
        waivers: &[Player],
        free_agents: &[Player],
        roster: &[Player],
        added_id: Option<&str>,
        target: Option<&DropTarget>,
        date: Option<NaiveDate>,
    ) -> Result<SimulatedMove, MoveError> {
        let added_id = added_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(MoveError::NoAddSelected)?;
        let target = target.ok_or(MoveError::NoDropSelected)?;
        let date = date.ok_or(MoveError::NoDateSelected)?;

        let added = waivers
            .iter()
            .chain(free_agents.iter())
            .find(|p| p.id == added_id)
            .cloned()
            .ok_or(MoveError::UnknownAddTarget)?;
        if self.is_added(&added.id) {
            return Err(MoveError::AlreadyAdded(added.name));
        }

        let dropped = match target {
            DropTarget::Roster(id) => roster
                .iter()
                .find(|p| p.id == *id)
                .cloned()
                .ok_or(MoveError::UnknownDropTarget)?,
            DropTarget::Simulated(id) => {
                let prior = self
                    .moves
                    .iter()
                    .find(|mv| mv.added.id == *id)
                    .ok_or(MoveError::UnknownDropTarget)?;
                if date < prior.date {
                    return Err(MoveError::DropBeforeAdd {
                        name: prior.added.name.clone(),
                        drop_date: date,
                        added_on: prior.date,
                    });
                }
                prior.added.clone()
            }
        };

        let mv = SimulatedMove {
            date,
            added,
            dropped,
        };
        self.moves.push(mv.clone());
        Ok(mv)
    }

    /// Union of roster players not yet dropped and simulated adds (annotated
    /// with their add date) not yet dropped by a later move.
    pub fn drop_candidates(&self, roster: &[Player]) -> Vec<DropCandidate> {
        let dropped_ids: HashSet<&str> = self
            .moves
            .iter()
            .map(|mv| mv.dropped.id.as_str())
            .collect();

        let mut candidates: Vec<DropCandidate> = roster
            .iter()
            .filter(|p| !dropped_ids.contains(p.id.as_str()))
            .map(|p| DropCandidate {
                player: p.clone(),
                added_on: None,
            })
            .collect();

        for mv in &self.moves {
            if dropped_ids.contains(mv.added.id.as_str()) {
                continue;
            }
            candidates.push(DropCandidate {
                player: mv.added.clone(),
                added_on: Some(mv.date),
            });
        }

        candidates
    }

    pub fn reset(&mut self) {
        self.moves.clear();
    }
}
