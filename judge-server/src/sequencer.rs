//! Scenario sequencing
//!
//! The remaining sequence is every catalog position whose effective scenario
//! index is not yet judged, in catalog order. A client walks it by position;
//! each fetch draws a fresh random pair of distinct models for display.

use std::collections::{BTreeMap, HashSet};

use judge_common::ScenarioCatalog;
use rand::seq::SliceRandom;
use rand::Rng;

/// A scenario ready to be judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPick {
    /// Position in the catalog
    pub catalog_position: usize,
    /// Stable identity reported back with votes
    pub scenario_index: i64,
    pub prompt: String,
    pub left_model: String,
    pub left_response: String,
    pub right_model: String,
    pub right_response: String,
    /// 1-based position within the remaining sequence
    pub scenario_number: usize,
    /// Length of the remaining sequence
    pub scenario_total: usize,
}

/// Outcome of asking for the scenario at a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Position is past the end of the remaining sequence
    Complete,
    /// Scenario has fewer than two responses; advance to `next_position`
    Skip { next_position: usize },
    Ready(ScenarioPick),
}

/// Catalog positions not yet judged, in catalog order
pub fn remaining_indices(catalog: &ScenarioCatalog, judged: &HashSet<i64>) -> Vec<usize> {
    catalog
        .iter()
        .filter(|(_, index, _)| !judged.contains(index))
        .map(|(position, _, _)| position)
        .collect()
}

/// Scenario at `position` of `remaining`, using the thread-local RNG
pub fn scenario_at(catalog: &ScenarioCatalog, remaining: &[usize], position: usize) -> Selection {
    scenario_at_with_rng(catalog, remaining, position, &mut rand::thread_rng())
}

/// Scenario at `position` of `remaining` with an explicit random source
pub fn scenario_at_with_rng<R: Rng + ?Sized>(
    catalog: &ScenarioCatalog,
    remaining: &[usize],
    position: usize,
    rng: &mut R,
) -> Selection {
    let Some(&catalog_position) = remaining.get(position) else {
        return Selection::Complete;
    };
    let (Some(scenario), Some(scenario_index)) = (
        catalog.get(catalog_position),
        catalog.effective_index(catalog_position),
    ) else {
        return Selection::Complete;
    };

    let Some([(left_model, left_response), (right_model, right_response)]) =
        select_pair(&scenario.responses, rng)
    else {
        return Selection::Skip {
            next_position: position + 1,
        };
    };

    Selection::Ready(ScenarioPick {
        catalog_position,
        scenario_index,
        prompt: scenario.scenario.clone(),
        left_model: left_model.to_string(),
        left_response: left_response.to_string(),
        right_model: right_model.to_string(),
        right_response: right_response.to_string(),
        scenario_number: position + 1,
        scenario_total: remaining.len(),
    })
}

/// Draw two distinct (model, response) entries uniformly without replacement
///
/// The order of the result is part of the draw and decides the display side.
pub fn select_pair<'a, R: Rng + ?Sized>(
    responses: &'a BTreeMap<String, String>,
    rng: &mut R,
) -> Option<[(&'a str, &'a str); 2]> {
    if responses.len() < 2 {
        return None;
    }
    let mut entries: Vec<(&'a str, &'a str)> = responses
        .iter()
        .map(|(model, response)| (model.as_str(), response.as_str()))
        .collect();
    let (chosen, _) = entries.partial_shuffle(rng, 2);
    Some([chosen[0], chosen[1]])
}
