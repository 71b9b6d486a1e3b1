//! Per-group chronological delta computation.

use crate::delta::branch::{delta_between, DeltaAnnotation};
use crate::model::observation::{Observation, ObservationId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Deltas keyed by the identity of the observation they describe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaIndex {
    by_id: HashMap<ObservationId, DeltaAnnotation>,
}

impl DeltaIndex {
    /// Delta of one observation; null fields when the id is unknown.
    pub fn get(&self, id: &ObservationId) -> DeltaAnnotation {
        self.by_id.get(id).copied().unwrap_or(DeltaAnnotation::NONE)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Observation paired with its delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedObservation {
    #[serde(flatten)]
    pub observation: Observation,
    pub delta: DeltaAnnotation,
}

/// Computes deltas for every (category, content) group in `observations`.
///
/// Groups may be interleaved in any order. Inside a group, entries are
/// ordered by `(year, month, week)`; entries sharing a period keep their
/// input order. Gaps between periods are not interpolated. Values that are
/// not numeric count as null here.
///
/// Ids are expected to be unique. When an id repeats, the index keeps the
/// delta of its first occurrence; [`attach_deltas`] pairs by position and is
/// unaffected.
pub fn compute_deltas(observations: &[Observation]) -> DeltaIndex {
    let deltas = deltas_by_position(observations);
    let mut by_id = HashMap::with_capacity(observations.len());
    for (observation, delta) in observations.iter().zip(deltas) {
        by_id.entry(observation.id).or_insert(delta);
    }
    DeltaIndex { by_id }
}

/// Computes deltas and pairs them with their observations, in input order.
pub fn attach_deltas(observations: &[Observation]) -> Vec<AnnotatedObservation> {
    observations
        .iter()
        .zip(deltas_by_position(observations))
        .map(|(observation, delta)| AnnotatedObservation {
            observation: observation.clone(),
            delta,
        })
        .collect()
}

/// Delta of each input position.
fn deltas_by_position(observations: &[Observation]) -> Vec<DeltaAnnotation> {
    let mut groups: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for (position, observation) in observations.iter().enumerate() {
        groups
            .entry((observation.category.as_str(), observation.content.as_str()))
            .or_default()
            .push(position);
    }

    let mut deltas = vec![DeltaAnnotation::NONE; observations.len()];
    for members in groups.values_mut() {
        members.sort_by_key(|&position| observations[position].period());

        let mut previous: Option<Option<f64>> = None;
        for &position in members.iter() {
            let current = observations[position].numeric_value().ok().flatten();
            deltas[position] = delta_between(previous, current);
            previous = Some(current);
        }
    }
    deltas
}
