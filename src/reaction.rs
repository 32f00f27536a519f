//! Pairwise reactions inside a combined pool.
//!
//! Every unordered pair of pool positions is visited once. Both members of a
//! pair are always proposed for keeping; an enzyme/DNA pair with a known
//! recognition sequence additionally proposes the digest fragments and strikes
//! the original strand. [`reconcile`] then resolves the proposals.

use crate::{
    enzymes::Enzymes,
    error::EngineError,
    ids::{IdCounter, ItemId},
    item::{Component, Dna, RestrictionEnzyme},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digestion {
    pub enzyme_id: ItemId,
    pub enzyme_name: String,
    pub strand_id: ItemId,
    pub fragment_ids: Vec<ItemId>,
}

#[derive(Debug, Clone)]
pub struct ReactionOutcome {
    /// Proposed items in proposal order; the same ID may appear many times.
    pub keep: Vec<Component>,
    pub struck: BTreeSet<ItemId>,
    pub counter: IdCounter,
    pub digestions: Vec<Digestion>,
}

impl ReactionOutcome {
    pub fn fragment_count(&self) -> usize {
        self.digestions.iter().map(|d| d.fragment_ids.len()).sum()
    }
}

fn digestion_pair<'a>(
    a: &'a Component,
    b: &'a Component,
) -> Option<(&'a RestrictionEnzyme, &'a Dna)> {
    match (a, b) {
        (Component::RestrictionEnzyme(enzyme), Component::Dna(strand))
        | (Component::Dna(strand), Component::RestrictionEnzyme(enzyme)) => Some((enzyme, strand)),
        _ => None,
    }
}

pub fn react(
    pool: &[Component],
    counter: IdCounter,
    enzymes: &Enzymes,
) -> Result<ReactionOutcome, EngineError> {
    let mut outcome = ReactionOutcome {
        keep: Vec::with_capacity(pool.len() * pool.len()),
        struck: BTreeSet::new(),
        counter,
        digestions: vec![],
    };

    for (a, b) in pool.iter().tuple_combinations() {
        outcome.keep.push(a.clone());
        outcome.keep.push(b.clone());

        let Some((enzyme, strand)) = digestion_pair(a, b) else {
            continue;
        };
        let Some(site) = enzymes.recognition_sequence(&enzyme.name) else {
            debug!(
                "No recognition sequence for enzyme '{}' (#{}), leaving DNA #{} intact",
                enzyme.name, enzyme.id, strand.id
            );
            continue;
        };

        let pieces = site.digest(&strand.sequence);
        let (fragment_ids, next) = outcome.counter.allocate_many(pieces.len())?;
        outcome.counter = next;
        debug!(
            "Enzyme '{}' (#{}) cut DNA #{} into {} fragment(s): {:?}",
            enzyme.name,
            enzyme.id,
            strand.id,
            pieces.len(),
            fragment_ids
        );

        outcome.keep.extend(
            fragment_ids
                .iter()
                .zip(pieces)
                .map(|(id, piece)| Component::Dna(Dna::fragment(*id, piece))),
        );
        outcome
            .keep
            .push(Component::RestrictionEnzyme(enzyme.clone()));
        outcome.struck.insert(strand.id);
        outcome.digestions.push(Digestion {
            enzyme_id: enzyme.id,
            enzyme_name: enzyme.name.clone(),
            strand_id: strand.id,
            fragment_ids,
        });
    }

    Ok(outcome)
}

/// Keeps the first proposal for each ID, dropping struck IDs entirely.
pub fn reconcile(keep: Vec<Component>, struck: &BTreeSet<ItemId>) -> Vec<Component> {
    let mut seen: HashSet<ItemId> = struck.iter().copied().collect();
    keep.into_iter().filter(|c| seen.insert(c.id())).collect()
}
