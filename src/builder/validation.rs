//! Structural validation of a declared machine.
//!
//! Checks run in stages. Inside a stage every check runs and all failures
//! are accumulated with `Validation`; a failing stage stops the later ones,
//! since they rely on what the earlier stages established.

use super::config::{Endpoints, MachineConfig, TransitionDecl};
use super::error::{TransitionRef, Violation};
use crate::core::{EventId, StateId};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check<S, E> = Validation<(), NonEmptyVec<Violation<S, E>>>;

/// Validate `config`, returning the initial and final slots on success.
pub(crate) fn validate<S: StateId, E: EventId>(
    config: &MachineConfig<S, E>,
) -> Result<Endpoints, Vec<Violation<S, E>>> {
    stage(vec![ensure(!config.states.is_empty(), || Violation::NoStates)])?;

    let endpoints = match (config.initial, config.final_state) {
        (Some(initial), Some(final_state)) => Endpoints {
            initial,
            final_state,
        },
        (initial, final_state) => {
            return Err(failures(vec![
                ensure(initial.is_some(), || Violation::MissingInitialState),
                ensure(final_state.is_some(), || Violation::MissingFinalState),
            ]))
        }
    };

    let declared = |id: &S| config.index.contains_key(id);
    let transitions = &config.transitions;

    stage(vec![ids(
        distinct(
            transitions
                .iter()
                .map(|t| &t.source)
                .filter(|id| !declared(*id)),
        ),
        Violation::UnknownSourceStates,
    )])?;

    let final_id = &config.states[endpoints.final_state].id;
    stage(vec![
        ids(
            distinct(
                transitions
                    .iter()
                    .filter_map(|t| t.target.as_ref())
                    .filter(|id| !declared(*id)),
            ),
            Violation::UnknownTargetStates,
        ),
        refs(
            transitions,
            |t| t.is_external() && t.target.is_none(),
            Violation::ExternalTransitionsWithoutTarget,
        ),
        refs(
            transitions,
            |t| !t.is_external() && t.target.is_some(),
            Violation::InternalTransitionsWithTarget,
        ),
        refs(
            transitions,
            |t| t.event.is_none(),
            Violation::TransitionsWithoutEvent,
        ),
        refs(
            transitions,
            |t| &t.source == final_id,
            Violation::TransitionsFromFinalState,
        ),
    ])?;

    let mut entered: HashSet<&S> = HashSet::new();
    let mut exited: HashSet<&S> = HashSet::new();
    for transition in transitions.iter().filter(|t| t.is_external()) {
        exited.insert(&transition.source);
        if let Some(target) = &transition.target {
            entered.insert(target);
        }
    }

    let states = config.states.iter().enumerate();
    stage(vec![
        ids(
            states
                .clone()
                .filter(|(slot, decl)| *slot != endpoints.initial && !entered.contains(&decl.id))
                .map(|(_, decl)| decl.id.clone())
                .collect(),
            Violation::StatesWithoutInboundTransition,
        ),
        ids(
            states
                .filter(|(slot, decl)| *slot != endpoints.final_state && !exited.contains(&decl.id))
                .map(|(_, decl)| decl.id.clone())
                .collect(),
            Violation::StatesWithoutOutboundTransition,
        ),
    ])?;

    Ok(endpoints)
}

fn stage<S: StateId, E: EventId>(checks: Vec<Check<S, E>>) -> Result<(), Vec<Violation<S, E>>> {
    let violations = failures(checks);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn failures<S: StateId, E: EventId>(checks: Vec<Check<S, E>>) -> Vec<Violation<S, E>> {
    match Validation::all_vec(checks) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(violations) => violations.iter().cloned().collect(),
    }
}

fn ensure<S: StateId, E: EventId>(
    holds: bool,
    violation: impl FnOnce() -> Violation<S, E>,
) -> Check<S, E> {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn ids<S: StateId, E: EventId>(
    offending: Vec<S>,
    violation: fn(Vec<S>) -> Violation<S, E>,
) -> Check<S, E> {
    if offending.is_empty() {
        Validation::success(())
    } else {
        Validation::fail(violation(offending))
    }
}

fn refs<S: StateId, E: EventId>(
    transitions: &[TransitionDecl<S, E>],
    offends: impl Fn(&TransitionDecl<S, E>) -> bool,
    violation: fn(Vec<TransitionRef<S, E>>) -> Violation<S, E>,
) -> Check<S, E> {
    let offending: Vec<_> = transitions
        .iter()
        .filter(|t| offends(t))
        .map(TransitionDecl::reference)
        .collect();

    if offending.is_empty() {
        Validation::success(())
    } else {
        Validation::fail(violation(offending))
    }
}

/// Ids in first-seen order, each once.
fn distinct<'a, S: StateId>(ids: impl Iterator<Item = &'a S>) -> Vec<S> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).cloned().collect()
}
