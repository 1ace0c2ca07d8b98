//! Fixing-date resolution over the call-link chain.
//!
//! The link chain is a closed, source-order traversal of the whole graph:
//! root -> first sub-call -> ... -> last sub-call -> root. Walking it from
//! the root's link gives every call in the contract's document order, with
//! the root last. Fixing dates are then read out of each call's stored
//! source rather than from the dependency relations, since document order
//! is what determines the calendar the simulation must cover.

use chrono::NaiveDate;
use contango_core::CallId;
use contango_traits::storage::{CallLinkStore, CallRequirementStore};

use crate::error::EngineError;
use crate::expr::parse_fixing_dates;

/// All calls in source order, root last.
///
/// Starts from the link *out of* the root and follows `next_call_id` until
/// the chain returns to the root. A chain that revisits a non-root call, or
/// whose next link is missing, is corrupt.
pub fn link_order(
    root_id: CallId,
    links: &dyn CallLinkStore,
) -> Result<Vec<CallId>, EngineError> {
    let mut order = Vec::new();
    let mut current = root_id;
    loop {
        let link = links.get(&current)?.ok_or_else(|| {
            EngineError::GraphConsistency(format!("call link chain broken at {current}"))
        })?;
        let next = link.next_call_id;
        if next == root_id {
            order.push(root_id);
            return Ok(order);
        }
        if order.contains(&next) {
            return Err(EngineError::GraphConsistency(format!(
                "call link chain revisits {next} before closing"
            )));
        }
        order.push(next);
        current = next;
    }
}

/// The distinct fixing dates of a contract, sorted ascending.
///
/// Reads each call's stored source in link order and collects the dates its
/// fixings pin. Calls without a date-bearing construct contribute nothing.
pub fn list_fixing_dates(
    root_id: CallId,
    links: &dyn CallLinkStore,
    requirements: &dyn CallRequirementStore,
) -> Result<Vec<NaiveDate>, EngineError> {
    let mut dates = Vec::new();
    for call_id in link_order(root_id, links)? {
        let requirement = requirements.get(&call_id)?.ok_or_else(|| {
            EngineError::GraphConsistency(format!("call {call_id} has no requirement record"))
        })?;
        for date in parse_fixing_dates(&requirement.dsl_source) {
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
    }
    dates.sort();
    Ok(dates)
}
