//! Execution order scheduling over the persisted dependency relations.
//!
//! Reverse-Kahn topological sort: a FIFO ready queue is seeded with the
//! leaf calls, and a call joins the queue only once every one of its
//! dependencies has been yielded. Ties among simultaneously ready calls
//! break by FIFO discovery order, so the order is deterministic (though not
//! the only valid one). The walk is iterative - an explicit queue, never
//! the call stack - since graphs may contain many thousands of calls.
//!
//! The iterator is a pure synchronous generator over already-materialized
//! relations: it never blocks waiting for results, and it is restartable
//! only by re-invocation.

use std::collections::{HashSet, VecDeque};

use contango_core::CallId;
use contango_traits::storage::{CallDependenciesStore, CallDependentsStore};

use crate::error::EngineError;

/// Lazy execution order over one contract's call graph.
///
/// Yields every call id exactly once, each strictly after all ids in its
/// dependency set. Workers may consume the sequence incrementally and
/// evaluate independent calls in parallel.
pub struct ExecutionOrder<'a> {
    queue: VecDeque<CallId>,
    yielded: HashSet<CallId>,
    queued: HashSet<CallId>,
    dependents: &'a dyn CallDependentsStore,
    dependencies: &'a dyn CallDependenciesStore,
}

/// Build the execution order for a graph, seeded with its leaf calls.
pub fn execution_order<'a>(
    leaf_ids: &[CallId],
    dependents: &'a dyn CallDependentsStore,
    dependencies: &'a dyn CallDependenciesStore,
) -> ExecutionOrder<'a> {
    ExecutionOrder {
        queue: leaf_ids.iter().copied().collect(),
        yielded: HashSet::new(),
        queued: leaf_ids.iter().copied().collect(),
        dependents,
        dependencies,
    }
}

impl ExecutionOrder<'_> {
    fn advance(&mut self) -> Result<Option<CallId>, EngineError> {
        let Some(call_id) = self.queue.pop_front() else {
            return Ok(None);
        };
        self.yielded.insert(call_id);

        // A call with no dependents record is simply depended on by nobody.
        let dependents = self
            .dependents
            .get(&call_id)?
            .map(|d| d.dependents)
            .unwrap_or_default();

        for dependent in dependents {
            if self.queued.contains(&dependent) {
                continue;
            }
            let dependencies = self.dependencies.get(&dependent)?.ok_or_else(|| {
                EngineError::GraphConsistency(format!(
                    "call {dependent} has no dependencies record"
                ))
            })?;
            if dependencies
                .dependencies
                .iter()
                .all(|d| self.yielded.contains(d))
            {
                self.queue.push_back(dependent);
                self.queued.insert(dependent);
            }
        }

        Ok(Some(call_id))
    }
}

impl Iterator for ExecutionOrder<'_> {
    type Item = Result<CallId, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contango_core::{CallDependencies, ResultValue};
    use contango_ext_memory::MemoryStore;
    use contango_traits::storage::CallResultStore;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Persist the relations {call -> dependencies}, deriving dependents.
    fn store_relations(store: &MemoryStore, relations: &[(CallId, Vec<CallId>)]) {
        for (call_id, deps) in relations {
            CallDependenciesStore::create(
                store,
                CallDependencies {
                    call_id: *call_id,
                    dependencies: deps.clone(),
                },
            )
            .unwrap();
            for dep in deps {
                store.append(dep, *call_id).unwrap();
            }
        }
    }

    #[test]
    fn diamond_schedules_leaves_first() {
        // Dependencies: 1 -> {2, 3}, 3 -> {2}, 2 -> {}.
        // 2 is the only leaf; 3 depends only on 2; 1 is last.
        let store = Arc::new(MemoryStore::new());
        let (c1, c2, c3) = (CallId::new(), CallId::new(), CallId::new());
        store_relations(&store, &[(c1, vec![c2, c3]), (c2, vec![]), (c3, vec![c2])]);

        let order: Vec<CallId> = execution_order(&[c2], &*store, &*store)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(order, vec![c2, c3, c1]);
    }

    #[test]
    fn rerunning_yields_the_same_order() {
        let store = Arc::new(MemoryStore::new());
        let (c1, c2, c3) = (CallId::new(), CallId::new(), CallId::new());
        store_relations(&store, &[(c1, vec![c2, c3]), (c2, vec![]), (c3, vec![c2])]);

        let first: Vec<CallId> = execution_order(&[c2], &*store, &*store)
            .collect::<Result<_, _>>()
            .unwrap();
        let second: Vec<CallId> = execution_order(&[c2], &*store, &*store)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_dependencies_record_is_a_consistency_error() {
        let store = Arc::new(MemoryStore::new());
        let (c1, c2) = (CallId::new(), CallId::new());
        // 2's dependents say 1 needs it, but 1 has no dependencies record.
        CallDependenciesStore::create(
            &*store,
            CallDependencies {
                call_id: c2,
                dependencies: vec![],
            },
        )
        .unwrap();
        store.append(&c2, c1).unwrap();

        let result: Result<Vec<CallId>, _> = execution_order(&[c2], &*store, &*store).collect();
        assert!(matches!(result, Err(EngineError::GraphConsistency(_))));
    }

    #[test]
    fn readiness_is_purely_result_presence() {
        // The scheduler itself never reads results; this pins down that a
        // worker loop can derive readiness from result presence alone.
        let store = Arc::new(MemoryStore::new());
        let (c1, c2) = (CallId::new(), CallId::new());
        store_relations(&store, &[(c1, vec![c2]), (c2, vec![])]);

        CallResultStore::create(
            &*store,
            contango_core::CallResult {
                call_id: c2,
                result_value: ResultValue::Scalar(1.0),
            },
        )
        .unwrap();

        let deps = CallDependenciesStore::get(&*store, &c1).unwrap().unwrap();
        let ready = deps
            .dependencies
            .iter()
            .all(|d| CallResultStore::get(&*store, d).unwrap().is_some());
        assert!(ready);
    }

    proptest! {
        /// On random DAGs, every call is yielded exactly once and strictly
        /// after each of its dependencies.
        #[test]
        fn yields_each_call_once_after_its_dependencies(
            edges in proptest::collection::vec((0usize..12, 0usize..12), 0..40)
        ) {
            let node_count = 12;
            let ids: Vec<CallId> = (0..node_count).map(|_| CallId::new()).collect();

            // Orient edges low -> high so the relation is acyclic.
            let mut deps: HashMap<usize, Vec<usize>> =
                (0..node_count).map(|i| (i, vec![])).collect();
            for (a, b) in edges {
                if a == b {
                    continue;
                }
                let (dep, call) = if a < b { (a, b) } else { (b, a) };
                let entry = deps.get_mut(&call).unwrap();
                if !entry.contains(&dep) {
                    entry.push(dep);
                }
            }

            let store = Arc::new(MemoryStore::new());
            let relations: Vec<(CallId, Vec<CallId>)> = (0..node_count)
                .map(|i| (ids[i], deps[&i].iter().map(|d| ids[*d]).collect()))
                .collect();
            store_relations(&store, &relations);

            let leaves: Vec<CallId> = (0..node_count)
                .filter(|i| deps[i].is_empty())
                .map(|i| ids[i])
                .collect();

            let order: Vec<CallId> = execution_order(&leaves, &*store, &*store)
                .collect::<Result<_, _>>()
                .unwrap();

            prop_assert_eq!(order.len(), node_count);
            let position: HashMap<CallId, usize> =
                order.iter().enumerate().map(|(p, id)| (*id, p)).collect();
            for i in 0..node_count {
                for dep in &deps[&i] {
                    prop_assert!(position[&ids[*dep]] < position[&ids[i]]);
                }
            }
        }
    }
}
