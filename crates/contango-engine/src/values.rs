//! Dependency-value aggregation for call evaluation.

use std::collections::HashMap;

use contango_core::{CallId, ResultValue};
use contango_traits::storage::{CallDependenciesStore, CallResultStore};

use crate::error::EngineError;

/// Collect the computed values of a call's dependencies, keyed by call id.
///
/// Meant to be invoked only once the scheduler has yielded the call, at
/// which point every dependency already has a result; a missing result here
/// therefore indicates a corrupt graph or a scheduling bug, not a pending
/// computation.
pub fn dependency_values(
    call_id: CallId,
    dependencies: &dyn CallDependenciesStore,
    results: &dyn CallResultStore,
) -> Result<HashMap<CallId, ResultValue>, EngineError> {
    // The generator writes a dependencies record for every call, leaves
    // included; its absence means the graph is corrupt, not that the call
    // has none.
    let dependencies = dependencies
        .get(&call_id)?
        .map(|d| d.dependencies)
        .ok_or_else(|| {
            EngineError::GraphConsistency(format!("call {call_id} has no dependencies record"))
        })?;

    let mut values = HashMap::with_capacity(dependencies.len());
    for dependency_id in dependencies {
        let result = results.get(&dependency_id)?.ok_or_else(|| {
            EngineError::GraphConsistency(format!(
                "dependency {dependency_id} of call {call_id} has no result"
            ))
        })?;
        values.insert(dependency_id, result.result_value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contango_core::{CallDependencies, CallResult};
    use contango_ext_memory::MemoryStore;
    use contango_traits::storage::{CallDependenciesStore, CallResultStore};
    use std::sync::Arc;

    #[test]
    fn collects_each_dependency_value_by_id() {
        let store = Arc::new(MemoryStore::new());
        let (c1, c2, c3) = (CallId::new(), CallId::new(), CallId::new());
        CallDependenciesStore::create(
            &*store,
            CallDependencies {
                call_id: c1,
                dependencies: vec![c2, c3],
            },
        )
        .unwrap();
        CallResultStore::create(
            &*store,
            CallResult {
                call_id: c2,
                result_value: ResultValue::Scalar(12.0),
            },
        )
        .unwrap();
        CallResultStore::create(
            &*store,
            CallResult {
                call_id: c3,
                result_value: ResultValue::Scalar(13.0),
            },
        )
        .unwrap();

        let values = dependency_values(c1, &*store, &*store).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[&c2], ResultValue::Scalar(12.0));
        assert_eq!(values[&c3], ResultValue::Scalar(13.0));
    }

    #[test]
    fn leaf_call_yields_empty_map() {
        let store = Arc::new(MemoryStore::new());
        let leaf = CallId::new();
        CallDependenciesStore::create(
            &*store,
            CallDependencies {
                call_id: leaf,
                dependencies: vec![],
            },
        )
        .unwrap();

        let values = dependency_values(leaf, &*store, &*store).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn missing_dependencies_record_is_a_consistency_error() {
        let store = Arc::new(MemoryStore::new());
        let result = dependency_values(CallId::new(), &*store, &*store);
        assert!(matches!(result, Err(EngineError::GraphConsistency(_))));
    }

    #[test]
    fn missing_dependency_result_is_a_consistency_error() {
        let store = Arc::new(MemoryStore::new());
        let (c1, c2) = (CallId::new(), CallId::new());
        CallDependenciesStore::create(
            &*store,
            CallDependencies {
                call_id: c1,
                dependencies: vec![c2],
            },
        )
        .unwrap();

        let result = dependency_values(c1, &*store, &*store);
        assert!(matches!(result, Err(EngineError::GraphConsistency(_))));
    }
}
