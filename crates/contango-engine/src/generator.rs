//! Graph generator: contract decomposition into a persisted call graph.
//!
//! Walks a contract's expression tree depth-first. Pure arithmetic folds in
//! place; every user-defined function call is *reified*: a fresh call id is
//! minted, the substituted function body is persisted as a
//! [`CallRequirement`], and the parent's expression is rewritten to
//! reference that id. Reified calls queue onto an explicit work list rather
//! than the Rust call stack, so deeply nested contracts cannot overflow it.
//!
//! Structurally identical deferred sub-expressions (same canonical source,
//! bindings already substituted in) memoize to the same call id. That keeps
//! the graph finite for repeated sub-expressions and is what produces
//! diamond shapes - a shared call with several dependents.
//!
//! Atomicity policy: writes are incremental and individually self-consistent
//! rather than transactional. A failure mid-generation leaves a well-formed
//! prefix behind: every persisted requirement already has its dependencies
//! record, every recorded dependency already has its inverse dependent
//! entry, and the link chain is only closed once the whole tree is consumed.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info};

use contango_core::{
    CallDependencies, CallId, CallLink, CallRequirement, DependencyGraph,
};
use contango_traits::{EngineConfig, StorageAdapter};

use crate::error::EngineError;
use crate::expr::{ContractModule, Expr};

struct PendingCall {
    call_id: CallId,
    expr: Expr,
}

struct GraphGenerator<'a> {
    module: &'a ContractModule,
    storage: &'a StorageAdapter,
    /// Canonical source of a reified body -> its call id.
    memo: HashMap<String, CallId>,
    pending: VecDeque<PendingCall>,
    /// Last call threaded into the link chain.
    link_tail: CallId,
    leaf_ids: Vec<CallId>,
    call_count: usize,
    max_calls: usize,
}

/// Decompose a contract into its persisted call graph.
///
/// `root_id` is the contract specification's id and becomes the root call
/// id. Returns the graph summary, including the leaf call ids the scheduler
/// seeds from.
pub fn generate_dependency_graph(
    root_id: CallId,
    module: &ContractModule,
    storage: &StorageAdapter,
    config: &EngineConfig,
) -> Result<DependencyGraph, EngineError> {
    let mut generator = GraphGenerator {
        module,
        storage,
        memo: HashMap::new(),
        pending: VecDeque::new(),
        link_tail: root_id,
        leaf_ids: Vec::new(),
        call_count: 0,
        max_calls: config.max_calls,
    };

    generator.pending.push_back(PendingCall {
        call_id: root_id,
        expr: module.body.clone(),
    });

    while let Some(pending) = generator.pending.pop_front() {
        generator.call_count += 1;
        if generator.call_count > generator.max_calls {
            return Err(EngineError::CallBudgetExceeded(generator.max_calls));
        }
        generator.process(pending)?;
    }

    // Close the loop back to the root; the chain now visits every call
    // exactly once.
    storage.call_links.create(CallLink {
        id: generator.link_tail,
        next_call_id: root_id,
    })?;

    info!(
        root = %root_id,
        calls = generator.call_count,
        leaves = generator.leaf_ids.len(),
        "dependency graph generated"
    );

    Ok(DependencyGraph {
        root_id,
        call_count: generator.call_count,
        leaf_ids: generator.leaf_ids,
    })
}

impl<'a> GraphGenerator<'a> {
    fn process(&mut self, pending: PendingCall) -> Result<(), EngineError> {
        let mut dependencies = Vec::new();
        let rewritten = self.rewrite(pending.expr, &mut dependencies)?;

        self.storage.call_requirements.create(CallRequirement {
            id: pending.call_id,
            dsl_source: rewritten.to_string(),
            effective_date: rewritten.fixing_date(),
        })?;
        self.storage.call_dependencies.create(CallDependencies {
            call_id: pending.call_id,
            dependencies: dependencies.clone(),
        })?;
        for dependency in &dependencies {
            self.storage
                .call_dependents
                .append(dependency, pending.call_id)?;
        }

        debug!(
            call = %pending.call_id,
            dependencies = dependencies.len(),
            "call reified"
        );

        if dependencies.is_empty() {
            self.leaf_ids.push(pending.call_id);
        }
        Ok(())
    }

    /// Rewrite one call's expression: fold what can be evaluated now, reify
    /// what must be deferred. Recursion here is over the written expression
    /// depth only; expanded function bodies go through the pending queue.
    fn rewrite(&mut self, expr: Expr, deps: &mut Vec<CallId>) -> Result<Expr, EngineError> {
        match expr {
            Expr::Num(_) | Expr::Str(_) | Expr::Market { .. } => Ok(expr),

            // A reference to an already-reified call is a dependency of
            // whichever call's body it now sits in.
            Expr::CallRef { call_id } => {
                if !deps.contains(&call_id) {
                    deps.push(call_id);
                }
                Ok(Expr::CallRef { call_id })
            }

            // Parameters were substituted when the enclosing call was
            // reified; a surviving name has nothing to bind to.
            Expr::Name(name) => Err(EngineError::UnresolvedName {
                context: name.clone(),
                name,
            }),

            Expr::BinOp { op, left, right } => {
                let left = self.rewrite(*left, deps)?;
                let right = self.rewrite(*right, deps)?;
                fold_binop(op, left, right)
            }

            Expr::Fixing { date, expr } => Ok(Expr::Fixing {
                date,
                expr: Box::new(self.rewrite(*expr, deps)?),
            }),

            Expr::FunctionCall { name, args } => {
                // Calls reified inside arguments travel into the child's
                // substituted body and become the child's dependencies when
                // it is processed; they are not dependencies of this call.
                let mut arg_deps = Vec::new();
                let args = args
                    .into_iter()
                    .map(|a| self.rewrite(a, &mut arg_deps))
                    .collect::<Result<Vec<_>, _>>()?;

                let def = self.module.function(&name).ok_or_else(|| {
                    EngineError::UnresolvedName {
                        name: name.clone(),
                        context: Expr::FunctionCall {
                            name: name.clone(),
                            args: args.clone(),
                        }
                        .to_string(),
                    }
                })?;
                if def.params.len() != args.len() {
                    return Err(EngineError::Syntax(format!(
                        "{}() takes {} argument(s), {} given",
                        name,
                        def.params.len(),
                        args.len()
                    )));
                }

                let bindings: HashMap<String, Expr> =
                    def.params.iter().cloned().zip(args).collect();
                let body = def.body.substitute(&bindings);
                let call_id = self.reify(body)?;

                if !deps.contains(&call_id) {
                    deps.push(call_id);
                }
                Ok(Expr::CallRef { call_id })
            }
        }
    }

    /// Mint (or memo-reuse) the call id for a substituted function body and
    /// thread a fresh call into the link chain.
    fn reify(&mut self, body: Expr) -> Result<CallId, EngineError> {
        let source = body.to_string();
        if let Some(existing) = self.memo.get(&source) {
            return Ok(*existing);
        }

        let call_id = CallId::new();
        self.memo.insert(source, call_id);
        self.storage.call_links.create(CallLink {
            id: self.link_tail,
            next_call_id: call_id,
        })?;
        self.link_tail = call_id;
        self.pending.push_back(PendingCall { call_id, expr: body });
        Ok(call_id)
    }
}

fn fold_binop(op: crate::expr::BinOp, left: Expr, right: Expr) -> Result<Expr, EngineError> {
    use crate::expr::BinOp;

    if matches!(left, Expr::Str(_)) || matches!(right, Expr::Str(_)) {
        return Err(EngineError::UnsupportedConstruct(format!(
            "arithmetic over string literal in '{}'",
            Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right)
            }
        )));
    }

    if let (Expr::Num(a), Expr::Num(b)) = (&left, &right) {
        let value = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => {
                if *b == 0.0 {
                    return Err(EngineError::Syntax(format!("division by zero in '{} / 0'", a)));
                }
                a / b
            }
        };
        return Ok(Expr::Num(value));
    }

    // At least one side defers to simulated prices or a child call; keep
    // the node for evaluation time.
    Ok(Expr::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}
