//! Market-name discovery over a parsed contract.

use contango_core::MarketName;

use crate::expr::ContractModule;

/// The distinct market names a contract observes, in source order.
///
/// Walks the top-level body first, then each function definition's body, so
/// markets referenced only inside deferred functions are still discovered
/// before any graph is generated.
pub fn list_market_names(module: &ContractModule) -> Vec<MarketName> {
    let mut names = Vec::new();
    module.body.collect_market_names(&mut names);
    for function in &module.functions {
        function.body.collect_market_names(&mut names);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, Expr, FunctionDef};

    #[test]
    fn markets_in_function_bodies_are_discovered() {
        let module = ContractModule {
            functions: vec![FunctionDef {
                name: "payoff".to_string(),
                params: vec!["x".to_string()],
                body: Expr::BinOp {
                    op: BinOp::Mul,
                    left: Box::new(Expr::Market {
                        name: MarketName::new("#2"),
                    }),
                    right: Box::new(Expr::Name("x".to_string())),
                },
            }],
            body: Expr::BinOp {
                op: BinOp::Add,
                left: Box::new(Expr::Market {
                    name: MarketName::new("#1"),
                }),
                right: Box::new(Expr::FunctionCall {
                    name: "payoff".to_string(),
                    args: vec![Expr::Num(2.0)],
                }),
            },
        };

        assert_eq!(
            list_market_names(&module),
            vec![MarketName::new("#1"), MarketName::new("#2")]
        );
    }

    #[test]
    fn duplicates_collapse_across_body_and_functions() {
        let module = ContractModule {
            functions: vec![FunctionDef {
                name: "f".to_string(),
                params: vec![],
                body: Expr::Market {
                    name: MarketName::new("#1"),
                },
            }],
            body: Expr::Market {
                name: MarketName::new("#1"),
            },
        };
        assert_eq!(list_market_names(&module), vec![MarketName::new("#1")]);
    }

    #[test]
    fn purely_deterministic_contract_has_no_markets() {
        let module = ContractModule::from_body(Expr::Num(1.0));
        assert!(list_market_names(&module).is_empty());
    }
}
