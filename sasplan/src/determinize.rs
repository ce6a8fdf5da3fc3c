//! Operator determinization.
//!
//! An effect variable without a backward precondition means "this effect could have come
//! from any state not already equal to the post-value". Backward search needs every
//! precondition pinned, so such operators are expanded into the cross product of
//! excluded-value choices over all their backward-ambiguous effect variables: one
//! deterministic variant per combination. An operator with ambiguous effect variables
//! over domains of size d_1..d_m yields the product of (d_j - 1) variants, so the
//! expansion can blow up combinatorially; the caller provides a limit and exceeding it
//! is an error rather than a silent truncation.

use log::info;
use thiserror::Error;

use sasplan_formula::{Operator, Problem, VarInfo};

/// Determinization would exceed the configured variant limit.
#[derive(Debug, Error)]
#[error("determinizing operator '{operator}' exceeds the variant limit of {limit}")]
pub struct VariantLimitError {
    pub operator: String,
    pub limit: usize,
}

/// Expands one operator into fully deterministic variants.
///
/// Every effect variable that carries no precondition and has a domain size above one is
/// pinned, in every variant, to one of its values other than the postcondition value.
/// Effect variables with a domain size of one are skipped: the only possible previous
/// value is the post-value itself, so no other precondition is meaningful. The source
/// operator is never mutated; for an operator without ambiguous effect variables the
/// result is a singleton clone.
pub fn determinize_operator(
    operator: &Operator,
    variables: &[VarInfo],
    limit: usize,
) -> Result<Vec<Operator>, VariantLimitError> {
    let over_limit = || VariantLimitError {
        operator: operator.name.clone(),
        limit,
    };

    if limit < 1 {
        return Err(over_limit());
    }

    let mut variants = vec![operator.clone()];
    for fact in operator.post.iter() {
        if operator.pre.contains_var(fact.var()) {
            continue;
        }
        let domain_size = variables[fact.var().index()].domain_size;
        if domain_size <= 1 {
            continue;
        }

        match variants.len().checked_mul(domain_size - 1) {
            Some(expanded_len) if expanded_len <= limit => {}
            _ => return Err(over_limit()),
        }

        let mut expanded = Vec::with_capacity(variants.len() * (domain_size - 1));
        for variant in variants.iter() {
            for value in (0..domain_size).filter(|&value| value != fact.value()) {
                let mut pinned = variant.clone();
                pinned.pre.assign(fact.var(), value);
                expanded.push(pinned);
            }
        }
        variants = expanded;
    }

    Ok(variants)
}

/// Determinizes the whole operator set under a total variant limit.
pub fn determinize_all(
    problem: &Problem,
    limit: usize,
) -> Result<Vec<Operator>, VariantLimitError> {
    let mut variants = Vec::new();
    for operator in problem.operators() {
        let mut expanded =
            determinize_operator(operator, problem.variables(), limit - variants.len())?;
        variants.append(&mut expanded);
    }

    info!(
        "Determinized {} operators into {} variants",
        problem.operators().len(),
        variants.len()
    );

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use sasplan_formula::test::{domain_sizes, operator as any_operator};
    use sasplan_formula::{partial, Fact};

    fn var_table(domain_sizes: &[usize]) -> Vec<VarInfo> {
        domain_sizes
            .iter()
            .enumerate()
            .map(|(index, &domain_size)| VarInfo {
                name: format!("v{}", index),
                domain_size,
            })
            .collect()
    }

    fn contains_all(variant: &Operator, facts: impl Iterator<Item = Fact>) -> bool {
        let mut facts = facts;
        facts.all(|fact| variant.pre.value_of(fact.var()) == Some(fact.value()))
    }

    #[test]
    fn pins_an_unconstrained_effect_var() {
        let mut operator = Operator::new("op", 1);
        operator.post = partial![0 => 1];

        let variants = determinize_operator(&operator, &var_table(&[3]), usize::max_value())
            .unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].pre, partial![0 => 0]);
        assert_eq!(variants[1].pre, partial![0 => 2]);
        for variant in variants.iter() {
            assert_eq!(variant.post, operator.post);
            assert_eq!(variant.name, "op");
        }
        // The source operator is untouched.
        assert!(operator.pre.is_empty());
    }

    #[test]
    fn keeps_deterministic_operators_as_is() {
        let mut operator = Operator::new("op", 1);
        operator.pre = partial![0 => 0, 1 => 1];
        operator.post = partial![0 => 1];

        let variants = determinize_operator(&operator, &var_table(&[2, 2]), usize::max_value())
            .unwrap();

        assert_eq!(variants, vec![operator]);
    }

    #[test]
    fn skips_single_value_domains() {
        let mut operator = Operator::new("op", 1);
        operator.post = partial![0 => 0, 1 => 1];

        let variants = determinize_operator(&operator, &var_table(&[1, 3]), usize::max_value())
            .unwrap();

        assert_eq!(variants.len(), 2);
        for variant in variants.iter() {
            assert!(!variant.pre.contains_var(sasplan_formula::Var::from_index(0)));
        }
    }

    #[test]
    fn expands_the_cross_product() {
        let mut operator = Operator::new("op", 1);
        operator.post = partial![0 => 1, 1 => 0];

        let variants = determinize_operator(&operator, &var_table(&[3, 4]), usize::max_value())
            .unwrap();

        // (3 - 1) * (4 - 1) combinations of excluded values.
        assert_eq!(variants.len(), 6);
        for a in 0..variants.len() {
            for b in 0..a {
                assert_ne!(variants[a].pre, variants[b].pre);
            }
        }
    }

    #[test]
    fn enforces_the_limit() {
        let mut operator = Operator::new("op", 1);
        operator.post = partial![0 => 1, 1 => 0];

        let result = determinize_operator(&operator, &var_table(&[3, 4]), 5);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().operator, "op");
    }

    #[test]
    fn total_limit_spans_the_operator_set() {
        let mut operator = Operator::new("op", 1);
        operator.post = partial![0 => 1];
        let twin = operator.clone();

        let problem = Problem::new(
            var_table(&[3]),
            vec![0],
            partial![],
            vec![operator, twin],
        )
        .unwrap();

        assert_eq!(determinize_all(&problem, 4).unwrap().len(), 4);
        assert!(determinize_all(&problem, 3).is_err());
    }

    proptest! {
        #[test]
        fn variant_count_and_preconditions(
            (sizes, operator) in domain_sizes(1..6usize, 4)
                .prop_flat_map(|sizes| (Just(sizes.clone()), any_operator(&sizes)))
        ) {
            let variables = var_table(&sizes);
            let variants =
                determinize_operator(&operator, &variables, usize::max_value()).unwrap();

            let expected: usize = operator
                .post
                .iter()
                .filter(|fact| !operator.pre.contains_var(fact.var()))
                .map(|fact| sizes[fact.var().index()])
                .filter(|&size| size > 1)
                .map(|size| size - 1)
                .product();
            prop_assert_eq!(variants.len(), expected);

            for variant in variants.iter() {
                // Variant preconditions are supersets of the source preconditions.
                prop_assert!(contains_all(variant, operator.pre.iter()));
                // Every ambiguous effect variable is pinned to an excluded value.
                for fact in operator.post.iter() {
                    if operator.pre.contains_var(fact.var())
                        || sizes[fact.var().index()] <= 1
                    {
                        continue;
                    }
                    let pinned = variant.pre.value_of(fact.var());
                    prop_assert!(pinned.is_some());
                    prop_assert_ne!(pinned, Some(fact.value()));
                }
            }

            // No two variants share a precondition mapping.
            for a in 0..variants.len() {
                for b in 0..a {
                    prop_assert_ne!(&variants[a].pre, &variants[b].pre);
                }
            }
        }
    }
}
