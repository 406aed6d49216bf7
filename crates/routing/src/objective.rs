use runesx_domain::token::TokenAmount;
use runesx_simulation::path_simulator::PathSimulation;
use std::cmp::Ordering;

pub trait ObjectiveFunction {
    type Score: Ord;

    fn evaluate(&self, result: &PathSimulation) -> Self::Score;
    fn compare(&self, a: &PathSimulation, b: &PathSimulation) -> Ordering {
        self.evaluate(a).cmp(&self.evaluate(b))
    }
}

/// Prefers the path delivering the most output.
pub struct MaximizeOutput;
impl ObjectiveFunction for MaximizeOutput {
    type Score = TokenAmount;

    fn evaluate(&self, result: &PathSimulation) -> TokenAmount {
        result.amount_out
    }
}

/// Index of the best candidate. Only a strictly better score replaces the current best,
/// so ties keep the earliest candidate.
pub fn select_best<O: ObjectiveFunction>(
    objective: &O,
    candidates: &[PathSimulation],
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match best {
            Some(b) if objective.compare(candidate, &candidates[b]) != Ordering::Greater => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use runesx_simulation::state::PoolSet;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn candidate(amount_out: u64, price_impact: Decimal) -> PathSimulation {
        PathSimulation {
            amount_out: TokenAmount::from(amount_out),
            price_impact,
            intermediate_amounts: Vec::new(),
            pools: PoolSet::default(),
        }
    }

    #[test]
    fn test_maximize_output_keeps_first_on_tie() {
        let candidates = vec![
            candidate(10, dec!(0.1)),
            candidate(30, dec!(0.2)),
            candidate(30, dec!(0.01)),
        ];
        assert_eq!(select_best(&MaximizeOutput, &candidates), Some(1));
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(select_best(&MaximizeOutput, &[]), None);
    }
}
