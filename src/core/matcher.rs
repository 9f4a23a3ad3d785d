use crate::core::blossom::{max_weight_matching, Edge};
use crate::core::graph::{EdgeWeight, WeightedGraph};
use crate::error::PairingError;
use crate::models::{Matching, PairKey, ScoredPair};

/// Largest matching total the engine accepts. Bounding the heaviest edge times
/// the pair count keeps every partial sum in range.
const MAX_TOTAL_WEIGHT: EdgeWeight = EdgeWeight::MAX / 4;

/// Maximum-weight matching over a complete pairing graph
///
/// # Rules
/// 1. Even roster: everyone is paired (perfect matching).
/// 2. Odd roster: for each participant, solve the remaining roster; leave out
///    the one whose absence gives the heaviest matching, lowest name on ties.
/// 3. Among equally heavy matchings, return the lexicographically smallest
///    sorted pair list.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine;

impl MatchingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the matching for one round
    pub fn solve(&self, graph: &WeightedGraph) -> Result<Matching, PairingError> {
        graph.validate()?;
        check_weight_bound(graph)?;

        let mut order: Vec<usize> = (0..graph.node_count()).collect();
        order.sort_by(|&a, &b| graph.node(a).cmp(graph.node(b)));

        let (excluded, active) = if order.len() % 2 == 1 {
            let excluded = choose_excluded(graph, &order)?;
            let active: Vec<usize> = order.into_iter().filter(|&id| id != excluded).collect();
            (Some(excluded), active)
        } else {
            (None, order)
        };

        let pairs = canonical_pairs(graph, &active)?;
        if pairs.len() * 2 != active.len() {
            return Err(PairingError::infeasible(format!(
                "only {} of {} participants could be paired",
                pairs.len() * 2,
                active.len()
            )));
        }

        let scored = pairs
            .into_iter()
            .map(|(a, b, weight)| {
                let pair = PairKey::new(graph.node(a).clone(), graph.node(b).clone())
                    .ok_or_else(|| {
                        PairingError::invalid(format!("{} cannot be paired with itself", graph.node(a)))
                    })?;
                Ok(ScoredPair {
                    pair,
                    weight: weight.unsigned_abs(),
                })
            })
            .collect::<Result<Vec<_>, PairingError>>()?;

        let matching = Matching::new(scored, excluded.map(|id| graph.node(id).clone()));

        tracing::debug!(
            "Matched {} pairs with total weight {}{}",
            matching.len(),
            matching.total_weight(),
            matching
                .unmatched()
                .map(|p| format!(", {} left out", p))
                .unwrap_or_default()
        );

        Ok(matching)
    }
}

/// Reject graphs whose heaviest possible matching total does not fit
fn check_weight_bound(graph: &WeightedGraph) -> Result<(), PairingError> {
    let Some((a, b, heaviest)) = graph.edges().max_by_key(|e| e.2) else {
        return Ok(());
    };
    let pair_count = EdgeWeight::try_from(graph.node_count() / 2).unwrap_or(EdgeWeight::MAX);

    match heaviest.checked_mul(pair_count) {
        Some(total) if total <= MAX_TOTAL_WEIGHT => Ok(()),
        _ => Err(PairingError::invalid(format!(
            "edge between {} and {} has weight {}, too large to total over {} pairs",
            graph.node(a),
            graph.node(b),
            heaviest,
            pair_count
        ))),
    }
}

/// Heaviest matching over `subset`, as total weight and `(id, id, weight)` pairs.
///
/// Every participant in an even subset must be covered.
fn optimum(
    graph: &WeightedGraph,
    subset: &[usize],
) -> Result<(EdgeWeight, Vec<(usize, usize, EdgeWeight)>), PairingError> {
    if subset.len() < 2 {
        return Ok((0, Vec::new()));
    }

    let mut edges: Vec<Edge> = Vec::with_capacity(subset.len() * (subset.len() - 1) / 2);
    for a in 0..subset.len() {
        for b in (a + 1)..subset.len() {
            edges.push((a, b, edge_weight(graph, subset[a], subset[b])?));
        }
    }

    let mates = max_weight_matching(subset.len(), &edges, true)?;
    if subset.len() % 2 == 0 && mates.iter().any(Option::is_none) {
        return Err(PairingError::infeasible(format!(
            "no perfect matching over {} participants",
            subset.len()
        )));
    }

    let mut total = 0;
    let mut pairs = Vec::with_capacity(subset.len() / 2);
    for (a, mate) in mates.iter().enumerate() {
        if let Some(b) = *mate {
            if a < b {
                let weight = edge_weight(graph, subset[a], subset[b])?;
                total += weight;
                pairs.push((subset[a], subset[b], weight));
            }
        }
    }

    Ok((total, pairs))
}

/// Pick the participant to leave out of an odd roster. `order` is sorted by name.
fn choose_excluded(graph: &WeightedGraph, order: &[usize]) -> Result<usize, PairingError> {
    let mut best: Option<(usize, EdgeWeight)> = None;

    for &candidate in order {
        let rest: Vec<usize> = order.iter().copied().filter(|&id| id != candidate).collect();
        let (total, _) = optimum(graph, &rest)?;
        if best.map_or(true, |(_, best_total)| total > best_total) {
            best = Some((candidate, total));
        }
    }

    best.map(|(candidate, _)| candidate)
        .ok_or_else(|| PairingError::infeasible("no participant could be left out"))
}

/// Optimal pairs over `active` (sorted by name), choosing the smallest partner
/// for each participant in turn as long as an optimal completion remains.
fn canonical_pairs(
    graph: &WeightedGraph,
    active: &[usize],
) -> Result<Vec<(usize, usize, EdgeWeight)>, PairingError> {
    let (mut target, _) = optimum(graph, active)?;
    let mut remaining = active.to_vec();
    let mut pairs = Vec::with_capacity(active.len() / 2);

    while let Some((&first, rest)) = remaining.split_first() {
        let mut chosen = None;

        for (pos, &partner) in rest.iter().enumerate() {
            let weight = edge_weight(graph, first, partner)?;
            let leftover: Vec<usize> = rest
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != pos)
                .map(|(_, &id)| id)
                .collect();
            let (completion, _) = optimum(graph, &leftover)?;

            if weight + completion == target {
                chosen = Some((partner, weight, completion, leftover));
                break;
            }
        }

        let Some((partner, weight, completion, leftover)) = chosen else {
            return Err(PairingError::infeasible(format!(
                "no optimal partner left for {}",
                graph.node(first)
            )));
        };

        pairs.push((first, partner, weight));
        target = completion;
        remaining = leftover;
    }

    Ok(pairs)
}

fn edge_weight(graph: &WeightedGraph, a: usize, b: usize) -> Result<EdgeWeight, PairingError> {
    graph.edge(a, b).ok_or_else(|| {
        PairingError::infeasible(format!(
            "no edge between {} and {}",
            graph.node(a),
            graph.node(b)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;

    fn p(name: &str) -> Participant {
        Participant::new(name).unwrap()
    }

    fn complete_graph(names: &[&str], weight: impl Fn(&str, &str) -> EdgeWeight) -> WeightedGraph {
        let mut graph = WeightedGraph::new();
        for name in names {
            graph.add_node(p(name));
        }
        for a in 0..names.len() {
            for b in (a + 1)..names.len() {
                graph.add_edge(a, b, weight(names[a], names[b])).unwrap();
            }
        }
        graph
    }

    fn pair_names(matching: &Matching) -> Vec<(String, String)> {
        matching
            .pairs()
            .iter()
            .map(|s| (s.pair.first().to_string(), s.pair.second().to_string()))
            .collect()
    }

    #[test]
    fn test_equal_weights_use_smallest_pairs() {
        let graph = complete_graph(&["d", "c", "b", "a"], |_, _| 0);
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        assert_eq!(
            pair_names(&matching),
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string())
            ]
        );
    }

    #[test]
    fn test_prefers_heavier_pairs() {
        let graph = complete_graph(&["a", "b", "c", "d"], |x, y| match (x, y) {
            ("a", "d") | ("b", "c") => 10,
            _ => 1,
        });
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        assert_eq!(matching.total_weight(), 20);
        assert!(matching.contains_pair(&p("a"), &p("d")));
        assert!(matching.contains_pair(&p("b"), &p("c")));
    }

    #[test]
    fn test_odd_roster_leaves_out_best_candidate() {
        // Leaving out "a" lets b-c (weight 9) through; any other exclusion scores less.
        let graph = complete_graph(&["a", "b", "c"], |x, y| match (x, y) {
            ("b", "c") => 9,
            _ => 4,
        });
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        assert_eq!(matching.unmatched(), Some(&p("a")));
        assert_eq!(matching.total_weight(), 9);
    }

    #[test]
    fn test_odd_roster_tie_leaves_out_lowest_name() {
        let graph = complete_graph(&["c", "a", "b"], |_, _| 3);
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        assert_eq!(matching.unmatched(), Some(&p("a")));
        assert_eq!(
            pair_names(&matching),
            vec![("b".to_string(), "c".to_string())]
        );
    }

    #[test]
    fn test_rejects_incomplete_graph() {
        let mut graph = WeightedGraph::new();
        graph.add_node(p("a"));
        graph.add_node(p("b"));
        graph.add_node(p("c"));
        graph.add_edge(0, 1, 1).unwrap();

        let err = MatchingEngine::new().solve(&graph).unwrap_err();
        assert!(matches!(err, PairingError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let graph = complete_graph(&["a", "b"], |_, _| -1);
        let err = MatchingEngine::new().solve(&graph).unwrap_err();
        assert!(err.to_string().contains("negative weight"));
    }

    #[test]
    fn test_rejects_oversized_weight() {
        let graph = complete_graph(&["a", "b"], |_, _| EdgeWeight::MAX);
        assert!(MatchingEngine::new().solve(&graph).is_err());
    }

    #[test]
    fn test_rejects_weights_whose_total_overflows() {
        // Each edge fits on its own, ten of them do not
        let names: Vec<String> = (0..20).map(|i| format!("p{:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let graph = complete_graph(&refs, |_, _| MAX_TOTAL_WEIGHT / 5);

        let err = MatchingEngine::new().solve(&graph).unwrap_err();
        assert!(matches!(err, PairingError::InvalidInput(_)));
    }

    #[test]
    fn test_accepts_heaviest_weight_within_total_bound() {
        let graph = complete_graph(&["a", "b", "c", "d"], |_, _| MAX_TOTAL_WEIGHT / 2);
        let matching = MatchingEngine::new().solve(&graph).unwrap();
        assert_eq!(matching.total_weight(), (MAX_TOTAL_WEIGHT / 2 * 2) as u64);
    }
}
