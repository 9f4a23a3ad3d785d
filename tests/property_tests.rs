use pair_rotation::core::{
    build_graph, calculate_pair_weight, elapsed_weight, max_weight_matching, sentinel_weight,
    MatchingEngine,
};
use pair_rotation::models::{Matching, PairingHistory, Participant, Roster};
use proptest::prelude::*;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{}", i)).collect()
}

fn participant(name: &str) -> Participant {
    Participant::new(name).unwrap()
}

/// Roster size, latest week and a history over that roster
fn scenario() -> impl Strategy<Value = (usize, u32, Vec<(usize, usize, u32)>)> {
    (2usize..=8, 0u32..=12).prop_flat_map(|(n, latest)| {
        let entries = if latest == 0 {
            Just(Vec::new()).boxed()
        } else {
            prop::collection::vec((0..n, 0..n, 1..=latest), 0..20).boxed()
        };
        (Just(n), Just(latest), entries)
    })
}

fn create_history(roster: &[String], entries: &[(usize, usize, u32)]) -> PairingHistory {
    let mut history = PairingHistory::new();
    for &(a, b, week) in entries {
        history.record(&participant(&roster[a]), &participant(&roster[b]), week);
    }
    history
}

fn as_pairs(matching: &Matching) -> Vec<(String, String)> {
    matching
        .pairs()
        .iter()
        .map(|s| (s.pair.first().to_string(), s.pair.second().to_string()))
        .collect()
}

/// Every perfect matching of `nodes` as sorted pair lists
fn perfect_matchings(nodes: &[String]) -> Vec<Vec<(String, String)>> {
    if nodes.is_empty() {
        return vec![Vec::new()];
    }
    let mut all = Vec::new();
    for i in 1..nodes.len() {
        let rest: Vec<String> = nodes[1..i].iter().chain(&nodes[i + 1..]).cloned().collect();
        for mut matching in perfect_matchings(&rest) {
            matching.push((nodes[0].clone(), nodes[i].clone()));
            matching.sort();
            all.push(matching);
        }
    }
    all
}

/// Heaviest perfect matching, lexicographically smallest on ties
fn best_perfect(
    nodes: &[String],
    history: &PairingHistory,
    horizon: u32,
) -> (u64, Vec<(String, String)>) {
    perfect_matchings(nodes)
        .into_iter()
        .map(|matching| {
            let total = matching
                .iter()
                .map(|(a, b)| calculate_pair_weight(&participant(a), &participant(b), history, horizon))
                .sum::<u64>();
            (total, matching)
        })
        .fold(None, |best: Option<(u64, Vec<(String, String)>)>, candidate| match best {
            Some(b) if b.0 > candidate.0 || (b.0 == candidate.0 && b.1 <= candidate.1) => Some(b),
            _ => Some(candidate),
        })
        .unwrap()
}

/// Brute-force rendition of the whole selection rule, odd rosters included
fn brute_force(
    roster: &[String],
    history: &PairingHistory,
    horizon: u32,
) -> (u64, Option<String>, Vec<(String, String)>) {
    let mut sorted = roster.to_vec();
    sorted.sort();

    if sorted.len() % 2 == 0 {
        let (total, pairs) = best_perfect(&sorted, history, horizon);
        return (total, None, pairs);
    }

    let mut best: Option<(u64, Option<String>, Vec<(String, String)>)> = None;
    for excluded in &sorted {
        let rest: Vec<String> = sorted.iter().filter(|n| *n != excluded).cloned().collect();
        let (total, pairs) = best_perfect(&rest, history, horizon);
        if best.as_ref().map_or(true, |b| total > b.0) {
            best = Some((total, Some(excluded.clone()), pairs));
        }
    }
    best.unwrap()
}

/// Cardinality and weight of every matching on a sparse graph
fn all_matchings(n: usize, edges: &[(usize, usize, i64)], used: &mut Vec<bool>, from: usize) -> Vec<(usize, i64)> {
    let Some(v) = (from..n).find(|&v| !used[v]) else {
        return vec![(0, 0)];
    };
    used[v] = true;
    let mut results = all_matchings(n, edges, used, v + 1);
    for &(a, b, w) in edges {
        let other = if a == v { b } else if b == v { a } else { continue };
        if used[other] {
            continue;
        }
        used[other] = true;
        for (size, weight) in all_matchings(n, edges, used, v + 1) {
            results.push((size + 1, weight + w));
        }
        used[other] = false;
    }
    used[v] = false;
    results
}

fn sparse_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, i64)>)> {
    (2usize..=8).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, 0i64..=40), 0..16).prop_map(|raw| {
            let mut edges: Vec<(usize, usize, i64)> = Vec::new();
            for (a, b, w) in raw {
                let (a, b) = (a.min(b), a.max(b));
                if a != b && !edges.iter().any(|e| e.0 == a && e.1 == b) {
                    edges.push((a, b, w));
                }
            }
            edges
        });
        (Just(n), edges)
    })
}

proptest! {
    #[test]
    fn sentinel_dominates_history(horizon in 1u32..=u32::MAX, offset in 0u32..=u32::MAX) {
        let week = 1 + offset % horizon;
        prop_assert!(sentinel_weight(horizon) > elapsed_weight(horizon, week));
    }

    #[test]
    fn weights_follow_elapsed_weeks(horizon in 1u32..=10_000, offset in 0u32..10_000) {
        let week = 1 + offset % horizon;
        let elapsed = u64::from(horizon - week);
        prop_assert_eq!(elapsed_weight(horizon, week), elapsed * elapsed);
    }

    #[test]
    fn matching_is_complete((n, latest, entries) in scenario()) {
        let roster = names(n);
        let history = create_history(&roster, &entries);
        let graph = build_graph(&Roster::from_names(&roster), &history, latest + 1).unwrap();
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        prop_assert_eq!(matching.len(), n / 2);
        prop_assert_eq!(matching.unmatched().is_some(), n % 2 == 1);

        let mut covered: Vec<&Participant> = matching
            .pairs()
            .iter()
            .flat_map(|s| [s.pair.first(), s.pair.second()])
            .chain(matching.unmatched())
            .collect();
        covered.sort();
        covered.dedup();
        prop_assert_eq!(covered.len(), n);
    }

    #[test]
    fn matching_is_optimal_and_canonical((n, latest, entries) in scenario()) {
        let roster = names(n);
        let history = create_history(&roster, &entries);
        let horizon = latest + 1;
        let graph = build_graph(&Roster::from_names(&roster), &history, horizon).unwrap();
        let matching = MatchingEngine::new().solve(&graph).unwrap();

        let (total, excluded, pairs) = brute_force(&roster, &history, horizon);
        prop_assert_eq!(matching.total_weight(), total);
        prop_assert_eq!(matching.unmatched().map(|p| p.to_string()), excluded);
        prop_assert_eq!(as_pairs(&matching), pairs);
    }

    #[test]
    fn matching_is_deterministic((n, latest, entries) in scenario(), rotate in 0usize..8) {
        let mut roster = names(n);
        let history = create_history(&roster, &entries);
        let first = build_graph(&Roster::from_names(&roster), &history, latest + 1).unwrap();

        roster.rotate_left(rotate % n);
        let second = build_graph(&Roster::from_names(&roster), &history, latest + 1).unwrap();

        prop_assert_eq!(&first, &second);
        let engine = MatchingEngine::new();
        prop_assert_eq!(engine.solve(&first).unwrap(), engine.solve(&second).unwrap());
    }

    #[test]
    fn graph_derivation_is_idempotent((n, latest, entries) in scenario()) {
        let roster = Roster::from_names(names(n));
        let history = create_history(&names(n), &entries);

        let first = build_graph(&roster, &history, latest + 1).unwrap();
        let second = build_graph(&roster, &history, latest + 1).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn blossom_matches_brute_force((n, edges) in sparse_graph(), max_cardinality in any::<bool>()) {
        let mates = max_weight_matching(n, &edges, max_cardinality).unwrap();

        let mut size = 0;
        let mut weight = 0;
        for (v, mate) in mates.iter().enumerate() {
            if let Some(u) = *mate {
                prop_assert_eq!(mates[u], Some(v));
                if v < u {
                    let edge = edges.iter().find(|e| e.0 == v && e.1 == u);
                    prop_assert!(edge.is_some(), "({}, {}) is not an edge", v, u);
                    size += 1;
                    weight += edge.map_or(0, |e| e.2);
                }
            }
        }

        let candidates = all_matchings(n, &edges, &mut vec![false; n], 0);
        let best = if max_cardinality {
            candidates.iter().copied().max().unwrap()
        } else {
            let heaviest = candidates.iter().map(|c| c.1).max().unwrap();
            (size, heaviest)
        };
        if max_cardinality {
            prop_assert_eq!(size, best.0);
        }
        prop_assert_eq!(weight, best.1);
    }
}
