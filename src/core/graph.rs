use crate::core::weight::calculate_pair_weight;
use crate::error::PairingError;
use crate::models::{PairingHistory, Participant, Roster, Week};

/// Edge weight as stored in the graph.
///
/// Signed so that a hand-built graph with a negative weight can be represented
/// and rejected by [`WeightedGraph::validate`].
pub type EdgeWeight = i64;

/// Undirected weighted graph over participants, kept as an adjacency matrix
///
/// `None` in the matrix means the edge is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedGraph {
    nodes: Vec<Participant>,
    edges: Vec<Vec<Option<EdgeWeight>>>,
}

impl WeightedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant and return its node id
    pub fn add_node(&mut self, participant: Participant) -> usize {
        let id = self.nodes.len();
        self.nodes.push(participant);
        for edge_row in &mut self.edges {
            edge_row.push(None);
        }
        self.edges.push(vec![None; self.nodes.len()]);
        id
    }

    /// Set the weight of the edge between two existing nodes
    pub fn add_edge(&mut self, id1: usize, id2: usize, weight: EdgeWeight) -> Result<(), PairingError> {
        let count = self.nodes.len();
        if id1 >= count || id2 >= count {
            return Err(PairingError::invalid(format!(
                "edge ({}, {}) refers to a node outside the graph of {} nodes",
                id1, id2, count
            )));
        }
        if id1 == id2 {
            return Err(PairingError::invalid(format!(
                "self-loop on {} is not a valid pairing",
                self.nodes[id1]
            )));
        }
        self.edges[id1][id2] = Some(weight);
        self.edges[id2][id1] = Some(weight);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Participant] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> &Participant {
        &self.nodes[id]
    }

    pub fn index_of(&self, participant: &Participant) -> Option<usize> {
        self.nodes.iter().position(|node| node == participant)
    }

    pub fn edge(&self, id1: usize, id2: usize) -> Option<EdgeWeight> {
        self.edges.get(id1)?.get(id2).copied().flatten()
    }

    /// Every present edge once, as `(smaller id, larger id, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, EdgeWeight)> + '_ {
        self.edges.iter().enumerate().flat_map(|(a, row)| {
            row.iter()
                .enumerate()
                .skip(a + 1)
                .filter_map(move |(b, weight)| weight.map(|w| (a, b, w)))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Check the graph can be handed to the matching engine: at least two
    /// distinct participants, every pair joined, no negative weight.
    pub fn validate(&self) -> Result<(), PairingError> {
        if self.nodes.len() < 2 {
            return Err(PairingError::invalid(format!(
                "graph must contain at least 2 participants, found {}",
                self.nodes.len()
            )));
        }

        for (a, first) in self.nodes.iter().enumerate() {
            for b in (a + 1)..self.nodes.len() {
                let second = &self.nodes[b];
                if first == second {
                    return Err(PairingError::invalid(format!(
                        "graph contains duplicate participant {}",
                        first
                    )));
                }
                match self.edge(a, b) {
                    None => {
                        return Err(PairingError::invalid(format!(
                            "graph is not complete: no edge between {} and {}",
                            first, second
                        )))
                    }
                    Some(weight) if weight < 0 => {
                        return Err(PairingError::invalid(format!(
                            "edge between {} and {} has negative weight {}",
                            first, second, weight
                        )))
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

/// Build the complete pairing graph for a roster
///
/// Nodes are added in sorted participant order so the same inputs always
/// give the same graph. History entries naming people outside the roster
/// are ignored.
pub fn build_graph(
    roster: &Roster,
    history: &PairingHistory,
    horizon: Week,
) -> Result<WeightedGraph, PairingError> {
    if roster.len() < 2 {
        return Err(PairingError::invalid(format!(
            "roster must contain at least 2 participants, found {}",
            roster.len()
        )));
    }

    let duplicates = roster.duplicates();
    if !duplicates.is_empty() {
        let names: Vec<&str> = duplicates.iter().map(|p| p.as_str()).collect();
        return Err(PairingError::invalid(format!(
            "roster contains duplicate entries: {}",
            names.join(", ")
        )));
    }

    let mut members = roster.members().to_vec();
    members.sort();

    let mut graph = WeightedGraph::new();
    for member in members {
        graph.add_node(member);
    }

    for a in 0..graph.node_count() {
        for b in (a + 1)..graph.node_count() {
            let (first, second) = (graph.node(a), graph.node(b));

            if let Some(week) = history.last_paired(first, second) {
                if week > horizon {
                    return Err(PairingError::invalid(format!(
                        "{} and {} were paired in week {}, after horizon {}",
                        first, second, week, horizon
                    )));
                }
            }

            let weight = calculate_pair_weight(first, second, history, horizon);
            let weight = EdgeWeight::try_from(weight).map_err(|_| {
                PairingError::invalid(format!(
                    "weight {} for {} and {} is too large",
                    weight, first, second
                ))
            })?;
            graph.add_edge(a, b, weight)?;
        }
    }

    tracing::debug!(
        "Built pairing graph with {} participants and {} edges (horizon {})",
        graph.node_count(),
        graph.edge_count(),
        horizon
    );

    Ok(graph)
}
