//! Maximum-weight matching on general graphs.
//!
//! Primal-dual weighted blossom algorithm (Edmonds, with Galil's O(n^3)
//! bookkeeping). Alternating trees are grown from every exposed vertex along
//! tight edges; odd cycles are shrunk into blossoms, augmenting paths flip the
//! matching, and dual variables are adjusted whenever the search stalls. When
//! no augmenting path is left the matching is optimal by LP duality.
//!
//! Vertices are `0..node_count`. Edge `k` has two endpoints, `2k` (its first
//! vertex) and `2k + 1` (its second), so `p ^ 1` is the opposite endpoint.
//! Blossom ids share one index space with vertices: ids `0..n` are single
//! vertices, ids `n..2n` are slots for non-trivial blossoms.
//!
//! All arithmetic is integral: with integer weights every slack between two
//! S-blossoms is even, so halving it is exact.

use crate::error::PairingError;

/// `(vertex, vertex, weight)`
pub type Edge = (usize, usize, i64);

const FREE: u8 = 0;
const S_LABEL: u8 = 1;
const T_LABEL: u8 = 2;
const BREADCRUMB: u8 = 4;

/// Compute a maximum-weight matching
///
/// Returns the mate of every vertex. With `max_cardinality` set, the result is
/// the heaviest matching among those of maximum cardinality.
pub fn max_weight_matching(
    node_count: usize,
    edges: &[Edge],
    max_cardinality: bool,
) -> Result<Vec<Option<usize>>, PairingError> {
    for &(i, j, _) in edges {
        if i >= node_count || j >= node_count || i == j {
            return Err(PairingError::invalid(format!(
                "edge ({}, {}) is not valid in a graph of {} vertices",
                i, j, node_count
            )));
        }
    }

    if edges.is_empty() {
        return Ok(vec![None; node_count]);
    }

    let mut solver = Solver::new(node_count, edges);
    solver.run(max_cardinality)?;
    Ok(solver.mates())
}

/// Outcome of one dual adjustment
enum DualStep {
    /// No further improvement possible in this stage
    Finished,
    /// An edge from an S-vertex to a free vertex became tight
    GrowTree(usize),
    /// An edge between two S-blossoms became tight
    JoinTrees(usize),
    /// A T-blossom's dual reached zero and must be expanded
    ExpandBlossom(usize),
}

struct Solver<'a> {
    n: usize,
    edges: &'a [Edge],
    endpoint: Vec<usize>,
    /// Remote endpoints of the edges incident to each vertex
    neighbours: Vec<Vec<usize>>,
    /// Remote endpoint of each vertex's matched edge
    mate: Vec<Option<usize>>,
    label: Vec<u8>,
    /// Endpoint through which a vertex or top-level blossom got its label
    label_end: Vec<Option<usize>>,
    in_blossom: Vec<usize>,
    blossom_parent: Vec<Option<usize>>,
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<Option<usize>>,
    /// Endpoints joining consecutive children, parallel to `blossom_children`
    blossom_endpoints: Vec<Vec<usize>>,
    /// Least-slack edge to a different S-blossom
    best_edge: Vec<Option<usize>>,
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    dual: Vec<i64>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a> Solver<'a> {
    fn new(n: usize, edges: &'a [Edge]) -> Self {
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let endpoint = (0..2 * edges.len())
            .map(|p| {
                let (i, j, _) = edges[p / 2];
                if p % 2 == 0 {
                    i
                } else {
                    j
                }
            })
            .collect();

        let mut neighbours = vec![Vec::new(); n];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbours[i].push(2 * k + 1);
            neighbours[j].push(2 * k);
        }

        let mut blossom_base: Vec<Option<usize>> = (0..n).map(Some).collect();
        blossom_base.resize(2 * n, None);

        let mut dual = vec![max_weight; n];
        dual.resize(2 * n, 0);

        Self {
            n,
            edges,
            endpoint,
            neighbours,
            mate: vec![None; n],
            label: vec![FREE; 2 * n],
            label_end: vec![None; 2 * n],
            in_blossom: (0..n).collect(),
            blossom_parent: vec![None; 2 * n],
            blossom_children: vec![Vec::new(); 2 * n],
            blossom_base,
            blossom_endpoints: vec![Vec::new(); 2 * n],
            best_edge: vec![None; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused_blossoms: (n..2 * n).collect(),
            dual,
            allow_edge: vec![false; edges.len()],
            queue: Vec::new(),
        }
    }

    fn run(&mut self, max_cardinality: bool) -> Result<(), PairingError> {
        // Each stage augments the matching by one edge, or stops.
        for stage in 0..self.n {
            self.label.fill(FREE);
            self.best_edge.fill(None);
            for b in self.n..2 * self.n {
                self.blossom_best_edges[b] = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();

            for v in 0..self.n {
                if self.mate[v].is_none() && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, S_LABEL, None)?;
                }
            }

            let mut augmented = false;
            loop {
                while !augmented {
                    let Some(v) = self.queue.pop() else { break };
                    augmented = self.scan_vertex(v)?;
                }
                if augmented {
                    break;
                }

                let (delta, step) = self.next_dual_step(max_cardinality);
                self.apply_dual_step(delta);

                match step {
                    DualStep::Finished => break,
                    DualStep::GrowTree(k) => {
                        self.allow_edge[k] = true;
                        let (i, j, _) = self.edges[k];
                        let s_vertex = if self.label[self.in_blossom[i]] == FREE { j } else { i };
                        self.queue.push(s_vertex);
                    }
                    DualStep::JoinTrees(k) => {
                        self.allow_edge[k] = true;
                        self.queue.push(self.edges[k].0);
                    }
                    DualStep::ExpandBlossom(b) => self.expand_blossom(b, false)?,
                }
            }

            if !augmented {
                tracing::trace!("Blossom search finished after {} stages", stage);
                break;
            }

            // Blossoms whose dual dropped to zero can be opened up again.
            for b in self.n..2 * self.n {
                if self.blossom_parent[b].is_none()
                    && self.blossom_base[b].is_some()
                    && self.label[b] == S_LABEL
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }

        Ok(())
    }

    fn mates(&self) -> Vec<Option<usize>> {
        self.mate
            .iter()
            .map(|m| m.map(|p| self.endpoint[p]))
            .collect()
    }

    fn slack(&self, k: usize) -> i64 {
        let (i, j, weight) = self.edges[k];
        self.dual[i] + self.dual[j] - 2 * weight
    }

    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        self.collect_leaves(b, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, b: usize, leaves: &mut Vec<usize>) {
        if b < self.n {
            leaves.push(b);
        } else {
            for &child in &self.blossom_children[b] {
                self.collect_leaves(child, leaves);
            }
        }
    }

    /// Label the top-level blossom containing `w` with `t`, reached via endpoint `p`
    fn assign_label(&mut self, w: usize, t: u8, p: Option<usize>) -> Result<(), PairingError> {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = None;
        self.best_edge[b] = None;

        if t == S_LABEL {
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
            Ok(())
        } else {
            // The base of a T-blossom is matched; its mate becomes an S-vertex.
            let base = require(self.blossom_base[b], "labelled blossom has no base")?;
            let mate = require(self.mate[base], "T-blossom base is unmatched")?;
            self.assign_label(self.endpoint[mate], S_LABEL, Some(mate ^ 1))
        }
    }

    /// Scan the neighbours of S-vertex `v`. Returns `true` once the matching was augmented.
    fn scan_vertex(&mut self, v: usize) -> Result<bool, PairingError> {
        for idx in 0..self.neighbours[v].len() {
            let p = self.neighbours[v][idx];
            let k = p / 2;
            let w = self.endpoint[p];

            if self.in_blossom[v] == self.in_blossom[w] {
                continue;
            }

            let mut kslack = 0;
            if !self.allow_edge[k] {
                kslack = self.slack(k);
                if kslack <= 0 {
                    self.allow_edge[k] = true;
                }
            }

            let bw = self.in_blossom[w];
            if self.allow_edge[k] {
                if self.label[bw] == FREE {
                    self.assign_label(w, T_LABEL, Some(p ^ 1))?;
                } else if self.label[bw] == S_LABEL {
                    match self.scan_blossom(v, w)? {
                        Some(base) => self.add_blossom(base, k)?,
                        None => {
                            self.augment_matching(k)?;
                            return Ok(true);
                        }
                    }
                } else if self.label[w] == FREE {
                    // w is inside a T-blossom but was not reached yet
                    self.label[w] = T_LABEL;
                    self.label_end[w] = Some(p ^ 1);
                }
            } else if self.label[bw] == S_LABEL {
                let b = self.in_blossom[v];
                if self.best_edge[b].map_or(true, |e| kslack < self.slack(e)) {
                    self.best_edge[b] = Some(k);
                }
            } else if self.label[w] == FREE
                && self.best_edge[w].map_or(true, |e| kslack < self.slack(e))
            {
                self.best_edge[w] = Some(k);
            }
        }

        Ok(false)
    }

    /// Trace back from `v` and `w` towards the tree roots.
    ///
    /// Returns the base of a new blossom, or `None` if the trees are distinct
    /// and an augmenting path was found.
    fn scan_blossom(&mut self, v: usize, w: usize) -> Result<Option<usize>, PairingError> {
        let mut path = Vec::new();
        let mut base = None;
        let mut v = Some(v);
        let mut w = Some(w);

        while let Some(current) = v {
            let b = self.in_blossom[current];
            if self.label[b] & BREADCRUMB != 0 {
                base = self.blossom_base[b];
                break;
            }
            path.push(b);
            self.label[b] = S_LABEL | BREADCRUMB;

            v = match self.label_end[b] {
                None => None,
                Some(p) => {
                    let t = self.in_blossom[self.endpoint[p]];
                    let q = require(self.label_end[t], "T-blossom has no label endpoint")?;
                    Some(self.endpoint[q])
                }
            };

            if w.is_some() {
                std::mem::swap(&mut v, &mut w);
            }
        }

        for b in path {
            self.label[b] = S_LABEL;
        }

        Ok(base)
    }

    /// Shrink the odd cycle closed by edge `k` into a new blossom with the given base
    fn add_blossom(&mut self, base: usize, k: usize) -> Result<(), PairingError> {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = self
            .unused_blossoms
            .pop()
            .ok_or_else(|| PairingError::infeasible("no free blossom slot"))?;
        self.blossom_base[b] = Some(base);
        self.blossom_parent[b] = None;
        self.blossom_parent[bb] = Some(b);

        let mut children = Vec::new();
        let mut endpoints = Vec::new();
        while bv != bb {
            self.blossom_parent[bv] = Some(b);
            children.push(bv);
            let p = require(self.label_end[bv], "blossom path is not labelled")?;
            endpoints.push(p);
            bv = self.in_blossom[self.endpoint[p]];
        }
        children.push(bb);
        children.reverse();
        endpoints.reverse();
        endpoints.push(2 * k);
        while bw != bb {
            self.blossom_parent[bw] = Some(b);
            children.push(bw);
            let p = require(self.label_end[bw], "blossom path is not labelled")?;
            endpoints.push(p ^ 1);
            bw = self.in_blossom[self.endpoint[p]];
        }

        self.blossom_children[b] = children.clone();
        self.blossom_endpoints[b] = endpoints;
        self.label[b] = S_LABEL;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;

        for leaf in self.blossom_leaves(b) {
            if self.label[self.in_blossom[leaf]] == T_LABEL {
                // Former T-vertices become S-vertices and must be scanned.
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        let mut best_edge_to: Vec<Option<usize>> = vec![None; 2 * self.n];
        for &child in &children {
            let candidates: Vec<usize> = match self.blossom_best_edges[child].take() {
                Some(list) => list,
                None => {
                    let mut list = Vec::new();
                    for leaf in self.blossom_leaves(child) {
                        list.extend(self.neighbours[leaf].iter().map(|p| p / 2));
                    }
                    list
                }
            };

            for k in candidates {
                let (i, j, _) = self.edges[k];
                let j = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[j];
                if bj != b
                    && self.label[bj] == S_LABEL
                    && best_edge_to[bj].map_or(true, |e| self.slack(k) < self.slack(e))
                {
                    best_edge_to[bj] = Some(k);
                }
            }
            self.best_edge[child] = None;
        }

        let best_edges: Vec<usize> = best_edge_to.into_iter().flatten().collect();
        let mut best = None;
        for &k in &best_edges {
            if best.map_or(true, |e| self.slack(k) < self.slack(e)) {
                best = Some(k);
            }
        }
        self.best_edge[b] = best;
        self.blossom_best_edges[b] = Some(best_edges);

        Ok(())
    }

    /// Dissolve blossom `b`, relabelling its children when it was a T-blossom
    /// expanded in the middle of a stage.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) -> Result<(), PairingError> {
        let children = self.blossom_children[b].clone();

        for &s in &children {
            self.blossom_parent[s] = None;
            if s < self.n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage)?;
            } else {
                for leaf in self.blossom_leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_stage && self.label[b] == T_LABEL {
            let len = children.len() as isize;
            let endpoints = self.blossom_endpoints[b].clone();
            let entry = require(self.label_end[b], "T-blossom has no label endpoint")?;
            let entry_child = self.in_blossom[self.endpoint[entry ^ 1]];

            // Walk from the entry child to the base along the even-length side.
            let mut j = position(&children, entry_child)? as isize;
            let (step, trick) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };
            let endpoint_at = |j: isize| endpoints[wrap(j - trick as isize, len)];

            let mut p = entry;
            while j != 0 {
                self.label[self.endpoint[p ^ 1]] = FREE;
                self.label[self.endpoint[endpoint_at(j) ^ trick ^ 1]] = FREE;
                self.assign_label(self.endpoint[p ^ 1], T_LABEL, Some(p))?;
                self.allow_edge[endpoint_at(j) / 2] = true;
                j += step;
                p = endpoint_at(j) ^ trick;
                self.allow_edge[p / 2] = true;
                j += step;
            }

            // The base child keeps the T label without relabelling its mate.
            let bv = children[wrap(j, len)];
            let reached = self.endpoint[p ^ 1];
            self.label[reached] = T_LABEL;
            self.label[bv] = T_LABEL;
            self.label_end[reached] = Some(p);
            self.label_end[bv] = Some(p);
            self.best_edge[bv] = None;

            // Children on the odd side may have been reached from outside.
            j += step;
            while children[wrap(j, len)] != entry_child {
                let bv = children[wrap(j, len)];
                if self.label[bv] == S_LABEL {
                    j += step;
                    continue;
                }
                let reached = self
                    .blossom_leaves(bv)
                    .into_iter()
                    .find(|&leaf| self.label[leaf] != FREE);
                if let Some(v) = reached {
                    self.label[v] = FREE;
                    let base = require(self.blossom_base[bv], "sub-blossom has no base")?;
                    let mate = require(self.mate[base], "sub-blossom base is unmatched")?;
                    self.label[self.endpoint[mate]] = FREE;
                    self.assign_label(v, T_LABEL, self.label_end[v])?;
                }
                j += step;
            }
        }

        self.label[b] = FREE;
        self.label_end[b] = None;
        self.blossom_children[b].clear();
        self.blossom_endpoints[b].clear();
        self.blossom_base[b] = None;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = None;
        self.unused_blossoms.push(b);

        Ok(())
    }

    /// Swap matched and unmatched edges along the even path from vertex `v`
    /// to the base of blossom `b`, making `v` the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) -> Result<(), PairingError> {
        let mut t = v;
        while self.blossom_parent[t] != Some(b) {
            t = require(self.blossom_parent[t], "vertex is not inside the blossom")?;
        }
        if t >= self.n {
            self.augment_blossom(t, v)?;
        }

        let children = self.blossom_children[b].clone();
        let endpoints = self.blossom_endpoints[b].clone();
        let len = children.len() as isize;
        let i = position(&children, t)?;
        let mut j = i as isize;
        let (step, trick) = if i & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = children[wrap(j, len)];
            let p = endpoints[wrap(j - trick as isize, len)] ^ trick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p])?;
            }
            j += step;
            let t = children[wrap(j, len)];
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1])?;
            }
            self.mate[self.endpoint[p]] = Some(p ^ 1);
            self.mate[self.endpoint[p ^ 1]] = Some(p);
        }

        self.blossom_children[b].rotate_left(i);
        self.blossom_endpoints[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];

        Ok(())
    }

    /// Flip the augmenting path through edge `k` back to both tree roots
    fn augment_matching(&mut self, k: usize) -> Result<(), PairingError> {
        let (v, w, _) = self.edges[k];

        for (start, start_endpoint) in [(v, 2 * k + 1), (w, 2 * k)] {
            let mut s = start;
            let mut p = start_endpoint;
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.n {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = Some(p);

                let Some(end) = self.label_end[bs] else { break };
                let bt = self.in_blossom[self.endpoint[end]];
                let bt_end = require(self.label_end[bt], "T-blossom has no label endpoint")?;
                s = self.endpoint[bt_end];
                let j = self.endpoint[bt_end ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = Some(bt_end);
                p = bt_end ^ 1;
            }
        }

        Ok(())
    }

    /// Pick the largest dual change that keeps every constraint satisfied
    fn next_dual_step(&self, max_cardinality: bool) -> (i64, DualStep) {
        let mut best: Option<(i64, DualStep)> = None;

        // Without the cardinality requirement we may stop once a vertex dual hits zero.
        if !max_cardinality {
            let min_dual = self.dual[..self.n].iter().copied().min().unwrap_or(0);
            best = Some((min_dual, DualStep::Finished));
        }

        let improves = |best: &Option<(i64, DualStep)>, delta: i64| {
            best.as_ref().map_or(true, |(current, _)| delta < *current)
        };

        for v in 0..self.n {
            if self.label[self.in_blossom[v]] == FREE {
                if let Some(k) = self.best_edge[v] {
                    let delta = self.slack(k);
                    if improves(&best, delta) {
                        best = Some((delta, DualStep::GrowTree(k)));
                    }
                }
            }
        }

        for b in 0..2 * self.n {
            if self.blossom_parent[b].is_none() && self.label[b] == S_LABEL {
                if let Some(k) = self.best_edge[b] {
                    let delta = self.slack(k) / 2;
                    if improves(&best, delta) {
                        best = Some((delta, DualStep::JoinTrees(k)));
                    }
                }
            }
        }

        for b in self.n..2 * self.n {
            if self.blossom_base[b].is_some()
                && self.blossom_parent[b].is_none()
                && self.label[b] == T_LABEL
                && improves(&best, self.dual[b])
            {
                best = Some((self.dual[b], DualStep::ExpandBlossom(b)));
            }
        }

        best.unwrap_or_else(|| {
            // Only reachable with max_cardinality: no further augmentation exists.
            let min_dual = self.dual[..self.n].iter().copied().min().unwrap_or(0);
            (min_dual.max(0), DualStep::Finished)
        })
    }

    fn apply_dual_step(&mut self, delta: i64) {
        for v in 0..self.n {
            match self.label[self.in_blossom[v]] {
                S_LABEL => self.dual[v] -= delta,
                T_LABEL => self.dual[v] += delta,
                _ => {}
            }
        }
        for b in self.n..2 * self.n {
            if self.blossom_base[b].is_some() && self.blossom_parent[b].is_none() {
                match self.label[b] {
                    S_LABEL => self.dual[b] += delta,
                    T_LABEL => self.dual[b] -= delta,
                    _ => {}
                }
            }
        }
    }
}

fn require(value: Option<usize>, invariant: &str) -> Result<usize, PairingError> {
    value.ok_or_else(|| PairingError::infeasible(format!("blossom invariant broken: {}", invariant)))
}

fn position(children: &[usize], child: usize) -> Result<usize, PairingError> {
    children
        .iter()
        .position(|&c| c == child)
        .ok_or_else(|| PairingError::infeasible("blossom invariant broken: child not found"))
}

/// Index into a cyclic list with a possibly negative offset
#[inline]
fn wrap(j: isize, len: isize) -> usize {
    j.rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(edges: &[Edge], mates: &[Option<usize>]) -> i64 {
        edges
            .iter()
            .filter(|&&(i, j, _)| mates[i] == Some(j))
            .map(|e| e.2)
            .sum()
    }

    fn assert_consistent(mates: &[Option<usize>]) {
        for (v, mate) in mates.iter().enumerate() {
            if let Some(w) = mate {
                assert_eq!(mates[*w], Some(v), "mate of {} is not symmetric", v);
            }
        }
    }

    #[test]
    fn test_empty_and_single_edge() {
        assert_eq!(max_weight_matching(0, &[], false).unwrap(), vec![]);
        assert_eq!(max_weight_matching(2, &[], true).unwrap(), vec![None, None]);
        assert_eq!(
            max_weight_matching(2, &[(0, 1, 1)], false).unwrap(),
            vec![Some(1), Some(0)]
        );
    }

    #[test]
    fn test_prefers_heavier_edge_without_cardinality() {
        let edges = [(1, 2, 10), (2, 3, 11)];
        let mates = max_weight_matching(4, &edges, false).unwrap();
        assert_eq!(mates, vec![None, None, Some(3), Some(2)]);
    }

    #[test]
    fn test_max_cardinality_overrides_weight() {
        let edges = [(1, 2, 5), (2, 3, 11), (3, 4, 5)];

        let plain = max_weight_matching(5, &edges, false).unwrap();
        assert_eq!(total(&edges, &plain), 11);

        let full = max_weight_matching(5, &edges, true).unwrap();
        assert_eq!(full, vec![None, Some(2), Some(1), Some(4), Some(3)]);
    }

    #[test]
    fn test_zero_weights_still_cover_everyone() {
        let edges = [(0, 1, 0), (0, 2, 0), (0, 3, 0), (1, 2, 0), (1, 3, 0), (2, 3, 0)];
        let mates = max_weight_matching(4, &edges, true).unwrap();
        assert!(mates.iter().all(Option::is_some));
        assert_consistent(&mates);
    }

    #[test]
    fn test_s_blossom() {
        let edges = [(1, 2, 8), (1, 3, 9), (2, 3, 10), (3, 4, 7)];
        let mates = max_weight_matching(5, &edges, false).unwrap();
        assert_eq!(total(&edges, &mates), 15);
        assert_consistent(&mates);

        let mut extended = edges.to_vec();
        extended.extend([(1, 6, 5), (4, 5, 6)]);
        let mates = max_weight_matching(7, &extended, false).unwrap();
        assert_eq!(total(&extended, &mates), 21);
    }

    #[test]
    fn test_t_blossom() {
        let edges = [(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 4), (1, 6, 3)];
        let mates = max_weight_matching(7, &edges, false).unwrap();
        assert_eq!(total(&edges, &mates), 17);
        assert_consistent(&mates);
    }

    #[test]
    fn test_nested_blossom_expansion() {
        let edges = [
            (1, 2, 45),
            (1, 5, 45),
            (2, 3, 50),
            (3, 4, 45),
            (4, 5, 50),
            (1, 6, 30),
            (3, 9, 35),
            (4, 8, 35),
            (5, 7, 26),
            (9, 10, 5),
        ];
        let mates = max_weight_matching(11, &edges, false).unwrap();
        assert_eq!(total(&edges, &mates), 146);
        assert_consistent(&mates);
    }

    #[test]
    fn test_rejects_invalid_edges() {
        assert!(max_weight_matching(2, &[(0, 0, 1)], false).is_err());
        assert!(max_weight_matching(2, &[(0, 2, 1)], false).is_err());
    }
}
