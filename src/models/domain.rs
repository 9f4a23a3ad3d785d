use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Week number in the pairing record. Week 1 is the first recorded round.
pub type Week = u32;

/// Normalized participant identifier
///
/// Names are trimmed, lowercased and have internal whitespace collapsed,
/// so `"  Mary  Ann "` and `"mary ann"` are the same participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    /// Normalize a raw name. Returns `None` if nothing but whitespace is left.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unordered pair of distinct participants, stored smaller identifier first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey {
    first: Participant,
    second: Participant,
}

impl PairKey {
    /// Build the canonical key for `a` and `b`. Returns `None` when `a == b`.
    pub fn new(a: Participant, b: Participant) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self { first: a, second: b }),
            Ordering::Greater => Some(Self { first: b, second: a }),
            Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &Participant {
        &self.first
    }

    pub fn second(&self) -> &Participant {
        &self.second
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        &self.first == participant || &self.second == participant
    }

    /// The other member of the pair, if `participant` is in it
    pub fn partner_of(&self, participant: &Participant) -> Option<&Participant> {
        if &self.first == participant {
            Some(&self.second)
        } else if &self.second == participant {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Participants available for the next round
///
/// The roster keeps entries exactly as supplied, duplicates included; the graph
/// builder is where an invalid roster is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Participant>,
}

impl Roster {
    pub fn new(members: Vec<Participant>) -> Self {
        Self { members }
    }

    /// Build a roster from raw names, skipping names that normalize to nothing
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: names
                .into_iter()
                .filter_map(|name| Participant::new(name.as_ref()))
                .collect(),
        }
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.members.contains(participant)
    }

    /// Entries that occur more than once, sorted and reported once each
    pub fn duplicates(&self) -> Vec<&Participant> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for member in &self.members {
            if !seen.insert(member) {
                duplicates.insert(member);
            }
        }
        duplicates.into_iter().collect()
    }
}

/// Last week each pair of participants was paired.
///
/// Pairs that were never paired are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingHistory {
    last_paired: BTreeMap<PairKey, Week>,
}

impl PairingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` were paired in `week`.
    ///
    /// The most recent week wins, whatever order records arrive in.
    /// Returns `false` (and records nothing) when `a == b`.
    pub fn record(&mut self, a: &Participant, b: &Participant, week: Week) -> bool {
        match PairKey::new(a.clone(), b.clone()) {
            Some(key) => {
                self.record_pair(key, week);
                true
            }
            None => false,
        }
    }

    pub fn record_pair(&mut self, key: PairKey, week: Week) {
        self.last_paired
            .entry(key)
            .and_modify(|last| *last = (*last).max(week))
            .or_insert(week);
    }

    pub fn last_paired(&self, a: &Participant, b: &Participant) -> Option<Week> {
        let key = PairKey::new(a.clone(), b.clone())?;
        self.last_paired.get(&key).copied()
    }

    /// Highest week in the history, 0 when empty
    pub fn latest_week(&self) -> Week {
        self.last_paired.values().copied().max().unwrap_or(0)
    }

    /// Every participant named in at least one recorded pair
    pub fn participants(&self) -> BTreeSet<&Participant> {
        self.last_paired
            .keys()
            .flat_map(|key| [key.first(), key.second()])
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, Week)> + '_ {
        self.last_paired.iter().map(|(key, week)| (key, *week))
    }

    pub fn len(&self) -> usize {
        self.last_paired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_paired.is_empty()
    }
}

impl FromIterator<(PairKey, Week)> for PairingHistory {
    fn from_iter<T: IntoIterator<Item = (PairKey, Week)>>(iter: T) -> Self {
        let mut history = Self::new();
        for (key, week) in iter {
            history.record_pair(key, week);
        }
        history
    }
}

/// A chosen pair together with the weight the matching used for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredPair {
    pub pair: PairKey,
    pub weight: u64,
}

/// Disjoint pairs for one round, sorted by pair, plus the participant left out
/// when the roster is odd
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matching {
    pairs: Vec<ScoredPair>,
    unmatched: Option<Participant>,
}

impl Matching {
    pub fn new(mut pairs: Vec<ScoredPair>, unmatched: Option<Participant>) -> Self {
        pairs.sort_by(|a, b| a.pair.cmp(&b.pair));
        Self { pairs, unmatched }
    }

    pub fn pairs(&self) -> &[ScoredPair] {
        &self.pairs
    }

    pub fn unmatched(&self) -> Option<&Participant> {
        self.unmatched.as_ref()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.pairs
            .iter()
            .fold(0u64, |total, scored| total.saturating_add(scored.weight))
    }

    pub fn contains_pair(&self, a: &Participant, b: &Participant) -> bool {
        match PairKey::new(a.clone(), b.clone()) {
            Some(key) => self.pairs.iter().any(|scored| scored.pair == key),
            None => false,
        }
    }

    pub fn partner_of(&self, participant: &Participant) -> Option<&Participant> {
        self.pairs
            .iter()
            .find_map(|scored| scored.pair.partner_of(participant))
    }
}
