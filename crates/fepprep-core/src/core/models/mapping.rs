use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A correspondence between atom indices of ligand A and ligand B.
///
/// Keys are unique and the mapping cannot be modified once built. Iteration follows
/// insertion order. When the same A-index is inserted twice the later value replaces the
/// earlier one while the key keeps its original position, so a mapping file with a
/// repeated A-index resolves to the last occurrence.
#[derive(Debug, Clone, Default)]
pub struct AtomMapping {
    pairs: Vec<(usize, usize)>,
    positions: HashMap<usize, usize>,
}

impl AtomMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from `(index0, index1)` pairs, last occurrence wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut mapping = Self::default();
        for (index0, index1) in pairs {
            match mapping.positions.get(&index0) {
                Some(&pos) => mapping.pairs[pos].1 = index1,
                None => {
                    mapping.positions.insert(index0, mapping.pairs.len());
                    mapping.pairs.push((index0, index1));
                }
            }
        }
        mapping
    }

    /// Returns the B-index mapped to `index0`, if any.
    pub fn get(&self, index0: usize) -> Option<usize> {
        self.positions.get(&index0).map(|&pos| self.pairs[pos].1)
    }

    pub fn contains_key(&self, index0: usize) -> bool {
        self.positions.contains_key(&index0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|&(index0, _)| index0)
    }

    pub fn values(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|&(_, index1)| index1)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns `true` if every pair of `prematch` is present in this mapping.
    pub fn honors(&self, prematch: &Prematch) -> bool {
        prematch
            .iter()
            .all(|(index0, index1)| self.get(index0) == Some(index1))
    }
}

impl PartialEq for AtomMapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(index0, index1)| other.get(index0) == Some(index1))
    }
}

impl Eq for AtomMapping {}

impl FromIterator<(usize, usize)> for AtomMapping {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrematchError {
    #[error("Invalid prematch entry '{0}'. Expected 'INDEX0-INDEX1' (e.g., '3-1').")]
    InvalidEntry(String),

    #[error("Invalid atom index '{token}' in prematch entry '{entry}'")]
    InvalidIndex { entry: String, token: String },

    #[error(
        "Prematch pair {index0}-{index1} is out of range for ligands with {len0} and {len1} atoms"
    )]
    OutOfRange {
        index0: usize,
        index1: usize,
        len0: usize,
        len1: usize,
    },
}

/// A partial atom correspondence used to constrain the mapping search.
///
/// The text form is a comma-separated list of `index0-index1` pairs, e.g. `"3-1,5-9"`.
/// An empty string is an empty prematch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prematch(AtomMapping);

impl Prematch {
    pub fn new(mapping: AtomMapping) -> Self {
        Self(mapping)
    }

    pub fn as_mapping(&self) -> &AtomMapping {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks every pair against the atom counts of the two ligands.
    pub fn check_bounds(&self, len0: usize, len1: usize) -> Result<(), PrematchError> {
        match self
            .iter()
            .find(|&(index0, index1)| index0 >= len0 || index1 >= len1)
        {
            Some((index0, index1)) => Err(PrematchError::OutOfRange {
                index0,
                index1,
                len0,
                len1,
            }),
            None => Ok(()),
        }
    }
}

impl FromStr for Prematch {
    type Err = PrematchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut pairs = Vec::new();
        for entry in s.split(',') {
            let tokens: Vec<&str> = entry.split('-').collect();
            if tokens.len() != 2 {
                return Err(PrematchError::InvalidEntry(entry.to_string()));
            }
            let parse = |token: &str| {
                token
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| PrematchError::InvalidIndex {
                        entry: entry.to_string(),
                        token: token.to_string(),
                    })
            };
            pairs.push((parse(tokens[0])?, parse(tokens[1])?));
        }

        Ok(Self(AtomMapping::from_pairs(pairs)))
    }
}

impl fmt::Display for Prematch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (index0, index1)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}-{}", index0, index1)?;
        }
        Ok(())
    }
}
