use serde::{Deserialize, Serialize};

/// Offset from the start of a recognition match to the cut point.
///
/// Every enzyme cuts one base past the start of its site; enzyme-specific
/// cleavage geometry is not modelled.
pub const CUT_OFFSET: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionSequence {
    pub name: String,
    pub sequence: String,
}

impl RecognitionSequence {
    pub fn new(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
        }
    }

    /// Start offsets of every non-overlapping match, scanning left to right.
    pub fn get_sites(&self, dna: &str) -> Vec<usize> {
        if self.sequence.is_empty() {
            return vec![];
        }
        dna.match_indices(self.sequence.as_str())
            .map(|(start, _)| start)
            .collect()
    }

    pub fn cut_points(&self, dna: &str) -> Vec<usize> {
        self.get_sites(dna)
            .into_iter()
            .map(|start| start + CUT_OFFSET)
            .collect()
    }

    /// Slices `dna` at every cut point.
    ///
    /// Returns the whole sequence as a single fragment when there is no site.
    pub fn digest<'a>(&self, dna: &'a str) -> Vec<&'a str> {
        let mut bounds = Vec::with_capacity(2 + dna.len() / self.sequence.len().max(1));
        bounds.push(0);
        bounds.extend(self.cut_points(dna));
        bounds.push(dna.len());
        bounds.windows(2).map(|w| &dna[w[0]..w[1]]).collect()
    }
}
