use crate::restriction_enzyme::RecognitionSequence;
use anyhow::{Result, anyhow};

const BUILTIN_RECOGNITION_SEQUENCES_JSON: &str =
    include_str!("../assets/recognition_sequences.json");

/// Fixed lookup from enzyme name to recognition sequence.
#[derive(Clone, Debug, Default)]
pub struct Enzymes {
    recognition_sequences: Vec<RecognitionSequence>,
}

impl Enzymes {
    fn new(json_text: &str) -> Result<Self> {
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Recognition sequence file is not a JSON array"))?;
        let mut recognition_sequences = Vec::with_capacity(arr.len());
        for row in arr {
            let rs: RecognitionSequence = serde_json::from_value(row.clone())
                .map_err(|e| anyhow!("Bad recognition sequence {row}: {e}"))?;
            if rs.sequence.is_empty() {
                return Err(anyhow!("Empty recognition sequence for '{}'", rs.name));
            }
            recognition_sequences.push(rs);
        }
        Ok(Self {
            recognition_sequences,
        })
    }

    pub fn recognition_sequences(&self) -> &[RecognitionSequence] {
        &self.recognition_sequences
    }

    /// Exact, case-sensitive name match.
    pub fn recognition_sequence(&self, enzyme_name: &str) -> Option<&RecognitionSequence> {
        self.recognition_sequences
            .iter()
            .find(|rs| rs.name == enzyme_name)
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_RECOGNITION_SEQUENCES_JSON).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_parses() {
        let enzymes = Enzymes::new(BUILTIN_RECOGNITION_SEQUENCES_JSON).unwrap();
        assert_eq!(enzymes.recognition_sequences().len(), 1);
    }

    #[test]
    fn test_ecor1_lookup() {
        let enzymes = Enzymes::builtin();
        let rs = enzymes.recognition_sequence("EcoR1").unwrap();
        assert_eq!(rs.sequence, "GAATTC");
    }

    #[test]
    fn test_unknown_enzyme_has_no_sequence() {
        let enzymes = Enzymes::builtin();
        assert!(enzymes.recognition_sequence("BamHI").is_none());
        assert!(enzymes.recognition_sequence("ecor1").is_none());
        assert!(enzymes.recognition_sequence("EcoRI").is_none());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(Enzymes::new(r#"{"name": "EcoR1"}"#).is_err());
    }

    #[test]
    fn test_rejects_empty_sequence() {
        assert!(Enzymes::new(r#"[{"name": "Null", "sequence": ""}]"#).is_err());
    }
}
