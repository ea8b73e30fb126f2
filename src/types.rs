//! Shared types and enums used across PROTPREP.
//! Includes `RecordKind` (PDB record classification), `TargetSource`, and the
//! recognized water residue names.
use serde::{Deserialize, Serialize};

/// Residue names treated as solvent water.
pub const WATER_RESIDUES: [&str; 3] = ["HOH", "H2O", "WAT"];

/// Returns true when `resname` (already uppercased) names a water residue.
pub fn is_water(resname: &str) -> bool {
    WATER_RESIDUES.contains(&resname)
}

/// Classification of a single PDB line by its leading record name.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum RecordKind {
    Atom,
    Hetero,
    Terminator,
    End,
    Other,
}

impl RecordKind {
    /// Classify a raw line. `TER` and `END` match as prefixes, so `ENDMDL` is `End`.
    pub fn classify(line: &[u8]) -> Self {
        if line.starts_with(b"ATOM  ") {
            RecordKind::Atom
        } else if line.starts_with(b"HETATM") {
            RecordKind::Hetero
        } else if line.starts_with(b"TER") {
            RecordKind::Terminator
        } else if line.starts_with(b"END") {
            RecordKind::End
        } else {
            RecordKind::Other
        }
    }

    /// Records the cleaner copies through (subject to filters).
    pub fn is_structural(&self) -> bool {
        !matches!(self, RecordKind::Other)
    }
}

/// Where a resolved target's structure file came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// An existing file supplied by the caller.
    Local,
    /// Downloaded from RCSB by identifier.
    Remote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_record_prefixes() {
        assert_eq!(RecordKind::classify(b"ATOM      1  N   MET A   1"), RecordKind::Atom);
        assert_eq!(RecordKind::classify(b"HETATM 1234 FE   HEM A 201"), RecordKind::Hetero);
        assert_eq!(RecordKind::classify(b"TER    1235      HEM A 201"), RecordKind::Terminator);
        assert_eq!(RecordKind::classify(b"END\n"), RecordKind::End);
        assert_eq!(RecordKind::classify(b"ENDMDL"), RecordKind::End);
        assert_eq!(RecordKind::classify(b"HEADER    OXYGEN TRANSPORT"), RecordKind::Other);
        assert_eq!(RecordKind::classify(b"ATOM"), RecordKind::Other);
        assert_eq!(RecordKind::classify(b"REMARK   2"), RecordKind::Other);
    }

    #[test]
    fn water_synonyms() {
        assert!(is_water("HOH"));
        assert!(is_water("WAT"));
        assert!(is_water("H2O"));
        assert!(!is_water("HEM"));
        assert!(!is_water(""));
    }
}
