use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::io::fetch::FetchConfig;

/// Residue/chain filter settings for one cleaning pass.
///
/// Chain and ligand names are trimmed and uppercased once on construction, so
/// comparisons against uppercased record fields are case-insensitive. An empty
/// chain list means no chain filtering at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FilterPreset")]
pub struct FilterConfig {
    remove_waters: bool,
    remove_hetero: bool,
    keep_chains: Option<BTreeSet<String>>,
    keep_ligands: BTreeSet<String>,
}

/// Unnormalized form used when loading presets from disk.
#[derive(Deserialize)]
struct FilterPreset {
    remove_waters: bool,
    remove_hetero: bool,
    #[serde(default)]
    keep_chains: Option<Vec<String>>,
    #[serde(default)]
    keep_ligands: Vec<String>,
}

impl From<FilterPreset> for FilterConfig {
    fn from(p: FilterPreset) -> Self {
        FilterConfig::new(p.remove_waters, p.remove_hetero, p.keep_chains, p.keep_ligands)
    }
}

fn normalize<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl FilterConfig {
    pub fn new<C, L, S, T>(
        remove_waters: bool,
        remove_hetero: bool,
        keep_chains: Option<C>,
        keep_ligands: L,
    ) -> Self
    where
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let keep_chains = keep_chains.map(normalize).filter(|set| !set.is_empty());
        Self {
            remove_waters,
            remove_hetero,
            keep_chains,
            keep_ligands: normalize(keep_ligands),
        }
    }

    /// Parse comma-separated lists as given on the command line (`"A,C"`).
    pub fn from_lists(
        remove_waters: bool,
        remove_hetero: bool,
        keep_chains: Option<&str>,
        keep_ligands: Option<&str>,
    ) -> Self {
        Self::new(
            remove_waters,
            remove_hetero,
            keep_chains.map(|s| s.split(',')),
            keep_ligands.map(|s| s.split(',')).into_iter().flatten(),
        )
    }

    pub fn remove_waters(&self) -> bool {
        self.remove_waters
    }

    pub fn remove_hetero(&self) -> bool {
        self.remove_hetero
    }

    pub fn keep_chains(&self) -> Option<&BTreeSet<String>> {
        self.keep_chains.as_ref()
    }

    pub fn keep_ligands(&self) -> &BTreeSet<String> {
        &self.keep_ligands
    }

    /// True when `chain` is non-empty and excluded by the chain allow-list.
    pub fn excludes_chain(&self, chain: &str) -> bool {
        match &self.keep_chains {
            Some(keep) if !chain.is_empty() => !keep.contains(&chain.to_ascii_uppercase()),
            _ => false,
        }
    }

    pub fn keeps_ligand(&self, resname: &str) -> bool {
        self.keep_ligands.contains(resname)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            remove_waters: true,
            remove_hetero: true,
            keep_chains: None,
            keep_ligands: BTreeSet::new(),
        }
    }
}

/// Full preparation parameters for a run, shared by every target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepParams {
    pub filter: FilterConfig,
    pub fetch: FetchConfig,
    /// Run hydrogen addition through the external toolkit.
    pub add_hydrogens: bool,
    /// Convert the prepared structure to PDBQT through the external toolkit.
    pub convert_pdbqt: bool,
    /// Try to install the toolkit when a tool step is requested and it is missing.
    pub auto_install: bool,
    pub out_dir: PathBuf,
}

impl PrepParams {
    pub fn needs_toolkit(&self) -> bool {
        self.add_hydrogens || self.convert_pdbqt
    }
}

impl Default for PrepParams {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            fetch: FetchConfig::default(),
            add_hydrogens: false,
            convert_pdbqt: false,
            auto_install: true,
            out_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_normalized_once() {
        let cfg = FilterConfig::from_lists(true, true, Some(" a, C ,,"), Some("nad,Hem"));
        let chains: Vec<_> = cfg.keep_chains().unwrap().iter().cloned().collect();
        assert_eq!(chains, vec!["A", "C"]);
        assert!(cfg.keeps_ligand("NAD"));
        assert!(cfg.keeps_ligand("HEM"));
        assert!(!cfg.keeps_ligand("hem"));
    }

    #[test]
    fn empty_chain_list_disables_chain_filter() {
        let cfg = FilterConfig::from_lists(true, true, Some(" , "), None);
        assert!(cfg.keep_chains().is_none());
        assert!(!cfg.excludes_chain("B"));
    }

    #[test]
    fn chain_exclusion_is_case_insensitive_and_ignores_blank_chain() {
        let cfg = FilterConfig::from_lists(false, false, Some("A"), None);
        assert!(!cfg.excludes_chain("a"));
        assert!(cfg.excludes_chain("B"));
        assert!(!cfg.excludes_chain(""));
    }

    #[test]
    fn preset_round_trip_normalizes_loaded_values() {
        let json = r#"{"remove_waters":false,"remove_hetero":true,"keep_chains":["b"],"keep_ligands":[" atp "]}"#;
        let cfg: FilterConfig = serde_json::from_str(json).unwrap();
        assert!(!cfg.remove_waters());
        assert!(cfg.excludes_chain("A"));
        assert!(cfg.keeps_ligand("ATP"));
    }
}
