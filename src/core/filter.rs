//! Fixed-column PDB record filter.
//!
//! Streams a PDB file line by line, keeps ATOM/HETATM/TER/END records that
//! survive the configured chain, water and heteroatom rules, and drops every
//! other record. Kept lines are written byte-for-byte.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::params::FilterConfig;
use crate::error::{Error, Result};
use crate::io::staging::stage_beside;
use crate::types::{RecordKind, is_water};

/// Counts of records removed during one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalSummary {
    pub waters: usize,
    pub hetero_residues: usize,
    pub skipped_chains: usize,
    /// Lines copied to the output.
    #[serde(skip)]
    pub written: usize,
}

/// Why a structural line was dropped.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Removal {
    Chain,
    Water,
    Hetero,
}

/// Outcome of evaluating one line against a filter.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LineDecision {
    /// Not a structural record; neither copied nor counted.
    Ignore,
    Keep,
    Drop(Removal),
}

/// Chain identifier from column 22, trimmed. Empty when the line is too short.
pub fn chain_id(line: &[u8]) -> String {
    column(line, 21, 22).to_string()
}

/// Residue name from columns 18-20, trimmed and uppercased.
pub fn residue_name(line: &[u8]) -> String {
    column(line, 17, 20).to_ascii_uppercase()
}

fn column(line: &[u8], start: usize, end: usize) -> &str {
    let line = strip_eol(line);
    if line.len() < end {
        return "";
    }
    std::str::from_utf8(&line[start..end])
        .map(str::trim)
        .unwrap_or("")
}

fn strip_eol(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Apply the filter rules to a single line. Chain is checked first, then
/// water, then heteroatom.
pub fn evaluate_line(line: &[u8], config: &FilterConfig) -> LineDecision {
    let kind = RecordKind::classify(line);
    if !kind.is_structural() {
        return LineDecision::Ignore;
    }

    if config.excludes_chain(&chain_id(line)) {
        return LineDecision::Drop(Removal::Chain);
    }

    let resname = residue_name(line);
    if config.remove_waters() && is_water(&resname) {
        return LineDecision::Drop(Removal::Water);
    }
    if config.remove_hetero() && kind == RecordKind::Hetero && !config.keeps_ligand(&resname) {
        return LineDecision::Drop(Removal::Hetero);
    }

    LineDecision::Keep
}

/// Filter `reader` into `writer`, returning the removal counts.
///
/// Does not check for an empty result; see [`clean_structure_file`].
pub fn filter_records<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    config: &FilterConfig,
) -> Result<RemovalSummary> {
    let mut summary = RemovalSummary::default();
    let mut line = Vec::with_capacity(96);

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        match evaluate_line(&line, config) {
            LineDecision::Ignore => {}
            LineDecision::Keep => {
                writer.write_all(&line)?;
                summary.written += 1;
            }
            LineDecision::Drop(Removal::Chain) => summary.skipped_chains += 1,
            LineDecision::Drop(Removal::Water) => summary.waters += 1,
            LineDecision::Drop(Removal::Hetero) => summary.hetero_residues += 1,
        }
    }

    writer.flush()?;
    Ok(summary)
}

/// Clean `input` into `output`.
///
/// The output is staged in a temporary file next to `output` and only moved
/// into place when at least one record survived. An empty result is an error
/// and leaves no output file.
pub fn clean_structure_file(
    input: &Path,
    output: &Path,
    config: &FilterConfig,
) -> Result<RemovalSummary> {
    debug!("Cleaning {:?} -> {:?} with {:?}", input, output, config);

    let reader = BufReader::new(File::open(input)?);
    let staged = stage_beside(output)?;
    let summary = filter_records(reader, BufWriter::new(staged.as_file()), config)?;

    if summary.written == 0 {
        return Err(Error::EmptyResult {
            input: input.to_path_buf(),
        });
    }

    staged.persist(output).map_err(|e| Error::Io(e.error))?;
    info!(
        "Cleaned {:?}: kept {} records, removed waters={} hetero={} chains={}",
        input, summary.written, summary.waters, summary.hetero_residues, summary.skipped_chains
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ATOM_A: &str =
        "ATOM      1  N   MET A   1      38.198  19.582  28.998  1.00 45.94           N\n";
    const HEM_A: &str =
        "HETATM 4601 FE   HEM A 201      15.858  11.530   9.386  1.00 11.56          FE\n";
    const HOH_B: &str =
        "HETATM 4700  O   HOH B 301      20.010  12.000   4.100  1.00 30.00           O\n";

    fn filter_str(input: &str, cfg: &FilterConfig) -> (String, RemovalSummary) {
        let mut out = Vec::new();
        let summary = filter_records(input.as_bytes(), &mut out, cfg).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    fn cfg(waters: bool, hetero: bool, chains: Option<&str>, ligands: Option<&str>) -> FilterConfig {
        FilterConfig::from_lists(waters, hetero, chains, ligands)
    }

    #[test]
    fn chain_filter_precedes_water_rule() {
        let input = format!("{ATOM_A}{HEM_A}{HOH_B}");
        let (out, summary) = filter_str(&input, &cfg(true, true, Some("A"), None));
        assert_eq!(out, ATOM_A);
        assert_eq!(summary.waters, 0);
        assert_eq!(summary.hetero_residues, 1);
        assert_eq!(summary.skipped_chains, 1);
        assert_eq!(summary.written, 1);
    }

    #[test]
    fn non_structural_lines_are_dropped_silently() {
        let input = format!(
            "HEADER    OXYGEN TRANSPORT                        07-MAR-84   4HHB\nREMARK   2 RESOLUTION.\n{ATOM_A}CONECT 4601 4602\nMASTER      0\nEND\n"
        );
        let (out, summary) = filter_str(&input, &cfg(true, true, None, None));
        assert_eq!(out, format!("{ATOM_A}END\n"));
        assert_eq!(summary, RemovalSummary { written: 2, ..Default::default() });
    }

    #[test]
    fn kept_ligands_override_hetero_removal() {
        let input = format!("{ATOM_A}{HEM_A}{HOH_B}");
        let (out, summary) = filter_str(&input, &cfg(true, true, None, Some("hem")));
        assert_eq!(out, format!("{ATOM_A}{HEM_A}"));
        assert_eq!(summary.waters, 1);
        assert_eq!(summary.hetero_residues, 0);
    }

    #[test]
    fn waters_kept_when_water_removal_off_but_hetero_still_applies() {
        let input = format!("{ATOM_A}{HOH_B}");
        let (out, summary) = filter_str(&input, &cfg(false, true, None, None));
        assert_eq!(out, ATOM_A);
        assert_eq!(summary.hetero_residues, 1);
        assert_eq!(summary.waters, 0);

        let (out, _) = filter_str(&input, &cfg(false, false, None, None));
        assert_eq!(out, input);
    }

    #[test]
    fn lines_are_copied_verbatim_including_crlf() {
        let input = ATOM_A.replace('\n', "\r\n") + "TER\r\nEND";
        let (out, summary) = filter_str(&input, &cfg(true, true, None, None));
        assert_eq!(out, input);
        assert_eq!(summary.written, 3);
    }

    #[test]
    fn short_lines_have_empty_chain_and_residue() {
        assert_eq!(chain_id(b"TER\n"), "");
        assert_eq!(residue_name(b"END"), "");
        assert_eq!(chain_id(ATOM_A.as_bytes()), "A");
        assert_eq!(residue_name(b"HETATM 4700  O   hoh b 301\n"), "HOH");
    }

    #[test]
    fn short_terminator_survives_chain_filter() {
        let input = format!("{ATOM_A}TER\nEND\n");
        let (out, summary) = filter_str(&input, &cfg(true, true, Some("A"), None));
        assert_eq!(out, input);
        assert_eq!(summary.skipped_chains, 0);
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let mut input = ATOM_A.as_bytes().to_vec();
        input.extend_from_slice(b"REMARK \xff\xfe\n");
        let mut out = Vec::new();
        let summary = filter_records(input.as_slice(), &mut out, &FilterConfig::default()).unwrap();
        assert_eq!(out, ATOM_A.as_bytes());
        assert_eq!(summary.written, 1);
    }

    #[test]
    fn excluding_every_chain_fails_and_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.pdb");
        let output = dir.path().join("out.pdb");
        fs::write(&input, format!("{ATOM_A}{HEM_A}")).unwrap();

        let err = clean_structure_file(&input, &output, &cfg(true, true, Some("Z"), None))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResult { .. }));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.pdb");
        fs::write(&input, format!("REMARK x\n{ATOM_A}{HEM_A}{HOH_B}TER\nEND\n")).unwrap();
        let config = cfg(true, true, Some("a"), None);

        let first = dir.path().join("first.pdb");
        let second = dir.path().join("second.pdb");
        let s1 = clean_structure_file(&input, &first, &config).unwrap();
        let s2 = clean_structure_file(&input, &second, &config).unwrap();

        assert_eq!(s1, s2);
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn output_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.pdb");
        let output = dir.path().join("out.pdb");
        fs::write(&input, ATOM_A).unwrap();
        fs::write(&output, "stale contents\n").unwrap();

        clean_structure_file(&input, &output, &FilterConfig::default()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), ATOM_A);
    }

    #[cfg(unix)]
    #[test]
    fn cleaned_file_is_readable_like_a_plain_write() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.pdb");
        let output = dir.path().join("out.pdb");
        fs::write(&input, ATOM_A).unwrap();

        clean_structure_file(&input, &output, &FilterConfig::default()).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&output), mode(&input));
    }
}
