use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "protprep",
    version,
    about = "Fetch and clean PDB structures, optionally add hydrogens and convert to PDBQT"
)]
pub struct CliArgs {
    /// PDB ID (4 chars) or local PDB path
    pub target: Option<String>,

    /// Newline-separated file of PDB IDs or paths (replaces TARGET)
    #[arg(long)]
    pub batch_file: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Keep water molecules (HOH/H2O/WAT)
    #[arg(long = "no-remove-waters", action = ArgAction::SetFalse)]
    pub remove_waters: bool,

    /// Keep heteroatom (HETATM) residues
    #[arg(long = "no-remove-hetero", action = ArgAction::SetFalse)]
    pub remove_hetero: bool,

    /// Comma-separated chain IDs to keep, e.g. 'A,C'
    #[arg(long)]
    pub keep_chains: Option<String>,

    /// Comma-separated 3-letter ligand names to keep, e.g. NAD,HEM
    #[arg(long)]
    pub keep_ligands: Option<String>,

    /// Add hydrogens with Open Babel (adds hydrogens only, no protonation state prediction)
    #[arg(long, visible_alias = "auto-add-h", default_value_t = false)]
    pub add_hydrogens: bool,

    /// Convert the prepared structure to PDBQT with Open Babel
    #[arg(long, visible_alias = "auto-pdbqt", default_value_t = false)]
    pub pdbqt: bool,

    /// Do not try to install Open Babel when it is missing
    #[arg(long, default_value_t = false)]
    pub no_install: bool,

    /// Download attempts per PDB ID
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Seconds to wait between download attempts
    #[arg(long, default_value_t = 2)]
    pub retry_delay: u64,

    /// Per-attempt download timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Verbose (debug) logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["protprep", "1a4w"]).unwrap();
        assert_eq!(args.target.as_deref(), Some("1a4w"));
        assert!(args.remove_waters);
        assert!(args.remove_hetero);
        assert!(!args.add_hydrogens);
        assert!(!args.pdbqt);
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.retries, 3);
    }

    #[test]
    fn negative_flags_and_aliases() {
        let args = CliArgs::try_parse_from([
            "protprep",
            "./my.pdb",
            "--no-remove-waters",
            "--no-remove-hetero",
            "--keep-chains",
            "A,C",
            "--auto-add-h",
            "--auto-pdbqt",
        ])
        .unwrap();
        assert!(!args.remove_waters);
        assert!(!args.remove_hetero);
        assert_eq!(args.keep_chains.as_deref(), Some("A,C"));
        assert!(args.add_hydrogens);
        assert!(args.pdbqt);
    }

    #[test]
    fn batch_file_without_target() {
        let args =
            CliArgs::try_parse_from(["protprep", "--batch-file", "ids.txt", "--out-dir", "out"])
                .unwrap();
        assert!(args.target.is_none());
        assert_eq!(args.batch_file, Some(PathBuf::from("ids.txt")));
    }
}
