use super::backend::{Ligand, MergedSystem, PerturbationEngine};
use super::config::{MatchOptions, MergeOptions};
use super::error::EngineError;
use crate::core::io::mapping_file::{MappingFile, MappingFileError};
use crate::core::models::mapping::AtomMapping;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const SCRATCH_MAPPING_PREFIX: &str = "fepprep-mapping-";

/// A [`PerturbationEngine`] backed by a helper executable.
///
/// Each engine call runs `<executable> [leading args...] <step> [args...]` and blocks
/// until it exits. Leading arguments let an interpreter drive a script, e.g.
/// `python bss_helper.py`. The helper reads structures and writes results itself; this
/// side only passes paths and reads back what the helper prints on stdout. Outputs of
/// `align` and `merge` go to the work directory.
///
/// The mapping handed to `align` and `merge` is written to a uniquely named scratch file
/// in the work directory that is removed once the helper exits.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    executable: PathBuf,
    leading_args: Vec<OsString>,
    work_dir: PathBuf,
}

impl CommandEngine {
    pub fn new(executable: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
            work_dir: work_dir.into(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn run(&self, step: &'static str, args: Vec<OsString>) -> Result<String, EngineError> {
        debug!("Running engine step '{}': {:?} {:?}", step, self.executable, args);
        let output = Command::new(&self.executable)
            .args(&self.leading_args)
            .arg(step)
            .args(&args)
            .output()
            .map_err(|source| EngineError::Spawn {
                executable: self.executable.clone(),
                step,
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                step,
                status: output.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!("Engine step '{}' stderr: {}", step, stderr);
        }

        String::from_utf8(output.stdout).map_err(|_| EngineError::InvalidOutput {
            step,
            reason: "stdout is not valid UTF-8".to_string(),
        })
    }

    fn ligand_args(mol0: &Ligand, mol1: &Ligand) -> Vec<OsString> {
        let mut args = Vec::with_capacity(2 * (mol0.files.len() + mol1.files.len()));
        for file in &mol0.files {
            args.push("--mol0".into());
            args.push(file.into());
        }
        for file in &mol1.files {
            args.push("--mol1".into());
            args.push(file.into());
        }
        args
    }

    fn write_scratch_mapping(
        &self,
        step: &'static str,
        mapping: &AtomMapping,
    ) -> Result<NamedTempFile, EngineError> {
        let exchange = |source: MappingFileError| EngineError::MappingExchange { step, source };
        let mut scratch = tempfile::Builder::new()
            .prefix(SCRATCH_MAPPING_PREFIX)
            .suffix(".csv")
            .tempfile_in(&self.work_dir)
            .map_err(|e| exchange(MappingFileError::Io(e)))?;
        MappingFile::write_to(mapping, scratch.as_file_mut()).map_err(exchange)?;
        Ok(scratch)
    }

    fn parse_paths(step: &'static str, stdout: &str) -> Result<Vec<PathBuf>, EngineError> {
        let paths: Vec<PathBuf> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        if paths.is_empty() {
            return Err(EngineError::InvalidOutput {
                step,
                reason: "no output files were reported".to_string(),
            });
        }
        Ok(paths)
    }

    /// Splits the `match` output into mapping blocks separated by blank lines.
    fn parse_mappings(stdout: &str) -> Result<Vec<AtomMapping>, EngineError> {
        let mut blocks = vec![String::new()];
        for line in stdout.lines() {
            if line.trim().is_empty() {
                blocks.push(String::new());
            } else if let Some(block) = blocks.last_mut() {
                block.push_str(line);
                block.push('\n');
            }
        }

        let mut mappings = Vec::new();
        for block in blocks.iter().filter(|b| !b.is_empty()) {
            let mapping = MappingFile::read_from(block.as_bytes()).map_err(|source| {
                EngineError::MappingExchange {
                    step: "match",
                    source,
                }
            })?;
            if !mapping.is_empty() {
                mappings.push(mapping);
            }
        }
        Ok(mappings)
    }
}

impl PerturbationEngine for CommandEngine {
    fn match_atoms(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        options: &MatchOptions,
    ) -> Result<Vec<AtomMapping>, EngineError> {
        let mut args: Vec<OsString> = vec![
            "--timeout".into(),
            options.timeout.as_secs_f64().to_string().into(),
        ];
        if !options.prematch.is_empty() {
            args.push("--prematch".into());
            args.push(options.prematch.to_string().into());
        }
        args.extend(Self::ligand_args(mol0, mol1));

        let stdout = self.run("match", args)?;
        let mappings = Self::parse_mappings(&stdout)?;
        info!("Engine reported {} candidate mapping(s).", mappings.len());
        Ok(mappings)
    }

    fn rmsd_align(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        mapping: &AtomMapping,
    ) -> Result<Ligand, EngineError> {
        let scratch = self.write_scratch_mapping("align", mapping)?;
        let mut args: Vec<OsString> = vec![
            "--mapping".into(),
            scratch.path().into(),
            "--output-dir".into(),
            self.work_dir.clone().into(),
        ];
        args.extend(Self::ligand_args(mol0, mol1));

        let stdout = self.run("align", args)?;
        Ok(Ligand {
            molecule: mol0.molecule.clone(),
            files: Self::parse_paths("align", &stdout)?,
        })
    }

    fn merge(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        mapping: &AtomMapping,
        options: &MergeOptions,
    ) -> Result<MergedSystem, EngineError> {
        let scratch = self.write_scratch_mapping("merge", mapping)?;
        let mut args: Vec<OsString> = vec![
            "--mapping".into(),
            scratch.path().into(),
            "--output-dir".into(),
            self.work_dir.clone().into(),
        ];
        if options.allow_ring_breaking {
            args.push("--allow-ring-breaking".into());
        }
        if options.allow_ring_size_change {
            args.push("--allow-ring-size-change".into());
        }
        args.extend(Self::ligand_args(mol0, mol1));

        let stdout = self.run("merge", args)?;
        Ok(MergedSystem {
            files: Self::parse_paths("merge", &stdout)?,
        })
    }

    fn write_inputs(
        &self,
        merged: &MergedSystem,
        work_dir: &Path,
        process_name: &str,
    ) -> Result<(), EngineError> {
        let mut args: Vec<OsString> = vec![
            "--name".into(),
            process_name.into(),
            "--output-dir".into(),
            work_dir.into(),
        ];
        for file in &merged.files {
            args.push("--merged".into());
            args.push(file.into());
        }
        self.run("write-inputs", args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::Molecule;
    use std::time::Duration;

    fn ligand(name: &str) -> Ligand {
        Ligand {
            molecule: Molecule::from_names(name, ["C1", "C2"]),
            files: vec![PathBuf::from(format!("{name}.prm7"))],
        }
    }

    #[test]
    fn parse_mappings_splits_blocks_best_first() {
        let stdout = "0,0\n1,1\n\n# runner-up\n0,1\n1,0\n\n\n";
        let mappings = CommandEngine::parse_mappings(stdout).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0], AtomMapping::from_pairs([(0, 0), (1, 1)]));
        assert_eq!(mappings[1], AtomMapping::from_pairs([(0, 1), (1, 0)]));
    }

    #[test]
    fn parse_mappings_rejects_malformed_block() {
        let result = CommandEngine::parse_mappings("0,0\n\nnot-a-mapping\n");
        assert!(matches!(
            result,
            Err(EngineError::MappingExchange { step: "match", .. })
        ));
    }

    #[test]
    fn parse_paths_requires_at_least_one_file() {
        let paths = CommandEngine::parse_paths("merge", "  a.prm7\n\nb.rst7\n").unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.prm7"), PathBuf::from("b.rst7")]);
        assert!(matches!(
            CommandEngine::parse_paths("merge", "\n"),
            Err(EngineError::InvalidOutput { step: "merge", .. })
        ));
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CommandEngine::new(dir.path().join("no-such-helper"), dir.path());
        let result = engine.match_atoms(&ligand("a"), &ligand("b"), &MatchOptions::default());
        assert!(matches!(
            result,
            Err(EngineError::Spawn { step: "match", .. })
        ));
    }

    #[test]
    fn unwritable_work_dir_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CommandEngine::new(
            dir.path().join("no-such-helper"),
            dir.path().join("missing"),
        );
        let result = engine.rmsd_align(
            &ligand("a"),
            &ligand("b"),
            &AtomMapping::from_pairs([(0, 0)]),
        );
        assert!(matches!(
            result,
            Err(EngineError::MappingExchange { step: "align", .. })
        ));
    }

    #[cfg(unix)]
    mod helper_script {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        // Records each step's arguments in `<step>.args` next to the script and copies the
        // mapping it is handed to `received.csv`.
        const SCRIPT: &str = r##"#!/bin/sh
here=$(dirname "$0")
step="$1"
shift
echo "$*" > "$here/$step.args"
while [ $# -gt 0 ]; do
    if [ "$1" = "--mapping" ]; then
        cp "$2" "$here/received.csv"
    fi
    shift
done
case "$step" in
    match)
        printf '0,1\n1,0\n\n0,0\n'
        ;;
    align)
        echo "aligned.prm7"
        echo "aligned.rst7"
        ;;
    merge)
        echo "merged.s3"
        ;;
    write-inputs)
        echo "cannot write inputs: disk quota exceeded" >&2
        exit 3
        ;;
esac
"##;

        fn install_helper() -> (TempDir, CommandEngine) {
            let dir = tempfile::tempdir().unwrap();
            let script = dir.path().join("helper.sh");
            fs::write(&script, SCRIPT).unwrap();
            let engine = CommandEngine::new("/bin/sh", dir.path()).with_leading_args([&script]);
            (dir, engine)
        }

        fn recorded_args(dir: &TempDir, step: &str) -> Vec<String> {
            fs::read_to_string(dir.path().join(format!("{step}.args")))
                .unwrap()
                .split_whitespace()
                .map(str::to_string)
                .collect()
        }

        fn scratch_files(dir: &TempDir) -> Vec<PathBuf> {
            fs::read_dir(dir.path())
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(SCRATCH_MAPPING_PREFIX))
                })
                .collect()
        }

        #[test]
        fn match_forwards_timeout_and_prematch() {
            let (dir, engine) = install_helper();
            let options = MatchOptions {
                timeout: Duration::from_secs(2),
                prematch: "0-1".parse().unwrap(),
            };
            let mappings = engine
                .match_atoms(&ligand("a"), &ligand("b"), &options)
                .unwrap();

            assert_eq!(mappings.len(), 2);
            assert_eq!(mappings[0].get(0), Some(1));
            assert_eq!(
                recorded_args(&dir, "match"),
                vec![
                    "--timeout", "2", "--prematch", "0-1", "--mol0", "a.prm7", "--mol1",
                    "b.prm7"
                ]
            );
        }

        #[test]
        fn match_omits_empty_prematch() {
            let (dir, engine) = install_helper();
            let options = MatchOptions {
                timeout: Duration::from_millis(1500),
                ..MatchOptions::default()
            };
            engine
                .match_atoms(&ligand("a"), &ligand("b"), &options)
                .unwrap();
            assert_eq!(
                recorded_args(&dir, "match"),
                vec!["--timeout", "1.5", "--mol0", "a.prm7", "--mol1", "b.prm7"]
            );
        }

        #[test]
        fn align_hands_over_mapping_and_reports_files() {
            let (dir, engine) = install_helper();
            let mapping = AtomMapping::from_pairs([(0, 1), (1, 0)]);
            let aligned = engine
                .rmsd_align(&ligand("a"), &ligand("b"), &mapping)
                .unwrap();

            assert_eq!(aligned.molecule.name, "a");
            assert_eq!(
                aligned.files,
                vec![PathBuf::from("aligned.prm7"), PathBuf::from("aligned.rst7")]
            );
            let received = fs::read_to_string(dir.path().join("received.csv")).unwrap();
            assert_eq!(received, "0,1\n1,0\n");
            let args = recorded_args(&dir, "align");
            assert_eq!(args[2..4], ["--output-dir", dir.path().to_str().unwrap()]);
            assert!(scratch_files(&dir).is_empty());
        }

        #[test]
        fn scratch_mapping_never_touches_user_files() {
            let (dir, engine) = install_helper();
            let user_mapping = dir.path().join("mapping.csv");
            fs::write(&user_mapping, "# mine\n5,5\n").unwrap();

            engine
                .rmsd_align(&ligand("a"), &ligand("b"), &AtomMapping::from_pairs([(0, 0)]))
                .unwrap();

            assert_eq!(fs::read_to_string(&user_mapping).unwrap(), "# mine\n5,5\n");
            assert!(scratch_files(&dir).is_empty());
        }

        #[test]
        fn merge_forwards_each_ring_flag_combination() {
            let (dir, engine) = install_helper();
            let mapping = AtomMapping::from_pairs([(0, 0)]);

            for (breaking, size_change) in [(false, false), (true, false), (false, true), (true, true)]
            {
                let options = MergeOptions {
                    allow_ring_breaking: breaking,
                    allow_ring_size_change: size_change,
                };
                let merged = engine
                    .merge(&ligand("a"), &ligand("b"), &mapping, &options)
                    .unwrap();
                assert_eq!(merged.files, vec![PathBuf::from("merged.s3")]);

                let args = recorded_args(&dir, "merge");
                assert_eq!(
                    args.iter().any(|a| a == "--allow-ring-breaking"),
                    breaking,
                    "ring breaking flag for {options:?}"
                );
                assert_eq!(
                    args.iter().any(|a| a == "--allow-ring-size-change"),
                    size_change,
                    "ring size change flag for {options:?}"
                );
                assert_eq!(args[args.len() - 4..], ["--mol0", "a.prm7", "--mol1", "b.prm7"]);
            }
            assert!(scratch_files(&dir).is_empty());
        }

        #[test]
        fn failing_step_reports_status_and_stderr() {
            let (dir, engine) = install_helper();
            let merged = MergedSystem {
                files: vec![PathBuf::from("merged.s3")],
            };
            let result = engine.write_inputs(&merged, dir.path(), "somd");
            match result {
                Err(EngineError::CommandFailed { step, stderr, .. }) => {
                    assert_eq!(step, "write-inputs");
                    assert!(stderr.contains("disk quota exceeded"));
                }
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(
                recorded_args(&dir, "write-inputs"),
                vec![
                    "--name".to_string(),
                    "somd".to_string(),
                    "--output-dir".to_string(),
                    dir.path().display().to_string(),
                    "--merged".to_string(),
                    "merged.s3".to_string(),
                ]
            );
        }
    }
}
