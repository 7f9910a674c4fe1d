use crate::install_root::InstallRoot;
use crate::outcome::Outcome;
use crate::runner::{CommandRunner, Invocation};
use crate::ui;
use serde::Deserialize;
use std::path::PathBuf;

/// Native compile of the staged CLI sources.
///
/// `source` and `output` are relative to the installation root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileSpec {
    pub compiler: String,
    pub standard: String,
    pub source: PathBuf,
    pub include_dir: String,
    pub output: PathBuf,
    #[serde(default)]
    pub libraries: Vec<String>,
}

impl Default for CompileSpec {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            standard: "c++17".to_string(),
            source: PathBuf::from("bin/other_src/DriveMgr_CLI/src/DriveMgr_experi.cpp"),
            include_dir: "..".to_string(),
            output: PathBuf::from("bin/bin/DriveMgr_CLI"),
            libraries: vec!["ssl".to_string(), "crypto".to_string()],
        }
    }
}

impl CompileSpec {
    /// `<compiler> -std=<standard> <source> -I<include> -o <output> -l<lib>...`
    pub fn invocation(&self, install: &InstallRoot) -> Invocation {
        let mut args = vec![
            format!("-std={}", self.standard),
            install.root().join(&self.source).display().to_string(),
            format!("-I{}", self.include_dir),
            "-o".to_string(),
            install.root().join(&self.output).display().to_string(),
        ];
        args.extend(self.libraries.iter().map(|lib| format!("-l{lib}")));
        Invocation::new(&self.compiler, args)
    }

    pub fn compile(&self, runner: &dyn CommandRunner, install: &InstallRoot) -> Outcome {
        let invocation = self.invocation(install);
        let progress = ui::Progress::new("Compiling", self.output.display().to_string());

        match runner.run(&invocation) {
            Ok(output) if output.success() => {
                progress.success("Compiled", None);
                Outcome::Completed
            }
            Ok(output) => {
                let reason = match output.code {
                    Some(code) => format!("{} exited with code {code}", self.compiler),
                    None => format!("{} was terminated by a signal", self.compiler),
                };
                tracing::debug!(command = %invocation, %reason, "compile failed");
                progress.fail("Error", &reason);
                Outcome::Failed(reason)
            }
            Err(error) => {
                let reason = format!("failed to run {}: {error}", self.compiler);
                tracing::debug!(command = %invocation, %reason, "compile failed");
                progress.fail("Error", &reason);
                Outcome::Failed(reason)
            }
        }
    }
}
