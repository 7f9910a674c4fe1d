use crate::compile::CompileSpec;
use crate::dependencies::{default_dependencies, DependencySpec};
use crate::install_root::InstallRoot;
use crate::stager::{default_manifest, ManifestEntry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PRODUCT: &str = "DriveMgr";
const DEFAULT_COMPONENT: &str = "Lume";
const DEFAULT_ELEVATE: &str = "sudo";

/// Everything an install or uninstall run needs to know.
///
/// Built once by the front end and handed to every component, so nothing
/// below the CLI looks up the home directory or the executable location.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub product_name: String,
    pub component_name: String,
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub manifest: Vec<ManifestEntry>,
    pub dependencies: Vec<DependencySpec>,
    /// Probe argument per command, for commands that don't take `--version`.
    pub probe_args: BTreeMap<String, String>,
    pub compile: CompileSpec,
    /// Privilege-escalation prefix for package-manager calls; empty for none.
    pub elevate_with: String,
}

impl InstallConfig {
    /// Defaults for a checkout at `source_root`, installing under `home`.
    pub fn new(source_root: impl Into<PathBuf>, home: &Path) -> Self {
        Self {
            product_name: DEFAULT_PRODUCT.to_string(),
            component_name: DEFAULT_COMPONENT.to_string(),
            source_root: source_root.into(),
            dest_root: default_dest_root(home, DEFAULT_PRODUCT),
            manifest: default_manifest(DEFAULT_COMPONENT),
            dependencies: default_dependencies(),
            probe_args: BTreeMap::from([("openssl".to_string(), "version".to_string())]),
            compile: CompileSpec::default(),
            elevate_with: DEFAULT_ELEVATE.to_string(),
        }
    }

    /// Defaults overridden by the TOML file at `path`.
    pub fn load(path: &Path, source_root: impl Into<PathBuf>, home: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let overlay: ConfigOverlay = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        let mut config = Self::new(source_root, home);
        config.apply(overlay, home);
        Ok(config)
    }

    fn apply(&mut self, overlay: ConfigOverlay, home: &Path) {
        if let Some(component) = overlay.component_name {
            if overlay.manifest.is_none() {
                self.manifest = default_manifest(&component);
            }
            self.component_name = component;
        }
        if let Some(product) = overlay.product_name {
            self.dest_root = default_dest_root(home, &product);
            self.product_name = product;
        }
        if let Some(dest_root) = overlay.dest_root {
            self.dest_root = expand_path(&dest_root);
        }
        if let Some(manifest) = overlay.manifest {
            self.manifest = manifest;
        }
        if let Some(dependencies) = overlay.dependencies {
            self.dependencies = dependencies;
        }
        self.probe_args.extend(overlay.probe_args);
        if let Some(compile) = overlay.compile {
            self.compile = compile;
        }
        if let Some(elevate_with) = overlay.elevate_with {
            self.elevate_with = elevate_with;
        }
    }

    pub fn install_root(&self) -> InstallRoot {
        InstallRoot::new(&self.dest_root, &self.component_name)
    }
}

/// `$HOME/.local/share/<product>`
pub fn default_dest_root(home: &Path, product: &str) -> PathBuf {
    home.join(".local/share").join(product)
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value).into_owned())
}

/// Optional overrides read from a config file; absent fields keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    product_name: Option<String>,
    component_name: Option<String>,
    dest_root: Option<String>,
    manifest: Option<Vec<ManifestEntry>>,
    dependencies: Option<Vec<DependencySpec>>,
    #[serde(default)]
    probe_args: BTreeMap<String, String>,
    compile: Option<CompileSpec>,
    elevate_with: Option<String>,
}
