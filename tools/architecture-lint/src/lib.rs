//! Repo-local architectural lint for the Report IT client's hexagonal
//! boundaries.
//!
//! The client crate is split into `domain` (entities, services, ports),
//! `inbound` (the CLI), and `outbound` (HTTP backend and credential file).
//! This crate parses every source file under those directories and:
//!
//! - forbids `domain` code from depending on adapter modules, the settings
//!   module, or transport, storage, and CLI crates
//! - forbids `inbound` code from importing `outbound` modules or reaching
//!   for transport and storage crates directly
//! - forbids `outbound` code from importing `inbound` modules or CLI crates
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;

/// Name under which integration code refers to the client crate.
const CLIENT_CRATE: &str = "reportit";

/// Dependency rules for one layer of the client crate.
#[derive(Debug, Clone, Copy)]
struct LayerRule {
    /// Directory under `client/src` and the name used in messages.
    name: &'static str,
    /// Sibling modules the layer must not reach.
    modules: &'static [&'static str],
    /// External crates the layer must not use.
    crates: &'static [&'static str],
}

const LAYERS: [LayerRule; 3] = [
    LayerRule {
        name: "domain",
        modules: &["config", "inbound", "outbound"],
        crates: &[
            "cap_std",
            "clap",
            "color_eyre",
            "ortho_config",
            "reqwest",
            "serde_json",
            "tracing_subscriber",
            "url",
        ],
    },
    LayerRule {
        name: "inbound",
        modules: &["outbound"],
        crates: &["cap_std", "reqwest", "serde_json"],
    },
    LayerRule {
        name: "outbound",
        modules: &["inbound"],
        crates: &["clap", "color_eyre", "ortho_config"],
    },
];

impl LayerRule {
    fn for_file(file: &Path) -> Option<Self> {
        let Some(Component::Normal(first)) = file.components().next() else {
            return None;
        };
        LAYERS
            .into_iter()
            .find(|rule| first.to_str() == Some(rule.name))
    }

    fn check(self, file: &Path, paths: &BTreeSet<Vec<String>>) -> Vec<Violation> {
        let mut messages = BTreeSet::new();
        for path in paths {
            match classify(path) {
                Some(Target::Module(root)) if self.modules.contains(&root) => {
                    messages.insert(format!(
                        "{} module must not depend on crate::{root}",
                        self.name
                    ));
                }
                Some(Target::Crate(root)) if self.crates.contains(&root) => {
                    messages.insert(format!(
                        "{} module must not depend on external crate `{root}`",
                        self.name
                    ));
                }
                _ => {}
            }
        }
        messages
            .into_iter()
            .map(|message| Violation {
                file: file.to_path_buf(),
                message,
            })
            .collect()
    }
}

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: PathBuf,
    /// Which rule was broken.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Why a lint run did not pass.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// The source tree could not be walked or read.
    Io(io::Error),
    /// A file sits outside the known layers or is not valid Rust.
    Parse { file: PathBuf, message: String },
    /// At least one boundary rule was broken.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read client sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "could not lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} layer boundary violation(s):", violations.len())?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "  {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Io(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: PathBuf,
    /// Rust source text.
    pub contents: String,
}

/// Lint the client crate sources on disk.
///
/// `client_dir` must be the `client/` directory at the repository root.
/// Only the `domain`, `inbound`, and `outbound` trees are read; a missing
/// tree is skipped.
pub fn lint_client_sources(client_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src = Dir::open_ambient_dir(client_dir.join("src"), ambient_authority())?;
    let mut sources = Vec::new();
    for rule in LAYERS {
        match src.open_dir(rule.name) {
            Ok(dir) => read_tree(&dir, Path::new(rule.name), &mut sources)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    sources.sort_by(|left, right| left.file.cmp(&right.file));
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let parse_error = |message: String| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message,
        };
        let rule = LayerRule::for_file(&source.file)
            .ok_or_else(|| parse_error("file is not under domain, inbound, or outbound".to_owned()))?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;

        let mut collector = PathCollector::default();
        collector.visit_file(&parsed);
        violations.extend(rule.check(&source.file, &collector.paths));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

/// What a path refers to, once relative prefixes are stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> {
    /// A top-level module of the client crate.
    Module(&'a str),
    /// An external crate.
    Crate(&'a str),
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn classify(path: &[String]) -> Option<Target<'_>> {
    let first = path.first()?.as_str();
    if is_relative(first) {
        return path
            .iter()
            .find(|segment| !is_relative(segment))
            .map(|segment| Target::Module(segment.as_str()));
    }
    if first == CLIENT_CRATE {
        return path.get(1).map(|segment| Target::Module(segment.as_str()));
    }
    // 2018-style bare paths to a sibling layer, e.g. `use outbound::http`.
    if LAYERS.iter().any(|rule| rule.name == first) {
        return Some(Target::Module(first));
    }
    Some(Target::Crate(first))
}

/// Every path mentioned in a file: `use` trees flattened, plus expression
/// and type paths.
#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn flatten_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.flatten_use(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                self.insert_with(prefix, ident.to_string());
            }
            syn::UseTree::Glob(_) => self.insert_with(prefix, "*".to_owned()),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.flatten_use(item, prefix);
                }
            }
        }
    }

    fn insert_with(&mut self, prefix: &[String], last: String) {
        let mut path = prefix.to_vec();
        path.push(last);
        self.paths.insert(path);
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let path: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !path.is_empty() {
            self.paths.insert(path);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.flatten_use(&node.tree, &mut Vec::new());
    }
}

fn read_tree(
    dir: &Dir,
    relative: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry.file_name();
        let path = relative.join(&name);
        if entry.file_type()?.is_dir() {
            read_tree(&dir.open_dir(&name)?, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            sources.push(LintSource {
                contents: dir.read_to_string(&name)?,
                file: path,
            });
        }
    }
    Ok(())
}
