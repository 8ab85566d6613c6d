#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use semver::Version;
use tempfile::TempDir;

use tend_core::outdated::DependencyState;
use tend_core::publish::artifact_file_name;
use tend_core::{
    Bundler, DistributionConfig, DocumentationRequest, Documenter, Fixer, Manifest,
    MemoryReporter, OrchestrationContext, PackageRegistry, Prompter, PublishRequest, Repository,
    Result, Toolchain, WorkspaceTool,
};

/// Ordered log of every collaborator call.
#[derive(Debug, Default)]
pub struct Calls {
    entries: Mutex<Vec<String>>,
}

impl Calls {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn starting_with(&self, prefix: &str) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.all().iter().position(|c| c == entry)
    }
}

pub struct FakeRegistry {
    calls: Arc<Calls>,
    root: PathBuf,
    pub tests_pass: bool,
    pub misname_artifacts: bool,
}

fn rel(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(p) if p.as_os_str().is_empty() => ".".to_string(),
        Ok(p) => p.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[async_trait]
impl PackageRegistry for FakeRegistry {
    async fn install(&self, root: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!("registry.install:{}", rel(&self.root, root)));
        Ok(())
    }

    async fn outdated(&self, root: &Path) -> Result<Vec<DependencyState>> {
        self.calls
            .push(format!("registry.outdated:{}", rel(&self.root, root)));
        Ok(vec![DependencyState {
            name: "left-pad".to_string(),
            wanted: "^1.0.0".to_string(),
            installed: Some("1.0.0".to_string()),
            latest: Some("1.3.0".to_string()),
        }])
    }

    async fn pack(&self, root: &Path, into: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!("registry.pack:{}", rel(&self.root, root)));
        let manifest = Manifest::load(root)?;
        let name = manifest.name().unwrap_or_default();
        let version = manifest.version_str().unwrap_or_default();
        let file = if self.misname_artifacts {
            format!("{}.tgz", name.rsplit('/').next().unwrap_or(name))
        } else {
            artifact_file_name(name, version)
        };
        fs::write(into.join(file), b"tarball")?;
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest, _display: &tend_core::Display) -> Result<()> {
        let file = request
            .artifact
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.push(format!(
            "registry.publish:{}:{}:{}:{}",
            file,
            request.tag,
            request.access.as_str(),
            request.otp.as_deref().unwrap_or("-")
        ));
        Ok(())
    }

    async fn run_tests(&self, _root: &Path, _display: &tend_core::Display) -> Result<bool> {
        self.calls.push("registry.test");
        Ok(self.tests_pass)
    }

    async fn runtime_version(&self) -> Result<Version> {
        Ok(Version::new(20, 11, 1))
    }
}

pub struct FakeBundler {
    calls: Arc<Calls>,
    /// Write a decoy carrying the marker into every output directory.
    pub emit_decoys: bool,
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn run(&self, configs: &[DistributionConfig], _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!("bundler.run:{}", configs.len()));
        if self.emit_decoys {
            for config in configs {
                fs::create_dir_all(&config.output_path)?;
                fs::write(config.decoy_path(), tend_core::distribution::decoy_source())?;
            }
        }
        Ok(())
    }

    async fn watch(&self, configs: &[DistributionConfig], _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!("bundler.watch:{}", configs.len()));
        Ok(())
    }
}

pub struct FakeDocumenter {
    calls: Arc<Calls>,
    root: PathBuf,
}

#[async_trait]
impl Documenter for FakeDocumenter {
    async fn common_assets(&self, destination: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls
            .push(format!("documenter.assets:{}", rel(&self.root, destination)));
        Ok(())
    }

    async fn api(&self, request: &DocumentationRequest, _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!(
            "documenter.api:{}:{}",
            rel(&self.root, &request.destination),
            request.depth
        ));
        Ok(())
    }

    async fn text(&self, _source: &Path, destination: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls
            .push(format!("documenter.text:{}", rel(&self.root, destination)));
        Ok(())
    }
}

pub struct FakeFixer {
    calls: Arc<Calls>,
}

#[async_trait]
impl Fixer for FakeFixer {
    async fn fix(&self, _root: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls.push("fixer.fix");
        Ok(())
    }
}

pub struct FakeWorkspace {
    calls: Arc<Calls>,
    members: Vec<PathBuf>,
}

#[async_trait]
impl WorkspaceTool for FakeWorkspace {
    async fn discover(&self, _root: &Path) -> Result<Vec<PathBuf>> {
        self.calls.push("workspace.discover");
        Ok(self.members.clone())
    }

    async fn bootstrap(&self, _root: &Path, _display: &tend_core::Display) -> Result<()> {
        self.calls.push("workspace.bootstrap");
        Ok(())
    }

    async fn sync_version(&self, _root: &Path, version: &Version, _display: &tend_core::Display) -> Result<()> {
        self.calls.push(format!("workspace.sync_version:{}", version));
        Ok(())
    }
}

/// Answers questions from a script; an exhausted script declines.
#[derive(Default)]
pub struct ScriptedPrompter {
    calls: Arc<Calls>,
    otp_answers: Mutex<VecDeque<Option<String>>>,
    confirm_answers: Mutex<VecDeque<bool>>,
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn otp(&self, _message: &str) -> Result<Option<String>> {
        self.calls.push("prompter.otp");
        Ok(self.otp_answers.lock().unwrap().pop_front().flatten())
    }

    async fn confirm(&self, message: &str) -> Result<bool> {
        self.calls.push(format!("prompter.confirm:{}", message));
        Ok(self.confirm_answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// A temporary repository plus recording collaborators.
pub struct Fixture {
    pub dir: TempDir,
    pub calls: Arc<Calls>,
    pub reporter: Arc<MemoryReporter>,
    pub members: Vec<PathBuf>,
    pub tests_pass: bool,
    pub misname_artifacts: bool,
    pub emit_decoys: bool,
    pub otp_answers: Vec<Option<String>>,
    pub confirm_answers: Vec<bool>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Should create temp directory"),
            calls: Arc::new(Calls::default()),
            reporter: Arc::new(MemoryReporter::new()),
            members: Vec::new(),
            tests_pass: true,
            misname_artifacts: false,
            emit_decoys: false,
            otp_answers: Vec::new(),
            confirm_answers: Vec::new(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Should create parent directory");
        }
        fs::write(path, content).expect("Should write file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative)).expect("Should read file")
    }

    /// A single unit named `name` at `version`.
    pub fn single(name: &str, version: &str) -> Self {
        let fixture = Self::new();
        fixture.write(
            "package.json",
            &format!(
                "{{\n  \"name\": \"{name}\",\n  \"version\": \"{version}\",\n  \"devDependencies\": {{\n    \"{name}\": \"0.0.1\"\n  }}\n}}\n",
                name = name,
                version = version
            ),
        );
        fixture
    }

    /// A workspace with one member per name under `packages/`.
    pub fn multi(version: &str, members: &[&str]) -> Self {
        let mut fixture = Self::new();
        fixture.write("lerna.json", &format!("{{\"version\": \"{}\"}}", version));
        fixture.write("license", "MIT License\n");
        for member in members {
            fixture.write(
                &format!("packages/{}/package.json", member),
                &format!(
                    "{{\n  \"name\": \"@scope/{}\",\n  \"version\": \"{}\"\n}}\n",
                    member, version
                ),
            );
            fixture
                .members
                .push(fixture.dir.path().join("packages").join(member));
        }
        fixture
    }

    pub fn toolchain(&self) -> Toolchain {
        let root = self.root();
        Toolchain {
            registry: Arc::new(FakeRegistry {
                calls: Arc::clone(&self.calls),
                root: root.clone(),
                tests_pass: self.tests_pass,
                misname_artifacts: self.misname_artifacts,
            }),
            bundler: Arc::new(FakeBundler {
                calls: Arc::clone(&self.calls),
                emit_decoys: self.emit_decoys,
            }),
            documenter: Arc::new(FakeDocumenter {
                calls: Arc::clone(&self.calls),
                root,
            }),
            fixer: Arc::new(FakeFixer {
                calls: Arc::clone(&self.calls),
            }),
            workspace: Arc::new(FakeWorkspace {
                calls: Arc::clone(&self.calls),
                members: self.members.clone(),
            }),
            prompter: Arc::new(ScriptedPrompter {
                calls: Arc::clone(&self.calls),
                otp_answers: Mutex::new(self.otp_answers.iter().cloned().collect()),
                confirm_answers: Mutex::new(self.confirm_answers.iter().copied().collect()),
            }),
        }
    }

    pub async fn open(&self, context: OrchestrationContext) -> Repository {
        let display: tend_core::Display = self.reporter.clone();
        Repository::open(context, self.toolchain(), display)
            .await
            .expect("Should open repository")
    }

    /// Nested and top-level banners, in order.
    pub fn banners(&self) -> Vec<String> {
        self.reporter
            .lines()
            .into_iter()
            .filter_map(|line| match line {
                tend_core::ReportLine::Title(text) | tend_core::ReportLine::Info(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}
