//! Packing, authorization and submission of artifacts.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use tracing::{debug, info};

use crate::collaborator::{Access, PackageRegistry, Prompter, PublishRequest};
use crate::context::PublishFlags;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::reporter::Display;

static OTP_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("otp pattern is valid"));

pub const CONFIRM_PUBLISH: &str = "Are you sure you want to publish?";
pub const CONFIRM_UNSAFE_PUBLISH: &str =
    "Are you sure you want to publish without any safeguards?";
pub const OTP_QUESTION: &str = "Please enter your npm OTP code";
pub const CANCELLED: &str = "Publication cancelled";

/// Whether publish runs its safeguards first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Outdated check, rebuild and tests before packing.
    Safe,
    /// Straight to packing.
    Unsafe,
}

/// Distribution tag for a version: `latest` unless it is a pre-release.
pub fn tag_for(version: &Version) -> &'static str {
    if version.pre.is_empty() {
        "latest"
    } else {
        "next"
    }
}

/// File name the registry client gives a packed unit.
///
/// Scoped names drop the `@` and turn `/` into `-`, so `@scope/pkg` at
/// `1.0.0` packs to `scope-pkg-1.0.0.tgz`.
pub fn artifact_file_name(name: &str, version: &str) -> String {
    let encoded = name.trim_start_matches('@').replace('/', "-");
    format!("{}-{}.tgz", encoded, version)
}

/// A packed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Otp(String),
    Confirmed,
}

impl Authorization {
    pub fn otp(&self) -> Option<&str> {
        match self {
            Authorization::Otp(code) => Some(code),
            Authorization::Confirmed => None,
        }
    }
}

/// Everything needed to submit a batch of artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub tag: String,
    pub restricted: bool,
    pub authorization: Authorization,
    pub artifacts: Vec<Artifact>,
}

impl PublishPlan {
    pub fn requests(&self) -> Vec<PublishRequest> {
        self.artifacts
            .iter()
            .map(|artifact| PublishRequest {
                artifact: artifact.path.clone(),
                tag: self.tag.clone(),
                access: Access::from_restricted(self.restricted),
                otp: self.authorization.otp().map(str::to_string),
            })
            .collect()
    }
}

/// Packs one unit into `into` and checks the artifact landed where expected.
///
/// # Errors
///
/// Returns [`Error::ArtifactNameMismatch`] when the expected file is absent.
pub async fn pack(
    registry: &dyn PackageRegistry,
    root: &Path,
    into: &Path,
    display: &Display,
) -> Result<Artifact> {
    let manifest = Manifest::load(root)?;
    let name = manifest
        .name()
        .ok_or_else(|| Error::invalid(manifest.path().display().to_string(), "missing 'name'"))?
        .to_string();
    let version = manifest
        .version_str()
        .ok_or_else(|| Error::VersionUnavailable(manifest.path().to_path_buf()))?
        .to_string();

    registry.pack(root, into, display).await?;

    let path = into.join(artifact_file_name(&name, &version));
    if !path.is_file() {
        return Err(Error::ArtifactNameMismatch(path));
    }

    debug!(artifact = %path.display(), "packed");
    Ok(Artifact {
        path,
        name,
        version,
    })
}

/// Asks for permission to publish.
///
/// In OTP mode the code is asked again until it has six digits; an empty
/// answer declines. Otherwise a single yes/no confirmation is asked.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] when the user declines.
pub async fn authorize(
    prompter: &dyn Prompter,
    flags: PublishFlags,
    display: &Display,
) -> Result<Authorization> {
    if flags.use_otp {
        loop {
            match prompter.otp(OTP_QUESTION).await? {
                None => return Err(Error::Cancelled(CANCELLED.to_string())),
                Some(code) if code.trim().is_empty() => {
                    return Err(Error::Cancelled(CANCELLED.to_string()))
                }
                Some(code) if OTP_FORMAT.is_match(code.trim()) => {
                    return Ok(Authorization::Otp(code.trim().to_string()))
                }
                Some(_) => display.warning("The OTP code must be 6 digits"),
            }
        }
    }

    if prompter.confirm(CONFIRM_PUBLISH).await? {
        Ok(Authorization::Confirmed)
    } else {
        Err(Error::Cancelled(CANCELLED.to_string()))
    }
}

/// Submits every artifact of the plan, in order.
pub async fn submit(
    registry: &dyn PackageRegistry,
    plan: &PublishPlan,
    display: &Display,
) -> Result<()> {
    for request in plan.requests() {
        let file = request
            .artifact
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        display.print(&format!("Publish tarball {}", file));
        info!(artifact = %file, tag = %request.tag, access = request.access.as_str(), "publishing");
        registry.publish(&request, display).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_for() {
        assert_eq!(tag_for(&Version::parse("1.2.3").unwrap()), "latest");
        assert_eq!(tag_for(&Version::parse("1.2.3-rc.1").unwrap()), "next");
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("kafe", "1.0.0"), "kafe-1.0.0.tgz");
        assert_eq!(
            artifact_file_name("@absolunet/kafe", "1.0.0-beta.2"),
            "absolunet-kafe-1.0.0-beta.2.tgz"
        );
    }

    #[test]
    fn test_requests_carry_plan_settings() {
        let plan = PublishPlan {
            tag: "next".to_string(),
            restricted: true,
            authorization: Authorization::Otp("123456".to_string()),
            artifacts: vec![
                Artifact {
                    path: PathBuf::from("/tmp/a-1.0.0.tgz"),
                    name: "a".to_string(),
                    version: "1.0.0".to_string(),
                },
                Artifact {
                    path: PathBuf::from("/tmp/b-1.0.0.tgz"),
                    name: "b".to_string(),
                    version: "1.0.0".to_string(),
                },
            ],
        };

        let requests = plan.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.access == Access::Restricted));
        assert!(requests.iter().all(|r| r.otp.as_deref() == Some("123456")));
        assert_eq!(requests[1].artifact, PathBuf::from("/tmp/b-1.0.0.tgz"));
    }
}
