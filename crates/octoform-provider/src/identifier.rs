//! Deployment process identifiers
//!
//! Processes of database-backed projects carry the server ID. Processes of
//! version-controlled projects have no server ID of their own and are
//! tracked locally as `deploymentprocess-<project>-<branch>`.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const COMPOSITE_PREFIX: &str = "deploymentprocess-";

static PROJECT_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Projects-\d+").ok());

static COMPOSITE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^deploymentprocess-(Projects-\d+)-(.+)$").ok());

static GIT_REF_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+-\w+").ok());

/// Identifier of a deployment process resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessId {
    /// Server-assigned ID
    Simple(String),
    /// Project plus branch of a version-controlled process
    VersionControlled { project_id: String, branch: String },
}

impl ProcessId {
    pub fn version_controlled(project_id: impl Into<String>, branch: impl Into<String>) -> Self {
        ProcessId::VersionControlled {
            project_id: project_id.into(),
            branch: branch.into(),
        }
    }

    /// Classify a stored identifier
    ///
    /// Everything after `deploymentprocess-<project>-` is the branch, so
    /// refs may contain `-`, `/` and `.`. Other shapes fall back to the
    /// first `<n>-<word>` run.
    pub fn parse(raw: &str) -> Self {
        if let Some(captures) = COMPOSITE_PATTERN.as_ref().and_then(|p| p.captures(raw)) {
            if let (Some(project_id), Some(branch)) = (captures.get(1), captures.get(2)) {
                return Self::version_controlled(project_id.as_str(), branch.as_str());
            }
        }

        match (project_id_of(raw), git_ref_of(raw)) {
            (Some(project_id), Some(branch)) => Self::version_controlled(project_id, branch),
            _ => ProcessId::Simple(raw.to_string()),
        }
    }

    /// Owning project, also recovered from simple IDs such as
    /// `deploymentprocess-Projects-1`
    pub fn project_id(&self) -> Option<&str> {
        match self {
            ProcessId::Simple(id) => project_id_of(id),
            ProcessId::VersionControlled { project_id, .. } => Some(project_id),
        }
    }

    /// Git ref encoded in the identifier
    pub fn git_ref(&self) -> Option<&str> {
        match self {
            ProcessId::Simple(_) => None,
            ProcessId::VersionControlled { branch, .. } => Some(branch),
        }
    }

    pub fn is_version_controlled(&self) -> bool {
        matches!(self, ProcessId::VersionControlled { .. })
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Simple(id) => f.write_str(id),
            ProcessId::VersionControlled { project_id, branch } => {
                write!(f, "{}{}-{}", COMPOSITE_PREFIX, project_id, branch)
            }
        }
    }
}

/// First `Projects-<n>` in `raw`
fn project_id_of(raw: &str) -> Option<&str> {
    PROJECT_ID_PATTERN
        .as_ref()?
        .find(raw)
        .map(|m| m.as_str())
}

/// Word after the first number: `Projects-123-main` gives `main`
fn git_ref_of(raw: &str) -> Option<&str> {
    let found = GIT_REF_PATTERN.as_ref()?.find(raw)?;
    found
        .as_str()
        .split('-')
        .nth(1)
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_round_trip() {
        let id = ProcessId::version_controlled("Projects-123", "main");
        assert_eq!(id.to_string(), "deploymentprocess-Projects-123-main");
        assert_eq!(ProcessId::parse("deploymentprocess-Projects-123-main"), id);
    }

    #[test]
    fn test_simple_id() {
        let id = ProcessId::parse("deploymentprocess-Projects-123");
        assert_eq!(
            id,
            ProcessId::Simple("deploymentprocess-Projects-123".to_string())
        );
        assert_eq!(id.project_id(), Some("Projects-123"));
        assert_eq!(id.git_ref(), None);
        assert!(!id.is_version_controlled());
    }

    #[test]
    fn test_unrelated_id() {
        let id = ProcessId::parse("DeploymentProcesses-1");
        assert_eq!(id.project_id(), None);
        assert_eq!(id.to_string(), "DeploymentProcesses-1");
    }

    #[test]
    fn test_branch_with_hyphens() {
        let id = ProcessId::parse("deploymentprocess-Projects-7-feature-login");
        assert_eq!(id.git_ref(), Some("feature-login"));
        assert_eq!(id.project_id(), Some("Projects-7"));
        assert_eq!(id.to_string(), "deploymentprocess-Projects-7-feature-login");
    }

    #[test]
    fn test_branch_with_slash_and_dot() {
        let id = ProcessId::parse("deploymentprocess-Projects-7-release/1.0");
        assert_eq!(id, ProcessId::version_controlled("Projects-7", "release/1.0"));
    }

    #[test]
    fn test_git_ref_without_composite_prefix() {
        let id = ProcessId::parse("Projects-7-main");
        assert_eq!(id, ProcessId::version_controlled("Projects-7", "main"));
    }

    #[test]
    fn test_git_ref_with_underscores() {
        let id = ProcessId::parse("deploymentprocess-Projects-7-release_2024");
        assert_eq!(id.git_ref(), Some("release_2024"));
    }
}
