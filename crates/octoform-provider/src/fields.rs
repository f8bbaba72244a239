//! Attribute keys shared by every resource schema

use std::fmt;

/// Configuration and state attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // common
    Id,
    Name,
    Description,
    ProjectId,
    SpaceId,
    Properties,

    // deployment process
    Branch,
    LastSnapshotId,
    Version,
    Step,
    TargetRoles,
    Condition,
    StartTrigger,
    PackageRequirement,
    WindowSize,
    Action,
    ActionType,
    IsDisabled,
    IsRequired,
    RunOnServer,
    WorkerPoolId,
    Environments,
    ExcludedEnvironments,
    Channels,
    TenantTags,
    Package,
    PackageId,
    FeedId,
    AcquisitionLocation,

    // deployment target trigger
    ShouldRedeploy,
    EventGroups,
    EventCategories,
    Roles,
    EnvironmentIds,

    // lifecycle
    Phase,
    AutomaticDeploymentTargets,
    OptionalDeploymentTargets,
    MinimumEnvironmentsBeforePromotion,
    IsOptionalPhase,
    ReleaseRetentionPolicy,
    TentacleRetentionPolicy,
    QuantityToKeep,
    Unit,
    ShouldKeepForever,
}

impl Field {
    pub const fn key(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Description => "description",
            Field::ProjectId => "project_id",
            Field::SpaceId => "space_id",
            Field::Properties => "properties",
            Field::Branch => "branch",
            Field::LastSnapshotId => "last_snapshot_id",
            Field::Version => "version",
            Field::Step => "step",
            Field::TargetRoles => "target_roles",
            Field::Condition => "condition",
            Field::StartTrigger => "start_trigger",
            Field::PackageRequirement => "package_requirement",
            Field::WindowSize => "window_size",
            Field::Action => "action",
            Field::ActionType => "action_type",
            Field::IsDisabled => "is_disabled",
            Field::IsRequired => "is_required",
            Field::RunOnServer => "run_on_server",
            Field::WorkerPoolId => "worker_pool_id",
            Field::Environments => "environments",
            Field::ExcludedEnvironments => "excluded_environments",
            Field::Channels => "channels",
            Field::TenantTags => "tenant_tags",
            Field::Package => "package",
            Field::PackageId => "package_id",
            Field::FeedId => "feed_id",
            Field::AcquisitionLocation => "acquisition_location",
            Field::ShouldRedeploy => "should_redeploy",
            Field::EventGroups => "event_groups",
            Field::EventCategories => "event_categories",
            Field::Roles => "roles",
            Field::EnvironmentIds => "environment_ids",
            Field::Phase => "phase",
            Field::AutomaticDeploymentTargets => "automatic_deployment_targets",
            Field::OptionalDeploymentTargets => "optional_deployment_targets",
            Field::MinimumEnvironmentsBeforePromotion => "minimum_environments_before_promotion",
            Field::IsOptionalPhase => "is_optional_phase",
            Field::ReleaseRetentionPolicy => "release_retention_policy",
            Field::TentacleRetentionPolicy => "tentacle_retention_policy",
            Field::QuantityToKeep => "quantity_to_keep",
            Field::Unit => "unit",
            Field::ShouldKeepForever => "should_keep_forever",
        }
    }
}

impl AsRef<str> for Field {
    fn as_ref(&self) -> &str {
        self.key()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.key().to_string()
    }
}
