//! Enumeration types for registry vocabularies and tool parameters.

use serde::{Deserialize, Serialize};

/// Canonical trial phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "EARLY_PHASE_1")]
    EarlyPhase1,
    #[serde(rename = "PHASE_1")]
    Phase1,
    /// Filter-only: expands to phase 1 and phase 2.
    #[serde(rename = "PHASE_1_2")]
    Phase1And2,
    #[serde(rename = "PHASE_2")]
    Phase2,
    /// Filter-only: expands to phase 2 and phase 3.
    #[serde(rename = "PHASE_2_3")]
    Phase2And3,
    #[serde(rename = "PHASE_3")]
    Phase3,
    #[serde(rename = "PHASE_4")]
    Phase4,
    #[serde(rename = "NOT_APPLICABLE")]
    NotApplicable,
}

impl Phase {
    /// Registry tokens a phase filter expands to.
    #[must_use]
    pub const fn upstream_tokens(self) -> &'static [&'static str] {
        match self {
            Self::EarlyPhase1 => &["EARLY_PHASE1"],
            Self::Phase1 => &["PHASE1"],
            Self::Phase1And2 => &["PHASE1", "PHASE2"],
            Self::Phase2 => &["PHASE2"],
            Self::Phase2And3 => &["PHASE2", "PHASE3"],
            Self::Phase3 => &["PHASE3"],
            Self::Phase4 => &["PHASE4"],
            Self::NotApplicable => &["NA"],
        }
    }

    /// Map a single registry phase token. Unknown tokens yield `None`.
    #[must_use]
    pub fn from_upstream(token: &str) -> Option<Self> {
        match token {
            "EARLY_PHASE1" => Some(Self::EarlyPhase1),
            "PHASE1" => Some(Self::Phase1),
            "PHASE2" => Some(Self::Phase2),
            "PHASE3" => Some(Self::Phase3),
            "PHASE4" => Some(Self::Phase4),
            "NA" | "NOT_APPLICABLE" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EarlyPhase1 => "EARLY_PHASE_1",
            Self::Phase1 => "PHASE_1",
            Self::Phase1And2 => "PHASE_1_2",
            Self::Phase2 => "PHASE_2",
            Self::Phase2And3 => "PHASE_2_3",
            Self::Phase3 => "PHASE_3",
            Self::Phase4 => "PHASE_4",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

/// Overall recruitment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    NotYetRecruiting,
    Recruiting,
    EnrollingByInvitation,
    ActiveNotRecruiting,
    Suspended,
    Terminated,
    Withdrawn,
    Completed,
    /// Catch-all for values outside the enumeration.
    UnknownStatus,
}

impl OverallStatus {
    /// Map a registry status. Any unrecognized value folds to [`Self::UnknownStatus`].
    #[must_use]
    pub fn from_upstream(value: &str) -> Self {
        match value {
            "NOT_YET_RECRUITING" => Self::NotYetRecruiting,
            "RECRUITING" => Self::Recruiting,
            "ENROLLING_BY_INVITATION" => Self::EnrollingByInvitation,
            "ACTIVE_NOT_RECRUITING" => Self::ActiveNotRecruiting,
            "SUSPENDED" => Self::Suspended,
            "TERMINATED" => Self::Terminated,
            "WITHDRAWN" => Self::Withdrawn,
            "COMPLETED" => Self::Completed,
            _ => Self::UnknownStatus,
        }
    }

    /// Canonical name, also the registry's own token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotYetRecruiting => "NOT_YET_RECRUITING",
            Self::Recruiting => "RECRUITING",
            Self::EnrollingByInvitation => "ENROLLING_BY_INVITATION",
            Self::ActiveNotRecruiting => "ACTIVE_NOT_RECRUITING",
            Self::Suspended => "SUSPENDED",
            Self::Terminated => "TERMINATED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Completed => "COMPLETED",
            Self::UnknownStatus => "UNKNOWN_STATUS",
        }
    }
}

/// Study type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyType {
    Interventional,
    Observational,
    ExpandedAccess,
}

impl StudyType {
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "INTERVENTIONAL" => Some(Self::Interventional),
            "OBSERVATIONAL" => Some(Self::Observational),
            "EXPANDED_ACCESS" => Some(Self::ExpandedAccess),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interventional => "INTERVENTIONAL",
            Self::Observational => "OBSERVATIONAL",
            Self::ExpandedAccess => "EXPANDED_ACCESS",
        }
    }
}

/// Sponsor or collaborator classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SponsorClass {
    Nih,
    OtherGov,
    Industry,
    Other,
    Unknown,
}

impl SponsorClass {
    /// Map a registry class. Values outside the set fold to [`Self::Unknown`].
    #[must_use]
    pub fn from_upstream(value: &str) -> Self {
        match value {
            "NIH" => Self::Nih,
            "OTHER_GOV" => Self::OtherGov,
            "INDUSTRY" => Self::Industry,
            "OTHER" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

/// Whether an enrollment count is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentType {
    Actual,
    Estimated,
}

/// Outcome measure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeType {
    Primary,
    Secondary,
    Other,
}

/// Arm group type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArmType {
    Experimental,
    ActiveComparator,
    PlaceboComparator,
    ShamComparator,
    NoIntervention,
    Other,
}

impl ArmType {
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "EXPERIMENTAL" => Some(Self::Experimental),
            "ACTIVE_COMPARATOR" => Some(Self::ActiveComparator),
            "PLACEBO_COMPARATOR" => Some(Self::PlaceboComparator),
            "SHAM_COMPARATOR" => Some(Self::ShamComparator),
            "NO_INTERVENTION" => Some(Self::NoIntervention),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Allocation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allocation {
    #[serde(rename = "RANDOMIZED")]
    Randomized,
    #[serde(rename = "NON_RANDOMIZED")]
    NonRandomized,
    #[serde(rename = "NA")]
    NotApplicable,
}

impl Allocation {
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "RANDOMIZED" => Some(Self::Randomized),
            "NON_RANDOMIZED" => Some(Self::NonRandomized),
            "NA" => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

/// Eligible sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    All,
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "ALL" => Some(Self::All),
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Standardized age bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandardAge {
    Child,
    Adult,
    OlderAdult,
}

impl StandardAge {
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "CHILD" => Some(Self::Child),
            "ADULT" => Some(Self::Adult),
            "OLDER_ADULT" => Some(Self::OlderAdult),
            _ => None,
        }
    }
}

/// Sortable trial fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrialsSortField {
    /// Upstream default ordering.
    #[default]
    Relevance,
    LastUpdatePosted,
    FirstPosted,
    StartDate,
    PrimaryCompletionDate,
    CompletionDate,
    /// Any field name not listed above. Sends no sort.
    #[serde(other)]
    Unrecognized,
}

impl TrialsSortField {
    /// Registry sort key. Relevance and unrecognized fields have none.
    #[must_use]
    pub const fn upstream_key(self) -> Option<&'static str> {
        match self {
            Self::Relevance | Self::Unrecognized => None,
            Self::LastUpdatePosted => Some("LastUpdatePostDate"),
            Self::FirstPosted => Some("StudyFirstPostDate"),
            Self::StartDate => Some("StartDate"),
            Self::PrimaryCompletionDate => Some("PrimaryCompletionDate"),
            Self::CompletionDate => Some("CompletionDate"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_upstream(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Named groups of registry fields a search may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrialIncludeField {
    NctId,
    Titles,
    OverallStatus,
    Phases,
    StudyType,
    Enrollment,
    Sponsors,
    Conditions,
    Interventions,
    Countries,
    FirstPosted,
    LastUpdatePosted,
    StartDate,
    PrimaryCompletionDate,
    CompletionDate,
}

impl TrialIncludeField {
    /// Every group that feeds a trial summary.
    pub const ALL: &'static [Self] = &[
        Self::NctId,
        Self::Titles,
        Self::OverallStatus,
        Self::Phases,
        Self::StudyType,
        Self::Enrollment,
        Self::Sponsors,
        Self::Conditions,
        Self::Interventions,
        Self::Countries,
        Self::FirstPosted,
        Self::LastUpdatePosted,
        Self::StartDate,
        Self::PrimaryCompletionDate,
        Self::CompletionDate,
    ];

    /// Registry field paths for this group.
    #[must_use]
    pub const fn upstream_paths(self) -> &'static [&'static str] {
        match self {
            Self::NctId => &[crate::config::NCT_ID_FIELD],
            Self::Titles => &[
                "protocolSection.identificationModule.briefTitle",
                "protocolSection.identificationModule.officialTitle",
                "protocolSection.identificationModule.acronym",
            ],
            Self::OverallStatus => &["protocolSection.statusModule.overallStatus"],
            Self::Phases => &["protocolSection.designModule.phases"],
            Self::StudyType => &["protocolSection.designModule.studyType"],
            Self::Enrollment => &["protocolSection.designModule.enrollmentInfo"],
            Self::Sponsors => &["protocolSection.sponsorCollaboratorsModule"],
            Self::Conditions => &["protocolSection.conditionsModule.conditions"],
            Self::Interventions => &[
                "protocolSection.armsInterventionsModule.interventions",
                "protocolSection.armsInterventionsModule.armGroups",
            ],
            Self::Countries => &["protocolSection.contactsLocationsModule.locations"],
            Self::FirstPosted => &["protocolSection.statusModule.studyFirstPostDateStruct"],
            Self::LastUpdatePosted => &["protocolSection.statusModule.lastUpdatePostDateStruct"],
            Self::StartDate => &["protocolSection.statusModule.startDateStruct"],
            Self::PrimaryCompletionDate => {
                &["protocolSection.statusModule.primaryCompletionDateStruct"]
            }
            Self::CompletionDate => &["protocolSection.statusModule.completionDateStruct"],
        }
    }
}

/// Aggregation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupByKey {
    Phase,
    OverallStatus,
    LeadSponsor,
    Country,
    FirstPostedMonth,
    LastUpdatePostedMonth,
}

/// Aggregation metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateMetric {
    CountTrials,
}

/// Attribute selectable by `compare_trials`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareAttribute {
    Phases,
    OverallStatus,
    Enrollment,
    LeadSponsor,
    Collaborators,
    Conditions,
    Interventions,
    Arms,
    Eligibility,
    OutcomesPrimary,
    OutcomesSecondary,
    StartDate,
    PrimaryCompletionDate,
    CompletionDate,
    Countries,
}

/// Literature search ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PubmedSort {
    Relevance,
    PubDate,
}

impl PubmedSort {
    #[must_use]
    pub const fn as_upstream(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PubDate => "pub_date",
        }
    }
}
