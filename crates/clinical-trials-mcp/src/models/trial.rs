//! Canonical trial records produced by the normalizer.
//!
//! Optional attributes are skipped when absent and list attributes when empty,
//! so serialized records never contain `null` placeholders.

use serde::{Deserialize, Serialize};

use super::enums::{
    Allocation, ArmType, EnrollmentType, OutcomeType, OverallStatus, Phase, Sex, SponsorClass,
    StandardAge, StudyType,
};

/// Enrollment count with its actual/estimated flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub count: u64,
    #[serde(rename = "type")]
    pub kind: EnrollmentType,
}

/// Lead sponsor or collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<SponsorClass>,
}

/// A resolved location country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// Country name as the registry spelled it.
    pub name: String,
}

/// Summary projection of a registry study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub nct_id: String,

    /// Brief title, falling back to the official title, then to the identifier.
    pub brief_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<OverallStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<Phase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_type: Option<StudyType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_sponsor: Option<Sponsor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<Sponsor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interventions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<Country>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_posted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_posted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_completion_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
}

impl TrialSummary {
    /// A summary holding only an identifier, titled with the identifier.
    #[must_use]
    pub fn bare(nct_id: impl Into<String>) -> Self {
        let nct_id = nct_id.into();
        Self {
            brief_title: nct_id.clone(),
            nct_id,
            official_title: None,
            acronym: None,
            overall_status: None,
            phases: Vec::new(),
            study_type: None,
            enrollment: None,
            lead_sponsor: None,
            collaborators: Vec::new(),
            conditions: Vec::new(),
            interventions: Vec::new(),
            countries: Vec::new(),
            first_posted: None,
            last_update_posted: None,
            start_date: None,
            primary_completion_date: None,
            completion_date: None,
        }
    }
}

/// Classified outcome measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "type")]
    pub kind: OutcomeType,
    pub measure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Arm or intervention group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arm {
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArmType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub interventions: Vec<String>,
}

/// Eligibility criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_volunteers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_age: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_age: Vec<StandardAge>,
}

impl Eligibility {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Study design attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDesign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_purpose: Option<String>,
}

impl StudyDesign {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Provenance of a full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSource {
    /// Always `CLINICALTRIALS_GOV`.
    pub registry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Full projection of a registry study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullTrialRecord {
    #[serde(flatten)]
    pub summary: TrialSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_design: Option<StudyDesign>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arms: Vec<Arm>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,

    /// Primary outcomes first, then secondary, then other.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<Outcome>,

    pub source: RecordSource,
}
