//! Data models for tool inputs and normalized registry entities.
//!
//! Output models skip absent optionals and empty lists when serialized.
//! Enumerations serialize as `SCREAMING_SNAKE_CASE`.

mod citation;
mod enums;
mod inputs;
mod trial;

pub use citation::{Citation, CitationSource};
pub use enums::{
    AggregateMetric, Allocation, ArmType, CompareAttribute, EnrollmentType, GroupByKey,
    OutcomeType, OverallStatus, Phase, PubmedSort, Sex, SortDirection, SponsorClass, StandardAge,
    StudyType, TrialIncludeField, TrialsSortField,
};
pub use inputs::*;
pub use trial::{
    Arm, Country, Eligibility, Enrollment, FullTrialRecord, Outcome, RecordSource, Sponsor,
    StudyDesign, TrialSummary,
};
