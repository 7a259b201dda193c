//! Projection of a raw registry study into canonical trial records.

use serde_json::Value;

use super::countries::country_table;
use super::{array, field, is_iso_date, is_valid_nct_id, non_empty_str, unique_strings};
use crate::models::{
    Allocation, Arm, ArmType, Country, Eligibility, Enrollment, EnrollmentType, FullTrialRecord,
    Outcome, OutcomeType, OverallStatus, Phase, RecordSource, Sex, Sponsor, SponsorClass,
    StandardAge, StudyDesign, StudyType, TrialSummary,
};

/// Registry tag carried in [`RecordSource`].
pub const REGISTRY_TAG: &str = "CLINICALTRIALS_GOV";

/// Project a study into a summary.
///
/// Returns `None` when the study has no valid identifier.
#[must_use]
pub fn trial_summary(study: &Value) -> Option<TrialSummary> {
    let protocol = field(study, "protocolSection");
    let identification = field(protocol, "identificationModule");

    let nct_id = non_empty_str(field(identification, "nctId")).filter(|id| is_valid_nct_id(id))?;

    let official_title = non_empty_str(field(identification, "officialTitle")).map(str::to_string);
    let brief_title = non_empty_str(field(identification, "briefTitle"))
        .map(str::to_string)
        .or_else(|| official_title.clone())
        .unwrap_or_else(|| nct_id.to_string());

    let status = field(protocol, "statusModule");
    let design = field(protocol, "designModule");
    let sponsors = field(protocol, "sponsorCollaboratorsModule");
    let arms_interventions = field(protocol, "armsInterventionsModule");

    Some(TrialSummary {
        nct_id: nct_id.to_string(),
        brief_title,
        official_title,
        acronym: non_empty_str(field(identification, "acronym")).map(str::to_string),
        overall_status: non_empty_str(field(status, "overallStatus"))
            .map(OverallStatus::from_upstream),
        phases: phases(field(design, "phases")),
        study_type: non_empty_str(field(design, "studyType")).and_then(StudyType::from_upstream),
        enrollment: enrollment(field(design, "enrollmentInfo")),
        lead_sponsor: sponsor(field(sponsors, "leadSponsor")),
        collaborators: collaborators(field(sponsors, "collaborators")),
        conditions: unique_strings(array(field(field(protocol, "conditionsModule"), "conditions"))),
        interventions: interventions(arms_interventions),
        countries: countries(field(protocol, "contactsLocationsModule")),
        first_posted: date(field(status, "studyFirstPostDateStruct")),
        last_update_posted: date(field(status, "lastUpdatePostDateStruct")),
        start_date: date(field(status, "startDateStruct")),
        primary_completion_date: date(field(status, "primaryCompletionDateStruct")),
        completion_date: date(field(status, "completionDateStruct")),
    })
}

/// Project a study into a full record.
///
/// Returns `None` when the study has no valid identifier.
#[must_use]
pub fn full_trial_record(study: &Value) -> Option<FullTrialRecord> {
    let summary = trial_summary(study)?;

    let protocol = field(study, "protocolSection");
    let design = field(protocol, "designModule");
    let api_version = non_empty_str(field(
        field(field(study, "derivedSection"), "miscInfoModule"),
        "versionHolder",
    ))
    .map(str::to_string);

    Some(FullTrialRecord {
        summary,
        study_design: study_design(field(design, "designInfo")),
        arms: arms(field(protocol, "armsInterventionsModule")),
        eligibility: eligibility(field(protocol, "eligibilityModule")),
        outcomes: outcomes(field(protocol, "outcomesModule")),
        source: RecordSource { registry: REGISTRY_TAG.to_string(), api_version },
    })
}

fn phases(value: &Value) -> Vec<Phase> {
    let mut out = Vec::new();
    for token in unique_strings(array(value)) {
        if let Some(phase) = Phase::from_upstream(&token)
            && !out.contains(&phase)
        {
            out.push(phase);
        }
    }
    out
}

fn enrollment(info: &Value) -> Option<Enrollment> {
    let count = field(info, "count").as_f64().filter(|c| c.is_finite() && *c >= 0.0)?;
    let kind = match field(info, "type").as_str()? {
        "ACTUAL" => EnrollmentType::Actual,
        "ESTIMATED" => EnrollmentType::Estimated,
        _ => return None,
    };
    Some(Enrollment { count: count.trunc() as u64, kind })
}

fn sponsor(value: &Value) -> Option<Sponsor> {
    let name = non_empty_str(field(value, "name"))?;
    Some(Sponsor {
        name: name.to_string(),
        class: non_empty_str(field(value, "class")).map(SponsorClass::from_upstream),
    })
}

fn collaborators(value: &Value) -> Vec<Sponsor> {
    let mut out: Vec<Sponsor> = Vec::new();
    for collaborator in array(value).iter().filter_map(sponsor) {
        if !out.iter().any(|c| c.name == collaborator.name) {
            out.push(collaborator);
        }
    }
    out
}

/// Drop an arm-scoped category prefix such as `Drug:`.
fn strip_category(name: &str) -> String {
    match name.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => name.to_string(),
    }
}

fn dedup_in_order(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.trim().is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn interventions(module: &Value) -> Vec<String> {
    let direct = unique_strings(
        array(field(module, "interventions")).iter().map(|i| field(i, "name")),
    );
    let from_arms: Vec<String> = unique_strings(
        array(field(module, "armGroups"))
            .iter()
            .flat_map(|arm| array(field(arm, "interventionNames"))),
    )
    .iter()
    .map(|name| strip_category(name))
    .collect();

    dedup_in_order(direct.into_iter().chain(from_arms))
}

fn countries(module: &Value) -> Vec<Country> {
    let table = country_table();
    let mut out: Vec<Country> = Vec::new();

    for location in array(field(module, "locations")) {
        let Some(name) = non_empty_str(field(location, "country")) else { continue };
        let Some(code) = table.code_for_name(name) else { continue };
        if out.iter().any(|c| c.code == code) {
            continue;
        }
        out.push(Country { code: code.to_string(), name: name.to_string() });
    }

    out
}

fn date(date_struct: &Value) -> Option<String> {
    non_empty_str(field(date_struct, "date")).filter(|d| is_iso_date(d)).map(str::to_string)
}

fn outcomes(module: &Value) -> Vec<Outcome> {
    let groups = [
        ("primaryOutcomes", OutcomeType::Primary),
        ("secondaryOutcomes", OutcomeType::Secondary),
        ("otherOutcomes", OutcomeType::Other),
    ];

    groups
        .into_iter()
        .flat_map(|(key, kind)| {
            array(field(module, key)).iter().filter_map(move |outcome| {
                Some(Outcome {
                    kind,
                    measure: non_empty_str(field(outcome, "measure"))?.to_string(),
                    time_frame: non_empty_str(field(outcome, "timeFrame")).map(str::to_string),
                    description: non_empty_str(field(outcome, "description")).map(str::to_string),
                })
            })
        })
        .collect()
}

fn arms(module: &Value) -> Vec<Arm> {
    array(field(module, "armGroups"))
        .iter()
        .filter_map(|arm| {
            let label = non_empty_str(field(arm, "label"))?;
            let names = unique_strings(array(field(arm, "interventionNames")));
            Some(Arm {
                label: label.to_string(),
                kind: non_empty_str(field(arm, "type")).and_then(ArmType::from_upstream),
                description: non_empty_str(field(arm, "description")).map(str::to_string),
                interventions: dedup_in_order(names.iter().map(|name| strip_category(name))),
            })
        })
        .collect()
}

fn eligibility(module: &Value) -> Option<Eligibility> {
    if !module.is_object() {
        return None;
    }

    let mut standard_age = Vec::new();
    for age in unique_strings(array(field(module, "stdAges"))) {
        if let Some(age) = StandardAge::from_upstream(&age)
            && !standard_age.contains(&age)
        {
            standard_age.push(age);
        }
    }

    let out = Eligibility {
        criteria: non_empty_str(field(module, "eligibilityCriteria")).map(str::to_string),
        healthy_volunteers: field(module, "healthyVolunteers").as_bool(),
        sex: non_empty_str(field(module, "sex")).and_then(Sex::from_upstream),
        minimum_age: non_empty_str(field(module, "minimumAge")).map(str::to_string),
        maximum_age: non_empty_str(field(module, "maximumAge")).map(str::to_string),
        standard_age,
    };

    (!out.is_empty()).then_some(out)
}

fn study_design(info: &Value) -> Option<StudyDesign> {
    if !info.is_object() {
        return None;
    }

    let out = StudyDesign {
        allocation: non_empty_str(field(info, "allocation")).and_then(Allocation::from_upstream),
        intervention_model: non_empty_str(field(info, "interventionModel")).map(str::to_string),
        masking: non_empty_str(field(field(info, "maskingInfo"), "masking")).map(str::to_string),
        primary_purpose: non_empty_str(field(info, "primaryPurpose")).map(str::to_string),
    };

    (!out.is_empty()).then_some(out)
}
