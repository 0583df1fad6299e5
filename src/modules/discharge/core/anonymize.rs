use crate::modules::discharge::core::report::DashboardResponse;
use regex::Regex;
use std::sync::LazyLock;

const NAME_FILLER: &str = "xxxx";
const ID_FILLER: &str = "xxx";

static HONORIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Mrs\.|Mr\.|Miss\.|Dr\.|Ms\.|Er\.|Prof\.|Master\.)").expect("valid regex")
});

fn mask_name_part(part: &str) -> String {
    if let Some(title) = HONORIFIC.find(part) {
        let rest = &part[title.end()..];
        return if rest.is_empty() {
            title.as_str().to_string()
        } else {
            format!("{}{}", title.as_str(), mask_name(rest))
        };
    }

    let chars: Vec<char> = part.chars().collect();
    let len = chars.len();
    if len < 2 {
        return part.to_string();
    }
    let keep = if len > 4 { 2 } else { 1 };
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[len - keep..].iter().collect();
    format!("{head}{NAME_FILLER}{tail}")
}

/// Masks every space-separated part of a patient name, keeping honorifics.
pub fn mask_name(name: &str) -> String {
    name.split(' ')
        .map(mask_name_part)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn mask_uhid(uhid: &str) -> String {
    let mut chars = uhid.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => format!("{first}{ID_FILLER}{last}"),
        _ => "X".to_string(),
    }
}

/// Keeps the ward and hides the bed: `"ICU / 12"` -> `"ICU - xxxx"`.
pub fn mask_ward_bed(ward_bed: &str) -> String {
    if ward_bed.is_empty() {
        return NAME_FILLER.to_string();
    }
    match ward_bed.split_once(['/', '-']) {
        Some((ward, _)) => format!("{} - {NAME_FILLER}", ward.trim()),
        None => ward_bed.to_string(),
    }
}

/// Returns a masked copy of the report; the input is left untouched.
pub fn anonymize_report(report: &DashboardResponse) -> DashboardResponse {
    let mut masked = report.clone();
    for workflow in masked.workflows.iter_mut().flatten() {
        for entry in &mut workflow.timeline {
            entry.patient_name = mask_name(&entry.patient_name);
            entry.uhid = mask_uhid(&entry.uhid);
            entry.ward_bed = mask_ward_bed(&entry.ward_bed);
        }
        for entry in &mut workflow.sla {
            entry.patient_name = mask_name(&entry.patient_name);
            entry.uhid = mask_uhid(&entry.uhid);
            entry.ward_bed = mask_ward_bed(&entry.ward_bed);
        }
    }
    masked
}
