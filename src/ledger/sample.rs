use crate::models::LineItemPatch;

// name, review, free, amount, 2E, lab, extra, observations
type SampleRow = (
    &'static str,
    &'static str,
    bool,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    Option<&'static str>,
    &'static str,
);

const SAMPLE_ROWS: [SampleRow; 15] = [
    ("Rajesh Kumar", "Follow-up", false, "500", Some("200"), None, None, "BP normal, continue medication"),
    ("Priya Sharma", "New Patient", false, "800", None, Some("300"), None, "Diabetes screening required"),
    ("Mohammed Ali", "Consultation", true, "", None, None, None, "Free consultation - community service"),
    ("Sunita Devi", "Follow-up", false, "400", Some("150"), None, None, "Hypertension stable"),
    ("Arjun Patel", "New Patient", false, "600", None, Some("250"), Some("100"), "Chest pain evaluation"),
    ("Kavita Singh", "Review", false, "350", Some("200"), None, None, "Thyroid levels normal"),
    ("Deepak Gupta", "Consultation", false, "450", None, Some("400"), None, "Liver function tests"),
    ("Meera Joshi", "Follow-up", false, "300", Some("150"), None, None, "Migraine improving"),
    ("Vikram Yadav", "New Patient", false, "700", None, Some("350"), Some("200"), "Cardiac evaluation"),
    ("Anita Reddy", "Consultation", true, "", None, None, None, "Senior citizen free checkup"),
    ("Rohit Mehta", "Follow-up", false, "400", Some("180"), None, None, "Diabetes well controlled"),
    ("Sushma Iyer", "Review", false, "550", None, Some("300"), None, "Kidney function normal"),
    ("Amit Agarwal", "New Patient", false, "650", Some("200"), Some("250"), None, "Complete health checkup"),
    ("Pooja Bansal", "Consultation", false, "380", None, None, Some("120"), "Skin allergy treatment"),
    ("Ravi Tiwari", "Follow-up", false, "420", Some("160"), Some("200"), None, "Post-surgery recovery good"),
];

/// A day's worth of demonstration visits, as edits to apply to fresh rows.
pub fn sample_patients() -> Vec<LineItemPatch> {
    SAMPLE_ROWS
        .iter()
        .map(|&(name, review, free, amount, procedure, lab, extra, observations)| LineItemPatch {
            name: Some(name.to_string()),
            review_type: Some(review.to_string()),
            is_free: Some(free),
            amount: Some(amount.to_string()),
            include_procedure: Some(procedure.is_some()),
            procedure_fee: Some(procedure.unwrap_or_default().to_string()),
            include_lab: Some(lab.is_some()),
            test_fee: Some(lab.unwrap_or_default().to_string()),
            observations: Some(observations.to_string()),
            include_extra: Some(extra.is_some()),
            extra_fee: Some(extra.unwrap_or_default().to_string()),
        })
        .collect()
}
