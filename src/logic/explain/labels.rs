//! Feature Labels - Human label and canned context per model column
//!
//! Context strings are picked by the sign of the impact. "N/A" marks a
//! direction with no canned text and is never shown.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::format::title_case;
use super::types::Direction;

const NO_CONTEXT: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLabel {
    pub label: &'static str,
    pub positive: &'static str,
    pub negative: &'static str,
}

impl FeatureLabel {
    /// Context for a direction, empty when none exists
    pub fn context(&self, direction: Direction) -> &'static str {
        let text = match direction {
            Direction::Positive => self.positive,
            Direction::Negative => self.negative,
        };
        if text == NO_CONTEXT {
            ""
        } else {
            text
        }
    }
}

static FEATURE_LABELS: Lazy<HashMap<&'static str, FeatureLabel>> = Lazy::new(|| {
    const TABLE: &[(&str, &str, &str, &str)] = &[
        // Numeric
        (
            "duration",
            "Call Duration",
            "Long call shows strong engagement",
            "Short call indicates lack of interest",
        ),
        (
            "age",
            "Customer Age",
            "Age profile matches target demographic",
            "Age group typically has lower conversion",
        ),
        (
            "balance",
            "Account Balance",
            "High balance indicates financial capacity",
            "Lower balance might limit options",
        ),
        (
            "campaign",
            "Campaign Contacts",
            "Follow-up helped build interest",
            "Too many contacts may have caused fatigue",
        ),
        (
            "pdays",
            "Days Since Last Contact",
            "Recent engagement keeps interest fresh",
            "Too long since last contact",
        ),
        (
            "previous",
            "Previous Contacts",
            "Prior relationship builds trust",
            "Limited prior engagement",
        ),
        ("day", "Contact Day", "Good timing for financial decisions", "Timing was suboptimal"),
        // Previous outcome
        (
            "poutcome_success",
            "Previous Campaign Success",
            "Already showed interest in our products",
            "N/A",
        ),
        (
            "poutcome_failure",
            "Previous Campaign Rejection",
            "N/A",
            "Previously declined similar offers",
        ),
        (
            "poutcome_unknown",
            "First-Time Contact",
            "Fresh prospect with no negative history",
            "No prior data to predict behavior",
        ),
        (
            "poutcome_other",
            "Previous Campaign Other",
            "Has prior campaign history",
            "Unclear prior outcome",
        ),
        // Credit
        (
            "housing_yes",
            "Has Housing Loan",
            "Shows trust in financial institutions",
            "Existing debt may limit new commitments",
        ),
        (
            "housing_no",
            "No Housing Loan",
            "More capacity for new products",
            "May be less engaged with banking",
        ),
        (
            "loan_yes",
            "Has Personal Loan",
            "Active banking relationship",
            "Existing debt reduces appetite",
        ),
        (
            "loan_no",
            "No Personal Loan",
            "Lower debt, more flexibility",
            "Less active banking relationship",
        ),
        (
            "default_yes",
            "Credit Default History",
            "N/A",
            "Past default indicates financial difficulties",
        ),
        ("default_no", "Clean Credit History", "Good financial responsibility", "N/A"),
        // Contact channel
        ("contact_cellular", "Mobile Contact", "Personal mobile shows accessibility", "N/A"),
        (
            "contact_telephone",
            "Landline Contact",
            "Traditional contact established",
            "May be harder to reach",
        ),
        (
            "contact_unknown",
            "Unknown Contact Method",
            "N/A",
            "Missing contact info limits engagement",
        ),
        // Job
        (
            "job_retired",
            "Retired",
            "Stable income and time for planning",
            "May be more conservative with spending",
        ),
        (
            "job_management",
            "Management Role",
            "Higher income and decision power",
            "May be too busy",
        ),
        ("job_technician", "Technical Professional", "Stable employment, good income", "N/A"),
        ("job_admin.", "Administrative Role", "Regular income", "Limited disposable income"),
        ("job_blue-collar", "Blue-Collar Work", "Steady employment", "Variable income levels"),
        ("job_services", "Services Sector", "Customer-facing experience", "Variable income"),
        (
            "job_entrepreneur",
            "Entrepreneur",
            "Risk-tolerant mindset",
            "Variable income may limit commitment",
        ),
        (
            "job_self-employed",
            "Self-Employed",
            "Independent decision maker",
            "Unpredictable income",
        ),
        (
            "job_unemployed",
            "Unemployed",
            "May be seeking financial solutions",
            "Limited financial capacity",
        ),
        ("job_student", "Student", "Future potential customer", "Limited current income"),
        ("job_housemaid", "Domestic Worker", "Steady work", "Lower income bracket"),
        ("job_unknown", "Unknown Job", "N/A", "Incomplete profile data"),
        // Marital
        (
            "marital_married",
            "Married",
            "Stable household finances",
            "Joint decisions may slow process",
        ),
        ("marital_single", "Single", "Quick individual decisions", "May have other priorities"),
        (
            "marital_divorced",
            "Divorced",
            "Independent decision maker",
            "May be financially cautious",
        ),
        // Education
        (
            "education_tertiary",
            "University Educated",
            "Understands complex products",
            "May be more skeptical",
        ),
        (
            "education_secondary",
            "High School Education",
            "Straightforward communication works",
            "May need simpler explanations",
        ),
        (
            "education_primary",
            "Primary Education",
            "Values simple, clear offers",
            "May distrust complex products",
        ),
        ("education_unknown", "Unknown Education", "N/A", "Incomplete profile data"),
        // Month
        (
            "month_jan",
            "January Contact",
            "New year financial planning mindset",
            "Post-holiday financial strain",
        ),
        ("month_feb", "February Contact", "Quiet month for decisions", "Low engagement period"),
        ("month_mar", "March Contact", "Q1 planning still active", "N/A"),
        ("month_apr", "April Contact", "Spring financial review", "Tax concerns may distract"),
        ("month_may", "May Contact", "Optimistic spring mindset", "Pre-summer distractions"),
        ("month_jun", "June Contact", "Mid-year review timing", "Summer vacation planning"),
        ("month_jul", "July Contact", "N/A", "Peak vacation season"),
        ("month_aug", "August Contact", "N/A", "Holiday distractions continue"),
        ("month_sep", "September Contact", "Back-to-business mindset", "Back-to-school expenses"),
        ("month_oct", "October Contact", "Year-end planning begins", "N/A"),
        (
            "month_nov",
            "November Contact",
            "Year-end financial review",
            "Pre-holiday budget concerns",
        ),
        ("month_dec", "December Contact", "Year-end decisions and bonuses", "Holiday busyness"),
    ];

    TABLE
        .iter()
        .map(|&(key, label, positive, negative)| (key, FeatureLabel { label, positive, negative }))
        .collect()
});

/// Table entry for a model column (case-insensitive)
pub fn lookup(column: &str) -> Option<&'static FeatureLabel> {
    FEATURE_LABELS.get(column.to_lowercase().as_str())
}

/// Label for a column: the table entry, else the name title-cased
pub fn label_for(column: &str) -> String {
    match lookup(column) {
        Some(entry) => entry.label.to_string(),
        None => title_case(&column.replace('_', " ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(lookup("Duration").unwrap().label, "Call Duration");
        assert_eq!(lookup("job_admin.").unwrap().label, "Administrative Role");
        assert!(lookup("job_astronaut").is_none());
    }

    #[test]
    fn test_sentinel_context_is_empty() {
        let entry = lookup("poutcome_success").unwrap();
        assert_eq!(entry.context(Direction::Positive), "Already showed interest in our products");
        assert_eq!(entry.context(Direction::Negative), "");
    }

    #[test]
    fn test_fallback_label() {
        assert_eq!(label_for("emp_var_rate"), "Emp Var Rate");
        assert_eq!(label_for("pdays"), "Days Since Last Contact");
    }

    #[test]
    fn test_table_covers_bank_schema() {
        for column in crate::logic::model::fixtures::bank_feature_names() {
            assert!(lookup(&column).is_some(), "no label for {}", column);
        }
    }
}
