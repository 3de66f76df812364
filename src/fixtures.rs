use crate::blueprint::{CoverageCellSpec, NavButtonSpec, ProviderSpec};

pub(crate) const LANDING_SECTION: &str = "landing";
pub(crate) const REPORT_SECTION: &str = "report";
pub(crate) const DIAGNOSIS_SECTION: &str = "diagnosis";
pub(crate) const INSURANCE_SECTION: &str = "insurance";
pub(crate) const MATCHING_SECTION: &str = "matching";
pub(crate) const TRACKING_SECTION: &str = "tracking";
pub(crate) const PAYMENT_SECTION: &str = "payment";
pub(crate) const CONFIRMATION_SECTION: &str = "confirmation";

pub(crate) const MODE_KEY: &str = "mode";
pub(crate) const COVERAGE_KEY: &str = "coverage";
pub(crate) const TEAM_KEY: &str = "team";
pub(crate) const CONTRACTOR_MODE: &str = "contractor";

pub(crate) const DIAGNOSIS_DELAY_MS: i64 = 1200;
pub(crate) const DIAGNOSIS_CATEGORY: &str = "Roof Leak";
pub(crate) const DIAGNOSIS_ESTIMATE: &str = "R8,500 – R12,000";
pub(crate) const DIAGNOSIS_TIME: &str = "2–4 hours";
pub(crate) const DIAGNOSIS_CONFIDENCE: &str = "0.86";

pub(crate) const DISCOUNT_CODE_PREFIX: &str = "RENOVATE-20-";
pub(crate) const DISCOUNT_CODE_SUFFIX_LEN: usize = 5;

pub(crate) const AVAILABLE_NOW_BADGE: &str = "Available Now";

pub(crate) const DEMO_SERVICE_TEXT: &str = "Roof leak repair";
pub(crate) const DEMO_AMOUNT_TEXT: &str = "R9,800";

pub(crate) mod ids {
    pub(crate) const START_DIAGNOSIS: &str = "start-diagnosis";
    pub(crate) const SPINNER: &str = "spinner";
    pub(crate) const DIAG_CATEGORY: &str = "diag-category";
    pub(crate) const DIAG_ESTIMATE: &str = "diag-estimate";
    pub(crate) const DIAG_TIME: &str = "diag-time";
    pub(crate) const DIAG_CONFIDENCE: &str = "diag-confidence";
    pub(crate) const COVERAGE_MODAL: &str = "coverage-modal";
    pub(crate) const MODAL_TITLE: &str = "modal-title";
    pub(crate) const MODAL_PREMIUM: &str = "modal-premium";
    pub(crate) const MODAL_BENEFITS: &str = "modal-benefits";
    pub(crate) const CONFIRM_COVERAGE: &str = "confirm-coverage";
    pub(crate) const MATCH_LIST: &str = "match-list";
    pub(crate) const CHAT_FEED: &str = "chat-feed";
    pub(crate) const CHAT_INPUT: &str = "chat-input";
    pub(crate) const CHAT_SEND: &str = "chat-send";
    pub(crate) const SERVICE_LINE: &str = "service-line";
    pub(crate) const AMOUNT_LINE: &str = "amount-line";
    pub(crate) const INSURANCE_LINE: &str = "insurance-line";
    pub(crate) const PAY: &str = "pay";
    pub(crate) const CONFIRM_SUMMARY: &str = "confirm-summary";
    pub(crate) const DISCOUNT_BLOCK: &str = "discount-block";
    pub(crate) const DISCOUNT_CODE: &str = "discount-code";
}

pub(crate) fn demo_sections() -> Vec<String> {
    [
        LANDING_SECTION,
        REPORT_SECTION,
        DIAGNOSIS_SECTION,
        INSURANCE_SECTION,
        MATCHING_SECTION,
        TRACKING_SECTION,
        PAYMENT_SECTION,
        CONFIRMATION_SECTION,
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

pub(crate) fn demo_nav_buttons() -> Vec<NavButtonSpec> {
    vec![
        NavButtonSpec {
            id: "nav-home".to_string(),
            goto: LANDING_SECTION.to_string(),
            mode: None,
        },
        NavButtonSpec {
            id: "nav-report".to_string(),
            goto: REPORT_SECTION.to_string(),
            mode: None,
        },
        NavButtonSpec {
            id: "nav-insurance".to_string(),
            goto: INSURANCE_SECTION.to_string(),
            mode: None,
        },
        NavButtonSpec {
            id: "nav-payment".to_string(),
            goto: PAYMENT_SECTION.to_string(),
            mode: None,
        },
        NavButtonSpec {
            id: "nav-contractor".to_string(),
            goto: MATCHING_SECTION.to_string(),
            mode: Some(CONTRACTOR_MODE.to_string()),
        },
    ]
}

pub(crate) fn demo_coverage_cells() -> Vec<CoverageCellSpec> {
    vec![
        CoverageCellSpec {
            id: "cell-roofing".to_string(),
            part: "Roofing".to_string(),
            premium: "450".to_string(),
            benefits: "Leak repair; Annual inspection; Storm damage".to_string(),
        },
        CoverageCellSpec {
            id: "cell-plumbing".to_string(),
            part: "Plumbing".to_string(),
            premium: "380".to_string(),
            benefits: "Burst pipe callouts; Geyser cover".to_string(),
        },
        CoverageCellSpec {
            id: "cell-electrical".to_string(),
            part: "Electrical".to_string(),
            premium: "520".to_string(),
            benefits: "Fault finding; Compliance certificates; Surge damage".to_string(),
        },
        CoverageCellSpec {
            id: "cell-structural".to_string(),
            part: "Structural".to_string(),
            premium: "610".to_string(),
            benefits: "Crack monitoring; Foundation assessment".to_string(),
        },
    ]
}

pub(crate) fn demo_providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            name: "Skyline Roofing Co.".to_string(),
            rating: 4.9,
            eta: "18 min".to_string(),
            team_size: 3,
            available_now: true,
        },
        ProviderSpec {
            name: "AquaSeal Pros".to_string(),
            rating: 4.8,
            eta: "25 min".to_string(),
            team_size: 4,
            available_now: false,
        },
        ProviderSpec {
            name: "Blueprint Builders".to_string(),
            rating: 4.7,
            eta: "32 min".to_string(),
            team_size: 2,
            available_now: true,
        },
    ]
}
