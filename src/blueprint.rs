use crate::fixtures::{self, ids};
use crate::view::{View, ViewNodeId, ViewNodeKind, WidgetAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavButtonSpec {
    pub id: String,
    pub goto: String,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageCellSpec {
    pub id: String,
    pub part: String,
    pub premium: String,
    pub benefits: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub name: String,
    pub rating: f64,
    pub eta: String,
    pub team_size: u32,
    pub available_now: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub sections: Vec<String>,
    pub initial_fragment: String,
    pub nav_buttons: Vec<NavButtonSpec>,
    pub coverage_cells: Vec<CoverageCellSpec>,
    pub providers: Vec<ProviderSpec>,
    pub service_text: String,
    pub amount_text: String,
}

impl Blueprint {
    pub fn demo() -> Self {
        Self {
            sections: fixtures::demo_sections(),
            initial_fragment: String::new(),
            nav_buttons: fixtures::demo_nav_buttons(),
            coverage_cells: fixtures::demo_coverage_cells(),
            providers: fixtures::demo_providers(),
            service_text: fixtures::DEMO_SERVICE_TEXT.to_string(),
            amount_text: fixtures::DEMO_AMOUNT_TEXT.to_string(),
        }
    }

    pub(crate) fn build(&self) -> View {
        let mut view = View::new();
        let root = view.root();

        for name in &self.sections {
            let section = view.create(
                root,
                ViewNodeKind::Section {
                    name: name.clone(),
                    active: false,
                },
            );
            view.register(name, section);
        }

        for spec in &self.nav_buttons {
            let button = view.create(
                root,
                ViewNodeKind::Button {
                    action: WidgetAction::Navigate {
                        target: spec.goto.clone(),
                        mode: spec.mode.clone(),
                    },
                },
            );
            view.register(&spec.id, button);
        }

        self.build_report(&mut view);
        self.build_diagnosis(&mut view);
        self.build_insurance(&mut view);
        self.build_modal(&mut view);
        self.build_matching(&mut view);
        self.build_tracking(&mut view);
        self.build_payment(&mut view);
        self.build_confirmation(&mut view);

        view
    }

    // Fixed chrome lands inside its canonical section, or at the root when
    // a blueprint omits that section.
    fn anchor(view: &View, section: &str) -> ViewNodeId {
        view.by_id(section).unwrap_or(view.root())
    }

    fn build_report(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::REPORT_SECTION);
        let start = view.create(
            anchor,
            ViewNodeKind::Button {
                action: WidgetAction::StartDiagnosis,
            },
        );
        view.register(ids::START_DIAGNOSIS, start);
        let spinner = view.create_hidden(anchor, ViewNodeKind::Block);
        view.register(ids::SPINNER, spinner);
    }

    fn build_diagnosis(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::DIAGNOSIS_SECTION);
        for field in [
            ids::DIAG_CATEGORY,
            ids::DIAG_ESTIMATE,
            ids::DIAG_TIME,
            ids::DIAG_CONFIDENCE,
        ] {
            let node = view.push_text(anchor, "");
            view.register(field, node);
        }
    }

    fn build_insurance(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::INSURANCE_SECTION);
        for cell in &self.coverage_cells {
            let node = view.create(
                anchor,
                ViewNodeKind::Button {
                    action: WidgetAction::SelectCoverage {
                        part: cell.part.clone(),
                        premium: cell.premium.clone(),
                        benefits: cell.benefits.clone(),
                    },
                },
            );
            view.register(&cell.id, node);
        }
    }

    fn build_modal(&self, view: &mut View) {
        let root = view.root();
        let modal = view.create_hidden(root, ViewNodeKind::Modal);
        view.register(ids::COVERAGE_MODAL, modal);
        let title = view.push_text(modal, "");
        view.register(ids::MODAL_TITLE, title);
        let premium = view.push_text(modal, "");
        view.register(ids::MODAL_PREMIUM, premium);
        let benefits = view.create(modal, ViewNodeKind::List);
        view.register(ids::MODAL_BENEFITS, benefits);
        let confirm = view.create(
            modal,
            ViewNodeKind::Button {
                action: WidgetAction::ConfirmCoverage,
            },
        );
        view.register(ids::CONFIRM_COVERAGE, confirm);
    }

    fn build_matching(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::MATCHING_SECTION);
        let list = view.create(anchor, ViewNodeKind::List);
        view.register(ids::MATCH_LIST, list);
        for (index, provider) in self.providers.iter().enumerate() {
            let entry = view.create(list, ViewNodeKind::Block);
            view.register(&format!("match-{index}"), entry);
            view.push_text(entry, &provider.name);
            view.push_text(
                entry,
                &format!(
                    "★ {} · ETA {} · {} ppl",
                    provider.rating, provider.eta, provider.team_size
                ),
            );
            if provider.available_now {
                view.push_text(entry, fixtures::AVAILABLE_NOW_BADGE);
            }
            let book = view.create(
                entry,
                ViewNodeKind::Button {
                    action: WidgetAction::Book {
                        team: provider.name.clone(),
                    },
                },
            );
            view.register(&format!("book-{index}"), book);
        }
    }

    fn build_tracking(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::TRACKING_SECTION);
        let feed = view.create(
            anchor,
            ViewNodeKind::Feed {
                scroll_top: 0,
                scroll_height: 0,
            },
        );
        view.register(ids::CHAT_FEED, feed);
        let input = view.create(
            anchor,
            ViewNodeKind::Input {
                value: String::new(),
            },
        );
        view.register(ids::CHAT_INPUT, input);
        let send = view.create(
            anchor,
            ViewNodeKind::Button {
                action: WidgetAction::SendChat,
            },
        );
        view.register(ids::CHAT_SEND, send);
    }

    fn build_payment(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::PAYMENT_SECTION);
        let service = view.push_text(anchor, &self.service_text);
        view.register(ids::SERVICE_LINE, service);
        let amount = view.push_text(anchor, &self.amount_text);
        view.register(ids::AMOUNT_LINE, amount);
        let insurance = view.push_text(anchor, "");
        view.register(ids::INSURANCE_LINE, insurance);
        let pay = view.create(
            anchor,
            ViewNodeKind::Button {
                action: WidgetAction::Pay,
            },
        );
        view.register(ids::PAY, pay);
    }

    fn build_confirmation(&self, view: &mut View) {
        let anchor = Self::anchor(view, fixtures::CONFIRMATION_SECTION);
        let summary = view.push_text(anchor, "");
        view.register(ids::CONFIRM_SUMMARY, summary);
        let block = view.create_hidden(anchor, ViewNodeKind::Block);
        view.register(ids::DISCOUNT_BLOCK, block);
        let code = view.push_text(block, "");
        view.register(ids::DISCOUNT_CODE, code);
    }
}
