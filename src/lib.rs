use std::error::Error as StdError;
use std::fmt;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

mod blueprint;
mod fixtures;
mod runtime_state;
mod view;

pub use blueprint::{Blueprint, CoverageCellSpec, NavButtonSpec, ProviderSpec};
pub use runtime_state::{Navigation, PendingTimer, TimerAction};

use crate::fixtures::ids;
use crate::runtime_state::{RouteState, ScheduledTask, SchedulerState, StorageState, TraceState};
use crate::view::{truncate_chars, View, ViewNodeKind, WidgetAction};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    NodeNotFound(String),
    KindMismatch {
        id: String,
        expected: String,
        actual: String,
    },
    StorageParse {
        key: String,
        message: String,
    },
    Runtime(String),
    AssertionFailed {
        id: String,
        expected: String,
        actual: String,
        snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "view node not found: {id}"),
            Self::KindMismatch {
                id,
                expected,
                actual,
            } => write!(f, "kind mismatch for {id}: expected {expected}, actual {actual}"),
            Self::StorageParse { key, message } => {
                write!(f, "storage parse error for key {key}: {message}")
            }
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::AssertionFailed {
                id,
                expected,
                actual,
                snippet,
            } => write!(
                f,
                "assertion failed for {id}: expected {expected}, actual {actual}, snippet {snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSelection {
    pub part: String,
    pub premium: String,
    pub benefits: Vec<String>,
}

#[derive(Debug)]
pub struct App {
    blueprint: Blueprint,
    view: View,
    route: RouteState,
    scheduler: SchedulerState,
    storage: StorageState,
    trace: TraceState,
    rng_state: u64,
    chosen_coverage: Option<CoverageSelection>,
}

impl App {
    pub fn new() -> Result<Self> {
        Self::from_blueprint(Blueprint::demo())
    }

    pub fn from_blueprint(blueprint: Blueprint) -> Result<Self> {
        let view = blueprint.build();
        let initial_fragment = blueprint.initial_fragment.clone();
        let mut app = Self {
            blueprint,
            view,
            route: RouteState::new(&initial_fragment),
            scheduler: SchedulerState::default(),
            storage: StorageState::default(),
            trace: TraceState::default(),
            rng_state: 0x9E37_79B9_7F4A_7C15,
            chosen_coverage: None,
        };
        app.boot()?;
        Ok(app)
    }

    // Runs the per-load work: apply the initial fragment, then hydrate the
    // payment view from whatever the store already holds.
    fn boot(&mut self) -> Result<()> {
        let fragment = self.route.fragment.clone();
        self.set_active(&fragment);
        self.hydrate_payment()
    }

    // Rebuilds the view over intact storage, like a page reload. Pending
    // timers die with the old view.
    pub fn reload(&mut self) -> Result<()> {
        self.trace_event_line("[event] reload".to_string());
        self.view = self.blueprint.build();
        self.scheduler.clear_all();
        self.chosen_coverage = None;
        self.boot()
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    // ---- navigation ----

    pub fn navigate(&mut self, target: &str) {
        self.trace_event_line(format!("[event] navigate target={target}"));
        self.set_active(target);
    }

    fn set_active(&mut self, target: &str) {
        let id = target.strip_prefix('#').unwrap_or(target);
        let id = if id.is_empty() {
            fixtures::LANDING_SECTION
        } else {
            id
        };
        let matched = self.view.activate_section(id);
        if !matched {
            self.trace_event_line(format!(
                "[nav] unknown section '{id}' left all sections inactive"
            ));
        }
        if let Some(navigation) = self.route.replace(id) {
            self.trace_event_line(format!(
                "[nav] replace from={} to={}",
                navigation.from, navigation.to
            ));
        }
    }

    pub fn active_section(&self) -> Option<&str> {
        self.view.active_section()
    }

    pub fn fragment(&self) -> &str {
        &self.route.fragment
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.route.navigations
    }

    // ---- event dispatch ----

    pub fn click(&mut self, id: &str) -> Result<()> {
        let node = self.view.require(id)?;
        self.trace_event_line(format!("[event] click #{id}"));
        if matches!(self.view.kind(node), ViewNodeKind::Modal) {
            // Clicking the backdrop closes the modal without persisting.
            self.view.set_hidden(node, true);
            return Ok(());
        }
        let action = match self.view.kind(node) {
            ViewNodeKind::Button { action } => action.clone(),
            _ => return Ok(()),
        };
        self.run_action(action)
    }

    pub fn type_text(&mut self, id: &str, text: &str) -> Result<()> {
        let node = self.view.require(id)?;
        self.trace_event_line(format!("[event] type #{id} chars={}", text.chars().count()));
        self.view.set_input_value(node, text)
    }

    fn run_action(&mut self, action: WidgetAction) -> Result<()> {
        match action {
            WidgetAction::Navigate { target, mode } => {
                if mode.as_deref() == Some(fixtures::CONTRACTOR_MODE) {
                    self.storage_set_traced(fixtures::MODE_KEY, fixtures::CONTRACTOR_MODE);
                }
                self.set_active(&target);
                Ok(())
            }
            WidgetAction::StartDiagnosis => self.start_diagnosis(),
            WidgetAction::SelectCoverage {
                part,
                premium,
                benefits,
            } => self.select_coverage(part, premium, &benefits),
            WidgetAction::ConfirmCoverage => self.confirm_coverage(),
            WidgetAction::Book { team } => self.book_team(&team),
            WidgetAction::SendChat => self.send_chat(),
            WidgetAction::Pay => self.pay(),
        }
    }

    // ---- diagnosis simulator ----

    fn start_diagnosis(&mut self) -> Result<()> {
        let spinner = self.view.require(ids::SPINNER)?;
        self.view.set_hidden(spinner, false);
        let due_at = self
            .scheduler
            .now_ms
            .saturating_add(fixtures::DIAGNOSIS_DELAY_MS);
        let timer_id = self
            .scheduler
            .schedule(fixtures::DIAGNOSIS_DELAY_MS, TimerAction::CompleteDiagnosis);
        self.trace_timer_line(format!(
            "[timer] schedule id={timer_id} due_at={due_at} action=complete-diagnosis"
        ));
        Ok(())
    }

    fn complete_diagnosis(&mut self) -> Result<()> {
        let spinner = self.view.require(ids::SPINNER)?;
        self.view.set_hidden(spinner, true);
        self.set_field_text(ids::DIAG_CATEGORY, fixtures::DIAGNOSIS_CATEGORY)?;
        self.set_field_text(ids::DIAG_ESTIMATE, fixtures::DIAGNOSIS_ESTIMATE)?;
        self.set_field_text(ids::DIAG_TIME, fixtures::DIAGNOSIS_TIME)?;
        self.set_field_text(ids::DIAG_CONFIDENCE, fixtures::DIAGNOSIS_CONFIDENCE)?;
        self.set_active(fixtures::DIAGNOSIS_SECTION);
        Ok(())
    }

    // ---- coverage selector ----

    fn select_coverage(&mut self, part: String, premium: String, benefits_raw: &str) -> Result<()> {
        let benefits: Vec<String> = benefits_raw
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        self.set_field_text(ids::MODAL_TITLE, &format!("{part} Coverage"))?;
        self.set_field_text(ids::MODAL_PREMIUM, &premium)?;
        let list = self.view.require(ids::MODAL_BENEFITS)?;
        self.view.clear_children(list);
        for benefit in &benefits {
            self.view.push_text(list, benefit);
        }
        let modal = self.view.require(ids::COVERAGE_MODAL)?;
        self.view.set_hidden(modal, false);
        self.chosen_coverage = Some(CoverageSelection {
            part,
            premium,
            benefits,
        });
        Ok(())
    }

    fn confirm_coverage(&mut self) -> Result<()> {
        // With no cell ever clicked this stores a serialized null; the key
        // still counts as present everywhere that only checks presence.
        let serialized = serde_json::to_string(&self.chosen_coverage)
            .map_err(|err| Error::Runtime(format!("coverage serialization failed: {err}")))?;
        self.storage_set_traced(fixtures::COVERAGE_KEY, &serialized);
        if let Some(modal) = self.view.by_id(ids::COVERAGE_MODAL) {
            self.view.set_hidden(modal, true);
        }
        self.set_active(fixtures::MATCHING_SECTION);
        Ok(())
    }

    pub fn chosen_coverage(&self) -> Option<&CoverageSelection> {
        self.chosen_coverage.as_ref()
    }

    pub fn coverage_modal_open(&self) -> bool {
        self.view
            .by_id(ids::COVERAGE_MODAL)
            .map(|modal| !self.view.hidden(modal))
            .unwrap_or(false)
    }

    // ---- match list ----

    fn book_team(&mut self, team: &str) -> Result<()> {
        self.storage_set_traced(fixtures::TEAM_KEY, team);
        self.set_active(fixtures::TRACKING_SECTION);
        Ok(())
    }

    // ---- chat ----

    fn send_chat(&mut self) -> Result<()> {
        let input = self.view.require(ids::CHAT_INPUT)?;
        let value = self.view.input_value(input)?.to_string();
        if value.trim().is_empty() {
            return Ok(());
        }
        let feed = self.view.require(ids::CHAT_FEED)?;
        self.view.push_message(feed, &value, true)?;
        self.view.pin_feed_to_end(feed)?;
        self.view.set_input_value(input, "")
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.view
            .by_id(ids::CHAT_FEED)
            .map(|feed| self.view.messages(feed))
            .unwrap_or_default()
    }

    pub fn chat_feed_scroll(&self) -> Result<(usize, usize)> {
        let feed = self.view.require(ids::CHAT_FEED)?;
        self.view.feed_scroll(feed)
    }

    // ---- payment ----

    fn hydrate_payment(&mut self) -> Result<()> {
        let Some(serialized) = self.storage.get(fixtures::COVERAGE_KEY) else {
            return Ok(());
        };
        let selection: CoverageSelection =
            serde_json::from_str(serialized).map_err(|err| Error::StorageParse {
                key: fixtures::COVERAGE_KEY.to_string(),
                message: err.to_string(),
            })?;
        if let Some(line) = self.view.by_id(ids::INSURANCE_LINE) {
            self.view.set_text(
                line,
                &format!("{} (R{}/mo)", selection.part, selection.premium),
            )?;
        }
        Ok(())
    }

    fn pay(&mut self) -> Result<()> {
        let service = self.field_text(ids::SERVICE_LINE)?;
        let amount = self.field_text(ids::AMOUNT_LINE)?;
        let has_coverage = self.storage.get(fixtures::COVERAGE_KEY).is_some();
        self.set_field_text(
            ids::CONFIRM_SUMMARY,
            &format!("Cost: {amount} • Service: {service}"),
        )?;
        if has_coverage {
            let block = self.view.require(ids::DISCOUNT_BLOCK)?;
            self.view.set_hidden(block, false);
            let code = self.generate_discount_code();
            self.set_field_text(ids::DISCOUNT_CODE, &code)?;
        }
        self.set_active(fixtures::CONFIRMATION_SECTION);
        Ok(())
    }

    fn generate_discount_code(&mut self) -> String {
        let mut code = String::from(fixtures::DISCOUNT_CODE_PREFIX);
        for _ in 0..fixtures::DISCOUNT_CODE_SUFFIX_LEN {
            let roll = (self.next_random_f64() * 36.0) as u32;
            let digit = char::from_digit(roll.min(35), 36).unwrap_or('0');
            code.push(digit.to_ascii_uppercase());
        }
        code
    }

    fn next_random_f64(&mut self) -> f64 {
        // xorshift64* keeps discount codes reproducible under a fixed seed.
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = if x == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { x };
        let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        // Convert top 53 bits to [0.0, 1.0).
        let mantissa = out >> 11;
        (mantissa as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng_state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
    }

    // ---- storage ----

    fn storage_set_traced(&mut self, key: &str, value: &str) {
        self.trace_event_line(format!("[storage] set {key}"));
        self.storage.set(key, value);
    }

    pub fn storage_get(&self, key: &str) -> Option<&str> {
        self.storage.get(key)
    }

    pub fn set_storage(&mut self, key: &str, value: &str) {
        self.storage_set_traced(key, value);
    }

    pub fn remove_storage(&mut self, key: &str) -> Option<String> {
        self.trace_event_line(format!("[storage] remove {key}"));
        self.storage.remove(key)
    }

    pub fn clear_storage(&mut self) -> usize {
        let cleared = self.storage.clear();
        self.trace_event_line(format!("[storage] clear removed={cleared}"));
        cleared
    }

    // ---- timers ----

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .scheduler
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                action: task.action,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.scheduler.next_task_index(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };
        let task = self.scheduler.task_queue.remove(next_idx);
        if task.due_at > self.scheduler.now_ms {
            self.scheduler.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_next_due_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.scheduler.next_task_index(Some(self.scheduler.now_ms)) else {
            self.trace_timer_line("[timer] run_next_due none".into());
            return Ok(false);
        };
        let task = self.scheduler.task_queue.remove(next_idx);
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let existed = self.scheduler.clear(timer_id);
        self.trace_timer_line(format!("[timer] clear id={timer_id} existed={existed}"));
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.clear_all();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.scheduler.timer_step_limit = max_steps;
        Ok(())
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.scheduler.now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.scheduler.next_task_index(due_limit) {
            steps += 1;
            if steps > self.scheduler.timer_step_limit {
                let due_limit_desc = due_limit
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "none".into());
                return Err(Error::Runtime(format!(
                    "timer step limit exceeded: limit={} due_limit={due_limit_desc}",
                    self.scheduler.timer_step_limit
                )));
            }
            let task = self.scheduler.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} now_ms={}",
            task.id, task.due_at, self.scheduler.now_ms
        ));
        match task.action {
            TimerAction::CompleteDiagnosis => self.complete_diagnosis(),
        }
    }

    // ---- view access ----

    pub fn text(&self, id: &str) -> Result<String> {
        let node = self.view.require(id)?;
        Ok(self.view.text_content(node))
    }

    pub fn input_value(&self, id: &str) -> Result<String> {
        let node = self.view.require(id)?;
        Ok(self.view.input_value(node)?.to_string())
    }

    pub fn list_texts(&self, id: &str) -> Result<Vec<String>> {
        let node = self.view.require(id)?;
        Ok(self.view.child_texts(node))
    }

    pub fn visible(&self, id: &str) -> Result<bool> {
        let node = self.view.require(id)?;
        Ok(!self.view.effectively_hidden(node))
    }

    pub fn hidden_flag(&self, id: &str) -> Result<bool> {
        let node = self.view.require(id)?;
        Ok(self.view.hidden(node))
    }

    pub fn dump_view(&self, id: &str) -> Result<String> {
        let node = self.view.require(id)?;
        Ok(self.view.dump_node(node))
    }

    fn field_text(&self, id: &str) -> Result<String> {
        let node = self.view.require(id)?;
        Ok(self.view.text_content(node))
    }

    fn set_field_text(&mut self, id: &str, value: &str) -> Result<()> {
        let node = self.view.require(id)?;
        self.view.set_text(node, value)
    }

    fn node_snippet(&self, id: &str) -> String {
        self.view
            .by_id(id)
            .map(|node| truncate_chars(&self.view.dump_node(node), 200))
            .unwrap_or_default()
    }

    // ---- assertions ----

    pub fn assert_text(&self, id: &str, expected: &str) -> Result<()> {
        let actual = self.text(id)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: expected.to_string(),
                actual,
                snippet: self.node_snippet(id),
            });
        }
        Ok(())
    }

    pub fn assert_text_matches(&self, id: &str, pattern: &str) -> Result<()> {
        let actual = self.text(id)?;
        let regex = Regex::new(pattern)
            .map_err(|err| Error::Runtime(format!("invalid pattern {pattern}: {err}")))?;
        let matched = regex
            .is_match(&actual)
            .map_err(|err| Error::Runtime(format!("pattern match failed: {err}")))?;
        if !matched {
            return Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: pattern.to_string(),
                actual,
                snippet: self.node_snippet(id),
            });
        }
        Ok(())
    }

    pub fn assert_visible(&self, id: &str) -> Result<()> {
        if !self.visible(id)? {
            return Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: "visible".to_string(),
                actual: "hidden".to_string(),
                snippet: self.node_snippet(id),
            });
        }
        Ok(())
    }

    pub fn assert_hidden(&self, id: &str) -> Result<()> {
        if self.visible(id)? {
            return Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: "hidden".to_string(),
                actual: "visible".to_string(),
                snippet: self.node_snippet(id),
            });
        }
        Ok(())
    }

    pub fn assert_active_section(&self, expected: &str) -> Result<()> {
        let actual = self.view.active_section().unwrap_or("");
        if actual != expected {
            return Err(Error::AssertionFailed {
                id: expected.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                snippet: self.view.sections_summary(),
            });
        }
        Ok(())
    }

    pub fn assert_storage(&self, key: &str, expected: Option<&str>) -> Result<()> {
        let actual = self.storage.get(key);
        if actual != expected {
            return Err(Error::AssertionFailed {
                id: key.to_string(),
                expected: expected.unwrap_or("(absent)").to_string(),
                actual: actual.unwrap_or("(absent)").to_string(),
                snippet: String::new(),
            });
        }
        Ok(())
    }

    // ---- tracing ----

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.set_log_limit(max_entries);
        Ok(())
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.events {
            self.trace.push_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.timers {
            self.trace.push_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_defaults_to_landing_and_mirrors_fragment() -> Result<()> {
        let app = App::new()?;
        app.assert_active_section("landing")?;
        assert_eq!(app.fragment(), "#landing");
        assert_eq!(
            app.navigations(),
            &[Navigation {
                from: String::new(),
                to: "#landing".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn initial_fragment_applies_on_boot() -> Result<()> {
        let mut blueprint = Blueprint::demo();
        blueprint.initial_fragment = "#report".to_string();
        let app = App::from_blueprint(blueprint)?;
        app.assert_active_section("report")?;
        assert_eq!(app.fragment(), "#report");
        assert!(app.navigations().is_empty());
        Ok(())
    }

    #[test]
    fn navigation_click_activates_exactly_one_section() -> Result<()> {
        let mut app = App::new()?;
        app.click("nav-report")?;
        app.assert_active_section("report")?;
        assert_eq!(app.view.sections_summary().matches('*').count(), 1);
        assert_eq!(app.fragment(), "#report");
        Ok(())
    }

    #[test]
    fn unknown_navigation_target_blanks_all_sections() -> Result<()> {
        let mut app = App::new()?;
        app.navigate("nowhere");
        assert_eq!(app.active_section(), None);
        assert_eq!(app.view.sections_summary().matches('*').count(), 0);
        assert_eq!(app.fragment(), "#nowhere");
        Ok(())
    }

    #[test]
    fn empty_target_falls_back_to_landing() -> Result<()> {
        let mut app = App::new()?;
        app.click("nav-report")?;
        app.navigate("");
        app.assert_active_section("landing")?;
        Ok(())
    }

    #[test]
    fn hash_prefixed_target_is_normalized() -> Result<()> {
        let mut app = App::new()?;
        app.navigate("#tracking");
        app.assert_active_section("tracking")?;
        assert_eq!(app.fragment(), "#tracking");
        Ok(())
    }

    #[test]
    fn navigation_log_records_only_changes() -> Result<()> {
        let mut app = App::new()?;
        let baseline = app.navigations().len();
        app.navigate("report");
        app.navigate("report");
        assert_eq!(app.navigations().len(), baseline + 1);
        Ok(())
    }

    #[test]
    fn contractor_nav_persists_mode_before_navigating() -> Result<()> {
        let mut app = App::new()?;
        app.click("nav-contractor")?;
        app.assert_storage("mode", Some("contractor"))?;
        app.assert_active_section("matching")?;
        Ok(())
    }

    #[test]
    fn non_contractor_mode_is_ignored() -> Result<()> {
        let mut blueprint = Blueprint::demo();
        blueprint.nav_buttons.push(NavButtonSpec {
            id: "nav-homeowner".to_string(),
            goto: "report".to_string(),
            mode: Some("homeowner".to_string()),
        });
        let mut app = App::from_blueprint(blueprint)?;
        app.click("nav-homeowner")?;
        app.assert_storage("mode", None)?;
        app.assert_active_section("report")?;
        Ok(())
    }

    #[test]
    fn diagnosis_trigger_shows_spinner_and_schedules_fixed_delay() -> Result<()> {
        let mut app = App::new()?;
        app.click("nav-report")?;
        app.click("start-diagnosis")?;
        assert!(!app.hidden_flag("spinner")?);
        let pending = app.pending_timers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].due_at, 1200);
        assert_eq!(pending[0].action, TimerAction::CompleteDiagnosis);
        app.assert_text("diag-category", "")?;
        app.assert_active_section("report")?;
        Ok(())
    }

    #[test]
    fn diagnosis_completes_after_fixed_delay_with_constant_outputs() -> Result<()> {
        let mut app = App::new()?;
        app.click("start-diagnosis")?;
        app.advance_time(1199)?;
        app.assert_text("diag-category", "")?;
        assert!(!app.hidden_flag("spinner")?);
        app.advance_time(1)?;
        assert!(app.hidden_flag("spinner")?);
        app.assert_text("diag-category", "Roof Leak")?;
        app.assert_text("diag-estimate", "R8,500 – R12,000")?;
        app.assert_text("diag-time", "2–4 hours")?;
        app.assert_text("diag-confidence", "0.86")?;
        app.assert_active_section("diagnosis")?;
        assert_eq!(app.fragment(), "#diagnosis");
        Ok(())
    }

    #[test]
    fn diagnosis_outputs_unchanged_on_repeat_invocations() -> Result<()> {
        let mut app = App::new()?;
        for _ in 0..3 {
            app.click("start-diagnosis")?;
            app.advance_time(1200)?;
            app.assert_text("diag-category", "Roof Leak")?;
            app.assert_text("diag-confidence", "0.86")?;
        }
        Ok(())
    }

    #[test]
    fn duplicate_diagnosis_triggers_schedule_independent_tasks() -> Result<()> {
        let mut app = App::new()?;
        app.click("start-diagnosis")?;
        app.click("start-diagnosis")?;
        let pending = app.pending_timers();
        assert_eq!(pending.len(), 2);
        assert_ne!(pending[0].id, pending[1].id);
        assert_eq!(pending[0].due_at, pending[1].due_at);
        app.flush()?;
        assert!(app.pending_timers().is_empty());
        app.assert_text("diag-category", "Roof Leak")?;
        Ok(())
    }

    #[test]
    fn cleared_diagnosis_timer_never_fires() -> Result<()> {
        let mut app = App::new()?;
        app.click("start-diagnosis")?;
        let timer_id = app.pending_timers()[0].id;
        assert!(app.clear_timer(timer_id));
        assert!(!app.clear_timer(timer_id));
        app.advance_time(5000)?;
        app.assert_text("diag-category", "")?;
        // The busy indicator stays up: nothing ever completes the run.
        assert!(!app.hidden_flag("spinner")?);
        Ok(())
    }

    #[test]
    fn run_next_timer_advances_clock_to_due_time() -> Result<()> {
        let mut app = App::new()?;
        app.click("start-diagnosis")?;
        assert!(app.run_next_timer()?);
        assert_eq!(app.now_ms(), 1200);
        app.assert_text("diag-category", "Roof Leak")?;
        assert!(!app.run_next_timer()?);
        Ok(())
    }

    #[test]
    fn advance_time_rejects_negative_delta() -> Result<()> {
        let mut app = App::new()?;
        let err = app
            .advance_time(-1)
            .expect_err("negative delta should fail");
        assert!(matches!(err, Error::Runtime(_)));
        Ok(())
    }

    #[test]
    fn coverage_cell_populates_modal() -> Result<()> {
        let mut app = App::new()?;
        app.click("cell-roofing")?;
        assert!(app.coverage_modal_open());
        app.assert_text("modal-title", "Roofing Coverage")?;
        app.assert_text("modal-premium", "450")?;
        assert_eq!(
            app.list_texts("modal-benefits")?,
            vec!["Leak repair", "Annual inspection", "Storm damage"]
        );
        let chosen = app.chosen_coverage().expect("selection recorded");
        assert_eq!(chosen.part, "Roofing");
        assert_eq!(chosen.premium, "450");
        Ok(())
    }

    #[test]
    fn coverage_benefit_splitting_drops_blank_entries() -> Result<()> {
        let mut blueprint = Blueprint::demo();
        blueprint.coverage_cells = vec![CoverageCellSpec {
            id: "cell-test".to_string(),
            part: "Roofing".to_string(),
            premium: "450".to_string(),
            benefits: "A;; B ;".to_string(),
        }];
        let mut app = App::from_blueprint(blueprint)?;
        app.click("cell-test")?;
        assert_eq!(app.list_texts("modal-benefits")?, vec!["A", "B"]);
        Ok(())
    }

    #[test]
    fn confirm_coverage_persists_json_and_navigates() -> Result<()> {
        let mut blueprint = Blueprint::demo();
        blueprint.coverage_cells = vec![CoverageCellSpec {
            id: "cell-test".to_string(),
            part: "Roofing".to_string(),
            premium: "450".to_string(),
            benefits: "A; B".to_string(),
        }];
        let mut app = App::from_blueprint(blueprint)?;
        app.click("cell-test")?;
        app.click("confirm-coverage")?;
        app.assert_storage(
            "coverage",
            Some(r#"{"part":"Roofing","premium":"450","benefits":["A","B"]}"#),
        )?;
        assert!(!app.coverage_modal_open());
        app.assert_active_section("matching")?;
        Ok(())
    }

    #[test]
    fn confirm_without_selection_persists_null() -> Result<()> {
        let mut app = App::new()?;
        app.click("confirm-coverage")?;
        app.assert_storage("coverage", Some("null"))?;
        // Presence of the key is all the pay handler checks.
        app.click("pay")?;
        assert!(!app.hidden_flag("discount-block")?);
        Ok(())
    }

    #[test]
    fn modal_backdrop_click_dismisses_without_persisting() -> Result<()> {
        let mut app = App::new()?;
        app.click("cell-plumbing")?;
        assert!(app.coverage_modal_open());
        app.click("coverage-modal")?;
        assert!(!app.coverage_modal_open());
        app.assert_storage("coverage", None)?;
        // The transient selection survives the dismissal.
        assert!(app.chosen_coverage().is_some());
        Ok(())
    }

    #[test]
    fn match_list_renders_fixture_providers() -> Result<()> {
        let app = App::new()?;
        let entries = app.list_texts("match-list")?;
        assert_eq!(entries.len(), 3);
        assert!(entries[0].contains("Skyline Roofing Co."));
        assert!(entries[0].contains("★ 4.9 · ETA 18 min · 3 ppl"));
        assert!(entries[0].contains("Available Now"));
        assert!(entries[1].contains("AquaSeal Pros"));
        assert!(!entries[1].contains("Available Now"));
        assert!(entries[2].contains("Blueprint Builders"));
        Ok(())
    }

    #[test]
    fn booking_persists_team_and_navigates() -> Result<()> {
        let mut app = App::new()?;
        app.click("book-0")?;
        app.assert_storage("team", Some("Skyline Roofing Co."))?;
        app.assert_active_section("tracking")?;
        assert_eq!(app.fragment(), "#tracking");
        Ok(())
    }

    #[test]
    fn chat_send_appends_literal_text_and_clears_input() -> Result<()> {
        let mut app = App::new()?;
        app.type_text("chat-input", "hello")?;
        app.click("chat-send")?;
        assert_eq!(app.chat_messages(), vec!["hello"]);
        assert_eq!(app.input_value("chat-input")?, "");
        // Leading and trailing whitespace is kept on the appended entry.
        app.type_text("chat-input", "  spaced out  ")?;
        app.click("chat-send")?;
        assert_eq!(app.chat_messages(), vec!["hello", "  spaced out  "]);
        Ok(())
    }

    #[test]
    fn chat_send_ignores_blank_input() -> Result<()> {
        let mut app = App::new()?;
        app.click("chat-send")?;
        app.type_text("chat-input", "   ")?;
        app.click("chat-send")?;
        assert!(app.chat_messages().is_empty());
        assert_eq!(app.input_value("chat-input")?, "   ");
        Ok(())
    }

    #[test]
    fn chat_feed_scroll_pins_to_end() -> Result<()> {
        let mut app = App::new()?;
        app.type_text("chat-input", "one")?;
        app.click("chat-send")?;
        app.type_text("chat-input", "two")?;
        app.click("chat-send")?;
        assert_eq!(app.chat_feed_scroll()?, (2, 2));
        Ok(())
    }

    #[test]
    fn payment_hydrates_after_reload() -> Result<()> {
        let mut app = App::new()?;
        app.click("cell-roofing")?;
        app.click("confirm-coverage")?;
        // Hydration already ran at boot, before the selection existed.
        app.assert_text("insurance-line", "")?;
        app.reload()?;
        app.assert_text("insurance-line", "Roofing (R450/mo)")?;
        Ok(())
    }

    #[test]
    fn reload_clears_pending_timers_and_transient_state() -> Result<()> {
        let mut app = App::new()?;
        app.click("start-diagnosis")?;
        app.click("cell-roofing")?;
        app.reload()?;
        assert!(app.pending_timers().is_empty());
        assert!(app.chosen_coverage().is_none());
        assert!(app.chat_messages().is_empty());
        Ok(())
    }

    #[test]
    fn payment_without_coverage_hides_discount() -> Result<()> {
        let mut app = App::new()?;
        app.click("pay")?;
        app.assert_text("confirm-summary", "Cost: R9,800 • Service: Roof leak repair")?;
        assert!(app.hidden_flag("discount-block")?);
        app.assert_text("discount-code", "")?;
        app.assert_active_section("confirmation")?;
        Ok(())
    }

    #[test]
    fn payment_with_coverage_reveals_discount_code() -> Result<()> {
        let mut app = App::new()?;
        app.click("cell-roofing")?;
        app.click("confirm-coverage")?;
        app.click("pay")?;
        assert!(!app.hidden_flag("discount-block")?);
        app.assert_visible("discount-block")?;
        app.assert_text_matches("discount-code", "^RENOVATE-20-[0-9A-Z]{5}$")?;
        app.assert_active_section("confirmation")?;
        Ok(())
    }

    #[test]
    fn discount_code_is_reproducible_for_a_seed() -> Result<()> {
        let run = |seed: u64| -> Result<String> {
            let mut app = App::new()?;
            app.set_random_seed(seed);
            app.click("cell-roofing")?;
            app.click("confirm-coverage")?;
            app.click("pay")?;
            app.text("discount-code")
        };
        assert_eq!(run(42)?, run(42)?);
        assert_ne!(run(42)?, run(43)?);
        Ok(())
    }

    #[test]
    fn tampered_coverage_storage_fails_reload() -> Result<()> {
        let mut app = App::new()?;
        app.set_storage("coverage", "{not json");
        let err = app.reload().expect_err("tampered storage should fail");
        match err {
            Error::StorageParse { key, .. } => assert_eq!(key, "coverage"),
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn storage_last_write_wins_and_clear_empties() -> Result<()> {
        let mut app = App::new()?;
        app.set_storage("team", "first");
        app.set_storage("team", "second");
        app.assert_storage("team", Some("second"))?;
        assert_eq!(app.remove_storage("team"), Some("second".to_string()));
        app.set_storage("mode", "contractor");
        app.set_storage("team", "third");
        assert_eq!(app.clear_storage(), 2);
        app.assert_storage("mode", None)?;
        Ok(())
    }

    #[test]
    fn trace_logs_record_navigation_and_storage() -> Result<()> {
        let mut app = App::new()?;
        app.enable_trace(true);
        app.set_trace_stderr(false);
        app.click("nav-contractor")?;
        let logs = app.take_trace_logs();
        assert!(logs.iter().any(|line| line == "[event] click #nav-contractor"));
        assert!(logs.iter().any(|line| line == "[storage] set mode"));
        assert!(
            logs.iter()
                .any(|line| line == "[nav] replace from=#landing to=#matching")
        );
        Ok(())
    }

    #[test]
    fn trace_records_blanked_sections_on_unknown_target() -> Result<()> {
        let mut app = App::new()?;
        app.enable_trace(true);
        app.set_trace_stderr(false);
        app.navigate("nowhere");
        let logs = app.take_trace_logs();
        assert!(
            logs.iter()
                .any(|line| line == "[nav] unknown section 'nowhere' left all sections inactive")
        );
        Ok(())
    }

    #[test]
    fn trace_log_limit_trims_and_rejects_zero() -> Result<()> {
        let mut app = App::new()?;
        app.enable_trace(true);
        app.set_trace_stderr(false);
        assert!(app.set_trace_log_limit(0).is_err());
        app.set_trace_log_limit(2)?;
        app.navigate("report");
        app.navigate("matching");
        app.navigate("tracking");
        assert!(app.take_trace_logs().len() <= 2);
        Ok(())
    }

    #[test]
    fn type_text_requires_input_node() -> Result<()> {
        let mut app = App::new()?;
        let err = app
            .type_text("pay", "nope")
            .expect_err("typing into a button should fail");
        match err {
            Error::KindMismatch {
                id,
                expected,
                actual,
            } => {
                assert_eq!(id, "pay");
                assert_eq!(expected, "input");
                assert_eq!(actual, "button");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn click_unknown_id_errors() -> Result<()> {
        let mut app = App::new()?;
        let err = app.click("missing").expect_err("unknown id should fail");
        assert_eq!(err, Error::NodeNotFound("missing".to_string()));
        Ok(())
    }

    #[test]
    fn clicking_non_interactive_node_is_a_no_op() -> Result<()> {
        let mut app = App::new()?;
        app.click("diag-category")?;
        app.assert_active_section("landing")?;
        assert!(app.pending_timers().is_empty());
        Ok(())
    }

    #[test]
    fn assertion_failure_carries_snippet() -> Result<()> {
        let app = App::new()?;
        let err = app
            .assert_text("service-line", "wrong")
            .expect_err("mismatch should fail");
        match err {
            Error::AssertionFailed {
                actual, snippet, ..
            } => {
                assert_eq!(actual, "Roof leak repair");
                assert!(!snippet.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
