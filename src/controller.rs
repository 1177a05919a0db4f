use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::config::BoardConfig;
use crate::export;
use crate::page::{BarId, ButtonId, CardId, LOADING_CONTENT, MatchPage, ToolButton};
use crate::state::{GridLayout, MatchCard, SortKey, Tier, ToolbarState, sort_order};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            meta: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    RestoreButton(ButtonId),
    RevealBar { bar: BarId, width: String },
}

/// A continuation the host must run after `delay` by feeding
/// `PageEvent::Timer(task)` back into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred {
    pub delay: Duration,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    SearchInput(String),
    SortChanged(String),
    TierChanged(String),
    KeyDown(KeyPress),
    AnchorClick { fragment: String },
    ButtonClick(ButtonId),
    Resize,
    Timer(Task),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub prevent_default: bool,
    pub deferred: Vec<Deferred>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Restore the button once the delay elapses.
    After(Duration),
    /// The host calls [`Controller::complete_button`] itself.
    Manual,
}

/// The work a clicked action button stands for. The loading indicator is
/// shown from the click until the work completes.
pub trait ButtonWork {
    fn begin(&mut self, button: ButtonId, tool: Option<ToolButton>) -> Completion;
}

#[derive(Debug, Clone, Copy)]
pub struct SimulatedDelay(pub Duration);

impl ButtonWork for SimulatedDelay {
    fn begin(&mut self, _button: ButtonId, _tool: Option<ToolButton>) -> Completion {
        Completion::After(self.0)
    }
}

pub struct Controller {
    config: BoardConfig,
    cards: Vec<MatchCard>,
    toolbar: ToolbarState,
    toolbar_present: bool,
    layout: Option<GridLayout>,
    applied_visibility: Vec<Option<bool>>,
    applied_layout: Vec<Option<GridLayout>>,
    action_buttons: HashSet<ButtonId>,
    tool_buttons: HashMap<ButtonId, ToolButton>,
    busy: HashMap<ButtonId, String>,
    work: Box<dyn ButtonWork>,
    logs: VecDeque<String>,
    unread_logs: usize,
}

impl Controller {
    pub fn init<P: MatchPage>(page: &mut P, config: BoardConfig) -> (Self, Vec<Deferred>) {
        let work = SimulatedDelay(config.loading_delay);
        Self::init_with_work(page, config, Box::new(work))
    }

    pub fn init_with_work<P: MatchPage>(
        page: &mut P,
        config: BoardConfig,
        work: Box<dyn ButtonWork>,
    ) -> (Self, Vec<Deferred>) {
        let cards = page.match_cards();
        let count = cards.len();
        let mut controller = Self {
            config,
            cards,
            toolbar: ToolbarState::new(),
            toolbar_present: false,
            layout: None,
            applied_visibility: vec![None; count],
            applied_layout: vec![None; count],
            action_buttons: HashSet::new(),
            tool_buttons: HashMap::new(),
            busy: HashMap::new(),
            work,
            logs: VecDeque::new(),
            unread_logs: 0,
        };

        match page.activate_tooltips() {
            Ok(0) => {}
            Ok(n) => controller.push_log(format!("[INFO] Tooltips enabled: {n}")),
            Err(err) => controller.push_log(format!("[INFO] Tooltips skipped: {err}")),
        }

        controller.action_buttons = page.action_buttons().into_iter().collect();
        let deferred = controller.prepare_progress_bars(page);

        match page.inject_toolbar() {
            Ok(()) => controller.toolbar_present = true,
            Err(err) => controller.push_log(format!("[INFO] Toolbar skipped: {err}")),
        }

        for tool in [ToolButton::Print, ToolButton::Export] {
            match page.inject_tool_button(tool) {
                Ok(id) => {
                    controller.tool_buttons.insert(id, tool);
                    controller.action_buttons.insert(id);
                }
                Err(err) => {
                    controller.push_log(format!("[INFO] {} button skipped: {err}", tool.label()))
                }
            }
        }

        controller.apply_layout(page);
        controller.push_log(format!("[INFO] Match board ready ({count} cards)"));
        (controller, deferred)
    }

    pub fn handle<P: MatchPage>(&mut self, page: &mut P, event: PageEvent) -> Outcome {
        let mut outcome = Outcome::default();
        match event {
            PageEvent::SearchInput(value) => {
                self.toolbar.search = value;
                self.apply_filter(page);
            }
            PageEvent::TierChanged(raw) => match Tier::parse(&raw) {
                Some(tier) => {
                    self.toolbar.tier = tier;
                    self.apply_filter(page);
                }
                None => self.push_log(format!("[WARN] Unknown filter: {raw}")),
            },
            PageEvent::SortChanged(raw) => match SortKey::parse(&raw) {
                Some(key) => {
                    self.toolbar.sort = key;
                    self.apply_sort(page);
                }
                None => self.push_log(format!("[WARN] Unknown sort: {raw}")),
            },
            PageEvent::KeyDown(key) => self.on_key(page, &key, &mut outcome),
            PageEvent::AnchorClick { fragment } => {
                outcome.prevent_default = true;
                if let Err(err) = page.scroll_to_fragment(&fragment) {
                    self.push_log(format!("[INFO] Scroll target {fragment}: {err}"));
                }
            }
            PageEvent::ButtonClick(button) => self.on_button_click(page, button, &mut outcome),
            PageEvent::Resize => self.apply_layout(page),
            PageEvent::Timer(task) => self.run_task(page, task),
        }
        outcome
    }

    /// Restores a button whose work reported [`Completion::Manual`].
    pub fn complete_button<P: MatchPage>(&mut self, page: &mut P, button: ButtonId) {
        let Some(content) = self.busy.remove(&button) else {
            return;
        };
        if let Err(err) = page.set_button_state(button, &content, false) {
            self.push_log(format!("[WARN] Button restore failed: {err}"));
        }
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn toolbar_present(&self) -> bool {
        self.toolbar_present
    }

    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn layout(&self) -> Option<GridLayout> {
        self.layout
    }

    pub fn is_busy(&self, button: ButtonId) -> bool {
        self.busy.contains_key(&button)
    }

    pub fn tool_button(&self, tool: ToolButton) -> Option<ButtonId> {
        self.tool_buttons
            .iter()
            .find(|(_, kind)| **kind == tool)
            .map(|(id, _)| *id)
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    /// Log lines pushed since the previous call, oldest first.
    pub fn drain_unread_logs(&mut self) -> Vec<String> {
        let unread = self.unread_logs.min(self.logs.len());
        self.unread_logs = 0;
        self.logs
            .iter()
            .skip(self.logs.len() - unread)
            .cloned()
            .collect()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        self.unread_logs += 1;
        while self.logs.len() > self.config.max_logs {
            self.logs.pop_front();
        }
    }

    fn prepare_progress_bars<P: MatchPage>(&mut self, page: &mut P) -> Vec<Deferred> {
        let mut deferred = Vec::new();
        for bar in page.progress_bars() {
            let width = match page.bar_width(bar) {
                Ok(width) => width,
                Err(err) => {
                    self.push_log(format!("[WARN] Progress bar {}: {err}", bar.0));
                    continue;
                }
            };
            if let Err(err) = page.set_bar_width(bar, "0%", None) {
                self.push_log(format!("[WARN] Progress bar {}: {err}", bar.0));
                continue;
            }
            deferred.push(Deferred {
                delay: self.config.reveal_delay,
                task: Task::RevealBar { bar, width },
            });
        }
        deferred
    }

    fn on_key<P: MatchPage>(&mut self, page: &mut P, key: &KeyPress, outcome: &mut Outcome) {
        if (key.ctrl || key.meta) && key.key == "k" {
            outcome.prevent_default = true;
            if self.toolbar_present
                && let Err(err) = page.focus_search()
            {
                self.push_log(format!("[INFO] Search focus: {err}"));
            }
        }

        if key.key == "Escape" && self.toolbar_present && !self.toolbar.search.is_empty() {
            self.toolbar.search.clear();
            if let Err(err) = page.set_search_value("") {
                self.push_log(format!("[WARN] Search reset: {err}"));
            }
            self.apply_filter(page);
        }
    }

    fn on_button_click<P: MatchPage>(&mut self, page: &mut P, button: ButtonId, outcome: &mut Outcome) {
        let tool = self.tool_buttons.get(&button).copied();

        if self.action_buttons.contains(&button)
            && let Some(deferred) = self.start_loading(page, button, tool)
        {
            outcome.deferred.push(deferred);
        }

        match tool {
            Some(ToolButton::Print) => {
                if let Err(err) = page.print() {
                    self.push_log(format!("[WARN] Print: {err}"));
                }
            }
            Some(ToolButton::Export) => self.export(page),
            None => {}
        }
    }

    fn start_loading<P: MatchPage>(
        &mut self,
        page: &mut P,
        button: ButtonId,
        tool: Option<ToolButton>,
    ) -> Option<Deferred> {
        if self.busy.contains_key(&button) {
            return None;
        }
        match page.button_marked_disabled(button) {
            Ok(false) => {}
            Ok(true) => return None,
            Err(err) => {
                self.push_log(format!("[WARN] Button {}: {err}", button.0));
                return None;
            }
        }
        let content = match page.button_content(button) {
            Ok(content) => content,
            Err(err) => {
                self.push_log(format!("[WARN] Button {}: {err}", button.0));
                return None;
            }
        };
        if let Err(err) = page.set_button_state(button, LOADING_CONTENT, true) {
            self.push_log(format!("[WARN] Button {}: {err}", button.0));
            return None;
        }
        self.busy.insert(button, content);
        match self.work.begin(button, tool) {
            Completion::After(delay) => Some(Deferred {
                delay,
                task: Task::RestoreButton(button),
            }),
            Completion::Manual => None,
        }
    }

    fn run_task<P: MatchPage>(&mut self, page: &mut P, task: Task) {
        match task {
            Task::RestoreButton(button) => self.complete_button(page, button),
            Task::RevealBar { bar, width } => {
                let transition = self.config.reveal_transition.clone();
                if let Err(err) = page.set_bar_width(bar, &width, Some(&transition)) {
                    self.push_log(format!("[WARN] Progress bar {}: {err}", bar.0));
                }
            }
        }
    }

    fn apply_filter<P: MatchPage>(&mut self, page: &mut P) {
        let visibility = self.toolbar.visibility(&self.cards);
        for (idx, visible) in visibility.into_iter().enumerate() {
            if self.applied_visibility[idx] == Some(visible) {
                continue;
            }
            match page.set_card_visible(CardId(idx), visible) {
                Ok(()) => self.applied_visibility[idx] = Some(visible),
                Err(err) => self.push_log(format!("[WARN] Card {idx}: {err}")),
            }
        }
    }

    fn apply_sort<P: MatchPage>(&mut self, page: &mut P) {
        let active = match page.active_tab_cards() {
            Ok(active) => active,
            Err(err) => {
                self.push_log(format!("[WARN] Sort skipped: {err}"));
                return;
            }
        };
        let subset: Vec<usize> = active.iter().map(|card| card.0).collect();
        let Some(order) = sort_order(&self.cards, &subset, self.toolbar.sort) else {
            self.push_log("[INFO] Date sort unavailable: cards carry no date");
            return;
        };
        let order: Vec<CardId> = order.into_iter().map(CardId).collect();
        if let Err(err) = page.reorder_active_tab(&order) {
            self.push_log(format!("[WARN] Sort failed: {err}"));
        }
    }

    fn apply_layout<P: MatchPage>(&mut self, page: &mut P) {
        let layout = GridLayout::for_width(page.viewport_width(), self.config.breakpoint);
        self.layout = Some(layout);
        for idx in 0..self.cards.len() {
            if self.applied_layout[idx] == Some(layout) {
                continue;
            }
            match page.set_card_layout(CardId(idx), layout) {
                Ok(()) => self.applied_layout[idx] = Some(layout),
                Err(err) => self.push_log(format!("[WARN] Card {idx}: {err}")),
            }
        }
    }

    fn export<P: MatchPage>(&mut self, page: &mut P) {
        let json = match export::export_json(&self.cards) {
            Ok(json) => json,
            Err(err) => {
                self.push_log(format!("[WARN] Export failed: {err:#}"));
                return;
            }
        };
        let file_name = self.config.export_file.clone();
        match page.download(&file_name, &json) {
            Ok(()) => self.push_log(format!(
                "[INFO] Exported {} matches to {file_name}",
                self.cards.len()
            )),
            Err(err) => self.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

