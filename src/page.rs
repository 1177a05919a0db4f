//! The seam between the controller and whatever renders the match list.
//!
//! Handles are plain indices assigned by the host. Cards are numbered in
//! document order at startup and keep their number for the page's lifetime.

use thiserror::Error;

use crate::state::{GridLayout, MatchCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BarId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),
    #[error("host error: {0}")]
    Host(String),
}

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolButton {
    Print,
    Export,
}

impl ToolButton {
    pub fn class_name(self) -> &'static str {
        match self {
            ToolButton::Print => "btn btn-sm btn-outline-secondary ml-2",
            ToolButton::Export => "btn btn-sm btn-outline-info ml-2",
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            ToolButton::Print => r#"<i class="fas fa-print mr-1"></i> Print"#,
            ToolButton::Export => r#"<i class="fas fa-download mr-1"></i> Export"#,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolButton::Print => "Print",
            ToolButton::Export => "Export",
        }
    }
}

/// Raw values read off one card's markup, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardMarkup {
    /// Text of `.card-title`, `None` when the card has no title element.
    pub title: Option<String>,
    /// `Some` when the card has a `.progress-bar`, holding its `aria-valuenow`.
    pub indicator: Option<Option<String>>,
    /// Full text content of the card.
    pub text: String,
    /// Text of each `.bg-light .small` element, as written.
    pub reasons: Vec<String>,
}

impl CardMarkup {
    pub fn into_card(self) -> MatchCard {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let has_indicator = self.indicator.is_some();
        MatchCard::new(
            title,
            self.indicator.flatten(),
            has_indicator,
            self.text,
            self.reasons,
        )
    }
}

pub const LOADING_CONTENT: &str = r#"<i class="fas fa-spinner fa-spin mr-1"></i> Loading..."#;

/// Everything the controller needs from a rendered match list.
pub trait MatchPage {
    /// Snapshot of every match card, in document order.
    fn match_cards(&self) -> Vec<MatchCard>;

    /// Activates tooltips on every trigger; returns how many were activated.
    fn activate_tooltips(&mut self) -> PageResult<usize>;

    /// Smooth-scrolls the element addressed by `fragment` (including `#`) to the top.
    fn scroll_to_fragment(&mut self, fragment: &str) -> PageResult<()>;

    fn action_buttons(&self) -> Vec<ButtonId>;
    fn button_marked_disabled(&self, button: ButtonId) -> PageResult<bool>;
    fn button_content(&self, button: ButtonId) -> PageResult<String>;
    fn set_button_state(&mut self, button: ButtonId, content: &str, disabled: bool) -> PageResult<()>;

    fn progress_bars(&self) -> Vec<BarId>;
    fn bar_width(&self, bar: BarId) -> PageResult<String>;
    fn set_bar_width(&mut self, bar: BarId, width: &str, transition: Option<&str>) -> PageResult<()>;

    /// Inserts the search / sort / tier controls ahead of the tab content.
    fn inject_toolbar(&mut self) -> PageResult<()>;
    fn focus_search(&mut self) -> PageResult<()>;
    fn set_search_value(&mut self, value: &str) -> PageResult<()>;

    fn set_card_visible(&mut self, card: CardId, visible: bool) -> PageResult<()>;
    fn set_card_layout(&mut self, card: CardId, layout: GridLayout) -> PageResult<()>;

    /// Cards of the currently active tab, in their current order.
    fn active_tab_cards(&self) -> PageResult<Vec<CardId>>;
    /// Appends each card's container to the active tab's container, in `order`.
    fn reorder_active_tab(&mut self, order: &[CardId]) -> PageResult<()>;

    fn inject_tool_button(&mut self, kind: ToolButton) -> PageResult<ButtonId>;

    fn viewport_width(&self) -> u32;
    fn print(&mut self) -> PageResult<()>;
    fn download(&mut self, file_name: &str, contents: &str) -> PageResult<()>;
}
