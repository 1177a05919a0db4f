#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};

use match_board::page::{
    BarId, ButtonId, CardId, MatchPage, PageError, PageResult, ToolButton,
};
use match_board::state::{GridLayout, MatchCard};

pub fn card(title: &str, score: &str, reasons: &[&str]) -> MatchCard {
    let reasons: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
    let text = format!("{title} Match score {score}% {}", reasons.join(" "));
    MatchCard::new(title, Some(score.to_string()), true, text, reasons)
}

pub fn sample_cards() -> Vec<MatchCard> {
    vec![
        card("Beta", "90", &["Strong Rust background", "Remote friendly"]),
        card("Alpha", "55", &["Junior role"]),
        card("Gamma", "80", &["Same timezone"]),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct FakeButton {
    pub content: String,
    pub disabled: bool,
    pub marked_disabled: bool,
    pub tool: Option<ToolButton>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBar {
    pub width: String,
    pub transition: Option<String>,
    pub removed: bool,
}

/// In-memory page with the same shape as the matches listing markup.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub cards: Vec<MatchCard>,
    pub active_tab: Vec<usize>,
    pub display: HashMap<usize, String>,
    pub classes: HashMap<usize, BTreeSet<String>>,
    pub buttons: Vec<FakeButton>,
    pub bars: Vec<FakeBar>,
    pub tooltip_triggers: usize,
    pub tooltips_active: usize,
    pub fragments: Vec<String>,
    pub scrolled_to: Vec<String>,
    pub has_tab_content: bool,
    pub has_tools: bool,
    pub toolbar: bool,
    pub search_value: String,
    pub search_focused: bool,
    pub width: u32,
    pub prints: usize,
    pub downloads: Vec<(String, String)>,
    pub visibility_writes: usize,
    pub layout_writes: usize,
}

impl FakePage {
    pub fn new(cards: Vec<MatchCard>) -> Self {
        let count = cards.len();
        let bars = cards
            .iter()
            .map(|card| FakeBar {
                width: format!("{}%", card.score_raw.clone().unwrap_or_default()),
                ..FakeBar::default()
            })
            .collect();
        let classes = (0..count)
            .map(|idx| {
                let set = ["col-md-6", "col-lg-4"].iter().map(|c| c.to_string()).collect();
                (idx, set)
            })
            .collect();
        Self {
            cards,
            active_tab: (0..count).collect(),
            classes,
            buttons: vec![FakeButton {
                content: "View profile".to_string(),
                ..FakeButton::default()
            }],
            bars,
            has_tab_content: true,
            has_tools: true,
            width: 1280,
            ..Self::default()
        }
    }

    pub fn visible_titles(&self) -> Vec<String> {
        (0..self.cards.len())
            .filter(|idx| self.display.get(idx).map(String::as_str) != Some("none"))
            .map(|idx| self.cards[idx].title.clone())
            .collect()
    }

    pub fn active_titles(&self) -> Vec<String> {
        self.active_tab
            .iter()
            .map(|idx| self.cards[*idx].title.clone())
            .collect()
    }

    pub fn has_class(&self, card: usize, class: &str) -> bool {
        self.classes.get(&card).is_some_and(|set| set.contains(class))
    }

    pub fn tool(&self, kind: ToolButton) -> Option<ButtonId> {
        self.buttons
            .iter()
            .position(|b| b.tool == Some(kind))
            .map(ButtonId)
    }

    fn button_mut(&mut self, button: ButtonId) -> PageResult<&mut FakeButton> {
        self.buttons
            .get_mut(button.0)
            .ok_or(PageError::NotFound("button"))
    }

    fn bar_mut(&mut self, bar: BarId) -> PageResult<&mut FakeBar> {
        match self.bars.get_mut(bar.0) {
            Some(b) if !b.removed => Ok(b),
            _ => Err(PageError::NotFound("progress bar")),
        }
    }

    fn check_card(&self, card: CardId) -> PageResult<usize> {
        if card.0 < self.cards.len() {
            Ok(card.0)
        } else {
            Err(PageError::NotFound("match card"))
        }
    }
}

impl MatchPage for FakePage {
    fn match_cards(&self) -> Vec<MatchCard> {
        self.cards.clone()
    }

    fn activate_tooltips(&mut self) -> PageResult<usize> {
        self.tooltips_active = self.tooltip_triggers;
        Ok(self.tooltip_triggers)
    }

    fn scroll_to_fragment(&mut self, fragment: &str) -> PageResult<()> {
        if self.fragments.iter().any(|f| f == fragment) {
            self.scrolled_to.push(fragment.to_string());
            Ok(())
        } else {
            Err(PageError::NotFound("scroll target"))
        }
    }

    fn action_buttons(&self) -> Vec<ButtonId> {
        (0..self.buttons.len()).map(ButtonId).collect()
    }

    fn button_marked_disabled(&self, button: ButtonId) -> PageResult<bool> {
        self.buttons
            .get(button.0)
            .map(|b| b.marked_disabled)
            .ok_or(PageError::NotFound("button"))
    }

    fn button_content(&self, button: ButtonId) -> PageResult<String> {
        self.buttons
            .get(button.0)
            .map(|b| b.content.clone())
            .ok_or(PageError::NotFound("button"))
    }

    fn set_button_state(&mut self, button: ButtonId, content: &str, disabled: bool) -> PageResult<()> {
        let button = self.button_mut(button)?;
        button.content = content.to_string();
        button.disabled = disabled;
        Ok(())
    }

    fn progress_bars(&self) -> Vec<BarId> {
        (0..self.bars.len()).map(BarId).collect()
    }

    fn bar_width(&self, bar: BarId) -> PageResult<String> {
        self.bars
            .get(bar.0)
            .map(|b| b.width.clone())
            .ok_or(PageError::NotFound("progress bar"))
    }

    fn set_bar_width(&mut self, bar: BarId, width: &str, transition: Option<&str>) -> PageResult<()> {
        let bar = self.bar_mut(bar)?;
        bar.width = width.to_string();
        if let Some(transition) = transition {
            bar.transition = Some(transition.to_string());
        }
        Ok(())
    }

    fn inject_toolbar(&mut self) -> PageResult<()> {
        if !self.has_tab_content {
            return Err(PageError::NotFound("tab content"));
        }
        self.toolbar = true;
        Ok(())
    }

    fn focus_search(&mut self) -> PageResult<()> {
        if !self.toolbar {
            return Err(PageError::NotFound("search field"));
        }
        self.search_focused = true;
        Ok(())
    }

    fn set_search_value(&mut self, value: &str) -> PageResult<()> {
        self.search_value = value.to_string();
        Ok(())
    }

    fn set_card_visible(&mut self, card: CardId, visible: bool) -> PageResult<()> {
        let idx = self.check_card(card)?;
        self.visibility_writes += 1;
        let display = if visible { "block" } else { "none" };
        self.display.insert(idx, display.to_string());
        Ok(())
    }

    fn set_card_layout(&mut self, card: CardId, layout: GridLayout) -> PageResult<()> {
        let idx = self.check_card(card)?;
        self.layout_writes += 1;
        let set = self.classes.entry(idx).or_default();
        for class in layout.remove_classes() {
            set.remove(*class);
        }
        for class in layout.add_classes() {
            set.insert(class.to_string());
        }
        Ok(())
    }

    fn active_tab_cards(&self) -> PageResult<Vec<CardId>> {
        Ok(self.active_tab.iter().copied().map(CardId).collect())
    }

    fn reorder_active_tab(&mut self, order: &[CardId]) -> PageResult<()> {
        for card in order {
            let idx = self.check_card(*card)?;
            self.active_tab.retain(|existing| *existing != idx);
            self.active_tab.push(idx);
        }
        Ok(())
    }

    fn inject_tool_button(&mut self, kind: ToolButton) -> PageResult<ButtonId> {
        if !self.has_tools {
            return Err(PageError::NotFound("card tools"));
        }
        self.buttons.push(FakeButton {
            content: kind.content().to_string(),
            tool: Some(kind),
            ..FakeButton::default()
        });
        Ok(ButtonId(self.buttons.len() - 1))
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn print(&mut self) -> PageResult<()> {
        self.prints += 1;
        Ok(())
    }

    fn download(&mut self, file_name: &str, contents: &str) -> PageResult<()> {
        self.downloads
            .push((file_name.to_string(), contents.to_string()));
        Ok(())
    }
}
