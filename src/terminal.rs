//! In-memory page used by the terminal host: one tab, cards loaded from an
//! export file, tool buttons in the header, progress bars as percentages.

use std::fs;

use crate::page::{
    BarId, ButtonId, CardId, LOADING_CONTENT, MatchPage, PageError, PageResult, ToolButton,
};
use crate::state::{GridLayout, MatchCard, Score};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermButton {
    pub kind: ToolButton,
    pub content: String,
    pub disabled: bool,
}

impl TermButton {
    pub fn label(&self) -> String {
        plain_label(&self.content)
    }
}

#[derive(Debug, Clone)]
pub struct TerminalPage {
    cards: Vec<MatchCard>,
    order: Vec<usize>,
    visible: Vec<bool>,
    layouts: Vec<GridLayout>,
    bars: Vec<u16>,
    bars_animated: Vec<bool>,
    pub buttons: Vec<TermButton>,
    pub toolbar: bool,
    pub search_focused: bool,
    pub search_value: String,
    pub width: u16,
}

impl TerminalPage {
    pub fn new(cards: Vec<MatchCard>, width: u16) -> Self {
        let count = cards.len();
        let bars = cards.iter().map(|card| target_percent(card.score)).collect();
        Self {
            cards,
            order: (0..count).collect(),
            visible: vec![true; count],
            layouts: vec![GridLayout::MultiColumn; count],
            bars,
            bars_animated: vec![false; count],
            buttons: Vec::new(),
            toolbar: false,
            search_focused: false,
            search_value: String::new(),
            width,
        }
    }

    /// Visible cards in display order, with their current bar percentage.
    pub fn visible_cards(&self) -> Vec<(&MatchCard, u16)> {
        self.order
            .iter()
            .filter(|idx| self.visible[**idx])
            .map(|idx| (&self.cards[*idx], self.bars[*idx]))
            .collect()
    }

    pub fn display_order(&self) -> &[usize] {
        &self.order
    }

    pub fn layout_of(&self, card: usize) -> Option<GridLayout> {
        self.layouts.get(card).copied()
    }

    pub fn bar_animated(&self, card: usize) -> bool {
        self.bars_animated.get(card).copied().unwrap_or(false)
    }

    pub fn button(&self, kind: ToolButton) -> Option<(ButtonId, &TermButton)> {
        self.buttons
            .iter()
            .enumerate()
            .find(|(_, button)| button.kind == kind)
            .map(|(idx, button)| (ButtonId(idx), button))
    }

    fn check_card(&self, card: CardId) -> PageResult<usize> {
        if card.0 < self.cards.len() {
            Ok(card.0)
        } else {
            Err(PageError::NotFound("match card"))
        }
    }

    fn button_mut(&mut self, button: ButtonId) -> PageResult<&mut TermButton> {
        self.buttons
            .get_mut(button.0)
            .ok_or(PageError::NotFound("button"))
    }
}

impl MatchPage for TerminalPage {
    fn match_cards(&self) -> Vec<MatchCard> {
        self.cards.clone()
    }

    fn activate_tooltips(&mut self) -> PageResult<usize> {
        Ok(0)
    }

    fn scroll_to_fragment(&mut self, _fragment: &str) -> PageResult<()> {
        Err(PageError::NotFound("scroll target"))
    }

    fn action_buttons(&self) -> Vec<ButtonId> {
        (0..self.buttons.len()).map(ButtonId).collect()
    }

    fn button_marked_disabled(&self, button: ButtonId) -> PageResult<bool> {
        self.buttons
            .get(button.0)
            .map(|_| false)
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
            .map(|pct| format!("{pct}%"))
            .ok_or(PageError::NotFound("progress bar"))
    }

    fn set_bar_width(&mut self, bar: BarId, width: &str, transition: Option<&str>) -> PageResult<()> {
        let pct = width
            .trim()
            .trim_end_matches('%')
            .parse::<u16>()
            .map_err(|_| PageError::Host(format!("bad width {width}")))?;
        let slot = self
            .bars
            .get_mut(bar.0)
            .ok_or(PageError::NotFound("progress bar"))?;
        *slot = pct.min(100);
        self.bars_animated[bar.0] = transition.is_some();
        Ok(())
    }

    fn inject_toolbar(&mut self) -> PageResult<()> {
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
        self.visible[idx] = visible;
        Ok(())
    }

    fn set_card_layout(&mut self, card: CardId, layout: GridLayout) -> PageResult<()> {
        let idx = self.check_card(card)?;
        self.layouts[idx] = layout;
        Ok(())
    }

    fn active_tab_cards(&self) -> PageResult<Vec<CardId>> {
        Ok(self.order.iter().copied().map(CardId).collect())
    }

    fn reorder_active_tab(&mut self, order: &[CardId]) -> PageResult<()> {
        for card in order {
            let idx = self.check_card(*card)?;
            self.order.retain(|existing| *existing != idx);
            self.order.push(idx);
        }
        Ok(())
    }

    fn inject_tool_button(&mut self, kind: ToolButton) -> PageResult<ButtonId> {
        self.buttons.push(TermButton {
            kind,
            content: kind.content().to_string(),
            disabled: false,
        });
        Ok(ButtonId(self.buttons.len() - 1))
    }

    fn viewport_width(&self) -> u32 {
        u32::from(self.width)
    }

    fn print(&mut self) -> PageResult<()> {
        Err(PageError::Unsupported("print"))
    }

    fn download(&mut self, file_name: &str, contents: &str) -> PageResult<()> {
        fs::write(file_name, contents).map_err(|err| PageError::Host(format!("{file_name}: {err}")))
    }
}

fn target_percent(score: Score) -> u16 {
    match score {
        Score::Value(v) => v.clamp(0, 100) as u16,
        Score::Missing | Score::Unparsable => 0,
    }
}

/// Markup stripped down to its text, e.g. the loading indicator becomes
/// "Loading...".
pub fn plain_label(content: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

pub fn is_loading(button: &TermButton) -> bool {
    button.content == LOADING_CONTENT
}
