use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const GOOD_THRESHOLD: i64 = 60;
pub const EXCELLENT_THRESHOLD: i64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Value(i64),
    /// The card has no progress indicator at all.
    Missing,
    /// The indicator exists but its value attribute is absent or not a number.
    Unparsable,
}

impl Score {
    pub fn from_attribute(raw: Option<&str>) -> Self {
        match raw.and_then(parse_leading_int) {
            Some(value) => Score::Value(value),
            None => Score::Unparsable,
        }
    }

    fn tier_value(self) -> Option<i64> {
        match self {
            Score::Value(v) => Some(v),
            Score::Missing => Some(0),
            Score::Unparsable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    pub title: String,
    /// Raw progress attribute, exported verbatim. `None` when the card has no
    /// indicator or the indicator carries no value.
    pub score_raw: Option<String>,
    pub score: Score,
    /// Full visible text of the card subtree.
    pub text: String,
    pub reasons: Vec<String>,
}

impl MatchCard {
    pub fn new(
        title: impl Into<String>,
        score_raw: Option<String>,
        has_indicator: bool,
        text: impl Into<String>,
        reasons: Vec<String>,
    ) -> Self {
        let score = if has_indicator {
            Score::from_attribute(score_raw.as_deref())
        } else {
            Score::Missing
        };
        Self {
            title: title.into(),
            score_raw,
            score,
            text: text.into(),
            reasons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Score,
    Date,
    Name,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Score, SortKey::Date, SortKey::Name];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "score" => Some(SortKey::Score),
            "date" => Some(SortKey::Date),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::Date => "date",
            SortKey::Name => "name",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::Score => SortKey::Date,
            SortKey::Date => SortKey::Name,
            SortKey::Name => SortKey::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    All,
    Excellent,
    Good,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::All, Tier::Excellent, Tier::Good];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(Tier::All),
            "excellent" => Some(Tier::Excellent),
            "good" => Some(Tier::Good),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::All => "all",
            Tier::Excellent => "excellent",
            Tier::Good => "good",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tier::All => Tier::Excellent,
            Tier::Excellent => Tier::Good,
            Tier::Good => Tier::All,
        }
    }

    pub fn admits(self, score: Score) -> bool {
        let threshold = match self {
            Tier::All => return true,
            Tier::Excellent => EXCELLENT_THRESHOLD,
            Tier::Good => GOOD_THRESHOLD,
        };
        // A non-numeric score never compares below a threshold.
        score.tier_value().is_none_or(|v| v >= threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayout {
    /// `col-12`
    SingleColumn,
    /// `col-md-6 col-lg-4`
    MultiColumn,
}

pub const SINGLE_COLUMN_CLASSES: &[&str] = &["col-12"];
pub const MULTI_COLUMN_CLASSES: &[&str] = &["col-md-6", "col-lg-4"];

impl GridLayout {
    pub fn for_width(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            GridLayout::SingleColumn
        } else {
            GridLayout::MultiColumn
        }
    }

    pub fn is_mobile(self) -> bool {
        self == GridLayout::SingleColumn
    }

    pub fn add_classes(self) -> &'static [&'static str] {
        match self {
            GridLayout::SingleColumn => SINGLE_COLUMN_CLASSES,
            GridLayout::MultiColumn => MULTI_COLUMN_CLASSES,
        }
    }

    pub fn remove_classes(self) -> &'static [&'static str] {
        match self {
            GridLayout::SingleColumn => MULTI_COLUMN_CLASSES,
            GridLayout::MultiColumn => SINGLE_COLUMN_CLASSES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    pub search: String,
    pub sort: SortKey,
    pub tier: Tier,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolbarState {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::Score,
            tier: Tier::All,
        }
    }

    pub fn shows(&self, card: &MatchCard) -> bool {
        if !self.search.is_empty() && !contains_ci(&card.text, &self.search) {
            return false;
        }
        self.tier.admits(card.score)
    }

    /// Visibility of every card, index-aligned with `cards`.
    pub fn visibility(&self, cards: &[MatchCard]) -> Vec<bool> {
        cards.iter().map(|card| self.shows(card)).collect()
    }

    pub fn visible_indices(&self, cards: &[MatchCard]) -> Vec<usize> {
        cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.shows(card))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Sorted order of `subset` (indices into `cards`). `None` when the key has no
/// comparator and the order should stay as it is.
pub fn sort_order(cards: &[MatchCard], subset: &[usize], key: SortKey) -> Option<Vec<usize>> {
    let mut order: Vec<usize> = subset
        .iter()
        .copied()
        .filter(|idx| *idx < cards.len())
        .collect();
    match key {
        SortKey::Score => {
            order.sort_by(|a, b| compare_scores_desc(cards[*a].score, cards[*b].score))
        }
        SortKey::Name => {
            order.sort_by(|a, b| locale_cmp(cards[*a].title.trim(), cards[*b].title.trim()))
        }
        SortKey::Date => return None,
    }
    Some(order)
}

fn compare_scores_desc(a: Score, b: Score) -> Ordering {
    match (a.tier_value(), b.tier_value()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Title comparison in collation order: base letters first (accents and case
/// stripped, so "Émile" sits with the other "E" titles), then accents, then
/// lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> {
    s.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> {
    s.nfd().flat_map(char::to_lowercase)
}

/// Case-insensitive substring search.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle.is_ascii() {
        let h = haystack.as_bytes();
        let n = needle.as_bytes();
        if n.len() > h.len() {
            return false;
        }
        return h
            .windows(n.len())
            .any(|window| window.iter().zip(n).all(|(a, b)| a.eq_ignore_ascii_case(b)));
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Leading-integer parse: optional whitespace and sign, then digits; anything
/// after the digits is ignored.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}
