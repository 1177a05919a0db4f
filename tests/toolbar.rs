mod common;

use match_board::state::{
    GridLayout, MatchCard, Score, SortKey, Tier, ToolbarState, locale_cmp, sort_order,
};

use common::{card, sample_cards};

fn titles(cards: &[MatchCard], order: &[usize]) -> Vec<String> {
    order.iter().map(|idx| cards[*idx].title.clone()).collect()
}

fn mixed_cards() -> Vec<MatchCard> {
    vec![
        card("delta", "61", &["Kotlin"]),
        card("Echo", "79", &["rust, go"]),
        card("alpha", "80", &[]),
        card("Bravo", "59", &["Rust core"]),
        card("charlie", "100", &["Remote"]),
        card("Foxtrot", "0", &[]),
        card("golf", "60", &["RUSTACEAN"]),
    ]
}

#[test]
fn empty_search_and_all_tier_shows_everything() {
    let cards = mixed_cards();
    let toolbar = ToolbarState::new();
    assert!(toolbar.visibility(&cards).into_iter().all(|shown| shown));
}

#[test]
fn tiers_are_exact_and_nested() {
    let cards = mixed_cards();
    let mut toolbar = ToolbarState::new();

    toolbar.tier = Tier::Excellent;
    let excellent = toolbar.visible_indices(&cards);
    toolbar.tier = Tier::Good;
    let good = toolbar.visible_indices(&cards);
    toolbar.tier = Tier::All;
    let all = toolbar.visible_indices(&cards);

    assert_eq!(titles(&cards, &excellent), ["alpha", "charlie"]);
    assert_eq!(titles(&cards, &good), ["delta", "Echo", "alpha", "charlie", "golf"]);
    assert_eq!(all.len(), cards.len());
    assert!(excellent.iter().all(|idx| good.contains(idx)));
    assert!(good.iter().all(|idx| all.contains(idx)));
}

#[test]
fn search_is_case_insensitive_and_intersects_tier() {
    let cards = mixed_cards();
    let mut toolbar = ToolbarState::new();
    toolbar.search = "RuSt".to_string();
    let shown = toolbar.visible_indices(&cards);
    assert_eq!(titles(&cards, &shown), ["Echo", "Bravo", "golf"]);

    toolbar.tier = Tier::Good;
    let shown = toolbar.visible_indices(&cards);
    assert_eq!(titles(&cards, &shown), ["Echo", "golf"]);
}

#[test]
fn search_matches_any_visible_text_not_just_title() {
    let cards = sample_cards();
    let mut toolbar = ToolbarState::new();
    toolbar.search = "timezone".to_string();
    let shown = toolbar.visible_indices(&cards);
    assert_eq!(titles(&cards, &shown), ["Gamma"]);
}

#[test]
fn score_sort_is_descending_and_stable() {
    let cards = vec![
        card("A", "70", &[]),
        card("B", "90", &[]),
        card("C", "70", &[]),
        card("D", "90", &[]),
        card("E", "10", &[]),
    ];
    let subset: Vec<usize> = (0..cards.len()).collect();
    let order = sort_order(&cards, &subset, SortKey::Score).expect("score sorts");
    assert_eq!(titles(&cards, &order), ["B", "D", "A", "C", "E"]);
}

#[test]
fn name_sort_is_non_decreasing() {
    let cards = mixed_cards();
    let subset: Vec<usize> = (0..cards.len()).collect();
    let order = sort_order(&cards, &subset, SortKey::Name).expect("name sorts");
    let sorted = titles(&cards, &order);
    assert_eq!(
        sorted,
        ["alpha", "Bravo", "charlie", "delta", "Echo", "Foxtrot", "golf"]
    );
    for pair in sorted.windows(2) {
        assert_ne!(locale_cmp(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
    }
}

#[test]
fn name_sort_places_accented_initials_with_their_letter() {
    let cards = vec![
        card("Zoe", "70", &[]),
        card("Émile", "70", &[]),
        card("Ángel", "70", &[]),
        card("Bob", "70", &[]),
    ];
    let subset: Vec<usize> = (0..cards.len()).collect();
    let order = sort_order(&cards, &subset, SortKey::Name).expect("name sorts");
    assert_eq!(titles(&cards, &order), ["Ángel", "Bob", "Émile", "Zoe"]);
}

#[test]
fn date_sort_has_no_comparator() {
    let cards = sample_cards();
    assert_eq!(sort_order(&cards, &[0, 1, 2], SortKey::Date), None);
}

#[test]
fn sort_only_touches_the_given_subset() {
    let cards = sample_cards();
    let order = sort_order(&cards, &[1, 2], SortKey::Score).expect("score sorts");
    assert_eq!(order, [2, 1]);
}

#[test]
fn unparsable_scores_sort_last_and_pass_tiers() {
    let cards = vec![
        card("Odd", "n/a", &[]),
        card("Low", "20", &[]),
        MatchCard::new("Bare", None, false, "Bare", Vec::new()),
    ];
    assert_eq!(cards[0].score, Score::Unparsable);
    assert_eq!(cards[2].score, Score::Missing);

    let order = sort_order(&cards, &[0, 1, 2], SortKey::Score).expect("score sorts");
    assert_eq!(titles(&cards, &order), ["Low", "Bare", "Odd"]);

    let mut toolbar = ToolbarState::new();
    toolbar.tier = Tier::Excellent;
    assert_eq!(titles(&cards, &toolbar.visible_indices(&cards)), ["Odd"]);
}

#[test]
fn worked_example_from_three_cards() {
    let cards = sample_cards();
    let order = sort_order(&cards, &[0, 1, 2], SortKey::Score).expect("score sorts");
    assert_eq!(titles(&cards, &order), ["Beta", "Gamma", "Alpha"]);

    let mut toolbar = ToolbarState::new();
    toolbar.tier = Tier::Good;
    assert_eq!(titles(&cards, &toolbar.visible_indices(&cards)), ["Beta", "Gamma"]);
}

#[test]
fn grid_layout_threshold() {
    assert_eq!(GridLayout::for_width(767, 768), GridLayout::SingleColumn);
    assert_eq!(GridLayout::for_width(768, 768), GridLayout::MultiColumn);
    assert!(GridLayout::SingleColumn.is_mobile());
    assert_eq!(GridLayout::SingleColumn.add_classes(), ["col-12"]);
    assert_eq!(GridLayout::MultiColumn.remove_classes(), ["col-12"]);
}

#[test]
fn toolbar_keys_round_trip_their_names() {
    for key in SortKey::ALL {
        assert_eq!(SortKey::parse(key.as_str()), Some(key));
    }
    for tier in Tier::ALL {
        assert_eq!(Tier::parse(tier.as_str()), Some(tier));
    }
    assert_eq!(SortKey::parse("rating"), None);
    assert_eq!(Tier::parse("great"), None);
}
