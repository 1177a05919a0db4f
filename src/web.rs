//! Browser host: binds the controller to the live document through `web-sys`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, KeyboardEvent, Node, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

use crate::config::BoardConfig;
use crate::controller::{Controller, Deferred, KeyPress, PageEvent};
use crate::export;
use crate::page::{
    BarId, ButtonId, CardId, CardMarkup, MatchPage, PageError, PageResult, ToolButton,
};
use crate::state::{GridLayout, MatchCard};

const TAB_CONTENT_ID: &str = "matchTabContent";
const SEARCH_ID: &str = "searchMatches";
const SORT_ID: &str = "sortBy";
const TIER_ID: &str = "filterBy";

const TOOLBAR_HTML: &str = r#"
<div class="row mb-3">
    <div class="col-md-6">
        <div class="input-group">
            <span class="input-group-text"><i class="fas fa-search"></i></span>
            <input type="text" class="form-control" id="searchMatches" placeholder="Search matches...">
        </div>
    </div>
    <div class="col-md-3">
        <select class="form-control" id="sortBy">
            <option value="score">Sort by Match Score</option>
            <option value="date">Sort by Date</option>
            <option value="name">Sort by Name</option>
        </select>
    </div>
    <div class="col-md-3">
        <select class="form-control" id="filterBy">
            <option value="all">All Matches</option>
            <option value="excellent">Excellent Only</option>
            <option value="good">Good &amp; Above</option>
        </select>
    </div>
</div>
"#;

fn host_err(err: JsValue) -> PageError {
    PageError::Host(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default()
}

pub struct DomPage {
    window: Window,
    document: Document,
    cards: Vec<Element>,
    buttons: Vec<HtmlElement>,
    bars: Vec<HtmlElement>,
    search: Option<HtmlInputElement>,
    sort_select: Option<HtmlSelectElement>,
    tier_select: Option<HtmlSelectElement>,
}

impl DomPage {
    pub fn new(window: Window, document: Document) -> Self {
        let cards = query_all(&document, ".match-card");
        let buttons = query_all(&document, ".btn")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        let bars = query_all(&document, ".progress-bar")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        Self {
            window,
            document,
            cards,
            buttons,
            bars,
            search: None,
            sort_select: None,
            tier_select: None,
        }
    }

    fn card(&self, card: CardId) -> PageResult<&Element> {
        self.cards.get(card.0).ok_or(PageError::NotFound("match card"))
    }

    fn card_container(&self, card: CardId) -> PageResult<HtmlElement> {
        self.card(card)?
            .parent_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(PageError::NotFound("card container"))
    }

    fn button(&self, button: ButtonId) -> PageResult<&HtmlElement> {
        self.buttons.get(button.0).ok_or(PageError::NotFound("button"))
    }

    fn bar(&self, bar: BarId) -> PageResult<&HtmlElement> {
        let el = self.bars.get(bar.0).ok_or(PageError::NotFound("progress bar"))?;
        if !el.is_connected() {
            return Err(PageError::NotFound("progress bar"));
        }
        Ok(el)
    }

    fn active_container(&self) -> PageResult<Element> {
        self.document
            .query_selector(".tab-pane.active .row")
            .map_err(host_err)?
            .ok_or(PageError::NotFound("active tab container"))
    }

    fn card_index(&self, el: &Element) -> Option<usize> {
        let node: &Node = el;
        self.cards.iter().position(|card| card.is_same_node(Some(node)))
    }
}

impl MatchPage for DomPage {
    fn match_cards(&self) -> Vec<MatchCard> {
        self.cards
            .iter()
            .map(|card| {
                let title = card
                    .query_selector(".card-title")
                    .ok()
                    .flatten()
                    .map(|el| text_of(&el));
                let indicator = card
                    .query_selector(".progress-bar")
                    .ok()
                    .flatten()
                    .map(|el| el.get_attribute("aria-valuenow"));
                let reasons = card
                    .query_selector_all(".bg-light .small")
                    .map(elements)
                    .unwrap_or_default()
                    .iter()
                    .map(text_of)
                    .collect();
                CardMarkup {
                    title,
                    indicator,
                    text: text_of(card),
                    reasons,
                }
                .into_card()
            })
            .collect()
    }

    fn activate_tooltips(&mut self) -> PageResult<usize> {
        let triggers = query_all(&self.document, r#"[data-toggle="tooltip"]"#);
        if triggers.is_empty() {
            return Ok(0);
        }
        let bootstrap = Reflect::get(&self.window, &JsValue::from_str("bootstrap"))
            .map_err(host_err)?;
        if bootstrap.is_undefined() {
            return Err(PageError::NotFound("bootstrap"));
        }
        let ctor = Reflect::get(&bootstrap, &JsValue::from_str("Tooltip"))
            .map_err(host_err)?
            .dyn_into::<Function>()
            .map_err(|_| PageError::NotFound("bootstrap.Tooltip"))?;
        for trigger in &triggers {
            Reflect::construct(&ctor, &Array::of1(trigger)).map_err(host_err)?;
        }
        Ok(triggers.len())
    }

    fn scroll_to_fragment(&mut self, fragment: &str) -> PageResult<()> {
        // An invalid selector such as a bare "#" resolves to nothing.
        let target = self
            .document
            .query_selector(fragment)
            .ok()
            .flatten()
            .ok_or(PageError::NotFound("scroll target"))?;
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn action_buttons(&self) -> Vec<ButtonId> {
        (0..self.buttons.len()).map(ButtonId).collect()
    }

    fn button_marked_disabled(&self, button: ButtonId) -> PageResult<bool> {
        Ok(self.button(button)?.class_list().contains("disabled"))
    }

    fn button_content(&self, button: ButtonId) -> PageResult<String> {
        Ok(self.button(button)?.inner_html())
    }

    fn set_button_state(&mut self, button: ButtonId, content: &str, disabled: bool) -> PageResult<()> {
        let el = self.button(button)?;
        el.set_inner_html(content);
        match el.dyn_ref::<HtmlButtonElement>() {
            Some(btn) => btn.set_disabled(disabled),
            None => {
                Reflect::set(el, &JsValue::from_str("disabled"), &JsValue::from_bool(disabled))
                    .map_err(host_err)?;
            }
        }
        Ok(())
    }

    fn progress_bars(&self) -> Vec<BarId> {
        (0..self.bars.len()).map(BarId).collect()
    }

    fn bar_width(&self, bar: BarId) -> PageResult<String> {
        self.bar(bar)?
            .style()
            .get_property_value("width")
            .map_err(host_err)
    }

    fn set_bar_width(&mut self, bar: BarId, width: &str, transition: Option<&str>) -> PageResult<()> {
        let style = self.bar(bar)?.style();
        if let Some(transition) = transition {
            style.set_property("transition", transition).map_err(host_err)?;
        }
        style.set_property("width", width).map_err(host_err)
    }

    fn inject_toolbar(&mut self) -> PageResult<()> {
        let tab_content = self
            .document
            .get_element_by_id(TAB_CONTENT_ID)
            .ok_or(PageError::NotFound("tab content"))?;
        tab_content
            .insert_adjacent_html("beforebegin", TOOLBAR_HTML)
            .map_err(host_err)?;
        self.search = self
            .document
            .get_element_by_id(SEARCH_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        self.sort_select = self
            .document
            .get_element_by_id(SORT_ID)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        self.tier_select = self
            .document
            .get_element_by_id(TIER_ID)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        Ok(())
    }

    fn focus_search(&mut self) -> PageResult<()> {
        self.search
            .as_ref()
            .ok_or(PageError::NotFound("search field"))?
            .focus()
            .map_err(host_err)
    }

    fn set_search_value(&mut self, value: &str) -> PageResult<()> {
        self.search
            .as_ref()
            .ok_or(PageError::NotFound("search field"))?
            .set_value(value);
        Ok(())
    }

    fn set_card_visible(&mut self, card: CardId, visible: bool) -> PageResult<()> {
        let display = if visible { "block" } else { "none" };
        self.card_container(card)?
            .style()
            .set_property("display", display)
            .map_err(host_err)
    }

    fn set_card_layout(&mut self, card: CardId, layout: GridLayout) -> PageResult<()> {
        let classes = self.card_container(card)?.class_list();
        for class in layout.remove_classes() {
            classes.remove_1(class).map_err(host_err)?;
        }
        for class in layout.add_classes() {
            classes.add_1(class).map_err(host_err)?;
        }
        Ok(())
    }

    fn active_tab_cards(&self) -> PageResult<Vec<CardId>> {
        let container = self.active_container()?;
        let found = container
            .query_selector_all(".match-card")
            .map(elements)
            .map_err(host_err)?;
        Ok(found
            .iter()
            .filter_map(|el| self.card_index(el))
            .map(CardId)
            .collect())
    }

    fn reorder_active_tab(&mut self, order: &[CardId]) -> PageResult<()> {
        let container = self.active_container()?;
        for card in order {
            let item = self.card_container(*card)?;
            container.append_child(&item).map_err(host_err)?;
        }
        Ok(())
    }

    fn inject_tool_button(&mut self, kind: ToolButton) -> PageResult<ButtonId> {
        let header = self
            .document
            .query_selector(".card-header")
            .map_err(host_err)?
            .ok_or(PageError::NotFound("card header"))?;
        let tools = header
            .query_selector(".card-tools")
            .map_err(host_err)?
            .ok_or(PageError::NotFound("card tools"))?;
        let button = self
            .document
            .create_element("button")
            .map_err(host_err)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::Host("button element".to_string()))?;
        button.set_class_name(kind.class_name());
        button.set_inner_html(kind.content());
        tools.append_child(&button).map_err(host_err)?;
        self.buttons.push(button);
        Ok(ButtonId(self.buttons.len() - 1))
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|val| val.as_f64())
            .map(|w| w.max(0.0) as u32)
            .unwrap_or(0)
    }

    fn print(&mut self) -> PageResult<()> {
        self.window.print().map_err(host_err)
    }

    fn download(&mut self, file_name: &str, contents: &str) -> PageResult<()> {
        let link = self
            .document
            .create_element("a")
            .map_err(host_err)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::Host("anchor element".to_string()))?;
        link.set_attribute("href", &export::data_uri(contents))
            .map_err(host_err)?;
        link.set_attribute("download", file_name).map_err(host_err)?;
        link.click();
        Ok(())
    }
}

struct Mounted {
    controller: Controller,
    page: DomPage,
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// A mounted match board. Dropping it, or calling `dispose`, removes every
/// listener it registered; timers still pending afterwards do nothing.
#[wasm_bindgen]
pub struct MatchBoard {
    _shared: Rc<RefCell<Mounted>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl MatchBoard {
    pub fn dispose(mut self) {
        self.listeners.clear();
    }
}

fn dispatch(shared: &Rc<RefCell<Mounted>>, event: PageEvent) -> bool {
    // A listener fired while another is still running (e.g. from a synchronous
    // DOM call) is dropped rather than re-entering the controller.
    let outcome = {
        let Ok(mut mounted) = shared.try_borrow_mut() else {
            return false;
        };
        let Mounted { controller, page } = &mut *mounted;
        controller.handle(page, event)
    };
    schedule(shared, outcome.deferred);
    flush_logs(shared);
    outcome.prevent_default
}

fn schedule(shared: &Rc<RefCell<Mounted>>, deferred: Vec<Deferred>) {
    for Deferred { delay, task } in deferred {
        let weak = Rc::downgrade(shared);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            if let Some(shared) = weak.upgrade() {
                dispatch(&shared, PageEvent::Timer(task));
            }
        })
        .forget();
    }
}

fn flush_logs(shared: &Rc<RefCell<Mounted>>) {
    let Ok(mut mounted) = shared.try_borrow_mut() else {
        return;
    };
    for line in mounted.controller.drain_unread_logs() {
        web_sys::console::debug_1(&JsValue::from_str(&line));
    }
}

fn listen(
    shared: &Rc<RefCell<Mounted>>,
    target: EventTarget,
    kind: &'static str,
    to_event: impl Fn(&web_sys::Event) -> Option<PageEvent> + 'static,
) -> Result<Listener, JsValue> {
    let weak = Rc::downgrade(shared);
    let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let Some(page_event) = to_event(&event) else {
            return;
        };
        if dispatch(&shared, page_event) {
            event.prevent_default();
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    Ok(Listener {
        target,
        kind,
        callback,
    })
}

fn current_value(event: &web_sys::Event) -> Option<String> {
    let target = event.current_target()?;
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    target.dyn_ref::<HtmlSelectElement>().map(|select| select.value())
}

/// Initializes the match board on the current document.
#[wasm_bindgen]
pub fn mount() -> Result<MatchBoard, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut page = DomPage::new(window.clone(), document.clone());
    let (controller, deferred) = Controller::init(&mut page, BoardConfig::default());
    let shared = Rc::new(RefCell::new(Mounted { controller, page }));
    schedule(&shared, deferred);
    flush_logs(&shared);

    let mut listeners = Vec::new();

    for anchor in query_all(&document, r##"a[href^="#"]"##) {
        listeners.push(listen(&shared, anchor.into(), "click", |event| {
            let href = event
                .current_target()?
                .dyn_ref::<Element>()?
                .get_attribute("href")?;
            Some(PageEvent::AnchorClick { fragment: href })
        })?);
    }

    let (buttons, search, sort_select, tier_select) = {
        let mounted = shared.borrow();
        (
            mounted.page.buttons.clone(),
            mounted.page.search.clone(),
            mounted.page.sort_select.clone(),
            mounted.page.tier_select.clone(),
        )
    };

    for (idx, button) in buttons.into_iter().enumerate() {
        listeners.push(listen(&shared, button.into(), "click", move |_| {
            Some(PageEvent::ButtonClick(ButtonId(idx)))
        })?);
    }

    if let Some(search) = search {
        listeners.push(listen(&shared, search.into(), "input", |event| {
            current_value(event).map(PageEvent::SearchInput)
        })?);
    }
    if let Some(select) = sort_select {
        listeners.push(listen(&shared, select.into(), "change", |event| {
            current_value(event).map(PageEvent::SortChanged)
        })?);
    }
    if let Some(select) = tier_select {
        listeners.push(listen(&shared, select.into(), "change", |event| {
            current_value(event).map(PageEvent::TierChanged)
        })?);
    }

    listeners.push(listen(&shared, document.into(), "keydown", |event| {
        let key = event.dyn_ref::<KeyboardEvent>()?;
        Some(PageEvent::KeyDown(KeyPress {
            key: key.key(),
            ctrl: key.ctrl_key(),
            meta: key.meta_key(),
        }))
    })?);

    listeners.push(listen(&shared, window.into(), "resize", |_| {
        Some(PageEvent::Resize)
    })?);

    Ok(MatchBoard {
        _shared: shared,
        listeners,
    })
}
