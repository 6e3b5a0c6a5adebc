use super::*;
use crate::consts::{CLASS_ACTIVE, CLASS_SCROLLED, CLASS_SHOW, THEME_STORAGE_KEY};
use crate::error::Result;
use crate::fake::{FakeNode, FakeViewPort};
use crate::form::{Field, FieldState, SimulatedTransport, SubmitPhase};
use crate::menu::MenuState;
use crate::notify::ToastPhase;
use crate::theme::MemoryStore;

// =============================================================
// Fixtures
// =============================================================

/// Handles into the page built by [`page`].
struct Handles {
    navbar: NodeId,
    links: [NodeId; 3],
    theme_icon: NodeId,
    hamburger: NodeId,
    far_fade: NodeId,
    form: NodeId,
    inputs: Vec<NodeId>,
    notice: NodeId,
    outside: NodeId,
}

/// A one-page portfolio: home 0..800, about 800..1600, contact 1600..2600.
fn page() -> (FakeViewPort, Handles) {
    let mut vp = FakeViewPort::new(800.0);
    let navbar = vp.insert(FakeNode::new("nav").class("navbar").geometry(0.0, 70.0));
    let menu = vp.insert_child(&navbar, FakeNode::new("ul").class("nav-menu"));
    let links = ["home", "about", "contact"].map(|id| {
        let item = vp.insert_child(&menu, FakeNode::new("li"));
        vp.insert_child(&item, FakeNode::new("a").class("nav-link").attr("href", &format!("#{id}")))
    });
    let toggle = vp.insert_child(&navbar, FakeNode::new("button").id("themeToggle"));
    let theme_icon = vp.insert_child(&toggle, FakeNode::new("i").class("fas").class("fa-moon"));
    let hamburger = vp.insert_child(&navbar, FakeNode::new("div").class("hamburger"));

    let home = vp.insert(FakeNode::new("section").id("home").geometry(0.0, 800.0));
    vp.insert_child(&home, FakeNode::new("div").class("fade-in").geometry(100.0, 200.0));
    let about = vp.insert(FakeNode::new("section").id("about").geometry(800.0, 800.0));
    let contact = vp.insert(FakeNode::new("section").id("contact").geometry(1600.0, 1000.0));
    let far_fade = vp.insert_child(&contact, FakeNode::new("div").class("fade-in").geometry(1700.0, 200.0));

    let form = vp.insert_child(&contact, FakeNode::new("form").id("contactForm"));
    let inputs = Field::ALL
        .iter()
        .map(|field| {
            let input = vp.insert_child(&form, FakeNode::new("input").id(field.input_id()));
            vp.insert_child(&form, FakeNode::new("span").id(field.error_id()));
            input
        })
        .collect();
    vp.insert_child(&form, FakeNode::new("button").id("submitBtn").text("Send Message"));
    let notice = vp.insert_child(&contact, FakeNode::new("div").id("successMessage"));
    let outside = vp.insert_child(&about, FakeNode::new("p"));

    let handles = Handles { navbar, links, theme_icon, hamburger, far_fade, form, inputs, notice, outside };
    (vp, handles)
}

type Site<S = MemoryStore, T = SimulatedTransport> = SiteCore<FakeViewPort, S, T>;

fn site_with<S: PreferenceStore, T: Transport>(store: S, transport: T) -> (Site<S, T>, Handles) {
    let (vp, handles) = page();
    let mut core = SiteCore::new(vp, store, transport, SiteConfig::default());
    core.init();
    (core, handles)
}

fn site() -> (Site, Handles) {
    site_with(MemoryStore::new(), SimulatedTransport::default())
}

fn fill<S: PreferenceStore, T: Transport>(core: &mut Site<S, T>, h: &Handles, values: [&str; 4]) {
    for (input, value) in h.inputs.iter().zip(values) {
        core.viewport_mut().set_value(input, value);
    }
}

fn scroll_to<S: PreferenceStore, T: Transport>(core: &mut Site<S, T>, now: f64, offset: f64) {
    core.viewport_mut().scroll = offset;
    core.on_scroll(now);
}

fn active_link(core: &Site, h: &Handles) -> Option<usize> {
    let active: Vec<usize> = (0..h.links.len())
        .filter(|&i| core.viewport().has_class(&h.links[i], CLASS_ACTIVE))
        .collect();
    assert!(active.len() <= 1, "more than one active link: {active:?}");
    active.first().copied()
}

#[derive(Default)]
struct OfflineTransport {
    attempts: usize,
}

impl Transport for OfflineTransport {
    fn submit(&mut self, _message: &ContactMessage) -> Result<()> {
        self.attempts += 1;
        Err(SiteError::Transport("network unreachable".into()))
    }
}

struct BrokenStore;

impl PreferenceStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(SiteError::StorageUnavailable("access denied".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(SiteError::StorageUnavailable("access denied".into()))
    }
}

// =============================================================
// Initialization
// =============================================================

#[test]
fn init_skips_only_missing_features() {
    let (vp, _) = page();
    let mut core = SiteCore::new(vp, MemoryStore::new(), SimulatedTransport::default(), SiteConfig::default());
    let failures = core.init();
    let failed: Vec<Feature> = failures.iter().map(|(f, _)| *f).collect();
    assert_eq!(failed, vec![Feature::Search]);
    assert!(matches!(failures[0].1, SiteError::MissingElement { feature: "search", .. }));
    assert_eq!(
        core.active_features(),
        vec![
            Feature::Navbar,
            Feature::Theme,
            Feature::Form,
            Feature::Menu,
            Feature::Reveal,
            Feature::ScrollTop,
            Feature::Notify,
        ]
    );
}

#[test]
fn bare_page_degrades_without_failing() {
    let mut core = SiteCore::new(
        FakeViewPort::default(),
        MemoryStore::new(),
        SimulatedTransport::default(),
        SiteConfig::default(),
    );
    let failed: Vec<Feature> = core.init().into_iter().map(|(f, _)| f).collect();
    assert_eq!(failed, vec![Feature::Navbar, Feature::Theme, Feature::Form, Feature::Menu, Feature::Search]);
    assert_eq!(core.active_features(), vec![Feature::ScrollTop, Feature::Notify]);

    // Scrolling and clicking still work with nothing to drive.
    scroll_to(&mut core, 0.0, 500.0);
    core.tick(1000.0);
    assert!(core.scroll_top().is_some_and(ScrollTop::is_visible));
    let body = core.viewport().body();
    core.on_click(1000.0, &body);
}

#[test]
fn init_applies_scroll_state_immediately() {
    let (core, h) = site();
    assert_eq!(active_link(&core, &h), Some(0));
    assert!(!core.viewport().has_class(&h.navbar, CLASS_SCROLLED));
    assert_eq!(core.reveal().map(RevealObserver::pending), Some(1));
    assert!(core.scroll_top().is_some_and(|b| !b.is_visible()));
    assert_eq!(core.next_deadline(), None);
}

// =============================================================
// Scroll
// =============================================================

#[test]
fn scroll_burst_applies_once_with_last_offset() {
    let (mut core, h) = site();
    scroll_to(&mut core, 0.0, 100.0);
    scroll_to(&mut core, 5.0, 1700.0);
    scroll_to(&mut core, 10.0, 900.0);

    assert_eq!(core.next_deadline(), Some(26.0));
    core.tick(25.0);
    assert_eq!(active_link(&core, &h), Some(0));

    core.tick(26.0);
    assert_eq!(core.navbar().and_then(Navbar::active), Some("about"));
    assert_eq!(active_link(&core, &h), Some(1));
    assert!(core.viewport().has_class(&h.navbar, CLASS_SCROLLED));
}

#[test]
fn scroll_top_runs_on_the_slower_limiter() {
    let (mut core, _) = site();
    scroll_to(&mut core, 0.0, 900.0);
    core.tick(16.0);
    assert!(core.scroll_top().is_some_and(|b| !b.is_visible()));
    assert_eq!(core.next_deadline(), Some(100.0));
    core.tick(100.0);
    assert!(core.scroll_top().is_some_and(ScrollTop::is_visible));
    assert_eq!(core.next_deadline(), None);
}

#[test]
fn reveal_unsubscribes_once_everything_is_visible() {
    let (mut core, h) = site();
    scroll_to(&mut core, 0.0, 1500.0);
    core.tick(16.0);
    assert!(core.viewport().has_class(&h.far_fade, "visible"));
    assert!(core.reveal().is_some_and(RevealObserver::is_done));
    assert!(!core.active_features().contains(&Feature::Reveal));

    // Scrolling back up leaves the latch in place.
    scroll_to(&mut core, 200.0, 0.0);
    core.tick(300.0);
    assert!(core.viewport().has_class(&h.far_fade, "visible"));
}

#[test]
fn section_with_no_match_clears_active_link() {
    let (mut core, h) = site();
    scroll_to(&mut core, 0.0, 3000.0);
    core.tick(16.0);
    assert_eq!(active_link(&core, &h), None);
    assert_eq!(core.navbar().and_then(Navbar::active), None);
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn nav_link_click_scrolls_and_closes_menu() {
    let (mut core, h) = site();
    core.on_click(0.0, &h.hamburger);
    assert_eq!(core.menu().map(MobileMenu::state), Some(MenuState::Open));

    core.on_click(10.0, &h.links[1]);
    assert_eq!(core.menu().map(MobileMenu::state), Some(MenuState::Closed));
    assert_eq!(core.viewport().scroll_requests, vec![(730.0, crate::viewport::ScrollBehavior::Smooth)]);
}

#[test]
fn only_scrolling_clicks_report_handled() {
    let (mut core, h) = site();
    assert!(core.on_click(0.0, &h.links[1]));
    assert!(!core.on_click(1.0, &h.outside));
    assert!(!core.on_click(2.0, &h.hamburger));
    assert!(!core.on_click(3.0, &h.theme_icon));
    assert_eq!(core.viewport().scroll_requests.len(), 1);
}

#[test]
fn outside_click_and_escape_close_menu() {
    let (mut core, h) = site();
    core.on_click(0.0, &h.hamburger);
    core.on_click(1.0, &h.outside);
    assert_eq!(core.menu().map(MobileMenu::state), Some(MenuState::Closed));

    core.on_click(2.0, &h.hamburger);
    core.on_key_down("Escape");
    assert_eq!(core.menu().map(MobileMenu::state), Some(MenuState::Closed));
}

#[test]
fn scroll_top_click_returns_to_top() {
    let (mut core, _) = site();
    scroll_to(&mut core, 0.0, 1200.0);
    core.tick(100.0);
    let button = core.scroll_top().map(|b| b.button().clone());
    let Some(button) = button else {
        panic!("scroll-top button missing");
    };
    assert!(core.on_click(200.0, &button));
    assert_eq!(core.viewport().scroll_offset(), 0.0);
}

// =============================================================
// Theme
// =============================================================

#[test]
fn theme_click_persists_and_reverts_transition() {
    let (mut core, h) = site();
    core.on_click(0.0, &h.theme_icon);
    assert_eq!(core.theme(), Theme::Dark);
    let root = core.viewport().root();
    assert_eq!(core.viewport().attribute(&root, "data-theme").as_deref(), Some("dark"));
    assert!(matches!(core.store().get(THEME_STORAGE_KEY), Ok(Some(ref v)) if v == "dark"));

    let body = core.viewport().body();
    assert!(core.viewport().style(&body, "transition").is_some());
    core.tick(299.0);
    assert!(core.viewport().style(&body, "transition").is_some());
    core.tick(300.0);
    assert!(core.viewport().style(&body, "transition").is_none());
}

#[test]
fn rapid_theme_clicks_extend_transition() {
    let (mut core, h) = site();
    core.on_click(0.0, &h.theme_icon);
    core.on_click(200.0, &h.theme_icon);
    assert_eq!(core.theme(), Theme::Light);

    let body = core.viewport().body();
    core.tick(300.0);
    assert!(core.viewport().style(&body, "transition").is_some());
    core.tick(500.0);
    assert!(core.viewport().style(&body, "transition").is_none());
}

#[test]
fn broken_store_keeps_theme_working_for_the_session() {
    let (mut core, h) = site_with(BrokenStore, SimulatedTransport::default());
    assert_eq!(core.theme(), Theme::Light);
    core.on_click(0.0, &h.theme_icon);
    assert_eq!(core.theme(), Theme::Dark);
    let root = core.viewport().root();
    assert_eq!(core.viewport().attribute(&root, "data-theme").as_deref(), Some("dark"));
}

// =============================================================
// Contact form
// =============================================================

#[test]
fn blur_and_input_route_to_fields() {
    let (mut core, h) = site();
    core.viewport_mut().set_value(&h.inputs[1], "foo@bar");
    core.on_blur(&h.inputs[1]);
    assert!(core.form().and_then(|f| f.state(Field::Email)).is_some_and(FieldState::is_error));

    core.on_input(&h.inputs[1]);
    assert_eq!(core.form().and_then(|f| f.state(Field::Email)), Some(&FieldState::Neutral));
}

#[test]
fn empty_submit_is_handled_and_rejected() {
    let (mut core, h) = site();
    assert!(core.on_submit(0.0, &h.form));
    for field in Field::ALL {
        assert!(core.form().and_then(|f| f.state(field)).is_some_and(FieldState::is_error));
    }
    assert_eq!(core.next_deadline(), None);
}

#[test]
fn submit_on_other_target_is_ignored() {
    let (mut core, h) = site();
    assert!(!core.on_submit(0.0, &h.outside));
}

#[test]
fn valid_submit_settles_after_delay() {
    let (mut core, h) = site();
    fill(&mut core, &h, ["Ada", "ada@example.com", "Hello", "Hi there"]);
    assert!(core.on_submit(0.0, &h.form));
    assert_eq!(core.form().map(ContactForm::phase), Some(SubmitPhase::Sending));
    assert_eq!(core.next_deadline(), Some(2000.0));

    core.tick(1999.0);
    assert!(core.transport().delivered.is_empty());

    core.tick(2000.0);
    assert_eq!(core.transport().delivered.len(), 1);
    assert_eq!(core.form().map(ContactForm::phase), Some(SubmitPhase::Idle));
    assert!(core.viewport().has_class(&h.notice, CLASS_SHOW));
    for (field, input) in Field::ALL.into_iter().zip(&h.inputs) {
        assert_eq!(core.form().and_then(|f| f.state(field)), Some(&FieldState::Neutral));
        assert_eq!(core.viewport().value(input), "");
    }

    assert_eq!(core.next_deadline(), Some(7000.0));
    core.tick(7000.0);
    assert!(!core.viewport().has_class(&h.notice, CLASS_SHOW));
}

#[test]
fn double_submit_while_sending_sends_once() {
    let (mut core, h) = site();
    fill(&mut core, &h, ["Ada", "ada@example.com", "Hello", "Hi there"]);
    core.on_submit(0.0, &h.form);
    core.on_submit(500.0, &h.form);
    core.tick(2500.0);
    assert_eq!(core.transport().delivered.len(), 1);
}

#[test]
fn failed_delivery_shows_error_toast_and_keeps_values() {
    let (mut core, h) = site_with(MemoryStore::new(), OfflineTransport::default());
    fill(&mut core, &h, ["Ada", "ada@example.com", "Hello", "Hi there"]);
    core.on_submit(0.0, &h.form);
    core.tick(2000.0);

    assert_eq!(core.transport().attempts, 1);
    assert_eq!(core.viewport().value(&h.inputs[0]), "Ada");
    assert!(!core.viewport().has_class(&h.notice, CLASS_SHOW));

    let Some((_, phase, toast)) = core.notifier().current() else {
        panic!("no toast shown");
    };
    let toast = toast.clone();
    assert_eq!(phase, ToastPhase::Entering);
    assert!(core.viewport().has_class(&toast, "notification-error"));
    assert_eq!(core.viewport().text(&toast), SEND_FAILED_MESSAGE);

    core.tick(2100.0);
    assert_eq!(core.notifier().current().map(|(_, p, _)| p), Some(ToastPhase::Shown));
    core.tick(7000.0);
    assert_eq!(core.notifier().current().map(|(_, p, _)| p), Some(ToastPhase::Leaving));
    core.tick(7300.0);
    assert!(core.notifier().current().is_none());
    assert!(!core.viewport().is_attached(&toast));
}

/// A contact form with bare inputs: no error elements, notice or status line.
fn bare_form_site() -> (Site, NodeId, Vec<NodeId>) {
    let mut vp = FakeViewPort::new(800.0);
    let form = vp.insert(FakeNode::new("form").id("contactForm"));
    let inputs = Field::ALL
        .iter()
        .map(|field| vp.insert_child(&form, FakeNode::new("input").id(field.input_id())))
        .collect();
    let mut core = SiteCore::new(vp, MemoryStore::new(), SimulatedTransport::default(), SiteConfig::default());
    core.init();
    (core, form, inputs)
}

fn toast_text(core: &Site) -> Option<String> {
    core.notifier().current().map(|(_, _, node)| core.viewport().text(node))
}

#[test]
fn form_without_inline_feedback_reports_through_toasts() {
    let (mut core, form, inputs) = bare_form_site();
    assert!(core.on_submit(0.0, &form));
    assert_eq!(toast_text(&core).as_deref(), Some("Name is required"));

    for (input, value) in inputs.iter().zip(["Ada", "ada@example.com", "Hello", "Hi there"]) {
        core.viewport_mut().set_value(input, value);
    }
    assert!(core.on_submit(10.0, &form));
    assert_eq!(toast_text(&core).as_deref(), Some(TOAST_SENDING));

    core.tick(2010.0);
    assert_eq!(core.transport().delivered.len(), 1);
    assert_eq!(toast_text(&core).as_deref(), Some(TOAST_SENT));
}

#[test]
fn form_with_inline_feedback_shows_no_toasts() {
    let (mut core, h) = site();
    core.on_submit(0.0, &h.form);
    fill(&mut core, &h, ["Ada", "ada@example.com", "Hello", "Hi there"]);
    core.on_submit(10.0, &h.form);
    core.tick(2010.0);
    assert!(core.notifier().current().is_none());
}

// =============================================================
// Notifications
// =============================================================

#[test]
fn clicking_toast_dismisses_early() {
    let (mut core, _) = site();
    core.notify(0.0, "Hello", NoticeKind::Info);
    core.tick(100.0);
    let Some(toast) = core.notifier().current().map(|(_, _, n)| n.clone()) else {
        panic!("no toast shown");
    };

    core.on_click(1000.0, &toast);
    core.tick(1300.0);
    assert!(core.notifier().current().is_none());

    // The scheduled auto-dismiss finds nothing left to do.
    core.tick(5000.0);
    assert!(core.notifier().current().is_none());
    assert_eq!(core.next_deadline(), None);
}

#[test]
fn newer_toast_survives_older_timers() {
    let (mut core, _) = site();
    core.notify(0.0, "first", NoticeKind::Info);
    core.notify(3000.0, "second", NoticeKind::Success);
    core.tick(5000.0);
    assert_eq!(core.notifier().current().map(|(_, p, _)| p), Some(ToastPhase::Shown));
    core.tick(8000.0);
    assert_eq!(core.notifier().current().map(|(_, p, _)| p), Some(ToastPhase::Leaving));
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn teardown_stops_a_feature() {
    let (mut core, h) = site();
    scroll_to(&mut core, 0.0, 900.0);
    core.teardown(Feature::Navbar);
    assert!(core.navbar().is_none());
    assert!(!core.active_features().contains(&Feature::Navbar));

    core.tick(200.0);
    scroll_to(&mut core, 300.0, 1800.0);
    core.tick(500.0);
    assert!(!core.viewport().has_class(&h.navbar, CLASS_SCROLLED));
    assert_eq!(active_link(&core, &h), Some(0));
}

#[test]
fn teardown_menu_ignores_clicks() {
    let (mut core, h) = site();
    core.teardown(Feature::Menu);
    core.on_click(0.0, &h.hamburger);
    assert!(core.menu().is_none());
    assert!(!core.viewport().has_class(&h.hamburger, "active"));
}
