use super::*;
use crate::fake::{FakeNode, FakeViewPort};

fn section(id: &str, top: f64, height: f64) -> Section {
    Section { id: id.to_owned(), extent: Rect::new(top, height) }
}

struct Page {
    vp: FakeViewPort,
    navbar: NodeId,
    home: NodeId,
    about: NodeId,
    contact: NodeId,
}

fn page() -> Page {
    let mut vp = FakeViewPort::new(800.0);
    let navbar = vp.insert(FakeNode::new("nav").class("navbar").geometry(0.0, 70.0));
    let home = vp.insert_child(&navbar, FakeNode::new("a").class("nav-link").attr("href", "#home"));
    let about = vp.insert_child(&navbar, FakeNode::new("a").class("nav-link").attr("href", "#about"));
    let contact = vp.insert_child(&navbar, FakeNode::new("a").class("nav-link").attr("href", "#contact"));
    vp.insert(FakeNode::new("section").id("home").geometry(0.0, 600.0));
    vp.insert(FakeNode::new("section").id("about").geometry(600.0, 800.0));
    vp.insert(FakeNode::new("section").id("contact").geometry(1400.0, 600.0));
    Page { vp, navbar, home, about, contact }
}

fn navbar(page: &Page) -> Navbar {
    match Navbar::init(&page.vp, &SiteConfig::default()) {
        Ok(nav) => nav,
        Err(e) => panic!("navbar init failed: {e}"),
    }
}

fn active_links(page: &Page) -> Vec<NodeId> {
    [&page.home, &page.about, &page.contact]
        .into_iter()
        .filter(|l| page.vp.has_class(l, CLASS_ACTIVE))
        .cloned()
        .collect()
}

// =============================================================
// resolve_active
// =============================================================

#[test]
fn resolve_active_is_half_open() {
    let sections = [section("a", 0.0, 100.0), section("b", 100.0, 100.0)];
    assert_eq!(resolve_active(&sections, 99.9).map(|s| s.id.as_str()), Some("a"));
    assert_eq!(resolve_active(&sections, 100.0).map(|s| s.id.as_str()), Some("b"));
    assert_eq!(resolve_active(&sections, 200.0), None);
    assert_eq!(resolve_active(&sections, -1.0), None);
}

#[test]
fn resolve_active_last_match_wins() {
    let sections = [section("outer", 0.0, 1000.0), section("inner", 200.0, 100.0)];
    assert_eq!(resolve_active(&sections, 250.0).map(|s| s.id.as_str()), Some("inner"));
    assert_eq!(resolve_active(&sections, 500.0).map(|s| s.id.as_str()), Some("outer"));
}

#[test]
fn link_target_strips_hash() {
    assert_eq!(link_target("#about"), Some("about"));
    assert_eq!(link_target("#"), None);
    assert_eq!(link_target("/blog"), None);
}

#[test]
fn read_sections_skips_elements_without_id() {
    let mut vp = FakeViewPort::default();
    vp.insert(FakeNode::new("section").id("a").geometry(0.0, 10.0));
    vp.insert(FakeNode::new("section").geometry(10.0, 10.0));
    let sections = read_sections(&vp, "section");
    assert_eq!(sections, vec![section("a", 0.0, 10.0)]);
}

// =============================================================
// sync
// =============================================================

#[test]
fn sync_marks_exactly_one_link() {
    let mut page = page();
    let mut nav = navbar(&page);

    nav.sync(&mut page.vp, 0.0);
    assert_eq!(nav.active(), Some("home"));
    assert_eq!(active_links(&page), vec![page.home.clone()]);

    // 500 + 200 = 700 falls inside about.
    nav.sync(&mut page.vp, 500.0);
    assert_eq!(nav.active(), Some("about"));
    assert_eq!(active_links(&page), vec![page.about.clone()]);
}

#[test]
fn sync_with_no_section_clears_all_links() {
    let mut page = page();
    let mut nav = navbar(&page);
    nav.sync(&mut page.vp, 500.0);
    nav.sync(&mut page.vp, 5000.0);
    assert_eq!(nav.active(), None);
    assert!(active_links(&page).is_empty());
}

#[test]
fn duplicate_links_only_first_is_active() {
    let mut page = page();
    let footer = page.vp.insert(FakeNode::new("a").class("nav-link").attr("href", "#about"));
    let mut nav = navbar(&page);
    nav.sync(&mut page.vp, 500.0);
    assert!(page.vp.has_class(&page.about, CLASS_ACTIVE));
    assert!(!page.vp.has_class(&footer, CLASS_ACTIVE));
}

#[test]
fn scrolled_class_follows_threshold() {
    let mut page = page();
    let mut nav = navbar(&page);
    nav.sync(&mut page.vp, 100.0);
    assert!(!page.vp.has_class(&page.navbar, CLASS_SCROLLED));
    nav.sync(&mut page.vp, 101.0);
    assert!(page.vp.has_class(&page.navbar, CLASS_SCROLLED));
    nav.sync(&mut page.vp, 0.0);
    assert!(!page.vp.has_class(&page.navbar, CLASS_SCROLLED));
}

#[test]
fn sync_rereads_geometry_every_pass() {
    let mut page = page();
    let mut nav = navbar(&page);
    nav.sync(&mut page.vp, 500.0);
    assert_eq!(nav.active(), Some("about"));

    let contact = page.vp.select("#contact");
    if let Some(contact) = contact {
        page.vp.set_top(&contact, 650.0);
    }
    nav.sync(&mut page.vp, 500.0);
    assert_eq!(nav.active(), Some("contact"));
}

#[test]
fn probe_can_include_navbar_height() {
    let page = page();
    let mut config = SiteConfig::default();
    config.scroll_spy.include_navbar_height = true;
    let Ok(nav) = Navbar::init(&page.vp, &config) else {
        panic!("navbar init failed");
    };
    assert_eq!(nav.probe(&page.vp, 100.0), 370.0);
    assert_eq!(navbar(&page).probe(&page.vp, 100.0), 300.0);
}

#[test]
fn missing_navbar_is_reported() {
    let vp = FakeViewPort::default();
    let result = Navbar::init(&vp, &SiteConfig::default());
    assert!(matches!(result, Err(SiteError::MissingElement { feature: "navbar", .. })));
}

// =============================================================
// on_click
// =============================================================

#[test]
fn click_scrolls_below_navbar() {
    let mut page = page();
    let nav = navbar(&page);
    assert!(nav.on_click(&mut page.vp, &page.about));
    assert_eq!(page.vp.scroll_requests, vec![(530.0, ScrollBehavior::Smooth)]);
}

#[test]
fn click_near_top_clamps_to_zero() {
    let mut page = page();
    let nav = navbar(&page);
    assert!(nav.on_click(&mut page.vp, &page.home));
    assert_eq!(page.vp.scroll_requests, vec![(0.0, ScrollBehavior::Smooth)]);
}

#[test]
fn click_on_link_child_resolves_link() {
    let mut page = page();
    let icon = page.vp.insert_child(&page.contact, FakeNode::new("span"));
    let nav = navbar(&page);
    assert!(nav.on_click(&mut page.vp, &icon));
    assert_eq!(page.vp.scroll_requests, vec![(1330.0, ScrollBehavior::Smooth)]);
}

#[test]
fn click_reaches_section_with_non_css_id() {
    let mut page = page();
    page.vp.insert(FakeNode::new("section").id("2024-recap").geometry(2000.0, 500.0));
    let recap = page.vp.insert_child(&page.navbar, FakeNode::new("a").class("nav-link").attr("href", "#2024-recap"));
    let nav = navbar(&page);
    assert!(nav.on_click(&mut page.vp, &recap));
    assert_eq!(page.vp.scroll_requests, vec![(1930.0, ScrollBehavior::Smooth)]);
}

#[test]
fn click_to_missing_section_does_nothing() {
    let mut page = page();
    let stray = page.vp.insert_child(&page.navbar, FakeNode::new("a").class("nav-link").attr("href", "#gone"));
    let nav = navbar(&page);
    assert!(!nav.on_click(&mut page.vp, &stray));
    assert!(!nav.on_click(&mut page.vp, &page.navbar));
    assert!(page.vp.scroll_requests.is_empty());
}
