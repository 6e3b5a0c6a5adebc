//! Scroll-reactive UI synchronizer for static marketing, portfolio and blog pages.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It keeps a
//! handful of presentation states consistent with the page's scroll offset and
//! a few discrete user inputs: the active navigation link, the navbar
//! background, the mobile menu, fade-in reveals, the scroll-to-top button, the
//! dark-mode preference, and contact-form validation.
//!
//! All logic lives in [`site::SiteCore`], which talks to the page only through
//! the [`viewport::ViewPort`] trait so it can be driven by the in-memory
//! [`fake::FakeViewPort`] in tests. The `hydrate` feature adds the browser host
//! in `dom`, which wires DOM events and timers into the core.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Top-level synchronizer owning every feature and the timer queue |
//! | [`viewport`] | The view-tree capability the core reads from and writes to |
//! | [`fake`] | In-memory view tree with controllable geometry |
//! | [`nav`] | Active-section resolution, navbar background, anchor scrolling |
//! | [`theme`] | Light/dark preference and its persistence |
//! | [`form`] | Contact form field state machine and simulated submission |
//! | [`menu`] | Mobile menu open/closed toggle |
//! | [`reveal`] | One-shot fade-in latch |
//! | [`scroll_top`] | Scroll-to-top affordance |
//! | [`notify`] | Transient toast notifications |
//! | [`search`] | Blog post title filter |
//! | [`throttle`] | Leading/trailing rate limiter |
//! | [`timers`] | Deferred one-shot events |
//! | [`events`] | Event subscription registry |
//! | [`config`] | Deserializable site configuration |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Default selectors, thresholds and delays |

pub mod config;
pub mod consts;
#[cfg(feature = "hydrate")]
pub mod dom;
pub mod error;
pub mod events;
pub mod fake;
pub mod form;
pub mod menu;
pub mod nav;
pub mod notify;
pub mod reveal;
pub mod scroll_top;
pub mod search;
pub mod site;
pub mod theme;
pub mod throttle;
pub mod timers;
pub mod viewport;
