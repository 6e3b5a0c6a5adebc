//! The scroll-reactive synchronizer.
//!
//! `SiteCore` owns every feature, the rate limiters for scroll handlers, and
//! the queue of deferred events. It is generic over its three collaborators
//! (view tree, preference store, form transport) so the whole site can be
//! exercised in tests without a browser.
//!
//! ARCHITECTURE
//! ============
//! Event entry points (`on_scroll`, `on_click`, ...) never sleep. High
//! frequency work is pushed into trailing-edge [`RateLimiter`]s and delayed
//! work into [`Timers`]; both are flushed by [`SiteCore::tick`]. The host
//! arms a single timeout for [`SiteCore::next_deadline`] after every call.
//!
//! Features initialize independently: one that fails (typically because its
//! markup is missing) is logged and skipped, and the rest carry on.

#[cfg(test)]
#[path = "site_test.rs"]
mod site_test;

use crate::config::SiteConfig;
use crate::consts::{
    SEND_FAILED_MESSAGE, TOAST_SENDING, TOAST_SENT, TOAST_SLIDE_IN_MS, TOAST_SLIDE_OUT_MS, TOAST_VISIBLE_MS,
};
use crate::error::SiteError;
use crate::events::{EventKind, Registry, Subscription};
use crate::form::{ContactForm, ContactMessage, SubmitOutcome, Transport};
use crate::menu::MobileMenu;
use crate::nav::Navbar;
use crate::notify::{NoticeKind, Notifier, ToastId};
use crate::reveal::RevealObserver;
use crate::scroll_top::ScrollTop;
use crate::search::PostSearch;
use crate::theme::{PreferenceStore, Theme, ThemeToggle};
use crate::throttle::RateLimiter;
use crate::timers::{TimerId, Timers};
use crate::viewport::{NodeId, ViewPort};

/// Independently initialized site features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    Navbar,
    Theme,
    Form,
    Menu,
    Reveal,
    ScrollTop,
    Search,
    Notify,
}

/// What a registered handler does when its event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    NavbarScroll,
    NavbarClick,
    ThemeClick,
    FieldBlur,
    FieldInput,
    FormSubmit,
    MenuClick,
    MenuKey,
    RevealScroll,
    ScrollTopScroll,
    ScrollTopClick,
    SearchInput,
    ToastClick,
}

impl Handler {
    #[must_use]
    pub fn feature(self) -> Feature {
        match self {
            Self::NavbarScroll | Self::NavbarClick => Feature::Navbar,
            Self::ThemeClick => Feature::Theme,
            Self::FieldBlur | Self::FieldInput | Self::FormSubmit => Feature::Form,
            Self::MenuClick | Self::MenuKey => Feature::Menu,
            Self::RevealScroll => Feature::Reveal,
            Self::ScrollTopScroll | Self::ScrollTopClick => Feature::ScrollTop,
            Self::SearchInput => Feature::Search,
            Self::ToastClick => Feature::Notify,
        }
    }
}

/// Work deferred to a later [`SiteCore::tick`].
#[derive(Clone, Debug, PartialEq)]
enum Deferred {
    ThemeTransitionEnd,
    SubmitSettle(ContactMessage),
    HideSuccessNotice,
    ToastSlideIn(ToastId),
    ToastDismiss(ToastId),
    ToastRemove(ToastId),
}

/// Every feature plus the machinery that schedules them.
pub struct SiteCore<V, S, T> {
    vp: V,
    store: S,
    transport: T,
    config: SiteConfig,
    registry: Registry<Handler>,
    subscriptions: Vec<(Feature, Subscription)>,
    timers: Timers<Deferred>,

    navbar: Option<Navbar>,
    navbar_limiter: RateLimiter<f64>,
    theme: Option<ThemeToggle>,
    theme_timer: Option<TimerId>,
    form: Option<ContactForm>,
    notice_timer: Option<TimerId>,
    menu: Option<MobileMenu>,
    reveal: Option<RevealObserver>,
    reveal_limiter: RateLimiter<()>,
    scroll_top: Option<ScrollTop>,
    scroll_top_limiter: RateLimiter<f64>,
    search: Option<PostSearch>,
    notifier: Notifier,
}

impl<V: ViewPort, S: PreferenceStore, T: Transport> SiteCore<V, S, T> {
    #[must_use]
    pub fn new(vp: V, store: S, transport: T, config: SiteConfig) -> Self {
        Self {
            navbar_limiter: RateLimiter::trailing(config.frame_interval_ms),
            reveal_limiter: RateLimiter::trailing(config.frame_interval_ms),
            scroll_top_limiter: RateLimiter::trailing(config.low_priority_interval_ms),
            vp,
            store,
            transport,
            config,
            registry: Registry::new(),
            subscriptions: Vec::new(),
            timers: Timers::new(),
            navbar: None,
            theme: None,
            theme_timer: None,
            form: None,
            notice_timer: None,
            menu: None,
            reveal: None,
            scroll_top: None,
            search: None,
            notifier: Notifier::new(),
        }
    }

    /// Initialize every feature and apply the initial scroll-derived state.
    ///
    /// Returns the features that failed to start; each failure has already
    /// been logged and none of them blocks the others.
    pub fn init(&mut self) -> Vec<(Feature, SiteError)> {
        let mut failures = Vec::new();

        match Navbar::init(&self.vp, &self.config) {
            Ok(navbar) => {
                self.navbar = Some(navbar);
                self.subscribe(EventKind::Scroll, Handler::NavbarScroll);
                self.subscribe(EventKind::Click, Handler::NavbarClick);
            }
            Err(e) => failures.push((Feature::Navbar, e)),
        }
        match ThemeToggle::init(&mut self.vp, &self.store, &self.config) {
            Ok(theme) => {
                self.theme = Some(theme);
                self.subscribe(EventKind::Click, Handler::ThemeClick);
            }
            Err(e) => failures.push((Feature::Theme, e)),
        }
        match ContactForm::init(&self.vp, &self.config) {
            Ok(form) => {
                self.form = Some(form);
                self.subscribe(EventKind::Submit, Handler::FormSubmit);
                self.subscribe(EventKind::Blur, Handler::FieldBlur);
                self.subscribe(EventKind::Input, Handler::FieldInput);
            }
            Err(e) => failures.push((Feature::Form, e)),
        }
        match MobileMenu::init(&mut self.vp, &self.config) {
            Ok(menu) => {
                self.menu = Some(menu);
                self.subscribe(EventKind::Click, Handler::MenuClick);
                self.subscribe(EventKind::KeyDown, Handler::MenuKey);
            }
            Err(e) => failures.push((Feature::Menu, e)),
        }

        let reveal = RevealObserver::init(&self.vp, &self.config);
        if !reveal.is_done() {
            self.subscribe(EventKind::Scroll, Handler::RevealScroll);
        }
        self.reveal = Some(reveal);

        match ScrollTop::init(&mut self.vp, &self.config) {
            Ok(button) => {
                self.scroll_top = Some(button);
                self.subscribe(EventKind::Scroll, Handler::ScrollTopScroll);
                self.subscribe(EventKind::Click, Handler::ScrollTopClick);
            }
            Err(e) => failures.push((Feature::ScrollTop, e)),
        }
        match PostSearch::init(&self.vp, &self.config) {
            Ok(search) => {
                self.search = Some(search);
                self.subscribe(EventKind::Input, Handler::SearchInput);
            }
            Err(e) => failures.push((Feature::Search, e)),
        }
        self.subscribe(EventKind::Click, Handler::ToastClick);

        for (feature, error) in &failures {
            log::warn!("site: {feature:?} disabled: {error}");
        }

        let offset = self.vp.scroll_offset();
        self.apply_navbar(offset);
        self.apply_reveal();
        self.apply_scroll_top(offset);
        log::info!("site: {} handlers registered", self.registry.len());
        failures
    }

    // --- Event entry points ---

    /// A scroll tick. All scroll handlers are rate limited.
    pub fn on_scroll(&mut self, now: f64) {
        let offset = self.vp.scroll_offset();
        for handler in self.registry.handlers(EventKind::Scroll) {
            match handler {
                Handler::NavbarScroll => {
                    self.navbar_limiter.call(now, offset);
                }
                Handler::RevealScroll => {
                    self.reveal_limiter.call(now, ());
                }
                Handler::ScrollTopScroll => {
                    self.scroll_top_limiter.call(now, offset);
                }
                _ => {}
            }
        }
    }

    /// A click anywhere in the document, with its innermost target.
    ///
    /// Returns `true` when a handler acted on the click in place of the
    /// browser's default (an anchor jump), which the host must then suppress.
    pub fn on_click(&mut self, now: f64, target: &NodeId) -> bool {
        let mut handled = false;
        for handler in self.registry.handlers(EventKind::Click) {
            match handler {
                Handler::NavbarClick => {
                    if let Some(navbar) = &self.navbar {
                        handled |= navbar.on_click(&mut self.vp, target);
                    }
                }
                Handler::ThemeClick => self.on_theme_click(now, target),
                Handler::MenuClick => {
                    if let Some(menu) = self.menu.as_mut() {
                        menu.on_click(&mut self.vp, target);
                    }
                }
                Handler::ScrollTopClick => {
                    if let Some(button) = &self.scroll_top {
                        handled |= button.on_click(&mut self.vp, target);
                    }
                }
                Handler::ToastClick => {
                    if let Some(id) = self.notifier.hit(&self.vp, target) {
                        self.dismiss_toast(now, id);
                    }
                }
                _ => {}
            }
        }
        handled
    }

    /// A form control lost focus.
    pub fn on_blur(&mut self, target: &NodeId) {
        for handler in self.registry.handlers(EventKind::Blur) {
            if handler == Handler::FieldBlur {
                if let Some(form) = self.form.as_mut() {
                    if let Some(field) = form.field_for(target) {
                        form.on_blur(&mut self.vp, field);
                    }
                }
            }
        }
    }

    /// A form control's value changed.
    pub fn on_input(&mut self, target: &NodeId) {
        for handler in self.registry.handlers(EventKind::Input) {
            match handler {
                Handler::FieldInput => {
                    if let Some(form) = self.form.as_mut() {
                        if let Some(field) = form.field_for(target) {
                            form.on_input(&mut self.vp, field);
                        }
                    }
                }
                Handler::SearchInput => {
                    if let Some(search) = &self.search {
                        if search.is_input(target) {
                            search.on_input(&mut self.vp);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// A form submit. Returns `true` when the site handled it and the
    /// browser's default navigation must be suppressed.
    pub fn on_submit(&mut self, now: f64, target: &NodeId) -> bool {
        let mut handled = false;
        for handler in self.registry.handlers(EventKind::Submit) {
            if handler != Handler::FormSubmit {
                continue;
            }
            let Some(form) = self.form.as_mut() else {
                continue;
            };
            if !form.is_form(target) {
                continue;
            }
            handled = true;
            match form.on_submit(&mut self.vp) {
                SubmitOutcome::Sending(message) => {
                    log::info!("form: sending");
                    let toast = !form.has_outcome_feedback();
                    self.timers
                        .schedule(now, self.config.submit_delay_ms, Deferred::SubmitSettle(message));
                    if toast {
                        self.notify(now, TOAST_SENDING, NoticeKind::Info);
                    }
                }
                SubmitOutcome::Rejected => {
                    let unseen = if form.has_error_feedback() { None } else { form.first_error().map(str::to_owned) };
                    if let Some(message) = unseen {
                        self.notify(now, &message, NoticeKind::Error);
                    }
                }
                SubmitOutcome::Busy => {}
            }
        }
        handled
    }

    /// A keydown anywhere in the document.
    pub fn on_key_down(&mut self, key: &str) {
        for handler in self.registry.handlers(EventKind::KeyDown) {
            if handler == Handler::MenuKey {
                if let Some(menu) = self.menu.as_mut() {
                    menu.on_key(&mut self.vp, key);
                }
            }
        }
    }

    /// Flush rate limiters and deferred events that are due at `now`.
    pub fn tick(&mut self, now: f64) {
        if let Some(offset) = self.navbar_limiter.poll(now) {
            self.apply_navbar(offset);
        }
        if self.reveal_limiter.poll(now).is_some() {
            self.apply_reveal();
        }
        if let Some(offset) = self.scroll_top_limiter.poll(now) {
            self.apply_scroll_top(offset);
        }
        for event in self.timers.drain_due(now) {
            self.run_deferred(now, event);
        }
    }

    /// Earliest time [`SiteCore::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        [
            self.navbar_limiter.deadline(),
            self.reveal_limiter.deadline(),
            self.scroll_top_limiter.deadline(),
            self.timers.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min_by(f64::total_cmp)
    }

    /// Show a toast and schedule its lifecycle.
    pub fn notify(&mut self, now: f64, message: &str, kind: NoticeKind) {
        if let Some(id) = self.notifier.show(&mut self.vp, message, kind) {
            self.timers.schedule(now, TOAST_SLIDE_IN_MS, Deferred::ToastSlideIn(id));
            self.timers.schedule(now, TOAST_VISIBLE_MS, Deferred::ToastDismiss(id));
        }
    }

    /// Unregister a feature's handlers and drop its state.
    pub fn teardown(&mut self, feature: Feature) {
        self.release(feature);
        match feature {
            Feature::Navbar => self.navbar = None,
            Feature::Theme => self.theme = None,
            Feature::Form => self.form = None,
            Feature::Menu => self.menu = None,
            Feature::Reveal => self.reveal = None,
            Feature::ScrollTop => self.scroll_top = None,
            Feature::Search => self.search = None,
            Feature::Notify => {}
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn viewport(&self) -> &V {
        &self.vp
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.vp
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current theme; light when the theme feature is disabled.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.as_ref().map_or(Theme::Light, ThemeToggle::theme)
    }

    #[must_use]
    pub fn navbar(&self) -> Option<&Navbar> {
        self.navbar.as_ref()
    }

    #[must_use]
    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    #[must_use]
    pub fn menu(&self) -> Option<&MobileMenu> {
        self.menu.as_ref()
    }

    #[must_use]
    pub fn reveal(&self) -> Option<&RevealObserver> {
        self.reveal.as_ref()
    }

    #[must_use]
    pub fn scroll_top(&self) -> Option<&ScrollTop> {
        self.scroll_top.as_ref()
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Features with at least one live handler.
    #[must_use]
    pub fn active_features(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = Vec::new();
        for (feature, _) in &self.subscriptions {
            if !features.contains(feature) {
                features.push(*feature);
            }
        }
        features
    }

    // --- Internals ---

    fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        let subscription = self.registry.subscribe(kind, handler);
        self.subscriptions.push((handler.feature(), subscription));
    }

    /// Drop a feature's subscriptions and pending rate-limited work, keeping its state.
    fn release(&mut self, feature: Feature) {
        let (doomed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.subscriptions).into_iter().partition(|(f, _)| *f == feature);
        self.subscriptions = kept;
        for (_, subscription) in doomed {
            self.registry.unsubscribe(subscription);
        }
        match feature {
            Feature::Navbar => self.navbar_limiter.cancel(),
            Feature::Reveal => self.reveal_limiter.cancel(),
            Feature::ScrollTop => self.scroll_top_limiter.cancel(),
            _ => {}
        }
    }

    fn apply_navbar(&mut self, offset: f64) {
        if let Some(navbar) = self.navbar.as_mut() {
            navbar.sync(&mut self.vp, offset);
        }
    }

    fn apply_reveal(&mut self) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };
        reveal.check(&mut self.vp);
        if reveal.is_done() && self.subscriptions.iter().any(|(f, _)| *f == Feature::Reveal) {
            log::debug!("reveal: all elements revealed, unsubscribing");
            self.release(Feature::Reveal);
        }
    }

    fn apply_scroll_top(&mut self, offset: f64) {
        if let Some(button) = self.scroll_top.as_mut() {
            button.sync(&mut self.vp, offset);
        }
    }

    fn on_theme_click(&mut self, now: f64, target: &NodeId) {
        let Some(theme) = self.theme.as_mut() else {
            return;
        };
        if !theme.is_hit(&self.vp, target) {
            return;
        }
        theme.toggle(&mut self.vp, &mut self.store);
        if let Some(previous) = self.theme_timer.take() {
            self.timers.cancel(previous);
        }
        self.theme_timer =
            Some(self.timers.schedule(now, self.config.theme_transition_ms, Deferred::ThemeTransitionEnd));
    }

    fn dismiss_toast(&mut self, now: f64, id: ToastId) {
        if self.notifier.dismiss(&mut self.vp, id) {
            self.timers.schedule(now, TOAST_SLIDE_OUT_MS, Deferred::ToastRemove(id));
        }
    }

    fn run_deferred(&mut self, now: f64, event: Deferred) {
        match event {
            Deferred::ThemeTransitionEnd => {
                self.theme_timer = None;
                ThemeToggle::end_transition(&mut self.vp);
            }
            Deferred::SubmitSettle(message) => self.settle_submission(now, &message),
            Deferred::HideSuccessNotice => {
                self.notice_timer = None;
                if let Some(form) = &self.form {
                    form.hide_notice(&mut self.vp);
                }
            }
            Deferred::ToastSlideIn(id) => self.notifier.slide_in(&mut self.vp, id),
            Deferred::ToastDismiss(id) => self.dismiss_toast(now, id),
            Deferred::ToastRemove(id) => self.notifier.remove(&mut self.vp, id),
        }
    }

    fn settle_submission(&mut self, now: f64, message: &ContactMessage) {
        let outcome = self.transport.submit(message);
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.settle(&mut self.vp, &outcome) {
            log::info!("form: message sent");
            if !form.has_outcome_feedback() {
                self.notify(now, TOAST_SENT, NoticeKind::Success);
            }
            if let Some(previous) = self.notice_timer.take() {
                self.timers.cancel(previous);
            }
            self.notice_timer =
                Some(self.timers.schedule(now, self.config.success_notice_ms, Deferred::HideSuccessNotice));
        } else {
            if let Err(e) = &outcome {
                log::warn!("form: {e}");
            }
            self.notify(now, SEND_FAILED_MESSAGE, NoticeKind::Error);
        }
    }
}
