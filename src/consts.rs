//! Shared defaults for selectors, thresholds and delays.

// ── Scroll ──────────────────────────────────────────────────────

/// Offset past which the navbar switches to its `scrolled` look, in pixels.
pub const NAVBAR_SCROLLED_THRESHOLD_PX: f64 = 100.0;

/// Extra margin added to the scroll offset before resolving the active section.
pub const SCROLL_SPY_MARGIN_PX: f64 = 200.0;

/// Offset past which the scroll-to-top button is shown, in pixels.
pub const SCROLL_TOP_THRESHOLD_PX: f64 = 300.0;

// ── Rate limits ─────────────────────────────────────────────────

/// Interval for frame-rate scroll handlers (navbar, active link, reveal).
pub const FRAME_INTERVAL_MS: f64 = 16.0;

/// Interval for low-priority scroll handlers (scroll-to-top visibility).
pub const LOW_PRIORITY_INTERVAL_MS: f64 = 100.0;

// ── Delays ──────────────────────────────────────────────────────

/// How long the body keeps its transition hint after a theme toggle.
pub const THEME_TRANSITION_MS: f64 = 300.0;

/// Simulated network latency for the contact form.
pub const SUBMIT_DELAY_MS: f64 = 2000.0;

/// How long the form success notice stays visible.
pub const SUCCESS_NOTICE_MS: f64 = 5000.0;

/// Delay before a toast slides in.
pub const TOAST_SLIDE_IN_MS: f64 = 100.0;

/// How long a toast stays on screen before sliding out.
pub const TOAST_VISIBLE_MS: f64 = 5000.0;

/// Slide-out duration before a toast is removed.
pub const TOAST_SLIDE_OUT_MS: f64 = 300.0;

// ── Reveal ──────────────────────────────────────────────────────

/// Fraction of an element that must be visible before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Amount the viewport's bottom edge is pulled in for reveal checks, in pixels.
pub const REVEAL_BOTTOM_MARGIN_PX: f64 = 50.0;

// ── Storage ─────────────────────────────────────────────────────

/// Preference store key holding the theme.
pub const THEME_STORAGE_KEY: &str = "theme";

// ── Classes ─────────────────────────────────────────────────────

pub const CLASS_ACTIVE: &str = "active";
pub const CLASS_SCROLLED: &str = "scrolled";
pub const CLASS_VISIBLE: &str = "visible";
pub const CLASS_SHOW: &str = "show";
pub const CLASS_ERROR: &str = "error";
pub const CLASS_SUCCESS: &str = "success";

// ── Labels ──────────────────────────────────────────────────────

pub const SUBMIT_LABEL_IDLE: &str = "Send Message";
pub const SUBMIT_LABEL_SENDING: &str = "Sending...";

/// Status line text once a message is delivered.
pub const STATUS_SENT: &str = "Thanks! Your message has been sent.";
pub const SEND_FAILED_MESSAGE: &str = "Your message could not be sent. Please try again.";

/// Toasts for forms without a notice or status element.
pub const TOAST_SENDING: &str = "Sending message...";
pub const TOAST_SENT: &str = "Message sent successfully! I'll get back to you soon.";

// ── Colors ──────────────────────────────────────────────────────

pub const STATUS_COLOR_ERROR: &str = "#f87171";
pub const STATUS_COLOR_INFO: &str = "#9ca3af";
