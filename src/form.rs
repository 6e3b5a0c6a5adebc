//! Contact form validation and simulated submission.
//!
//! Each tracked field runs a small state machine:
//!
//! ```text
//! Neutral --blur/submit--> Error(msg) | Success
//! Error | Success --input--> Neutral
//! ```
//!
//! Submit validates every field in a fixed order without short-circuiting so
//! all messages appear together. Only when every tracked field is `Success`
//! does the form enter `Sending`; the owner then hands the message to a
//! [`Transport`] after the simulated latency and reports back through
//! [`ContactForm::settle`].
//!
//! Pages differ in how they show the outcome: per-field error elements and a
//! success notice, a single status line, or neither (the owner then falls
//! back to toasts). Whichever elements exist are kept up to date.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::consts::{
    CLASS_ERROR, CLASS_SHOW, CLASS_SUCCESS, SEND_FAILED_MESSAGE, STATUS_COLOR_ERROR, STATUS_COLOR_INFO, STATUS_SENT,
    SUBMIT_LABEL_IDLE, SUBMIT_LABEL_SENDING,
};
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, ViewPort};

/// A contact form input, in validation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    /// Element id of the input.
    #[must_use]
    pub fn input_id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }

    /// Element id of the inline error message.
    #[must_use]
    pub fn error_id(self) -> &'static str {
        match self {
            Self::Name => "nameError",
            Self::Email => "emailError",
            Self::Subject => "subjectError",
            Self::Message => "messageError",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        }
    }
}

/// Validation state of one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Neutral,
    Error(String),
    Success,
}

impl FieldState {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Permissive `local@domain.suffix` check.
///
/// Every part must be non-empty and free of whitespace and `@`. The split
/// between domain and suffix may fall on any `.` after the `@`.
#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    let Some((local, host)) = raw.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(host) {
        return false;
    }
    host.char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < host.len())
}

/// Validate one field's raw value.
#[must_use]
pub fn validate(field: Field, raw: &str) -> FieldState {
    let value = raw.trim();
    if value.is_empty() {
        return FieldState::Error(format!("{} is required", field.label()));
    }
    if field == Field::Email && !is_valid_email(value) {
        return FieldState::Error("Please enter a valid email address".to_owned());
    }
    FieldState::Success
}

/// A validated submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
        }
    }
}

/// Where validated messages go.
pub trait Transport {
    /// Deliver `message`. Called once per submission, after the simulated latency.
    ///
    /// # Errors
    ///
    /// [`SiteError::Transport`] when delivery fails.
    fn submit(&mut self, message: &ContactMessage) -> Result<()>;
}

/// Accepts every message without sending it anywhere.
#[derive(Clone, Debug, Default)]
pub struct SimulatedTransport {
    pub delivered: Vec<ContactMessage>,
}

impl Transport for SimulatedTransport {
    fn submit(&mut self, message: &ContactMessage) -> Result<()> {
        match serde_json::to_string(message) {
            Ok(payload) => log::info!("form: simulated delivery of {} bytes", payload.len()),
            Err(e) => log::debug!("form: could not serialize message: {e}"),
        }
        self.delivered.push(message.clone());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Sending,
}

/// Result of a submit attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// At least one field failed validation.
    Rejected,
    /// All fields valid; the message is waiting on the transport.
    Sending(ContactMessage),
    /// A previous submission is still in flight.
    Busy,
}

#[derive(Clone, Debug)]
struct Tracked {
    field: Field,
    input: NodeId,
    error: Option<NodeId>,
    state: FieldState,
}

/// The contact form and its per-field state.
#[derive(Clone, Debug)]
pub struct ContactForm {
    form: NodeId,
    fields: Vec<Tracked>,
    submit_button: Option<NodeId>,
    success_notice: Option<NodeId>,
    status: Option<NodeId>,
    phase: SubmitPhase,
}

impl ContactForm {
    /// Locate the form and whichever of the four inputs it carries.
    ///
    /// # Errors
    ///
    /// [`SiteError::MissingElement`] when the form is absent or has no
    /// recognizable inputs.
    pub fn init(vp: &impl ViewPort, config: &SiteConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let form = vp
            .select(&selectors.contact_form)
            .ok_or_else(|| SiteError::missing("form", &selectors.contact_form))?;
        let fields: Vec<Tracked> = Field::ALL
            .iter()
            .filter_map(|&field| {
                let input = vp.by_id(field.input_id())?;
                let error = vp.by_id(field.error_id());
                Some(Tracked { field, input, error, state: FieldState::Neutral })
            })
            .collect();
        if fields.is_empty() {
            return Err(SiteError::missing("form", "#name"));
        }
        log::info!("form: tracking {} fields", fields.len());
        Ok(Self {
            form,
            fields,
            submit_button: vp.select(&selectors.submit_button),
            success_notice: vp.select(&selectors.success_message),
            status: vp.select(&selectors.form_status),
            phase: SubmitPhase::Idle,
        })
    }

    /// State of `field`, or `None` if the page has no such input.
    #[must_use]
    pub fn state(&self, field: Field) -> Option<&FieldState> {
        self.fields.iter().find(|t| t.field == field).map(|t| &t.state)
    }

    /// Tracked fields in validation order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().map(|t| t.field)
    }

    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Whether the page shows sending and success on its own (a success
    /// notice or a status line).
    #[must_use]
    pub fn has_outcome_feedback(&self) -> bool {
        self.success_notice.is_some() || self.status.is_some()
    }

    /// Whether validation messages have somewhere to appear.
    #[must_use]
    pub fn has_error_feedback(&self) -> bool {
        self.status.is_some() || self.fields.iter().any(|t| t.error.is_some())
    }

    /// Message of the first field in error, in validation order.
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.fields.iter().find_map(|t| match &t.state {
            FieldState::Error(message) => Some(message.as_str()),
            FieldState::Neutral | FieldState::Success => None,
        })
    }

    /// The field whose input is `target`.
    #[must_use]
    pub fn field_for(&self, target: &NodeId) -> Option<Field> {
        self.fields.iter().find(|t| &t.input == target).map(|t| t.field)
    }

    /// Whether `target` is the form element itself.
    #[must_use]
    pub fn is_form(&self, target: &NodeId) -> bool {
        &self.form == target
    }

    /// Validate a single field after it loses focus.
    pub fn on_blur(&mut self, vp: &mut impl ViewPort, field: Field) {
        if let Some(index) = self.index(field) {
            self.validate_at(vp, index);
        }
    }

    /// Clear a field's state as soon as the visitor edits it.
    pub fn on_input(&mut self, vp: &mut impl ViewPort, field: Field) {
        if let Some(index) = self.index(field) {
            self.set_state(vp, index, FieldState::Neutral);
        }
    }

    /// Validate every field and, if all pass, enter `Sending`.
    pub fn on_submit(&mut self, vp: &mut impl ViewPort) -> SubmitOutcome {
        if self.phase == SubmitPhase::Sending {
            return SubmitOutcome::Busy;
        }
        let mut all_valid = true;
        for index in 0..self.fields.len() {
            all_valid &= self.validate_at(vp, index);
        }
        if !all_valid {
            log::debug!("form: submit rejected");
            if let Some(message) = self.first_error().map(str::to_owned) {
                self.set_status(vp, &message, STATUS_COLOR_ERROR);
            }
            return SubmitOutcome::Rejected;
        }

        let mut message = ContactMessage::default();
        for tracked in &self.fields {
            message.set(tracked.field, vp.value(&tracked.input).trim().to_owned());
        }
        self.phase = SubmitPhase::Sending;
        if let Some(button) = &self.submit_button {
            vp.set_text(button, SUBMIT_LABEL_SENDING);
            vp.set_disabled(button, true);
        }
        self.set_status(vp, SUBMIT_LABEL_SENDING, STATUS_COLOR_INFO);
        SubmitOutcome::Sending(message)
    }

    /// Apply the transport's verdict. Returns `true` on success.
    ///
    /// Success shows the notice, clears every value and resets all states to
    /// `Neutral`. Failure keeps the values so the visitor can retry. Either
    /// way the submit control is restored.
    pub fn settle(&mut self, vp: &mut impl ViewPort, outcome: &Result<()>) -> bool {
        self.phase = SubmitPhase::Idle;
        if let Some(button) = &self.submit_button {
            vp.set_text(button, SUBMIT_LABEL_IDLE);
            vp.set_disabled(button, false);
        }
        if outcome.is_err() {
            self.set_status(vp, SEND_FAILED_MESSAGE, STATUS_COLOR_ERROR);
            return false;
        }
        if let Some(notice) = &self.success_notice {
            vp.add_class(notice, CLASS_SHOW);
        }
        self.set_status(vp, STATUS_SENT, STATUS_COLOR_INFO);
        for index in 0..self.fields.len() {
            let input = self.fields[index].input.clone();
            vp.set_value(&input, "");
            self.set_state(vp, index, FieldState::Neutral);
        }
        true
    }

    /// Hide the success notice.
    pub fn hide_notice(&self, vp: &mut impl ViewPort) {
        if let Some(notice) = &self.success_notice {
            vp.remove_class(notice, CLASS_SHOW);
        }
    }

    fn set_status(&self, vp: &mut impl ViewPort, text: &str, color: &str) {
        if let Some(status) = &self.status {
            vp.set_text(status, text);
            vp.set_styles(status, &[("display", "inline"), ("color", color)]);
        }
    }

    fn index(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|t| t.field == field)
    }

    fn validate_at(&mut self, vp: &mut impl ViewPort, index: usize) -> bool {
        let tracked = &self.fields[index];
        let state = validate(tracked.field, &vp.value(&tracked.input));
        let ok = state.is_success();
        self.set_state(vp, index, state);
        ok
    }

    fn set_state(&mut self, vp: &mut impl ViewPort, index: usize, state: FieldState) {
        let tracked = &mut self.fields[index];
        vp.toggle_class(&tracked.input, CLASS_ERROR, state.is_error());
        vp.toggle_class(&tracked.input, CLASS_SUCCESS, state.is_success());
        if let Some(error) = &tracked.error {
            match &state {
                FieldState::Error(message) => {
                    vp.set_text(error, message);
                    vp.add_class(error, CLASS_SHOW);
                }
                FieldState::Neutral | FieldState::Success => vp.remove_class(error, CLASS_SHOW),
            }
        }
        tracked.state = state;
    }
}
