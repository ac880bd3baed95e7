//! Guided help-request flow
//!
//! ```text
//! Welcome ──start──▶ ProblemSelection ──next──▶ NfcPrompt ──card──▶ IdentityConfirm
//!    ▲                 │   ▲                      │                  │       │
//!    └──────back───────┘   └─────────back─────────┘                  │     send
//!    ▲                                                               │       ▼
//!    └───────────────────────────cancel──────────────────────────────┘  SubmissionComplete
//!    └────────────────────────────────finish────────────────────────────────────┘
//! ```

use super::FLOW_SCREEN;
use crate::backend::{ReportSubmission, SubmissionOutcome, WaitEstimate, DEFAULT_REPORT_TYPES};
use crate::card::{CardCorrelator, CardEvent, CardSubscription, ResidentProfile};
use crate::context::KioskContext;
use crate::hal::{draw_centered_text, Color, DisplaySurface};
use crate::touch::TouchPoint;
use crate::ui::widgets::{Button, ButtonResponse, SelectionMenu};
use crate::ui::{Screen, ScreenContext, ScreenState};

/// Steps of the guided flow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Welcome,
    ProblemSelection,
    NfcPrompt,
    IdentityConfirm,
    SubmissionComplete,
}

/// The kiosk's main screen
pub struct FlowScreen {
    state: ScreenState,
    flow: FlowState,

    options: Vec<String>,
    backend_options_applied: bool,
    menu: SelectionMenu,

    selected_issue: Option<String>,
    profile: Option<ResidentProfile>,
    correlator: CardCorrelator,
    outcome: Option<SubmissionOutcome>,
    cards: Option<CardSubscription>,

    start_button: Button,
    issue_next_button: Button,
    issue_back_button: Button,
    nfc_back_button: Button,
    send_button: Button,
    cancel_button: Button,
    finish_button: Button,
}

impl Default for FlowScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowScreen {
    pub fn new() -> Self {
        let options: Vec<String> = DEFAULT_REPORT_TYPES.iter().map(|s| s.to_string()).collect();
        let mut menu = SelectionMenu::new(20, 30, 280, 170);
        menu.set_items(&options);

        Self {
            state: ScreenState::new(),
            flow: FlowState::Welcome,
            options,
            backend_options_applied: false,
            menu,
            selected_issue: None,
            profile: None,
            correlator: CardCorrelator::new(),
            outcome: None,
            cards: None,
            start_button: Button::new(70, 170, 180, 60, "Rozpocznij"),
            issue_next_button: Button::new(211, 205, 90, 32, "Dalej"),
            issue_back_button: Button::new(18, 205, 90, 32, "Wstecz"),
            nfc_back_button: Button::new(105, 185, 115, 45, "Wstecz"),
            send_button: Button::new(180, 170, 120, 45, "Wyslij"),
            cancel_button: Button::new(20, 170, 120, 45, "Anuluj"),
            finish_button: Button::new(75, 180, 175, 45, "Zakoncz"),
        }
    }

    pub fn flow_state(&self) -> FlowState {
        self.flow
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.menu.selected_index()
    }

    pub fn selected_issue(&self) -> Option<&str> {
        self.selected_issue.as_deref()
    }

    pub fn profile(&self) -> Option<&ResidentProfile> {
        self.profile.as_ref()
    }

    pub fn last_correlated_card(&self) -> Option<String> {
        self.correlator.last_correlated().map(|c| c.uid_string())
    }

    /// Result of the last send, if any in this session
    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        self.outcome
    }

    pub fn wait_estimate(&self) -> WaitEstimate {
        self.outcome.map_or(WaitEstimate::Unknown, |o| o.wait)
    }

    pub fn is_subscribed(&self) -> bool {
        self.cards.is_some()
    }

    /// Idempotent state change
    pub fn transition_to(&mut self, next: FlowState) {
        if self.flow == next {
            return;
        }
        match next {
            FlowState::ProblemSelection => {
                if self.flow == FlowState::Welcome {
                    self.reset_session();
                }
                self.menu.force_redraw();
            }
            FlowState::Welcome => self.reset_session(),
            _ => {}
        }
        log::info!("Flow: {:?} -> {:?}", self.flow, next);
        self.flow = next;
        self.mark_dirty();
    }

    fn reset_session(&mut self) {
        self.selected_issue = None;
        self.profile = None;
        self.correlator.reset();
        self.outcome = None;
        self.menu.clear_selection();
        self.menu.force_redraw();
    }

    /// Swap in the backend list, but never under a user mid-flow
    fn apply_backend_options(&mut self, kiosk: &KioskContext) {
        if self.backend_options_applied || self.flow != FlowState::Welcome {
            return;
        }
        let Some(types) = kiosk.backend.report_types() else {
            return;
        };
        self.backend_options_applied = true;
        if types.is_empty() {
            return;
        }
        log::info!("Using {} report types from backend", types.len());
        self.options = types.to_vec();
        self.menu.set_items(&self.options);
        self.mark_dirty();
    }

    fn handle_cards(&mut self, ctx: &mut ScreenContext<'_>) {
        let Some(cards) = self.cards.as_ref() else {
            return;
        };
        let events: Vec<CardEvent> = cards.drain().collect();
        if self.flow != FlowState::NfcPrompt {
            return;
        }

        for event in events {
            let CardEvent::Present(card) = event else {
                continue;
            };
            if let Some(correlation) = self.correlator.correlate(&card, &ctx.kiosk.residents) {
                self.profile = Some(correlation.profile);
                self.transition_to(FlowState::IdentityConfirm);
                break;
            }
        }
    }

    fn send(&mut self, ctx: &mut ScreenContext<'_>) {
        let Some(profile) = self.profile.as_ref() else {
            return;
        };

        if let Some(display) = ctx.display() {
            display.fill_screen(Color::WHITE);
            draw_centered_text(display, "Wysylanie...", 120, 2, Color::BLACK);
        }

        let issue = self.selected_issue.as_deref().unwrap_or_default();
        let report = ReportSubmission::new(profile, issue, &ctx.kiosk.site, &ctx.kiosk.config.report);
        let (backend, net) = ctx.kiosk.backend_with_network();
        let outcome = backend.submit_and_estimate(net, &report);

        self.transition_to(FlowState::SubmissionComplete);
        self.outcome = Some(outcome);
    }

    fn draw_welcome(&self, display: &mut dyn DisplaySurface) {
        display.fill_screen(Color::NAVY);
        display.set_text_color(Color::WHITE);
        display.set_text_size(4);
        display.set_cursor(15, 15);
        display.print_text("GenLink");
        display.set_cursor(193, 15);
        display.print_text("Kiosk");
        draw_centered_text(display, "Dotknij aby rozpoczac", 130, 2, Color::CYAN);
        self.start_button.draw(display);
    }

    fn draw_problem_selection(&mut self, display: &mut dyn DisplaySurface) {
        display.fill_screen(Color::BLACK);
        draw_centered_text(display, "Wybierz rodzaj pomocy", 5, 2, Color::WHITE);
        self.menu.force_redraw();
        self.menu.draw(display);
        self.issue_back_button.draw(display);
        self.issue_next_button.draw(display);
    }

    fn draw_nfc_prompt(&self, display: &mut dyn DisplaySurface) {
        display.fill_screen(Color::DARK_CYAN);
        draw_centered_text(display, "Przyloz karte NFC", 40, 3, Color::WHITE);
        draw_centered_text(display, "Przyloz swoja karte", 120, 2, Color::WHITE);
        draw_centered_text(display, "do czytnika", 145, 2, Color::WHITE);
        self.nfc_back_button.draw(display);
    }

    fn draw_identity_confirm(&self, display: &mut dyn DisplaySurface) {
        display.fill_screen(Color::WHITE);
        draw_centered_text(display, "Potwierdz dane", 10, 3, Color::BLACK);

        let anonymous = ResidentProfile::anonymous();
        let profile = self.profile.as_ref().unwrap_or(&anonymous);
        display.set_text_color(Color::DARK_CYAN);
        display.set_text_size(2);
        display.set_cursor(20, 70);
        display.print_text(&profile.name);
        display.set_cursor(20, 90);
        display.print_text(&format!("Telefon: {}", profile.phone));
        display.set_cursor(20, 110);
        display.print_text("Problem: ");
        display.set_cursor(20, 130);
        display.print_text(self.selected_issue.as_deref().unwrap_or_default());

        self.cancel_button.draw(display);
        self.send_button.draw(display);
    }

    fn draw_submission_complete(&self, display: &mut dyn DisplaySurface) {
        display.fill_screen(Color::WHITE);
        draw_centered_text(display, "Zgloszenie", 15, 3, Color::DARK_GREEN);
        draw_centered_text(display, "wyslane!", 42, 3, Color::DARK_GREEN);
        draw_centered_text(display, "Dziekujemy!", 90, 2, Color::BLACK);

        display.set_text_size(2);
        display.set_text_color(Color::BLACK);
        display.set_cursor(25, 125);
        display.print_text("Przewidywany czas");
        display.set_cursor(25, 145);
        match self.wait_estimate() {
            WaitEstimate::Minutes(m) => display.print_text(&format!("oczekiwania: {} minut", m)),
            WaitEstimate::Unknown => display.print_text("oczekiwania: -- minut"),
        }
        self.finish_button.draw(display);
    }

    fn buttons_mut(&mut self) -> Vec<&mut Button> {
        match self.flow {
            FlowState::Welcome => vec![&mut self.start_button],
            FlowState::ProblemSelection => vec![&mut self.issue_back_button, &mut self.issue_next_button],
            FlowState::NfcPrompt => vec![&mut self.nfc_back_button],
            FlowState::IdentityConfirm => vec![&mut self.cancel_button, &mut self.send_button],
            FlowState::SubmissionComplete => vec![&mut self.finish_button],
        }
    }
}

fn redraw_button(button: &Button, response: ButtonResponse, ctx: &mut ScreenContext<'_>) {
    if response.needs_redraw() {
        if let Some(display) = ctx.display() {
            button.draw(display);
        }
    }
}

impl Screen for FlowScreen {
    fn name(&self) -> &str {
        FLOW_SCREEN
    }

    fn state(&self) -> &ScreenState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ScreenState {
        &mut self.state
    }

    fn on_enter(&mut self, ctx: &mut ScreenContext<'_>) {
        self.cards = Some(ctx.kiosk.card_feed.subscribe());

        let now = ctx.now_ms();
        let (backend, net) = ctx.kiosk.backend_with_network();
        if let Some(net) = net {
            if let Err(e) = backend.fetch_report_types_once(net, now) {
                log::debug!("Report types still unavailable: {}", e);
            }
        }
        self.apply_backend_options(ctx.kiosk);
        self.mark_dirty();
    }

    fn on_exit(&mut self, ctx: &mut ScreenContext<'_>) {
        if let Some(cards) = self.cards.take() {
            ctx.kiosk.card_feed.unsubscribe(cards.id());
        }
        for button in self.buttons_mut() {
            button.reset();
        }
    }

    fn on_update(&mut self, ctx: &mut ScreenContext<'_>) {
        self.apply_backend_options(ctx.kiosk);
        self.handle_cards(ctx);
    }

    fn on_draw(&mut self, display: &mut dyn DisplaySurface, _kiosk: &KioskContext) {
        match self.flow {
            FlowState::Welcome => self.draw_welcome(display),
            FlowState::ProblemSelection => self.draw_problem_selection(display),
            FlowState::NfcPrompt => self.draw_nfc_prompt(display),
            FlowState::IdentityConfirm => self.draw_identity_confirm(display),
            FlowState::SubmissionComplete => self.draw_submission_complete(display),
        }
    }

    fn on_touch_down(&mut self, point: TouchPoint, ctx: &mut ScreenContext<'_>) {
        if self.flow == FlowState::ProblemSelection && self.menu.on_touch_down(point).is_some() {
            self.selected_issue = self.menu.selected_label().map(str::to_string);
            if let Some(display) = ctx.display() {
                self.menu.draw(display);
            }
        }

        for button in self.buttons_mut() {
            let response = button.on_touch_down(point);
            redraw_button(button, response, ctx);
        }
    }

    fn on_touch_up(&mut self, point: TouchPoint, ctx: &mut ScreenContext<'_>) {
        let mut clicked = None;
        for (i, button) in self.buttons_mut().into_iter().enumerate() {
            let response = button.on_touch_up(point);
            redraw_button(button, response, ctx);
            if response == ButtonResponse::Clicked {
                clicked = Some(i);
            }
        }
        let Some(i) = clicked else {
            return;
        };

        match (self.flow, i) {
            (FlowState::Welcome, _) => self.transition_to(FlowState::ProblemSelection),
            (FlowState::ProblemSelection, 0) => self.transition_to(FlowState::Welcome),
            (FlowState::ProblemSelection, _) => {
                if self.menu.has_selection() {
                    self.selected_issue = self.menu.selected_label().map(str::to_string);
                    self.transition_to(FlowState::NfcPrompt);
                }
            }
            (FlowState::NfcPrompt, _) => {
                self.correlator.reset();
                self.profile = None;
                self.transition_to(FlowState::ProblemSelection);
            }
            (FlowState::IdentityConfirm, 0) => self.transition_to(FlowState::Welcome),
            (FlowState::IdentityConfirm, _) => self.send(ctx),
            (FlowState::SubmissionComplete, _) => self.transition_to(FlowState::Welcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardIdentity, ResidentRegistry};
    use crate::config::KioskConfig;
    use crate::sim::{CannedTransport, TerminalDisplay};
    use crate::ui::Navigator;

    const START: (i16, i16) = (160, 200);
    const NEXT: (i16, i16) = (256, 221);
    const ISSUE_BACK: (i16, i16) = (63, 221);
    const NFC_BACK: (i16, i16) = (162, 207);
    const SEND: (i16, i16) = (240, 192);
    const CANCEL: (i16, i16) = (80, 192);
    const FINISH: (i16, i16) = (162, 202);

    fn row(index: i16) -> (i16, i16) {
        (100, 42 + index * 26 + 5)
    }

    struct Harness {
        kiosk: KioskContext,
        nav: Navigator,
        screen: FlowScreen,
    }

    impl Harness {
        fn new() -> Self {
            let mut kiosk = KioskContext::new(KioskConfig::default());
            kiosk.residents = ResidentRegistry::with_builtin();
            kiosk.display = Some(Box::new(TerminalDisplay::new()));
            let mut h = Self {
                kiosk,
                nav: Navigator::new(),
                screen: FlowScreen::new(),
            };
            h.with_ctx(|s, ctx| s.on_enter(ctx));
            h
        }

        fn with_ctx(&mut self, f: impl FnOnce(&mut FlowScreen, &mut ScreenContext<'_>)) {
            let mut ctx = ScreenContext {
                kiosk: &mut self.kiosk,
                nav: &mut self.nav,
            };
            f(&mut self.screen, &mut ctx);
        }

        fn tap(&mut self, (x, y): (i16, i16)) {
            let p = TouchPoint::at(x, y);
            self.with_ctx(|s, ctx| {
                s.on_touch_down(p, ctx);
                s.on_touch_up(p, ctx);
            });
        }

        fn present(&mut self, uid: &[u8]) {
            self.kiosk.card_feed.publish(CardIdentity::new(uid, 0));
            self.with_ctx(|s, ctx| s.on_update(ctx));
        }

        fn to_nfc_prompt(&mut self) {
            self.tap(START);
            self.tap(row(1));
            self.tap(NEXT);
            assert_eq!(self.screen.flow_state(), FlowState::NfcPrompt);
        }

        fn assert_session_cleared(&self) {
            assert_eq!(self.screen.flow_state(), FlowState::Welcome);
            assert_eq!(self.screen.selected_issue(), None);
            assert_eq!(self.screen.selected_index(), None);
            assert!(self.screen.profile().is_none());
            assert!(self.screen.last_correlated_card().is_none());
            assert_eq!(self.screen.wait_estimate(), WaitEstimate::Unknown);
        }
    }

    #[test]
    fn test_selection_scenario_without_network() {
        let mut h = Harness::new();
        assert!(h.screen.is_subscribed());

        h.tap(START);
        assert_eq!(h.screen.flow_state(), FlowState::ProblemSelection);
        assert_eq!(h.screen.selected_index(), None);

        h.tap(row(2));
        assert_eq!(h.screen.selected_index(), Some(2));
        assert_eq!(h.screen.flow_state(), FlowState::ProblemSelection);

        h.tap(NEXT);
        assert_eq!(h.screen.flow_state(), FlowState::NfcPrompt);

        h.present(&[0xDE, 0xAD, 0x00, 0x01]);
        assert_eq!(h.screen.flow_state(), FlowState::IdentityConfirm);
        assert!(h.screen.profile().unwrap().is_anonymous());

        h.tap(SEND);
        assert_eq!(h.screen.flow_state(), FlowState::SubmissionComplete);
        assert_eq!(h.screen.wait_estimate(), WaitEstimate::Unknown);
        assert!(!h.screen.outcome().unwrap().submitted);
    }

    #[test]
    fn test_next_requires_selection() {
        let mut h = Harness::new();
        h.tap(START);
        h.tap(NEXT);
        assert_eq!(h.screen.flow_state(), FlowState::ProblemSelection);
    }

    #[test]
    fn test_known_card_binds_resident() {
        let mut h = Harness::new();
        h.to_nfc_prompt();
        h.present(&[0x04, 0xA1, 0xB2, 0xC3]);

        let profile = h.screen.profile().unwrap();
        assert_eq!(profile.name, "Jan Kowalski");
        assert_eq!(profile.phone, "600000001");
    }

    #[test]
    fn test_cards_ignored_outside_prompt() {
        let mut h = Harness::new();
        h.present(&[0x04, 0xA1, 0xB2, 0xC3]);
        h.tap(START);
        h.present(&[0x04, 0xA1, 0xB2, 0xC3]);
        assert_eq!(h.screen.flow_state(), FlowState::ProblemSelection);
        assert!(h.screen.profile().is_none());
    }

    #[test]
    fn test_nfc_back_keeps_selection_and_rearms_card() {
        let mut h = Harness::new();
        h.to_nfc_prompt();
        h.present(&[0x04, 0xA1, 0xB2, 0xC3]);
        assert_eq!(h.screen.flow_state(), FlowState::IdentityConfirm);

        // back out of a fresh prompt
        let mut h = Harness::new();
        h.to_nfc_prompt();
        h.tap(NFC_BACK);
        assert_eq!(h.screen.flow_state(), FlowState::ProblemSelection);
        assert_eq!(h.screen.selected_issue(), Some("Bank"));

        h.tap(NEXT);
        h.present(&[0x04, 0xDE, 0xAD, 0xBE]);
        assert_eq!(h.screen.profile().unwrap().name, "Anna Nowak");
    }

    #[test]
    fn test_every_path_home_clears_session() {
        let mut h = Harness::new();
        h.tap(START);
        h.tap(row(0));
        h.tap(ISSUE_BACK);
        h.assert_session_cleared();

        h.to_nfc_prompt();
        h.present(&[1, 2, 3, 4]);
        h.tap(CANCEL);
        h.assert_session_cleared();

        h.to_nfc_prompt();
        h.present(&[1, 2, 3, 4]);
        h.tap(SEND);
        h.tap(FINISH);
        h.assert_session_cleared();

        // same card works again in a new session
        h.to_nfc_prompt();
        h.present(&[1, 2, 3, 4]);
        assert_eq!(h.screen.flow_state(), FlowState::IdentityConfirm);
    }

    #[test]
    fn test_submission_with_backend() {
        let mut h = Harness::new();
        let mut net = CannedTransport::new();
        let endpoints = h.kiosk.backend.endpoints().clone();
        net.respond_post(&endpoints.reports, 201, "{}");
        net.respond_get(&endpoints.avg_response_time, 200, r#"{"average_response_minutes": 12}"#);
        let requests = net.request_log();
        h.kiosk.network = Some(Box::new(net));

        h.to_nfc_prompt();
        h.present(&[0x04, 0xA1, 0xB2, 0xC3]);
        h.tap(SEND);

        assert_eq!(h.screen.wait_estimate(), WaitEstimate::Minutes(12));
        let posted = requests.posts();
        assert_eq!(posted.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&posted[0].body).unwrap();
        assert_eq!(body["full_name"], "Jan Kowalski");
        assert!(body["report_details"].as_str().unwrap().contains("Bank"));
    }

    #[test]
    fn test_backend_options_wait_for_welcome() {
        let mut h = Harness::new();
        let mut net = CannedTransport::new();
        let url = h.kiosk.backend.endpoints().report_types.clone();
        net.respond_get(&url, 200, r#"[{"name":"Zakupy"},{"name":"Lekarz"}]"#);
        h.kiosk.network = Some(Box::new(net));

        h.tap(START);
        h.tap(row(1));
        let (backend, net) = h.kiosk.backend_with_network();
        backend.fetch_report_types_once(net.unwrap(), 0).unwrap();

        h.with_ctx(|s, ctx| s.on_update(ctx));
        assert_eq!(h.screen.options().len(), 5);
        assert_eq!(h.screen.selected_issue(), Some("Bank"));

        h.tap(ISSUE_BACK);
        h.with_ctx(|s, ctx| s.on_update(ctx));
        assert_eq!(h.screen.options(), ["Zakupy", "Lekarz"]);
    }

    #[test]
    fn test_reenter_keeps_state_and_retries_sync() {
        let mut h = Harness::new();
        let mut net = CannedTransport::new();
        let url = h.kiosk.backend.endpoints().report_types.clone();
        net.respond_get(&url, 503, "");
        let requests = net.request_log();
        h.kiosk.network = Some(Box::new(net));

        h.to_nfc_prompt();
        h.screen.state_mut().clear_dirty();
        h.with_ctx(|s, ctx| s.on_exit(ctx));
        assert!(!h.screen.is_subscribed());
        h.with_ctx(|s, ctx| s.on_enter(ctx));

        assert_eq!(h.screen.flow_state(), FlowState::NfcPrompt);
        assert_eq!(h.screen.selected_issue(), Some("Bank"));
        assert!(h.screen.is_dirty());
        assert!(h.screen.is_subscribed());
        assert_eq!(h.kiosk.card_feed.listener_count(), 1);
        assert_eq!(requests.gets().iter().filter(|r| r.url == url).count(), 1);

        h.with_ctx(|s, ctx| s.on_exit(ctx));
        h.with_ctx(|s, ctx| s.on_enter(ctx));
        assert_eq!(requests.gets().iter().filter(|r| r.url == url).count(), 2);
        assert!(!h.kiosk.backend.is_loaded());
    }

    #[test]
    fn test_exit_unsubscribes() {
        let mut h = Harness::new();
        assert_eq!(h.kiosk.card_feed.listener_count(), 1);
        h.with_ctx(|s, ctx| s.on_exit(ctx));
        assert!(!h.screen.is_subscribed());
        assert_eq!(h.kiosk.card_feed.listener_count(), 0);
    }

    #[test]
    fn test_transition_is_idempotent() {
        let mut h = Harness::new();
        h.screen.state_mut().clear_dirty();
        h.screen.transition_to(FlowState::Welcome);
        assert!(!h.screen.is_dirty());
    }
}
