use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::auth::{Authenticator, CredentialForm, Identity};
use crate::config::{Config, ConfigStore};
use crate::engine::{TestState, TypingTestEngine};
use crate::runtime::{AppEvent, Clock, IntervalTicker, SystemClock, TickSource};

/// What the event loop should do after an event was handled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Which top-level view is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    SignIn,
    Welcome,
    Test,
}

pub struct App<T: TickSource = IntervalTicker, C: Clock = SystemClock> {
    pub engine: TypingTestEngine<T, C>,
    pub auth: Box<dyn Authenticator>,
    pub form: CredentialForm,
    pub config: Config,
    store: Box<dyn ConfigStore>,
}

impl<T: TickSource, C: Clock> App<T, C> {
    pub fn new(
        engine: TypingTestEngine<T, C>,
        mut auth: Box<dyn Authenticator>,
        store: Box<dyn ConfigStore>,
        config: Config,
    ) -> Self {
        if !config.require_sign_in && !auth.is_authenticated() {
            auth.sign_in_anonymously();
        }

        Self {
            form: Self::fresh_form(&config),
            engine,
            auth,
            config,
            store,
        }
    }

    fn fresh_form(config: &Config) -> CredentialForm {
        match (&config.last_email, config.remember_email) {
            (Some(email), true) => CredentialForm::with_email(email.clone()),
            _ => CredentialForm::default(),
        }
    }

    pub fn screen(&self) -> ScreenKind {
        if !self.auth.is_authenticated() {
            return ScreenKind::SignIn;
        }
        match self.engine.state() {
            TestState::Welcome => ScreenKind::Welcome,
            TestState::Active | TestState::Paused | TestState::Finished => ScreenKind::Test,
        }
    }

    pub fn continue_as_guest(&mut self) {
        self.auth.sign_in_anonymously();
    }

    /// Stop any run in progress and return to the credential form
    pub fn sign_out(&mut self) {
        self.engine.pause();
        self.engine.reset();
        self.auth.sign_out();
        self.form = Self::fresh_form(&self.config);
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick(generation) => {
                if self.engine.tick_generation() == Some(generation) {
                    self.engine.tick();
                } else {
                    debug!(generation, "stale tick dropped");
                }
                Control::Continue
            }
            AppEvent::Resize | AppEvent::Idle => Control::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.screen() {
            ScreenKind::SignIn => self.on_sign_in_key(key),
            ScreenKind::Welcome => match key.code {
                KeyCode::Enter => {
                    self.engine.start();
                    Control::Continue
                }
                KeyCode::F(2) => {
                    self.sign_out();
                    Control::Continue
                }
                KeyCode::Esc | KeyCode::Char('q') => Control::Quit,
                _ => Control::Continue,
            },
            ScreenKind::Test => self.on_test_key(key),
        }
    }

    fn on_sign_in_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Tab | KeyCode::BackTab => self.form.toggle_focus(),
            KeyCode::F(3) => self.auth.sign_in_anonymously(),
            KeyCode::F(4) => self.form.toggle_flow(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => {
                if self.form.submit(self.auth.as_mut()).is_ok() {
                    self.remember_identity();
                }
            }
            KeyCode::Char(c) if is_plain(&key) => self.form.insert_char(c),
            _ => {}
        }
        Control::Continue
    }

    fn on_test_key(&mut self, key: KeyEvent) -> Control {
        match self.engine.state() {
            TestState::Active => match key.code {
                KeyCode::Esc => {
                    self.engine.pause();
                }
                KeyCode::Backspace => {
                    let mut text = self.engine.typed_text().to_string();
                    text.pop();
                    self.engine.submit_input(&text);
                }
                KeyCode::Char(c) if is_plain(&key) => {
                    let mut text = self.engine.typed_text().to_string();
                    text.push(c);
                    self.engine.submit_input(&text);
                }
                _ => {}
            },
            TestState::Paused => match key.code {
                KeyCode::Enter | KeyCode::Char('p') => {
                    self.engine.resume();
                }
                KeyCode::Char('r') => {
                    self.engine.reset();
                }
                KeyCode::F(2) => self.sign_out(),
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            TestState::Finished => match key.code {
                KeyCode::Enter | KeyCode::Char('t') => {
                    self.engine.start();
                }
                KeyCode::Char('r') => {
                    self.engine.reset();
                }
                KeyCode::F(2) => self.sign_out(),
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            TestState::Welcome => {}
        }
        Control::Continue
    }

    fn remember_identity(&mut self) {
        if !self.config.remember_email {
            return;
        }
        let Some(Identity::Account(email)) = self.auth.identity() else {
            return;
        };
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }

        self.config.last_email = Some(email.clone());
        if let Err(err) = self.store.save(&self.config) {
            warn!(%err, "could not save config");
        }
    }
}

/// A character key without Ctrl or Alt, i.e. one that produces text
fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}
