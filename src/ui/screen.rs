use ratatui::{buffer::Buffer, layout::Rect};

use crate::{
    app::{App, ScreenKind},
    runtime::{Clock, TickSource},
    ui::{
        sign_in::SignInScreen,
        typing::{TestScreen, WelcomeScreen},
    },
};

/// A UI Screen boundary: renders one top-level view into the body area
pub trait Screen {
    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen<'a, T: TickSource, C: Clock>(app: &'a App<T, C>) -> Box<dyn Screen + 'a> {
    match app.screen() {
        ScreenKind::SignIn => Box::new(SignInScreen { form: &app.form }),
        ScreenKind::Welcome => Box::new(WelcomeScreen),
        ScreenKind::Test => Box::new(TestScreen {
            view: app.engine.render_state(),
        }),
    }
}
