pub mod charting;
pub mod grid;
pub mod screen;

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::app::{App, AppState};
use crate::clock::Clock;
use screen::{ResultsScreen, RunningScreen, Screen, WelcomeScreen};

impl<C: Clock + Clone> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Welcome => WelcomeScreen.render(self, area, buf),
            AppState::Running => RunningScreen.render(self, area, buf),
            AppState::Results => ResultsScreen.render(self, area, buf),
        }
    }
}
