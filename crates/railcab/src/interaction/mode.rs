use tracing::debug;

use super::menu::Menu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    Pause,
    Menu,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 3] = [Self::Normal, Self::Pause, Self::Menu];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitRequest {
    Quit,
    ExitToMainMenu,
}

/// Current interaction mode, the open menu (if any) and a pending quit.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    menu: Option<Menu>,
    quit: Option<QuitRequest>,
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "interaction_mode_changed");
            self.mode = mode;
        }
        if mode != InteractionMode::Menu {
            self.menu = None;
        }
    }

    pub fn open_menu(&mut self, menu: Menu) {
        self.menu = Some(menu);
        self.set_mode(InteractionMode::Menu);
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    pub fn menu_mut(&mut self) -> Option<&mut Menu> {
        self.menu.as_mut()
    }

    pub fn request_quit(&mut self, request: QuitRequest) {
        if self.quit.is_none() {
            debug!(?request, "quit_requested");
            self.quit = Some(request);
        }
    }

    pub fn quit_request(&self) -> Option<QuitRequest> {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::InterfaceStrings;

    #[test]
    fn leaving_menu_mode_drops_the_menu() {
        let strings = InterfaceStrings::default();
        let mut state = InteractionState::default();
        state.open_menu(Menu::quit_confirmation(&strings));
        assert_eq!(state.mode(), InteractionMode::Menu);
        assert!(state.menu().is_some());

        state.set_mode(InteractionMode::Normal);
        assert!(state.menu().is_none());
    }

    #[test]
    fn first_quit_request_wins() {
        let mut state = InteractionState::default();
        state.request_quit(QuitRequest::ExitToMainMenu);
        state.request_quit(QuitRequest::Quit);
        assert_eq!(state.quit_request(), Some(QuitRequest::ExitToMainMenu));
    }
}
