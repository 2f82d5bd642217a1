//! Screens, commands, and the pure UI reducer.
//!
//! Keybinding dispatch lives in whatever frontend feeds commands in; this
//! module only defines the abstract command surface and the transition
//! function `(state, command) -> (state', effect)`. The orchestrator owns
//! performing the effect.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Select,
    Run,
    Summary,
}

/// Abstract command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    Toggle,
    SelectAll,
    ClearSelection,
    SelectFailed,
    Advance,
    Quit,
}

/// Cursor and screen, owned by the app container and replaced wholesale on
/// every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub screen: Screen,
    pub cursor: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Welcome,
            cursor: 0,
        }
    }
}

/// Side effect the orchestrator must perform after a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ToggleCurrent,
    SelectAll,
    ClearSelection,
    SelectFailed,
    Run,
    Quit,
}

/// Pure transition function. Cursor movement and selection commands apply
/// only while choosing steps; Advance is context-dependent; Quit works
/// everywhere.
pub fn reduce(state: UiState, command: Command, step_count: usize) -> (UiState, Effect) {
    if command == Command::Quit {
        return (state, Effect::Quit);
    }
    match (state.screen, command) {
        (Screen::Select, Command::MoveUp) => {
            let cursor = state.cursor.saturating_sub(1);
            (UiState { cursor, ..state }, Effect::None)
        }
        (Screen::Select, Command::MoveDown) => {
            let cursor = (state.cursor + 1).min(step_count.saturating_sub(1));
            (UiState { cursor, ..state }, Effect::None)
        }
        (Screen::Select, Command::Toggle) => (state, Effect::ToggleCurrent),
        (Screen::Select, Command::SelectAll) => (state, Effect::SelectAll),
        (Screen::Select, Command::ClearSelection) => (state, Effect::ClearSelection),
        (Screen::Select, Command::SelectFailed) => (state, Effect::SelectFailed),
        (Screen::Welcome, Command::Advance) => (
            UiState {
                screen: Screen::Select,
                ..state
            },
            Effect::None,
        ),
        (Screen::Select, Command::Advance) => (
            UiState {
                screen: Screen::Run,
                ..state
            },
            Effect::Run,
        ),
        (Screen::Summary, Command::Advance) => (
            UiState {
                screen: Screen::Welcome,
                ..state
            },
            Effect::None,
        ),
        _ => (state, Effect::None),
    }
}
