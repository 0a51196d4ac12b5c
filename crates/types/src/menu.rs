use serde::{Deserialize, Serialize};

/// Open/closed state of the header overlay menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        matches!(self, MenuState::Open)
    }

    pub fn toggled(self) -> Self {
        match self {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        }
    }

    /// Value for `aria-expanded`.
    pub fn aria_expanded(self) -> &'static str {
        if self.is_open() { "true" } else { "false" }
    }
}

impl From<bool> for MenuState {
    fn from(open: bool) -> Self {
        if open { MenuState::Open } else { MenuState::Closed }
    }
}
