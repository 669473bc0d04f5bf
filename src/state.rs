use crate::models::{Order, Pizza};

#[derive(Debug, Clone, PartialEq)]
pub enum MenuState {
    Loading,
    Success(Vec<Pizza>),
    Error(String),
}

impl MenuState {
    pub fn is_loading(&self) -> bool {
        matches!(self, MenuState::Loading)
    }

    pub fn pizzas(&self) -> &[Pizza] {
        match self {
            MenuState::Success(pizzas) => pizzas,
            MenuState::Loading | MenuState::Error(_) => &[],
        }
    }
}

/// Lifecycle of a single order placement:
/// `Idle -> Loading -> Success | Error`, and back to `Idle` on reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OrderState {
    #[default]
    Idle,
    Loading,
    Success(Order),
    Error(String),
}

impl OrderState {
    pub fn is_loading(&self) -> bool {
        matches!(self, OrderState::Loading)
    }

    /// `Success` and `Error` stay put until the caller resets.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Success(_) | OrderState::Error(_))
    }
}
