//! Request Context: who is asking, and what they are looking at
use serde::{Deserialize, Serialize};
use std::fmt;

/// The person on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: String,
}

impl ActingUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// What the acting user currently has on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    CardContents,
    CardList,
    #[default]
    Elsewhere,
}

impl View {
    /// Human-readable description handed to the model and used in cache keys.
    pub fn description(&self) -> &'static str {
        match self {
            View::CardContents => "inside a card",
            View::CardList => "viewing a list of cards",
            View::Elsewhere => "not seeing cards",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: ActingUser,
    pub view: View,
}

impl RequestContext {
    pub fn new(user: ActingUser, view: View) -> Self {
        Self { user, view }
    }

    pub fn user(&self) -> &ActingUser {
        &self.user
    }

    pub fn viewing_card_contents(&self) -> bool {
        self.view == View::CardContents
    }

    pub fn viewing_list_of_cards(&self) -> bool {
        self.view == View::CardList
    }

    pub fn view_description(&self) -> &'static str {
        if self.viewing_card_contents() {
            View::CardContents.description()
        } else if self.viewing_list_of_cards() {
            View::CardList.description()
        } else {
            View::Elsewhere.description()
        }
    }
}
