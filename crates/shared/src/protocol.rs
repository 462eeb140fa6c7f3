use serde::{Deserialize, Serialize};

use crate::domain::{ListName, RenderId};

/// Inbound intents the transport delivers to the controller. The transport
/// has already parsed callback payloads into one of these; the controller
/// never sees raw callback data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    ShowMainMenu,
    OpenListEditor { list: ListName },
    StartAdd { list: ListName },
    SubmitAddText { text: String },
    RequestRemovalPicker { list: ListName },
    RemoveByPosition { list: ListName, index: usize },
    ClearList { list: ListName },
    Roll,
    Back,
    BackToEditor { list: ListName },
}

/// Opaque action token attached to a rendered choice. The renderer echoes
/// the token back verbatim when the user picks the choice; the compact
/// string codec keeps tokens well under chat-platform payload limits, which
/// is also why removal targets are addressed by position rather than by
/// word text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowMainMenu,
    EditList(ListName),
    StartAdd(ListName),
    RemovalPicker(ListName),
    RemoveAt(ListName, usize),
    ClearList(ListName),
    Roll,
    Back,
    BackToEditor(ListName),
}

impl Action {
    pub fn token(&self) -> String {
        match self {
            Action::ShowMainMenu => "menu".to_string(),
            Action::EditList(list) => format!("edit:{list}"),
            Action::StartAdd(list) => format!("add:{list}"),
            Action::RemovalPicker(list) => format!("remove:{list}"),
            Action::RemoveAt(list, index) => format!("do_remove:{list}:{index}"),
            Action::ClearList(list) => format!("clear:{list}"),
            Action::Roll => "roll".to_string(),
            Action::Back => "back".to_string(),
            Action::BackToEditor(list) => format!("remove_back:{list}"),
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "menu" => return Some(Action::ShowMainMenu),
            "roll" => return Some(Action::Roll),
            "back" => return Some(Action::Back),
            _ => {}
        }

        let (kind, rest) = token.split_once(':')?;
        match kind {
            "edit" => ListName::parse(rest).map(Action::EditList),
            "add" => ListName::parse(rest).map(Action::StartAdd),
            "remove" => ListName::parse(rest).map(Action::RemovalPicker),
            "clear" => ListName::parse(rest).map(Action::ClearList),
            "remove_back" => ListName::parse(rest).map(Action::BackToEditor),
            "do_remove" => {
                let (list, index) = rest.split_once(':')?;
                let list = ListName::parse(list)?;
                let index = index.parse::<usize>().ok()?;
                Some(Action::RemoveAt(list, index))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

/// One selectable choice on a rendered screen: a human-readable label and
/// the opaque token the transport hands back when the choice is taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub action: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action: action.token(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RenderTarget {
    /// Draw a fresh screen.
    New,
    /// Update the previously rendered screen identified by this id in place.
    Update { render_id: RenderId },
}

/// What the external renderer should display: logical text plus an ordered
/// choice set. No platform markup is produced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderInstruction {
    pub target: RenderTarget,
    pub text: String,
    pub choices: Vec<Choice>,
    /// Inbound message the renderer may delete once the screen is drawn.
    /// Best-effort: a failed deletion has no bearing on state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<RenderId>,
}

impl RenderInstruction {
    pub fn new(target: RenderTarget, text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            target,
            text: text.into(),
            choices,
            cleanup: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tokens_round_trip() {
        for action in [
            Action::ShowMainMenu,
            Action::EditList(ListName::A),
            Action::StartAdd(ListName::B),
            Action::RemovalPicker(ListName::A),
            Action::RemoveAt(ListName::B, 17),
            Action::ClearList(ListName::A),
            Action::Roll,
            Action::Back,
            Action::BackToEditor(ListName::B),
        ] {
            assert_eq!(Action::parse(&action.token()), Some(action));
        }
    }

    #[test]
    fn malformed_tokens_do_not_parse() {
        for token in [
            "",
            "nope",
            "edit:",
            "edit:C",
            "do_remove:A",
            "do_remove:A:",
            "do_remove:A:-1",
            "do_remove:A:many",
            "do_remove:Z:0",
        ] {
            assert_eq!(Action::parse(token), None, "token {token:?}");
        }
    }
}
