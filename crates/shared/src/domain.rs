use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(RenderId);

/// The fixed set of named word lists a user owns. A roll draws one word
/// from each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListName {
    A,
    B,
}

impl ListName {
    pub const ALL: [ListName; 2] = [ListName::A, ListName::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListName::A => "A",
            ListName::B => "B",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(ListName::A),
            "B" => Some(ListName::B),
            _ => None,
        }
    }
}

impl std::fmt::Display for ListName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
