//! Profile selection and the login, signup and add-dish forms.
//!
//! There is no account backend: a form that validates simply tells the
//! caller which profile's home screen to open next.

use std::fmt;
use std::str::FromStr;

use err_derive::Error;
use serde::{Deserialize, Serialize};

mod forms;

pub use self::forms::{FormError, LoginForm, MenuItemForm, SignupForm, MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Chef,
    Client1,
    Client2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    Client1,
    Client2,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(display = "unknown profile: {:?}", _0)]
pub struct UnknownProfile(pub String);

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Chef, Profile::Client1, Profile::Client2];

    pub fn client_kind(&self) -> Option<ClientKind> {
        match self {
            Profile::Chef => None,
            Profile::Client1 => Some(ClientKind::Client1),
            Profile::Client2 => Some(ClientKind::Client2),
        }
    }

    /// Only the chef edits the menu; clients browse it.
    pub fn can_edit_menu(&self) -> bool {
        *self == Profile::Chef
    }

    fn name(&self) -> &'static str {
        match self {
            Profile::Chef => "chef",
            Profile::Client1 => "client1",
            Profile::Client2 => "client2",
        }
    }
}

impl From<ClientKind> for Profile {
    fn from(kind: ClientKind) -> Self {
        match kind {
            ClientKind::Client1 => Profile::Client1,
            ClientKind::Client2 => Profile::Client2,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = UnknownProfile;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let name = src.trim();
        Profile::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownProfile(src.to_string()))
    }
}
