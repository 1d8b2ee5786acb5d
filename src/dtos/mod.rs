mod activities;
mod ai;
mod comments;
mod documents;
mod folders;
mod users;

pub use activities::*;
pub use ai::*;
pub use comments::*;
pub use documents::*;
pub use folders::*;
pub use users::*;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
