mod activities;
mod ai;
mod collab;
mod comments;
mod documents;
mod folders;
mod health;
mod users;

pub use activities::*;
pub use ai::*;
pub use collab::*;
pub use comments::*;
pub use documents::*;
pub use folders::*;
pub use health::*;
pub use users::*;
