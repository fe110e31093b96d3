//! Domain entities - core business objects

mod channel;
mod invite;
mod membership;
mod message;
mod server;
mod user;

pub use channel::{Channel, ChannelKind, NewChannel};
pub use invite::{generate_invite_code, Invite};
pub use membership::{Member, Membership};
pub use message::{Message, NewMessage};
pub use server::{NewServer, Server, ServerDeletion, ServerUpdate};
pub use user::{NewUser, PresenceStatus, ProfileUpdate, User, UserDeletion};
