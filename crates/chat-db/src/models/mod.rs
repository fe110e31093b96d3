//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod invite;
mod membership;
mod message;
mod server;
mod user;

pub use channel::ChannelModel;
pub use invite::InviteModel;
pub use membership::{MemberModel, MembershipModel};
pub use message::MessageModel;
pub use server::ServerModel;
pub use user::UserModel;
