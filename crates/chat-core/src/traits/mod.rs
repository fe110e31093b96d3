//! Ports implemented by the infrastructure layer

mod ids;
mod repositories;

pub use ids::IdGenerator;
pub use repositories::{
    ChannelRepository, InviteRepository, MembershipRepository, MessageRepository, RepoResult,
    ServerRepository, UserRepository, MAX_PAGE_SIZE,
};
