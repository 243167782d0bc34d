mod entity;
mod user;

pub use entity::{Entity, Record};
pub use user::{
    NewUser, NewUserRow, User, UserChangeset, UserFilter, UserPatch, UserRow, UserStatus, UserType,
};
