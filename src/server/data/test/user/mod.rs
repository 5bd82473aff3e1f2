use crate::server::data::user::{CreateUserParams, UserRepository};
use entity::user::UserRole;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod find_by_phone;
