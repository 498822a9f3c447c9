//! Services layer for Bogga
//!
//! Business logic between the routes and the store. Each service owns an
//! `Arc<TaskDb>` and runs every multi-statement mutation in one transaction.
//!
//! ## Services
//!
//! - **AccountService**: setup status, first-run setup, PIN login
//! - **ListService**: owner list CRUD, share link minting and resolution
//! - **TaskService**: task reads, creation, patching with recurrence spawn,
//!   soft-delete, restore and purge

pub mod account;
pub mod lists;
pub mod tasks;

pub use account::{AccountService, Session};
pub use lists::{CreateListRequest, ListService, ResolvedShare};
pub use tasks::{ListContent, PatchOutcome, SharedListContent, TaskService};
