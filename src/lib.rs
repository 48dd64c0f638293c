// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod linear;
pub mod output;
pub mod time_expr;
pub mod types;
pub(crate) mod util;
