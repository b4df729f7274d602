//! Command dispatch: bridges CLI args -> provider calls -> output formatting.

pub mod commits;
pub mod entity;
pub mod token;

use placeos_core::{Driver, Kind, Module, Provider, Repository, Setting, System, Zone};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Bind the concrete entity type for a runtime `Kind` and evaluate `$body`.
macro_rules! for_kind {
    ($kind:expr, $k:ident => $body:expr) => {
        match $kind {
            Kind::Repository => {
                type $k = Repository;
                $body
            }
            Kind::Driver => {
                type $k = Driver;
                $body
            }
            Kind::Module => {
                type $k = Module;
                $body
            }
            Kind::Zone => {
                type $k = Zone;
                $body
            }
            Kind::System => {
                type $k = System;
                $body
            }
            Kind::Setting => {
                type $k = Setting;
                $body
            }
        }
    };
}

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    provider: &Provider,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Token => token::handle(provider, global).await,
        Command::Get { kind, id } => {
            for_kind!(kind, K => entity::get::<K>(provider, &id, global).await)
        }
        Command::List { kind } => for_kind!(kind, K => entity::list::<K>(provider, global).await),
        Command::Apply(args) => {
            for_kind!(args.kind, K => entity::apply::<K>(provider, &args, global).await)
        }
        Command::Delete { kind, id } => {
            for_kind!(kind, K => entity::delete::<K>(provider, &id, global).await)
        }
        Command::Commits(args) => commits::handle(provider, &args, global).await,
        // Completions is handled before dispatch
        Command::Completions { .. } => unreachable!(),
    }
}
