//! Registration listing command.

use clap::Args;
use facelog_faceid::Role;
use serde::Serialize;

use super::{feature_store, get_config, open_backend, output_result, print_warning, store_call};
use crate::Cli;

/// List registered people.
#[derive(Args)]
pub struct UsersCommand {}

#[derive(Serialize)]
struct UserEntry {
    name: String,
    role: Role,
    norm: f32,
}

impl UsersCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let store = feature_store(&cfg, open_backend(&cfg)?);
        let entries = store_call(cfg.store_timeout(), "list", move || store.list()).await?;

        let mut users = Vec::new();
        for entry in entries {
            match entry {
                Ok(r) => users.push(UserEntry {
                    norm: r.vector.iter().map(|x| x * x).sum::<f32>().sqrt(),
                    name: r.identity.name,
                    role: r.identity.role,
                }),
                Err(e) => print_warning(&e.to_string()),
            }
        }

        output_result(&users, cli.output.as_deref(), cli.json)
    }
}
