//! Enrollment command.

use anyhow::Context as _;
use clap::Args;
use facelog_faceid::{Identity, Registration, Role};
use serde::Serialize;

use super::{
    feature_store, get_config, load_vectors, open_backend, output_result, print_info, print_success,
    print_verbose, store_call,
};
use crate::Cli;

/// Enroll a person from embedding samples.
///
/// The samples are averaged into one reference vector. Registering the same
/// name and role again replaces the previous vector.
#[derive(Args)]
pub struct RegisterCommand {
    /// Person's name
    #[arg(long)]
    name: String,

    /// Role: student or teacher
    #[arg(long, default_value = "student")]
    role: String,

    /// Samples file: JSON lines (.jsonl), JSON array (.json), or YAML
    #[arg(short = 'f', long = "file")]
    file: String,

    /// Samples required (overrides config file)
    #[arg(long)]
    min_samples: Option<usize>,
}

#[derive(Serialize)]
struct RegisterResult {
    name: String,
    role: Role,
    samples: usize,
    dim: usize,
}

impl RegisterCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let role: Role = self.role.parse()?;
        let identity = Identity {
            name: self.name.clone(),
            role,
        };

        let mut reg_cfg = cfg.registration();
        if let Some(n) = self.min_samples {
            reg_cfg.min_samples = n;
        }
        let mut reg = Registration::new(reg_cfg);
        for (i, sample) in load_vectors(&self.file)?.iter().enumerate() {
            let n = reg
                .add_sample(sample)
                .with_context(|| format!("sample {}", i + 1))?;
            print_verbose(cli, &format!("Samples: {}/{}", n, reg_cfg.min_samples));
        }
        let samples = reg.sample_count();

        let store = feature_store(&cfg, open_backend(&cfg)?);
        let existing = {
            let (store, identity) = (store.clone(), identity.clone());
            store_call(cfg.store_timeout(), "lookup", move || store.get(&identity)).await?
        };
        if existing.is_some() {
            print_info(&format!("Replacing the existing registration of {identity}."));
        }

        let identity = store_call(cfg.store_timeout(), "register", move || {
            reg.commit(&identity, &store).map(|_| identity)
        })
        .await?;
        print_success(&format!("Successfully registered {}.", identity.name));

        output_result(
            &RegisterResult {
                name: identity.name,
                role,
                samples,
                dim: cfg.dim,
            },
            cli.output.as_deref(),
            cli.json,
        )
    }
}
