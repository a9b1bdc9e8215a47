//! Single-probe matching command.

use clap::Args;
use facelog_faceid::{Matcher, Resolution, Role};
use serde::Serialize;

use super::{feature_store, get_config, load_vectors, open_backend, output_result, store_call};
use crate::Cli;

/// Match probe embeddings against the registered people.
///
/// Nothing is logged; use `run` to take attendance.
#[derive(Args)]
pub struct IdentifyCommand {
    /// Probe file: JSON lines (.jsonl), JSON array (.json), or YAML
    #[arg(short = 'f', long = "file")]
    file: String,

    /// Match threshold (overrides config file)
    #[arg(long)]
    threshold: Option<f32>,
}

#[derive(Serialize)]
struct IdentifyResult {
    known: bool,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    score: f32,
}

impl IdentifyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let store = feature_store(&cfg, open_backend(&cfg)?);
        let gallery = store_call(cfg.store_timeout(), "load", move || store.load()).await?;

        let mut matcher = Matcher::new(cfg.matcher());
        if let Some(t) = self.threshold {
            matcher.set_threshold(t);
        }

        let mut results = Vec::new();
        for probe in load_vectors(&self.file)? {
            let out = matcher.identify(&probe, &gallery)?;
            results.push(IdentifyResult {
                known: out.resolution.is_known(),
                name: out.resolution.to_string(),
                role: match &out.resolution {
                    Resolution::Known(id) => Some(id.role),
                    Resolution::Unknown => None,
                },
                score: out.score,
            });
        }

        output_result(&results, cli.output.as_deref(), cli.json)
    }
}
