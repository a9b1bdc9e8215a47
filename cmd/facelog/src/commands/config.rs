//! Configuration commands.

use clap::{Args, Subcommand};

use super::{get_config, output_result, print_info, print_success};
use crate::Cli;

/// Show or initialize configuration.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        match &self.command {
            ConfigSubcommand::Show => {
                print_info(&format!("config file: {}", cfg.path().display()));
                print_info(&format!("database: {}", cfg.db_path().display()));
                output_result(&cfg, cli.output.as_deref(), cli.json)
            }
            ConfigSubcommand::Init { force } => {
                if cfg.path().exists() && !force {
                    anyhow::bail!("{} already exists, use --force to overwrite", cfg.path().display());
                }
                cfg.save()?;
                print_success(&format!("wrote {}", cfg.path().display()));
                Ok(())
            }
        }
    }
}
