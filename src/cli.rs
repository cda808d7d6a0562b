use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "polla")]
#[command(author = "La Polla Team")]
#[command(version = "0.1.0")]
#[command(about = "AI match predictions service for La Polla Virtual", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and environment overrides
    #[arg(short, long, default_value = "config", env = "POLLA_CONFIG_DIR")]
    pub config_dir: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the teams-assigned listener (default)
    Serve {
        /// Apply database migrations before serving
        #[arg(long)]
        migrate: bool,
    },
    /// Apply database migrations and exit
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_migrate() {
        let cli = Cli::try_parse_from(["polla", "serve", "--migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { migrate: true })));
        assert_eq!(cli.config_dir, "config");
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["polla", "--config-dir", "/etc/polla"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_dir, "/etc/polla");
    }
}
