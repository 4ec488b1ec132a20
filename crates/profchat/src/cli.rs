//! Command-line options and config resolution for the `profchat` binary.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use profchat::config::{LayeredConfigOptions, ProfchatConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "profchat", version, about = "Professor review assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the streaming chat server
    Serve(ServeArgs),
    /// Open the terminal chat client
    Chat(ClientArgs),
    /// Ask a single question and print the streamed answer
    Ask(AskArgs),
}

/// Config files shared by every subcommand.
#[derive(Debug, Args, Default)]
pub struct ConfigArgs {
    /// Extra profchat.json5 layers applied last, in order
    #[arg(long = "config")]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Address to bind, e.g. 0.0.0.0:3000
    #[arg(long)]
    pub bind: Option<String>,
    /// Nearest neighbours requested per question
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Full URL of the chat endpoint
    #[arg(long)]
    pub server_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    #[command(flatten)]
    pub client: ClientArgs,
    /// Question to send
    pub question: String,
}

/// Flag values that take precedence over every config layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub bind: Option<String>,
    pub top_k: Option<usize>,
    pub server_url: Option<String>,
}

impl From<&ServeArgs> for Overrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            bind: args.bind.clone(),
            top_k: args.top_k,
            server_url: None,
        }
    }
}

impl From<&ClientArgs> for Overrides {
    fn from(args: &ClientArgs) -> Self {
        Self {
            server_url: args.server_url.clone(),
            ..Self::default()
        }
    }
}

impl ConfigArgs {
    /// Default layer locations for `cwd` plus the `--config` paths.
    pub fn options(&self, cwd: &Path) -> LayeredConfigOptions {
        self.paths
            .iter()
            .fold(LayeredConfigOptions::new(cwd), |options, path| {
                options.with_runtime_path(path)
            })
    }
}

/// Load the layered config, apply flag overrides, and re-validate.
pub fn load_config(
    options: LayeredConfigOptions,
    overrides: &Overrides,
) -> anyhow::Result<ProfchatConfig> {
    info!("loading layered config (cwd={})", options.cwd.display());
    let layered = ProfchatConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    let mut config = layered.config;
    if let Some(bind) = overrides.bind.clone() {
        config.server.bind = bind;
    }
    if let Some(top_k) = overrides.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(server_url) = overrides.server_url.clone() {
        config.client.server_url = server_url;
    }
    config.validate().context("invalid command-line override")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, Overrides, load_config};
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use profchat::config::LayeredConfigOptions;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "profchat", "serve", "--bind", "0.0.0.0:8080", "--top-k", "3", "--config", "a.json5",
            "--config", "b.json5",
        ])
        .expect("parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(args.top_k, Some(3));
        assert_eq!(args.config.paths.len(), 2);
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["profchat", "ask"]).is_err());
        let cli = Cli::try_parse_from(["profchat", "ask", "who teaches biology?"]).expect("parse");
        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.question, "who teaches biology?");
    }

    #[test]
    fn flags_override_config_layers() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("profchat.json5"),
            "{ server: { bind: '127.0.0.1:4000' }, retrieval: { top_k: 8 } }",
        )
        .expect("write");
        let options = LayeredConfigOptions::new(dir.path()).with_user_path(None);

        let config = load_config(
            options,
            &Overrides {
                top_k: Some(2),
                server_url: Some("http://example.test/api/chat".to_string()),
                ..Overrides::default()
            },
        )
        .expect("config");

        assert_eq!(config.server.bind, "127.0.0.1:4000");
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.client.server_url, "http://example.test/api/chat");
    }

    #[test]
    fn zero_top_k_flag_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let options = LayeredConfigOptions::new(dir.path()).with_user_path(None);
        let err = load_config(
            options,
            &Overrides {
                top_k: Some(0),
                ..Overrides::default()
            },
        )
        .expect_err("invalid");
        assert!(format!("{err:#}").contains("top_k"));
    }
}
