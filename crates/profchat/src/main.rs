//! `profchat` binary: chat server, terminal client, and one-shot questions.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{AskArgs, Cli, ClientArgs, Command, Overrides, ServeArgs, load_config};
use log::info;
use profchat::config::Secrets;
use profchat::core::{PipelineOptions, RagPipeline, Services};
use profchat::tui::{ChatClient, ChatSession, TuiConfig};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    profchat::init_logging();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;

    match cli.command {
        Command::Serve(args) => serve(&args, &cwd).await,
        Command::Chat(args) => chat(&args, &cwd).await,
        Command::Ask(args) => ask(&args, &cwd).await,
    }
}

async fn serve(args: &ServeArgs, cwd: &Path) -> anyhow::Result<()> {
    let config = load_config(args.config.options(cwd), &Overrides::from(args))?;
    let secrets = Secrets::from_env().context("provider credentials are required to serve")?;
    let services = Services::from_config(&config, &secrets)
        .await
        .context("failed to initialise provider clients")?;
    let options = PipelineOptions::from_config(&config);
    info!(
        "starting server (bind={}, top_k={}, chat_model={})",
        config.server.bind, options.top_k, config.models.chat
    );
    let pipeline = Arc::new(RagPipeline::new(services, options));
    profchat::server::serve(&config.server.bind, pipeline)
        .await
        .context("server stopped")?;
    Ok(())
}

async fn chat(args: &ClientArgs, cwd: &Path) -> anyhow::Result<()> {
    let config = load_config(args.config.options(cwd), &Overrides::from(args))?;
    profchat::tui::run(TuiConfig {
        server_url: config.client.server_url,
    })
    .await
}

async fn ask(args: &AskArgs, cwd: &Path) -> anyhow::Result<()> {
    let config = load_config(
        args.client.config.options(cwd),
        &Overrides::from(&args.client),
    )?;
    let client = ChatClient::new(config.client.server_url).context("failed to build client")?;
    let mut session = ChatSession::new();
    let submission = session.begin_submission(&args.question)?;
    let seq = submission.seq;

    let mut stdout = io::stdout();
    let mut write_error: Option<io::Error> = None;
    let result = client
        .stream_reply(&submission.transcript, |delta| {
            session.apply_delta(seq, delta);
            if write_error.is_none() {
                write_error = write_delta(&mut stdout, delta).err();
            }
        })
        .await;
    if let Some(err) = write_error {
        return Err(err).context("failed to write answer to stdout");
    }
    writeln!(stdout)?;

    result.with_context(|| format!("request to {} failed", client.url()))?;
    session.finish(seq);
    Ok(())
}

/// Write one delta and flush so partial answers show up immediately.
fn write_delta(out: &mut impl Write, delta: &str) -> io::Result<()> {
    out.write_all(delta.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::write_delta;
    use pretty_assertions::assert_eq;
    use std::io::{self, Write};

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn deltas_are_written_in_order() {
        let mut out = Vec::new();
        write_delta(&mut out, "Prof").expect("write");
        write_delta(&mut out, " X").expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "Prof X");
    }

    #[test]
    fn closed_output_reports_the_error() {
        let err = write_delta(&mut ClosedPipe, "Prof").expect_err("closed");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
