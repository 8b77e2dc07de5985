use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use studio::{
    HtmlSandbox, HttpTransport, SessionStatus, Studio, StudioError, SyntectHighlighter,
    TransportError,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "uiforge", about = "Describe a UI component; stream it live with highlighting and a staged preview")]
struct Cli {
    /// Relay server base URL
    #[arg(long, env = "UIFORGE_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Directory where the preview page is staged
    #[arg(long, env = "UIFORGE_PREVIEW_DIR", default_value = "preview")]
    out_dir: PathBuf,

    /// Skip the final ANSI re-render of the generated source
    #[arg(long)]
    no_color: bool,

    /// One-shot prompt; reads prompts interactively when omitted
    prompt: Option<String>,
}

type CliStudio = Studio<SyntectHighlighter, HtmlSandbox>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let transport = HttpTransport::new(&cli.server)?;
    let mut studio = Studio::new(SyntectHighlighter::new(), HtmlSandbox::new(&cli.out_dir));

    if let Some(prompt) = cli.prompt {
        return run_turn(&mut studio, &transport, &prompt, cli.no_color).await;
    }

    // Interactive mode: one generation turn per line, prior turns carried as
    // history so follow-ups like "make it blue" work.
    let stdin = io::stdin();
    loop {
        print!("uiforge> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" || prompt == "quit" {
            return Ok(());
        }
        run_turn(&mut studio, &transport, prompt, cli.no_color).await?;
    }
}

async fn run_turn(
    studio: &mut CliStudio,
    transport: &HttpTransport,
    prompt: &str,
    no_color: bool,
) -> Result<(), CliError> {
    let mut printed = 0usize;
    let outcome = studio
        .submit_with(transport, prompt, |text, _status| {
            // Raw fallback display: stream the delta as it arrives.
            let delta = &text[printed..];
            if !delta.is_empty() {
                print!("{delta}");
                let _ = io::stdout().flush();
                printed = text.len();
            }
        })
        .await;
    println!();

    match outcome {
        Ok(SessionStatus::Complete) => {
            if !no_color {
                if let Some(markup) = studio.display_markup() {
                    println!("{markup}");
                }
            }
            if let Some(path) = studio.sandbox().page_path() {
                println!("preview staged at {}", path.display());
            }
            if let Some(turn) = studio.transcript().last() {
                println!("{}", turn.content);
            }
            Ok(())
        }
        Ok(_) => {
            if let Some(turn) = studio.transcript().last() {
                eprintln!("{}", turn.content);
            }
            Ok(())
        }
        Err(StudioError::Transport(e)) => Err(CliError::Transport(e)),
        Err(e) => {
            eprintln!("{e}");
            Ok(())
        }
    }
}
