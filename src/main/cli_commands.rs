// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use doqq::annotate::{default_output_path, DocAnnotator};
use doqq::cli::{AnnotateArgs, ConfigArgs, CrawlArgs, FunctionsArgs};
use doqq::config::Settings;
use doqq::error::{DoqqError, Result};
use doqq::llm::providers::OllamaTransport;
use doqq::session::{stream_source, ChatSession, CrawlReport};
use doqq::source::ast::{extract_functions, load_ast, render_listing};
use doqq::source::DirectorySource;

/// Prime, stream the library, finalize, then answer questions
pub(super) async fn run_crawl(args: CrawlArgs, settings: &Settings) -> Result<()> {
    let root = args
        .root
        .or_else(|| settings.session.source_root.clone())
        .ok_or_else(|| {
            DoqqError::InvalidInput(
                "no library root given; pass ROOT or set session.source_root".to_string(),
            )
        })?;
    if !root.is_dir() {
        return Err(DoqqError::InvalidInput(format!(
            "library root {} does not exist or is not a directory",
            root.display()
        )));
    }

    // --include replaces the configured patterns
    let mut crawl = settings.crawl.clone();
    if !args.include.is_empty() {
        crawl.include = args.include;
    }
    let source = DirectorySource::from_config(&root, &crawl)?;

    let config = settings.session_config();
    let transport = OllamaTransport::with_timeout(&config.endpoint, settings.request_timeout())?;
    if !transport.health_check().await? {
        tracing::warn!("{} did not answer the model list request", config.endpoint);
    }
    let mut session = ChatSession::new(&config.model, Arc::new(transport));

    eprintln!("Priming {} at {}", session.model_name(), session.endpoint());
    session.prime(&config.prime_instructions).await?;

    eprintln!("Sending {}", root.display());
    let report = stream_source(&mut session, &source).await?;
    print_crawl_report(&report);

    session.finalize(&config.end_signal).await?;
    eprintln!("Library sent, ready for questions");

    if args.query.is_empty() {
        return run_query_loop(&mut session).await;
    }

    for question in &args.query {
        println!("\n{}", question);
        let answer = session.query(question).await?;
        print_response_prefix()?;
        println!("{}", answer);
    }
    Ok(())
}

/// Read questions from stdin until `exit` or end of input
async fn run_query_loop(session: &mut ChatSession) -> Result<()> {
    loop {
        let Some(input) = read_user_input()? else {
            println!();
            break;
        };
        if input.is_empty() {
            continue;
        }
        if is_exit_command(&input) {
            break;
        }

        // A failed query leaves the session as it was, so the loop goes on
        match session.query(&input).await {
            Ok(answer) => {
                print_response_prefix()?;
                println!("{}\n", answer);
            }
            Err(e) => print_error(&e)?,
        }
    }
    Ok(())
}

/// `exit` or `quit`, in any case
fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn print_crawl_report(report: &CrawlReport) {
    eprintln!(
        "Sent {} of {} chunk(s), {} failed",
        report.sent,
        report.attempted(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  skipped {} ({}): {}", failure.name, failure.path, failure.error);
    }
}

/// Document every function of a file
pub(super) async fn run_annotate(args: AnnotateArgs, settings: &Settings) -> Result<()> {
    let transport =
        OllamaTransport::with_timeout(&settings.ollama.endpoint, settings.request_timeout())?;
    let annotator = DocAnnotator::new(&settings.ollama.model, Arc::new(transport))
        .with_language(&settings.annotate.language);

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let annotation = annotator.annotate_file(&args.input, &output).await?;

    println!(
        "Documented {} function(s), {} failed; saved to {}",
        annotation.documented,
        annotation.failed,
        output.display()
    );
    Ok(())
}

/// Print the functions of an AST dump with their source text
pub(super) fn run_functions(args: FunctionsArgs) -> Result<()> {
    let ast = load_ast(&args.ast)?;
    let source = std::fs::read_to_string(&args.source)?;
    let functions = extract_functions(&ast);

    print!("{}", render_listing(&functions, &source));
    Ok(())
}

/// List the models pulled on the Ollama server
pub(super) async fn run_models(settings: &Settings) -> Result<()> {
    let transport =
        OllamaTransport::with_timeout(&settings.ollama.endpoint, settings.request_timeout())?;
    let models = transport.list_local_models().await?;

    if models.is_empty() {
        println!("No models installed. Pull one with: ollama pull {}", settings.ollama.model);
        return Ok(());
    }
    for model in models {
        let marker = if model == settings.ollama.model
            || model.strip_suffix(":latest") == Some(settings.ollama.model.as_str())
        {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, model);
    }
    Ok(())
}

/// Show effective settings, optionally writing defaults first
pub(super) fn run_config(args: ConfigArgs, settings: &Settings, path: &Path) -> Result<()> {
    if args.init {
        if path.exists() {
            println!("Settings already exist at {}", path.display());
        } else {
            Settings::default().save_to(path)?;
            println!("Wrote default settings to {}", path.display());
        }
    }

    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

/// Prompt for a line; `None` at end of input
pub(super) fn read_user_input() -> Result<Option<String>> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Green))?;
    print!("you: ");
    stdout.execute(ResetColor)?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

pub(super) fn print_response_prefix() -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("doqq: ");
    stdout.execute(ResetColor)?;
    stdout.flush()?;
    Ok(())
}

fn print_error(error: &DoqqError) -> Result<()> {
    let mut stderr = io::stderr();
    stderr.execute(SetForegroundColor(Color::Red))?;
    eprint!("error: ");
    stderr.execute(ResetColor)?;
    eprintln!("{}", error);
    Ok(())
}
