// src/main.rs
use std::{fs, io::{self, Read}, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::runtime::{Handle, Runtime};

use feedback_analyzer::config::{Settings, get_user_config_path, save_subject};
use feedback_analyzer::input::{App, handle_key, handle_paste};
use feedback_analyzer::logging::{setup_file_logging, setup_stderr_logging};
use feedback_analyzer::report::render_text_report;
use feedback_analyzer::theme::Theme;
use feedback_analyzer::ui::render;
use feedback_analyzer::{AnalysisClient, AnalysisSession, Subject};

/// Student feedback analyzer: paste comments, pick a subject, get the analysis back
#[derive(Debug, Parser)]
#[command(name = "fba", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Origin of the analysis service
    #[arg(long, global = true, env = "API_BASE")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit comments once and print the analysis
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// "Artificial Intelligence" (ai) or "Optimization Techniques" (ot)
    #[arg(short, long)]
    subject: Option<Subject>,

    /// File with one comment per line; `-` or omitted reads stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the raw result JSON instead of a text report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.api_base.clone())?;

    match cli.command {
        Some(Commands::Analyze(args)) => {
            setup_stderr_logging(cli.verbose);
            run_analyze(args, &settings)
        }
        None => {
            setup_file_logging(cli.verbose, &settings.log_path())?;
            run_tui(&settings)
        }
    }
}

fn read_comments(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Ok(fs::read_to_string(expanded)?)
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run_analyze(args: AnalyzeArgs, settings: &Settings) -> anyhow::Result<()> {
    let subject = args.subject.unwrap_or_else(|| settings.default_subject());
    let comments = read_comments(args.file.as_ref())?;

    let client = AnalysisClient::new(&settings.api_base, settings.timeout())?;
    let mut session = AnalysisSession::new(subject);
    session.set_comments_text(comments);

    let rt = Runtime::new()?;
    match rt.block_on(session.submit(&client)) {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_text_report(subject, &result, client.api_base()));
            }
            if settings.remember_subject {
                if let Err(e) = save_subject(subject) {
                    tracing::warn!("Could not remember subject: {}", e);
                }
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Request failed: {}", err.user_message());
            std::process::exit(1);
        }
    }
}

fn run_tui(settings: &Settings) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let client = AnalysisClient::new(&settings.api_base, settings.timeout())?;
    let subject_store = settings.remember_subject.then(get_user_config_path);
    let mut app = App::new(AnalysisSession::new(settings.default_subject()), client, subject_store);
    let theme = Theme::default();

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let outcome = event_loop(&mut terminal, &mut app, &theme, rt.handle());

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, theme: &Theme, rt: &Handle) -> anyhow::Result<()> {
    loop {
        app.poll_pending();
        terminal.draw(|f| render(f, app, theme))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key, rt),
                Event::Paste(text) => handle_paste(app, &text),
                _ => {}
            }
        }
    }
    Ok(())
}
