mod billing;
mod config;
mod export;
mod ledger;
mod models;
mod remote;
mod storage;
mod ui;
mod words;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::billing::{format_inr, row_total};
use crate::config::Config;
use crate::export::{write_export, ExportFormat};
use crate::ledger::LedgerStore;
use crate::remote::{PgMirror, RemoteMirror};
use crate::storage::{FileStore, LedgerStorage};
use crate::ui::{
    date_picker::{handle_input as handle_date_picker_input, render_date_picker, DatePickerAction, DatePickerState},
    ledger::{handle_input as handle_ledger_input, render_ledger, LedgerAction, LedgerState},
    row_editor::{handle_input as handle_row_editor_input, render_row_editor, RowEditorAction, RowEditorState},
};
use crate::words::amount_in_words;

#[derive(Parser)]
#[command(name = "clinic-ledger", version, about = "Daily OPD ledger for a clinic")]
struct Cli {
    /// Ledger date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
    /// Overrides LEDGER_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Overrides LEDGER_EXPORT_DIR
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive ledger
    Tui,
    /// Write the day's ledger to the export directory
    Export {
        #[arg(long, value_enum, default_value_t = ExportChoice::Both)]
        format: ExportChoice,
    },
    /// Print the day's rows and total
    Summary,
    /// Append the demonstration patients to the day
    Seed,
    /// Print an amount in Indian-English words
    Words {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportChoice {
    Csv,
    Xlsx,
    Both,
}

impl ExportChoice {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            ExportChoice::Csv => &[ExportFormat::Csv],
            ExportChoice::Xlsx => &[ExportFormat::Xlsx],
            ExportChoice::Both => &[ExportFormat::Csv, ExportFormat::Xlsx],
        }
    }
}

// Represents the current screen in the app
enum AppScreen {
    Ledger,
    RowEditor,
    DatePicker,
}

// Main application state
struct AppState {
    store: LedgerStore,
    export_dir: PathBuf,
    screen: AppScreen,
    ledger_state: LedgerState,
    row_editor_state: Option<RowEditorState>,
    date_picker_state: Option<DatePickerState>,
}

impl AppState {
    fn new(store: LedgerStore, export_dir: PathBuf) -> Self {
        Self {
            store,
            export_dir,
            screen: AppScreen::Ledger,
            ledger_state: LedgerState::new(),
            row_editor_state: None,
            date_picker_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Words { amount }) = cli.command {
        println!("{}", format_inr(amount));
        println!("{}", amount_in_words(amount));
        return Ok(());
    }

    // Load configuration
    let mut config = config::init()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }

    init_logging(&config)?;

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let mut store = open_store(&config, date).await?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => return run_tui(store, config.export_dir).await,
        Command::Export { format } => {
            for format in format.formats() {
                let path = write_export(&config.export_dir, *format, store.date(), store.rows())?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Summary => print_summary(&store),
        Command::Seed => {
            let count = store.add_sample_patients()?;
            println!("Added {} sample patients to {}", count, store.date());
        }
        Command::Words { .. } => {}
    }

    // Give in-flight mirror calls a chance to land before exiting
    if tokio::time::timeout(Duration::from_secs(5), store.settle()).await.is_err() {
        warn!("exiting with remote calls still pending");
    }

    Ok(())
}

/// Sends tracing output to a file next to the ledger data; the terminal
/// belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let log_path = config.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

async fn open_store(config: &Config, date: NaiveDate) -> Result<LedgerStore> {
    let files = FileStore::new(&config.data_dir)?;
    info!(dir = %files.dir().display(), "using local storage");

    let mirror: Option<Arc<dyn RemoteMirror>> = match config.remote() {
        Some(remote) => {
            info!("remote mirror configured");
            let mirror: Arc<dyn RemoteMirror> = Arc::new(PgMirror::connect(&remote)?);
            Some(mirror)
        }
        None => {
            info!("running in local-only mode");
            None
        }
    };

    Ok(LedgerStore::open(LedgerStorage::new(files), mirror, date).await)
}

fn print_summary(store: &LedgerStore) {
    println!("OPD Ledger {} ({})", store.date(), store.sync_status().label());
    for (i, row) in store.rows().iter().enumerate() {
        let name = if row.has_name() { row.name.as_str() } else { "(unnamed)" };
        println!("{:>3}. {:<30} {:>12}", i + 1, name, format_inr(row_total(row)));
    }
    let total = store.daily_total();
    println!("Daily Total: {}", format_inr(total));
    println!("In Words: {}", amount_in_words(total));
    if let Some(error) = store.last_error() {
        println!("Warning: {}", error);
    }
}

async fn run_tui(store: LedgerStore, export_dir: PathBuf) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new(store, export_dir);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = &result {
        println!("Error: {}", err);
    }

    if tokio::time::timeout(Duration::from_secs(5), app_state.store.settle()).await.is_err() {
        warn!("exiting with remote calls still pending");
    }

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        app_state.store.apply_pending_events();

        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Ledger => render_ledger(f, &mut app_state.ledger_state, &app_state.store),
            AppScreen::RowEditor => {
                if let Some(state) = &mut app_state.row_editor_state {
                    render_row_editor(f, state);
                }
            }
            AppScreen::DatePicker => {
                if let Some(state) = &mut app_state.date_picker_state {
                    render_date_picker(f, state);
                }
            }
        })?;

        // Redraw regularly so sync reports show up without a key press
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Ledger => handle_ledger_screen(app_state).await?,
            AppScreen::RowEditor => handle_row_editor_screen(app_state)?,
            AppScreen::DatePicker => handle_date_picker_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_ledger_screen(app_state: &mut AppState) -> Result<bool> {
    let store = &mut app_state.store;
    let state = &mut app_state.ledger_state;

    match handle_ledger_input(state, store)? {
        Some(LedgerAction::Quit) => {
            return Ok(true);
        }
        Some(LedgerAction::AddRow) => {
            // Store errors are already shown in the status line
            let _ = store.add_row();
            state.select_last(store.rows().len());
        }
        Some(LedgerAction::EditRow(id)) => {
            let position = store.rows().iter().position(|r| r.id == id);
            if let Some(i) = position {
                let row = store.rows()[i].clone();
                app_state.row_editor_state = Some(RowEditorState::new(i + 1, row));
                app_state.screen = AppScreen::RowEditor;
            }
        }
        Some(LedgerAction::DeleteRow(id)) => {
            let _ = store.remove_row(id);
            state.clamp(store.rows().len());
        }
        Some(LedgerAction::ClearDay) => {
            if store.clear_day().is_ok() {
                state.set_message("Cleared all records for this day");
            }
            state.clamp(store.rows().len());
        }
        Some(LedgerAction::Export) => {
            for format in ExportChoice::Both.formats() {
                match write_export(&app_state.export_dir, *format, store.date(), store.rows()) {
                    Ok(path) => state.set_message(format!("Exported {}", path.display())),
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        state.set_message(format!("Export failed: {}", e));
                        break;
                    }
                }
            }
        }
        Some(LedgerAction::PickDate) => {
            app_state.date_picker_state = Some(DatePickerState::new(store.date()));
            app_state.screen = AppScreen::DatePicker;
        }
        Some(LedgerAction::Reload) => {
            let date = store.date();
            store.load(date).await;
            state.clamp(store.rows().len());
        }
        Some(LedgerAction::DismissError) => {
            store.dismiss_error();
        }
        Some(LedgerAction::AddSamples) => {
            if let Ok(count) = store.add_sample_patients() {
                state.set_message(format!("Added {} sample patients", count));
            }
            state.select_last(store.rows().len());
        }
        None => {}
    }

    Ok(false)
}

fn handle_row_editor_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.row_editor_state {
        match handle_row_editor_input(state)? {
            Some(RowEditorAction::Cancel) => {
                app_state.row_editor_state = None;
                app_state.screen = AppScreen::Ledger;
            }
            Some(RowEditorAction::Save(id, patch)) => {
                if app_state.store.update_row(id, patch).is_ok() {
                    app_state.ledger_state.set_message("Saved");
                }
                app_state.row_editor_state = None;
                app_state.screen = AppScreen::Ledger;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_date_picker_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.date_picker_state {
        match handle_date_picker_input(state)? {
            Some(DatePickerAction::Cancel) => {
                app_state.date_picker_state = None;
                app_state.screen = AppScreen::Ledger;
            }
            Some(DatePickerAction::Select(date)) => {
                app_state.store.load(date).await;
                app_state.ledger_state = LedgerState::new();
                app_state.date_picker_state = None;
                app_state.screen = AppScreen::Ledger;
            }
            None => {}
        }
    }

    Ok(false)
}
