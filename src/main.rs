use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use clientcard::config::AppConfig;
use clientcard::core::client::ClientForm;
use clientcard::core::date::{self, parse_date, parse_optional_date, parse_time};
use clientcard::directory::SaveOutcome;
use clientcard::session::{DeleteOutcome, Session, TaskChange};
use clientcard::store::FileStore;
use clientcard::view;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "clientcard", version, about = "Client records, plans, deadlines and task checklists")]
struct Cli {
    /// Config file (default: the user config directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Machine-readable JSON output.
    #[arg(long, global = true)]
    json: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every client.
    List,

    /// Find a client by exact code, or by part of its name.
    Search { query: String },

    /// Create a client, or update the one with this code.
    Save {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// Start date (YYYY-MM-DD) for the deadline countdown; omit to keep
        /// the stored one, pass "" to clear it.
        #[arg(long)]
        start: Option<String>,
        /// Selected plan (repeatable).
        #[arg(long = "plan")]
        plans: Vec<String>,
        /// Extra field as key=value (repeatable).
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },

    /// Delete a client and its tasks.
    Delete { query: String },

    /// Show a client's task checklist.
    Tasks { query: String },

    /// Add, toggle or delete a task.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Tasks due today or overdue, across all clients.
    Reminders,

    /// A client's tasks grouped as overdue, pending and completed.
    Summary { query: String },

    /// Days left until the client's deadline.
    Countdown { query: String },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add {
        query: String,
        description: String,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<String>,
        /// Due time (HH:MM).
        #[arg(long)]
        time: Option<String>,
    },
    Toggle {
        query: String,
        /// 1-based position in the list.
        position: usize,
    },
    Delete {
        query: String,
        /// 1-based position in the list.
        position: usize,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn init_logging(debug: bool) {
    // Journal logger (`journalctl --user -t clientcard -f`): this crate at
    // info/debug, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("clientcard") {
                let max = if clientcard::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    clientcard::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("clientcard".to_string()),
        // No journal socket (containers, non-systemd hosts): run without a logger.
        Err(_) => return,
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn confirm_on_stdin(assume_yes: bool) -> impl FnMut(&str) -> bool {
    move |prompt: &str| {
        if assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Select the client matching `query`, or fail with a not-found message.
fn select(session: &mut Session<FileStore>, query: &str) -> CliResult<()> {
    if session.search_and_select(query).is_none() {
        return Err(format!("Client not found for search: \"{}\"", query).into());
    }
    Ok(())
}

fn print_tasks(session: &Session<FileStore>, json: bool) -> CliResult<()> {
    let rows = session.task_rows(date::today_date());
    if json {
        return print_json(&rows);
    }
    println!("{}", view::client_header(session.selected_client()));
    if rows.is_empty() {
        println!("  (no tasks)");
    }
    for row in rows {
        println!("{}", row.line());
    }
    Ok(())
}

fn run(cli: Cli, mut session: Session<FileStore>) -> CliResult<()> {
    let today = date::today_date();
    let mut confirm = confirm_on_stdin(cli.yes);

    match cli.command {
        Commands::List => {
            if cli.json {
                return print_json(&session.directory().clients());
            }
            if session.directory().is_empty() {
                println!("No clients registered.");
            }
            for client in session.directory().clients() {
                println!("{}\t{}\t{} tasks", client.code, client.name, client.tasks.len());
            }
        }
        Commands::Search { query } => {
            if session.search_and_select(&query).is_none() {
                println!(
                    "Client not found for search: \"{}\". {}",
                    query,
                    view::client_header(None)
                );
                return Ok(());
            }
            if let Some(client) = session.selected_client() {
                if cli.json {
                    return print_json(client);
                }
                print!("{}", view::client_details(client));
                println!("  Countdown: {}", view::countdown_text(&session.countdown(today)));
            }
            for row in session.task_rows(today) {
                println!("{}", row.line());
            }
        }
        Commands::Save { code, name, start, plans, fields } => {
            let form = ClientForm {
                code,
                name,
                start_date: start.as_deref().map(parse_optional_date).transpose()?,
                plans: plans.into_iter().collect(),
                fields: fields.into_iter().collect(),
            };
            let outcome = session.save_form(&form)?;
            let verb = match outcome {
                SaveOutcome::Created => "registered",
                SaveOutcome::Updated => "updated",
            };
            println!("Client {} - {} {} successfully.", form.code.trim(), form.name.trim(), verb);
        }
        Commands::Delete { query } => {
            select(&mut session, &query)?;
            match session.delete_selected(&mut confirm)? {
                DeleteOutcome::Deleted(c) => println!("Client {} - {} deleted.", c.code, c.name),
                DeleteOutcome::Declined => println!("Nothing deleted."),
                DeleteOutcome::NothingLoaded => println!("No client loaded."),
            }
        }
        Commands::Tasks { query } => {
            select(&mut session, &query)?;
            print_tasks(&session, cli.json)?;
        }
        Commands::Task(command) => {
            let change = match command {
                TaskCommand::Add { query, description, due, time } => {
                    select(&mut session, &query)?;
                    let due = due.as_deref().map(parse_date).transpose()?;
                    let time = match time.as_deref() {
                        Some(raw) => Some(parse_time(raw).ok_or_else(|| format!("invalid time '{}', expected HH:MM", raw))?),
                        None => None,
                    };
                    session.add_task(&description, due, time)?
                }
                TaskCommand::Toggle { query, position } => {
                    select(&mut session, &query)?;
                    match position.checked_sub(1) {
                        Some(p) => session.toggle_task(p)?,
                        None => TaskChange::Ignored,
                    }
                }
                TaskCommand::Delete { query, position } => {
                    select(&mut session, &query)?;
                    match position.checked_sub(1) {
                        Some(p) => session.delete_task(p, &mut confirm)?,
                        None => TaskChange::Ignored,
                    }
                }
            };
            match change {
                TaskChange::Ignored => println!("Nothing changed."),
                TaskChange::Declined => println!("Nothing deleted."),
                _ => {}
            }
            print_tasks(&session, cli.json)?;
        }
        Commands::Reminders => {
            let reminders = session.daily_reminders(today);
            if cli.json {
                return print_json(&reminders);
            }
            print!("{}", view::reminders_text(&reminders));
        }
        Commands::Summary { query } => {
            select(&mut session, &query)?;
            let code = session
                .selected_client()
                .map(|c| c.code.clone())
                .unwrap_or_default();
            if let Some(summary) = session.task_summary(&code, today) {
                if cli.json {
                    return print_json(&summary);
                }
                println!("{}", view::client_header(session.selected_client()));
                print!("{}", view::summary_text(&summary));
            }
        }
        Commands::Countdown { query } => {
            select(&mut session, &query)?;
            let countdown = session.countdown(today);
            if cli.json {
                return print_json(&countdown);
            }
            println!("{}", view::countdown_text(&countdown));
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);
    init_logging(config.debug_logging);

    if let Err(e) = config.ensure_data_dir() {
        log::error!("Failed to create data directory: {}", e);
    }
    let backend = FileStore::new(config.data_directory.clone());
    let session = Session::open(config, backend);

    if let Err(e) = run(cli, session) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
