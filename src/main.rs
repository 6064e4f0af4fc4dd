use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use deskbook::backend::{Backend, HttpBackend, MemoryBackend};
use deskbook::calendar::{self, render_month};
use deskbook::config::Config;
use deskbook::model::DayStatus;
use deskbook::session::{BookingSession, NO_RESERVATIONS};

#[derive(Parser)]
#[command(name = "deskbook", about = "Browse desk availability and reserve a desk")]
struct Cli {
    /// Reservation service base URL (overrides DESKBOOK_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Use an in-process backend with three sample desks
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List desks
    Desks,
    /// Show a desk's month calendar
    Month {
        desk: u64,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// List a desk's reserved times
    Reservations { desk: u64 },
    /// Show a desk's hourly slots for a date (YYYY-MM-DD)
    Slots { desk: u64, date: String },
    /// Reserve a desk from START to END (HH:00) on DATE
    Reserve {
        desk: u64,
        date: String,
        start: String,
        end: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    deskbook::observability::init(config.metrics_port)?;

    let today = Local::now().date_naive();
    if cli.demo {
        info!("using in-process demo backend");
        run(MemoryBackend::with_sample_desks(), cli.command, today).await
    } else {
        info!("backend: {}", config.backend_url);
        let backend = HttpBackend::new(&config.backend_url, config.timeout)?;
        run(backend, cli.command, today).await
    }
}

async fn run<B: Backend>(
    backend: B,
    command: Command,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BookingSession::new(backend, today);
    let result = execute(&mut session, command).await;
    if let (Err(_), Some(message)) = (&result, session.message()) {
        eprintln!("{message}");
    }
    result
}

async fn execute<B: Backend>(
    session: &mut BookingSession<B>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    session.load_desks().await?;

    match command {
        Command::Desks => {
            for desk in session.desks() {
                let state = if desk.available { "available" } else { "unavailable" };
                println!("{:>4}  {:<16} {state}", desk.id, desk.name);
            }
        }
        Command::Month { desk, year, month } => {
            let today = session.today();
            let this_month = session.select_desk(desk).await?;
            let (year, month) = (year.unwrap_or(today.year()), month.unwrap_or(today.month()));
            let status = if (year, month) == (today.year(), today.month()) {
                this_month
            } else {
                session.view_month(year, month)?
            };
            print!("{}", render_month(year, month, &status, None));
            let legend: Vec<String> = [DayStatus::Free, DayStatus::Partial, DayStatus::Reserved]
                .iter()
                .map(|s| format!("{} {} ({})", calendar::marker(*s), s.as_str(), s.color()))
                .collect();
            println!("{}", legend.join("  "));
        }
        Command::Reservations { desk } => {
            session.select_desk(desk).await?;
            let lines = session.reserved_times()?;
            println!("Reserved Times");
            if lines.is_empty() {
                println!("{NO_RESERVATIONS}");
            }
            for line in lines {
                println!("  {line}");
            }
        }
        Command::Slots { desk, date } => {
            let date = calendar::parse_date(&date)?;
            session.select_desk(desk).await?;
            for slot in session.select_date(date)? {
                let state = if slot.reserved { "reserved" } else { "free" };
                println!("{}  {state}", slot.time);
            }
        }
        Command::Reserve {
            desk,
            date,
            start,
            end,
        } => {
            let date = calendar::parse_date(&date)?;
            session.select_desk(desk).await?;
            session.select_date(date)?;
            session.select_times(&start, &end)?;
            let confirmation = session.submit().await?;
            println!("{}", confirmation.message);
        }
    }
    Ok(())
}
