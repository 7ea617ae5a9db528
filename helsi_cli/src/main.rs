use clap::{Parser, Subcommand};
use helsi_core::logging::Verbosity;
use helsi_core::*;
use std::io;
use std::path::PathBuf;

mod serve;

#[derive(Parser)]
#[command(name = "helsi")]
#[command(about = "Strength training log and progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Planned workouts file (defaults to <data-dir>/workouts.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive main menu (default)
    Menu,

    /// Log a planned workout
    Log {
        /// Planned session to log; asks when omitted
        #[arg(long)]
        session: Option<String>,
    },

    /// Show the progression summary
    Progress {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show logged workouts
    History {
        /// Only sessions with this name
        #[arg(long)]
        name: Option<String>,

        /// Only sessions from the last N days
        #[arg(long)]
        days: Option<i64>,
    },

    /// List the planned workouts
    Catalog,

    /// Export logged sets as CSV
    Export {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Serve the catalog and history over HTTP
    Serve {
        #[arg(long)]
        bind: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

/// Resolved file locations
struct Paths {
    catalog: PathBuf,
    history: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = match (&cli.command, cli.verbose) {
        (_, true) => Verbosity::Debug,
        (Some(Commands::Serve { .. }), false) => Verbosity::Server,
        _ => Verbosity::Quiet,
    };
    helsi_core::logging::init(verbosity);

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(catalog) = cli.catalog {
        config.data.catalog_file = Some(catalog);
    }
    let paths = Paths {
        catalog: config.data.catalog_path(),
        history: config.data.history_path(),
    };

    match cli.command {
        Some(Commands::Log { session }) => {
            let mut input = stdin_input();
            match cmd_log(&paths, &config, session.as_deref(), &mut input) {
                Err(Error::InputAborted) => Ok(()),
                other => other,
            }
        }
        Some(Commands::Progress { json }) => cmd_progress(&paths, &config, json),
        Some(Commands::History { name, days }) => cmd_history(&paths, name.as_deref(), days),
        Some(Commands::Catalog) => cmd_catalog(&paths),
        Some(Commands::Export { out }) => cmd_export(&paths, out),
        Some(Commands::Serve { bind, port }) => cmd_serve(&paths, &config, bind, port),
        Some(Commands::Menu) | None => {
            let mut input = stdin_input();
            cmd_menu(&paths, &config, &mut input)
        }
    }
}

fn stdin_input() -> LineInput<io::StdinLock<'static>, io::Stdout> {
    LineInput::new(io::stdin().lock(), io::stdout())
}

fn load_valid_catalog(paths: &Paths) -> Result<Catalog> {
    let catalog = load_catalog(&paths.catalog)?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn cmd_menu(paths: &Paths, config: &Config, input: &mut dyn InputSource) -> Result<()> {
    const OPTIONS: [&str; 4] = [
        "Log new workout",
        "Show progression",
        "View logged workouts",
        "Quit",
    ];

    // Fail early: the menu is useless without a catalog
    load_valid_catalog(paths)?;

    loop {
        let choice = {
            let mut collector = SetCollector::new(input, RetryPolicy::Unbounded);
            match collector.choose("Welcome to Helsi! What would you like to do?", &OPTIONS) {
                Ok(choice) => choice,
                Err(Error::InputAborted) => break,
                Err(e) => return Err(e),
            }
        };

        let result = match choice {
            0 => cmd_log(paths, config, None, input),
            1 => cmd_progress(paths, config, false),
            2 => cmd_history(paths, None, None),
            _ => break,
        };

        match result {
            Ok(()) => {}
            Err(Error::InputAborted) => break,
            // Persistence problems are reported, the menu keeps running
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("Exiting program.");
    Ok(())
}

fn cmd_log(
    paths: &Paths,
    config: &Config,
    session_name: Option<&str>,
    input: &mut dyn InputSource,
) -> Result<()> {
    const BACK: &str = "Return to main menu";

    let catalog = load_valid_catalog(paths)?;
    let table = EquivalenceTable::from_config(&config.exclusions);
    let policy = RetryPolicy::from_max_attempts(config.input.max_attempts);
    let mut collector = SetCollector::new(input, policy);

    let planned = match session_name {
        Some(name) => catalog
            .find(name)
            .ok_or_else(|| Error::Config(format!("No planned workout named '{}'", name)))?,
        None => {
            let mut options = catalog.names();
            options.push(BACK);
            let picked = collector.choose("Choose your workout or go back:", &options)?;
            if options[picked] == BACK {
                return Ok(());
            }
            &catalog.sessions[picked]
        }
    };

    let session = match complete_session(planned, &table, &mut collector, chrono::Utc::now()) {
        Ok(session) => session,
        Err(Error::InputAborted) => {
            println!("\nLogging cancelled, nothing was saved.");
            return Err(Error::InputAborted);
        }
        Err(e) => return Err(e),
    };

    let store = JsonFileStore::new(&paths.history);
    match store.append(session) {
        Ok(count) => {
            println!("\n✓ Workout logged! ({} in history)", count);
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to save workout: {}", e);
            Err(e)
        }
    }
}

fn cmd_progress(paths: &Paths, config: &Config, json: bool) -> Result<()> {
    let store = JsonFileStore::new(&paths.history);
    let history = store.load_or_empty();
    let report = compute_progression(&history, chrono::Utc::now(), &config.progression);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_progression(&report, config.progression.top_n);
    Ok(())
}

fn cmd_history(paths: &Paths, name: Option<&str>, days: Option<i64>) -> Result<()> {
    let store = JsonFileStore::new(&paths.history);
    let history = store.load_or_empty();

    let mut sessions: Vec<&Session> = match days {
        Some(days) => helsi_core::history::sessions_within(&history, chrono::Utc::now(), days),
        None => history.iter().collect(),
    };
    if let Some(name) = name {
        let named = helsi_core::history::sessions_named(&history, name);
        sessions.retain(|s| named.iter().any(|n| std::ptr::eq(*n, *s)));
    }

    if sessions.is_empty() {
        println!("No workouts have been logged yet.");
        return Ok(());
    }

    for session in sessions {
        display_session(session);
    }
    Ok(())
}

fn cmd_catalog(paths: &Paths) -> Result<()> {
    let catalog = load_valid_catalog(paths)?;

    for session in &catalog.sessions {
        println!("\n{}", session.name);
        for exercise in &session.exercises {
            print!(
                "  - {}: {} sets, rest {}",
                exercise.name, exercise.planned_sets, exercise.rest
            );
            if let Some(ref partner) = exercise.superset_with {
                print!(" (superset with {})", partner);
            }
            println!();
        }
    }
    Ok(())
}

fn cmd_export(paths: &Paths, out: Option<PathBuf>) -> Result<()> {
    let store = JsonFileStore::new(&paths.history);
    let history = store.load()?;

    match out {
        Some(path) => {
            let count = export_csv(&history, &path)?;
            eprintln!("✓ Exported {} sets to {}", count, path.display());
        }
        None => {
            helsi_core::export::write_csv(&history, io::stdout().lock())?;
        }
    }
    Ok(())
}

fn cmd_serve(
    paths: &Paths,
    config: &Config,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let catalog = load_valid_catalog(paths)?;
    let state = serve::AppState::new(
        catalog,
        JsonFileStore::new(&paths.history),
        config.progression.clone(),
    );
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let port = port.unwrap_or(config.server.port);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve::run_serve(state, &bind, port))
}

fn display_progression(report: &ProgressionReport, top_n: usize) {
    println!("Progression summary:");
    println!("Total workouts logged: {}", report.total_sessions);
    println!("Workouts in the last month: {}", report.sessions_last_month);
    println!("Workouts in the last week: {}", report.sessions_last_week);
    println!();
    println!("Top Improvements:");

    let top = report.top(top_n);
    if top.is_empty() {
        println!("  No improvements yet.");
    }
    for (i, improvement) in top.iter().enumerate() {
        println!(
            "{}. {}: {:+.2}kg",
            i + 1,
            improvement.exercise_name,
            improvement.weight_increase
        );
    }
}

fn display_session(session: &Session) {
    let date = session
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "n/a".into());
    println!("\nWorkout: {}\nDate: {}", session.name, date);

    for exercise in helsi_core::history::recorded_exercises(session) {
        println!("\nExercise: {}\nSets: {}", exercise.name, exercise.planned_sets);
        for i in 0..exercise.planned_sets as usize {
            let reps = exercise
                .reps
                .get(i)
                .map(|r| r.to_string())
                .unwrap_or_else(|| "n/a".into());
            let weight = exercise
                .weights
                .get(i)
                .map(|w| format!("{:.2} kg", w))
                .unwrap_or_else(|| "n/a".into());
            println!("Set {}: {} reps, {}", i + 1, reps, weight);
        }
        println!("Rest: {}", exercise.rest);
    }
}
