use anyhow::{Context, Result};
use chrono::Local;
use dealcal::cli::{self, CliCommand};
use dealcal::config::Config;
use dealcal::context::StandardContext;
use dealcal::controller::CalendarController;
use dealcal::model::{DisplayEvent, EventDraft};
use dealcal::notify::LogNotifier;
use dealcal::store::LocalEventStore;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let parsed = match cli::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help("dealcal");
            std::process::exit(2);
        }
    };

    if parsed.command == CliCommand::Help {
        cli::print_help("dealcal");
        return Ok(());
    }

    let ctx = StandardContext::new(parsed.root.clone());
    let mut config = Config::load_or_default(&ctx)?;

    let level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    // A logger can only be installed once; a second init is harmless.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let store = Arc::new(LocalEventStore::new(&ctx).context("Failed to open event store")?);
    log::debug!("Using event file {}", store.path().display());

    let today = Local::now().date_naive();
    let controller = CalendarController::from_config(&config, store, Arc::new(LogNotifier), today);

    match parsed.command {
        CliCommand::Help => {}
        CliCommand::List { date } => {
            controller.refresh().await?;
            let events = match date {
                Some(d) => controller.events_on(d).await,
                None => controller.visible_events().await,
            };
            if events.is_empty() {
                println!("No events.");
            }
            for event in &events {
                print_event(event);
            }
        }
        CliCommand::Add {
            title,
            date,
            time,
            duration,
            kind,
        } => {
            controller.open_create(Some(date)).await;
            let draft = EventDraft::new(title, date)
                .with_time(time)
                .with_duration(duration)
                .with_kind(kind);
            let id = controller.save(draft).await?;
            println!("{}", id);
        }
        CliCommand::Delete { id } => {
            controller.remove(&id).await?;
        }
        CliCommand::SetCategory { id, visible } => {
            config.set_category_hidden(id, !visible);
            config.save(&ctx)?;
            controller.toggle_category(id, visible).await;
            let shown: Vec<String> = controller
                .visible_categories()
                .await
                .iter()
                .map(|c| c.to_string())
                .collect();
            println!("Visible: {}", shown.join(", "));
        }
    }

    Ok(())
}

fn print_event(event: &DisplayEvent) {
    println!(
        "{:>4}  {} {:>8}  {:<9} [{}] {}",
        event.id.as_str(),
        event.date,
        event.time,
        event.duration,
        event.category,
        event.title
    );
    if let Some(location) = &event.location {
        println!("      @ {}", location);
    }
    if !event.attendees.is_empty() {
        println!("      with {}", event.attendees.join(", "));
    }
}
