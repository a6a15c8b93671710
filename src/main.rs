use std::io::BufRead;

use clap::Parser;
use tally::cli::{Cli, Command, CompareArgs, HistoryArgs, ReportArgs, RunArgs};
use tally::config::Config;
use tally::events::{NullSink, TracingSink};
use tally::extract::pattern::PhraseCount;
use tally::extract::Extractor;
use tally::page::{PageAccessor, WebDriverPage};
use tally::report::{self, comparison};
use tally::store::{HistoryOrder, Store};
use tally::{logging, paths, run, Error, Result};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        tracing::error!(error = %e, "run aborted");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.storage.database = Some(database.clone());
    }

    match &cli.command {
        Command::Run(args) => {
            config.apply_run_args(args);
            run_command(&config, args, cli.verbose)
        }
        Command::Report(args) => {
            logging::init_stderr(cli.verbose);
            report_command(&config, args)
        }
        Command::Compare(args) => {
            logging::init_stderr(cli.verbose);
            compare_command(&config, args)
        }
        Command::History(args) => {
            logging::init_stderr(cli.verbose);
            history_command(&config, args)
        }
    }
}

fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.database_path()?)
}

fn run_command(config: &Config, args: &RunArgs, verbose: bool) -> Result<()> {
    let log_path = logging::init(&paths::log_dir()?, verbose)?;
    tracing::info!(log = %log_path.display(), "starting run");

    let entities = run::read_entity_list(&config.input.entities_file)?;
    let store = open_store(config)?;

    let skills = PhraseCount::new(&config.extract.skills_phrase).map_err(|reason| Error::Config {
        origin: "extract.skills_phrase".to_string(),
        reason,
    })?;

    let mut page = WebDriverPage::connect(&config.browser).map_err(Error::Session)?;
    if !args.no_login_prompt {
        wait_for_login(&mut page, &config.browser.login_url)?;
    }

    let outcome = {
        let mut extractor = Extractor::new(page, config.extract.clone(), Box::new(skills));
        run::run_batch(
            &mut extractor,
            &store,
            &entities,
            config.input.max_entities,
            &mut TracingSink,
        )?
        // extractor drops here and closes the browser session
    };

    tracing::info!(
        profiles = outcome.current.len(),
        failures = outcome.failures,
        "finished scraping"
    );

    run::compare_with_prior(
        &store,
        &outcome.current,
        outcome.timestamp,
        config.report.cutoff,
        &mut TracingSink,
    )?;

    let rows = report::trend_rows(&store.history(HistoryOrder::ByEntity)?);
    let artifacts = report::write_artifacts(&rows, &config.report.output_dir)?;
    tracing::info!(
        html = %artifacts.html.display(),
        csv = %artifacts.csv.display(),
        "comparison table saved"
    );

    Ok(())
}

/// Opens the sign-in page and blocks until the user confirms on stdin.
fn wait_for_login(page: &mut WebDriverPage, login_url: &str) -> Result<()> {
    page.navigate(login_url).map_err(Error::Session)?;
    tracing::info!(url = login_url, "opened sign-in page");
    eprintln!("Log in in the browser window, then press Enter to continue...");

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    tracing::info!("continuing with profile scraping");
    Ok(())
}

fn report_command(config: &Config, args: &ReportArgs) -> Result<()> {
    let store = open_store(config)?;
    let rows = report::trend_rows(&store.history(HistoryOrder::ByEntity)?);

    if args.json {
        println!("{}", report::json::render(&rows));
        return Ok(());
    }

    let out_dir = args.out.as_ref().unwrap_or(&config.report.output_dir);
    let artifacts = report::write_artifacts(&rows, out_dir)?;
    println!("{} profiles with history", rows.len());
    println!("Comparison table saved as {}", artifacts.html.display());
    println!("Records saved as {}", artifacts.csv.display());
    Ok(())
}

fn compare_command(config: &Config, args: &CompareArgs) -> Result<()> {
    let store = open_store(config)?;
    let current = store.latest_batch()?;

    let Some(batch_time) = current.iter().map(|s| s.timestamp).next() else {
        println!("No snapshots found. Run 'tally run' to record some.");
        return Ok(());
    };

    let cutoff = args.cutoff.unwrap_or(config.report.cutoff);
    // printed below, so nothing to log
    match run::compare_with_prior(&store, &current, batch_time, cutoff, &mut NullSink)? {
        Some(deltas) if !deltas.is_empty() => println!("{}", comparison::render(&deltas)),
        Some(_) => println!("No profiles in common with the previous batch."),
        None => println!("{}", comparison::NO_PRIOR_DATA),
    }
    Ok(())
}

fn history_command(config: &Config, args: &HistoryArgs) -> Result<()> {
    let store = open_store(config)?;
    let order = if args.by_entity {
        HistoryOrder::ByEntity
    } else {
        HistoryOrder::NewestFirst
    };
    print!("{}", report::table::render(&store.history(order)?));
    Ok(())
}
