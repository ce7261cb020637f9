extern crate calnav as lib;

use chrono::{Local, NaiveDate};
use flexi_logger::{Duplicate, FileSpec, Logger};
use lib::calendar::CalendarDate;
use lib::config::Config;
use lib::error::{Error, ErrorKind};
use lib::navigation::{self, NavigationRequest, Trigger};
use lib::query::QueryState;
use std::path::PathBuf;
use structopt::StructOpt;
use url::Url;

fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "calnav",
    about = "Computes the address of the previous, next or current month of a calendar page."
)]
pub struct Args {
    #[structopt(
        name = "URL",
        help = "address of the calendar page currently shown",
        parse(try_from_str = Url::parse)
    )]
    pub url: Url,

    #[structopt(
        name = "ACTION",
        help = "bound key (e.g. ArrowLeft) or one of previous, next, today"
    )]
    pub action: Option<String>,

    #[structopt(
        short = "d",
        long = "delta",
        help = "move by this many months",
        allow_hyphen_values = true,
        conflicts_with = "ACTION"
    )]
    pub delta: Option<i64>,

    #[structopt(
        long = "today",
        help = "date to use as today (YYYY-MM-DD) instead of the system clock",
        parse(try_from_str = parse_date)
    )]
    pub today: Option<NaiveDate>,

    #[structopt(
        short = "s",
        long = "show",
        help = "show the month and its neighbours instead of printing the address"
    )]
    pub show: bool,

    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn request_for(args: &Args, config: &Config) -> Result<Option<NavigationRequest>, Error> {
    if let Some(delta) = args.delta {
        return Ok(Some(NavigationRequest::Relative(delta)));
    }

    let action = match &args.action {
        Some(action) => action,
        None => return Ok(None),
    };

    let trigger = match config.trigger_for(action) {
        Some(trigger) => trigger,
        None => action.parse::<Trigger>().map_err(|_| {
            Error::new(
                ErrorKind::UnknownTrigger,
                &format!("'{}' (bound keys: {})", action, config.bound_keys()),
            )
        })?,
    };
    log::debug!("Action '{}' triggers {}", action, trigger);

    Ok(Some(trigger.into()))
}

fn print_overview(url: &Url, today: &NaiveDate) {
    let summary = navigation::overview(&QueryState::from_url(url), today);

    if summary.is_current_month {
        println!("{} (today)", summary.current);
    } else {
        println!("{}", summary.current);
    }

    let targets = [
        (Trigger::Previous, summary.previous),
        (Trigger::Next, summary.next),
        (Trigger::Today, CalendarDate::of(today)),
    ];

    for (trigger, date) in targets.iter() {
        let target = navigation::navigate(url, &NavigationRequest::from(*trigger), today);
        println!("  {:<8} {:<16} {}", trigger, date.to_string(), target);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger =
        Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?.duplicate_to_stderr(Duplicate::Warn);

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    std::panic::set_hook(Box::new(|info| {
        eprintln!("calnav ran into a fatal error!");
        eprintln!("{}", info);
        eprintln!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let request = request_for(&args, &config)?;

    let shown = match &request {
        Some(request) => {
            let target = navigation::navigate(&args.url, request, &today);
            log::info!("{} -> {}", args.url, target);
            target
        }
        None => args.url.clone(),
    };

    if args.show || request.is_none() {
        print_overview(&shown, &today);
    } else {
        println!("{}", shown);
    }

    Ok(())
}
