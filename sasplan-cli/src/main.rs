use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use sasplan::causal::{write_dot, CausalGraph};
use sasplan::config::PlannerConfig;
use sasplan::planner::Planner;
use sasplan::sas::SasParser;
use sasplan::state::SearchState;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SASPLAN_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is sasplan {}", env!("SASPLAN_VERSION"));
    info!(
        "  {} build - {}",
        env!("SASPLAN_PROFILE"),
        env!("SASPLAN_RUSTC_VERSION")
    );
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("sasplan")
        .version(env!("SASPLAN_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The translator output file to use (stdin if omitted)'")
        .arg(
            Arg::from_usage("[graph-file] --graph=[FILE]")
                .help("Write the causal graph as Graphviz DOT, '-' for stdout"),
        )
        .arg_from_usage("--no-plan 'Skip the regression search'")
        .arg(
            Arg::from_usage("[max-variants] --max-variants=[N]")
                .help("Limit on the total number of determinized operator variants"),
        )
        .arg(
            Arg::from_usage("[max-steps] --max-steps=[N]")
                .help("Limit on the number of regression steps before giving up"),
        )
        .get_matches();

    init_logging();
    banner();

    let mut config = PlannerConfig::default();
    if let Some(value) = matches.value_of("max-variants") {
        config.max_variants = value.parse()?;
    }
    if let Some(value) = matches.value_of("max-steps") {
        config.max_steps = value.parse()?;
    }

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn Read
        }
    };

    let problem = SasParser::parse(file)?;
    info!(
        "Parsed problem with {} variables and {} operators",
        problem.var_count(),
        problem.operators().len()
    );

    if let Some(path) = matches.value_of("graph-file") {
        let graph = CausalGraph::build(&problem);
        if path == "-" {
            let stdout = io::stdout();
            write_dot(&mut stdout.lock(), &problem, &graph)?;
        } else {
            info!("Writing causal graph to file '{}'", path);
            write_dot(&mut fs::File::create(path)?, &problem, &graph)?;
        }
    }

    if matches.is_present("no-plan") {
        return Ok(0);
    }

    let mut planner = Planner::new(&problem, &config)?;

    match planner.search() {
        SearchState::Satisfied => {
            let plan = planner.plan().unwrap();
            println!("s PLAN FOUND");
            println!("c {} steps, total cost {}", plan.len(), planner.total_cost());
            for operator in plan {
                println!("v {}", operator);
            }
            Ok(10)
        }
        SearchState::DeadEnd => {
            println!("s DEAD END");
            Ok(20)
        }
        SearchState::Searching => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}
