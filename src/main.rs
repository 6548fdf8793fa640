use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};
use nix::sys::stat::{Mode, umask};

use gauthctl::cli::Args;
use gauthctl::state::input::open_inherited;
use gauthctl::{DispatchError, Dispatcher, GauthConfig, Identity, Outcome, Refusal, StateStore};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures; every usage error exits 1
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    match real_main(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

fn real_main(args: &Args) -> Result<i32> {
    // nothing we create may be group/other accessible
    let previous = umask(Mode::from_bits_truncate(0o077));
    debug!("Tightened umask from {:o} to 077", previous.bits());

    let config = GauthConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let identity = Identity::current()?;
    let input_fd = args.input_fd.unwrap_or(config.input_fd);

    let dispatcher = Dispatcher::new(&config.state_dir, StateStore::new(config.file_mode));
    let request = args.request();

    match dispatcher.run(&identity, &request, || open_inherited(input_fd)) {
        Ok(outcome) => {
            match &outcome {
                Outcome::Status { .. } => println!("{}", outcome.message()),
                _ => eprintln!("{}", outcome.message()),
            }
            Ok(outcome.exit_code())
        }
        Err(e) => {
            debug!("{request:?} failed: {e:?}");
            report(&e);
            Ok(1)
        }
    }
}

/// Print a failure so that refusals, conflicts and I/O errors read differently
fn report(e: &DispatchError) {
    match e {
        DispatchError::Refused(Refusal::AlreadyEnabled { user }) => {
            eprintln!("Error: 2FA configuration exists for user {user}.");
        }
        DispatchError::Refused(refusal) => {
            eprintln!("Error: permission refused: {refusal}.");
        }
        e if e.is_retryable() => {
            eprintln!("Error: {e} (transient conflict, safe to retry)");
        }
        e => eprintln!("Error: {e}"),
    }
}
