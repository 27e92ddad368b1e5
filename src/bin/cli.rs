//! Atcommander command line interface.

use std::process;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_t, App, AppSettings::*, Arg,
    ArgMatches, SubCommand,
};
use console::style;
use log::{debug, trace, LevelFilter};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use simplelog::*;

use atcommander::{
    self as at, AtCommander, PlatformProfile, SerialTransport, SessionState, Settings,
};

fn main() {
    println!("[AT] atcommander v{}", crate_version!());

    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        process::exit(0);
    })
    .expect("Failed to install my Ctrl-C handler!");

    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "\n\
            Atcommander talks to serial modules configured with AT-style \
            commands, such as the RN-42 Bluetooth module. It switches the \
            module from data mode to command mode by sending the escape \
            sequence at each candidate baud rate of the device profile until \
            the module answers, then issues the requested command.\n\
            \n\
            Unless `--stay` is given, the module is switched back to data \
            mode once the command is done.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .setting(SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("DEVICE_TTY")
                .help("the tty device the module is attached to")
                .long_help(
                    "the tty device the module is attached to; when not set, \
                     the list of serial ports on the system is offered for \
                     selection.",
                )
                .short("-t")
                .long("--tty")
                .takes_value(true)
                .require_equals(true),
        )
        .arg(
            Arg::with_name("BAUD_RATE")
                .help("baud rate the port is opened at")
                .short("-b")
                .long("--baud-rate")
                .takes_value(true)
                .default_value("115200")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("DATA_BITS")
                .help("number of bits per character")
                .short("-d")
                .long("--data-bits")
                .takes_value(true)
                .possible_values(&["5", "6", "7", "8"])
                .default_value("8")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("STOP_BITS")
                .help("number of stop bits per byte")
                .short("-s")
                .long("--stop-bits")
                .takes_value(true)
                .possible_values(&["1", "2"])
                .default_value("1")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("PARITY")
                .help("parity checking protocol")
                .short("-p")
                .long("--parity")
                .takes_value(true)
                .possible_values(&["none", "odd", "even"])
                .default_value("none")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("FLOW_CONTROL")
                .help("flow control mode")
                .short("-f")
                .long("--flow-control")
                .takes_value(true)
                .possible_values(&["none", "soft", "hard"])
                .default_value("none")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("PROFILE")
                .help("TOML file describing the device AT dialect")
                .long_help(
                    "TOML file describing the device AT dialect; when not \
                     set, the built-in RN-42 profile is used. Run the \
                     `profile` command to get a starting point.",
                )
                .long("--profile")
                .takes_value(true)
                .require_equals(true),
        )
        .arg(
            Arg::with_name("STAY")
                .help("leave the module in command mode when done")
                .long("--stay"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help(
                    "Sets the logging level of verbosity, repeat several times for \
                     higher verbosity",
                ),
        )
        .subcommand(SubCommand::with_name("enter").about("switch the module to command mode"))
        .subcommand(SubCommand::with_name("info").about("print the module name and device id"))
        .subcommand(
            SubCommand::with_name("set-baud")
                .about("change the baud rate of the module")
                .arg(
                    Arg::with_name("NEW_BAUD_RATE")
                        .help("the new baud rate")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("ATTEMPTS")
                        .help("number of attempts, one second apart")
                        .long("--attempts")
                        .takes_value(true)
                        .default_value("1")
                        .require_equals(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("set-name")
                .about("rename the module")
                .arg(
                    Arg::with_name("NAME")
                        .help("the new name")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("PERSIST")
                        .help("use the persistent (serialized) name command")
                        .long("--persist"),
                ),
        )
        .subcommand(SubCommand::with_name("reboot").about("reboot the module"))
        .subcommand(
            SubCommand::with_name("profile").about("print the device profile as TOML"),
        )
        .get_matches();

    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'atcommander -v -v -v' or 'atcommander -vvv' vs 'atcommander -v'
    let log_level = verbosity(matches.occurrences_of("v"));

    log::set_max_level(log_level);
    if log::set_boxed_logger(term_logger(log_level)).is_err() {
        eprintln!("could not initialize the logger");
    }

    trace!("{:#?}", matches);

    let settings = settings_from(&matches);

    let profile = settings.load_profile().unwrap_or_else(|e| fail(&e));

    if matches.subcommand_matches("profile").is_some() {
        print!("{}", profile.to_toml_string());
        process::exit(0);
    }

    let ok = run(settings, &profile, &matches).unwrap_or_else(|e| fail(&e));
    let exit_code = if ok { 0 } else { 1 };
    debug!("exit code: {}", exit_code);
    process::exit(exit_code);
}

/// Open the port, run the requested command and switch back to data mode
/// unless asked not to. Returns whether the command succeeded.
fn run(
    mut settings: Settings,
    profile: &PlatformProfile,
    matches: &ArgMatches,
) -> Result<bool, at::Error> {
    if settings.path.is_none() {
        settings.path = at::select_port();
    }
    let port = at::open_and_setup_port(&settings)?;
    let mut transport = SerialTransport::new(port);
    let state = SessionState::with_host_baud(settings.baud_rate);
    let mut commander = AtCommander::with_state(&mut transport, profile, state);

    // `leave` marks commands after which the module is left as is: `enter`
    // is all about staying in command mode, and a rebooting module comes back
    // in data mode by itself.
    let (ok, leave) = match matches.subcommand() {
        ("enter", _) => (
            report(commander.enter_command_mode(), "Module in command mode"),
            true,
        ),
        ("info", _) => (info(&mut commander), false),
        ("set-baud", Some(sub)) => (set_baud(&mut commander, sub), false),
        ("set-name", Some(sub)) => {
            let name = sub.value_of("NAME").unwrap_or_default();
            let persist = sub.is_present("PERSIST");
            (report(commander.set_name(name, persist), "Name changed"), false)
        }
        ("reboot", _) => {
            commander.reboot();
            (report(commander.is_connected(), "Module rebooting"), true)
        }
        _ => unreachable!(),
    };

    if !settings.stay_in_command_mode && !leave && !commander.exit_command_mode() {
        println!(
            "{}",
            style("[AT] 🙁 Could not switch the module back to data mode").yellow()
        );
    }
    Ok(ok)
}

fn info<T: at::Transport>(commander: &mut AtCommander<'_, T>) -> bool {
    let mut name = [0_u8; 64];
    let mut id = [0_u8; 64];

    let name_len = commander.get_name(&mut name);
    let id_len = commander.get_device_id(&mut id);
    if name_len > 0 {
        println!("[AT] name      : {}", String::from_utf8_lossy(&name[..name_len]));
    } else {
        println!("{}", style("[AT] Unable to get the module name").red());
    }
    if id_len > 0 {
        println!("[AT] device id : {}", String::from_utf8_lossy(&id[..id_len]));
    } else {
        println!("{}", style("[AT] Unable to get the module device id").red());
    }
    name_len > 0 && id_len > 0
}

/// Change the module baud rate, retrying the whole exchange, command mode
/// negotiation included, up to the requested number of attempts.
fn set_baud<T: at::Transport>(commander: &mut AtCommander<'_, T>, sub: &ArgMatches) -> bool {
    use retry::{delay, retry};

    let baud = value_t!(sub.value_of("NEW_BAUD_RATE"), u32).unwrap_or_else(|e| e.exit());
    let attempts = value_t!(sub.value_of("ATTEMPTS"), usize).unwrap_or_else(|e| e.exit());

    let result = retry(
        delay::Fixed::from_millis(1000).take(attempts.saturating_sub(1)),
        || {
            if commander.set_baud(baud) {
                Ok(())
            } else {
                Err(())
            }
        },
    );
    report(result.is_ok(), &format!("Module baud rate changed to {}", baud))
}

fn report(ok: bool, success: &str) -> bool {
    if ok {
        println!("[AT] 👍 {}", style(success).green());
    } else {
        println!("{}", style("[AT] 💥 Command failed, run with -vv for details").red());
    }
    ok
}

fn settings_from(matches: &ArgMatches) -> Settings {
    // It's safe to call unwrap on all command line arguments with default
    // values, because the value with either be what the user input at runtime
    // or the default value

    let baud_rate = value_t!(matches.value_of("BAUD_RATE"), u32).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style("baud-rate").cyan()
        );
        println!(
            "   {} `{}` is not a valid value",
            style("-->").cyan(),
            style(matches.value_of("BAUD_RATE").unwrap()).on_red()
        );
        process::exit(-1);
    });

    let data_bits = match matches.value_of("DATA_BITS").unwrap() {
        "5" => DataBits::Five,
        "6" => DataBits::Six,
        "7" => DataBits::Seven,
        "8" => DataBits::Eight,
        _ => unreachable!(),
    };

    let stop_bits = match matches.value_of("STOP_BITS").unwrap() {
        "1" => StopBits::One,
        "2" => StopBits::Two,
        _ => unreachable!(),
    };

    let parity = match matches.value_of("PARITY").unwrap() {
        "none" => Parity::None,
        "even" => Parity::Even,
        "odd" => Parity::Odd,
        _ => unreachable!(),
    };

    let flow_control = match matches.value_of("FLOW_CONTROL").unwrap() {
        "none" => FlowControl::None,
        "soft" => FlowControl::Software,
        "hard" => FlowControl::Hardware,
        _ => unreachable!(),
    };

    let mut builder = at::SettingsBuilder::default()
        .baud_rate(baud_rate)
        .data_bits(data_bits)
        .stop_bits(stop_bits)
        .parity(parity)
        .flow_control(flow_control)
        .stay_in_command_mode(matches.is_present("STAY"));

    if let Some(path) = matches.value_of("DEVICE_TTY") {
        builder = builder.path(path);
    }
    if let Some(profile) = matches.value_of("PROFILE") {
        builder = builder.profile(profile);
    }
    builder.finalize()
}

fn verbosity(occurrences: u64) -> LevelFilter {
    match occurrences {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn term_logger(log_level: LevelFilter) -> Box<TermLogger> {
    TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}

fn fail(error: &dyn std::error::Error) -> ! {
    println!("{}: {}", style("error").red(), error);
    process::exit(1);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_v_raises_verbosity() {
        assert_eq!(verbosity(0), LevelFilter::Warn);
        assert_eq!(verbosity(1), LevelFilter::Info);
        assert_eq!(verbosity(2), LevelFilter::Debug);
        assert_eq!(verbosity(3), LevelFilter::Trace);
        assert_eq!(verbosity(7), LevelFilter::Trace);
    }

    #[test]
    fn term_logger_uses_the_requested_level() {
        let logger = term_logger(LevelFilter::Debug);
        assert_eq!(logger.level(), LevelFilter::Debug);
    }
}
