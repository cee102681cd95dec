use anyhow::{bail, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use obi::app::App;
use obi::core::Config;
use obi::ipc::IpcClient;
use obi_ipc::{Command, Response, Side};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Obi - replacement side taskbar
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Start(StartCmd),
    Version(VersionCmd),
    SetSide(SetSideCmd),
    ListWindows(ListWindowsCmd),
    GetState(GetStateCmd),
    Activate(ActivateCmd),
    CloseWindow(CloseWindowCmd),
    KillWindow(KillWindowCmd),
    LaunchNew(LaunchNewCmd),
    Quit(QuitCmd),
}

/// Start the obi daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "start")]
struct StartCmd {}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

/// Move the taskbar strip to the left or right screen edge
#[derive(FromArgs)]
#[argh(subcommand, name = "set-side")]
struct SetSideCmd {
    /// side: left, right
    #[argh(positional)]
    side: String,
}

/// List all tracked application windows
#[derive(FromArgs)]
#[argh(subcommand, name = "list-windows")]
struct ListWindowsCmd {}

/// Get current daemon state
#[derive(FromArgs)]
#[argh(subcommand, name = "get-state")]
struct GetStateCmd {}

/// Bring a tracked window to the front
#[derive(FromArgs)]
#[argh(subcommand, name = "activate")]
struct ActivateCmd {
    /// root window handle (see list-windows)
    #[argh(positional)]
    handle: u64,
}

/// Ask a tracked window to close
#[derive(FromArgs)]
#[argh(subcommand, name = "close-window")]
struct CloseWindowCmd {
    /// root window handle (see list-windows)
    #[argh(positional)]
    handle: u64,
}

/// Forcefully terminate a tracked window's process
#[derive(FromArgs)]
#[argh(subcommand, name = "kill-window")]
struct KillWindowCmd {
    /// root window handle (see list-windows)
    #[argh(positional)]
    handle: u64,
}

/// Launch a second instance of a tracked window's application
#[derive(FromArgs)]
#[argh(subcommand, name = "launch-new")]
struct LaunchNewCmd {
    /// root window handle (see list-windows)
    #[argh(positional)]
    handle: u64,
}

/// Quit the obi daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "quit")]
struct QuitCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["obi", "--help"];
            match Cli::from_args(&args[..1], &args[1..]) {
                Ok(_) => {}
                Err(e) => {
                    println!("{}", e.output);
                }
            }
            Ok(())
        }
        Some(SubCommand::Start(_)) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();

            tracing::info!("obi starting");
            let config = Config::load()?;
            App::run(config)
        }
        Some(SubCommand::Version(_)) => {
            println!("obi {}", VERSION);
            Ok(())
        }
        Some(subcmd) => run_cli(subcmd),
    }
}

fn run_cli(subcmd: SubCommand) -> Result<()> {
    let cmd = to_command(subcmd)?;
    let mut client = IpcClient::connect()?;
    let response = client.send(&cmd)?;

    match response {
        Response::Ok => {}
        Response::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Response::Windows { windows } => {
            for w in windows {
                println!(
                    "{}: {} [children={}]{}{}",
                    w.handle,
                    w.title,
                    w.child_count,
                    if w.active { " *" } else { "" },
                    w.exe_path
                        .map(|p| format!(" ({})", p))
                        .unwrap_or_default()
                );
            }
        }
        Response::State { state } => {
            println!("Side: {:?}", state.side);
            println!("Taskbar width: {}", state.taskbar_width);
            println!("Window count: {}", state.window_count);
            println!("Foreground: {:?}", state.foreground);
        }
    }

    Ok(())
}

fn to_command(subcmd: SubCommand) -> Result<Command> {
    match subcmd {
        SubCommand::Start(_) | SubCommand::Version(_) => {
            unreachable!("handled in main")
        }
        SubCommand::SetSide(cmd) => Ok(Command::SetSide {
            side: parse_side(&cmd.side)?,
        }),
        SubCommand::ListWindows(_) => Ok(Command::ListWindows),
        SubCommand::GetState(_) => Ok(Command::GetState),
        SubCommand::Activate(cmd) => Ok(Command::Activate { handle: cmd.handle }),
        SubCommand::CloseWindow(cmd) => Ok(Command::CloseWindow { handle: cmd.handle }),
        SubCommand::KillWindow(cmd) => Ok(Command::KillWindow { handle: cmd.handle }),
        SubCommand::LaunchNew(cmd) => Ok(Command::LaunchNew { handle: cmd.handle }),
        SubCommand::Quit(_) => Ok(Command::Quit),
    }
}

fn parse_side(s: &str) -> Result<Side> {
    match s.to_lowercase().as_str() {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        _ => bail!("Unknown side: {} (use left or right)", s),
    }
}
