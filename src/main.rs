//! DevOps Lab CLI
//!
//! Interactive terminal front end for the microservice deployment lab.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use devops_lab::config::CONFIG_ENV;
use devops_lab::{render_text, LabConfig, LabController, TerminalLog};

const HELP: &str = "\
Lab actions:
  :next | :prev        move between steps
  :step <n>            jump to step n (1-based)
  :check               check progress on the current step
  :tab <file>          switch editor tab
  :edit                replace the buffer (finish with a line containing only '.')
  :save                save the buffer now (edits also auto-save)
  :show [json]         show the lab
  :clear               clear the terminal log
  :help                this help
  :quit                leave the lab
Anything else is run as a terminal command.";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn print_view(controller: &LabController) {
    print!("{}", render_text(&controller.view()));
    std::io::stdout().flush().ok();
}

fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

async fn read_buffer(lines: &mut Lines<BufReader<Stdin>>) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line == "." {
            break;
        }
        buffer.push(line);
    }
    Ok(buffer.join("\n"))
}

async fn handle_action(
    controller: &mut LabController,
    lines: &mut Lines<BufReader<Stdin>>,
    action: &str,
) -> Flow {
    let (name, arg) = match action.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (action, ""),
    };

    match name {
        ":quit" | ":q" => return Flow::Quit,
        ":help" => println!("{}", HELP),
        ":next" => {
            if controller.next() {
                print_view(controller);
            } else {
                println!("Already on the last step.");
            }
        }
        ":prev" => {
            if controller.prev() {
                print_view(controller);
            } else {
                println!("Already on the first step.");
            }
        }
        ":step" => match arg.parse::<usize>() {
            Ok(number) if number > 0 => match controller.go_to_step(number - 1) {
                Ok(()) => print_view(controller),
                Err(e) => eprintln!("{}", e),
            },
            _ => eprintln!("usage: :step <n>"),
        },
        ":check" => {
            if let Err(e) = controller.check_progress().await {
                eprintln!("{}", e);
            }
        }
        ":tab" => match controller.switch_tab(arg) {
            Ok(()) => println!("{}", controller.editor().buffer()),
            Err(e) => eprintln!("{}", e),
        },
        ":edit" => match read_buffer(lines).await {
            Ok(text) => controller.edit(text),
            Err(e) => eprintln!("failed to read buffer: {}", e),
        },
        ":save" => controller.save().await,
        ":show" if arg == "json" => match serde_json::to_string_pretty(&controller.view()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("failed to serialize view: {}", e),
        },
        ":show" => print_view(controller),
        ":clear" => controller.clear_terminal(),
        _ => eprintln!("unknown action {} (try :help)", name),
    }
    Flow::Continue
}

/// Cancel token of the command in flight, `None` at the prompt.
type Running = Arc<Mutex<Option<CancellationToken>>>;

/// Ctrl-C cancels the running command, or asks the REPL to quit when idle.
fn route_interrupt(running: &Running, idle: &mpsc::UnboundedSender<()>) -> bool {
    let token = running.lock().ok().and_then(|slot| slot.clone());
    match token {
        Some(token) => {
            token.cancel();
            true
        }
        None => idle.send(()).is_ok(),
    }
}

fn spawn_interrupt_handler(running: Running) -> mpsc::UnboundedReceiver<()> {
    let (idle_tx, idle_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !route_interrupt(&running, &idle_tx) {
                break;
            }
        }
    });
    idle_rx
}

fn set_running(running: &Running, token: Option<CancellationToken>) {
    if let Ok(mut slot) = running.lock() {
        *slot = token;
    }
}

async fn run_command(controller: &mut LabController, running: &Running, line: &str) {
    set_running(running, Some(controller.cancel_token()));
    controller.run_command(line).await;
    set_running(running, None);
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let config = match config_path() {
        Some(path) => match LabConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => LabConfig::default(),
    };

    // Terminal lines are printed as they are appended.
    let (tap, mut tapped) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = tapped.recv().await {
            println!("{}", line);
        }
    });

    let mut controller = match LabController::boot(config, TerminalLog::with_tap(tap)).await {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Lab failed to start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(sandbox = ?controller.sandbox().root(), "lab ready");
    print_view(&controller);
    println!("\nType :help for lab actions.");

    let running: Running = Arc::new(Mutex::new(None));
    let mut interrupts = spawn_interrupt_handler(running.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(()) = interrupts.recv() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("failed to read input: {}", e);
                        break;
                    }
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.starts_with(':') {
                    if handle_action(&mut controller, &mut lines, input).await == Flow::Quit {
                        break;
                    }
                } else {
                    run_command(&mut controller, &running, input).await;
                }
            }
            Some(snapshot) = controller.next_settled_edit() => {
                controller.save_snapshot(snapshot).await;
            }
        }
    }

    drop(controller);
    printer.await.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_cancels_the_running_command() {
        let running: Running = Arc::new(Mutex::new(None));
        let (idle_tx, mut idle_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        set_running(&running, Some(token.clone()));

        assert!(route_interrupt(&running, &idle_tx));

        assert!(token.is_cancelled());
        assert!(idle_rx.try_recv().is_err());
    }

    #[test]
    fn interrupt_at_the_prompt_requests_quit() {
        let running: Running = Arc::new(Mutex::new(None));
        let (idle_tx, mut idle_rx) = mpsc::unbounded_channel();

        assert!(route_interrupt(&running, &idle_tx));

        assert_eq!(idle_rx.try_recv(), Ok(()));
    }

    #[test]
    fn interrupt_handler_stops_once_the_repl_is_gone() {
        let running: Running = Arc::new(Mutex::new(None));
        let (idle_tx, idle_rx) = mpsc::unbounded_channel();
        drop(idle_rx);

        assert!(!route_interrupt(&running, &idle_tx));
    }
}
