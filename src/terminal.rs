//! Terminal Driver
//!
//! Line-oriented front end: reads commands from stdin, runs them against the
//! mounted screen and prints the rendered view after each one.

use std::path::PathBuf;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::app::{App, Screen};
use crate::models::{UploadFile, UploadKind};
use crate::navigation::Route;
use crate::views::render::{render_dashboard, render_loading, render_login};
use crate::views::{DashboardView, RowAction, UploadOutcome};

const HELP: &str = "\
Commands:
  login <user> <password>           Sign in
  tab <n>                           Switch to tab n
  refresh                           Reload the active tab
  upload <course|program|payment> <path>
                                    Upload a file
  delete <n>                        Delete row n (admin)
  confirm <n>                       Confirm payment in row n (admin)
  dismiss                           Hide the notification
  open </|/auth>                    Open a route
  logout                            Sign out
  help                              Show this help
  quit                              Exit
";

/// Parsed terminal command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { login: String, password: String },
    Tab(usize),
    Refresh,
    Upload { kind: UploadKind, path: PathBuf },
    Delete(usize),
    Confirm(usize),
    Dismiss,
    Open(Route),
    Logout,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or_else(|| "Empty command".to_string())?;
        let args: Vec<&str> = parts.collect();

        let command = match (name, args.as_slice()) {
            ("login", [login, password]) => Command::Login {
                login: login.to_string(),
                password: password.to_string(),
            },
            ("tab", [n]) => Command::Tab(parse_index(n)?),
            ("refresh", []) => Command::Refresh,
            ("upload", [kind, path @ ..]) if !path.is_empty() => {
                let kind = UploadKind::parse(kind)
                    .ok_or_else(|| format!("Unknown upload kind '{}'", kind))?;
                Command::Upload {
                    kind,
                    path: PathBuf::from(path.join(" ")),
                }
            }
            ("delete", [n]) => Command::Delete(parse_row(n)?),
            ("confirm", [n]) => Command::Confirm(parse_row(n)?),
            ("dismiss", []) => Command::Dismiss,
            ("open", [path]) => Command::Open(
                Route::from_path(path).ok_or_else(|| format!("Unknown route '{}'", path))?,
            ),
            ("logout", []) => Command::Logout,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(format!("Unrecognized command '{}'. Type 'help'.", line.trim())),
        };
        Ok(command)
    }
}

fn parse_index(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a number", value))
}

/// Rows are shown 1-based
fn parse_row(value: &str) -> Result<usize, String> {
    match parse_index(value)? {
        0 => Err("Rows start at 1".to_string()),
        n => Ok(n - 1),
    }
}

/// Terminal session over an [`App`]
pub struct Terminal {
    app: App,
}

impl Terminal {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Render whatever screen is mounted
    pub fn render(&self) -> String {
        match self.app.screen() {
            Screen::Loading => render_loading(),
            Screen::Login(view) => render_login(view),
            Screen::Dashboard(view) => render_dashboard(&view.snapshot(), Instant::now()),
        }
    }

    /// Run the session gate
    pub async fn start(&mut self) -> String {
        let route = self.app.start().await;
        debug!("Started on {}", route);
        self.render()
    }

    /// Execute one input line; `None` means quit
    pub async fn handle(&mut self, line: &str) -> Option<String> {
        let command = match Command::parse(line) {
            Ok(Command::Quit) => return None,
            Ok(command) => command,
            Err(message) => return Some(format!("{}\n", message)),
        };

        let message = self.execute(command).await;
        self.app.settle().await;

        let mut out = String::new();
        if let Some(message) = message {
            out.push_str(&message);
            out.push('\n');
        }
        out.push_str(&self.render());
        Some(out)
    }

    async fn execute(&mut self, command: Command) -> Option<String> {
        match command {
            Command::Help => Some(HELP.to_string()),
            Command::Open(route) => {
                self.app.open(route).await;
                None
            }
            Command::Login { login, password } => match self.app.screen_mut() {
                Screen::Login(view) => {
                    view.fill(&login, &password);
                    // Failures are shown by the view itself
                    let _ = view.submit().await;
                    None
                }
                _ => Some("Already signed in".to_string()),
            },
            command => {
                let view = match self.app.screen() {
                    Screen::Dashboard(view) => view.clone(),
                    _ => return Some("Sign in first".to_string()),
                };

                match command {
                    Command::Tab(n) => {
                        view.select_tab(n).await;
                        None
                    }
                    Command::Refresh => {
                        view.refresh().await;
                        None
                    }
                    Command::Upload { kind, path } => match UploadFile::from_path(&path) {
                        Ok(file) => match view.upload(kind, file).await {
                            UploadOutcome::Busy => Some("An upload is already in progress".to_string()),
                            UploadOutcome::NotAllowed => {
                                Some(format!("Uploading {} files is not available", kind))
                            }
                            _ => None,
                        },
                        Err(e) => Some(format!("Cannot read {}: {}", path.display(), e)),
                    },
                    Command::Delete(row) => row_action(&view, row, false),
                    Command::Confirm(row) => row_action(&view, row, true),
                    Command::Dismiss => {
                        view.dismiss_notification();
                        None
                    }
                    Command::Logout => {
                        view.logout();
                        None
                    }
                    _ => None,
                }
            }
        }
    }
}

fn row_action(view: &DashboardView, row: usize, confirm: bool) -> Option<String> {
    let action = view.with_state(|state| state.active().and_then(|tab| tab.row_action));
    let matches = match action {
        Some(RowAction::ConfirmPayment) => confirm,
        Some(RowAction::DeleteCourse | RowAction::DeleteProgram) => !confirm,
        None => false,
    };
    if !matches {
        return Some("That action is not available on this tab".to_string());
    }

    match view.perform_row_action(row) {
        Some(done) => Some(format!("{}: {} (not sent to the server)", done.action.label(), done.name)),
        None => Some(format!("No row {}", row + 1)),
    }
}

/// Run the interactive loop until EOF or `quit`
pub async fn run(app: App) -> anyhow::Result<()> {
    let mut terminal = Terminal::new(app);
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    stdout.write_all(render_loading().as_bytes()).await?;
    let screen = terminal.start().await;
    stdout.write_all(screen.as_bytes()).await?;
    stdout.flush().await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            info!("Input closed");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match terminal.handle(&line).await {
            Some(output) => {
                stdout.write_all(output.as_bytes()).await?;
                stdout.flush().await?;
            }
            None => break,
        }
    }

    Ok(())
}
