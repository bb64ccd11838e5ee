use region_locator::{Locator, LocatorConfig};

use color_eyre::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::Stylize,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use futures::StreamExt;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. Logging is off when unset.
const LOG_ENV: &str = "REGION_LOCATOR_LOG";
const LOG_FILE: &str = "region-locator-demo.log";

const TABS: [&str; 3] = ["pipelines", "targets", "help"];
const PANEL: &str = "panel";

#[derive(Debug, Default)]
struct DemoState {
    selected: usize,
    status: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let locator = Locator::start(LocatorConfig::from_env()?)?;

    setup_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    let result = run_demo(&locator, &mut stdout).await;

    disable_raw_mode()?;
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen, Show)?;

    tracing::debug!(
        "Final regions: {}",
        serde_json::to_string(&locator.snapshot())?
    );
    tracing::debug!("Final stats: {}", serde_json::to_string(&locator.stats())?);
    locator.shutdown().await?;

    result
}

fn init_logging() -> Result<()> {
    let Ok(filter) = std::env::var(LOG_ENV) else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file));

    // Another subscriber already installed is not an error for a demo.
    let _ = subscriber.try_init();
    Ok(())
}

/// Restore the terminal before the default hook prints the panic.
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));
}

async fn run_demo(locator: &Locator, out: &mut impl Write) -> Result<()> {
    let mut events = EventStream::new();
    let mut state = DemoState {
        status: "Click a tab or the panel. q to quit.".to_string(),
        ..DemoState::default()
    };

    loop {
        let (width, _) = terminal::size()?;
        let frame = render(locator, &state, width);
        let clean = locator.scan(&frame);

        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        // Raw mode: line feeds do not return the carriage.
        write!(out, "{}", clean.replace('\n', "\r\n"))?;
        out.flush()?;

        let Some(event) = events.next().await else {
            return Ok(());
        };

        match event? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Tab => state.selected = (state.selected + 1) % TABS.len(),
                _ => {}
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let status = handle_click(locator, &mut state, mouse.column, mouse.row);
                state.status = status;
            }
            _ => {}
        }
    }
}

fn handle_click(locator: &Locator, state: &mut DemoState, x: u16, y: u16) -> String {
    if let Some(index) = TABS.iter().position(|tab| locator.in_bounds(tab, x, y)) {
        state.selected = index;
        tracing::info!("Tab {} clicked at ({}, {})", TABS[index], x, y);
        return format!("Selected {}", TABS[index]);
    }

    if locator.in_bounds(PANEL, x, y) {
        if let Some((local_x, local_y)) = locator.local_position(PANEL, x, y) {
            return format!("Panel clicked at local ({local_x}, {local_y})");
        }
    }

    format!("Nothing at ({x}, {y})")
}

fn render(locator: &Locator, state: &DemoState, width: u16) -> String {
    let navbar = TABS
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let label = format!(" {tab} ");
            let styled = if i == state.selected {
                label.black().on_cyan().bold().to_string()
            } else {
                label.dark_grey().to_string()
            };
            locator.wrap(tab, &styled)
        })
        .collect::<Vec<_>>()
        .join(" ");

    let rule = "─".repeat(usize::from(width));
    let panel = locator.wrap(PANEL, &panel_block(TABS[state.selected], 40));

    format!(
        "{navbar}\n{}\n{panel}\n\n{}",
        rule.dark_grey(),
        state.status.clone().italic()
    )
}

/// A boxed block with every line padded to the same width.
fn panel_block(title: &str, inner_width: usize) -> String {
    let lines = [
        format!("view: {title}"),
        String::new(),
        "Markers survive styling and are".to_string(),
        "stripped right before printing.".to_string(),
    ];

    let mut block = format!("┌{}┐", "─".repeat(inner_width));
    for line in lines {
        let pad = inner_width.saturating_sub(region_locator::display_width(&line) + 1);
        block.push_str(&format!("\n│ {line}{}│", " ".repeat(pad)));
    }
    block.push_str(&format!("\n└{}┘", "─".repeat(inner_width)));
    block
}
