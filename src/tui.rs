use crate::api::ApiClient;
use crate::pipeline::{load_pipeline_file, PipelineConfig};
use crate::tui::pipeline_screen::{run_pipeline_scripted, run_pipeline_tui, PipelineScreenState};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders, Padding};
use ratatui::Terminal;
use std::io::{self, IsTerminal};
use std::path::Path;

pub mod pipeline_screen;
pub mod template_screen;

/// Opens the pipeline editor over `pipeline_path`. A missing file starts an
/// empty pipeline; nothing is written until the user saves. Without a client
/// the editor works offline and document search is unavailable.
pub fn run_editor(
    pipeline_path: &Path,
    tool_names: Vec<String>,
    client: Option<ApiClient>,
) -> Result<String, String> {
    let pipeline = if pipeline_path.exists() {
        load_pipeline_file(pipeline_path).map_err(|err| err.to_string())?
    } else {
        PipelineConfig::default()
    };
    let mut state =
        PipelineScreenState::new(pipeline, tool_names, pipeline_path.to_path_buf());

    if let Some(keys) = load_scripted_editor_keys()? {
        return run_pipeline_scripted(&mut state, keys);
    }
    if !is_interactive() {
        return Err("pipeline editor requires an interactive terminal".to_string());
    }

    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste, Hide)
        .map_err(|e| format!("failed to enter editor screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create editor terminal: {e}"))?;
    let result = run_pipeline_tui(&mut terminal, &mut state, client.as_ref());
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(
        terminal.backend_mut(),
        Show,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )
    .map_err(|e| format!("failed to leave editor screen: {e}"))?;
    result
}

fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn load_scripted_editor_keys() -> Result<Option<Vec<crossterm::event::KeyEvent>>, String> {
    let Ok(raw) = std::env::var("RESEARCHFLOW_EDIT_SCRIPT_KEYS") else {
        return Ok(None);
    };
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let normalized = token.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let key = match normalized.as_str() {
            "up" => crossterm::event::KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => crossterm::event::KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "enter" => crossterm::event::KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "esc" => crossterm::event::KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "ctrl-c" => crossterm::event::KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            "u" => crossterm::event::KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE),
            "d" => crossterm::event::KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE),
            "x" => crossterm::event::KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE),
            "s" => crossterm::event::KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE),
            other => {
                return Err(format!(
                    "invalid RESEARCHFLOW_EDIT_SCRIPT_KEYS token `{other}`; valid tokens: up,down,enter,esc,ctrl-c,u,d,x,s"
                ));
            }
        };
        keys.push(key);
    }
    Ok(Some(keys))
}

pub fn tail_for_display(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max_chars {
        return value.to_string();
    }
    chars[chars.len() - max_chars..].iter().collect()
}

pub fn head_for_display(value: &str, max_chars: usize) -> String {
    let first_line = value.lines().next().unwrap_or_default();
    let chars: Vec<char> = first_line.chars().collect();
    if chars.len() <= max_chars {
        return first_line.to_string();
    }
    let mut head: String = chars[..max_chars.saturating_sub(1)].iter().collect();
    head.push('…');
    head
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub(crate) fn main_panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(3, 3, 1, 1))
}
