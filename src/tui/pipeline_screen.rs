use crate::api::ApiClient;
use crate::pipeline::reorder::{propose_move, ReorderProposal};
use crate::pipeline::validate::{unresolved_references, validate_order};
use crate::pipeline::{save_pipeline_file, PipelineConfig, StepName};
use crate::shared::timers::{Debouncer, SEARCH_DEBOUNCE_MS};
use crate::tui::template_screen::{run_template_tui, TemplateScreenState};
use crate::tui::{centered_rect, head_for_display, main_panel_block, tail_for_display};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Padding, Paragraph, Row, Table};
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;

const CONFIRM_OPTIONS: [&str; 2] = ["Apply anyway", "Cancel"];

/// A confirmation the user must answer before the screen proceeds: either a
/// reorder whose proposed order has warnings, or a save attempted while the
/// current order has warnings.
#[derive(Debug, Clone)]
pub enum PendingConfirm {
    Reorder(ReorderProposal),
    Save(Vec<String>),
}

/// The document search overlay: query text plus the debounce handle that
/// paces backend requests while the user is still typing.
#[derive(Debug)]
pub struct SearchState {
    pub query: String,
    pub debouncer: Debouncer,
    pub results: Vec<String>,
    pub searched: bool,
}

impl SearchState {
    fn new() -> Self {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(SEARCH_DEBOUNCE_MS),
            results: Vec::new(),
            searched: false,
        }
    }
}

#[derive(Debug)]
pub struct PipelineScreenState {
    pub pipeline: PipelineConfig,
    pub tool_names: Vec<String>,
    pub pipeline_path: PathBuf,
    pub selected: usize,
    pub status: String,
    pub dirty: bool,
    pub confirm: Option<(PendingConfirm, usize)>,
    pub search: Option<SearchState>,
}

impl PipelineScreenState {
    pub fn new(pipeline: PipelineConfig, tool_names: Vec<String>, pipeline_path: PathBuf) -> Self {
        Self {
            pipeline,
            tool_names,
            pipeline_path,
            selected: 0,
            status: "ready".to_string(),
            dirty: false,
            confirm: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineAction {
    MovePrev,
    MoveNext,
    StepUp,
    StepDown,
    EditTemplate,
    AddStep,
    DeleteStep,
    RenameStep,
    Save,
    OpenSearch,
    Quit,
    ConfirmPrev,
    ConfirmNext,
    ConfirmChoose,
    ConfirmDismiss,
}

/// Key mapping is context-sensitive: while a confirmation modal is open only
/// the modal keys are live.
pub fn pipeline_action_for_key(key: KeyEvent, confirm_open: bool) -> Option<PipelineAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(PipelineAction::Quit);
    }
    if confirm_open {
        return match key.code {
            KeyCode::Up => Some(PipelineAction::ConfirmPrev),
            KeyCode::Down => Some(PipelineAction::ConfirmNext),
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                Some(PipelineAction::ConfirmChoose)
            }
            KeyCode::Esc => Some(PipelineAction::ConfirmDismiss),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Up => Some(PipelineAction::MovePrev),
        KeyCode::Down => Some(PipelineAction::MoveNext),
        KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') | KeyCode::Char('e') => {
            Some(PipelineAction::EditTemplate)
        }
        KeyCode::Char('u') => Some(PipelineAction::StepUp),
        KeyCode::Char('d') => Some(PipelineAction::StepDown),
        KeyCode::Char('a') => Some(PipelineAction::AddStep),
        KeyCode::Char('x') => Some(PipelineAction::DeleteStep),
        KeyCode::Char('r') => Some(PipelineAction::RenameStep),
        KeyCode::Char('s') => Some(PipelineAction::Save),
        KeyCode::Char('/') => Some(PipelineAction::OpenSearch),
        KeyCode::Esc | KeyCode::Char('q') => Some(PipelineAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Input(char),
    Backspace,
    Close,
}

/// Key mapping while the search overlay is open. Ctrl-C closes the overlay
/// rather than the editor; a second Ctrl-C then quits.
pub fn search_action_for_key(key: KeyEvent) -> Option<SearchAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(SearchAction::Close),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(SearchAction::Close),
        KeyCode::Backspace => Some(SearchAction::Backspace),
        KeyCode::Char(ch) => Some(SearchAction::Input(ch)),
        _ => None,
    }
}

pub fn apply_search_action(state: &mut PipelineScreenState, action: SearchAction, now_ms: i64) {
    let Some(search) = state.search.as_mut() else {
        return;
    };
    match action {
        SearchAction::Input(ch) => {
            search.query.push(ch);
            search.debouncer.input(&search.query, now_ms);
        }
        SearchAction::Backspace => {
            search.query.pop();
            if search.query.is_empty() {
                search.debouncer.cancel();
                search.results.clear();
                search.searched = false;
            } else {
                search.debouncer.input(&search.query, now_ms);
            }
        }
        SearchAction::Close => {
            state.search = None;
            state.status = "search closed".to_string();
        }
    }
}

/// The query once typing has settled, at most once per settle. The caller
/// runs the actual request and reports through [`set_search_results`].
pub fn settled_search_query(state: &mut PipelineScreenState, now_ms: i64) -> Option<String> {
    state.search.as_mut()?.debouncer.poll(now_ms)
}

pub fn set_search_results(state: &mut PipelineScreenState, results: Vec<String>) {
    if let Some(search) = state.search.as_mut() {
        search.results = results;
        search.searched = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEffect {
    None,
    EditTemplate(usize),
    PromptAddStep,
    PromptRenameStep(usize),
    SaveNow,
    Quit,
}

pub fn apply_pipeline_action(
    state: &mut PipelineScreenState,
    action: PipelineAction,
) -> ScreenEffect {
    let step_count = state.pipeline.steps.len();
    if state.confirm.is_some() {
        return apply_confirm_action(state, action);
    }
    match action {
        PipelineAction::MovePrev => {
            state.selected = state.selected.saturating_sub(1);
        }
        PipelineAction::MoveNext => {
            state.selected = (state.selected + 1).min(step_count.saturating_sub(1));
        }
        PipelineAction::StepUp | PipelineAction::StepDown => {
            let target = if action == PipelineAction::StepUp {
                state.selected.checked_sub(1)
            } else {
                Some(state.selected + 1)
            };
            let Some(target) = target else {
                state.status = "already at the top".to_string();
                return ScreenEffect::None;
            };
            let Some(proposal) = propose_move(&state.pipeline.steps, state.selected, target)
            else {
                state.status = "cannot move step there".to_string();
                return ScreenEffect::None;
            };
            if proposal.is_clean() {
                state.pipeline.steps = proposal.commit();
                state.selected = target;
                state.dirty = true;
                state.status = "step moved".to_string();
            } else {
                // invalid order: hold the proposal open for explicit confirmation
                state.confirm = Some((PendingConfirm::Reorder(proposal), 1));
                state.status = "proposed order has warnings".to_string();
            }
        }
        PipelineAction::EditTemplate => {
            if step_count == 0 {
                state.status = "no steps to edit".to_string();
                return ScreenEffect::None;
            }
            return ScreenEffect::EditTemplate(state.selected);
        }
        PipelineAction::AddStep => return ScreenEffect::PromptAddStep,
        PipelineAction::DeleteStep => {
            match state.pipeline.remove_step(state.selected) {
                Some(removed) => {
                    state.selected = state
                        .selected
                        .min(state.pipeline.steps.len().saturating_sub(1));
                    state.dirty = true;
                    state.status = format!("deleted step `{}`", removed.step_name);
                }
                None => state.status = "no step selected".to_string(),
            }
        }
        PipelineAction::RenameStep => {
            if step_count == 0 {
                state.status = "no steps to rename".to_string();
                return ScreenEffect::None;
            }
            return ScreenEffect::PromptRenameStep(state.selected);
        }
        PipelineAction::Save => {
            let validation = validate_order(&state.pipeline.steps);
            if validation.is_valid {
                return ScreenEffect::SaveNow;
            }
            state.confirm = Some((PendingConfirm::Save(validation.warnings), 1));
            state.status = "current order has warnings".to_string();
        }
        PipelineAction::OpenSearch => {
            state.search = Some(SearchState::new());
            state.status = "document search open".to_string();
        }
        PipelineAction::Quit => return ScreenEffect::Quit,
        PipelineAction::ConfirmPrev
        | PipelineAction::ConfirmNext
        | PipelineAction::ConfirmChoose
        | PipelineAction::ConfirmDismiss => {}
    }
    ScreenEffect::None
}

fn apply_confirm_action(state: &mut PipelineScreenState, action: PipelineAction) -> ScreenEffect {
    let Some((pending, option)) = state.confirm.take() else {
        return ScreenEffect::None;
    };
    match action {
        PipelineAction::ConfirmPrev => {
            state.confirm = Some((pending, option.saturating_sub(1)));
        }
        PipelineAction::ConfirmNext => {
            state.confirm = Some((pending, (option + 1).min(CONFIRM_OPTIONS.len() - 1)));
        }
        PipelineAction::ConfirmDismiss | PipelineAction::Quit => {
            state.status = "canceled".to_string();
        }
        PipelineAction::ConfirmChoose => match pending {
            PendingConfirm::Reorder(proposal) => {
                if option == 0 {
                    state.pipeline.steps = proposal.commit();
                    state.selected = state
                        .selected
                        .min(state.pipeline.steps.len().saturating_sub(1));
                    state.dirty = true;
                    state.status = "reorder applied despite warnings".to_string();
                } else {
                    state.status = "reorder discarded".to_string();
                }
            }
            PendingConfirm::Save(_) => {
                if option == 0 {
                    state.status = "saving despite warnings".to_string();
                    return ScreenEffect::SaveNow;
                }
                state.status = "save canceled".to_string();
            }
        },
        _ => {
            state.confirm = Some((pending, option));
        }
    }
    ScreenEffect::None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRowViewModel {
    pub position: String,
    pub name: String,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmViewModel {
    pub title: String,
    pub warnings: Vec<String>,
    pub options: Vec<String>,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchViewModel {
    pub query: String,
    pub results: Vec<String>,
    pub pending: bool,
    pub searched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineViewModel {
    pub title: String,
    pub rows: Vec<StepRowViewModel>,
    pub selected: usize,
    pub status_text: String,
    pub hint_text: String,
    pub confirm: Option<ConfirmViewModel>,
    pub search: Option<SearchViewModel>,
}

pub fn project_pipeline_view_model(state: &PipelineScreenState) -> PipelineViewModel {
    let rows = state
        .pipeline
        .steps
        .iter()
        .map(|step| StepRowViewModel {
            position: step.order.to_string(),
            name: step.step_name.to_string(),
            preview: head_for_display(&step.user_prompt_template, 48),
        })
        .collect();
    let confirm = state
        .confirm
        .as_ref()
        .map(|(pending, selected)| match pending {
            PendingConfirm::Reorder(proposal) => ConfirmViewModel {
                title: "Proposed order has warnings".to_string(),
                warnings: proposal.warnings().to_vec(),
                options: CONFIRM_OPTIONS.iter().map(|o| (*o).to_string()).collect(),
                selected: *selected,
            },
            PendingConfirm::Save(warnings) => ConfirmViewModel {
                title: "Current order has warnings".to_string(),
                warnings: warnings.clone(),
                options: CONFIRM_OPTIONS.iter().map(|o| (*o).to_string()).collect(),
                selected: *selected,
            },
        });
    let search = state.search.as_ref().map(|search| SearchViewModel {
        query: search.query.clone(),
        results: search.results.clone(),
        pending: search.debouncer.is_pending(),
        searched: search.searched,
    });
    let unresolved = unresolved_references(&state.pipeline.steps).len();
    let mut status_text = state.status.clone();
    if unresolved > 0 {
        status_text = format!("{status_text} ({unresolved} unresolved reference(s))");
    }
    PipelineViewModel {
        title: format!(
            "Research Flow Pipeline - {}{}",
            state.pipeline_path.display(),
            if state.dirty { " *" } else { "" }
        ),
        rows,
        selected: state.selected.min(state.pipeline.steps.len().saturating_sub(1)),
        status_text,
        hint_text:
            "up/down select · enter edit template · u/d move step · a add · x delete · r rename · s save · / search docs · esc quit"
                .to_string(),
        confirm,
        search,
    }
}

fn draw_pipeline_screen(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view_model: &PipelineViewModel,
) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(8),
                    Constraint::Length(4),
                ])
                .split(frame.area());
            let header = Paragraph::new(Line::from(Span::styled(
                view_model.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let table_rows = view_model.rows.iter().enumerate().map(|(idx, row)| {
                let style = if idx == view_model.selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(row.position.clone()),
                    Cell::from(row.name.clone()),
                    Cell::from(row.preview.clone()),
                ])
                .style(style)
            });
            let table = Table::new(
                table_rows,
                [
                    Constraint::Length(4),
                    Constraint::Percentage(25),
                    Constraint::Percentage(70),
                ],
            )
            .column_spacing(2)
            .block(main_panel_block());
            frame.render_widget(table, chunks[1]);

            let footer = Paragraph::new(vec![
                Line::from(view_model.hint_text.clone()),
                Line::from(format!("Status: {}", view_model.status_text)),
            ])
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(footer, chunks[2]);

            if let Some(confirm) = &view_model.confirm {
                let area = centered_rect(70, 60, frame.area());
                frame.render_widget(Clear, area);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::new(2, 2, 1, 1))
                    .title(confirm.title.clone());
                frame.render_widget(block.clone(), area);
                let inner = block.inner(area);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(2), Constraint::Length(3)])
                    .split(inner);
                let warning_items: Vec<ListItem> = confirm
                    .warnings
                    .iter()
                    .map(|warning| {
                        ListItem::new(Line::from(Span::styled(
                            warning.clone(),
                            Style::default().fg(Color::Red),
                        )))
                    })
                    .collect();
                frame.render_widget(List::new(warning_items), rows[0]);
                let option_items: Vec<ListItem> = confirm
                    .options
                    .iter()
                    .enumerate()
                    .map(|(idx, option)| {
                        let mut item = ListItem::new(Line::from(Span::raw(option.clone())));
                        if idx == confirm.selected {
                            item = item.style(
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            );
                        }
                        item
                    })
                    .collect();
                frame.render_widget(List::new(option_items), rows[1]);
            }

            if let Some(search) = &view_model.search {
                let area = centered_rect(70, 60, frame.area());
                frame.render_widget(Clear, area);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::new(2, 2, 1, 1))
                    .title("Search documents");
                frame.render_widget(block.clone(), area);
                let inner = block.inner(area);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Min(1),
                    ])
                    .split(inner);
                frame.render_widget(
                    Paragraph::new(Line::from(format!("> {}", search.query))),
                    rows[0],
                );
                let hint = if search.pending {
                    "searching"
                } else {
                    "type to search · esc close"
                };
                frame.render_widget(Paragraph::new(hint), rows[1]);
                let items: Vec<ListItem> = if search.searched && search.results.is_empty() {
                    vec![ListItem::new(Line::from(Span::raw("no matching documents")))]
                } else {
                    search
                        .results
                        .iter()
                        .map(|title| ListItem::new(Line::from(Span::raw(title.clone()))))
                        .collect()
                };
                frame.render_widget(List::new(items), rows[2]);
            }
        })
        .map_err(|e| format!("failed to render pipeline screen: {e}"))?;
    Ok(())
}

/// Runs the settled search query against the backend, when one is due.
fn run_document_search(
    state: &mut PipelineScreenState,
    client: Option<&ApiClient>,
    query: &str,
) {
    match client {
        Some(client) => match client.search_documents(query) {
            Ok(documents) => {
                let results = documents
                    .into_iter()
                    .map(|document| {
                        if document.title.is_empty() {
                            document.id
                        } else {
                            document.title
                        }
                    })
                    .collect();
                set_search_results(state, results);
            }
            Err(err) => {
                state.status = format!("document search failed: {err}");
                set_search_results(state, Vec::new());
            }
        },
        None => {
            state.status = "document search requires an api token".to_string();
            set_search_results(state, Vec::new());
        }
    }
}

pub(crate) fn run_pipeline_tui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut PipelineScreenState,
    client: Option<&ApiClient>,
) -> Result<String, String> {
    loop {
        let view_model = project_pipeline_view_model(state);
        draw_pipeline_screen(terminal, &view_model)?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        if let Some(query) = settled_search_query(state, now_ms) {
            run_document_search(state, client, &query);
            continue;
        }
        // short poll so the debouncer fires between keystrokes
        let ready = event::poll(std::time::Duration::from_millis(100))
            .map_err(|e| format!("failed to poll editor input: {e}"))?;
        if !ready {
            continue;
        }
        let ev = event::read().map_err(|e| format!("failed to read editor input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        if state.search.is_some() {
            if let Some(action) = search_action_for_key(key) {
                apply_search_action(state, action, now_ms);
            }
            continue;
        }
        let Some(action) = pipeline_action_for_key(key, state.confirm.is_some()) else {
            continue;
        };
        match apply_pipeline_action(state, action) {
            ScreenEffect::None => {}
            ScreenEffect::EditTemplate(index) => {
                let vocabulary = state
                    .pipeline
                    .vocabulary_for_step(index, &state.tool_names);
                let step = &state.pipeline.steps[index];
                let mut template_state = TemplateScreenState::new(
                    step.step_name.to_string(),
                    &step.user_prompt_template,
                    vocabulary,
                );
                if let Some(template) = run_template_tui(terminal, &mut template_state)? {
                    if state.pipeline.steps[index].user_prompt_template != template {
                        state.pipeline.steps[index].user_prompt_template = template;
                        state.dirty = true;
                    }
                    state.status = format!(
                        "updated template for `{}`",
                        state.pipeline.steps[index].step_name
                    );
                } else {
                    state.status = "template edit canceled".to_string();
                }
            }
            ScreenEffect::PromptAddStep => {
                if let Some(raw) = prompt_line_tui(terminal, "Add step", "Step name:", "")? {
                    match StepName::parse(raw.trim())
                        .and_then(|name| state.pipeline.add_step(name))
                    {
                        Ok(index) => {
                            state.selected = index;
                            state.dirty = true;
                            state.status = "step added".to_string();
                        }
                        Err(err) => state.status = err,
                    }
                } else {
                    state.status = "add step canceled".to_string();
                }
            }
            ScreenEffect::PromptRenameStep(index) => {
                let initial = state.pipeline.steps[index].step_name.to_string();
                if let Some(raw) =
                    prompt_line_tui(terminal, "Rename step", "Step name:", &initial)?
                {
                    match StepName::parse(raw.trim())
                        .and_then(|name| state.pipeline.rename_step(index, name))
                    {
                        Ok(()) => {
                            state.dirty = true;
                            state.status = "step renamed".to_string();
                        }
                        Err(err) => state.status = err,
                    }
                } else {
                    state.status = "rename canceled".to_string();
                }
            }
            ScreenEffect::SaveNow => {
                save_current_pipeline(state)?;
            }
            ScreenEffect::Quit => {
                return Ok(if state.dirty {
                    "closed pipeline editor (unsaved changes discarded)".to_string()
                } else {
                    "closed pipeline editor".to_string()
                });
            }
        }
    }
}

fn save_current_pipeline(state: &mut PipelineScreenState) -> Result<(), String> {
    state.pipeline.renumber();
    save_pipeline_file(&state.pipeline_path, &state.pipeline).map_err(|err| err.to_string())?;
    state.dirty = false;
    state.status = format!("saved {}", state.pipeline_path.display());
    Ok(())
}

/// Scripted driver for tests and non-interactive smoke runs: replays key
/// events against the pure action machinery. Prompt and template-editor
/// effects are not supported here.
pub fn run_pipeline_scripted(
    state: &mut PipelineScreenState,
    keys: Vec<KeyEvent>,
) -> Result<String, String> {
    for key in keys {
        if state.search.is_some() {
            let now_ms = chrono::Utc::now().timestamp_millis();
            if let Some(action) = search_action_for_key(key) {
                apply_search_action(state, action, now_ms);
            }
            continue;
        }
        let Some(action) = pipeline_action_for_key(key, state.confirm.is_some()) else {
            continue;
        };
        match apply_pipeline_action(state, action) {
            ScreenEffect::None => {}
            ScreenEffect::EditTemplate(_) => {
                return Err("scripted editor does not support template editing".to_string());
            }
            ScreenEffect::PromptAddStep | ScreenEffect::PromptRenameStep(_) => {
                return Err("scripted editor does not support prompt actions".to_string());
            }
            ScreenEffect::SaveNow => save_current_pipeline(state)?,
            ScreenEffect::Quit => return Ok(state.status.clone()),
        }
    }
    Err("scripted editor input did not terminate; include esc".to_string())
}

fn prompt_line_tui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    title: &str,
    prompt: &str,
    initial: &str,
) -> Result<Option<String>, String> {
    let mut value = initial.to_string();
    loop {
        terminal
            .draw(|frame| {
                let area = centered_rect(70, 30, frame.area());
                frame.render_widget(Clear, area);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::new(2, 2, 1, 1));
                frame.render_widget(block.clone(), area);
                let inner = block.inner(area);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Length(1),
                        Constraint::Min(1),
                    ])
                    .split(inner);
                let max_input_width = rows[2].width.saturating_sub(2) as usize;
                let display_value = tail_for_display(&value, max_input_width);
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        title,
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))),
                    rows[0],
                );
                frame.render_widget(Paragraph::new(prompt), rows[1]);
                frame.render_widget(
                    Paragraph::new(Line::from(format!("> {display_value}"))),
                    rows[2],
                );
                frame.render_widget(Paragraph::new("Enter apply, Esc cancel"), rows[3]);
            })
            .map_err(|e| format!("failed to render prompt: {e}"))?;
        let ev = event::read().map_err(|e| format!("failed to read prompt input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        match key.code {
            KeyCode::Esc => return Ok(None),
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => return Ok(Some(value)),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => value.push(ch),
            _ => {}
        }
    }
}
