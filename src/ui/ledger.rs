use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use uuid::Uuid;

use crate::billing::{format_inr, parse_amount, row_total};
use crate::ledger::{LedgerStore, SyncStatus};
use crate::models::LineItem;
use crate::words::amount_in_words;

// Represents the state of the day ledger screen
pub struct LedgerState {
    table_state: TableState,
    confirm_clear: bool,
    message: Option<String>,
}

pub enum LedgerAction {
    Quit,
    AddRow,
    EditRow(Uuid),
    DeleteRow(Uuid),
    ClearDay,
    Export,
    PickDate,
    Reload,
    DismissError,
    AddSamples,
}

impl LedgerState {
    pub fn new() -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            table_state,
            confirm_clear: false,
            message: None,
        }
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_last(&mut self, len: usize) {
        self.table_state.select(len.checked_sub(1));
    }

    /// Keeps the selection inside the table after rows disappear.
    pub fn clamp(&mut self, len: usize) {
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn selected_id(&self, rows: &[LineItem]) -> Option<Uuid> {
        self.selected_index().and_then(|i| rows.get(i)).map(|r| r.id)
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

fn fee_cell(include: bool, text: &str) -> String {
    if include {
        format_inr(parse_amount(text))
    } else {
        "-".to_string()
    }
}

fn status_style(status: SyncStatus) -> Style {
    match status {
        SyncStatus::LocalOnly => Style::default().fg(Color::Gray),
        SyncStatus::Syncing => Style::default().fg(Color::Cyan),
        SyncStatus::Error => Style::default().fg(Color::Red),
        SyncStatus::Active => Style::default().fg(Color::Green),
    }
}

pub fn render_ledger<B: Backend>(frame: &mut Frame<B>, state: &mut LedgerState, store: &LedgerStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    // Title bar with the day and the mirror status
    let status = store.sync_status();
    let title = Paragraph::new(Spans::from(vec![
        Span::styled(
            format!("OPD Ledger | {}", store.date().format("%A, %B %-d, %Y")),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        if store.loading() {
            Span::styled("Loading...", Style::default().fg(Color::Gray))
        } else {
            Span::styled(status.label(), status_style(status))
        },
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let header_cells = ["#", "Patient", "Review", "Free", "Amount", "2E", "Lab", "Extra", "Total", "Sync"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = store.rows().iter().enumerate().map(|(i, item)| {
        let amount = if item.is_free {
            "FREE".to_string()
        } else {
            format_inr(parse_amount(&item.amount))
        };
        let cells = vec![
            Cell::from((i + 1).to_string()),
            Cell::from(item.name.clone()),
            Cell::from(item.review_type.clone()),
            Cell::from(if item.is_free { "Yes" } else { "No" }),
            Cell::from(amount),
            Cell::from(fee_cell(item.include_procedure, &item.procedure_fee)),
            Cell::from(fee_cell(item.include_lab, &item.test_fee)),
            Cell::from(fee_cell(item.include_extra, &item.extra_fee)),
            Cell::from(format_inr(row_total(item))),
            Cell::from(if item.synced { "ok" } else { "local" }),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Patients").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(4),
            Constraint::Percentage(22),
            Constraint::Percentage(12),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(6),
        ]);
    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    // Totals, plus whatever needs the user's attention
    let total = store.daily_total();
    let mode = if store.remote_enabled() { "Cloud Sync" } else { "Local Only" };
    let mut lines = vec![
        Spans::from(format!("Patients: {} | {}", store.rows().len(), mode)),
        Spans::from(vec![
            Span::raw("Daily Total: "),
            Span::styled(format_inr(total), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Spans::from(format!("In words: {}", amount_in_words(total))),
    ];
    if let Some(error) = store.last_error() {
        lines.push(Spans::from(Span::styled(
            format!("{} (<Z> dismiss)", error),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(message) = &state.message {
        lines.push(Spans::from(Span::styled(message.as_str(), Style::default().fg(Color::Green))));
    }
    let totals = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(totals, chunks[2]);

    let help_text = if state.confirm_clear {
        "Clear every record for this day? <Y> Yes | any other key cancels"
    } else {
        "<A> Add | <E> Edit | <D> Delete | <C> Clear day | <X> Export | <T> Date | <S> Sample data | <R> Reload | <Q> Quit"
    };
    let help_style = if state.confirm_clear {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

pub fn handle_input(state: &mut LedgerState, store: &LedgerStore) -> Result<Option<LedgerAction>> {
    let rows = store.rows();

    if let Event::Key(key) = event::read()? {
        if state.confirm_clear {
            state.confirm_clear = false;
            if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
                return Ok(Some(LedgerAction::ClearDay));
            }
            return Ok(None);
        }

        state.message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                return Ok(Some(LedgerAction::Quit));
            }
            KeyCode::Char('a') => {
                return Ok(Some(LedgerAction::AddRow));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = state.selected_id(rows) {
                    return Ok(Some(LedgerAction::EditRow(id)));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = state.selected_id(rows) {
                    return Ok(Some(LedgerAction::DeleteRow(id)));
                }
            }
            KeyCode::Char('c') => {
                state.confirm_clear = true;
            }
            KeyCode::Char('x') => {
                return Ok(Some(LedgerAction::Export));
            }
            KeyCode::Char('t') => {
                return Ok(Some(LedgerAction::PickDate));
            }
            KeyCode::Char('r') => {
                return Ok(Some(LedgerAction::Reload));
            }
            KeyCode::Char('z') => {
                return Ok(Some(LedgerAction::DismissError));
            }
            KeyCode::Char('s') => {
                return Ok(Some(LedgerAction::AddSamples));
            }
            KeyCode::Down => {
                state.next(rows.len());
            }
            KeyCode::Up => {
                state.previous(rows.len());
            }
            _ => {}
        }
    }
    Ok(None)
}
