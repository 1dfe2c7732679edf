use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::billing::{format_inr, row_total};
use crate::models::{LineItem, LineItemPatch};

pub enum RowEditorAction {
    Cancel,
    Save(Uuid, LineItemPatch),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RowField {
    Name,
    Review,
    Free,
    Amount,
    IncludeProcedure,
    ProcedureFee,
    IncludeLab,
    TestFee,
    Observations,
    IncludeExtra,
    ExtraFee,
}

const FIELDS: [RowField; 11] = [
    RowField::Name,
    RowField::Review,
    RowField::Free,
    RowField::Amount,
    RowField::IncludeProcedure,
    RowField::ProcedureFee,
    RowField::IncludeLab,
    RowField::TestFee,
    RowField::Observations,
    RowField::IncludeExtra,
    RowField::ExtraFee,
];

impl RowField {
    fn label(&self) -> &'static str {
        match self {
            RowField::Name => "Patient Name",
            RowField::Review => "Review",
            RowField::Free => "Free",
            RowField::Amount => "Amount (₹)",
            RowField::IncludeProcedure => "Include 2E",
            RowField::ProcedureFee => "2E (₹)",
            RowField::IncludeLab => "Include Lab",
            RowField::TestFee => "Lab (₹)",
            RowField::Observations => "Observations",
            RowField::IncludeExtra => "Include Extra",
            RowField::ExtraFee => "Extra (₹)",
        }
    }

    fn is_fee(&self) -> bool {
        matches!(self, RowField::Amount | RowField::ProcedureFee | RowField::TestFee | RowField::ExtraFee)
    }
}

pub struct RowEditorState {
    original: LineItem,
    pub draft: LineItem,
    pub serial: usize,
    pub current: usize,
    pub editing: bool,
}

impl RowEditorState {
    pub fn new(serial: usize, row: LineItem) -> Self {
        Self {
            original: row.clone(),
            draft: row,
            serial,
            current: 0,
            editing: false,
        }
    }

    pub fn current_field(&self) -> RowField {
        FIELDS[self.current]
    }

    pub fn next_field(&mut self) {
        self.current = (self.current + 1) % FIELDS.len();
    }

    pub fn previous_field(&mut self) {
        self.current = (self.current + FIELDS.len() - 1) % FIELDS.len();
    }

    fn flag_mut(&mut self, field: RowField) -> Option<&mut bool> {
        match field {
            RowField::Free => Some(&mut self.draft.is_free),
            RowField::IncludeProcedure => Some(&mut self.draft.include_procedure),
            RowField::IncludeLab => Some(&mut self.draft.include_lab),
            RowField::IncludeExtra => Some(&mut self.draft.include_extra),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: RowField) -> Option<&mut String> {
        match field {
            RowField::Name => Some(&mut self.draft.name),
            RowField::Review => Some(&mut self.draft.review_type),
            RowField::Amount => Some(&mut self.draft.amount),
            RowField::ProcedureFee => Some(&mut self.draft.procedure_fee),
            RowField::TestFee => Some(&mut self.draft.test_fee),
            RowField::Observations => Some(&mut self.draft.observations),
            RowField::ExtraFee => Some(&mut self.draft.extra_fee),
            _ => None,
        }
    }

    /// Enter on a checkbox flips it; on a text field it starts or ends
    /// editing.
    pub fn activate(&mut self) {
        let field = self.current_field();
        if let Some(flag) = self.flag_mut(field) {
            *flag = !*flag;
        } else {
            self.editing = !self.editing;
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        let field = self.current_field();
        let Some(value) = self.text_mut(field) else {
            return;
        };

        match key {
            KeyCode::Char(c) if !field.is_fee() => value.push(c),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => {}
        }
    }

    fn display_value(&self, field: RowField) -> String {
        let flag = |on: bool| if on { "[x]" } else { "[ ]" }.to_string();
        match field {
            RowField::Name => self.draft.name.clone(),
            RowField::Review => self.draft.review_type.clone(),
            RowField::Free => flag(self.draft.is_free),
            RowField::Amount => self.draft.amount.clone(),
            RowField::IncludeProcedure => flag(self.draft.include_procedure),
            RowField::ProcedureFee => self.draft.procedure_fee.clone(),
            RowField::IncludeLab => flag(self.draft.include_lab),
            RowField::TestFee => self.draft.test_fee.clone(),
            RowField::Observations => self.draft.observations.clone(),
            RowField::IncludeExtra => flag(self.draft.include_extra),
            RowField::ExtraFee => self.draft.extra_fee.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn patch(&self) -> LineItemPatch {
        LineItemPatch::from_item(&self.draft)
    }
}

pub fn render_row_editor<B: Backend>(f: &mut Frame<B>, state: &mut RowEditorState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(13),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(format!("Patient #{}", state.serial))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let total = Paragraph::new(format!("Row total: {}", format_inr(row_total(&state.draft))))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(total, chunks[2]);

    let help_text = if state.editing {
        "Enter - Done | Backspace - Delete"
    } else {
        "Enter - Edit/Toggle | Up/Down - Navigate fields | S - Save | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut RowEditorState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == state.current;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = state.display_value(*field);

            let value_span = if selected && state.editing {
                Span::styled(format!("{}|", value), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(value)
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                value_span,
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Visit Details"));
    f.render_widget(form, area);
}

pub fn handle_input(state: &mut RowEditorState) -> Result<Option<RowEditorAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.editing = false;
                } else {
                    return Ok(Some(RowEditorAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.activate();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down | KeyCode::Tab if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if !state.is_dirty() {
                    return Ok(Some(RowEditorAction::Cancel));
                }
                return Ok(Some(RowEditorAction::Save(state.draft.id, state.patch())));
            }
            KeyCode::Char(' ') if !state.editing => {
                state.activate();
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}
