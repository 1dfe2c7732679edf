use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::components::date_input::DateInputState;

pub enum DatePickerAction {
    Cancel,
    Select(NaiveDate),
}

pub struct DatePickerState {
    input: DateInputState,
}

impl DatePickerState {
    pub fn new(current: NaiveDate) -> Self {
        Self {
            input: DateInputState::new(current),
        }
    }
}

pub fn render_date_picker<B: Backend>(f: &mut Frame<B>, state: &mut DatePickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(f.size());

    let title = Paragraph::new("Select Ledger Date")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let body = Paragraph::new(vec![
        Spans::from(Span::styled(
            state.input.get_display_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from(state.input.date.format("%A, %B %-d, %Y").to_string()),
    ])
    .block(Block::default().borders(Borders::ALL).title("Date"));
    f.render_widget(body, chunks[1]);

    let help = Paragraph::new("Digits - Type | Left/Right - Segment | +/- - Day | N - Today | Enter - Open | Esc - Cancel")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut DatePickerState) -> Result<Option<DatePickerAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => return Ok(Some(DatePickerAction::Cancel)),
            KeyCode::Enter => return Ok(Some(DatePickerAction::Select(state.input.date))),
            KeyCode::Char('n') => {
                state.input = DateInputState::new(Local::now().date_naive());
            }
            code => state.input.handle_input(code),
        }
    }

    Ok(None)
}
