use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(&self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn next(&self) -> Self {
        match self {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        }
    }

    fn previous(&self) -> Self {
        match self {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        }
    }
}

/// Segment-by-segment date entry: digits fill the active part, which is
/// applied once complete if the resulting date exists.
pub struct DateInputState {
    pub date: NaiveDate,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = self.date_part.next();
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = self.date_part.previous();
        self.current_date_input.clear();
    }

    pub fn shift_days(&mut self, days: i64) {
        if let Some(date) = self.date.checked_add_signed(Duration::days(days)) {
            self.date = date;
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                if self.current_date_input.len() == self.date_part.width() {
                    self.apply_segment();
                    self.current_date_input.clear();
                }
            }
            KeyCode::Char('+') => self.shift_days(1),
            KeyCode::Char('-') => self.shift_days(-1),
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right | KeyCode::Tab => self.next_date_part(),
            KeyCode::Left | KeyCode::BackTab => self.previous_date_part(),
            _ => {}
        }
    }

    fn apply_segment(&mut self) {
        let Ok(value) = self.current_date_input.parse::<u32>() else {
            return;
        };
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());

        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => NaiveDate::from_ymd_opt(value as i32, month, day),
            DatePart::Month => NaiveDate::from_ymd_opt(year, value, day),
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            _ => None,
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    pub fn get_display_string(&self) -> String {
        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());

        let active = if self.current_date_input.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.current_date_input)
        };

        match self.date_part {
            DatePart::Year => format!("{}-{}-{}", active, month, day),
            DatePart::Month => format!("{}-{}-{}", year, active, day),
            DatePart::Day => format!("{}-{}-{}", year, month, active),
        }
    }
}
