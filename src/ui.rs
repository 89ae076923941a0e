use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

use crate::app::{App, Intent, Outcome};
use crate::form::{TaskForm, DATE_FORMAT};
use crate::render::{Body, BoardView, CardAction, CardView, ColumnView, EMPTY_COLUMN};
use crate::task::{Column, Priority};
use crate::view::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Due,
    Priority,
    Status,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Title,
        Field::Description,
        Field::Due,
        Field::Priority,
        Field::Status,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Due => "Due date",
            Field::Priority => "Priority",
            Field::Status => "Status",
        }
    }

    fn step(self, delta: isize) -> Field {
        let idx = Field::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = Field::ALL.len() as isize;
        Field::ALL[(idx + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone)]
struct FormEditor {
    form: TaskForm,
    field: Field,
}

impl FormEditor {
    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            Field::Title => Some(&mut self.form.title),
            Field::Description => Some(&mut self.form.description),
            Field::Due => Some(&mut self.form.due),
            Field::Priority | Field::Status => None,
        }
    }

    fn cycle(&mut self, delta: isize) {
        match self.field {
            Field::Priority => {
                let steps = if delta > 0 { 1 } else { 2 };
                for _ in 0..steps {
                    self.form.priority = self.form.priority.next();
                }
            }
            Field::Status => {
                let idx = self.form.status.index() as isize;
                self.form.status = Column::ALL[(idx + delta).rem_euclid(3) as usize];
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirm {
    Delete(String),
    ClearAll,
}

#[derive(Debug, Clone)]
enum Modal {
    None,
    Form(FormEditor),
    Confirm(Confirm),
    /// Blocking message; `resume` is the form to return to once dismissed.
    Alert {
        message: String,
        resume: Option<FormEditor>,
    },
    DateInput(String),
}

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Terminal-side state: cursor, open popup, card being carried.
#[derive(Debug)]
pub struct Ui {
    column: usize,
    card: usize,
    modal: Modal,
    grabbed: Option<(String, Column)>,
    status: Option<String>,
    show_descriptions: bool,
}

impl Ui {
    pub fn new(show_descriptions: bool) -> Self {
        Self {
            column: 0,
            card: 0,
            modal: Modal::None,
            grabbed: None,
            status: None,
            show_descriptions,
        }
    }

    fn clamp_cursor(&mut self, view: &BoardView) {
        let columns = view.columns();
        if columns.is_empty() {
            self.column = 0;
            self.card = 0;
            return;
        }
        self.column = self.column.min(columns.len() - 1);
        let cards = columns[self.column].cards.len();
        self.card = if cards == 0 { 0 } else { self.card.min(cards - 1) };
    }

    fn current_column(&self, view: &BoardView) -> Option<Column> {
        view.columns().get(self.column).map(|c| c.column)
    }

    fn current_card<'a>(&self, view: &'a BoardView) -> Option<&'a CardView> {
        view.columns().get(self.column)?.cards.get(self.card)
    }

    fn apply(&mut self, app: &mut App, intent: Intent) {
        match app.dispatch(intent) {
            Ok(Outcome::Rejected(e)) => {
                self.modal = Modal::Alert {
                    message: e.to_string(),
                    resume: None,
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "could not save board");
                self.status = Some(format!("save failed, change discarded: {e}"));
            }
        }
    }

    /// Handles one key press against `app`.
    pub fn handle_key(&mut self, app: &mut App, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        let modal = std::mem::replace(&mut self.modal, Modal::None);
        let control = match modal {
            Modal::None => self.handle_board_key(app, key),
            Modal::Form(editor) => {
                self.handle_form_key(app, editor, key);
                Control::Continue
            }
            Modal::Confirm(confirm) => {
                self.handle_confirm_key(app, confirm, key);
                Control::Continue
            }
            Modal::Alert { message, resume } => {
                self.modal = if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    resume.map_or(Modal::None, Modal::Form)
                } else {
                    Modal::Alert { message, resume }
                };
                Control::Continue
            }
            Modal::DateInput(buffer) => {
                self.handle_date_key(app, buffer, key);
                Control::Continue
            }
        };
        self.clamp_cursor(&app.render());
        control
    }

    fn handle_board_key(&mut self, app: &mut App, key: KeyEvent) -> Control {
        let view = app.render();
        self.clamp_cursor(&view);
        self.status = None;

        match key.code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Esc => self.grabbed = None,
            KeyCode::Char('1') | KeyCode::Char('t') => self.set_mode(app, ViewMode::Today),
            KeyCode::Char('2') | KeyCode::Char('f') => self.set_mode(app, ViewMode::Future),
            KeyCode::Char('3') | KeyCode::Char('p') => self.set_mode(app, ViewMode::Past),
            KeyCode::Char('g') if view.toolbar.date_picker_enabled => {
                let current = view.toolbar.selected_date.clone().unwrap_or_default();
                self.modal = Modal::DateInput(current);
            }
            KeyCode::Left | KeyCode::Char('h') => self.column = self.column.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.column += 1,
            KeyCode::Up | KeyCode::Char('k') => self.card = self.card.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.card += 1,
            KeyCode::Char('a') => {
                if let Some(form) = app.new_form() {
                    self.modal = Modal::Form(FormEditor {
                        form,
                        field: Field::Title,
                    });
                }
            }
            KeyCode::Char('C') => self.modal = Modal::Confirm(Confirm::ClearAll),
            KeyCode::Char(' ') => self.grab_or_drop(app, &view),
            KeyCode::Char(c) => {
                if let Some(card) = self.current_card(&view) {
                    self.card_action(app, card.clone(), c);
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn set_mode(&mut self, app: &mut App, mode: ViewMode) {
        self.grabbed = None;
        self.column = 0;
        self.card = 0;
        self.apply(app, Intent::SetMode(mode));
    }

    fn card_action(&mut self, app: &mut App, card: CardView, key: char) {
        let action = match key {
            's' => CardAction::Start,
            'm' => CardAction::Done,
            'e' => CardAction::Edit,
            'x' => CardAction::Delete,
            _ => return,
        };
        if !card.actions.contains(&action) {
            return;
        }
        match action {
            CardAction::Start => self.apply(app, Intent::Start(card.id)),
            CardAction::Done => self.apply(app, Intent::Complete(card.id)),
            CardAction::Edit => {
                if let Some(form) = app.edit_form(&card.id) {
                    self.modal = Modal::Form(FormEditor {
                        form,
                        field: Field::Title,
                    });
                }
            }
            CardAction::Delete => self.modal = Modal::Confirm(Confirm::Delete(card.id)),
        }
    }

    fn grab_or_drop(&mut self, app: &mut App, view: &BoardView) {
        let Some(target) = self.current_column(view) else {
            return;
        };
        match self.grabbed.take() {
            Some((id, from)) => self.apply(app, Intent::Move { id, from, to: target }),
            None => {
                if let Some(card) = self.current_card(view).filter(|c| c.draggable) {
                    self.status = Some(format!("Moving \"{}\": pick a column, space to drop", card.title));
                    self.grabbed = Some((card.id.clone(), target));
                }
            }
        }
    }

    fn handle_form_key(&mut self, app: &mut App, mut editor: FormEditor, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                self.apply(app, Intent::Submit(editor.form.clone()));
                if let Modal::Alert { resume, .. } = &mut self.modal {
                    *resume = Some(editor);
                }
                return;
            }
            KeyCode::Tab | KeyCode::Down => editor.field = editor.field.step(1),
            KeyCode::BackTab | KeyCode::Up => editor.field = editor.field.step(-1),
            KeyCode::Left => editor.cycle(-1),
            KeyCode::Right => editor.cycle(1),
            KeyCode::Backspace => {
                if let Some(text) = editor.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match editor.text_mut() {
                    Some(text) => text.push(c),
                    None if c == ' ' => editor.cycle(1),
                    None => {}
                }
            }
            _ => {}
        }
        self.modal = Modal::Form(editor);
    }

    fn handle_confirm_key(&mut self, app: &mut App, confirm: Confirm, key: KeyEvent) {
        let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter);
        let intent = match confirm {
            Confirm::Delete(id) => Intent::Delete { id, confirmed },
            Confirm::ClearAll => Intent::ClearAll { confirmed },
        };
        self.apply(app, intent);
    }

    fn handle_date_key(&mut self, app: &mut App, mut buffer: String, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let text = buffer.trim();
                if text.is_empty() {
                    self.apply(app, Intent::SelectDate(None));
                    return;
                }
                match NaiveDate::parse_from_str(text, DATE_FORMAT) {
                    Ok(date) => {
                        self.column = 0;
                        self.card = 0;
                        self.apply(app, Intent::SelectDate(Some(date)));
                        return;
                    }
                    Err(_) => self.status = Some(format!("invalid date '{text}', expected YYYY-MM-DD")),
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => buffer.push(c),
            _ => {}
        }
        self.modal = Modal::DateInput(buffer);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, ui: &mut Ui) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app, ui))?;

        if let Event::Key(key) = event::read()? {
            if ui.handle_key(app, key) == Control::Quit {
                return Ok(());
            }
        }
    }
}

pub fn draw(f: &mut Frame, app: &App, ui: &Ui) {
    let view = app.render();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_toolbar(f, chunks[0], &view);
    match &view.body {
        Body::Placeholder { heading, message } => {
            let panel = Paragraph::new(message.as_str())
                .block(Block::default().title(heading.as_str()).borders(Borders::ALL))
                .wrap(Wrap { trim: true });
            f.render_widget(panel, chunks[1]);
        }
        Body::Columns { columns, .. } => draw_columns(f, chunks[1], columns, ui),
    }
    draw_footer(f, chunks[2], ui);

    match &ui.modal {
        Modal::None => {}
        Modal::Form(editor) => draw_form(f, editor),
        Modal::Confirm(confirm) => {
            let text = match confirm {
                Confirm::Delete(_) => "Delete this task? (y/n)",
                Confirm::ClearAll => "Clear all tasks? (y/n)",
            };
            draw_popup(f, "Confirm", text);
        }
        Modal::Alert { message, .. } => draw_popup(f, "Alert", message),
        Modal::DateInput(buffer) => draw_popup(f, "Date (YYYY-MM-DD, empty to clear)", buffer),
    }
}

fn draw_toolbar(f: &mut Frame, area: Rect, view: &BoardView) {
    let mut spans = Vec::new();
    for (i, mode) in ViewMode::ALL.iter().enumerate() {
        let style = if view.toolbar.active_mode == mode.to_string() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[{}] {} ", i + 1, mode.label()), style));
    }
    if view.toolbar.date_picker_enabled {
        let date = view.toolbar.selected_date.as_deref().unwrap_or("--");
        spans.push(Span::raw(format!(" [g] Date: {date} ")));
    }
    if view.toolbar.add_visible {
        spans.push(Span::raw(" [a] Add task "));
    }
    spans.push(Span::styled(" [C] Clear all", Style::default().fg(Color::Red)));

    let toolbar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(toolbar, area);
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::Green),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::High => Style::default().fg(Color::Red),
    }
}

fn draw_columns(f: &mut Frame, area: Rect, columns: &[ColumnView], ui: &Ui) {
    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, column) in columns.iter().enumerate() {
        let items: Vec<ListItem> = if column.cards.is_empty() {
            vec![ListItem::new(Span::styled(EMPTY_COLUMN, Style::default().fg(Color::DarkGray)))]
        } else {
            column
                .cards
                .iter()
                .enumerate()
                .map(|(j, card)| card_item(card, ui.column == i && ui.card == j, ui))
                .collect()
        };

        let list = List::new(items).block(
            Block::default()
                .title(column.heading.as_str())
                .borders(Borders::ALL)
                .border_style(if ui.column == i {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        );
        f.render_widget(list, chunks[i]);
    }
}

fn card_item<'a>(card: &'a CardView, selected: bool, ui: &Ui) -> ListItem<'a> {
    let carried = ui.grabbed.as_ref().is_some_and(|(id, _)| *id == card.id);
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.fg(Color::Black).bg(Color::Cyan);
    }
    if carried {
        title_style = title_style.add_modifier(Modifier::ITALIC);
    }

    let mut lines = vec![Line::from(Span::styled(card.title.as_str(), title_style))];
    if ui.show_descriptions && !card.description.is_empty() {
        lines.push(Line::from(Span::raw(card.description.as_str())));
    }
    lines.push(Line::from(vec![
        Span::raw(format!("{} ", card.due_label)),
        Span::styled(card.priority.as_str(), priority_style(card.priority)),
    ]));
    match card.badge {
        Some(badge) => lines.push(Line::from(Span::styled(
            badge,
            Style::default().add_modifier(Modifier::DIM),
        ))),
        None => {
            let keys: Vec<String> = card
                .actions
                .iter()
                .map(|a| {
                    let key = match a {
                        CardAction::Start => 's',
                        CardAction::Done => 'm',
                        CardAction::Edit => 'e',
                        CardAction::Delete => 'x',
                    };
                    format!("[{key}] {}", a.label())
                })
                .collect();
            lines.push(Line::from(Span::styled(keys.join(" "), Style::default().fg(Color::DarkGray))));
        }
    }
    lines.push(Line::default());
    ListItem::new(lines)
}

fn draw_footer(f: &mut Frame, area: Rect, ui: &Ui) {
    let text = match (&ui.status, &ui.grabbed) {
        (Some(status), _) => status.clone(),
        (None, Some(_)) => "space: drop here  esc: cancel".to_string(),
        (None, None) => "←→↑↓ move  space: grab/drop  q: quit".to_string(),
    };
    f.render_widget(Paragraph::new(text), area);
}

fn draw_form(f: &mut Frame, editor: &FormEditor) {
    let area = centered_rect(60, 50, f.area());
    let title = if editor.form.is_edit() { "Edit Task" } else { "Add Task" };
    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            let value = match field {
                Field::Title => editor.form.title.clone(),
                Field::Description => editor.form.description.clone(),
                Field::Due => editor.form.due.clone(),
                Field::Priority => format!("< {} >", editor.form.priority),
                Field::Status => format!("< {} >", editor.form.status.title()),
            };
            let style = if *field == editor.field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:>12}: ", field.label()), style),
                Span::raw(value),
            ])
        })
        .chain([
            Line::default(),
            Line::from(Span::styled(
                "tab: next field  ←→: change  enter: save  esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn draw_popup(f: &mut Frame, title: &str, text: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
