use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::task::Column;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Today,
    Future,
    Past,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Today, ViewMode::Future, ViewMode::Past];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Today => "Today",
            ViewMode::Future => "Future",
            ViewMode::Past => "Past",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::Today => "today",
            ViewMode::Future => "future",
            ViewMode::Past => "past",
        })
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(ViewMode::Today),
            "future" => Ok(ViewMode::Future),
            "past" => Ok(ViewMode::Past),
            other => Err(format!("unknown mode '{other}' (expected today, future or past)")),
        }
    }
}

/// Transient view state; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    mode: ViewMode,
    selected_date: Option<NaiveDate>,
}

impl ViewState {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            selected_date: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Switching mode always clears the selected date.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.selected_date = None;
    }

    /// Ignored in today mode, where the date picker is disabled.
    pub fn select_date(&mut self, date: Option<NaiveDate>) -> bool {
        if self.mode == ViewMode::Today {
            return false;
        }
        self.selected_date = date;
        true
    }

    pub fn policy(&self) -> ViewPolicy {
        ViewPolicy::decide(self.mode, self.selected_date)
    }
}

/// What a card may offer in a given view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editability {
    /// Start, done, edit and delete.
    Full,
    /// Edit and delete only.
    EditDelete,
    /// Status badge only.
    ReadOnly,
}

/// Which date the visible columns are filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Selected(NaiveDate),
}

impl DateFilter {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateFilter::Today => today,
            DateFilter::Selected(date) => date,
        }
    }
}

/// Visibility and affordances for a (mode, selected date) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPolicy {
    /// Future/past mode without a date: only a prompt to pick one.
    Placeholder { mode: ViewMode },
    Columns {
        columns: Vec<Column>,
        filter: DateFilter,
        editability: Editability,
        drag_drop: bool,
        add: bool,
    },
}

impl ViewPolicy {
    pub fn decide(mode: ViewMode, selected_date: Option<NaiveDate>) -> ViewPolicy {
        match (mode, selected_date) {
            (ViewMode::Today, _) => ViewPolicy::Columns {
                columns: Column::ALL.to_vec(),
                filter: DateFilter::Today,
                editability: Editability::Full,
                drag_drop: true,
                add: true,
            },
            (ViewMode::Future, Some(date)) => ViewPolicy::Columns {
                columns: vec![Column::Todo],
                filter: DateFilter::Selected(date),
                editability: Editability::EditDelete,
                drag_drop: false,
                add: true,
            },
            (ViewMode::Past, Some(date)) => ViewPolicy::Columns {
                columns: Column::ALL.to_vec(),
                filter: DateFilter::Selected(date),
                editability: Editability::ReadOnly,
                drag_drop: false,
                add: false,
            },
            (mode, None) => ViewPolicy::Placeholder { mode },
        }
    }

    pub fn drag_drop(&self) -> bool {
        matches!(self, ViewPolicy::Columns { drag_drop: true, .. })
    }

    pub fn add_enabled(&self) -> bool {
        matches!(self, ViewPolicy::Columns { add: true, .. })
    }

    pub fn editability(&self) -> Option<Editability> {
        match self {
            ViewPolicy::Columns { editability, .. } => Some(*editability),
            ViewPolicy::Placeholder { .. } => None,
        }
    }

    pub fn shows(&self, column: Column) -> bool {
        match self {
            ViewPolicy::Columns { columns, .. } => columns.contains(&column),
            ViewPolicy::Placeholder { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn mode_switch_clears_selected_date() {
        let mut view = ViewState::new(ViewMode::Future);
        assert!(view.select_date(Some(date())));
        view.set_mode(ViewMode::Past);
        assert_eq!(view.selected_date(), None);
        view.select_date(Some(date()));
        view.set_mode(ViewMode::Past);
        assert_eq!(view.selected_date(), None);
    }

    #[test]
    fn date_picker_disabled_today() {
        let mut view = ViewState::default();
        assert!(!view.select_date(Some(date())));
        assert_eq!(view.selected_date(), None);
    }

    #[test]
    fn policy_table() {
        let today = ViewPolicy::decide(ViewMode::Today, None);
        assert!(today.drag_drop() && today.add_enabled());
        assert_eq!(today.editability(), Some(Editability::Full));
        assert!(Column::ALL.iter().all(|c| today.shows(*c)));

        for mode in [ViewMode::Future, ViewMode::Past] {
            let policy = ViewPolicy::decide(mode, None);
            assert_eq!(policy, ViewPolicy::Placeholder { mode });
            assert!(!policy.drag_drop() && !policy.add_enabled());
        }

        let future = ViewPolicy::decide(ViewMode::Future, Some(date()));
        assert!(future.shows(Column::Todo) && !future.shows(Column::Done));
        assert!(!future.drag_drop() && future.add_enabled());
        assert_eq!(future.editability(), Some(Editability::EditDelete));

        let past = ViewPolicy::decide(ViewMode::Past, Some(date()));
        assert!(Column::ALL.iter().all(|c| past.shows(*c)));
        assert!(!past.drag_drop() && !past.add_enabled());
        assert_eq!(past.editability(), Some(Editability::ReadOnly));
    }
}
