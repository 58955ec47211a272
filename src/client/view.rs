//! Pure derivations from [`AppModel`] to what the screens draw.

use std::collections::BTreeMap;

use time::{Date, Month};
use uuid::Uuid;

use super::state::AppModel;
use crate::store::{Course, Task, DATE_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub id: Uuid,
    pub title: String,
    pub deadline: Option<String>,
    pub task_type: String,
    pub completed: bool,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: i32,
}

impl From<&Task> for TaskCard {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            deadline: t.deadline.and_then(|d| d.format(DATE_FORMAT).ok()),
            task_type: t.task_type.clone(),
            completed: t.completed,
            estimated_minutes: t.estimated_time,
            actual_minutes: t.actual_time,
        }
    }
}

/// Cards for the selected course in display order.
pub fn task_cards(model: &AppModel) -> Vec<TaskCard> {
    if model.selected_course_id.is_none() {
        return Vec::new();
    }
    model.tasks.iter().map(TaskCard::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: Date,
    pub task_titles: Vec<String>,
}

/// One month laid out in Sunday-first weeks. Cells outside the month are
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: Month,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
}

pub fn calendar_month(tasks: &[Task], year: i32, month: Month) -> Option<CalendarMonth> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let days = month.length(year);

    let mut by_day: BTreeMap<Date, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(d) = task.deadline.filter(|d| d.year() == year && d.month() == month) {
            by_day.entry(d).or_default().push(task);
        }
    }

    let mut weeks = Vec::new();
    let mut week: [Option<CalendarDay>; 7] = Default::default();
    let mut col = first.weekday().number_days_from_sunday() as usize;
    for day in 1..=days {
        let date = Date::from_calendar_date(year, month, day).ok()?;
        let mut due = by_day.remove(&date).unwrap_or_default();
        due.sort_by_key(|t| (t.order_index, t.id));
        week[col] = Some(CalendarDay {
            date,
            task_titles: due.iter().map(|t| t.title.clone()).collect(),
        });
        col += 1;
        if col == 7 {
            weeks.push(std::mem::take(&mut week));
            col = 0;
        }
    }
    if col != 0 {
        weeks.push(week);
    }

    Some(CalendarMonth { year, month, weeks })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub course_id: Uuid,
    pub label: String,
    pub task_count: usize,
}

/// One bar per course, in course order, counting its tasks.
pub fn tasks_per_course(courses: &[Course], tasks: &[Task]) -> Vec<ChartBar> {
    courses
        .iter()
        .map(|c| ChartBar {
            course_id: c.id,
            label: c.name.clone(),
            task_count: tasks.iter().filter(|t| t.course_id == c.id).count(),
        })
        .collect()
}

/// Greeting for the home screen at local hour `hour` (0-23).
pub fn greeting(name: &str, hour: u8) -> String {
    let salutation = match hour {
        0..=4 => "It's late, get some rest",
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{salutation}, {name}")
}

/// Minutes rendered as hours with one decimal, e.g. `"1.5 hours"`.
pub fn study_hours(total_minutes: i64) -> String {
    format!("{:.1} hours", total_minutes as f64 / 60.0)
}
