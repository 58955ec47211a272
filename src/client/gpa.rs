//! 4.0-scale GPA calculator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedCourse {
    pub name: String,
    pub credits: f64,
    /// Percentage grade, 0-100.
    pub grade: f64,
}

pub fn grade_point(grade: f64) -> f64 {
    match grade {
        g if g >= 90.0 => 4.0,
        g if g >= 80.0 => 3.0,
        g if g >= 70.0 => 2.0,
        g if g >= 60.0 => 1.0,
        _ => 0.0,
    }
}

/// Credit-weighted average. `None` without any credits.
pub fn gpa(courses: &[GradedCourse]) -> Option<f64> {
    let credits: f64 = courses.iter().map(|c| c.credits).sum();
    if credits <= 0.0 {
        return None;
    }
    let points: f64 = courses
        .iter()
        .map(|c| c.credits * grade_point(c.grade))
        .sum();
    Some(points / credits)
}

/// Two decimals, or `N/A`.
pub fn format_gpa(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
