//! Per-employee analytics over the employee's own tasks and leads.
//!
//! Everything here is computed from rows already loaded for one employee.
//! Monthly series use six trailing 30-day windows ending at `now`, oldest
//! first, each labelled with the month its window ends in.

pub mod handlers;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::lead::{Lead, LeadStatus};
use crate::models::task::{Task, TaskStatus};
use crate::models::Priority;
use crate::performance::rate;

/// Billing rate applied to logged hours.
pub const HOURLY_RATE: f64 = 75.0;
const MONTH_WINDOWS: i64 = 6;
const WINDOW_DAYS: i64 = 30;
const RECENT_TASKS: usize = 10;
/// Ceiling and floor of the efficiency rating.
const MAX_EFFICIENCY: f64 = 5.0;
const BASE_EFFICIENCY: f64 = 3.0;
const UNKNOWN_SOURCE: &str = "unknown";

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    label: String,
}

impl Window {
    fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.start && at <= self.end
    }
}

fn monthly_windows(now: DateTime<Utc>) -> Vec<Window> {
    (0..MONTH_WINDOWS)
        .rev()
        .map(|i| {
            let end = now - Duration::days(WINDOW_DAYS * i);
            Window {
                start: end - Duration::days(WINDOW_DAYS),
                end,
                label: end.format("%b %Y").to_string(),
            }
        })
        .collect()
}

fn is(task: &Task, status: TaskStatus) -> bool {
    task.status == status.as_str()
}

fn count(tasks: &[Task], pred: impl Fn(&Task) -> bool) -> i64 {
    tasks.iter().filter(|t| pred(t)).count() as i64
}

fn logged(task: &Task) -> f64 {
    task.actual_hours.unwrap_or(0.0)
}

fn client_of(task: &Task) -> Option<&str> {
    task.client_id.and(task.client_name.as_deref())
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentTask {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub task_type: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskAnalytics {
    pub employee_id: Uuid,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub overdue_tasks: i64,
    pub total_hours_logged: f64,
    /// Mean actual hours of completed tasks that logged time.
    pub avg_completion_time: Option<f64>,
    /// Completed share of all tasks, in percent.
    pub productivity_score: f64,
    pub tasks_by_month: Vec<MonthCount>,
    pub tasks_by_priority: Vec<PriorityCount>,
    pub recent_tasks: Vec<RecentTask>,
}

impl TaskAnalytics {
    pub fn from_tasks(employee_id: Uuid, tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total_tasks = tasks.len() as i64;
        let completed_tasks = count(tasks, |t| is(t, TaskStatus::Completed));
        let in_progress_tasks = count(tasks, |t| is(t, TaskStatus::InProgress));
        let overdue_tasks = count(tasks, |t| {
            t.due_date.is_some_and(|due| due < now) && !is(t, TaskStatus::Completed)
        });

        let total_hours_logged: f64 = tasks.iter().filter_map(|t| t.actual_hours).sum();
        let completed_hours: Vec<f64> = tasks
            .iter()
            .filter(|t| is(t, TaskStatus::Completed))
            .filter_map(|t| t.actual_hours)
            .collect();
        let avg_completion_time = (!completed_hours.is_empty())
            .then(|| round2(completed_hours.iter().sum::<f64>() / completed_hours.len() as f64));

        let tasks_by_month = monthly_windows(now)
            .into_iter()
            .map(|w| MonthCount {
                count: count(tasks, |t| w.contains(t.created_at)),
                month: w.label,
            })
            .collect();
        let tasks_by_priority = Priority::ALL
            .iter()
            .map(|p| PriorityCount {
                priority: *p,
                count: count(tasks, |t| t.priority == p.as_str()),
            })
            .collect();

        let mut recent: Vec<&Task> = tasks.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_tasks = recent
            .into_iter()
            .take(RECENT_TASKS)
            .map(|t| RecentTask {
                id: t.id,
                title: t.title.clone(),
                status: t.status.clone(),
                priority: t.priority.clone(),
                task_type: t.task_type.clone(),
                due_date: t.due_date,
                created_at: t.created_at,
            })
            .collect();

        Self {
            employee_id,
            total_tasks,
            completed_tasks,
            in_progress_tasks,
            overdue_tasks,
            total_hours_logged: round2(total_hours_logged),
            avg_completion_time,
            productivity_score: round1(rate(completed_tasks, total_tasks)),
            tasks_by_month,
            tasks_by_priority,
            recent_tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthEarnings {
    pub month: String,
    pub hours: f64,
    pub earnings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientEarnings {
    pub client: String,
    pub tasks: i64,
    pub hours: f64,
    pub earnings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinanceAnalytics {
    pub employee_id: Uuid,
    pub hourly_rate: f64,
    /// Actual hours on completed tasks.
    pub billable_hours: f64,
    pub total_revenue_generated: f64,
    pub monthly_earnings: Vec<MonthEarnings>,
    /// Billable work per client, highest earnings first.
    pub project_earnings: Vec<ClientEarnings>,
    /// 3 to 5, rising with the share of completed tasks finished within estimate.
    pub efficiency_rating: f64,
}

impl FinanceAnalytics {
    pub fn from_tasks(employee_id: Uuid, tasks: &[Task], now: DateTime<Utc>) -> Self {
        let completed: Vec<&Task> = tasks.iter().filter(|t| is(t, TaskStatus::Completed)).collect();
        let billable_hours: f64 = completed.iter().map(|t| logged(t)).sum();

        let monthly_earnings = monthly_windows(now)
            .into_iter()
            .map(|w| {
                let hours: f64 = completed
                    .iter()
                    .filter(|t| w.contains(t.completed_at.unwrap_or(t.updated_at)))
                    .map(|t| logged(t))
                    .sum();
                MonthEarnings {
                    month: w.label,
                    hours: round2(hours),
                    earnings: round2(hours * HOURLY_RATE),
                }
            })
            .collect();

        let mut per_client: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
        for task in &completed {
            if let Some(client) = client_of(task) {
                let entry = per_client.entry(client).or_default();
                entry.0 += 1;
                entry.1 += logged(task);
            }
        }
        let mut project_earnings: Vec<ClientEarnings> = per_client
            .into_iter()
            .map(|(client, (tasks, hours))| ClientEarnings {
                client: client.to_string(),
                tasks,
                hours: round2(hours),
                earnings: round2(hours * HOURLY_RATE),
            })
            .collect();
        project_earnings.sort_by(|a, b| b.earnings.total_cmp(&a.earnings));

        Self {
            employee_id,
            hourly_rate: HOURLY_RATE,
            billable_hours: round2(billable_hours),
            total_revenue_generated: round2(billable_hours * HOURLY_RATE),
            monthly_earnings,
            project_earnings,
            efficiency_rating: efficiency_rating(&completed),
        }
    }
}

fn efficiency_rating(completed: &[&Task]) -> f64 {
    if completed.is_empty() {
        return MAX_EFFICIENCY;
    }
    let on_time = completed
        .iter()
        .filter(|t| match (t.actual_hours, t.estimated_hours) {
            (Some(actual), Some(estimate)) => actual <= estimate,
            _ => false,
        })
        .count();
    let on_time_rate = on_time as f64 / completed.len() as f64;
    round1((BASE_EFFICIENCY + on_time_rate * 2.0).min(MAX_EFFICIENCY))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectProgress {
    pub name: String,
    pub client: String,
    pub client_id: Uuid,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub progress: f64,
    pub status: ProjectStatus,
    /// Creation of the earliest task.
    pub start_date: DateTime<Utc>,
    /// Latest completion once finished, otherwise the latest due date.
    pub end_date: Option<DateTime<Utc>>,
    /// Estimated hours at the hourly rate.
    pub budget: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalytics {
    pub employee_id: Uuid,
    pub projects: Vec<ProjectProgress>,
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub project_success_rate: f64,
}

impl ProjectAnalytics {
    /// One project per client the employee has tasks for; client-less tasks
    /// are not project work.
    pub fn from_tasks(employee_id: Uuid, tasks: &[Task]) -> Self {
        let mut by_client: BTreeMap<Uuid, Vec<&Task>> = BTreeMap::new();
        for task in tasks {
            if let Some(client_id) = task.client_id {
                by_client.entry(client_id).or_default().push(task);
            }
        }

        let mut projects: Vec<ProjectProgress> = by_client
            .into_iter()
            .filter_map(|(client_id, tasks)| project(client_id, &tasks))
            .collect();
        projects.sort_by(|a, b| a.client.cmp(&b.client));

        let with = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count() as i64;
        let total_projects = projects.len() as i64;
        let active_projects = with(ProjectStatus::InProgress);
        let completed_projects = with(ProjectStatus::Completed);

        Self {
            employee_id,
            total_projects,
            active_projects,
            completed_projects,
            project_success_rate: round1(rate(completed_projects, total_projects)),
            projects,
        }
    }
}

fn project(client_id: Uuid, tasks: &[&Task]) -> Option<ProjectProgress> {
    let first = tasks.first()?;
    let client = first.client_name.clone().unwrap_or_else(|| client_id.to_string());
    let total_tasks = tasks.len() as i64;
    let completed_tasks = tasks.iter().filter(|t| is(t, TaskStatus::Completed)).count() as i64;
    let progress = round1(rate(completed_tasks, total_tasks));
    let status = if completed_tasks == total_tasks {
        ProjectStatus::Completed
    } else if completed_tasks > 0 {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::NotStarted
    };
    let end_date = if status == ProjectStatus::Completed {
        tasks.iter().filter_map(|t| t.completed_at).max()
    } else {
        tasks.iter().filter_map(|t| t.due_date).max()
    };
    let estimated: f64 = tasks.iter().filter_map(|t| t.estimated_hours).sum();

    Some(ProjectProgress {
        name: format!("{client} Project"),
        client,
        client_id,
        total_tasks,
        completed_tasks,
        progress,
        status,
        start_date: tasks.iter().map(|t| t.created_at).min()?,
        end_date,
        budget: round2(estimated * HOURLY_RATE),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthLeads {
    pub month: String,
    pub leads: i64,
    pub converted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadAnalytics {
    pub employee_id: Uuid,
    pub leads_generated: i64,
    /// Won leads, whether or not they have become clients yet.
    pub leads_converted: i64,
    pub conversion_rate: f64,
    pub monthly_leads: Vec<MonthLeads>,
    /// Most common source first.
    pub lead_sources: Vec<SourceCount>,
    /// Mean estimated value of won leads that carry one.
    pub avg_lead_value: Option<f64>,
}

fn won(lead: &Lead) -> bool {
    LeadStatus::WON.iter().any(|s| lead.status == s.as_str())
}

impl LeadAnalytics {
    pub fn from_leads(employee_id: Uuid, leads: &[Lead], now: DateTime<Utc>) -> Self {
        let leads_generated = leads.len() as i64;
        let leads_converted = leads.iter().filter(|l| won(l)).count() as i64;

        let monthly_leads = monthly_windows(now)
            .into_iter()
            .map(|w| {
                let in_window: Vec<&Lead> =
                    leads.iter().filter(|l| w.contains(l.created_at)).collect();
                MonthLeads {
                    leads: in_window.len() as i64,
                    converted: in_window.iter().filter(|l| won(l)).count() as i64,
                    month: w.label,
                }
            })
            .collect();

        let mut sources: BTreeMap<String, i64> = BTreeMap::new();
        for lead in leads {
            let source = lead
                .source
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
            *sources.entry(source).or_default() += 1;
        }
        let mut lead_sources: Vec<SourceCount> = sources
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect();
        lead_sources.sort_by(|a, b| b.count.cmp(&a.count));

        let values: Vec<f64> = leads
            .iter()
            .filter(|l| won(l))
            .filter_map(|l| l.estimated_value)
            .collect();
        let avg_lead_value =
            (!values.is_empty()).then(|| round2(values.iter().sum::<f64>() / values.len() as f64));

        Self {
            employee_id,
            leads_generated,
            leads_converted,
            conversion_rate: round1(rate(leads_converted, leads_generated)),
            monthly_leads,
            lead_sources,
            avg_lead_value,
        }
    }
}
