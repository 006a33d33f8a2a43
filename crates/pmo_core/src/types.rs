//! Record kinds and their create payloads.
//!
//! Payload structs (`New*`) carry what a client may send; the record structs
//! add the generated `id`, server defaults, and derived fields.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::iso8601;
use crate::ports::Collection;
use crate::record::{check_finite, check_range, NewRecord, Record};

// ── Project ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

/// Traffic-light color of one status lamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lamp {
    #[default]
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLamps {
    #[serde(default)]
    pub scope: Lamp,
    #[serde(default)]
    pub time: Lamp,
    #[serde(default)]
    pub cost: Lamp,
    #[serde(default)]
    pub risk: Lamp,
    #[serde(default)]
    pub quality: Lamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub customer: String,
    pub location: String,
    pub version: String,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub author: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "lamps_or_default")]
    pub lamps: StatusLamps,
}

fn lamps_or_default<'de, D>(d: D) -> std::result::Result<StatusLamps, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<StatusLamps>::deserialize(d)?.unwrap_or_default())
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub customer: String,
    pub location: String,
    pub author: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Record for Project {
    const COLLECTION: Collection = Collection::Projects;
    const KIND: &'static str = "Project";
    const PARENT_FIELD: Option<&'static str> = None;

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewProject {
    type Record = Project;

    fn into_record(self, id: String) -> Project {
        Project {
            id,
            title: self.title,
            customer: self.customer,
            location: self.location,
            version: self.version,
            date: Utc::now(),
            author: self.author,
            status: self.status,
            lamps: StatusLamps::default(),
        }
    }
}

// ── Milestone ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Delayed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub gate: String,
    #[serde(with = "iso8601")]
    pub plan: DateTime<Utc>,
    #[serde(default, with = "iso8601::option")]
    pub fc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delta: Option<i64>,
    #[serde(default)]
    pub status: MilestoneStatus,
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMilestone {
    pub project_id: String,
    pub gate: String,
    #[serde(with = "iso8601")]
    pub plan: DateTime<Utc>,
    #[serde(default, with = "iso8601::option")]
    pub fc: Option<DateTime<Utc>>,
    pub owner: String,
    #[serde(default)]
    pub status: MilestoneStatus,
}

/// Whole days from `plan` to `fc`, rounded toward negative infinity.
pub fn milestone_delta_days(plan: DateTime<Utc>, fc: DateTime<Utc>) -> i64 {
    let offset = fc - plan;
    let days = offset.num_days();
    if offset < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

impl Record for Milestone {
    const COLLECTION: Collection = Collection::Milestones;
    const KIND: &'static str = "Milestone";

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewMilestone {
    type Record = Milestone;

    fn into_record(self, id: String) -> Milestone {
        Milestone {
            id,
            project_id: self.project_id,
            gate: self.gate,
            plan: self.plan,
            fc: self.fc,
            delta: self.fc.map(|fc| milestone_delta_days(self.plan, fc)),
            status: self.status,
            owner: self.owner,
        }
    }
}

// ── Budget line ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: String,
    pub project_id: String,
    pub item: String,
    pub plan: f64,
    #[serde(default)]
    pub actual: f64,
    #[serde(default)]
    pub fc: f64,
    #[serde(default)]
    pub delta: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudgetLine {
    pub project_id: String,
    pub item: String,
    pub plan: f64,
    #[serde(default)]
    pub actual: f64,
    #[serde(default)]
    pub fc: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Record for BudgetLine {
    const COLLECTION: Collection = Collection::Budget;
    const KIND: &'static str = "Budget line";

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewBudgetLine {
    type Record = BudgetLine;

    fn validate(&self) -> Result<()> {
        check_finite("plan", self.plan)?;
        check_finite("actual", self.actual)?;
        check_finite("fc", self.fc)?;
        check_finite("delta", self.fc - self.plan)
    }

    fn into_record(self, id: String) -> BudgetLine {
        BudgetLine {
            id,
            project_id: self.project_id,
            item: self.item,
            plan: self.plan,
            actual: self.actual,
            fc: self.fc,
            delta: self.fc - self.plan,
            comment: self.comment,
        }
    }
}

// ── Risk ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    #[default]
    Risk,
    Chance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub category: RiskCategory,
    /// Cause, effect and action.
    pub cea: String,
    /// Probability rating, 1..=5.
    pub p: i32,
    /// Impact rating, 1..=5.
    pub a: i32,
    #[serde(default)]
    pub score: i32,
    pub probability: String,
    pub trigger: String,
    pub resp: String,
    pub owner: String,
    pub status: String,
}

fn default_probability_label() -> String {
    "wahrscheinlich".to_string()
}

fn default_open() -> String {
    "open".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRisk {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub category: RiskCategory,
    pub cea: String,
    pub p: i32,
    pub a: i32,
    #[serde(default = "default_probability_label")]
    pub probability: String,
    pub trigger: String,
    pub resp: String,
    pub owner: String,
    #[serde(default = "default_open")]
    pub status: String,
}

pub fn risk_score(p: i32, a: i32) -> i32 {
    p * a
}

impl Record for Risk {
    const COLLECTION: Collection = Collection::Risks;
    const KIND: &'static str = "Risk";

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewRisk {
    type Record = Risk;

    fn validate(&self) -> Result<()> {
        check_range("p", self.p.into(), 1, 5)?;
        check_range("a", self.a.into(), 1, 5)
    }

    fn into_record(self, id: String) -> Risk {
        Risk {
            id,
            project_id: self.project_id,
            title: self.title,
            category: self.category,
            cea: self.cea,
            p: self.p,
            a: self.a,
            score: risk_score(self.p, self.a),
            probability: self.probability,
            trigger: self.trigger,
            resp: self.resp,
            owner: self.owner,
            status: self.status,
        }
    }
}

// ── Task ──────────────────────────────────────────────────────

/// Trend arrow shown next to a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Up,
    #[default]
    Right,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub pos: i64,
    pub index: String,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub task: String,
    pub owner: String,
    #[serde(with = "iso8601")]
    pub due: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub prog: i32,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_desc: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub project_id: String,
    pub pos: i64,
    pub index: String,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub task: String,
    pub owner: String,
    #[serde(with = "iso8601")]
    pub due: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub prog: i32,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_desc: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;
    const KIND: &'static str = "Task";

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewTask {
    type Record = Task;

    fn validate(&self) -> Result<()> {
        check_range("prog", self.prog.into(), 0, 100)
    }

    fn into_record(self, id: String) -> Task {
        Task {
            id,
            project_id: self.project_id,
            pos: self.pos,
            index: self.index,
            date: self.date,
            task: self.task,
            owner: self.owner,
            due: self.due,
            status: self.status,
            prog: self.prog,
            risk_level: self.risk_level,
            risk_desc: self.risk_desc,
            note: self.note,
        }
    }
}

// ── Change request ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    #[default]
    Open,
    Approved,
    Rejected,
    Implemented,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeImpact {
    #[serde(default)]
    pub time_days: i64,
    #[serde(default)]
    pub cost_eur: f64,
    #[serde(default)]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: String,
    pub project_id: String,
    pub subject: String,
    #[serde(default)]
    pub impact: ChangeImpact,
    #[serde(default)]
    pub status: ChangeStatus,
    pub decision_maker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChangeRequest {
    pub project_id: String,
    pub subject: String,
    #[serde(default)]
    pub impact: ChangeImpact,
    pub decision_maker: String,
    #[serde(default)]
    pub status: ChangeStatus,
}

impl Record for ChangeRequest {
    const COLLECTION: Collection = Collection::Changes;
    const KIND: &'static str = "Change request";

    fn id(&self) -> &str {
        &self.id
    }
}

impl NewRecord for NewChangeRequest {
    type Record = ChangeRequest;

    fn into_record(self, id: String) -> ChangeRequest {
        ChangeRequest {
            id,
            project_id: self.project_id,
            subject: self.subject,
            impact: self.impact,
            status: self.status,
            decision_maker: self.decision_maker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn project_defaults() {
        let new: NewProject = serde_json::from_value(json!({
            "title": "Webshop", "customer": "E-Commerce GmbH",
            "location": "Hamburg", "author": "Dev"
        }))
        .unwrap();
        let before = Utc::now();
        let p = new.into_record("p1".into());
        assert_eq!(p.version, "1.0");
        assert_eq!(p.status, ProjectStatus::Planning);
        assert_eq!(p.lamps, StatusLamps::default());
        assert_eq!(p.lamps.quality, Lamp::Green);
        assert!(p.date >= before);
    }

    #[test]
    fn project_wire_shape() {
        let p = NewProject {
            title: "T".into(),
            customer: "C".into(),
            location: "L".into(),
            author: "A".into(),
            version: "2.0".into(),
            status: ProjectStatus::OnHold,
        }
        .into_record("p1".into());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["status"], json!("on_hold"));
        assert_eq!(
            v["lamps"],
            json!({ "scope": "green", "time": "green", "cost": "green", "risk": "green", "quality": "green" })
        );
        assert!(v["date"].as_str().unwrap().ends_with("+00:00"));
    }

    #[test]
    fn project_null_lamps_become_default() {
        let p: Project = serde_json::from_value(json!({
            "id": "p1", "title": "T", "customer": "C", "location": "L",
            "version": "1.0", "date": "2025-01-01T00:00:00", "author": "A",
            "status": "active", "lamps": null
        }))
        .unwrap();
        assert_eq!(p.lamps, StatusLamps::default());
        assert_eq!(p.status, ProjectStatus::Active);
    }

    #[test]
    fn project_rejects_unknown_status() {
        let res: std::result::Result<NewProject, _> = serde_json::from_value(json!({
            "title": "T", "customer": "C", "location": "L", "author": "A",
            "status": "paused"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn milestone_delta_ten_days() {
        let m = NewMilestone {
            project_id: "p1".into(),
            gate: "G1".into(),
            plan: ymd(2025, 1, 1),
            fc: Some(ymd(2025, 1, 11)),
            owner: "o".into(),
            status: MilestoneStatus::Planned,
        }
        .into_record("m1".into());
        assert_eq!(m.delta, Some(10));
    }

    #[test]
    fn milestone_without_forecast_has_no_delta() {
        let m: NewMilestone = serde_json::from_value(json!({
            "project_id": "p1", "gate": "G1", "plan": "2025-01-01", "owner": "o"
        }))
        .unwrap();
        let m = m.into_record("m1".into());
        assert_eq!(m.fc, None);
        assert_eq!(m.delta, None);
        assert_eq!(serde_json::to_value(&m).unwrap()["delta"], json!(null));
    }

    #[test]
    fn milestone_delta_floors_partial_days() {
        let plan = ymd(2025, 1, 2);
        assert_eq!(
            milestone_delta_days(plan, plan - chrono::Duration::hours(12)),
            -1
        );
        assert_eq!(
            milestone_delta_days(plan, plan + chrono::Duration::hours(36)),
            1
        );
        assert_eq!(milestone_delta_days(plan, plan), 0);
    }

    #[test]
    fn milestone_delta_floors_sub_second_offsets() {
        let plan = ymd(2025, 1, 2) + chrono::Duration::milliseconds(500);
        assert_eq!(milestone_delta_days(plan, ymd(2025, 1, 2)), -1);
        assert_eq!(
            milestone_delta_days(plan, plan + chrono::Duration::nanoseconds(1)),
            0
        );
        assert_eq!(
            milestone_delta_days(plan, plan - chrono::Duration::days(1)),
            -1
        );
    }

    #[test]
    fn budget_delta() {
        let b = NewBudgetLine {
            project_id: "p1".into(),
            item: "Hardware".into(),
            plan: 10000.0,
            actual: 0.0,
            fc: 12000.0,
            comment: None,
        }
        .into_record("b1".into());
        assert_eq!(b.delta, 2000.0);
    }

    #[test]
    fn budget_rejects_amounts_that_overflow() {
        let line = |plan: f64, fc: f64| NewBudgetLine {
            project_id: "p1".into(),
            item: "Hardware".into(),
            plan,
            actual: 0.0,
            fc,
            comment: None,
        };
        let err = line(-1.0e308, 1.0e308).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: delta must be a finite number"
        );
        assert!(line(f64::MAX, 0.0).validate().is_ok());
        assert!(line(1.0e308, 1.0e308).validate().is_ok());
    }

    #[test]
    fn budget_defaults_forecast_to_zero() {
        let b: NewBudgetLine = serde_json::from_value(json!({
            "project_id": "p1", "item": "Licenses", "plan": 500.0
        }))
        .unwrap();
        let b = b.into_record("b1".into());
        assert_eq!(b.actual, 0.0);
        assert_eq!(b.fc, 0.0);
        assert_eq!(b.delta, -500.0);
    }

    fn sample_risk(p: i32, a: i32) -> NewRisk {
        NewRisk {
            project_id: "p1".into(),
            title: "Supplier delay".into(),
            category: RiskCategory::Risk,
            cea: "late delivery".into(),
            p,
            a,
            probability: default_probability_label(),
            trigger: "no confirmation".into(),
            resp: "second supplier".into(),
            owner: "o".into(),
            status: default_open(),
        }
    }

    #[test]
    fn risk_score_three_by_four() {
        let r = sample_risk(3, 4);
        r.validate().unwrap();
        assert_eq!(r.into_record("r1".into()).score, 12);
    }

    #[test]
    fn risk_rejects_out_of_range_ratings() {
        assert!(sample_risk(0, 3).validate().is_err());
        assert!(sample_risk(3, 6).validate().is_err());
    }

    #[test]
    fn risk_payload_defaults() {
        let r: NewRisk = serde_json::from_value(json!({
            "project_id": "p1", "title": "t", "cea": "c", "p": 1, "a": 1,
            "trigger": "x", "resp": "y", "owner": "o"
        }))
        .unwrap();
        assert_eq!(r.category, RiskCategory::Risk);
        assert_eq!(r.probability, "wahrscheinlich");
        assert_eq!(r.status, "open");
    }

    #[test]
    fn task_defaults_and_progress_bounds() {
        let t: NewTask = serde_json::from_value(json!({
            "project_id": "p1", "pos": 1, "index": "A.1",
            "date": "2025-01-01T00:00:00Z", "task": "Requirements",
            "owner": "BA", "due": "2025-01-08"
        }))
        .unwrap();
        assert_eq!(t.status, TaskStatus::Right);
        assert_eq!(t.risk_level, RiskLevel::Low);
        assert_eq!(t.prog, 0);
        t.validate().unwrap();

        let mut over = t.clone();
        over.prog = 101;
        assert!(over.validate().is_err());
        let mut under = t;
        under.prog = -1;
        assert!(under.validate().is_err());
    }

    #[test]
    fn change_request_default_impact() {
        let c: NewChangeRequest = serde_json::from_value(json!({
            "project_id": "p1", "subject": "Extra report", "decision_maker": "CFO"
        }))
        .unwrap();
        let c = c.into_record("c1".into());
        assert_eq!(c.impact, ChangeImpact::default());
        assert_eq!(c.status, ChangeStatus::Open);
        assert_eq!(
            serde_json::to_value(&c.impact).unwrap(),
            json!({ "time_days": 0, "cost_eur": 0.0, "scope": "" })
        );
    }

    proptest! {
        #[test]
        fn score_is_product_for_valid_ratings(p in 1i32..=5, a in 1i32..=5) {
            let r = sample_risk(p, a);
            prop_assert!(r.validate().is_ok());
            let rec = r.into_record("r".into());
            prop_assert_eq!(rec.score, p * a);
            prop_assert!((1..=25).contains(&rec.score));
        }

        #[test]
        fn ratings_outside_range_rejected(p in -100i32..100, a in 1i32..=5) {
            prop_assume!(!(1..=5).contains(&p));
            prop_assert!(sample_risk(p, a).validate().is_err());
        }

        #[test]
        fn budget_delta_is_forecast_minus_plan(plan in -1e9f64..1e9, fc in -1e9f64..1e9) {
            let b = NewBudgetLine {
                project_id: "p".into(),
                item: "i".into(),
                plan,
                actual: 0.0,
                fc,
                comment: None,
            }
            .into_record("b".into());
            prop_assert_eq!(b.delta, fc - plan);
        }

        #[test]
        fn milestone_delta_matches_whole_day_offsets(
            days in -3650i64..3650,
            nanos in 0i64..86_400_000_000_000,
            plan_nanos in 0i64..1_000_000_000,
        ) {
            let plan = ymd(2025, 1, 1) + chrono::Duration::nanoseconds(plan_nanos);
            let fc = plan + chrono::Duration::days(days) + chrono::Duration::nanoseconds(nanos);
            prop_assert_eq!(milestone_delta_days(plan, fc), days);
        }

        #[test]
        fn finite_budget_lines_stay_storable(plan in -1e15f64..1e15, fc in -1e15f64..1e15) {
            let b = NewBudgetLine {
                project_id: "p".into(),
                item: "i".into(),
                plan,
                actual: 0.0,
                fc,
                comment: None,
            };
            prop_assert!(b.validate().is_ok());
            let doc = crate::normalize::to_document(&b.into_record("b".into())).unwrap();
            let back: BudgetLine = crate::normalize::from_document("budget", doc).unwrap();
            prop_assert!(back.delta.is_finite());
        }
    }
}
