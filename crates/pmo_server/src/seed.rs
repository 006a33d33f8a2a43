//! Demo data for a fresh installation. Re-running only adds what is missing.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use pmo_core::types::{
    ChangeImpact, ChangeStatus, MilestoneStatus, NewBudgetLine, NewChangeRequest, NewMilestone,
    NewProject, NewRisk, NewTask, Project, ProjectStatus, RiskCategory, RiskLevel, Task,
    TaskStatus,
};
use pmo_core::{RecordService, Result};

/// What one seeding run added.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub projects_created: usize,
    pub projects_existing: usize,
    pub tasks_created: usize,
    pub details_created: usize,
}

const PROJECTS: [(&str, &str, &str, &str); 5] = [
    ("Test Projekt 1", "Test GmbH", "Berlin", "Test User 1"),
    ("Test Projekt 2", "Test AG", "München", "Test User 2"),
    ("Webshop Projekt", "E-Commerce GmbH", "Hamburg", "Web Developer"),
    ("Mobile App Entwicklung", "Mobile Solutions", "Frankfurt", "App Developer"),
    ("ERP System Migration", "Enterprise Corp", "Köln", "System Architect"),
];

struct SeedTask {
    project: &'static str,
    index: &'static str,
    task: &'static str,
    owner: &'static str,
    status: TaskStatus,
    prog: i32,
    risk_level: RiskLevel,
    due_in_days: i64,
}

const TASKS: [SeedTask; 3] = [
    SeedTask {
        project: "Test Projekt 1",
        index: "A.1",
        task: "Requirements Analysis",
        owner: "Business Analyst",
        status: TaskStatus::Up,
        prog: 90,
        risk_level: RiskLevel::Low,
        due_in_days: 7,
    },
    SeedTask {
        project: "Webshop Projekt",
        index: "B.2",
        task: "E-Commerce Frontend",
        owner: "Frontend Developer",
        status: TaskStatus::Right,
        prog: 45,
        risk_level: RiskLevel::Mid,
        due_in_days: 14,
    },
    SeedTask {
        project: "Mobile App Entwicklung",
        index: "C.1",
        task: "Mobile UI Design",
        owner: "UI Designer",
        status: TaskStatus::Down,
        prog: 15,
        risk_level: RiskLevel::High,
        due_in_days: 21,
    },
];

pub async fn seed(service: &RecordService) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let existing: Vec<Project> = service.list(None).await?;
    let mut ids: HashMap<&'static str, String> = HashMap::new();

    for (title, customer, location, author) in PROJECTS {
        if let Some(p) = existing.iter().find(|p| p.title == title) {
            tracing::info!(id = %p.id, "project {title:?} already exists");
            ids.insert(title, p.id.clone());
            report.projects_existing += 1;
            continue;
        }
        let project = service
            .create(NewProject {
                title: title.to_string(),
                customer: customer.to_string(),
                location: location.to_string(),
                author: author.to_string(),
                version: "1.0".to_string(),
                status: ProjectStatus::Active,
            })
            .await?;
        tracing::info!(id = %project.id, "created project {title:?}");
        report.details_created += seed_details(service, &project.id).await?;
        ids.insert(title, project.id);
        report.projects_created += 1;
    }

    let now = Utc::now();
    for t in &TASKS {
        let Some(project_id) = ids.get(t.project) else {
            continue;
        };
        let tasks: Vec<Task> = service.list(Some(project_id.as_str())).await?;
        if tasks.iter().any(|x| x.index == t.index && x.task == t.task) {
            continue;
        }
        service
            .create(NewTask {
                project_id: project_id.clone(),
                pos: 1,
                index: t.index.to_string(),
                date: now,
                task: t.task.to_string(),
                owner: t.owner.to_string(),
                due: now + Duration::days(t.due_in_days),
                status: t.status,
                prog: t.prog,
                risk_level: t.risk_level,
                risk_desc: None,
                note: Some(format!("Test task for {}", t.project)),
            })
            .await?;
        tracing::info!("created task {:?} for project {:?}", t.task, t.project);
        report.tasks_created += 1;
    }

    Ok(report)
}

/// One milestone, budget line, risk and change request for a new project.
async fn seed_details(service: &RecordService, project_id: &str) -> Result<usize> {
    let now = Utc::now();
    service
        .create(NewMilestone {
            project_id: project_id.to_string(),
            gate: "Kick-off".to_string(),
            plan: now + Duration::days(14),
            fc: Some(now + Duration::days(17)),
            owner: "Projektleitung".to_string(),
            status: MilestoneStatus::Planned,
        })
        .await?;
    service
        .create(NewBudgetLine {
            project_id: project_id.to_string(),
            item: "Personal".to_string(),
            plan: 50_000.0,
            actual: 12_500.0,
            fc: 52_000.0,
            comment: None,
        })
        .await?;
    service
        .create(NewRisk {
            project_id: project_id.to_string(),
            title: "Ressourcenengpass".to_string(),
            category: RiskCategory::Risk,
            cea: "Schlüsselpersonen parallel in anderen Projekten".to_string(),
            p: 3,
            a: 4,
            probability: "wahrscheinlich".to_string(),
            trigger: "Verzögerte Zuarbeit".to_string(),
            resp: "Frühzeitige Kapazitätsplanung".to_string(),
            owner: "Projektleitung".to_string(),
            status: "open".to_string(),
        })
        .await?;
    service
        .create(NewChangeRequest {
            project_id: project_id.to_string(),
            subject: "Zusätzliche Schnittstelle".to_string(),
            impact: ChangeImpact {
                time_days: 5,
                cost_eur: 4_000.0,
                scope: "Anbindung an Bestandssystem".to_string(),
            },
            status: ChangeStatus::Open,
            decision_maker: "Lenkungsausschuss".to_string(),
        })
        .await?;
    Ok(4)
}
