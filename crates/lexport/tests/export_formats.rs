// Exporter output against a small two-project portfolio

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lemodele::{Milestone, MilestoneStatus, Project, ProjectBundle, ProjectStatus, Risk, RiskSeverity};
use lexport::{FlatCsvExporter, JiraExporter, PowerBiExporter, PowerBiTable};
use tempfile::TempDir;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn milestone(id: i64, name: &str, status: MilestoneStatus, target_days: i64) -> Milestone {
    Milestone {
        id,
        project_id: 1,
        name: name.to_string(),
        description: None,
        target_date: now() + Duration::days(target_days),
        completion_date: None,
        status,
        created_at: now() - Duration::days(30),
        updated_at: now() - Duration::days(1),
    }
}

fn risk(id: i64, name: &str, severity: RiskSeverity, status: &str) -> Risk {
    Risk {
        id,
        project_id: 1,
        name: name.to_string(),
        description: None,
        severity,
        mitigation_plan: None,
        status: status.to_string(),
        created_at: now() - Duration::days(30),
        updated_at: now() - Duration::days(30),
    }
}

fn portfolio() -> Vec<ProjectBundle> {
    let mut design = milestone(1, "Design Phase", MilestoneStatus::Completed, -10);
    design.completion_date = Some(now() - Duration::days(11));

    let mut scope = risk(1, "Scope Creep", RiskSeverity::High, "Open");
    scope.mitigation_plan = Some("Weekly scope review".to_string());

    let website = ProjectBundle {
        project: Project {
            id: 1,
            name: "Website Redesign".to_string(),
            owner: "Sarah Johnson".to_string(),
            description: Some("Redesign the public website".to_string()),
            status: ProjectStatus::InProgress,
            start_date: now() - Duration::days(30),
            deadline: now() + Duration::days(10),
            completion_percentage: 50.0,
            created_at: now() - Duration::days(30),
            updated_at: now() - Duration::days(1),
        },
        milestones: vec![
            design,
            milestone(2, "Development Sprint", MilestoneStatus::InProgress, 20),
            milestone(3, "QA Testing", MilestoneStatus::Pending, -2),
        ],
        risks: vec![scope, risk(2, "Minor Delay", RiskSeverity::Low, "open")],
    };

    let migration = ProjectBundle {
        project: Project {
            id: 2,
            name: "Data Migration".to_string(),
            owner: "Ana".to_string(),
            description: None,
            status: ProjectStatus::Completed,
            start_date: now() - Duration::days(30),
            deadline: now() - Duration::days(5),
            completion_percentage: 100.0,
            created_at: now() - Duration::days(30),
            updated_at: now() - Duration::days(5),
        },
        milestones: vec![],
        risks: vec![],
    };

    vec![website, migration]
}

fn records(text: &str) -> Vec<csv::StringRecord> {
    csv::Reader::from_reader(text.as_bytes())
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn flat_export_spreads_children_across_rows() {
    let out = FlatCsvExporter::new().export(&portfolio()).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[1],
        "Website Redesign,Sarah Johnson,In Progress,2025-05-02,2025-06-11,50.0,Design Phase,Completed,Scope Creep,High,Open"
    );
    assert_eq!(lines[2], ",,,,,,Development Sprint,In Progress,Minor Delay,Low,open");
    assert_eq!(lines[3], ",,,,,,QA Testing,Pending,,,");
    assert_eq!(lines[4], "Data Migration,Ana,Completed,2025-05-02,2025-05-27,100.0,,,,,");
}

#[test]
fn jira_export_ids_links_and_priorities() {
    let exporter = JiraExporter::new("TRK").with_assignee(Some("sjohnson".to_string()));
    let (out, stats) = exporter.export(&portfolio(), now()).unwrap();

    assert_eq!((stats.epics, stats.stories, stats.risks), (2, 3, 2));
    assert_eq!(stats.total(), 7);

    let rows = records(&out);
    let ids: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(
        ids,
        vec!["EPIC-1", "EPIC-2", "STORY-3", "STORY-4", "STORY-5", "RISK-6", "RISK-7"]
    );

    let website = &rows[0];
    assert_eq!(&website[2], "Epic");
    assert_eq!(&website[4], "TRK");
    assert_eq!(&website[10], "High");
    assert_eq!(&website[11], "In Progress");
    assert_eq!(&website[12], "project-tracker,in-progress");
    assert_eq!(&website[13], "2025-06-11");
    assert_eq!(&website[14], "sjohnson");
    assert!(website[5].starts_with("Owner: Sarah Johnson\nStatus: In Progress\nCompletion: 50.0%\n"));
    assert!(website[5].ends_with("\n\nRedesign the public website"));

    let migration = &rows[1];
    assert_eq!(&migration[10], "Highest");
    assert_eq!(&migration[11], "Done");
    assert_eq!(&migration[12], "project-tracker,completed,high-completion");
    assert!(migration[5].ends_with("No description provided"));

    let design = &rows[2];
    assert_eq!(&design[7], "Website Redesign");
    assert_eq!(&design[8], "EPIC-1");
    assert_eq!(&design[10], "High");
    assert_eq!(&design[11], "Done");
    assert_eq!(&design[15], "3");
    assert!(design[5].ends_with("\nCompleted: 2025-05-21"));

    assert_eq!(&rows[3][10], "Medium");
    assert_eq!(&rows[3][15], "8");
    assert_eq!(&rows[4][10], "Highest");
    assert_eq!(&rows[4][11], "To Do");
    assert_eq!(&rows[4][12], "project-tracker,milestone,pending");

    let scope = &rows[5];
    assert_eq!(&scope[2], "Task");
    assert_eq!(&scope[10], "Highest");
    assert_eq!(&scope[11], "To Do");
    assert_eq!(&scope[12], "project-tracker,risk,high,open");
    assert_eq!(&scope[13], "");
    assert_eq!(
        &scope[5],
        "Severity: High\nStatus: Open\n\nNo description provided\n\nMitigation Plan:\nWeekly scope review"
    );
}

#[test]
fn jira_export_unassigned_by_default() {
    let (out, _) = JiraExporter::default().export(&portfolio(), now()).unwrap();
    let rows = records(&out);
    assert!(rows.iter().all(|r| &r[4] == "PT" && &r[14] == ""));
}

#[test]
fn powerbi_tables_derive_flags() {
    let tables = PowerBiExporter::new().export(&portfolio(), now()).unwrap();

    let projects = records(&tables.projects);
    assert_eq!(projects.len(), 2);
    assert_eq!(&projects[0][7], "50.0");
    assert_eq!(&projects[0][8], "10");
    assert_eq!((&projects[0][9], &projects[0][10]), ("No", "Yes"));
    assert_eq!(&projects[1][8], "-5");
    assert_eq!((&projects[1][9], &projects[1][10]), ("No", "Yes"));
    assert_eq!(&projects[0][11], "2025-05-02 12:00:00");

    let milestones = records(&tables.milestones);
    assert_eq!(tables.rows(PowerBiTable::Milestones), 3);
    assert_eq!(&milestones[0][2], "Website Redesign");
    assert_eq!(&milestones[0][6], "2025-05-21");
    assert_eq!(&milestones[0][9], "Yes");
    assert_eq!(&milestones[1][10], "20");
    assert_eq!(&milestones[2][8], "Yes");
    assert_eq!((&milestones[2][10], &milestones[2][11]), ("0", "2"));

    let risks = records(&tables.risks);
    assert_eq!(&risks[0][6], "3");
    assert_eq!((&risks[0][9], &risks[0][10]), ("Yes", "Yes"));
    assert_eq!(&risks[1][6], "1");
    assert_eq!((&risks[1][9], &risks[1][10]), ("No", "No"));
}

#[test]
fn powerbi_tables_written_with_stamp() {
    let dir = TempDir::new().unwrap();
    let tables = PowerBiExporter::new().export(&portfolio(), now()).unwrap();

    let paths = tables.write_to_dir(dir.path(), "20250601_120000").unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "powerbi_projects_20250601_120000.csv",
            "powerbi_milestones_20250601_120000.csv",
            "powerbi_risks_20250601_120000.csv",
        ]
    );
    let written = std::fs::read_to_string(&paths[2]).unwrap();
    assert_eq!(written, tables.risks);
}
