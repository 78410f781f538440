// Config, seeding, KPI and export workflow against an on-disk database

use chrono::{NaiveDate, NaiveDateTime};
use lepasserelle::cli::{kpi_report, write_export, ExportFormat};
use lepasserelle::{seed_sample_data, AppConfig};
use lestockage::{Portfolio, Storage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 6)
        .unwrap()
        .and_hms_opt(14, 5, 9)
        .unwrap()
}

fn seeded(dir: &TempDir) -> (AppConfig, Storage) {
    let config_path = dir.path().join("lesuivi.toml");
    fs::write(
        &config_path,
        format!(
            "[storage]\ndb_path = {:?}\n\n[export]\nout_dir = {:?}\njira_project_key = \"TRK\"\n",
            dir.path().join("tracker.db").display().to_string(),
            dir.path().join("exports").display().to_string(),
        ),
    )
    .unwrap();

    let config = AppConfig::load(Some(&config_path)).unwrap();
    config.validate().unwrap();

    let mut storage = Storage::from_config(&config.storage).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    seed_sample_data(&mut storage, &mut rng, now()).unwrap();
    (config, storage)
}

#[test]
fn seeded_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (config, storage) = seeded(&dir);
    drop(storage);

    let reopened = Storage::from_config(&config.storage).unwrap();
    let bundles = Portfolio::load(&reopened).unwrap();
    let names: Vec<&str> = bundles.iter().map(|b| b.project.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Cloud Migration Initiative",
            "Mobile App Development",
            "Data Analytics Platform",
            "Security Audit & Compliance",
            "API Gateway Implementation",
        ]
    );
}

#[test]
fn kpi_report_lists_headline_numbers() {
    let dir = TempDir::new().unwrap();
    let (_config, storage) = seeded(&dir);

    let report = kpi_report(&storage, now()).unwrap();
    assert!(report.starts_with("Total Projects: 5\nCompleted Projects: 1\nAverage Completion: 63.0%\n"));
    assert!(report.contains("Projects On Track: 80.00%"));
    assert!(report.contains("Projects by Status:"));
    assert!(report.contains("Completion by Owner:"));
    assert!(report.contains("  Lisa Wang: 100.0% (1 projects)"));
}

#[rstest]
#[case(ExportFormat::Csv, vec!["project_export_20251006_140509.csv"])]
#[case(ExportFormat::Jira, vec!["jira_import_20251006_140509.csv"])]
#[case(
    ExportFormat::Powerbi,
    vec![
        "powerbi_projects_20251006_140509.csv",
        "powerbi_milestones_20251006_140509.csv",
        "powerbi_risks_20251006_140509.csv",
    ]
)]
fn export_writes_stamped_files(#[case] format: ExportFormat, #[case] expected: Vec<&str>) {
    let dir = TempDir::new().unwrap();
    let (config, storage) = seeded(&dir);

    let files = write_export(&storage, &config, format, now()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, expected);

    for file in &files {
        assert!(file.path.starts_with(dir.path().join("exports")));
        assert!(file.rows > 0);
        let content = fs::read_to_string(&file.path).unwrap();
        assert!(content.lines().count() > file.rows);
    }
}

#[test]
fn jira_export_uses_configured_key() {
    let dir = TempDir::new().unwrap();
    let (config, storage) = seeded(&dir);

    let files = write_export(&storage, &config, ExportFormat::Jira, now()).unwrap();
    let content = fs::read_to_string(&files[0].path).unwrap();
    assert!(content.contains("TRK"));

    let bundles = Portfolio::load(&storage).unwrap();
    let issues: usize = bundles
        .iter()
        .map(|b| 1 + b.milestones.len() + b.risks.len())
        .sum();
    assert_eq!(files[0].rows, issues);
}
