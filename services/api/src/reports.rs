use crate::infra::{parse_bulk_status, parse_date, parse_incidence};
use building_ops::config::{AppConfig, ReportConfig};
use building_ops::error::AppError;
use building_ops::workflows::checklist::ItemStatus;
use building_ops::workflows::master_data::{export_template, MasterDataImporter};
use building_ops::workflows::report::{ReportArtifacts, ReportFields};
use building_ops::workflows::session::Session;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    /// Destination for the master-data workbook
    #[arg(long, default_value = "plantilla_maestro.xlsx")]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Master-data spreadsheet or CSV replacing the built-in checklist
    #[arg(long)]
    pub(crate) master_data: Option<PathBuf>,
    /// Community name (defaults to APP_COMMUNITY_NAME)
    #[arg(long)]
    pub(crate) community: Option<String>,
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Requirements and purchases to list in the report
    #[arg(long)]
    pub(crate) needs: Option<String>,
    /// HR incidence as "Employee: detail"; repeat for several
    #[arg(long, value_parser = parse_incidence)]
    pub(crate) incidence: Vec<(String, String)>,
    /// Mark every checklist item as pending or ok before exporting
    #[arg(long, value_parser = parse_bulk_status)]
    pub(crate) mark_all: Option<ItemStatus>,
    /// Directory receiving the .txt, .pdf and .docx files
    #[arg(long, default_value = ".")]
    pub(crate) output_dir: PathBuf,
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    write_template(&args.output)?;
    println!("Master-data template written to {}", args.output.display());
    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let session = build_session(&args, &config.report)?;
    let snapshot = session.snapshot();
    let artifacts = ReportArtifacts::render(&snapshot)?;

    println!("{}", artifacts.text);
    println!();
    for path in write_artifacts(&artifacts, &args.output_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub(crate) fn write_template(output: &Path) -> Result<(), AppError> {
    let workbook = export_template()?;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, workbook)?;
    Ok(())
}

/// Applies the command-line inputs to a fresh session, in the order an
/// operator would: catalog, bulk status, then incidences.
pub(crate) fn build_session(
    args: &ReportArgs,
    defaults: &ReportConfig,
) -> Result<Session, AppError> {
    let community_name = args
        .community
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| defaults.community_name.clone());
    let report_date = args.date.unwrap_or_else(|| Local::now().date_naive());

    let mut fields = ReportFields::new(community_name, report_date);
    if let Some(needs) = &args.needs {
        fields.needs = needs.clone();
    }
    let mut session = Session::new(fields);

    if let Some(path) = &args.master_data {
        MasterDataImporter::from_path(path, &mut session.checklist)?;
    }
    if let Some(status) = args.mark_all {
        session.checklist.set_all_status(status);
    }
    for (employee, detail) in &args.incidence {
        session.incidences.add(employee, detail)?;
    }

    Ok(session)
}

pub(crate) fn write_artifacts(
    artifacts: &ReportArtifacts,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    for (file_name, contents) in artifacts.files() {
        let path = output_dir.join(file_name);
        std::fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ReportArgs {
        ReportArgs {
            community: Some("Torre Norte".to_string()),
            date: Some(NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")),
            ..ReportArgs::default()
        }
    }

    #[test]
    fn build_session_applies_bulk_status_and_incidences() {
        let mut args = args();
        args.mark_all = Some(ItemStatus::Ok);
        args.needs = Some("Cloro".to_string());
        args.incidence = vec![("Ana".to_string(), "Atraso".to_string())];

        let session = build_session(&args, &ReportConfig::default()).expect("session builds");
        assert_eq!(session.checklist.stats().ok, 15);
        assert_eq!(session.incidences.len(), 1);
        assert_eq!(session.fields.needs, "Cloro");
        assert_eq!(session.fields.community_name, "Torre Norte");
    }

    #[test]
    fn build_session_falls_back_to_configured_community() {
        let mut args = args();
        args.community = Some("   ".to_string());
        let defaults = ReportConfig {
            community_name: "Edificio Central".to_string(),
        };
        let session = build_session(&args, &defaults).expect("session builds");
        assert_eq!(session.fields.community_name, "Edificio Central");
    }

    #[test]
    fn template_written_by_cli_imports_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let output = dir.path().join("nested").join("maestro.xlsx");
        write_template(&output).expect("template written");

        let mut args = args();
        args.master_data = Some(output);
        let session = build_session(&args, &ReportConfig::default()).expect("session builds");
        assert_eq!(session.checklist.len(), 15);
    }

    #[test]
    fn invalid_master_data_fails_the_command() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("maestro.csv");
        std::fs::write(&path, "Nombre\nBomba\n").expect("csv written");

        let mut args = args();
        args.master_data = Some(path);
        let err =
            build_session(&args, &ReportConfig::default()).expect_err("missing Type column");
        assert!(matches!(err, AppError::MasterData(_)));
    }

    #[test]
    fn report_files_land_in_output_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let session = build_session(&args(), &ReportConfig::default()).expect("session builds");
        let artifacts = ReportArtifacts::render(&session.snapshot()).expect("renders");

        let written = write_artifacts(&artifacts, dir.path()).expect("files written");
        let names: Vec<String> = written
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "informe_torre_norte_2025-03-14.txt",
                "informe_torre_norte_2025-03-14.pdf",
                "informe_torre_norte_2025-03-14.docx",
            ]
        );
        let text = std::fs::read_to_string(&written[0]).expect("text readable");
        assert!(text.starts_with("--- INFORME DE GESTIÓN"));
    }
}
