use buddy_core::editor::detect_language;
use buddy_core::model::ProjectId;
use services::AppServices;

use super::code::read_source;
use crate::cli::LibraryCommand;

pub async fn run(services: &AppServices, command: LibraryCommand) -> anyhow::Result<()> {
    let library = services.library();
    match command {
        LibraryCommand::Save { file, language } => {
            let code = read_source(&file)?;
            let language = language.unwrap_or_else(|| detect_language(&code));
            let id = library.save(code, language).await?;
            println!("Saved {language} project {id}.");
        }
        LibraryCommand::List { limit } => {
            let projects = library.list(limit).await?;
            if projects.is_empty() {
                println!("No saved projects yet.");
            }
            for project in projects {
                println!(
                    "[{}] {} {} ({} lines)",
                    project.id(),
                    project.language(),
                    project.saved_at().format("%Y-%m-%d %H:%M"),
                    project.line_count()
                );
                for line in project.preview().lines() {
                    println!("    {line}");
                }
            }
        }
        LibraryCommand::Search { term } => {
            for project in library.search(&term).await? {
                println!("[{}] {}: {}", project.id(), project.language(), project.preview().replace('\n', " "));
            }
        }
        LibraryCommand::Open { id } => {
            let project = library.open(ProjectId::new(id)).await?;
            println!("{}", project.code());
        }
        LibraryCommand::Delete { id } => {
            library.delete(ProjectId::new(id)).await?;
            println!("Deleted project {id}.");
        }
        LibraryCommand::Stats => {
            let stats = library.stats().await?;
            println!(
                "{} projects, {} languages, {} lines",
                stats.projects, stats.languages, stats.total_lines
            );
        }
    }
    Ok(())
}
