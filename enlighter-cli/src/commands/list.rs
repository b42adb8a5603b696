//! `enlighter list`: what the content tree holds, as a table or JSON.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use enlighter_core::{content, ProjectContent};

use super::ContentArgs;

/// Arguments for `enlighter list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.content.settings()?;
        let tree = content::load_tree(
            &self.content.root,
            &settings.layout,
            settings.features.require_stage_metadata,
        )
        .context("failed to load content tree")?;
        let templates = content::list_templates(&self.content.root, &settings.layout)
            .context("failed to list templates")?;

        let projects: Vec<ProjectJson> = tree.iter().map(ProjectJson::from).collect();
        if self.json {
            let payload = ListJson {
                projects,
                templates: templates.into_iter().map(|t| t.name).collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize list JSON")?
            );
            return Ok(());
        }

        println!(
            "{} projects | {} stages | {} templates",
            projects.len(),
            projects.iter().map(|p| p.stages.len()).sum::<usize>(),
            templates.len()
        );
        for project in projects {
            println!("{}", format!("{} {}", project.id, project.title).bold());
            if project.stages.is_empty() {
                println!("  (no stages)");
                continue;
            }
            let mut table = Table::new(project.stages);
            table.with(Style::rounded());
            println!("{table}");
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ListJson {
    projects: Vec<ProjectJson>,
    templates: Vec<String>,
}

#[derive(Serialize)]
struct ProjectJson {
    id: i64,
    directory: String,
    title: String,
    stages: Vec<StageRow>,
}

#[derive(Serialize, Tabled)]
struct StageRow {
    #[tabled(rename = "order")]
    order_num: i64,
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "file")]
    file: String,
}

impl From<&ProjectContent> for ProjectJson {
    fn from(project: &ProjectContent) -> Self {
        Self {
            id: project.meta.id,
            directory: project.dir.name.clone(),
            title: project.meta.title.clone(),
            stages: project
                .stages
                .iter()
                .map(|stage| StageRow {
                    order_num: stage.file.name.order_num,
                    id: stage.file.name.real_id,
                    title: stage.title().to_string(),
                    file: stage.file.rel_path.clone(),
                })
                .collect(),
        }
    }
}
