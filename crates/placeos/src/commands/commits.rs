//! `placeos commits`: driver file history in a repository.

use placeos_core::{Commit, CoreError, Provider, Repository};
use tabled::Tabled;

use crate::cli::{CommitsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct CommitRow {
    #[tabled(rename = "Commit")]
    commit: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Subject")]
    subject: String,
}

impl From<&Commit> for CommitRow {
    fn from(c: &Commit) -> Self {
        Self {
            commit: c.commit.chars().take(12).collect(),
            date: c.date.clone(),
            author: c.author.clone(),
            subject: c.subject.clone(),
        }
    }
}

pub async fn handle(
    provider: &Provider,
    args: &CommitsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let repos = provider.entities::<Repository>();

    if args.last {
        let hash = repos
            .last_commit(&args.repo, &args.driver_file)
            .await
            .map_err(CoreError::from)?;
        output::print_output(&hash, global.quiet);
        return Ok(());
    }

    let commits = repos
        .commits(&args.repo, &args.driver_file)
        .await
        .map_err(CoreError::from)?;
    let out = output::render_rows(
        global.output,
        &commits,
        |c| CommitRow::from(c),
        |c| c.commit.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
