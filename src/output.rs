use std::fmt::Write as _;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::linear::graphql::Listing;
use crate::types::{
    Comment, Issue, IssueDetail, IssueRef, Member, Project, ProjectDetail, TeamDetail, User,
    priority_label,
};
use crate::util::{format_date, truncate};

const TITLE_WIDTH: usize = 40;
const PROJECT_NAME_WIDTH: usize = 25;
const DESCRIPTION_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    /// Markdown, for pasting or piping into other tools.
    Plaintext,
    Json,
}

impl OutputFormat {
    /// Pick the format from global flags; `--json` wins over `--plaintext`.
    pub fn from_flags(json: bool, plaintext: bool, fallback: Self) -> Self {
        if json {
            Self::Json
        } else if plaintext {
            Self::Plaintext
        } else {
            fallback
        }
    }
}

/// Labels used when rendering an issue or member collection.
pub struct CollectionText<'a> {
    pub empty: &'a str,
    pub summary: &'a str,
    pub heading: &'a str,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Left-aligned columns sized by display width.
struct Table {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Table {
    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }

        push_row(out, &widths, self.headers.iter().copied());
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_row(out, &widths, rule.iter().map(String::as_str));
        for row in &self.rows {
            push_row(out, &widths, row.iter().map(String::as_str));
        }
    }
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (cell, w) in cells.zip(widths) {
        line.push_str(cell);
        line.push_str(&" ".repeat(w.saturating_sub(cell.width()) + 2));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

pub struct Renderer {
    pub format: OutputFormat,
    pub date_format: String,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

fn user_name(user: Option<&User>) -> &str {
    user.map_or("Unassigned", |u| u.name.as_str())
}

fn more_hint(out: &mut String, has_more: bool) {
    if has_more {
        out.push_str("Use --limit to see more results\n");
    }
}

impl Renderer {
    pub fn new(format: OutputFormat, date_format: impl Into<String>) -> Self {
        Self {
            format,
            date_format: date_format.into(),
        }
    }

    fn date(&self, dt: &chrono::DateTime<chrono::Utc>) -> String {
        format_date(dt, &self.date_format)
    }

    pub fn issues(&self, listing: &Listing<Issue>, text: &CollectionText<'_>) -> Result<String> {
        let issues = &listing.items;
        if self.format == OutputFormat::Json {
            return to_json(issues);
        }
        if issues.is_empty() {
            return Ok(format!("{}\n", text.empty));
        }

        let mut out = String::new();
        match self.format {
            OutputFormat::Plaintext => {
                writeln!(out, "{}", text.heading)?;
                for issue in issues {
                    writeln!(out, "## {}", issue.title)?;
                    writeln!(out, "- **ID**: {}", issue.identifier)?;
                    if let Some(state) = &issue.state {
                        writeln!(out, "- **State**: {}", state.name)?;
                    }
                    writeln!(out, "- **Assignee**: {}", user_name(issue.assignee.as_ref()))?;
                    if let Some(team) = &issue.team {
                        writeln!(out, "- **Team**: {}", team.key)?;
                    }
                    writeln!(out, "- **Created**: {}", self.date(&issue.created_at))?;
                    writeln!(out, "- **URL**: {}", issue.url)?;
                    if !issue.description.is_empty() {
                        writeln!(out, "- **Description**: {}", issue.description)?;
                    }
                    out.push('\n');
                }
                writeln!(out, "\nTotal: {} {}", issues.len(), text.summary)?;
            }
            _ => {
                let table = Table {
                    headers: &["ID", "Title", "State", "Assignee", "Team", "Created", "URL"],
                    rows: issues
                        .iter()
                        .map(|issue| {
                            vec![
                                issue.identifier.clone(),
                                truncate(&issue.title, TITLE_WIDTH),
                                issue.state.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                                user_name(issue.assignee.as_ref()).to_owned(),
                                issue.team.as_ref().map(|t| t.key.clone()).unwrap_or_default(),
                                self.date(&issue.created_at),
                                issue.url.clone(),
                            ]
                        })
                        .collect(),
                };
                table.render(&mut out);
                writeln!(out, "\n{} {}", issues.len(), text.summary)?;
            }
        }

        more_hint(&mut out, listing.has_more);
        Ok(out)
    }

    pub fn issue_detail(&self, detail: &IssueDetail) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(detail);
        }

        let issue = &detail.issue;
        let mut out = String::new();
        writeln!(out, "# {} - {}\n", issue.identifier, issue.title)?;
        if !issue.description.is_empty() {
            writeln!(out, "## Description\n{}\n", issue.description)?;
        }

        writeln!(out, "## Details")?;
        if let Some(state) = &issue.state {
            writeln!(out, "- **State**: {} ({})", state.name, state.kind)?;
        }
        match &issue.assignee {
            Some(a) => {
                writeln!(out, "- **Assignee**: {} ({})", a.name, a.email)?;
            }
            None => {
                writeln!(out, "- **Assignee**: Unassigned")?;
            }
        }
        if let Some(creator) = &detail.creator {
            writeln!(out, "- **Creator**: {} ({})", creator.name, creator.email)?;
        }
        if let Some(team) = &issue.team {
            writeln!(out, "- **Team**: {} ({})", team.name, team.key)?;
        }
        writeln!(
            out,
            "- **Priority**: {} ({})",
            priority_label(issue.priority),
            issue.priority
        )?;
        if let Some(estimate) = issue.estimate {
            writeln!(out, "- **Estimate**: {estimate:.1}")?;
        }
        if let Some(project) = &detail.project_name {
            writeln!(out, "- **Project**: {project}")?;
        }
        if !issue.labels.is_empty() {
            let names: Vec<_> = issue.labels.iter().map(|l| l.name.as_str()).collect();
            writeln!(out, "- **Labels**: {}", names.join(", "))?;
        }
        writeln!(out, "- **Created**: {}", self.date(&issue.created_at))?;
        writeln!(out, "- **Updated**: {}", self.date(&issue.updated_at))?;
        if let Some(done) = &detail.completed_at {
            writeln!(out, "- **Completed**: {}", self.date(done))?;
        }
        if let Some(due) = &issue.due_date {
            writeln!(out, "- **Due Date**: {due}")?;
        }
        if !detail.branch_name.is_empty() {
            writeln!(out, "- **Git Branch**: {}", detail.branch_name)?;
        }
        writeln!(out, "- **URL**: {}", issue.url)?;

        if let Some(parent) = &detail.parent {
            writeln!(out, "\n## Parent Issue\n- {}: {}", parent.identifier, parent.title)?;
        }

        if !detail.children.is_empty() {
            writeln!(out, "\n## Sub-issues")?;
            for child in &detail.children {
                writeln!(
                    out,
                    "- {} {}: {} ({})",
                    checkbox(child),
                    child.identifier,
                    child.title,
                    user_name(child.assignee.as_ref())
                )?;
            }
        }

        if !detail.comments.is_empty() {
            writeln!(out, "\n## Recent Comments")?;
            for comment in &detail.comments {
                writeln!(
                    out,
                    "\n### {} - {}\n{}",
                    comment.author.as_ref().map_or("Unknown", |u| u.name.as_str()),
                    comment.created_at.format("%Y-%m-%d %H:%M"),
                    comment.body
                )?;
            }
        }

        Ok(out)
    }

    pub fn projects(&self, listing: &Listing<Project>) -> Result<String> {
        let projects = &listing.items;
        if self.format == OutputFormat::Json {
            return to_json(projects);
        }
        if projects.is_empty() {
            return Ok("No projects found\n".to_owned());
        }

        let mut out = String::new();
        match self.format {
            OutputFormat::Plaintext => {
                out.push_str("# Projects\n");
                for project in projects {
                    writeln!(out, "## {}", project.name)?;
                    writeln!(out, "- **ID**: {}", project.id)?;
                    writeln!(out, "- **State**: {}", project.state)?;
                    writeln!(out, "- **Progress**: {:.0}%", project.progress * 100.0)?;
                    writeln!(out, "- **Lead**: {}", user_name(project.lead.as_ref()))?;
                    if !project.teams.is_empty() {
                        writeln!(out, "- **Teams**: {}", project.team_keys())?;
                    }
                    if let Some(start) = &project.start_date {
                        writeln!(out, "- **Start Date**: {start}")?;
                    }
                    if let Some(target) = &project.target_date {
                        writeln!(out, "- **Target Date**: {target}")?;
                    }
                    writeln!(out, "- **Created**: {}", self.date(&project.created_at))?;
                    writeln!(out, "- **Updated**: {}", self.date(&project.updated_at))?;
                    writeln!(out, "- **URL**: {}", project.url)?;
                    if !project.description.is_empty() {
                        writeln!(out, "- **Description**: {}", project.description)?;
                    }
                    out.push('\n');
                }
                writeln!(out, "\nTotal: {} projects", projects.len())?;
            }
            _ => {
                let table = Table {
                    headers: &["Name", "State", "Lead", "Teams", "Created", "Updated", "URL"],
                    rows: projects
                        .iter()
                        .map(|p| {
                            vec![
                                truncate(&p.name, PROJECT_NAME_WIDTH),
                                p.state.clone(),
                                user_name(p.lead.as_ref()).to_owned(),
                                p.team_keys(),
                                self.date(&p.created_at),
                                self.date(&p.updated_at),
                                p.url.clone(),
                            ]
                        })
                        .collect(),
                };
                table.render(&mut out);
                writeln!(out, "\n{} projects", projects.len())?;
            }
        }

        more_hint(&mut out, listing.has_more);
        Ok(out)
    }

    pub fn project_detail(&self, detail: &ProjectDetail) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(detail);
        }

        let project = &detail.project;
        let mut out = String::new();
        writeln!(out, "# {}\n", project.name)?;
        if !project.description.is_empty() {
            writeln!(out, "## Description\n{}\n", project.description)?;
        }

        writeln!(out, "## Details")?;
        writeln!(out, "- **ID**: {}", project.id)?;
        writeln!(out, "- **State**: {}", project.state)?;
        writeln!(out, "- **Progress**: {:.0}%", project.progress * 100.0)?;
        if let Some(health) = &detail.health {
            writeln!(out, "- **Health**: {health}")?;
        }
        writeln!(out, "- **Lead**: {}", user_name(project.lead.as_ref()))?;
        if let Some(creator) = &detail.creator {
            writeln!(out, "- **Creator**: {} ({})", creator.name, creator.email)?;
        }
        if !project.teams.is_empty() {
            writeln!(out, "- **Teams**: {}", project.team_keys())?;
        }
        if let Some(start) = &project.start_date {
            writeln!(out, "- **Start Date**: {start}")?;
        }
        if let Some(target) = &project.target_date {
            writeln!(out, "- **Target Date**: {target}")?;
        }
        writeln!(out, "- **Created**: {}", self.date(&project.created_at))?;
        writeln!(out, "- **Updated**: {}", self.date(&project.updated_at))?;
        writeln!(out, "- **URL**: {}", project.url)?;

        if !detail.members.is_empty() {
            writeln!(out, "\n## Members")?;
            for member in &detail.members {
                writeln!(out, "- {} ({})", member.user.name, member.role())?;
            }
        }

        if !detail.issues.is_empty() {
            writeln!(out, "\n## Recent Issues")?;
            for issue in &detail.issues {
                writeln!(
                    out,
                    "- {}: {} [{}] ({})",
                    issue.identifier,
                    issue.title,
                    issue.state.as_ref().map_or("", |s| s.name.as_str()),
                    user_name(issue.assignee.as_ref())
                )?;
            }
        }

        Ok(out)
    }

    pub fn teams(&self, listing: &Listing<TeamDetail>) -> Result<String> {
        let teams = &listing.items;
        if self.format == OutputFormat::Json {
            return to_json(teams);
        }
        if teams.is_empty() {
            return Ok("No teams found\n".to_owned());
        }

        let mut out = String::new();
        match self.format {
            OutputFormat::Plaintext => {
                out.push_str("# Teams\n");
                for team in teams {
                    writeln!(out, "## {} ({})", team.team.name, team.team.key)?;
                    if !team.description.is_empty() {
                        writeln!(out, "- **Description**: {}", team.description)?;
                    }
                    writeln!(out, "- **Private**: {}", yes_no(team.private))?;
                    writeln!(out, "- **Issues**: {}", team.issue_count)?;
                    out.push('\n');
                }
                writeln!(out, "\nTotal: {} teams", teams.len())?;
            }
            _ => {
                let table = Table {
                    headers: &["Key", "Name", "Description", "Private", "Issues"],
                    rows: teams
                        .iter()
                        .map(|t| {
                            vec![
                                t.team.key.clone(),
                                t.team.name.clone(),
                                truncate(&t.description, DESCRIPTION_WIDTH),
                                yes_no(t.private).to_owned(),
                                t.issue_count.to_string(),
                            ]
                        })
                        .collect(),
                };
                table.render(&mut out);
                writeln!(out, "\n{} teams", teams.len())?;
            }
        }

        more_hint(&mut out, listing.has_more);
        Ok(out)
    }

    pub fn team(&self, team: &TeamDetail) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(team);
        }
        let mut out = String::new();
        writeln!(out, "# {} ({})", team.team.name, team.team.key)?;
        if !team.description.is_empty() {
            writeln!(out, "\n{}\n", team.description)?;
        }
        writeln!(out, "- **ID**: {}", team.team.id)?;
        writeln!(out, "- **Private**: {}", yes_no(team.private))?;
        writeln!(out, "- **Issues**: {}", team.issue_count)?;
        Ok(out)
    }

    /// Users of the workspace or of one team.
    pub fn members(&self, listing: &Listing<Member>, text: &CollectionText<'_>) -> Result<String> {
        let members = &listing.items;
        if self.format == OutputFormat::Json {
            return to_json(members);
        }
        if members.is_empty() {
            return Ok(format!("{}\n", text.empty));
        }

        let mut out = String::new();
        match self.format {
            OutputFormat::Plaintext => {
                writeln!(out, "{}", text.heading)?;
                for member in members {
                    writeln!(out, "## {}", member.user.name)?;
                    writeln!(out, "- **Email**: {}", member.user.email)?;
                    writeln!(out, "- **Role**: {}", member.role())?;
                    writeln!(out, "- **Status**: {}", member.status())?;
                    out.push('\n');
                }
                writeln!(out, "\nTotal: {} {}", members.len(), text.summary)?;
            }
            _ => {
                let table = Table {
                    headers: &["Name", "Email", "Role", "Status"],
                    rows: members
                        .iter()
                        .map(|m| {
                            let name = if m.is_me {
                                format!("{} (you)", m.user.name)
                            } else {
                                m.user.name.clone()
                            };
                            vec![
                                name,
                                m.user.email.clone(),
                                m.role().to_owned(),
                                m.status().to_owned(),
                            ]
                        })
                        .collect(),
                };
                table.render(&mut out);
                writeln!(out, "\n{} {}", members.len(), text.summary)?;
            }
        }

        more_hint(&mut out, listing.has_more);
        Ok(out)
    }

    pub fn member(&self, member: &Member) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(member),
            _ => Ok(format!(
                "# {}\n- **Email**: {}\n- **ID**: {}\n- **Role**: {}\n- **Status**: {}\n",
                member.user.name,
                member.user.email,
                member.user.id,
                member.role(),
                member.status()
            )),
        }
    }

    pub fn comments(&self, listing: &Listing<Comment>, issue_id: &str) -> Result<String> {
        let comments = &listing.items;
        if self.format == OutputFormat::Json {
            return to_json(comments);
        }
        if comments.is_empty() {
            return Ok(format!("No comments on issue {issue_id}\n"));
        }

        let mut out = String::new();
        writeln!(out, "# Comments on {issue_id} ({})", comments.len())?;
        for comment in comments {
            writeln!(
                out,
                "\n## {} - {}\n{}",
                comment.author.as_ref().map_or("Unknown", |u| u.name.as_str()),
                self.date(&comment.created_at),
                comment.body
            )?;
        }

        more_hint(&mut out, listing.has_more);
        Ok(out)
    }

    pub fn user(&self, user: &User) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(user),
            OutputFormat::Plaintext => Ok(format!(
                "# Current User\n- **Name**: {}\n- **Email**: {}\n- **ID**: {}\n",
                user.name, user.email, user.id
            )),
            OutputFormat::Table => Ok(format!("{} <{}>\n", user.name, user.email)),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn checkbox(issue: &IssueRef) -> &'static str {
    match issue.state.as_ref().map(|s| s.kind.as_str()) {
        Some("completed") => "[x]",
        Some("started") => "[~]",
        Some("canceled") => "[-]",
        _ => "[ ]",
    }
}
