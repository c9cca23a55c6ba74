//! Plain-text rendering of API data and errors.

use calebe_core::auth::{menu_for, SessionError};
use calebe_core::models::{Challenge, Devotional, District, Team, TeamResponse, User};
use calebe_core::utils::{format_cpf, format_date, format_optional, truncate_string};
use calebe_core::{ApiError, FieldError, ValidationErrors};

/// Widest a table cell may grow before it is truncated
const MAX_CELL_WIDTH: usize = 40;

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No records found.".to_string();
    }

    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.iter().map(|c| truncate_string(c, MAX_CELL_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers, &widths)];
    out.push(line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    for row in &rows {
        out.push(line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    }
    out.join("\n")
}

fn line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn date_or_dash(date: &Option<String>) -> String {
    date.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
}

pub fn districts(districts: &[District]) -> String {
    let rows = districts
        .iter()
        .flat_map(|d| {
            d.churches.iter().map(move |c| {
                vec![d.id.to_string(), d.name.clone(), c.id.to_string(), c.name.clone()]
            })
        })
        .collect();
    table(&["District", "Name", "Church", "Name"], rows)
}

pub fn teams(teams: &[Team]) -> String {
    let rows = teams
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.name.clone(),
                t.instagram_handle().unwrap_or_else(|| "-".to_string()),
                t.church_name().to_string(),
                t.member_count().to_string(),
            ]
        })
        .collect();
    table(&["ID", "Team", "Instagram", "Church", "Members"], rows)
}

pub fn team(team: &Team) -> String {
    format!(
        "{} (#{})\nInstagram: {}\nChurch:    {}\nDistrict:  {}\n\n{}",
        team.name,
        team.id,
        team.instagram_handle().unwrap_or_else(|| "-".to_string()),
        team.church_name(),
        team.district_name(),
        members(&team.members)
    )
}

pub fn members(members: &[User]) -> String {
    let rows = members
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.display_name().to_string(),
                u.email.clone(),
                u.cpf.as_deref().map(format_cpf).unwrap_or_else(|| "-".to_string()),
                u.role.display_name().to_string(),
            ]
        })
        .collect();
    table(&["ID", "Name", "Email", "CPF", "Role"], rows)
}

pub fn challenges(challenges: &[Challenge]) -> String {
    let rows = challenges
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.title.clone(),
                c.points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                date_or_dash(&c.release),
                date_or_dash(&c.closing),
            ]
        })
        .collect();
    table(&["ID", "Title", "Points", "Release", "Closing"], rows)
}

pub fn challenge(challenge: &Challenge) -> String {
    format!(
        "{} (#{})\nPoints:  {}\nRelease: {}\nClosing: {}\nVideo:   {}\nCover:   {}\n\n{}",
        challenge.title,
        challenge.id,
        challenge.points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        date_or_dash(&challenge.release),
        date_or_dash(&challenge.closing),
        format_optional(&challenge.video, "-"),
        format_optional(&challenge.cover, "-"),
        format_optional(&challenge.content, ""),
    )
}

pub fn devotionals(devotionals: &[Devotional]) -> String {
    let rows = devotionals
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.title.clone(),
                d.kind().label().to_string(),
                date_or_dash(&d.release),
                d.author
                    .as_ref()
                    .map(|a| a.display_name().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    table(&["ID", "Title", "Type", "Release", "Author"], rows)
}

pub fn responses(challenge: &Challenge, rows: &[TeamResponse]) -> String {
    let body = rows
        .iter()
        .map(|row| match &row.response {
            Some(r) => {
                let images = r.attachments.iter().filter(|a| a.is_image()).count();
                vec![
                    r.id.to_string(),
                    row.team_name.clone(),
                    r.status_display().to_string(),
                    r.points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                    format!("{} image(s), {} video(s)", images, r.attachments.len() - images),
                ]
            }
            None => vec![
                "-".to_string(),
                row.team_name.clone(),
                "No answer".to_string(),
                "-".to_string(),
                "-".to_string(),
            ],
        })
        .collect();
    format!(
        "{} ({} points)\n\n{}",
        challenge.title,
        challenge.points.unwrap_or_default(),
        table(&["Response", "Team", "Status", "Points", "Files"], body)
    )
}

pub fn status(user: Option<&User>) -> String {
    let Some(user) = user else {
        return "Not signed in.".to_string();
    };

    let mut out = vec![format!(
        "Signed in as {} <{}> ({})",
        user.display_name(),
        user.email,
        user.role.display_name()
    )];
    out.push(String::new());
    for entry in menu_for(user) {
        let route = entry.route.map(|r| r.to_string()).unwrap_or_default();
        let state = if entry.enabled { "" } else { " (not available)" };
        out.push(format!("  {:<12} {}{}", entry.item.label(), route, state).trim_end().to_string());
    }
    out.join("\n")
}

fn field_lines(errors: &[FieldError]) -> Vec<String> {
    errors.iter().map(|e| format!("  {}: {}", e.field, e.message)).collect()
}

/// Lines describing a command failure, field errors one per line
pub fn error_lines(error: &anyhow::Error) -> Vec<String> {
    let fields = if let Some(v) = error.downcast_ref::<ValidationErrors>() {
        Some(v.errors())
    } else if let Some(e) = error.downcast_ref::<ApiError>() {
        Some(e.field_errors()).filter(|f| !f.is_empty())
    } else if let Some(SessionError::Api(e)) = error.downcast_ref::<SessionError>() {
        Some(e.field_errors()).filter(|f| !f.is_empty())
    } else {
        None
    };

    match fields {
        Some(fields) => {
            let mut lines = vec!["Please correct the following:".to_string()];
            lines.extend(field_lines(fields));
            lines
        }
        None => vec![format!("Error: {:#}", error)],
    }
}
