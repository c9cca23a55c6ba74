//! One handler per subcommand.

use anyhow::{bail, Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use calebe_core::auth::Route;
use calebe_core::forms::{
    ChallengeForm, Credentials, DevotionalForm, LeaderDraft, MemberForm, PasswordResetForm, ReviewForm, TeamDraft,
    TeamPayload, TeamRegistration,
};
use calebe_core::models::User;

use crate::app::App;
use crate::cli::{
    ChallengeArgs, ChallengeCommand, Command, DevotionalArgs, DevotionalCommand, MemberArgs, MemberCommand,
    RegisterTeamArgs, ResponseCommand, TeamCommand,
};
use crate::prompt::{confirm, prompt_line, prompt_password};
use crate::render;

/// Storage folder for challenge media
const CHALLENGE_FOLDER: &str = "desafio";

/// Storage folder for devotional media
const DEVOTIONAL_FOLDER: &str = "devocional";

/// Print `value` as JSON or as the text `table` renders
fn output<T: Serialize + ?Sized>(json: bool, value: &T, table: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", table(value));
    }
    Ok(())
}

pub async fn run(app: &mut App, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Login { email } => login(app, email).await,
        Command::Logout => {
            app.session.logout().await?;
            println!("Signed out.");
            Ok(())
        }
        Command::Status => {
            let user = app.session.user();
            if json {
                println!("{}", serde_json::to_string_pretty(&app.session.current())?);
            } else {
                println!("{}", render::status(user.as_ref()));
            }
            Ok(())
        }
        Command::Recover { email } => recover(app, email).await,
        Command::ResetPassword { link } => reset_password(app, &link).await,
        Command::Districts => {
            let districts = app.api().list_districts().await?;
            output(json, districts.as_slice(), render::districts)
        }
        Command::RegisterTeam(args) => register_team(app, args).await,
        Command::Teams(cmd) => teams(app, cmd, json).await,
        Command::Members(cmd) => members(app, cmd, json).await,
        Command::Challenges(cmd) => challenges(app, cmd, json).await,
        Command::Devotionals(cmd) => devotionals(app, cmd, json).await,
        Command::Responses(cmd) => responses(app, cmd, json).await,
        Command::Upload { folder, path } => {
            app.require(Route::Home)?;
            let url = app.upload_file(&folder, &path).await?;
            println!("{}", url);
            Ok(())
        }
    }
}

// ===== Session =====

async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    println!("\n=== Calebe Login ===\n");

    let email = match email {
        Some(email) => email,
        None => prompt_line("Email", app.config.last_email.as_deref())?,
    };
    let password = prompt_password("Password")?;

    let credentials = Credentials::new(email, password);
    credentials.validate()?;

    let user = app.session.login(&credentials).await?;
    app.remember_email(&credentials.email);

    println!("{}", render::status(Some(&user)));
    Ok(())
}

async fn recover(app: &App, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email", app.config.last_email.as_deref())?,
    };
    let credentials = Credentials::new(email, "");
    credentials.validate_email_only()?;

    app.session.request_password_reset(&credentials.email).await?;
    println!("If {} is registered, reset instructions are on their way.", credentials.email);
    Ok(())
}

/// Accepts the full reset URL or just its `/recuperar/<token>/<id>` path
fn parse_reset_link(link: &str) -> Result<(String, i64)> {
    let path = match link.find("/recuperar/") {
        Some(start) => &link[start..],
        None => link,
    };
    match Route::parse(path) {
        Some(Route::PasswordReset { token, user_id }) => Ok((token, user_id)),
        _ => bail!("Not a password reset link: {}", link),
    }
}

async fn reset_password(app: &App, link: &str) -> Result<()> {
    let (token, user_id) = parse_reset_link(link)?;
    app.open(Route::PasswordReset {
        token: token.clone(),
        user_id,
    })?;

    let form = PasswordResetForm {
        password: prompt_password("New password")?,
        confirm_password: prompt_password("Confirm new password")?,
    };
    let payload = form.into_payload()?;

    app.session.complete_password_reset(&token, user_id, &payload).await?;
    println!("Password changed. Sign in with `calebe login`.");
    Ok(())
}

async fn register_team(app: &App, args: RegisterTeamArgs) -> Result<()> {
    app.open(Route::TeamRegistration)?;

    let districts = app.api().list_districts().await?;
    let password = prompt_password("Leader password")?;

    let registration = TeamRegistration {
        team: TeamDraft {
            name: args.name,
            instagram: args.instagram,
            district_id: Some(args.district),
            church_id: Some(args.church),
        },
        leader: LeaderDraft {
            name: args.leader_name,
            email: args.leader_email,
            cpf: args.leader_cpf,
            password,
        },
    }
    .prepare(&districts)?;

    app.api().register_team(&registration).await?;
    info!(team = %registration.team.name, "Team registered");
    println!(
        "Team {} registered. {} can now sign in.",
        registration.team.name, registration.leader.email
    );
    Ok(())
}

// ===== Teams and members =====

async fn teams(app: &App, cmd: TeamCommand, json: bool) -> Result<()> {
    match cmd {
        TeamCommand::List => {
            app.require(Route::Teams)?;
            let teams = app.api().list_teams().await?;
            output(json, teams.as_slice(), render::teams)
        }
        TeamCommand::Show { id } => {
            app.require(Route::TeamMembers(id))?;
            let team = app.api().get_team(id).await?;
            output(json, &team, render::team)
        }
        TeamCommand::Update { id, name, instagram } => {
            app.require(Route::TeamMembers(id))?;
            let team = app.api().get_team(id).await?;
            let payload = TeamPayload::new(
                name.as_deref().unwrap_or(&team.name),
                instagram.as_deref().or(team.instagram.as_deref()).unwrap_or_default(),
            )?;
            app.api().update_team(id, &payload).await?;
            println!("Team {} updated.", id);
            Ok(())
        }
    }
}

fn apply_member_args(mut form: MemberForm, args: MemberArgs) -> MemberForm {
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(email) = args.email {
        form.email = email;
    }
    if let Some(cpf) = args.cpf {
        form.cpf = cpf;
    }
    if args.role.is_some() {
        form.role = args.role;
    }
    form
}

async fn members(app: &App, cmd: MemberCommand, json: bool) -> Result<()> {
    match cmd {
        MemberCommand::List { team } => {
            let (team, _) = app.roster(team)?;
            let team = app.api().get_team(team).await?;
            output(json, team.members.as_slice(), render::members)
        }
        MemberCommand::Add { team, fields } => {
            let (team, acting) = app.roster(team)?;
            let payload = apply_member_args(MemberForm::default(), fields).into_payload(acting.role, team)?;
            app.api().create_member(&payload).await?;
            println!("{} added to team {}.", payload.name, payload.team_id);
            Ok(())
        }
        MemberCommand::Update { id, team, fields } => {
            let (team, acting) = app.roster(team)?;
            let existing = find_member(app, team, id).await?;
            let payload = apply_member_args(MemberForm::from_user(&existing), fields).into_payload(acting.role, team)?;
            app.api().update_member(id, &payload).await?;
            println!("Member {} updated.", id);
            Ok(())
        }
        MemberCommand::Delete { id, team } => {
            let (team, _) = app.roster(team)?;
            let existing = find_member(app, team, id).await?;
            if !confirm(&format!("Remove {} from the team?", existing.display_name()))? {
                return Ok(());
            }
            app.api().delete_member(id).await?;
            println!("Member {} removed.", id);
            Ok(())
        }
    }
}

async fn find_member(app: &App, team: i64, id: i64) -> Result<User> {
    let team = app.api().get_team(team).await?;
    team.members
        .into_iter()
        .find(|m| m.id == id)
        .with_context(|| format!("Member {} is not in team {}", id, team.id))
}

// ===== Content =====

async fn challenge_form(app: &App, mut form: ChallengeForm, args: ChallengeArgs) -> Result<ChallengeForm> {
    if let Some(title) = args.title {
        form.title = title;
    }
    if let Some(content) = args.content {
        form.content = content;
    }
    if args.points.is_some() {
        form.points = args.points;
    }
    if args.release.is_some() {
        form.release = args.release;
    }
    if args.closing.is_some() {
        form.closing = args.closing;
    }
    form.video = match args.video_file {
        Some(path) => Some(app.upload_file(CHALLENGE_FOLDER, &path).await?),
        None => args.video.or(form.video),
    };
    form.cover = match args.cover_file {
        Some(path) => Some(app.upload_file(CHALLENGE_FOLDER, &path).await?),
        None => args.cover.or(form.cover),
    };
    Ok(form)
}

async fn challenges(app: &App, cmd: ChallengeCommand, json: bool) -> Result<()> {
    app.require(Route::Challenges)?;
    match cmd {
        ChallengeCommand::List => {
            let challenges = app.api().list_challenges().await?;
            output(json, challenges.as_slice(), render::challenges)
        }
        ChallengeCommand::Show { id } => {
            let challenge = app.api().get_challenge(id).await?;
            output(json, &challenge, render::challenge)
        }
        ChallengeCommand::Create(args) => {
            let payload = challenge_form(app, ChallengeForm::default(), args).await?.into_payload(&Local)?;
            app.api().create_challenge(&payload).await?;
            println!("Challenge \"{}\" created.", payload.title);
            Ok(())
        }
        ChallengeCommand::Update { id, fields } => {
            let existing = app.api().get_challenge(id).await?;
            let payload = challenge_form(app, ChallengeForm::from_challenge(&existing, &Local), fields)
                .await?
                .into_payload(&Local)?;
            app.api().update_challenge(id, &payload).await?;
            println!("Challenge {} updated.", id);
            Ok(())
        }
        ChallengeCommand::Delete { id } => {
            if !confirm(&format!("Delete challenge {}?", id))? {
                return Ok(());
            }
            app.api().delete_challenge(id).await?;
            println!("Challenge {} deleted.", id);
            Ok(())
        }
    }
}

async fn devotional_form(app: &App, mut form: DevotionalForm, args: DevotionalArgs) -> Result<DevotionalForm> {
    if let Some(title) = args.title {
        form.title = title;
    }
    if let Some(kind) = args.kind {
        form.kind = kind;
    }
    if args.verse.is_some() {
        form.verse = args.verse;
    }
    if args.content.is_some() {
        form.content = args.content;
    }
    if args.release.is_some() {
        form.release = args.release;
    }
    // Media is only uploaded when the chosen kind shows it
    form.video = match args.video_file {
        Some(path) if form.kind.shows_video() => Some(app.upload_file(DEVOTIONAL_FOLDER, &path).await?),
        _ => args.video.or(form.video),
    };
    form.cover = match args.cover_file {
        Some(path) if form.kind.shows_cover() => Some(app.upload_file(DEVOTIONAL_FOLDER, &path).await?),
        _ => args.cover.or(form.cover),
    };
    Ok(form)
}

async fn devotionals(app: &App, cmd: DevotionalCommand, json: bool) -> Result<()> {
    app.require(Route::Devotionals)?;
    match cmd {
        DevotionalCommand::List => {
            let devotionals = app.api().list_devotionals().await?;
            output(json, devotionals.as_slice(), render::devotionals)
        }
        DevotionalCommand::Create(args) => {
            let payload = devotional_form(app, DevotionalForm::default(), args)
                .await?
                .into_new_payload(&Local::now())?;
            app.api().create_devotional(&payload).await?;
            println!("Devotional \"{}\" created.", payload.title);
            Ok(())
        }
        DevotionalCommand::Update { id, fields } => {
            let existing = app
                .api()
                .list_devotionals()
                .await?
                .into_iter()
                .find(|d| d.id == id)
                .with_context(|| format!("Devotional {} not found", id))?;
            let payload = devotional_form(app, DevotionalForm::from_devotional(&existing, &Local), fields)
                .await?
                .into_payload(&Local)?;
            app.api().update_devotional(id, &payload).await?;
            println!("Devotional {} updated.", id);
            Ok(())
        }
        DevotionalCommand::Delete { id } => {
            if !confirm(&format!("Delete devotional {}?", id))? {
                return Ok(());
            }
            app.api().delete_devotional(id).await?;
            println!("Devotional {} deleted.", id);
            Ok(())
        }
    }
}

async fn responses(app: &App, cmd: ResponseCommand, json: bool) -> Result<()> {
    match cmd {
        ResponseCommand::List { challenge } => {
            app.require(Route::Responses(challenge))?;
            let rows = app.api().list_responses(challenge).await?;
            let challenge = app.api().get_challenge(challenge).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", render::responses(&challenge, &rows));
            }
            Ok(())
        }
        ResponseCommand::Review { id, points } => {
            app.require(Route::Challenges)?;
            let payload = ReviewForm { points: Some(points) }.into_payload()?;
            app.api().review_response(id, &payload).await?;
            println!("Response {} scored {} points.", id, payload.points);
            Ok(())
        }
        ResponseCommand::Delete { id } => {
            app.require(Route::Challenges)?;
            if !confirm(&format!("Delete response {}?", id))? {
                return Ok(());
            }
            app.api().delete_response(id).await?;
            println!("Response {} deleted.", id);
            Ok(())
        }
    }
}
