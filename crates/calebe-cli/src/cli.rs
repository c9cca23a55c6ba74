//! Command line definition.

use std::path::PathBuf;

use calebe_core::models::{ContentKind, Role};
use calebe_core::utils::parse_input_date;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "calebe")]
#[command(version, about = "Admin panel for Calebe teams, challenges and devotionals")]
#[command(
    after_help = "Environment:\n  CALEBE_API_URL             API base URL\n  CALEBE_CREDENTIAL_BACKEND  file | keyring | memory\n  RUST_LOG                   Log filter (default: warn)"
)]
pub struct Cli {
    /// API base URL, overriding config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user and the menu available to them
    Status,
    /// Email password reset instructions
    Recover {
        #[arg(long)]
        email: Option<String>,
    },
    /// Set a new password from a reset link (`/recuperar/<token>/<id>`)
    ResetPassword { link: String },
    /// List districts and their churches
    Districts,
    /// Register a new team and its leader
    RegisterTeam(RegisterTeamArgs),
    #[command(subcommand)]
    Teams(TeamCommand),
    #[command(subcommand)]
    Members(MemberCommand),
    #[command(subcommand)]
    Challenges(ChallengeCommand),
    #[command(subcommand)]
    Devotionals(DevotionalCommand),
    #[command(subcommand)]
    Responses(ResponseCommand),
    /// Upload a file and print its URL
    Upload {
        #[arg(long, default_value = "devocional")]
        folder: String,
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RegisterTeamArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub instagram: String,
    #[arg(long)]
    pub district: i64,
    #[arg(long)]
    pub church: i64,
    #[arg(long)]
    pub leader_name: String,
    #[arg(long)]
    pub leader_email: String,
    #[arg(long)]
    pub leader_cpf: String,
}

#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    List,
    Show {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        instagram: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List a team's members (defaults to your own team)
    List {
        #[arg(long)]
        team: Option<i64>,
    },
    Add {
        #[arg(long)]
        team: Option<i64>,
        #[command(flatten)]
        fields: MemberArgs,
    },
    Update {
        id: i64,
        #[arg(long)]
        team: Option<i64>,
        #[command(flatten)]
        fields: MemberArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        team: Option<i64>,
    },
}

#[derive(Debug, Args, Default)]
pub struct MemberArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    /// membro, lider or pastor
    #[arg(long, value_parser = parse_role)]
    pub role: Option<Role>,
}

#[derive(Debug, Subcommand)]
pub enum ChallengeCommand {
    List,
    Show { id: i64 },
    Create(ChallengeArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ChallengeArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args, Default)]
pub struct ChallengeArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub points: Option<i64>,
    #[arg(long)]
    pub video: Option<String>,
    /// Upload this file and use it as the video
    #[arg(long, conflicts_with = "video")]
    pub video_file: Option<PathBuf>,
    #[arg(long)]
    pub cover: Option<String>,
    /// Upload this file and use it as the cover
    #[arg(long, conflicts_with = "cover")]
    pub cover_file: Option<PathBuf>,
    /// dd/mm/yyyy or yyyy-mm-dd
    #[arg(long, value_parser = parse_date)]
    pub release: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub closing: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum DevotionalCommand {
    List,
    Create(DevotionalArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: DevotionalArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args, Default)]
pub struct DevotionalArgs {
    #[arg(long)]
    pub title: Option<String>,
    /// text, video or image
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ContentKind>,
    #[arg(long)]
    pub verse: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub video: Option<String>,
    #[arg(long, conflicts_with = "video")]
    pub video_file: Option<PathBuf>,
    #[arg(long)]
    pub cover: Option<String>,
    #[arg(long, conflicts_with = "cover")]
    pub cover_file: Option<PathBuf>,
    #[arg(long, value_parser = parse_date)]
    pub release: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum ResponseCommand {
    /// Every team's answer to a challenge
    List { challenge: i64 },
    /// Score a response
    Review {
        id: i64,
        #[arg(long)]
        points: i64,
    },
    Delete { id: i64 },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_input_date(value).ok_or_else(|| format!("invalid date '{}', use dd/mm/yyyy", value))
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse()
}

fn parse_kind(value: &str) -> Result<ContentKind, String> {
    value.parse()
}
