use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::api::FieldType;
use crate::config::{ClientConfig, StatusPolicy};
use crate::tea::message::{BroadcastMessage, CodesMessage, FormMessage};
use crate::tea::{Message, Model, Session, Slot};

/// Intention broadcaster - terminal front end for the healing service
#[derive(Parser)]
#[command(name = "intention-broadcaster")]
#[command(about = "Broadcast intentions, search healing codes and browse the soul archive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the service origin
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Treat non-2xx responses as errors instead of results
    #[arg(long, global = true)]
    pub strict_status: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Broadcast an intention and show the resulting packet
    Broadcast(BroadcastArgs),

    /// Search the healing code catalog
    Codes {
        /// Search term; omit to list every code
        #[arg(default_value = "")]
        query: String,
    },

    /// Show the soul archive
    Archives,

    /// Broadcast an intention and print only its geometry image URL
    ImageUrl(BroadcastArgs),
}

#[derive(Args)]
pub struct BroadcastArgs {
    /// Intention text
    pub intention: String,

    /// Frequency in Hz, sent as typed
    #[arg(long, default_value = "7.83")]
    pub frequency: String,

    /// Geometry field
    #[arg(long, default_value = "flower_of_life")]
    pub field: FieldType,

    /// Amplify the broadcast
    #[arg(long)]
    pub amplify: bool,

    /// Amplification multiplier, sent as typed
    #[arg(long, default_value = "1.0")]
    pub multiplier: String,
}

impl BroadcastArgs {
    /// The edits a user would make in the form before submitting
    pub fn form_messages(&self) -> Vec<Message> {
        vec![
            FormMessage::IntentionChanged(self.intention.clone()).into(),
            FormMessage::FrequencyChanged(self.frequency.clone()).into(),
            FormMessage::FieldTypeSelected(self.field).into(),
            FormMessage::AmplifyToggled(self.amplify).into(),
            FormMessage::MultiplierChanged(self.multiplier.clone()).into(),
        ]
    }
}

impl Cli {
    /// Config file, then command line overrides
    pub async fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match self.config.clone().or_else(ClientConfig::default_path) {
            Some(path) => ClientConfig::load_from_file(&path).await?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.strict_status {
            config.status_policy = StatusPolicy::Strict;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = Some(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.resolve_config().await?;
        let mut session = Session::from_config(config)?;
        session.start();

        let output = match &self.command {
            Commands::Broadcast(args) => {
                submit_broadcast(&mut session, args).await?;
                render_broadcast(session.model())
            }
            Commands::ImageUrl(args) => {
                submit_broadcast(&mut session, args).await?;
                render_image_url(session.model())
            }
            Commands::Codes { query } => {
                session.dispatch(FormMessage::CodeQueryChanged(query.clone()).into());
                session.dispatch(CodesMessage::Search.into());
                session.settle().await;

                ensure_updated(&session.model().code_search_results, "Healing code search")?;
                render_codes(session.model())
            }
            Commands::Archives => {
                session.settle().await;

                ensure_updated(&session.model().archive_entries, "Soul archive load")?;
                render_archives(session.model())
            }
        };

        session.shutdown();
        print!("{}", output);
        Ok(())
    }
}

/// Fill the form from the arguments, submit it and wait for the packet
async fn submit_broadcast(session: &mut Session, args: &BroadcastArgs) -> Result<()> {
    for message in args.form_messages() {
        session.dispatch(message);
    }
    session.dispatch(BroadcastMessage::Submit.into());
    session.settle().await;

    ensure_updated(&session.model().latest_broadcast, "Broadcast")
}

/// Surface a failed call to the caller; the slot itself stays as it was
fn ensure_updated<T>(slot: &Slot<T>, operation: &str) -> Result<()> {
    if let Some(error) = slot.last_error() {
        bail!("{} failed: {}", operation, error);
    }
    Ok(())
}

pub fn render_broadcast(model: &Model) -> String {
    let Some(summary) = model.broadcast_summary() else {
        return "No broadcast yet\n".to_string();
    };

    let mut out = String::new();
    for (label, value) in summary.rows() {
        let _ = writeln!(out, "{}: {}", label, value);
    }
    if let (Some(image), Some(url)) = (&summary.image, model.geometry_image_url()) {
        let _ = writeln!(out, "Geometry ({}): {}", image.alt_text(), url);
    }
    out
}

pub fn render_image_url(model: &Model) -> String {
    match model.geometry_image_url() {
        Some(url) => format!("{}\n", url),
        None => "No geometry image\n".to_string(),
    }
}

pub fn render_codes(model: &Model) -> String {
    let codes = model.healing_codes();
    if codes.is_empty() {
        return "No healing codes found\n".to_string();
    }

    let mut out = String::new();
    for code in codes {
        let _ = writeln!(out, "{}", code.display_line());
        if let Some(affirmation) = code.display_affirmation() {
            let _ = writeln!(out, "    {}", affirmation);
        }
    }
    out
}

pub fn render_archives(model: &Model) -> String {
    let entries = model.archives();
    if entries.is_empty() {
        return "Soul archive is empty\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let [title, pattern] = entry.display_lines();
        let _ = writeln!(out, "{}\n    {}", title, pattern);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BroadcastResponse, HealingCode};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_parse_broadcast_args() {
        let cli = Cli::try_parse_from([
            "intention-broadcaster",
            "broadcast",
            "I am at peace",
            "--field",
            "metatron",
            "--frequency",
            "abc",
            "--amplify",
        ])
        .unwrap();

        match cli.command {
            Commands::Broadcast(args) => {
                assert_eq!(args.field, FieldType::Metatron);
                assert_eq!(args.frequency, "abc");
                assert_eq!(args.multiplier, "1.0");
                assert!(args.amplify);
                assert_eq!(args.form_messages().len(), 5);
            }
            _ => panic!("expected broadcast command"),
        }
    }

    #[test]
    fn test_parse_image_url_args() {
        let cli = Cli::try_parse_from([
            "intention-broadcaster",
            "image-url",
            "love and peace",
            "--field",
            "torus",
        ])
        .unwrap();

        match cli.command {
            Commands::ImageUrl(args) => {
                assert_eq!(args.intention, "love and peace");
                assert_eq!(args.field, FieldType::Torus);
                assert_eq!(args.frequency, "7.83");
            }
            _ => panic!("expected image-url command"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Cli::try_parse_from(["intention-broadcaster", "broadcast", "x", "--field", "cube"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_command_line_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_arg = path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "intention-broadcaster",
            "archives",
            "--config",
            path_arg.as_str(),
            "--base-url",
            "http://127.0.0.1:8000",
            "--strict-status",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        let config = cli.resolve_config().await.unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.status_policy, StatusPolicy::Strict);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_render_empty_panels() {
        let model = Model::default();
        assert_eq!(render_broadcast(&model), "No broadcast yet\n");
        assert_eq!(render_codes(&model), "No healing codes found\n");
        assert_eq!(render_archives(&model), "Soul archive is empty\n");
    }

    #[test]
    fn test_render_broadcast_with_image() {
        let mut model = Model::default();
        let seq = model.latest_broadcast.issue();
        model.latest_broadcast.accept(
            seq,
            BroadcastResponse::new(json!({
                "packet": {"payload": {"intention": "I am at peace", "frequency": 7.83, "field_type": "flower_of_life"}},
                "packet_base64": "AAEC"
            })),
            true,
        );

        let out = render_broadcast(&model);
        assert!(out.contains("Intention: I am at peace\n"));
        assert!(out.contains("Frequency: 7.83 Hz\n"));
        assert!(out.contains(
            "Geometry (flower_of_life geometry): https://healing-api.onrender.com/static/images/flower_of_life_I_am_at_peace.svg"
        ));
    }

    #[test]
    fn test_render_image_url() {
        let mut model = Model::default();
        assert_eq!(render_image_url(&model), "No geometry image\n");

        let seq = model.latest_broadcast.issue();
        model.latest_broadcast.accept(
            seq,
            BroadcastResponse::new(json!({
                "packet": {"payload": {"intention": "love and peace", "field_type": "torus"}}
            })),
            true,
        );

        assert_eq!(
            render_image_url(&model),
            "https://healing-api.onrender.com/static/images/torus_love_and_peace.svg\n"
        );
    }

    #[test]
    fn test_render_codes_with_affirmation() {
        let mut model = Model::default();
        let seq = model.code_search_results.issue();
        model.code_search_results.accept(
            seq,
            vec![HealingCode {
                code: "519 7148".to_string(),
                description: "Self-love".to_string(),
                category: "love".to_string(),
                affirmation: Some("I love myself".to_string()),
            }],
            true,
        );

        assert_eq!(
            render_codes(&model),
            "519 7148: Self-love (love)\n    \"I love myself\"\n"
        );
    }
}
