//! Command line adapter
//!
//! `submit` drives the contact form controller the same way the landing page
//! does, `retry` is the manual resend of queued leads, `pending` lists them.

use clap::{Args, Parser, Subcommand};

use crate::core::config::Config;
use crate::core::contact_form::{
    COMPANY, ContactForm, EMAIL, FIRST_NAME, LAST_NAME, MESSAGE, PHONE, SERVICE, SubmitOutcome,
};
use crate::core::file_store::FileStore;
use crate::core::queue::{PendingQueue, StoredQueue};
use crate::core::submitter::LeadSubmitter;
use crate::core::transport::HttpTransport;
use crate::core::validation::PRIVACY_FIELD_ID;

#[derive(Debug, Parser)]
#[command(name = "leadcapture", version, about = "Submit landing page leads and resend queued ones")]
pub struct Cli {
    /// Webhook URL, overrides LEADS_WEBHOOK_URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Validate and send a lead, keeping it in the local queue if delivery fails
    Submit(SubmitArgs),
    /// Resend every queued lead once
    Retry,
    /// List queued leads
    Pending {
        /// Print the raw queue as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// Service label, e.g. "Machine Learning"
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub message: Option<String>,
    /// Ask for privacy consent like the consent-enabled form
    #[arg(long)]
    pub require_privacy: bool,
    /// Accept the privacy policy
    #[arg(long)]
    pub accept_privacy: bool,
}

type NativeSubmitter = LeadSubmitter<HttpTransport, StoredQueue<FileStore>>;

fn submitter(cli_endpoint: Option<String>, config: &Config) -> NativeSubmitter {
    let mut submitter_config = config.submitter();
    if let Some(endpoint) = cli_endpoint {
        submitter_config.endpoint_url = endpoint;
    }

    LeadSubmitter::new(
        submitter_config,
        HttpTransport::new(),
        StoredQueue::with_key(FileStore::new(&config.queue_dir), config.storage_key.clone()),
    )
}

/// Run a command. Returns `false` when the command did not fully succeed.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<bool> {
    let submitter = submitter(cli.endpoint, &config);

    match cli.cmd {
        Cmd::Submit(args) => submit(args, &submitter, &config).await,
        Cmd::Retry => retry(&submitter).await,
        Cmd::Pending { json } => pending(&submitter, json),
    }
}

async fn submit(args: SubmitArgs, submitter: &NativeSubmitter, config: &Config) -> anyhow::Result<bool> {
    let mut form = ContactForm::default().with_reset_delay(config.reset_delay);
    if args.require_privacy {
        form = form.with_privacy_consent();
        form.set_checked(PRIVACY_FIELD_ID, args.accept_privacy);
    }
    form.open();

    form.set_value(FIRST_NAME, args.first_name);
    form.set_value(LAST_NAME, args.last_name);
    form.set_value(EMAIL, args.email);
    form.set_value(COMPANY, args.company);
    form.set_value(PHONE, args.phone.unwrap_or_default());
    form.set_value(SERVICE, args.service);
    form.set_value(MESSAGE, args.message.unwrap_or_default());

    match form.submit(submitter, &config.client_context()).await {
        SubmitOutcome::Rejected => {
            for (id, message) in form.errors() {
                eprintln!("{}: {}", id, message);
            }
            Ok(false)
        }
        SubmitOutcome::Sent { response, .. } => {
            println!("Lead sent: {}", response.value());
            form.complete_reset();
            Ok(true)
        }
        SubmitOutcome::Failed { error } => {
            eprintln!("{}", form.view().alert.as_deref().unwrap_or_default());
            eprintln!("Cause: {}", error);
            if error.is_queued() {
                eprintln!(
                    "The lead was saved to {} and can be resent with `leadcapture retry`",
                    submitter.queue().store().path_for(submitter.queue().key()).display()
                );
            }
            Ok(false)
        }
    }
}

async fn retry(submitter: &NativeSubmitter) -> anyhow::Result<bool> {
    let report = submitter.retry_pending().await?;

    if report.is_empty() {
        println!("No pending leads");
        return Ok(true);
    }

    println!(
        "Resent {} of {} pending leads",
        report.delivered.len(),
        report.attempted
    );
    for (id, reason) in &report.failed {
        eprintln!("{}: {}", id, reason);
    }
    for (id, reason) in &report.unremoved {
        eprintln!("{}: delivered but still queued: {}", id, reason);
    }
    Ok(report.all_delivered() && report.all_removed())
}

fn pending(submitter: &NativeSubmitter, json: bool) -> anyhow::Result<bool> {
    let entries = submitter.queue().dequeue_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(true);
    }

    if entries.is_empty() {
        println!("No pending leads");
    }
    for entry in &entries {
        println!(
            "{}  {}  {} <{}>  {}  [{}]",
            entry.id,
            entry.saved_at.to_rfc3339(),
            entry.payload.lead.full_name,
            entry.payload.email(),
            entry.payload.interest.service,
            entry.payload.priority()
        );
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            queue_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    async fn unreachable_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/webhook", addr)
    }

    fn submit_args(endpoint: &str, extra: &[&str]) -> Cli {
        let mut args = vec![
            "leadcapture",
            "--endpoint",
            endpoint,
            "submit",
            "--first-name",
            "Ana",
            "--last-name",
            "Ruiz",
            "--email",
            "ana@x.com",
            "--company",
            "Acme",
            "--service",
            "Machine Learning",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_submit() {
        let cli = submit_args("http://localhost/hook", &["--phone", "123"]);

        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost/hook"));
        let Cmd::Submit(args) = cli.cmd else {
            panic!("expected submit");
        };
        assert_eq!(args.first_name, "Ana");
        assert_eq!(args.phone.as_deref(), Some("123"));
        assert!(args.message.is_none());
        assert!(!args.require_privacy);
    }

    #[test]
    fn test_parse_pending_and_retry() {
        let cli = Cli::try_parse_from(["leadcapture", "pending", "--json"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::Pending { json: true }));

        let cli = Cli::try_parse_from(["leadcapture", "retry"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::Retry));
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn test_submit_requires_fields() {
        assert!(Cli::try_parse_from(["leadcapture", "submit", "--first-name", "Ana"]).is_err());
    }

    #[tokio::test]
    async fn test_failed_submit_is_queued_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = unreachable_endpoint().await;

        let ok = run(submit_args(&endpoint, &[]), config(dir.path()))
            .await
            .unwrap();
        assert!(!ok);

        let queue = StoredQueue::new(FileStore::new(dir.path()));
        let entries = queue.dequeue_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload.lead.first_name, "Ana");
    }

    #[tokio::test]
    async fn test_invalid_submit_is_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = unreachable_endpoint().await;

        let ok = run(
            submit_args(&endpoint, &["--require-privacy"]),
            config(dir.path()),
        )
        .await
        .unwrap();
        assert!(!ok);

        let queue = StoredQueue::new(FileStore::new(dir.path()));
        assert!(queue.dequeue_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_and_pending_on_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = unreachable_endpoint().await;

        let retry = Cli::try_parse_from(["leadcapture", "--endpoint", endpoint.as_str(), "retry"]).unwrap();
        assert!(run(retry, config(dir.path())).await.unwrap());

        let pending = Cli::try_parse_from(["leadcapture", "pending"]).unwrap();
        assert!(run(pending, config(dir.path())).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_queue_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("g2gi_pending_leads.json"), "[{").unwrap();

        let pending = Cli::try_parse_from(["leadcapture", "pending"]).unwrap();
        assert!(run(pending, config(dir.path())).await.is_err());
    }
}
