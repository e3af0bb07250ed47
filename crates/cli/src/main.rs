//! `pixora` -- command-line client for the Pixora generation backend.
//!
//! Wires the client stack together: signs in, submits generation
//! jobs, polls them to a terminal state, and shows live concurrency
//! capacity.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default                 | Description                      |
//! |-----------------------------|----------|-------------------------|----------------------------------|
//! | `PIXORA_API_URL`            | no       | `http://localhost:8000` | Backend base URL                 |
//! | `PIXORA_POLL_INTERVAL_MS`   | no       | `2000`                  | Delay between job status polls   |
//! | `PIXORA_LIMITS_INTERVAL_MS` | no       | `15000`                 | Delay between capacity snapshots |
//! | `PIXORA_TOKEN_DIR`          | no       | unset (in-memory only)  | Credential persistence directory |

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixora_client::{
    ApiClient, ClientConfig, JobPoller, JobSubmitter, PollOutcome, SessionStore,
};
use pixora_core::job::{Job, JobKind, JobStatus};
use pixora_core::limits::{CapacityFill, CategoryCounts};
use pixora_core::models;

const USAGE: &str = "\
Usage: pixora <command> [args]

Commands:
  login --code <code> | --token <token>   Sign in via OAuth code or raw token
  logout                                  Drop the stored credential
  whoami                                  Show the signed-in profile
  submit <kind> <prompt> [model] [image_url]
                                          Submit a job and watch it (kinds:
                                          t2i, i2i, t2v, i2v)
  watch <job_id>                          Poll an existing job to completion
  limits                                  Show the concurrency snapshot
  jobs [page]                             List job history
  transactions [page]                     List credit transactions
  models                                  List available generation models";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixora=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    let session = Arc::new(match &config.token_dir {
        Some(dir) => SessionStore::with_storage_dir(dir),
        None => SessionStore::in_memory(),
    });
    let api = Arc::new(ApiClient::new(config.base_url.clone(), session.clone()));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    match command.as_str() {
        "login" => login(&api, &session, &args[1..]).await,
        "logout" => {
            session.clear_credential();
            println!("Signed out.");
            Ok(())
        }
        "whoami" => whoami(&api).await,
        "submit" => submit(&api, &config, &args[1..]).await,
        "watch" => watch(&api, &config, &args[1..]).await,
        "limits" => limits(&api).await,
        "jobs" => jobs(&api, &args[1..]).await,
        "transactions" => transactions(&api, &args[1..]).await,
        "models" => {
            list_models();
            Ok(())
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

async fn login(api: &ApiClient, session: &SessionStore, args: &[String]) -> anyhow::Result<()> {
    match args {
        [flag, value] if flag == "--code" => {
            api.exchange_oauth_code(value)
                .await
                .context("OAuth code exchange failed")?;
            println!("Signed in.");
        }
        [flag, value] if flag == "--token" => {
            session
                .set_credential(value)
                .context("storing credential failed")?;
            if !session.has_valid_credential() {
                tracing::warn!("Stored token does not decode as an unexpired JWT");
            }
            println!("Token stored.");
        }
        _ => bail!("usage: pixora login --code <code> | --token <token>"),
    }
    Ok(())
}

async fn whoami(api: &ApiClient) -> anyhow::Result<()> {
    let profile = api.me().await.context("not signed in")?;
    println!("id:      {}", profile.id);
    if let Some(email) = &profile.email {
        println!("email:   {email}");
    }
    if let Some(plan) = &profile.plan_id {
        println!("plan:    {plan}");
    }
    if let Some(credits) = profile.credits {
        println!("credits: {credits}");
    }
    Ok(())
}

async fn submit(api: &Arc<ApiClient>, config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [kind, prompt, rest @ ..] = args else {
        bail!("usage: pixora submit <kind> <prompt> [model] [image_url]");
    };
    let kind = JobKind::parse(kind)
        .with_context(|| format!("unknown kind '{kind}' (expected t2i, i2i, t2v, i2v)"))?;

    let model_key = match rest.first() {
        Some(key) => key.clone(),
        None => models::models_for(kind)
            .next()
            .map(|m| m.key.to_string())
            .context("no model available for this kind")?,
    };

    let extra = match rest.get(1) {
        Some(image_url) => serde_json::json!({"image_url": image_url}),
        None => serde_json::Value::Null,
    };

    let submitter = JobSubmitter::new(api.clone());
    let job = submitter
        .submit(kind, prompt, &model_key, extra)
        .await
        .context("submission failed")?;
    println!(
        "Submitted {} job {} (model {}, ~{} credits)",
        job.kind, job.id, model_key, job.cost_estimate
    );

    poll_to_end(api, config, job).await
}

async fn watch(api: &Arc<ApiClient>, config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [job_id] = args else {
        bail!("usage: pixora watch <job_id>");
    };
    // Kind and cost are cosmetic for watching; polling only needs the id.
    let job = Job::new(job_id.clone(), JobKind::TextToImage, JobStatus::Pending, 0);
    poll_to_end(api, config, job).await
}

/// Poll a job until terminal, translating Ctrl-C into cooperative
/// cancellation.
async fn poll_to_end(
    api: &Arc<ApiClient>,
    config: &ClientConfig,
    job: Job,
) -> anyhow::Result<()> {
    let poller = JobPoller::new(api.clone(), config.poll_interval);
    let cancel = poller.cancel_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!("Watching job (Ctrl-C to stop watching)...");
    match poller.run(job).await {
        PollOutcome::Completed(job) => {
            println!("Completed: {}", job.result_url.as_deref().unwrap_or("<no result url>"));
            Ok(())
        }
        PollOutcome::Failed(job) => {
            bail!("job failed: {}", job.error.as_deref().unwrap_or("unknown reason"))
        }
        PollOutcome::AuthRequired(_) => {
            bail!("session expired; run `pixora login` again")
        }
        PollOutcome::Lost { job, error } => {
            bail!("lost sight of job {}: {error} (the job may still be running; retry with `pixora watch {}`)", job.id, job.id)
        }
        PollOutcome::Cancelled(job) => {
            println!("Stopped watching job {} (it keeps running server-side).", job.id);
            Ok(())
        }
    }
}

async fn limits(api: &ApiClient) -> anyhow::Result<()> {
    let limits = api.limits().await.context("fetching limits failed")?;
    println!("plan: {}", limits.plan_id);
    print_category("total", &limits.total);
    print_category("image", &limits.image);
    print_category("video", &limits.video);
    Ok(())
}

fn print_category(name: &str, counts: &CategoryCounts) {
    match counts.fill() {
        CapacityFill::Unlimited => {
            println!("  {name:<6} {} active, {} pending (unlimited)", counts.active, counts.pending);
        }
        CapacityFill::Percent(pct) => {
            println!(
                "  {name:<6} {} / {} active, {} pending ({pct}%)",
                counts.active, counts.limit, counts.pending
            );
        }
    }
}

async fn jobs(api: &ApiClient, args: &[String]) -> anyhow::Result<()> {
    let page = parse_page(args)?;
    let listing = api.jobs(page, 20, None).await.context("fetching jobs failed")?;
    for record in &listing.items {
        let result = record
            .image_url
            .as_deref()
            .or(record.video_url.as_deref())
            .unwrap_or("-");
        println!(
            "{:<12} {:<4} {:<10} {result}",
            record.job_id,
            record.job_type.as_deref().unwrap_or("?"),
            record.status
        );
    }
    println!("page {}/{} ({} total)", listing.page, listing.pages, listing.total);
    Ok(())
}

async fn transactions(api: &ApiClient, args: &[String]) -> anyhow::Result<()> {
    let page = parse_page(args)?;
    let listing = api
        .transactions(page, 20, None)
        .await
        .context("fetching transactions failed")?;
    for tx in &listing.items {
        println!(
            "{:<12} {:>6} {:<12} {}",
            tx.id,
            tx.amount,
            tx.tx_type,
            tx.description.as_deref().unwrap_or("")
        );
    }
    println!("page {}/{} ({} total)", listing.page, listing.pages, listing.total);
    Ok(())
}

fn parse_page(args: &[String]) -> anyhow::Result<u32> {
    match args.first() {
        None => Ok(1),
        Some(raw) => raw.parse().context("page must be a positive integer"),
    }
}

fn list_models() {
    for model in models::MODELS {
        let kinds: Vec<_> = model.kinds.iter().map(|k| k.as_str()).collect();
        println!(
            "{:<12} {:<24} {:<12} {} credits",
            model.key,
            model.label,
            kinds.join(","),
            model.cost
        );
    }
}
