// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! A small command line client for enqueueing and cancelling Taskless jobs
//! and for inspecting job envelopes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use serde_json::{json, Value};
use taskless::{Envelope, JobOptions, Queue, QueueOptions, RunAt};

#[derive(Parser)]
#[command(name = "taskless-cli", version, about)]
struct Cli {
    /// A configuration file for the queue. Settings missing from the file
    /// are read from the TASKLESS_* environment variables.
    #[arg(long)]
    config_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace a job
    #[command(arg_required_else_help = true)]
    Enqueue {
        /// Queue name
        #[arg(long)]
        queue: String,

        /// Route the service calls, absolute or relative to the base URL
        #[arg(long)]
        route: String,

        /// JSON payload of the job
        #[arg(long, default_value = "{}")]
        payload: String,

        #[arg(long)]
        retries: Option<u32>,

        /// ISO-8601 time of the first run, `now` by default
        #[arg(long)]
        run_at: Option<String>,

        /// ISO-8601 duration between runs, e.g. PT1H
        #[arg(long)]
        run_every: Option<String>,

        /// Job name. Several parts are joined with the queue separator.
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Stop future runs of a job
    #[command(arg_required_else_help = true)]
    Cancel {
        #[arg(long)]
        queue: String,

        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Print the envelope a payload would be sent in
    Seal {
        /// JSON payload
        payload: String,
    },

    /// Verify and decode an envelope read from a file
    Open {
        /// Path of a JSON envelope
        envelope_file: String,
    },
}

fn queue(name: &str, route: &str, options: QueueOptions) -> Queue<Value> {
    Queue::builder(name, route).options(options).build()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    let options = match &cli.config_file {
        Some(path) => QueueOptions::from_file(path)?,
        None => QueueOptions::from_env(),
    };
    debug!("options {options:?}");

    match cli.command {
        Commands::Enqueue {
            queue: name,
            route,
            payload,
            retries,
            run_at,
            run_every,
            name: job,
        } => {
            let payload: Value = serde_json::from_str(&payload).context("payload is not JSON")?;

            let mut job_options = JobOptions {
                retries,
                run_at: run_at.map(RunAt::from),
                ..Default::default()
            };
            if let Some(run_every) = run_every {
                job_options = job_options.run_every(run_every);
            }

            let job = queue(&name, &route, options)
                .enqueue(job, &payload, Some(job_options))
                .await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        Commands::Cancel { queue: name, name: job } => {
            match queue(&name, "/", options).cancel(job).await? {
                Some(job) => println!("{}", serde_json::to_string_pretty(&job)?),
                None => println!("null"),
            }
        }
        Commands::Seal { payload } => {
            let payload: Value = serde_json::from_str(&payload).context("payload is not JSON")?;
            let envelope = Envelope::seal(
                &payload,
                &options.signing_secrets(),
                &options.encryption_keys(),
            )?;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Commands::Open { envelope_file } => {
            let raw = std::fs::read_to_string(&envelope_file)
                .with_context(|| format!("read {envelope_file}"))?;
            let body = serde_json::from_str(&raw).context("envelope is not JSON")?;
            let opened = Envelope::from_value(body)?
                .open::<Value>(&options.signing_secrets(), &options.encryption_keys())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "payload": opened.payload,
                    "verified": opened.verified,
                }))?
            );
        }
    };

    Ok(())
}
