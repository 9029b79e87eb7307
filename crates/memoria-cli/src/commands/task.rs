//! Task processing.

use crate::bootstrap;
use clap::Args;
use console::style;
use serde::Serialize;
use std::path::Path;

/// Task command arguments.
#[derive(Args)]
pub struct TaskArgs {
    /// Tasks to process; several tasks run concurrently
    #[arg(required = true)]
    pub tasks: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TaskOutcome {
    task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the task command.
pub async fn run(args: TaskArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = bootstrap::load_config(config_path)?;
    let agent = bootstrap::build_agent(&config)?;

    let handles: Vec<_> = args
        .tasks
        .iter()
        .map(|task| agent.process_task(task.clone()))
        .collect();
    let results = futures::future::join_all(handles).await;

    let outcomes: Vec<TaskOutcome> = args
        .tasks
        .into_iter()
        .zip(results)
        .map(|(task, result)| match result {
            Ok(text) => TaskOutcome {
                task,
                result: Some(text),
                error: None,
            },
            Err(e) => TaskOutcome {
                task,
                result: None,
                error: Some(format!("{:#}", anyhow::Error::new(e))),
            },
        })
        .collect();
    let failures = outcomes.iter().filter(|o| o.error.is_some()).count();

    if args.json {
        let body = serde_json::json!({
            "state": agent.state(),
            "tasks": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for outcome in &outcomes {
            if outcomes.len() > 1 {
                println!("{} {}", style("Task:").bold(), outcome.task);
            }
            match (&outcome.result, &outcome.error) {
                (Some(result), _) => println!("{}", result),
                (None, Some(error)) => println!("{} {}", style("Error:").red(), error),
                (None, None) => {}
            }
            if outcomes.len() > 1 {
                println!();
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} task(s) failed", failures, outcomes.len());
    }
    Ok(())
}
