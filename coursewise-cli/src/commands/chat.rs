//! Interactive chat in the terminal.
//!
//! Reads one message per line from stdin and prints the replies. When a
//! message starts a recommendation job, the prompt blocks until the job
//! finishes and its rendered result is printed.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use coursewise_core::{ChatReply, JobStatus, RecommendationJobs};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::App;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Identity the conversation is recorded under
    #[arg(short, long, default_value = "local")]
    pub user: String,
}

pub async fn run(args: ChatArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let app = App::build(&config).await?;

    println!("Chatting as '{}'. Type `start` to begin, `exit` to leave.", args.user);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let reply = app.conversation.handle(&args.user, message).await?;
        print_reply(&app.jobs, reply).await;
    }

    app.jobs.shutdown();
    Ok(())
}

async fn print_reply(jobs: &RecommendationJobs, reply: ChatReply) {
    for text in &reply.replies {
        println!("{}\n", text);
    }

    let Some(job_id) = reply.job_id else {
        return;
    };
    match jobs.wait(&job_id).await {
        Some(JobStatus::Completed { message, .. }) | Some(JobStatus::Failed { message, .. }) => {
            println!("{}\n", message)
        }
        Some(JobStatus::Cancelled) => println!("Recommendation request was cancelled.\n"),
        Some(JobStatus::Pending) | None => {}
    }
}
