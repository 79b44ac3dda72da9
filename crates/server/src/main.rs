mod cli;
mod rpc;

use bugcrowd_api::ApiClient;
use bugcrowd_tools::BugcrowdTools;
use clap::Parser as _;
use cli::Cli;
use rmcp::model::ServerJsonRpcMessage;
use rpc::Routed;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_logging(&cli.log_level, cli.log_format)?;

    let client = ApiClient::new(cli.api_config())?;
    let tools = BugcrowdTools::new(client);
    info!(
        base_url = %cli.base_url,
        tools = tools.operations().len(),
        "serving Bugcrowd tools over stdio"
    );

    serve(tools).await
}

async fn serve(tools: BugcrowdTools) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerJsonRpcMessage>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = rx.recv().await {
            let mut line = serde_json::to_vec(&msg)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match rpc::route_line(&tools, &line) {
            Routed::Reply(msg) => {
                if tx.send(msg).is_err() {
                    break;
                }
            }
            Routed::Call {
                id,
                name,
                arguments,
            } => {
                let tools = tools.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let msg = rpc::call_tool(&tools, id, &name, arguments).await;
                    if tx.send(msg).is_err() {
                        warn!(tool = %name, "output closed before response was written");
                    }
                });
            }
            Routed::Ignore => {}
        }
    }

    // In-flight calls hold their own senders; the writer drains until the last one finishes.
    drop(tx);
    writer.await??;
    info!("stdin closed, shutting down");
    Ok(())
}
