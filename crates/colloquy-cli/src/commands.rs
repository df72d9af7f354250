//! Command handlers for the `clq` binary.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use futures_util::StreamExt;

use colloquy_client::GatewayClient;
use colloquy_core::outcome::ExecuteOutcome;
use colloquy_types::action::{ApiConfig, ExecuteRequest};
use colloquy_types::conversation::{FindConversationsParams, SortField, SortOrder};

/// Arguments shared by `ask` and `stream`.
#[derive(Args)]
pub struct AskArgs {
    /// The message to send.
    pub message: String,

    /// Connector id to execute against.
    #[arg(long)]
    pub connector: String,

    /// Conversation to continue. A fresh id is minted when omitted.
    #[arg(long)]
    pub conversation: Option<String>,

    /// Action type registered for the connector.
    #[arg(long, default_value = ".inference")]
    pub action_type: String,

    /// Model override for this call.
    #[arg(long)]
    pub model: Option<String>,

    /// Augment the call with the knowledge base.
    #[arg(long)]
    pub knowledge_base: bool,

    /// Augment the call with alert retrieval.
    #[arg(long)]
    pub rag_alerts: bool,

    /// Index pattern for alert retrieval (with --rag-alerts).
    #[arg(long)]
    pub alerts_index: Option<String>,

    /// Upper bound on retrieved alerts (with --rag-alerts).
    #[arg(long)]
    pub size: Option<u32>,
}

#[derive(clap::Subcommand)]
pub enum KbAction {
    /// Read provisioning status.
    Status {
        /// Scope to one named resource instead of the whole knowledge base.
        #[arg(long)]
        resource: Option<String>,
    },
    /// Provision the knowledge base or load a resource into it.
    Setup {
        #[arg(long)]
        resource: Option<String>,
    },
    /// Tear down the knowledge base or remove a resource from it.
    Teardown {
        #[arg(long)]
        resource: Option<String>,
    },
}

#[derive(Args)]
pub struct ConversationsArgs {
    /// Free-text search query.
    #[arg(long)]
    pub filter: Option<String>,

    /// Field to sort by (created_at, is_default, title, updated_at).
    #[arg(long)]
    pub sort_field: Option<SortField>,

    /// Sort order (asc, desc).
    #[arg(long)]
    pub sort_order: Option<SortOrder>,

    /// Page number, 1-based.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Results per page.
    #[arg(long, default_value_t = 20)]
    pub per_page: u32,

    /// Sparse fieldset to request (comma-delimited).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

fn build_request(args: AskArgs, streaming: bool) -> ExecuteRequest {
    let conversation_id = args
        .conversation
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

    let mut request = ExecuteRequest::new(
        conversation_id,
        ApiConfig {
            connector_id: args.connector,
            action_type_id: args.action_type,
            model: args.model,
            provider: None,
        },
    );
    request.message = Some(args.message);
    request.streaming = streaming;
    request.is_enabled_knowledge_base = args.knowledge_base;
    request.is_enabled_rag_alerts = args.rag_alerts;
    request.alerts_index_pattern = args.alerts_index;
    request.size = args.size;
    request
}

pub async fn ask(client: &GatewayClient, args: AskArgs, json: bool) -> Result<()> {
    match client.execute(build_request(args, false), None).await {
        ExecuteOutcome::Buffered {
            text, error: true, ..
        } => anyhow::bail!("{text}"),

        ExecuteOutcome::Buffered { text, trace, .. } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "response": text,
                        "trace": trace,
                    }))?
                );
                return Ok(());
            }

            println!("{text}");
            if let Some(trace) = trace {
                tracing::info!(
                    trace_id = %trace.trace_id,
                    transaction_id = %trace.transaction_id,
                    "trace recorded"
                );
            }
            Ok(())
        }

        ExecuteOutcome::Streamed { .. } => {
            anyhow::bail!("gateway returned a stream for a buffered request")
        }
    }
}

pub async fn stream(client: &GatewayClient, args: AskArgs) -> Result<()> {
    match client.execute(build_request(args, true), None).await {
        ExecuteOutcome::Streamed { mut stream, error } => {
            let mut out = std::io::stdout();
            while let Some(chunk) = stream.next().await {
                out.write_all(&chunk?)?;
                out.flush()?;
            }
            println!();

            if error {
                anyhow::bail!("the gateway reported a failure; the stream above is its diagnostic");
            }
            Ok(())
        }

        // The client downgrades to a buffered diagnostic when no stream
        // could be obtained.
        ExecuteOutcome::Buffered { text, .. } => anyhow::bail!("{text}"),
    }
}

pub async fn kb_status(client: &GatewayClient, resource: Option<&str>, json: bool) -> Result<()> {
    let status = client
        .knowledge_base_status(resource, None)
        .await
        .map_err(|fault| anyhow::anyhow!(fault.diagnostic()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let scope = resource.unwrap_or("knowledge base");
    let mark = |ready: bool| if ready { "ready" } else { "missing" };
    println!("{scope}:");
    println!("  index:    {}", mark(status.index_exists));
    println!("  pipeline: {}", mark(status.pipeline_exists));
    println!("  model:    {}", mark(status.model_exists));
    if let Some(resource_exists) = status.resource_exists {
        println!("  resource: {}", mark(resource_exists));
    }
    Ok(())
}

pub async fn kb_setup(client: &GatewayClient, resource: Option<&str>, json: bool) -> Result<()> {
    let ack = client
        .create_knowledge_base(resource, None)
        .await
        .map_err(|fault| anyhow::anyhow!(fault.diagnostic()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ack)?);
        return Ok(());
    }

    if !ack.success {
        anyhow::bail!("gateway declined the setup request");
    }
    println!("setup complete");
    Ok(())
}

pub async fn kb_teardown(client: &GatewayClient, resource: Option<&str>, json: bool) -> Result<()> {
    let ack = client
        .delete_knowledge_base(resource, None)
        .await
        .map_err(|fault| anyhow::anyhow!(fault.diagnostic()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ack)?);
        return Ok(());
    }

    if !ack.success {
        anyhow::bail!("gateway declined the teardown request");
    }
    println!("teardown complete");
    Ok(())
}

pub async fn conversations(
    client: &GatewayClient,
    args: ConversationsArgs,
    json: bool,
) -> Result<()> {
    let params = FindConversationsParams {
        fields: if args.fields.is_empty() {
            None
        } else {
            Some(args.fields)
        },
        filter: args.filter,
        sort_field: args.sort_field,
        sort_order: args.sort_order,
        page: args.page,
        per_page: args.per_page,
    };

    let page = client
        .find_conversations(params, None)
        .await
        .map_err(|fault| anyhow::anyhow!(fault.diagnostic()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.data.is_empty() {
        println!("no conversations found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Default").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for record in &page.data {
        let updated = record
            .updated_at
            .unwrap_or(record.created_at)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(&record.title),
            Cell::new(if record.is_default { "yes" } else { "" }),
            Cell::new(updated),
        ]);
    }

    println!("{table}");
    println!(
        "page {} of {} conversation(s) total",
        page.page, page.total
    );
    Ok(())
}
