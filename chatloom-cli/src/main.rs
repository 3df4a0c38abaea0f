//! Chat binary: send one message to a thread, print the transcript.
//!
//! Reads model access from the environment (`.env` supported); persistence
//! goes to the SQLite file in `DB_PATH` (or `--db`). `--list-threads` shows
//! every saved conversation; `--stream` prints the answer as it arrives.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;

use chatloom::{
    ChatBuildConfig, ChatRunner, ChatState, LlmClient, Message, MockLlm, SqliteSaver, StreamEvent,
    ToolRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "chatloom")]
#[command(about = "Threaded chat with tool calling — one message per run")]
struct Args {
    /// User message (also accepted as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional user message (when -m/--message is not used)
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Conversation thread to continue (created on first use)
    #[arg(long, default_value = "default")]
    thread: String,

    /// SQLite database path (overrides DB_PATH)
    #[arg(long)]
    db: Option<String>,

    /// List saved thread ids and exit
    #[arg(long)]
    list_threads: bool,

    /// Stream the answer token by token
    #[arg(long)]
    stream: bool,

    /// Use the offline mock model instead of the OpenAI API
    #[arg(long)]
    mock: bool,

    /// System prompt for fresh threads
    #[arg(long)]
    system: Option<String>,
}

fn get_message(args: &Args) -> String {
    if let Some(ref m) = args.message {
        return m.clone();
    }
    if args.rest.is_empty() {
        return "hello".to_string();
    }
    args.rest.join(" ").trim().to_string()
}

fn build_llm(
    args: &Args,
    config: &ChatBuildConfig,
    registry: &ToolRegistry,
) -> Result<Box<dyn LlmClient>, String> {
    if args.mock {
        return Ok(Box::new(MockLlm::new(
            "(mock) no model configured; echoing back.",
        )));
    }
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or("OPENAI_API_KEY must be set (or pass --mock)")?;
    let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
    }
    let llm = chatloom::ChatOpenAI::with_config(openai_config, config.model.clone())
        .with_tools(registry.specs());
    Ok(Box::new(llm))
}

fn print_transcript(state: &ChatState) {
    for m in &state.messages {
        match m {
            Message::System { content } => println!("[System] {}", content),
            Message::User { content } => println!("[User] {}", content),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                if tool_calls.is_empty() {
                    println!("[Assistant] {}", content);
                } else {
                    let names: Vec<&str> =
                        tool_calls.iter().map(|tc| tc.name.as_str()).collect();
                    println!("[Assistant] requests tools: {}", names.join(", "));
                }
            }
            Message::Tool { content, .. } => println!("[Tool] {}", content),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = ChatBuildConfig::from_env();
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }

    let checkpointer = Arc::new(SqliteSaver::<ChatState>::open(&config.db_path)?);

    let registry = Arc::new(ToolRegistry::builtin());
    let llm = match build_llm(&args, &config, &registry) {
        Ok(llm) => llm,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut runner = ChatRunner::new(llm, Some(registry), checkpointer)?;
    if let Some(system) = &args.system {
        runner = runner.with_system_prompt(system.clone());
    }

    if args.list_threads {
        for thread_id in runner.list_threads().await? {
            println!("{}", thread_id);
        }
        return Ok(());
    }

    let input = get_message(&args);
    println!("User: {}", input);
    println!("---");

    let state = if args.stream {
        let result = runner
            .stream_with_callback(
                &input,
                &args.thread,
                Some(|event: StreamEvent<ChatState>| {
                    if let StreamEvent::Messages { chunk, .. } = event {
                        print!("{}", chunk.content);
                        let _ = std::io::stdout().flush();
                    }
                }),
            )
            .await;
        println!();
        result
    } else {
        runner.invoke(&input, &args.thread).await
    };

    let state = match state {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if !args.stream {
        print_transcript(&state);
    }

    Ok(())
}
