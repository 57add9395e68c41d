use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use inquire::Text;
use uuid::Uuid;

use crate::clients::openai_client::OpenAIChatClient;
use crate::config::AppConfig;
use crate::models::context::{ParseContext, WorkingHours};
use crate::models::event::suggest_color;
use crate::service::extraction::ExtractionService;
use crate::service::openai_service::{ChatModel, OpenAIService};
use crate::store;
use crate::store::events::{self, NewEvent};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert an event directly, without the extraction pipeline.
    Create {
        user_id: Uuid,
        title: String,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Run one input through the pipeline and print the result.
    Parse { input: String },
    /// Like parse, but reads the input interactively.
    CreatePrompt {},
}

pub async fn cli(config: AppConfig) {
    // Fine to panic here
    let cli = Cli::parse();
    match cli.command {
        Commands::Create {
            user_id,
            title,
            start_time,
            end_time,
            location,
            description,
            color,
        } => {
            let color = color
                .unwrap_or_else(|| suggest_color(&title, description.as_deref()).as_str().to_string());
            let event = NewEvent {
                user_id,
                title,
                description,
                start_time,
                end_time,
                is_all_day: false,
                location,
                color: Some(color),
                original_input: None,
                confidence: None,
            };
            if let Err(e) = create_event(&config, &event).await {
                println!("Failed to create event: {}", e);
            }
        }
        Commands::Parse { input } => {
            if let Err(e) = parse_and_print(&config, &input).await {
                println!("Failed to parse input: {}", e);
            }
        }
        Commands::CreatePrompt {} => {
            let input = match specify_prompt() {
                Ok(input) => input,
                Err(_) => {
                    println!("No event description supplied");
                    return;
                }
            };
            if let Err(e) = parse_and_print(&config, &input).await {
                println!("Failed to parse input: {}", e);
            }
        }
    }
}

async fn create_event(
    config: &AppConfig,
    event: &NewEvent,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = config
        .prop("DATABASE_URL")
        .ok_or("DATABASE_URL environment variable not set")?;
    let pool = store::connect(&database_url).await?;
    let row = events::create_event(&pool, event).await?;
    println!("Created event {} ({})", row.id, row.title);
    Ok(())
}

async fn parse_and_print(config: &AppConfig, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let openai_api_key = config
        .prop("OPENAI_API_KEY")
        .ok_or("OPENAI_API_KEY environment variable not set")?;
    let client = OpenAIChatClient::new(openai_api_key).with_model(config.model());
    let model: Arc<dyn ChatModel> = Arc::new(OpenAIService::new(client));
    let service = ExtractionService::new(model);

    let result = service
        .parse_event_description(input, &default_context(config))
        .await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn default_context(config: &AppConfig) -> ParseContext {
    let (start, end) = config.working_hours();
    ParseContext {
        current_date: Utc::now().to_rfc3339(),
        timezone: config.timezone(),
        working_hours: WorkingHours { start, end },
        conversation: vec![],
        event_data: None,
        previous_events: vec![],
        is_follow_up: false,
        is_editing: false,
        editing_event: None,
    }
}

fn specify_prompt() -> Result<String, Box<dyn std::error::Error>> {
    Ok(Text::new("Describe your event.").prompt()?)
}
