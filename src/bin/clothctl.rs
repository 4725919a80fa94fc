use clap::{Parser, Subcommand};
use clothai_api_relay::{Config, EachlabsClient, ImgbbClient};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clothctl", about = "CLI for the ClothAI API relay", version)]
struct Cli {
    /// Override EACHLABS_BASE_URL
    #[arg(global = true, long)]
    eachlabs_url: Option<String>,

    /// Override EACHLABS_FLOW_ID
    #[arg(global = true, long)]
    flow_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload both images, trigger a cloth swap, and wait for the result
    Swap {
        /// Path to the person image
        #[arg(long, value_name = "PATH")]
        person: PathBuf,
        /// Path to the cloth image
        #[arg(long, value_name = "PATH")]
        cloth: PathBuf,
        /// Clothing type hint forwarded to the flow (e.g. upper, lower)
        #[arg(long)]
        clothing_type: Option<String>,
        /// Print the execution id and exit without polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Check the status of an execution
    Status {
        /// Execution id returned by the trigger
        execution_id: String,
        /// Pretty-print the full execution JSON
        #[arg(long)]
        pretty: bool,
    },
    /// List executions recorded for the flow
    Executions {
        /// Output raw JSON instead of pretty-printed JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a single image to the hosting API and print its URL
    Upload {
        /// Path to the image file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new().expect("Failed to load config");
    if let Some(url) = cli.eachlabs_url {
        conf.eachlabs_base_url = url;
    }
    if let Some(id) = cli.flow_id {
        conf.eachlabs_flow_id = id;
    }

    match cli.command {
        Commands::Swap { person, cloth, clothing_type, no_wait } => {
            let uploader = ImgbbClient::new(conf.imgbb_upload_url.clone(), conf.imgbb_api_key.clone());
            let flow = EachlabsClient::new(
                conf.eachlabs_base_url.clone(),
                conf.eachlabs_flow_id.clone(),
                conf.eachlabs_api_key.clone(),
            );

            println!("Uploading person image...");
            let person_bytes = tokio::fs::read(&person).await?;
            let person_url = uploader.upload_image(&person_bytes).await?;
            println!("Person image uploaded: {}", person_url);

            println!("Uploading cloth image...");
            let cloth_bytes = tokio::fs::read(&cloth).await?;
            let cloth_url = uploader.upload_image(&cloth_bytes).await?;
            println!("Cloth image uploaded: {}", cloth_url);

            println!("Triggering cloth change execution...");
            let trigger = flow
                .trigger_cloth_change(&person_url, &cloth_url, clothing_type.as_deref())
                .await?;
            let execution_id = match trigger.id() {
                Some(id) => id.to_string(),
                None => {
                    eprintln!("No execution id returned");
                    std::process::exit(1);
                }
            };
            println!("Execution triggered: {}", execution_id);

            if no_wait {
                return Ok(());
            }

            println!("Waiting for execution to complete...");
            let res = flow
                .wait_for_execution(&execution_id, conf.poll_interval(), conf.poll_max_attempts())
                .await;
            match res {
                Ok(execution) => {
                    match execution.result_url {
                        Some(url) => println!("Result: {}", url),
                        None => println!("Execution succeeded but reported no result URL"),
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Status { execution_id, pretty } => {
            let flow = EachlabsClient::new(
                conf.eachlabs_base_url.clone(),
                conf.eachlabs_flow_id.clone(),
                conf.eachlabs_api_key.clone(),
            );
            let execution = flow.get_execution(&execution_id).await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&execution)?);
            } else {
                println!("Status: {}", execution.status.as_str());
                if let Some(url) = execution.result_url {
                    println!("Result: {}", url);
                }
                if let Some(err) = execution.error {
                    println!("Error: {}", err);
                }
            }
            Ok(())
        }
        Commands::Executions { json } => {
            let flow = EachlabsClient::new(
                conf.eachlabs_base_url.clone(),
                conf.eachlabs_flow_id.clone(),
                conf.eachlabs_api_key.clone(),
            );
            let v = flow.get_executions().await?;
            if json {
                println!("{}", serde_json::to_string(&v)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&v)?);
            }
            Ok(())
        }
        Commands::Upload { path } => {
            let uploader = ImgbbClient::new(conf.imgbb_upload_url.clone(), conf.imgbb_api_key.clone());
            let bytes = tokio::fs::read(&path).await?;
            let url = uploader.upload_image(&bytes).await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            println!("{}", url);
            Ok(())
        }
    }
}
