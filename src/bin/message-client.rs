use clap::{Parser, Subcommand};
use uuid::Uuid;

use message_store::api::MessageDto;
use message_store::client::{format_messages, local_ip_for, ClientError, MessageClient};

#[derive(Parser, Debug)]
#[command(name = "message-client", version, about = "Talk to a message-store server")]
struct Cli {
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080", global = true)]
    server: String,

    /// Address reported as the sender; detected from the route to the server when omitted
    #[arg(long = "client-ip", global = true)]
    client_ip: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a new message
    Send { text: Vec<String> },
    /// List stored messages
    List,
    /// Show one message
    Show { id: Uuid },
    /// Replace the text of a message
    Edit { id: Uuid, text: Vec<String> },
    /// Delete a message
    Delete { id: Uuid },
}

fn print_record(dto: &MessageDto) {
    print!("{}", format_messages(std::slice::from_ref(dto)));
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = MessageClient::new(&cli.server)?;

    match cli.command {
        Commands::Send { text } => {
            let client_ip = match cli.client_ip {
                Some(ip) => ip,
                None => client
                    .server_host()
                    .map(|host| local_ip_for(&host).to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string()),
            };
            let created = client.create(&client_ip, &text.join(" ")).await?;
            print_record(&created);
        }
        Commands::List => {
            let messages = client.list().await?;
            print!("{}", format_messages(&messages));
        }
        Commands::Show { id } => {
            let dto = client.get(id).await?;
            print_record(&dto);
        }
        Commands::Edit { id, text } => {
            let updated = client.update(id, &text.join(" ")).await?;
            print_record(&updated);
        }
        Commands::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted {}", id);
        }
    }

    Ok(())
}
