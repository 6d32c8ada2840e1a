//! LedgerBoard CLI Client
//!
//! Command-line interface for interacting with a LedgerBoard server.

use clap::{Parser, Subcommand};
use ledgerboard::network::Client;
use ledgerboard::protocol::{Command, Status};
use ledgerboard::{CommentId, PostId, TopicId};

/// LedgerBoard CLI
#[derive(Parser, Debug)]
#[command(name = "ledgerboard-cli")]
#[command(about = "CLI for the LedgerBoard gateway")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9099")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a topic
    NewTopic {
        name: String,
    },

    /// Create a post under a topic (e.g. TOPIC0)
    NewPost {
        topic: TopicId,
        caption: String,
    },

    /// Comment on a post
    NewComment {
        topic: TopicId,
        post: PostId,
        author: String,
        body: String,
    },

    /// Show one topic with its posts
    Topic {
        topic: TopicId,
    },

    /// Show one post
    Post {
        topic: TopicId,
        post: PostId,
    },

    /// Show one comment
    Comment {
        comment: CommentId,
    },

    /// List all topics
    Topics,

    /// List the posts of a topic
    Posts {
        topic: TopicId,
    },

    /// List the comments of a post
    Comments {
        topic: TopicId,
        post: PostId,
    },

    /// Rebuild the server's index from the ledger
    Rebuild,

    /// Ping the server
    Ping,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::NewTopic { name } => Command::CreateTopic { name },
            Commands::NewPost { topic, caption } => Command::CreatePost { topic, caption },
            Commands::NewComment {
                topic,
                post,
                author,
                body,
            } => Command::CreateComment {
                topic,
                post,
                author,
                body,
            },
            Commands::Topic { topic } => Command::GetTopic { topic },
            Commands::Post { topic, post } => Command::GetPost { topic, post },
            Commands::Comment { comment } => Command::GetComment { comment },
            Commands::Topics => Command::ListTopics,
            Commands::Posts { topic } => Command::ListPosts { topic },
            Commands::Comments { topic, post } => Command::ListComments { topic, post },
            Commands::Rebuild => Command::Rebuild,
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let command = Command::from(args.command);
    let response = match client.send(&command) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    };

    match response.status {
        Status::Ok => {
            let payload = response.payload.unwrap_or_default();
            match serde_json::from_slice::<serde_json::Value>(&payload) {
                Ok(json) => println!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
                ),
                Err(_) => println!("{}", String::from_utf8_lossy(&payload)),
            }
        }
        Status::NotFound => {
            eprintln!("Not found: {}", response.payload_text());
            std::process::exit(2);
        }
        Status::Error => {
            eprintln!("Error: {}", response.payload_text());
            std::process::exit(1);
        }
    }
}
