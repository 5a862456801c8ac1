//! shardkv CLI Client
//!
//! Command-line interface for interacting with a shardkv server.

use std::io::{BufReader, Write};
use std::net::TcpStream;

use clap::{Parser, Subcommand};
use shardkv::protocol::{decode_response, encode_command, read_line, Command, Response};

/// shardkv CLI
#[derive(Parser, Debug)]
#[command(name = "shardkv-cli")]
#[command(about = "CLI for the shardkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9090")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set (remaining words are joined with spaces)
        #[arg(num_args = 0..)]
        value: Vec<String>,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },
}

fn main() {
    let args = Args::parse();

    let command = match args.command {
        Commands::Get { key } => Command::Get {
            key: key.into_bytes(),
        },
        Commands::Put { key, value } => Command::Put {
            key: key.into_bytes(),
            value: value.join(" ").into_bytes(),
        },
        Commands::Del { key } => Command::Delete {
            key: key.into_bytes(),
        },
    };

    match send(&args.server, &command) {
        Ok(Response::Value(value)) => println!("{}", String::from_utf8_lossy(&value)),
        Ok(Response::Ok) => println!("OK"),
        Ok(Response::NotFound) => {
            println!("(not found)");
            std::process::exit(1);
        }
        Ok(Response::Error(message)) => {
            eprintln!("error: {}", message);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

fn send(server: &str, command: &Command) -> shardkv::Result<Response> {
    let mut stream = TcpStream::connect(server)?;
    stream.write_all(&encode_command(command))?;
    stream.flush()?;

    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    if !read_line(&mut reader, &mut line)? {
        return Err(shardkv::KvError::Protocol(
            "server closed the connection".to_string(),
        ));
    }
    decode_response(&line)
}
