use argh::FromArgs;
use boggle_vision::{
    SolveResult,
    server::{BoardRequest, BoardResponse, UPLOAD_FIELD},
};
use std::path::PathBuf;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8000;

#[derive(FromArgs)]
/// Boggle Vision client for reading and solving boards
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "extract" or "solve"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Extract(ExtractCommand),
    Solve(SolveCommand),
}

#[derive(FromArgs)]
/// Read the board from a photo, optionally solving it right away
#[argh(subcommand, name = "extract")]
struct ExtractCommand {
    /// the path to the board photo
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// solve the extracted board as well
    #[argh(switch, short = 's')]
    solve: bool,
}

#[derive(FromArgs)]
/// Solve a board given as a string such as "abcd efgh ijkl mnop"
#[argh(subcommand, name = "solve")]
struct SolveCommand {
    /// the canonical board string
    #[argh(positional)]
    board: String,
}

fn content_type(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

async fn solve(
    client: &reqwest::Client,
    addr: &str,
    board: String,
) -> Result<SolveResult, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("http://{addr}/solve-game"))
        .json(&BoardRequest {
            board_string: board,
        })
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let board = match args.command {
        ClientCommands::Extract(command) => {
            let bytes = tokio::fs::read(&command.image_path).await?;
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name("board")
                .mime_str(content_type(&command.image_path))?;
            let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

            let response = client
                .post(format!("http://{addr}/extract-board"))
                .multipart(form)
                .send()
                .await?;
            if !response.status().is_success() {
                let error = response.json::<serde_json::Value>().await?;
                println!("Error: {}", serde_json::to_string_pretty(&error)?);
                return Ok(());
            }

            let extracted = response.json::<BoardResponse>().await?;
            println!("Board: {}", extracted.board);
            if !command.solve {
                return Ok(());
            }
            extracted.board.into_string()
        }
        ClientCommands::Solve(command) => command.board,
    };

    let result = solve(&client, &addr, board).await?;
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
