use argh::FromArgs;
use boggle_vision::{
    BoardEngine, Dictionary, DictionarySolver, InferenceConfig, ServerConfig,
    config::{self, DEFAULT_DICTIONARY, DEFAULT_HOST, DEFAULT_MAX_TOKENS, DEFAULT_MODEL},
    server::{AppState, router},
};
use std::{path::PathBuf, time::Duration};

#[derive(FromArgs)]
/// Serves the Boggle board extractor and solver.
struct ServerArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on (defaults to $PORT, then 8000)
    #[argh(option, short = 'p', default = "config::port_from_env()")]
    port: u16,

    /// chat-completions endpoint of the vision model (defaults to $BOGGLE_INFERENCE_URL)
    #[argh(option, default = "config::inference_url_from_env()")]
    inference_url: String,

    /// model name sent with each request
    #[argh(option, default = "DEFAULT_MODEL.to_string()")]
    model: String,

    /// output token ceiling for the model reply
    #[argh(option, default = "DEFAULT_MAX_TOKENS")]
    max_tokens: u32,

    /// seconds to wait for the model before giving up
    #[argh(option, default = "config::DEFAULT_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// newline-delimited word list used by the solver
    #[argh(option, short = 'd', default = "PathBuf::from(DEFAULT_DICTIONARY)")]
    dictionary: PathBuf,

    /// number of ranked words returned by the solver
    #[argh(option, default = "config::DEFAULT_TOP_WORDS")]
    top_words: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ServerArgs = argh::from_env();

    let inference = InferenceConfig {
        endpoint: args.inference_url,
        model: args.model,
        max_tokens: args.max_tokens,
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let server = ServerConfig {
        host: args.host,
        port: args.port,
        top_words: args.top_words,
        dictionary: args.dictionary,
        ..Default::default()
    };

    let state = AppState {
        engine: BoardEngine::from_config(&inference)?,
        solver: DictionarySolver::new(Dictionary::load(&server.dictionary)?),
        top_words: server.top_words,
    };
    let app = router(state, server.max_upload_bytes);

    let addr = server.addr();
    log::info!("Starting the server");
    log::info!("Listening on: {addr}");
    log::info!("Vision model endpoint: {}", inference.endpoint);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
