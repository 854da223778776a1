//! courier CLI
//!
//! Usage:
//!   courier call get http://10.0.0.5/api/status -d q=v
//!   courier call post http://10.0.0.5/api/upload -d title=cat -F photo=./cat.png;type=image/png
//!   courier call put http://10.0.0.5/api/config -d mode=eco --raw
//!   courier call get http://10.0.0.5/api/secure --user svc:secret -H "X-Device: logger-7"
//!   courier call get http://10.0.0.5/api/status --config courier.toml
//!   echo '{"a":1}' | courier render --accept "application/xml"

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use courier_api::{InboundExchange, RequestContext};
use courier_common::parse_str;
use courier_http::{call_api, Credentials, FileAttachment, TransportOptions};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::CourierConfig;

/// Mime type used for attachments without an explicit `type=`
const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Relay data to remote HTTP APIs and render negotiated responses", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform one outbound API call and print {"status", "body"}
    Call {
        /// HTTP method: get, post, put or delete
        method: String,

        /// Target URL
        url: String,

        /// Data field NAME=VALUE (repeatable, bracket names nest)
        #[arg(short = 'd', long = "data")]
        data: Vec<String>,

        /// Attachment NAME=PATH[;type=MIME][;filename=NAME] (post/put only)
        #[arg(short = 'F', long = "file")]
        files: Vec<String>,

        /// Send data as JSON text with a text/plain content type
        #[arg(long)]
        raw: bool,

        /// Extra header "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Basic auth credentials USER:PASSWORD
        #[arg(short, long)]
        user: Option<String>,

        /// Total timeout in seconds
        #[arg(long)]
        timeout: Option<f64>,

        /// Connect timeout in seconds
        #[arg(long)]
        connect_timeout: Option<f64>,

        /// Maximum redirects to follow
        #[arg(long)]
        max_redirects: Option<usize>,

        /// Do not follow redirects
        #[arg(long)]
        no_follow: bool,

        /// Configuration file with a [transport] section
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Read a JSON document from stdin and render it for an Accept header
    Render {
        /// Accept header to negotiate against
        #[arg(long)]
        accept: Option<String>,

        /// Status code to report
        #[arg(long)]
        status: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Call {
            method,
            url,
            data,
            files,
            raw,
            headers,
            user,
            timeout,
            connect_timeout,
            max_redirects,
            no_follow,
            config,
        } => {
            let config = match config {
                Some(path) => CourierConfig::load(&path)?,
                None => CourierConfig::default(),
            };

            let mut options = config.transport.apply(TransportOptions::default());
            if let Some(secs) = timeout {
                options = options.timeout_secs(secs);
            }
            if let Some(secs) = connect_timeout {
                options = options.connect_timeout_secs(secs);
            }
            if let Some(max) = max_redirects {
                options = options.max_redirects(max);
            }
            if no_follow {
                options = options.follow_redirects(false);
            }
            if let Some(user) = user {
                options.credentials = Some(Credentials::parse(&user));
            }
            for line in &headers {
                let (name, value) = parse_header(line)?;
                options = options.header(name, value);
            }

            let payload = parse_str(&data.join("&"));
            let attachments = files
                .iter()
                .map(|arg| parse_attachment(arg))
                .collect::<Result<Vec<_>>>()?;

            let result = call_api(&method, &url, payload, attachments, options, raw)
                .await
                .context("Outbound call rejected")?;

            let (body, status) = result.into_parts();
            println!("{}", serde_json::to_string_pretty(&json!({"status": status, "body": body}))?);
        }

        Commands::Render { accept, status } => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            let data: Value = serde_json::from_str(&input).context("stdin is not valid JSON")?;

            let mut context = RequestContext::new("GET");
            if let Some(accept) = accept {
                context = context.with_accept(accept);
            }
            let response = InboundExchange::new(context).return_data(&data, status);

            println!("Status: {}", response.status().code());
            println!("Content-Type: {}", response.content_type);
            println!();
            print!("{}", response.body);
            if !response.body.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

/// Parse `Name: value`
fn parse_header(line: &str) -> Result<(String, String)> {
    match line.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Invalid header {:?}, expected \"Name: value\"", line),
    }
}

/// Parse `NAME=PATH[;type=MIME][;filename=NAME]`
fn parse_attachment(arg: &str) -> Result<(String, FileAttachment)> {
    let Some((name, rest)) = arg.split_once('=') else {
        bail!("Invalid file {:?}, expected NAME=PATH", arg);
    };

    let mut params = rest.split(';');
    let path = params.next().unwrap_or_default().trim_start_matches('@');
    if name.is_empty() || path.is_empty() {
        bail!("Invalid file {:?}, expected NAME=PATH", arg);
    }

    let mut mime_type = DEFAULT_ATTACHMENT_TYPE.to_string();
    let mut file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    for param in params {
        match param.split_once('=') {
            Some(("type", value)) => mime_type = value.to_string(),
            Some(("filename", value)) => file_name = value.to_string(),
            _ => bail!("Unknown file parameter {:?} in {:?}", param, arg),
        }
    }

    Ok((name.to_string(), FileAttachment::new(path, mime_type, file_name)))
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Device: logger-7").unwrap(),
            ("X-Device".to_string(), "logger-7".to_string())
        );
        assert_eq!(
            parse_header("X-Url:http://a/b").unwrap(),
            ("X-Url".to_string(), "http://a/b".to_string())
        );
        assert!(parse_header("no colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parse_attachment() {
        let (name, file) = parse_attachment("photo=/tmp/php123;type=image/png;filename=cat.png").unwrap();
        assert_eq!(name, "photo");
        assert_eq!(file, FileAttachment::new("/tmp/php123", "image/png", "cat.png"));

        let (_, file) = parse_attachment("doc=@./report.pdf").unwrap();
        assert_eq!(file.file_name, "report.pdf");
        assert_eq!(file.mime_type, DEFAULT_ATTACHMENT_TYPE);

        assert!(parse_attachment("photo").is_err());
        assert!(parse_attachment("photo=/tmp/x;size=3").is_err());
    }

    #[test]
    fn test_cli_parses_call() {
        let cli = Cli::try_parse_from([
            "courier", "call", "post", "http://localhost/api", "-d", "a=1", "-d", "b[]=2", "--raw",
        ])
        .unwrap();
        match cli.command {
            Commands::Call { method, data, raw, .. } => {
                assert_eq!(method, "post");
                assert_eq!(data, vec!["a=1", "b[]=2"]);
                assert!(raw);
            }
            Commands::Render { .. } => panic!("expected call"),
        }
    }
}
