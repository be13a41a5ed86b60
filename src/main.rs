use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use sortthread::config::{CodecConfig, NormalizerConfig};
use sortthread::protocol::{ThreadResponse, Value};
use sortthread::threading::{SubjectMessage, SubjectNormalizer, ThreadCodec, thread_by_ordered_subject};

#[derive(Parser, Debug)]
#[command(
    name = "sortthread",
    about = "Inspect IMAP THREAD payloads and base subjects"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the base subject of a subject line.
    Subject {
        /// Treat the argument as a raw header value and decode RFC 2047
        /// encoded words first.
        #[arg(long)]
        header: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,

        subject: String,
    },

    /// Parse a THREAD payload such as `(3)(4 5 (6) (7 8))` and print it back.
    Thread {
        /// Print an indented tree instead of the canonical payload.
        #[arg(long)]
        tree: bool,

        payload: String,
    },

    /// Thread `id<TAB>rfc3339-date<TAB>subject` lines from stdin with
    /// ORDEREDSUBJECT.
    OrderedSubject,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    sortthread::init_logger();

    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Subject {
            header,
            json,
            subject,
        } => {
            let subject = if header {
                decode_header_value(&subject)?
            } else {
                subject
            };

            let base = SubjectNormalizer::new(NormalizerConfig::from_env()).normalize(&subject)?;
            if json {
                writeln!(out, "{}", serde_json::to_string(&base)?)?;
            } else {
                writeln!(out, "{}", base.subject)?;
                writeln!(out, "reply/forward: {}", base.is_reply_or_forward)?;
            }
        }
        Command::Thread { tree, payload } => {
            let config = CodecConfig::from_env();
            let values = Value::parse_line_with_limit(&payload, config.max_depth)?;
            let forest = ThreadCodec::new(config).parse(&values)?;

            if tree {
                for (node, depth) in forest.depth_first() {
                    writeln!(out, "{}{}", "  ".repeat(depth), forest.message_id(node))?;
                }
            } else {
                writeln!(out, "{forest}")?;
            }
        }
        Command::OrderedSubject => {
            let messages = read_messages(io::stdin().lock())?;
            let normalizer = SubjectNormalizer::new(NormalizerConfig::from_env());
            let threads = thread_by_ordered_subject(&messages, &normalizer)?;
            writeln!(out, "* {}", ThreadResponse { threads })?;
        }
    }

    Ok(())
}

/// Decode encoded words in a raw `Subject:` header value.
fn decode_header_value(raw: &str) -> Result<String, Box<dyn std::error::Error>> {
    let line = format!("Subject: {raw}");
    let (header, _) = mailparse::parse_header(line.as_bytes())?;
    Ok(header.get_value())
}

fn read_messages(input: impl BufRead) -> Result<Vec<SubjectMessage>, Box<dyn std::error::Error>> {
    let mut messages = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.splitn(3, '\t');
        let (Some(id), Some(sent), Some(subject)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!("line {}: expected id<TAB>date<TAB>subject", index + 1).into());
        };

        messages.push(SubjectMessage {
            id: id.trim().parse()?,
            subject: subject.to_string(),
            sent: DateTime::parse_from_rfc3339(sent.trim())?.with_timezone(&Utc),
        });
    }

    log::debug!("read {} messages from stdin", messages.len());
    Ok(messages)
}
