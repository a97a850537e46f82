use crate::agent::RagAgent;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const BDD_PREFIX: &str = "bdd:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRequest {
    Exit,
    Scenarios(String),
    Question(String),
    Empty,
}

impl UserRequest {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return UserRequest::Empty;
        }
        if line.eq_ignore_ascii_case("exit") {
            return UserRequest::Exit;
        }

        match line.get(..BDD_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(BDD_PREFIX) => {
                let feature = line[BDD_PREFIX.len()..].trim();
                if feature.is_empty() {
                    UserRequest::Empty
                } else {
                    UserRequest::Scenarios(feature.to_string())
                }
            }
            _ => UserRequest::Question(line.to_string()),
        }
    }
}

/// Reads queries line by line until `exit` or end of input. Errors from the
/// agent end the session and are returned to the caller.
pub async fn run_interactive<R, W>(agent: &RagAgent, reader: R, writer: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(
            b"\n=== Smart RAG Agent Interactive Mode ===\n\
              Type 'exit' to quit\n\
              Start a query with 'bdd:' to generate BDD scenarios\n\
              ====================================\n\n",
        )
        .await?;

    let mut lines = reader.lines();

    loop {
        writer.write_all(b"Enter your query: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            writer.write_all(b"\n").await?;
            break;
        };

        match UserRequest::parse(&line) {
            UserRequest::Exit => break,
            UserRequest::Empty => continue,
            UserRequest::Scenarios(feature) => {
                let response = agent.generate_bdd_scenarios(&feature).await?;
                let section = format!(
                    "\n=== BDD Scenarios ===\n{}\n===================\n\n",
                    response
                );
                writer.write_all(section.as_bytes()).await?;
            }
            UserRequest::Question(question) => {
                let response = agent.answer_question(&question).await?;
                let section = format!("\n=== Answer ===\n{}\n==============\n\n", response);
                writer.write_all(section.as_bytes()).await?;
            }
        }
    }

    writer.flush().await?;
    Ok(())
}
