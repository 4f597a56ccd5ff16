use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::dispatch::McpServer;
use crate::tool::ReqMeta;

/// Serve line-delimited JSON-RPC on the process's stdin/stdout until EOF.
pub async fn run_stdio(server: McpServer) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(&server, stdin, stdout).await
}

/// Read one JSON-RPC message per line from `input`, write one response per
/// line to `output`. Blank lines are skipped; notifications produce no
/// output.
pub async fn serve_lines<R, W>(server: &McpServer, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    tracing::info!("stdio transport ready");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let meta = ReqMeta { transport: "stdio", origin: None };
        let Some(resp) = server.handle_bytes(line.as_bytes(), meta).await else {
            continue;
        };
        let mut out = serde_json::to_vec(&resp).map_err(std::io::Error::other)?;
        out.push(b'\n');
        output.write_all(&out).await?;
        output.flush().await?;
    }
    tracing::info!("stdin closed, stdio transport stopping");
    Ok(())
}
