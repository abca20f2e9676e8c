#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use techforge_client::ClientConfig;
use techforge_protocol::events::{Frame, OPTIMIZATION_RESULT, PROGRESS};
use techforge_protocol::grid::{Cell, Grid};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// What the mock solver does in response to one incoming frame.
pub enum Reply {
    Send(Frame),
    Sleep(Duration),
    Close,
}

type Script = dyn Fn(&Frame) -> Vec<Reply> + Send + Sync;

/// In-process solver speaking newline-delimited JSON frames.
pub struct MockSolver {
    pub addr: String,
    pub received: mpsc::UnboundedReceiver<Frame>,
    connections: Arc<AtomicUsize>,
}

impl MockSolver {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&Frame) -> Vec<Reply> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, received) = mpsc::unbounded_channel();
        let connections = Arc::new(AtomicUsize::new(0));
        let script: Arc<Script> = Arc::new(script);

        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let tx = tx.clone();
                let script = script.clone();
                tokio::spawn(async move {
                    let (read, mut write) = stream.into_split();
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let frame: Frame = serde_json::from_str(&line).unwrap();
                        let _ = tx.send(frame.clone());
                        for reply in script(&frame) {
                            match reply {
                                Reply::Send(out) => {
                                    let mut text = serde_json::to_string(&out).unwrap();
                                    text.push('\n');
                                    if write.write_all(text.as_bytes()).await.is_err() {
                                        return;
                                    }
                                }
                                Reply::Sleep(d) => tokio::time::sleep(d).await,
                                Reply::Close => return,
                            }
                        }
                    }
                });
            }
        });

        Self {
            addr,
            received,
            connections,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub async fn next_frame(&mut self) -> Frame {
        tokio::time::timeout(Duration::from_secs(2), self.received.recv())
            .await
            .expect("solver received nothing")
            .expect("solver stopped")
    }
}

/// Fast-failing settings for tests.
pub fn test_config(addr: &str) -> ClientConfig {
    ClientConfig {
        solver_addr: addr.to_string(),
        reconnection_attempts: 1,
        reconnection_delay_ms: 10,
        reconnection_delay_max_ms: 20,
        connect_timeout_ms: 1_000,
        optimize_idle_timeout_ms: 2_000,
        ..Default::default()
    }
}

/// An address nothing listens on.
pub async fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

pub fn reply(event: &str, id: Option<u64>, data: Value) -> Reply {
    let frame = Frame::new(event, data);
    Reply::Send(match id {
        Some(id) => frame.with_id(id),
        None => frame,
    })
}

pub fn progress(id: Option<u64>, percent: f64, best_grid: Option<&Grid>) -> Reply {
    let mut data = json!({ "progress_percent": percent });
    if let Some(grid) = best_grid {
        data["best_grid"] = serde_json::to_value(grid).unwrap();
    }
    reply(PROGRESS, id, data)
}

pub fn result(id: Option<u64>, solve_method: &str, grid: Option<&Grid>) -> Reply {
    reply(
        OPTIMIZATION_RESULT,
        id,
        json!({
            "solve_method": solve_method,
            "grid": grid,
            "max_bonus": 104.2,
            "solved_bonus": 98.0
        }),
    )
}

/// 3x2 grid: `shield` on two cells of the top row (one supercharged), `hyper`
/// bottom right, bottom left inactive.
pub fn sample_grid() -> Grid {
    let mut grid = Grid::new(3, 2);
    grid.cells[0][0] = Cell {
        tech: Some("shield".into()),
        module: Some("Cb".into()),
        label: "Defensive Shields".into(),
        supercharged: true,
        ..Cell::default()
    };
    grid.cells[0][1] = Cell {
        tech: Some("shield".into()),
        module: Some("Ca".into()),
        ..Cell::default()
    };
    grid.cells[1][0].active = false;
    grid.cells[1][2] = Cell {
        tech: Some("hyper".into()),
        module: Some("HD".into()),
        ..Cell::default()
    };
    grid
}

/// `sample_grid` with `shield` moved to the bottom row.
pub fn solved_grid() -> Grid {
    let mut grid = sample_grid().without_tech("shield");
    grid.cells[1][1] = Cell {
        tech: Some("shield".into()),
        module: Some("Cb".into()),
        ..Cell::default()
    };
    grid
}
