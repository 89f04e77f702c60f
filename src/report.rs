//! Liveness report rendering.
//!
//! Dead peers are listed in discovery order and alive peers by ascending
//! latency. Both tables are printed as left-aligned, space-padded columns.

use crate::peer::Peer;
use chrono::{DateTime, Local};
use std::fmt;
use std::io::{self, Write};

/// Timestamp format of the report header, e.g. `Mon, 02 Jan 2006 15:04:05 +0000`
pub const REPORT_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Result of a probe run, split by liveness
#[derive(Debug, Clone)]
pub struct Report {
    generated_at: DateTime<Local>,
    dead: Vec<Peer>,
    alive: Vec<Peer>,
}

impl Report {
    /// Partition probed peers and sort the alive ones by latency
    pub fn new(peers: Vec<Peer>, generated_at: DateTime<Local>) -> Self {
        let (mut alive, dead): (Vec<Peer>, Vec<Peer>) = peers.into_iter().partition(Peer::is_up);
        alive.sort_by_key(Peer::latency);

        Self {
            generated_at,
            dead,
            alive,
        }
    }

    /// Unreachable peers, in discovery order
    pub fn dead(&self) -> &[Peer] {
        &self.dead
    }

    /// Reachable peers, fastest first
    pub fn alive(&self) -> &[Peer] {
        &self.alive
    }

    /// Number of unreachable peers
    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    /// Number of reachable peers
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Write the full report
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Report date: {}", self.generated_at.format(REPORT_DATE_FORMAT))?;

        writeln!(out, "Dead peers:")?;
        let dead_rows = self
            .dead
            .iter()
            .map(|p| vec![p.uri().to_string(), p.location()]);
        write_table(out, &["URI", "Location"], dead_rows)?;

        writeln!(out, "\n\nAlive peers (sorted by latency):")?;
        let alive_rows = self.alive.iter().map(|p| {
            let millis = p.latency().unwrap_or_default().as_secs_f64() * 1000.0;
            vec![p.uri().to_string(), format!("{millis:.3}"), p.location()]
        });
        write_table(out, &["URI", "Latency (ms)", "Location"], alive_rows)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.render(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

/// Write rows as columns padded to the widest cell plus one space
fn write_table<W, I>(out: &mut W, header: &[&str], rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table: Vec<Vec<String>> = vec![header.iter().map(ToString::to_string).collect()];
    table.extend(rows);

    let mut widths = vec![0; header.len()];
    for row in &table {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in &table {
        let last = row.len().saturating_sub(1);
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$} ", cell, width = widths[i]));
            }
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::Protocol;
    use chrono::TimeZone;
    use std::time::Duration;

    fn peer(uri: &str, latency: Option<u64>) -> Peer {
        let mut peer = Peer::new(uri, Protocol::Tcp, "host", 1, "eu", "de.md");
        if let Some(ms) = latency {
            peer.mark_alive(Duration::from_millis(ms));
        }
        peer
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_alive_sorted_by_latency() {
        let peers = vec![
            peer("tcp://a:1", Some(30)),
            peer("tcp://b:1", Some(5)),
            peer("tcp://c:1", Some(12)),
        ];
        let report = Report::new(peers, timestamp());

        let order: Vec<&str> = report.alive().iter().map(Peer::uri).collect();
        assert_eq!(order, vec!["tcp://b:1", "tcp://c:1", "tcp://a:1"]);
        assert_eq!(report.dead_count(), 0);
    }

    #[test]
    fn test_dead_keep_discovery_order() {
        let peers = vec![peer("tcp://z:1", None), peer("tcp://x:1", Some(1)), peer("tcp://y:1", None)];
        let report = Report::new(peers, timestamp());

        let order: Vec<&str> = report.dead().iter().map(Peer::uri).collect();
        assert_eq!(order, vec!["tcp://z:1", "tcp://y:1"]);
        assert_eq!(report.alive_count(), 1);
    }

    #[test]
    fn test_render_layout() {
        let peers = vec![
            peer("tcp://dead.example.net:1", None),
            peer("tls://a:1", Some(30)),
            peer("tls://bb:1", Some(5)),
        ];
        let report = Report::new(peers, timestamp());
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Report date: Fri, 01 Mar 2024 12:30:00 "));
        assert_eq!(lines[1], "Dead peers:");
        assert_eq!(lines[2], "URI                      Location");
        assert_eq!(lines[3], "tcp://dead.example.net:1 eu/de.md");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Alive peers (sorted by latency):");
        assert_eq!(lines[7], "URI        Latency (ms) Location");
        assert_eq!(lines[8], "tls://bb:1 5.000        eu/de.md");
        assert_eq!(lines[9], "tls://a:1  30.000       eu/de.md");
    }

    #[test]
    fn test_render_empty() {
        let report = Report::new(Vec::new(), timestamp());
        let text = report.to_string();
        assert!(text.contains("Dead peers:\nURI Location\n"));
        assert!(text.ends_with("Alive peers (sorted by latency):\nURI Latency (ms) Location\n"));
    }
}
