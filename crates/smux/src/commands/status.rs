//! `smux status`: one status snapshot, rendered as tables or serialized.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use smux_api::{ApiClient, MuxStatus, StatsField, StatsSnapshot, StatusReport, StreamStatus};
use smux_core::ProcessView;
use smux_core::entity::strip_leading_token;
use smux_core::fmt::fmt_num;

use crate::cli::{GlobalOpts, OutputFormat, StatusArgs, StatusSection};
use crate::output::{self, endpoint_state, heading, onoff_cell, render_table};

use super::Failure;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StreamRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Read")]
    read: String,
    #[tabled(rename = "Write")]
    write: String,
    #[tabled(rename = "Msgs R")]
    msgs_a: String,
    #[tabled(rename = "Msgs W")]
    msgs_b: String,
    #[tabled(rename = "Options")]
    opts: String,
    #[tabled(rename = "Error")]
    error: String,
}

#[derive(Tabled)]
struct MuxRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    src: String,
    #[tabled(rename = "Destination")]
    dst: String,
    #[tabled(rename = "Fwd")]
    fwd: String,
    #[tabled(rename = "Rev")]
    rev: String,
    #[tabled(rename = "Msgs F")]
    msgs_a: String,
    #[tabled(rename = "Msgs R")]
    msgs_b: String,
    #[tabled(rename = "Filter F")]
    filter_a: String,
    #[tabled(rename = "Filter R")]
    filter_b: String,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Counter")]
    counter: &'static str,
    #[tabled(rename = "A")]
    a: String,
    #[tabled(rename = "B")]
    b: String,
}

fn count(n: u64) -> String {
    fmt_num(i128::from(n))
}

fn stream_row(s: &StreamStatus, color: bool) -> StreamRow {
    StreamRow {
        name: s.name.clone(),
        kind: s.kind.clone(),
        mode: s.mode.clone(),
        state: s.state.clone(),
        read: onoff_cell(endpoint_state(s.can[0], s.ena[0]), color),
        write: onoff_cell(endpoint_state(s.can[1], s.ena[1]), color),
        msgs_a: count(s.stats[0].n_msgs),
        msgs_b: count(s.stats[1].n_msgs),
        opts: strip_leading_token(&s.opts).to_owned(),
        error: s.error.clone(),
    }
}

fn mux_row(m: &MuxStatus, color: bool) -> MuxRow {
    MuxRow {
        name: m.name.clone(),
        src: m.src.clone(),
        dst: m.dst.clone(),
        fwd: onoff_cell(endpoint_state(m.can[0], m.ena[0]), color),
        rev: onoff_cell(endpoint_state(m.can[1], m.ena[1]), color),
        msgs_a: count(m.stats[0].n_msgs),
        msgs_b: count(m.stats[1].n_msgs),
        filter_a: m.filter[0].clone(),
        filter_b: m.filter[1].clone(),
    }
}

/// Rows for every counter that is non-zero on either endpoint.
fn stats_rows(name: &str, stats: &[StatsSnapshot; 2]) -> Vec<StatsRow> {
    StatsField::iter()
        .filter(|&f| stats[0].get(f) != 0 || stats[1].get(f) != 0)
        .map(|f| StatsRow {
            name: name.to_owned(),
            counter: f.label(),
            a: count(stats[0].get(f)),
            b: count(stats[1].get(f)),
        })
        .collect()
}

fn process_detail(report: &StatusReport) -> String {
    let mut view = ProcessView::new();
    view.update(&report.proc);
    [
        ("Memory", format!("{} MB (peak {} MB)", view.mem_curr, view.mem_peak)),
        (
            "CPU",
            format!("{}% (avg {}%, peak {}%)", view.cpu_curr, view.cpu_avg, view.cpu_peak),
        ),
        ("PID", view.pid.text().to_owned()),
        ("Time", view.time.text().to_owned()),
        ("Uptime", view.uptime.text().to_owned()),
    ]
    .iter()
    .map(|(k, v)| format!("{k:<8} {v}"))
    .collect::<Vec<_>>()
    .join("\n")
}

// ── Serialized sections ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(untagged)]
enum SectionOut<'a> {
    All(&'a StatusReport),
    Streams(&'a [StreamStatus]),
    Muxes(&'a [MuxStatus]),
    Proc(&'a smux_api::ProcessStatus),
}

fn section_out(report: &StatusReport, section: StatusSection) -> SectionOut<'_> {
    match section {
        StatusSection::All => SectionOut::All(report),
        StatusSection::Streams => SectionOut::Streams(&report.strs),
        StatusSection::Muxes => SectionOut::Muxes(&report.muxs),
        StatusSection::Proc => SectionOut::Proc(&report.proc),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    client: &ApiClient,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), Failure> {
    let report = client.status().await?;
    tracing::debug!(
        streams = report.strs.len(),
        muxes = report.muxs.len(),
        "fetched status snapshot"
    );

    let rendered = match global.output {
        OutputFormat::Table => render_tables(&report, &args, output::should_color(global.color)),
        OutputFormat::Plain => plain_names(&report, args.section),
        format => output::render_single(
            format,
            &section_out(&report, args.section),
            |_| String::new(),
            |_| String::new(),
        )?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn plain_names(report: &StatusReport, section: StatusSection) -> String {
    let streams = report.strs.iter().map(|s| s.name.as_str());
    let muxes = report.muxs.iter().map(|m| m.name.as_str());
    match section {
        StatusSection::All => streams.chain(muxes).collect::<Vec<_>>().join("\n"),
        StatusSection::Streams => streams.collect::<Vec<_>>().join("\n"),
        StatusSection::Muxes => muxes.collect::<Vec<_>>().join("\n"),
        StatusSection::Proc => report.proc.pid.to_string(),
    }
}

fn render_tables(report: &StatusReport, args: &StatusArgs, color: bool) -> String {
    let want = |s: StatusSection| args.section == StatusSection::All || args.section == s;
    let mut parts = Vec::new();

    if want(StatusSection::Streams) {
        let rows: Vec<_> = report.strs.iter().map(|s| stream_row(s, color)).collect();
        parts.push(format!("{}\n{}", heading("Streams", color), render_table(&rows)));
        if args.stats {
            let rows: Vec<_> = report
                .strs
                .iter()
                .flat_map(|s| stats_rows(&s.name, &s.stats))
                .collect();
            parts.push(format!("{}\n{}", heading("Stream counters", color), render_table(&rows)));
        }
    }
    if want(StatusSection::Muxes) {
        let rows: Vec<_> = report.muxs.iter().map(|m| mux_row(m, color)).collect();
        parts.push(format!("{}\n{}", heading("Muxes", color), render_table(&rows)));
        if args.stats {
            let rows: Vec<_> = report
                .muxs
                .iter()
                .flat_map(|m| stats_rows(&m.name, &m.stats))
                .collect();
            parts.push(format!("{}\n{}", heading("Mux counters", color), render_table(&rows)));
        }
    }
    if want(StatusSection::Proc) {
        parts.push(format!("{}\n{}", heading("Process", color), process_detail(report)));
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> StatusReport {
        let mut gps = StreamStatus {
            name: "gps1".into(),
            kind: "serial".into(),
            opts: "serial:/dev/ttyUSB0,115200".into(),
            can: [true, false],
            ena: [true, false],
            ..StreamStatus::default()
        };
        gps.stats[0].n_msgs = 1_234_567;
        gps.stats[0].n_ubx = 12;
        StatusReport {
            strs: vec![gps],
            muxs: vec![MuxStatus {
                name: "m1".into(),
                src: "gps1".into(),
                dst: "tcp1".into(),
                can: [true, true],
                ..MuxStatus::default()
            }],
            ..StatusReport::default()
        }
    }

    #[test]
    fn stream_row_formats_counts_and_options() {
        let row = stream_row(&report().strs[0], false);
        assert_eq!(row.msgs_a, "1'234'567");
        assert_eq!(row.opts, "115200");
        assert_eq!(row.read, "on");
        assert_eq!(row.write, "disabled");
    }

    #[test]
    fn stats_rows_skip_zero_counters() {
        let r = report();
        let rows = stats_rows("gps1", &r.strs[0].stats);
        let labels: Vec<_> = rows.iter().map(|r| r.counter).collect();
        assert_eq!(labels, vec!["Messages", "UBX"]);
    }

    #[test]
    fn plain_lists_names_by_section() {
        let r = report();
        assert_eq!(plain_names(&r, StatusSection::All), "gps1\nm1");
        assert_eq!(plain_names(&r, StatusSection::Muxes), "m1");
    }

    #[test]
    fn proc_only_table() {
        let args = StatusArgs {
            section: StatusSection::Proc,
            stats: false,
        };
        let out = render_tables(&report(), &args, false);
        assert!(out.starts_with("Process"));
        assert!(!out.contains("Streams"));
    }
}
