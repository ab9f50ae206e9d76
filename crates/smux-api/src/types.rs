//! JSON message shapes exchanged with a streammux server.
//!
//! Every message is an object with an `api` discriminator:
//!
//! - `{"api":"status", "strs":[..], "muxs":[..], "proc":{..}}`: full snapshot, pushed once a second
//! - `{"api":"ctrl", "data":[name, a|null, b|null]}`: control request (outbound) or confirmation (inbound)
//! - `{"api":"version", "version":.., "copyright":.., "license":..}`: `GET /version` body

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::error::Error;

// ── Envelope ─────────────────────────────────────────────────────────

/// Any message carrying the `api` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "api", rename_all = "lowercase")]
pub enum ApiMessage {
    /// Full status snapshot of every stream, mux and the server process.
    Status(StatusReport),
    /// Control request or its confirmation.
    Ctrl { data: CtrlCommand },
    /// Version banner payload.
    Version(VersionInfo),
}

impl ApiMessage {
    /// Wrap a control command for sending.
    pub fn ctrl(cmd: CtrlCommand) -> Self {
        Self::Ctrl { data: cmd }
    }

    /// Decode a message from an already parsed JSON frame.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, Error> {
        Self::deserialize(value).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: value.to_string(),
        })
    }

    /// Serialize to a compact JSON text frame.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })
    }
}

// ── Status snapshot ──────────────────────────────────────────────────

/// Body of an `api == "status"` message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub strs: Vec<StreamStatus>,
    #[serde(default)]
    pub muxs: Vec<MuxStatus>,
    #[serde(default)]
    pub proc: ProcessStatus,
}

/// One stream (serial port, TCP client, file, ...) as reported by the server.
///
/// Pairs are indexed by endpoint: `[0]` = read (A), `[1]` = write (B).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub state: String,
    pub error: String,
    /// Stream spec options; the first token is the stream type and is not displayed.
    pub opts: String,
    pub info: String,
    pub disp: String,
    /// Most recent state transitions, newest first.
    pub statestrs: Vec<String>,
    pub filter: [String; 2],
    pub can: [bool; 2],
    pub ena: [bool; 2],
    pub stats: [StatsSnapshot; 2],
}

/// One mux routing messages from `src` to `dst` (A = forward, B = reverse).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxStatus {
    pub name: String,
    pub src: String,
    pub dst: String,
    pub filter: [String; 2],
    pub can: [bool; 2],
    pub ena: [bool; 2],
    pub stats: [StatsSnapshot; 2],
}

/// Resource usage of the server process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStatus {
    pub mem_curr: f64,
    pub mem_peak: f64,
    pub cpu_curr: f64,
    pub cpu_avg: f64,
    pub cpu_peak: f64,
    pub pid: u64,
    /// Compact UTC timestamp, `YYYYMMDDThhmmssZ`.
    pub time: String,
    pub uptime: String,
}

// ── Stats counters ───────────────────────────────────────────────────

/// Fixed counter set for one endpoint. `n_*` are message counts, `s_*` byte sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub n_msgs: u64,
    pub s_msgs: u64,
    pub n_err: u64,
    pub n_filt: u64,
    pub s_filt: u64,
    pub n_fpa: u64,
    pub s_fpa: u64,
    pub n_fpb: u64,
    pub s_fpb: u64,
    pub n_nmea: u64,
    pub s_nmea: u64,
    pub n_novb: u64,
    pub s_novb: u64,
    pub n_rtcm3: u64,
    pub s_rtcm3: u64,
    pub n_spartn: u64,
    pub s_spartn: u64,
    pub n_ubx: u64,
    pub s_ubx: u64,
    pub n_unib: u64,
    pub s_unib: u64,
    pub n_other: u64,
    pub s_other: u64,
}

/// Identifies one counter of a [`StatsSnapshot`], in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum StatsField {
    #[strum(serialize = "n_msgs")]
    NMsgs,
    #[strum(serialize = "s_msgs")]
    SMsgs,
    #[strum(serialize = "n_err")]
    NErr,
    #[strum(serialize = "n_filt")]
    NFilt,
    #[strum(serialize = "s_filt")]
    SFilt,
    #[strum(serialize = "n_fpa")]
    NFpa,
    #[strum(serialize = "s_fpa")]
    SFpa,
    #[strum(serialize = "n_fpb")]
    NFpb,
    #[strum(serialize = "s_fpb")]
    SFpb,
    #[strum(serialize = "n_nmea")]
    NNmea,
    #[strum(serialize = "s_nmea")]
    SNmea,
    #[strum(serialize = "n_novb")]
    NNovb,
    #[strum(serialize = "s_novb")]
    SNovb,
    #[strum(serialize = "n_rtcm3")]
    NRtcm3,
    #[strum(serialize = "s_rtcm3")]
    SRtcm3,
    #[strum(serialize = "n_spartn")]
    NSpartn,
    #[strum(serialize = "s_spartn")]
    SSpartn,
    #[strum(serialize = "n_ubx")]
    NUbx,
    #[strum(serialize = "s_ubx")]
    SUbx,
    #[strum(serialize = "n_unib")]
    NUnib,
    #[strum(serialize = "s_unib")]
    SUnib,
    #[strum(serialize = "n_other")]
    NOther,
    #[strum(serialize = "s_other")]
    SOther,
}

impl StatsField {
    /// Wire name, e.g. `"n_rtcm3"`.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Short row label for tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::NMsgs => "Messages",
            Self::SMsgs => "Bytes",
            Self::NErr => "Errors",
            Self::NFilt => "Filtered",
            Self::SFilt => "Filtered bytes",
            Self::NFpa => "FP_A",
            Self::SFpa => "FP_A bytes",
            Self::NFpb => "FP_B",
            Self::SFpb => "FP_B bytes",
            Self::NNmea => "NMEA",
            Self::SNmea => "NMEA bytes",
            Self::NNovb => "NOV_B",
            Self::SNovb => "NOV_B bytes",
            Self::NRtcm3 => "RTCM3",
            Self::SRtcm3 => "RTCM3 bytes",
            Self::NSpartn => "SPARTN",
            Self::SSpartn => "SPARTN bytes",
            Self::NUbx => "UBX",
            Self::SUbx => "UBX bytes",
            Self::NUnib => "UNI_B",
            Self::SUnib => "UNI_B bytes",
            Self::NOther => "Other",
            Self::SOther => "Other bytes",
        }
    }
}

impl StatsSnapshot {
    /// Read one counter.
    pub fn get(&self, field: StatsField) -> u64 {
        match field {
            StatsField::NMsgs => self.n_msgs,
            StatsField::SMsgs => self.s_msgs,
            StatsField::NErr => self.n_err,
            StatsField::NFilt => self.n_filt,
            StatsField::SFilt => self.s_filt,
            StatsField::NFpa => self.n_fpa,
            StatsField::SFpa => self.s_fpa,
            StatsField::NFpb => self.n_fpb,
            StatsField::SFpb => self.s_fpb,
            StatsField::NNmea => self.n_nmea,
            StatsField::SNmea => self.s_nmea,
            StatsField::NNovb => self.n_novb,
            StatsField::SNovb => self.s_novb,
            StatsField::NRtcm3 => self.n_rtcm3,
            StatsField::SRtcm3 => self.s_rtcm3,
            StatsField::NSpartn => self.n_spartn,
            StatsField::SSpartn => self.s_spartn,
            StatsField::NUbx => self.n_ubx,
            StatsField::SUbx => self.s_ubx,
            StatsField::NUnib => self.n_unib,
            StatsField::SUnib => self.s_unib,
            StatsField::NOther => self.n_other,
            StatsField::SOther => self.s_other,
        }
    }
}

// ── Control ──────────────────────────────────────────────────────────

/// `[name, ena_a, ena_b]`: `None` leaves that endpoint unchanged.
///
/// Serializes as a three-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtrlCommand(pub String, pub Option<bool>, pub Option<bool>);

impl CtrlCommand {
    /// Request a change on exactly one endpoint (`0` = A, anything else = B).
    pub fn for_endpoint(name: impl Into<String>, endpoint: usize, ena: bool) -> Self {
        if endpoint == 0 {
            Self(name.into(), Some(ena), None)
        } else {
            Self(name.into(), None, Some(ena))
        }
    }

    /// Target stream or mux name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Requested or confirmed enablement per endpoint.
    pub fn ena(&self) -> [Option<bool>; 2] {
        [self.1, self.2]
    }
}

// ── Version ──────────────────────────────────────────────────────────

/// `GET /version` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    pub version: String,
    pub copyright: String,
    pub license: String,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn outbound_ctrl_shape() {
        let msg = ApiMessage::ctrl(CtrlCommand::for_endpoint("gps1", 0, true));
        insta::assert_snapshot!(msg.to_json().unwrap(), @r#"{"api":"ctrl","data":["gps1",true,null]}"#);

        let msg = ApiMessage::ctrl(CtrlCommand::for_endpoint("mux1", 1, false));
        insta::assert_snapshot!(msg.to_json().unwrap(), @r#"{"api":"ctrl","data":["mux1",null,false]}"#);
    }

    #[test]
    fn parse_ctrl_confirmation() {
        let raw = serde_json::json!({"api": "ctrl", "data": ["gps1", true, null]});
        let msg = ApiMessage::from_value(&raw).unwrap();
        let ApiMessage::Ctrl { data } = msg else {
            panic!("expected ctrl message");
        };
        assert_eq!(data.name(), "gps1");
        assert_eq!(data.ena(), [Some(true), None]);
    }

    #[test]
    fn parse_status_message() {
        let raw = serde_json::json!({
            "api": "status",
            "proc": {
                "time": "20250102T030405Z",
                "mem_curr": 12.34, "mem_peak": 20.0,
                "cpu_curr": 1.25, "cpu_avg": 0.5, "cpu_peak": 9.99,
                "uptime": "0:01:02", "pid": 4242
            },
            "strs": [{
                "name": "gps1", "type": "serial", "mode": "RW", "state": "connected",
                "statestrs": ["connected (ok)", "connecting"],
                "error": "none", "info": "/dev/ttyUSB0", "disp": "ser:///dev/ttyUSB0",
                "opts": "serial,/dev/ttyUSB0:115200",
                "filter": ["", "UBX-NAV-*"],
                "stats": [{ "n_msgs": 105, "s_msgs": 4096 }, { "n_msgs": 0 }],
                "can": [true, true], "ena": [true, false]
            }],
            "muxs": [{
                "name": "mux1", "src": "gps1", "dst": "tcp1",
                "can": [true, false], "ena": [true, true],
                "filter": ["", ""],
                "stats": [{ "n_msgs": 7 }, {}]
            }]
        });

        let msg = ApiMessage::from_value(&raw).unwrap();
        let ApiMessage::Status(report) = msg else {
            panic!("expected status message");
        };
        assert_eq!(report.strs.len(), 1);
        assert_eq!(report.muxs.len(), 1);

        let gps = &report.strs[0];
        assert_eq!(gps.kind, "serial");
        assert_eq!(gps.filter[1], "UBX-NAV-*");
        assert_eq!(gps.ena, [true, false]);
        assert_eq!(gps.stats[0].get(StatsField::NMsgs), 105);
        assert_eq!(gps.stats[0].get(StatsField::SMsgs), 4096);
        assert_eq!(gps.stats[1], StatsSnapshot::default());

        let mux = &report.muxs[0];
        assert_eq!(mux.src, "gps1");
        assert_eq!(mux.dst, "tcp1");
        assert_eq!(report.proc.pid, 4242);
    }

    #[test]
    fn unknown_api_is_an_error() {
        let raw = serde_json::json!({"api": "telemetry", "data": 1});
        let err = ApiMessage::from_value(&raw).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn stats_field_keys_match_wire_names() {
        let snapshot: StatsSnapshot = serde_json::from_value(serde_json::json!({
            "n_rtcm3": 3, "s_spartn": 77, "n_other": 1
        }))
        .unwrap();
        assert_eq!(StatsField::NRtcm3.key(), "n_rtcm3");
        assert_eq!(snapshot.get(StatsField::NRtcm3), 3);
        assert_eq!(snapshot.get(StatsField::SSpartn), 77);

        let value = serde_json::to_value(snapshot).unwrap();
        for field in StatsField::iter() {
            assert_eq!(value[field.key()], snapshot.get(field), "{}", field.key());
        }
        assert_eq!(StatsField::iter().count(), 23);
    }
}
