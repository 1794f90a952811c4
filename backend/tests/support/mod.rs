#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// CSV fixtures
// =============================================================================

pub const ANTENNA_HEADER: &str =
    "id,NGR,Site,Site Height,In-Use Ae Ht,In-Use ERP Total,Dir Max ERP";
pub const PARAMS_HEADER: &str =
    "id,EID,Date,Freq,Block,Serv Label1,Serv Label2,Serv Label3,Serv Label4,Serv Label10,Sub-Chan";

/// A pair of extracts written into a temporary directory that lives as long
/// as the fixture.
pub struct Extracts {
    pub dir: TempDir,
    pub antenna: PathBuf,
    pub params: PathBuf,
}

/// Write both extracts as UTF-8 text. Rows are given without the header line.
pub fn write_extracts(antenna_rows: &[&str], params_rows: &[&str]) -> Extracts {
    let params = lines(PARAMS_HEADER, params_rows).into_bytes();
    write_extracts_bytes(antenna_rows, params)
}

/// Write the antenna extract as UTF-8 and the params extract from raw bytes.
pub fn write_extracts_bytes(antenna_rows: &[&str], params: Vec<u8>) -> Extracts {
    let dir = tempfile::tempdir().unwrap();
    let antenna_path = dir.path().join("TxAntennaDAB.csv");
    let params_path = dir.path().join("TxParamsDAB.csv");
    std::fs::write(&antenna_path, lines(ANTENNA_HEADER, antenna_rows)).unwrap();
    std::fs::write(&params_path, params).unwrap();
    Extracts {
        dir,
        antenna: antenna_path,
        params: params_path,
    }
}

/// Params bytes in Latin-1: each row is UTF-8 text except that the
/// placeholder `{e0}` becomes the single byte 0xE0.
pub fn latin1_params(rows: &[&str]) -> Vec<u8> {
    let text = lines(PARAMS_HEADER, rows);
    let mut bytes = Vec::with_capacity(text.len());
    for (i, part) in text.split("{e0}").enumerate() {
        if i > 0 {
            bytes.push(0xE0);
        }
        bytes.extend_from_slice(part.as_bytes());
    }
    bytes
}

fn lines(header: &str, rows: &[&str]) -> String {
    let mut text = String::from(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// Three C18A transmitters, one C188 and one outside the tracked multiplexes.
pub fn standard_extracts() -> Extracts {
    write_extracts(
        &[
            "1,TQ 339 712,Crystal  Palace,80,150,10,12",
            "2,SU 418 159,rowridge,80,60,20,",
            "3,NZ 025 538,pontop pike,10,50,30,",
            "4,SE 213 515,emley moor,200,300,\"1,000\",",
            "5,TQ 100 100,wrotham,120,90,5,",
        ],
        &[
            "1,C18A,01/02/2010,225.648,12B,BBC R1,BBC R2,,,,1",
            "2,c18a,2004-06-30,225.648,12B,BBC R1,,,,,2",
            "3,C18A,15-03-2012,225.648,12B,heart,,,,,3",
            "4,C188,01/01/2005,222.064,11D,LBC,,,,,4",
            "5,CE15,01/01/2005,227.360,12D,Other,,,,,5",
        ],
    )
}

// =============================================================================
// Stored documents
// =============================================================================

/// A stored document in the nested exchange format.
pub fn document(id: &str, multiplex: &str, power: f64, site_height: i64, date: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "Date": date,
        "C18A": multiplex == "C18A",
        "C18F": multiplex == "C18F",
        "C188": multiplex == "C188",
        "Site Info": {"NGR": format!("TQ{}", id), "Site": format!("SITE {}", id), "Site Height": site_height},
        "Aerial height(m)": 50,
        "Power(kW)": power,
        "Freq": 225.648,
        "Block": "12B",
        "Service Labels": {
            "Serv Label1": "BBC R1",
            "Serv Label2": null,
            "Serv Label3": null,
            "Serv Label4": null,
            "Serv Label10": null
        }
    })
}

/// Two C18A and two C188 transmitters, all tall and recent enough for both filters.
pub fn sample_documents() -> Vec<serde_json::Value> {
    vec![
        document("1", "C18A", 10.0, 80, "2010-02-01"),
        document("2", "C18A", 20.0, 90, "2004-06-30"),
        document("3", "C188", 4.0, 120, "2012-03-15"),
        document("4", "C188", 4.0, 100, "2015-01-01"),
    ]
}
